//! Normalizer for untrusted tree data.
//!
//! Turns arbitrary JSON (a stored value, an import file) into a well-formed
//! [`Tree`]. Nothing here fails: non-object entries are dropped, missing or
//! non-string fields fall back to defaults, and every id in the result is
//! unique. Existing ids are kept so identity survives repeated loads.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::services::id_generator::new_id;
use crate::types::link_tree::{FolderNode, LinkEntry, Tree};

/// Result of a normalization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOutcome {
    pub tree: Tree,
    /// Entries skipped because they were not objects.
    pub dropped: usize,
    /// Ids that were missing, empty or duplicated and had to be regenerated.
    pub regenerated_ids: usize,
}

/// Normalizes `input`, discarding the diagnostics.
pub fn normalize(input: &Value) -> Tree {
    normalize_with_report(input).tree
}

/// Normalizes `input` and reports how much had to be repaired.
///
/// A top-level value that is not an array yields an empty tree.
pub fn normalize_with_report(input: &Value) -> NormalizeOutcome {
    let mut pass = Pass::default();
    let tree = match input {
        Value::Array(items) => pass.folders(items),
        Value::Null => Vec::new(),
        _ => {
            pass.dropped += 1;
            Vec::new()
        }
    };

    if pass.dropped > 0 || pass.regenerated > 0 {
        log::warn!(
            "normalize: dropped {} malformed entries, regenerated {} ids",
            pass.dropped,
            pass.regenerated
        );
    }

    NormalizeOutcome {
        tree,
        dropped: pass.dropped,
        regenerated_ids: pass.regenerated,
    }
}

/// Re-normalizes an already typed tree, repairing duplicate or empty ids.
pub fn normalize_tree(tree: &[FolderNode]) -> Tree {
    match serde_json::to_value(tree) {
        Ok(value) => normalize(&value),
        Err(e) => {
            log::warn!("normalize: could not serialize tree: {}", e);
            Vec::new()
        }
    }
}

#[derive(Default)]
struct Pass {
    seen: HashSet<String>,
    dropped: usize,
    regenerated: usize,
}

impl Pass {
    fn folders(&mut self, items: &[Value]) -> Vec<FolderNode> {
        items
            .iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(self.folder(map)),
                _ => {
                    self.dropped += 1;
                    None
                }
            })
            .collect()
    }

    fn folder(&mut self, map: &Map<String, Value>) -> FolderNode {
        let id = self.claim_id(map.get("id"));
        let title = string_field(map, "title");
        let children = match map.get("children") {
            Some(Value::Array(items)) => self.folders(items),
            _ => Vec::new(),
        };
        let links = match map.get("links") {
            Some(Value::Array(items)) => self.links(items),
            _ => Vec::new(),
        };
        FolderNode {
            id,
            title,
            children,
            links,
        }
    }

    fn links(&mut self, items: &[Value]) -> Vec<LinkEntry> {
        items
            .iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(LinkEntry {
                    id: self.claim_id(map.get("id")),
                    title: string_field(map, "title"),
                    url: string_field(map, "url"),
                }),
                _ => {
                    self.dropped += 1;
                    None
                }
            })
            .collect()
    }

    /// Keeps a non-empty string id the first time it is seen; anything else
    /// gets a fresh one.
    fn claim_id(&mut self, candidate: Option<&Value>) -> String {
        if let Some(Value::String(id)) = candidate {
            if !id.is_empty() && self.seen.insert(id.clone()) {
                return id.clone();
            }
        }
        self.regenerated += 1;
        let id = new_id();
        self.seen.insert(id.clone());
        id
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}
