//! Indented symbolic text format for exporting and importing the forest.
//!
//! ```text
//! === LINK TREE ===
//!
//! 📁 Work
//!   🔗 Mail
//!      https://mail.example
//!   📁 Docs
//!     🔗 Wiki
//!        https://wiki.example
//! ```
//!
//! Folders are indented two spaces per depth level. Each link sits one
//! level below its folder, with its url on the next line aligned under the
//! title. Top-level roots are separated by a blank line. The format does
//! not carry ids: decoding always assigns fresh ones.

use std::fmt::Write;

use crate::services::id_generator::new_id;
use crate::types::link_tree::{FolderNode, LinkEntry, Tree};

pub const HEADER: &str = "=== LINK TREE ===";
const FOLDER_MARK: &str = "📁";
const LINK_MARK: &str = "🔗";
const INDENT: &str = "  ";
// Width of "<mark> " so the url lines up under the link title.
const URL_PAD: &str = "   ";

/// Encodes the forest, depth-first, links before sub-folders.
pub fn encode(tree: &[FolderNode]) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    for root in tree {
        out.push('\n');
        encode_folder(&mut out, root, 0);
    }
    out
}

fn encode_folder(out: &mut String, folder: &FolderNode, depth: usize) {
    let indent = INDENT.repeat(depth);
    let link_indent = INDENT.repeat(depth + 1);
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}{} {}", indent, FOLDER_MARK, folder.title);
    for link in &folder.links {
        let _ = writeln!(out, "{}{} {}", link_indent, LINK_MARK, link.title);
        let _ = writeln!(out, "{}{}{}", link_indent, URL_PAD, link.url);
    }
    for child in &folder.children {
        encode_folder(out, child, depth + 1);
    }
}

/// Result of decoding text, with the number of lines that were ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOutcome {
    pub tree: Tree,
    pub skipped_lines: usize,
}

/// Decodes text into a forest. Never fails; unrecognised lines are ignored.
pub fn decode(text: &str) -> Tree {
    decode_with_report(text).tree
}

/// Line-oriented decoder.
///
/// - a folder line closes every open folder at the same or deeper level,
///   then opens a new folder under whatever remains open
/// - a link line adds a link with an empty url to the innermost open folder
/// - a line starting with `http` becomes the url of the link just added,
///   verbatim apart from its indentation
/// - blank lines and the header are ignored, as is anything else
///
/// A link line with no open folder and a url line with no pending link are
/// counted as skipped.
pub fn decode_with_report(text: &str) -> DecodeOutcome {
    let mut roots: Tree = Vec::new();
    let mut open: Vec<(usize, FolderNode)> = Vec::new();
    let mut link_pending = false;
    let mut skipped_lines = 0;

    for line in text.lines() {
        let content = line.trim_start_matches(' ');
        let depth = (line.len() - content.len()) / 2;
        let trimmed = content.trim();

        if trimmed.is_empty() || trimmed == HEADER {
            continue;
        }

        if let Some(rest) = content.strip_prefix(FOLDER_MARK) {
            close_to_depth(&mut open, &mut roots, depth);
            open.push((depth, FolderNode::new(new_id(), marker_title(rest))));
            link_pending = false;
        } else if let Some(rest) = content.strip_prefix(LINK_MARK) {
            match open.last_mut() {
                Some((_, folder)) => {
                    folder
                        .links
                        .push(LinkEntry::new(new_id(), marker_title(rest), ""));
                    link_pending = true;
                }
                None => skipped_lines += 1,
            }
        } else if trimmed.starts_with("http") {
            let target = match (link_pending, open.last_mut()) {
                (true, Some((_, folder))) => folder.links.last_mut(),
                _ => None,
            };
            match target {
                Some(link) => {
                    link.url = content.trim_end_matches('\r').to_string();
                    link_pending = false;
                }
                None => skipped_lines += 1,
            }
        } else {
            skipped_lines += 1;
        }
    }
    close_to_depth(&mut open, &mut roots, 0);

    if skipped_lines > 0 {
        log::warn!("text import: ignored {} unrecognised lines", skipped_lines);
    }

    DecodeOutcome {
        tree: roots,
        skipped_lines,
    }
}

/// Title after the marker, minus the single separating space.
fn marker_title(rest: &str) -> String {
    rest.strip_prefix(' ').unwrap_or(rest).to_string()
}

fn close_to_depth(open: &mut Vec<(usize, FolderNode)>, roots: &mut Tree, depth: usize) {
    while open.last().is_some_and(|(d, _)| *d >= depth) {
        if let Some((_, folder)) = open.pop() {
            match open.last_mut() {
                Some((_, parent)) => parent.children.push(folder),
                None => roots.push(folder),
            }
        }
    }
}
