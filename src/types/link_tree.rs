use serde::{Deserialize, Serialize};

/// A forest of root folders. Order is display and persisted order.
pub type Tree = Vec<FolderNode>;

/// A folder holding ordered sub-folders and ordered links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FolderNode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub children: Vec<FolderNode>,
    #[serde(default)]
    pub links: Vec<LinkEntry>,
}

impl FolderNode {
    /// Creates an empty folder with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            children: Vec::new(),
            links: Vec::new(),
        }
    }

    /// True when the folder holds neither sub-folders nor links.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.links.is_empty()
    }

    /// Returns true if `id` names this folder or any folder below it.
    pub fn contains_folder(&self, id: &str) -> bool {
        self.id == id || self.children.iter().any(|c| c.contains_folder(id))
    }

    /// Counts this folder plus all descendant folders.
    pub fn folder_count(&self) -> usize {
        1 + self.children.iter().map(FolderNode::folder_count).sum::<usize>()
    }

    /// Counts links in this folder and all descendants.
    pub fn link_count(&self) -> usize {
        self.links.len() + self.children.iter().map(FolderNode::link_count).sum::<usize>()
    }
}

/// A titled link owned by exactly one folder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LinkEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl LinkEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Single-slot cut/paste buffer. Holding a folder and a link at the same
/// time is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MoveBuffer {
    #[default]
    Empty,
    HoldingFolder(FolderNode),
    HoldingLink(LinkEntry),
}

impl MoveBuffer {
    pub fn is_empty(&self) -> bool {
        matches!(self, MoveBuffer::Empty)
    }

    /// Id of the held node, if any.
    pub fn held_id(&self) -> Option<&str> {
        match self {
            MoveBuffer::Empty => None,
            MoveBuffer::HoldingFolder(folder) => Some(&folder.id),
            MoveBuffer::HoldingLink(link) => Some(&link.id),
        }
    }
}

/// Where a folder sits in the forest: its parent (`None` at root) and its
/// index in that parent's `children` (or in the root list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPosition {
    pub parent_id: Option<String>,
    pub index: usize,
}

/// Where a link sits: the owning folder and the index in its `links`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPosition {
    pub folder_id: String,
    pub index: usize,
}

/// Counts folders and links across a whole forest.
pub fn tree_stats(tree: &[FolderNode]) -> (usize, usize) {
    let folders = tree.iter().map(FolderNode::folder_count).sum();
    let links = tree.iter().map(FolderNode::link_count).sum();
    (folders, links)
}
