//! Lookup and structural mutation primitives for the link forest.
//!
//! Every locate function answers "which container owns this node and at
//! which index", so callers can remove, replace or insert next to it with a
//! single write. A missing id is `None`, never a panic or an error.

use std::fmt;

use crate::types::errors::TreeError;
use crate::types::link_tree::{FolderNode, FolderPosition, LinkEntry, LinkPosition};

/// Mutable view of the container that directly holds a folder.
#[derive(Debug)]
pub struct FolderSlot<'a> {
    /// The root list or the parent's `children`.
    pub siblings: &'a mut Vec<FolderNode>,
    pub index: usize,
    /// `None` when the folder is a root.
    pub parent_id: Option<String>,
}

/// A rejected insert hands the node back so it is never lost.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertError<T> {
    pub error: TreeError,
    pub item: T,
}

impl<T> fmt::Display for InsertError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl<T: fmt::Debug> std::error::Error for InsertError<T> {}

// --- Folders ---

/// Depth-first search for a folder's position.
pub fn locate_folder(tree: &[FolderNode], id: &str) -> Option<FolderPosition> {
    fn walk(siblings: &[FolderNode], parent_id: Option<&str>, id: &str) -> Option<FolderPosition> {
        if let Some(index) = siblings.iter().position(|f| f.id == id) {
            return Some(FolderPosition {
                parent_id: parent_id.map(str::to_string),
                index,
            });
        }
        siblings
            .iter()
            .find_map(|f| walk(&f.children, Some(f.id.as_str()), id))
    }
    walk(tree, None, id)
}

/// Like [`locate_folder`], but returns the owning container for in-place edits.
pub fn locate_folder_mut<'a>(tree: &'a mut Vec<FolderNode>, id: &str) -> Option<FolderSlot<'a>> {
    fn walk<'a>(
        siblings: &'a mut Vec<FolderNode>,
        parent_id: Option<&str>,
        id: &str,
    ) -> Option<FolderSlot<'a>> {
        if let Some(index) = siblings.iter().position(|f| f.id == id) {
            return Some(FolderSlot {
                siblings,
                index,
                parent_id: parent_id.map(str::to_string),
            });
        }
        for folder in siblings.iter_mut() {
            let FolderNode {
                id: folder_id,
                children,
                ..
            } = folder;
            if let Some(slot) = walk(children, Some(folder_id.as_str()), id) {
                return Some(slot);
            }
        }
        None
    }
    walk(tree, None, id)
}

pub fn find_folder<'a>(tree: &'a [FolderNode], id: &str) -> Option<&'a FolderNode> {
    for folder in tree {
        if folder.id == id {
            return Some(folder);
        }
        if let Some(found) = find_folder(&folder.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_folder_mut<'a>(tree: &'a mut [FolderNode], id: &str) -> Option<&'a mut FolderNode> {
    for folder in tree.iter_mut() {
        if folder.id == id {
            return Some(folder);
        }
        if let Some(found) = find_folder_mut(&mut folder.children, id) {
            return Some(found);
        }
    }
    None
}

/// Removes a folder (root or nested) and returns it with its subtree intact.
pub fn detach_folder(tree: &mut Vec<FolderNode>, id: &str) -> Option<FolderNode> {
    let slot = locate_folder_mut(tree, id)?;
    Some(slot.siblings.remove(slot.index))
}

/// Inserts `node` under `parent_id` (or at the root when `None`).
///
/// `index` is clamped to the end of the target list. The insert is refused
/// if the parent does not exist or lies inside `node` itself.
pub fn insert_folder(
    tree: &mut Vec<FolderNode>,
    parent_id: Option<&str>,
    index: usize,
    node: FolderNode,
) -> Result<(), InsertError<FolderNode>> {
    let siblings = match parent_id {
        None => tree,
        Some(pid) => {
            if node.contains_folder(pid) {
                return Err(InsertError {
                    error: TreeError::CycleDetected(node.id.clone()),
                    item: node,
                });
            }
            match find_folder_mut(tree, pid) {
                Some(parent) => &mut parent.children,
                None => {
                    return Err(InsertError {
                        error: TreeError::NotFound(pid.to_string()),
                        item: node,
                    })
                }
            }
        }
    };
    let index = index.min(siblings.len());
    siblings.insert(index, node);
    Ok(())
}

/// Moves a folder to `index` within `new_parent_id`'s children.
///
/// The index is interpreted after the folder has been removed from its old
/// place. Moving a folder into itself or one of its descendants is rejected
/// before anything is touched.
pub fn move_folder(
    tree: &mut Vec<FolderNode>,
    id: &str,
    new_parent_id: Option<&str>,
    index: usize,
) -> Result<(), TreeError> {
    let node = find_folder(tree, id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    if let Some(pid) = new_parent_id {
        if node.contains_folder(pid) {
            return Err(TreeError::CycleDetected(id.to_string()));
        }
        if find_folder(tree, pid).is_none() {
            return Err(TreeError::NotFound(pid.to_string()));
        }
    }

    let node = detach_folder(tree, id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    insert_folder(tree, new_parent_id, index, node).map_err(|e| e.error)
}

// --- Links ---

/// Finds the folder that owns a link and the link's index in it.
pub fn locate_link_owner(tree: &[FolderNode], link_id: &str) -> Option<LinkPosition> {
    for folder in tree {
        if let Some(index) = folder.links.iter().position(|l| l.id == link_id) {
            return Some(LinkPosition {
                folder_id: folder.id.clone(),
                index,
            });
        }
        if let Some(found) = locate_link_owner(&folder.children, link_id) {
            return Some(found);
        }
    }
    None
}

/// Like [`locate_link_owner`], returning the owning folder itself.
pub fn locate_link_owner_mut<'a>(
    tree: &'a mut [FolderNode],
    link_id: &str,
) -> Option<(&'a mut FolderNode, usize)> {
    for folder in tree.iter_mut() {
        if let Some(index) = folder.links.iter().position(|l| l.id == link_id) {
            return Some((folder, index));
        }
        if let Some(found) = locate_link_owner_mut(&mut folder.children, link_id) {
            return Some(found);
        }
    }
    None
}

pub fn find_link<'a>(tree: &'a [FolderNode], link_id: &str) -> Option<&'a LinkEntry> {
    let pos = locate_link_owner(tree, link_id)?;
    find_folder(tree, &pos.folder_id).map(|f| &f.links[pos.index])
}

pub fn find_link_mut<'a>(tree: &'a mut [FolderNode], link_id: &str) -> Option<&'a mut LinkEntry> {
    let (owner, index) = locate_link_owner_mut(tree, link_id)?;
    owner.links.get_mut(index)
}

pub fn detach_link(tree: &mut [FolderNode], link_id: &str) -> Option<LinkEntry> {
    let (owner, index) = locate_link_owner_mut(tree, link_id)?;
    Some(owner.links.remove(index))
}

/// Inserts `link` into `folder_id`'s links at `index` (clamped).
pub fn insert_link(
    tree: &mut [FolderNode],
    folder_id: &str,
    index: usize,
    link: LinkEntry,
) -> Result<(), InsertError<LinkEntry>> {
    match find_folder_mut(tree, folder_id) {
        Some(folder) => {
            let index = index.min(folder.links.len());
            folder.links.insert(index, link);
            Ok(())
        }
        None => Err(InsertError {
            error: TreeError::NotFound(folder_id.to_string()),
            item: link,
        }),
    }
}

/// Moves a link into `folder_id` at `index`, counted after removal.
pub fn move_link(
    tree: &mut [FolderNode],
    link_id: &str,
    folder_id: &str,
    index: usize,
) -> Result<(), TreeError> {
    if find_folder(tree, folder_id).is_none() {
        return Err(TreeError::NotFound(folder_id.to_string()));
    }
    let link = detach_link(tree, link_id).ok_or_else(|| TreeError::NotFound(link_id.to_string()))?;
    insert_link(tree, folder_id, index, link).map_err(|e| e.error)
}
