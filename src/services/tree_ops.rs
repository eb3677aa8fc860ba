//! Structural operations on the link forest: sibling reordering, recursive
//! sorting and pruning of empty folders.

use crate::services::tree_index::{locate_folder_mut, locate_link_owner_mut};
use crate::types::link_tree::{FolderNode, Tree};

/// Direction for a one-step sibling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Up,
    Down,
}

/// Swaps two entries in place. Out-of-range indices make this a no-op.
pub fn swap_siblings<T>(items: &mut [T], i: usize, j: usize) {
    if i < items.len() && j < items.len() {
        items.swap(i, j);
    }
}

fn neighbour(index: usize, shift: Shift) -> Option<usize> {
    match shift {
        Shift::Up => index.checked_sub(1),
        Shift::Down => index.checked_add(1),
    }
}

/// Swaps a folder with its previous or next sibling.
///
/// Returns `false` when the folder is missing or already at that edge.
pub fn shift_folder(tree: &mut Vec<FolderNode>, id: &str, shift: Shift) -> bool {
    let Some(slot) = locate_folder_mut(tree, id) else {
        return false;
    };
    let (siblings, index) = (slot.siblings, slot.index);
    match neighbour(index, shift) {
        Some(other) if other < siblings.len() => {
            swap_siblings(siblings, index, other);
            true
        }
        _ => false,
    }
}

/// Swaps a link with its previous or next sibling inside the same folder.
pub fn shift_link(tree: &mut [FolderNode], link_id: &str, shift: Shift) -> bool {
    let Some((owner, index)) = locate_link_owner_mut(tree, link_id) else {
        return false;
    };
    match neighbour(index, shift) {
        Some(other) if other < owner.links.len() => {
            swap_siblings(&mut owner.links, index, other);
            true
        }
        _ => false,
    }
}

/// Sorts every folder list and every link list by case-insensitive title,
/// root list included.
///
/// The sort is stable, so entries with equal titles keep their prior
/// relative order. There is no secondary key: which of two equal titles
/// ends up first depends only on where they were before sorting.
pub fn sort_tree_in_place(tree: &mut [FolderNode]) {
    tree.sort_by_cached_key(|f| f.title.to_lowercase());
    for folder in tree.iter_mut() {
        folder.links.sort_by_cached_key(|l| l.title.to_lowercase());
        sort_tree_in_place(&mut folder.children);
    }
}

/// Returns a copy of the forest without empty folders.
///
/// Pruning is bottom-up: a folder whose sub-folders all turn out empty is
/// itself empty once they are gone, and is removed too.
pub fn prune_empty_folders(tree: &[FolderNode]) -> Tree {
    tree.iter()
        .filter_map(|folder| {
            let children = prune_empty_folders(&folder.children);
            if children.is_empty() && folder.links.is_empty() {
                return None;
            }
            Some(FolderNode {
                id: folder.id.clone(),
                title: folder.title.clone(),
                children,
                links: folder.links.clone(),
            })
        })
        .collect()
}
