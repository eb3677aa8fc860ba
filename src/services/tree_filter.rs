//! Search projection over the link forest.

use crate::types::link_tree::{FolderNode, LinkEntry, Tree};

/// Returns the part of `tree` that matches `query`.
///
/// An empty (or all-whitespace) query yields a full copy. Otherwise a link
/// matches when its title or url contains the query, ignoring case, and a
/// folder is kept when its title matches, it has a matching link, or one of
/// its filtered children survived. Kept folders carry only their matching
/// links and surviving children. The source tree is never modified.
pub fn filter_tree(tree: &[FolderNode], query: &str) -> Tree {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tree.to_vec();
    }
    filter_folders(tree, &needle)
}

fn filter_folders(folders: &[FolderNode], needle: &str) -> Tree {
    folders
        .iter()
        .filter_map(|folder| {
            let links: Vec<LinkEntry> = folder
                .links
                .iter()
                .filter(|link| link_matches(link, needle))
                .cloned()
                .collect();
            let children = filter_folders(&folder.children, needle);
            let title_matches = folder.title.to_lowercase().contains(needle);

            if !title_matches && links.is_empty() && children.is_empty() {
                return None;
            }
            Some(FolderNode {
                id: folder.id.clone(),
                title: folder.title.clone(),
                children,
                links,
            })
        })
        .collect()
}

fn link_matches(link: &LinkEntry, needle: &str) -> bool {
    link.title.to_lowercase().contains(needle) || link.url.to_lowercase().contains(needle)
}
