// Link tree state managers
// Managers hold session state: the draft/snapshot pair, the tree store and
// the editing session built on top of them.

pub mod draft_state;
pub mod link_tree_manager;
pub mod tree_store;
