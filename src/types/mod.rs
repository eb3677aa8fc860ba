// Link tree shared type definitions
// Each submodule defines types used across the crate.

pub mod errors;
pub mod link_tree;
pub mod settings;
