use serde::{Deserialize, Serialize};

/// Top-level engine settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EngineSettings {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub editor: EditorSettings,
}

/// Where the tree and its backup live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    /// SQLite file; `None` means the platform data directory.
    pub database_path: Option<String>,
    pub tree_key: String,
    pub backup_key: String,
    /// When set, saves go to this JSON file instead of the database.
    pub bound_file: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: None,
            tree_key: "link_tree".to_string(),
            backup_key: "link_tree_backup".to_string(),
            bound_file: None,
        }
    }
}

/// Editing behavior applied on save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EditorSettings {
    pub prune_on_save: bool,
    pub sort_on_save: bool,
}
