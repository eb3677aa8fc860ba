//! Tree Store for the link tree.
//!
//! Defines the `TreeStore` contract (primary slot plus a single backup
//! slot) and implements it over the SQLite key-value table.

use std::sync::Arc;

use serde_json::Value;

use crate::database::connection::Database;
use crate::types::errors::StorageError;
use crate::types::link_tree::FolderNode;

/// Durable storage for the tree and its one-generation backup.
///
/// Reads return the raw stored value; callers normalize before use.
pub trait TreeStore {
    fn read_persisted(&self) -> Result<Option<Value>, StorageError>;
    fn write_persisted(&self, tree: &[FolderNode]) -> Result<(), StorageError>;
    fn read_backup(&self) -> Result<Option<Value>, StorageError>;
    fn write_backup(&self, tree: &[FolderNode]) -> Result<(), StorageError>;
}

/// Tree store backed by the `kv_store` table.
pub struct SqliteTreeStore {
    db: Arc<Database>,
    tree_key: String,
    backup_key: String,
}

impl SqliteTreeStore {
    /// Creates a store using the default `link_tree` / `link_tree_backup` keys.
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_keys(db, "link_tree", "link_tree_backup")
    }

    pub fn with_keys(db: Arc<Database>, tree_key: &str, backup_key: &str) -> Self {
        Self {
            db,
            tree_key: tree_key.to_string(),
            backup_key: backup_key.to_string(),
        }
    }

    fn read(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let raw = self
            .db
            .get_value(key)
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        match raw {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| StorageError::SerializationError(format!("{}: {}", key, e))),
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, tree: &[FolderNode]) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(tree).map_err(|e| StorageError::SerializationError(e.to_string()))?;
        self.db
            .put_value(key, &json)
            .map_err(|e| StorageError::DatabaseError(e.to_string()))
    }
}

impl TreeStore for SqliteTreeStore {
    fn read_persisted(&self) -> Result<Option<Value>, StorageError> {
        self.read(&self.tree_key)
    }

    fn write_persisted(&self, tree: &[FolderNode]) -> Result<(), StorageError> {
        self.write(&self.tree_key, tree)
    }

    fn read_backup(&self) -> Result<Option<Value>, StorageError> {
        self.read(&self.backup_key)
    }

    fn write_backup(&self, tree: &[FolderNode]) -> Result<(), StorageError> {
        self.write(&self.backup_key, tree)
    }
}
