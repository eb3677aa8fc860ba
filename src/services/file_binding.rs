//! Alternate save target: a plain text file holding the tree as JSON.
//!
//! When a file is bound, loads and saves go through it instead of the
//! key-value store. Bound files get no backup rotation.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::types::errors::StorageError;

/// Minimal text handle the session needs from a bound file.
pub trait TextFileHandle {
    /// Reads the whole file. A file that does not exist yet reads as empty.
    fn read_text(&self) -> Result<String, StorageError>;
    fn write_text(&self, text: &str) -> Result<(), StorageError>;
    /// Human-readable name for logs and prompts.
    fn describe(&self) -> String;
}

/// A file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileHandle {
    path: PathBuf,
}

impl LocalFileHandle {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextFileHandle for LocalFileHandle {
    fn read_text(&self) -> Result<String, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(StorageError::IoError(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Writes through a sibling temp file and a rename so a crash never
    /// leaves a half-written tree behind.
    fn write_text(&self, text: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::IoError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text).map_err(|e| {
            StorageError::IoError(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            StorageError::IoError(format!("Failed to replace {}: {}", self.path.display(), e))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
