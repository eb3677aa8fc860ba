use std::fmt;

// === TreeError ===

/// Errors raised by structural edits on the link tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// No folder or link with the given ID exists in the tree.
    NotFound(String),
    /// The move would place a folder inside its own subtree.
    CycleDetected(String),
    /// Paste was requested but nothing is held.
    MoveBufferEmpty,
    /// A cut was requested while another node is still held.
    MoveBufferOccupied(String),
    /// Links must live inside a folder, never at the forest root.
    LinkNeedsFolder,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::NotFound(id) => write!(f, "Tree node not found: {}", id),
            TreeError::CycleDetected(id) => {
                write!(f, "Cannot move folder into its own subtree: {}", id)
            }
            TreeError::MoveBufferEmpty => write!(f, "Nothing is held for pasting"),
            TreeError::MoveBufferOccupied(id) => {
                write!(f, "Move buffer already holds: {}", id)
            }
            TreeError::LinkNeedsFolder => write!(f, "Links must be placed inside a folder"),
        }
    }
}

impl std::error::Error for TreeError {}

// === StorageError ===

/// Errors from the persistence backend or a bound file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Database operation failed.
    DatabaseError(String),
    /// File read or write failed.
    IoError(String),
    /// Stored tree could not be serialized or parsed.
    SerializationError(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::DatabaseError(msg) => write!(f, "Storage database error: {}", msg),
            StorageError::IoError(msg) => write!(f, "Storage I/O error: {}", msg),
            StorageError::SerializationError(msg) => {
                write!(f, "Storage serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StorageError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === LinkTreeError ===

/// Errors surfaced by the editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTreeError {
    /// A structural edit was rejected.
    Tree(TreeError),
    /// Loading or saving failed; the draft is left untouched.
    Storage(StorageError),
    /// Imported content could not be read at all.
    InvalidImport(String),
    /// Saving while a cut node is held would silently drop it.
    MoveInProgress(String),
}

impl fmt::Display for LinkTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTreeError::Tree(e) => write!(f, "{}", e),
            LinkTreeError::Storage(e) => write!(f, "{}", e),
            LinkTreeError::InvalidImport(msg) => write!(f, "Invalid import: {}", msg),
            LinkTreeError::MoveInProgress(id) => {
                write!(f, "Paste or discard the held node before saving: {}", id)
            }
        }
    }
}

impl std::error::Error for LinkTreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LinkTreeError::Tree(e) => Some(e),
            LinkTreeError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TreeError> for LinkTreeError {
    fn from(e: TreeError) -> Self {
        LinkTreeError::Tree(e)
    }
}

impl From<StorageError> for LinkTreeError {
    fn from(e: StorageError) -> Self {
        LinkTreeError::Storage(e)
    }
}
