//! Identifier source for new folders and links.

use uuid::Uuid;

/// Returns a fresh identifier, unique for the life of the process and beyond.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
