//! Link tree database layer.
//!
//! Provides SQLite connection management, schema migrations and a small
//! key-value API used by the tree store.
//!
//! # Usage
//!
//! ```no_run
//! use linktree::database::Database;
//!
//! let db = Database::open("linktree.db").expect("failed to open database");
//! db.put_value("link_tree", "[]").expect("write failed");
//! assert_eq!(db.get_value("link_tree").unwrap().as_deref(), Some("[]"));
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
