//! linktree — a personal hierarchy of links edited as a draft and committed
//! with a one-generation backup.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod database;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
