//! Key-value store implementations.
//!
//! # Responsibility
//! - Provide concrete [`KeyValueStore`](crate::capability::storage::KeyValueStore)
//!   backends: process memory and SQLite.
//!
//! # Invariants
//! - Writes replace the full value for a key (last write wins).
//! - Absent keys read back as `None`, never as an error.

pub mod memory;
pub mod sqlite;
