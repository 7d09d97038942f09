//! Canonical note collection and its derived views.
//!
//! # Responsibility
//! - Own the in-memory note collection and every mutation on it.
//! - Persist the collection through the key-value capability.
//!
//! # Invariants
//! - The display order is derived on every query and never stored.
//! - At most one note is under edit at any time.

pub mod note_store;
pub mod palette;
