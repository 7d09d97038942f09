//! Domain model for persisted notes.
//!
//! # Responsibility
//! - Define the canonical `Note` record and its persisted wire shape.
//! - Keep identity, text, timestamp and cosmetic fields in one place.
//!
//! # Invariants
//! - Every note is identified by a `NoteId` that is never reused.
//! - Deletion is a hard removal; there are no tombstones.

pub mod note;
