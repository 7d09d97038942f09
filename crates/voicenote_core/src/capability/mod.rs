//! Capability contracts for external collaborators.
//!
//! # Responsibility
//! - Describe the narrow interfaces the core consumes: key-value persistence,
//!   transcription, celebration effect, clipboard and wall clock.
//! - Keep platform details (browser storage, speech APIs, OS clipboard) out of
//!   core business logic.
//!
//! # Invariants
//! - Capability failures are reported as values; the core never panics on them.

pub mod clock;
pub mod effects;
pub mod storage;
pub mod transcription;
