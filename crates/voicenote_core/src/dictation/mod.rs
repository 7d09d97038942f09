//! Dictation integration.
//!
//! # Responsibility
//! - Drive a [`TranscriptionEngine`](crate::capability::transcription::TranscriptionEngine)
//!   through an explicit `Unsupported | Idle | Recording` state machine.
//! - Stream cumulative transcripts into the shared input buffer.
//!
//! # Invariants
//! - Availability is probed once, at construction.
//! - The recording flag is forced to `false` by stop, error and end signals,
//!   and stale signals from a previous session never set it.

pub mod buffer;
pub mod session;
