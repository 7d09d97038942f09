//! Shared staging buffer for typed and dictated input.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to the current input text.
///
/// Typing and transcription callbacks write through the same handle; the
/// last write wins.
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    text: Arc<Mutex<String>>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole buffer.
    pub fn set(&self, text: impl Into<String>) {
        *self.guard() = text.into();
    }

    /// Returns a copy of the current text.
    pub fn snapshot(&self) -> String {
        self.guard().clone()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn is_blank(&self) -> bool {
        self.guard().trim().is_empty()
    }

    fn guard(&self) -> MutexGuard<'_, String> {
        self.text.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
