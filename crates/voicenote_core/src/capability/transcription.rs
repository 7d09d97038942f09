//! Speech-to-text transcription capability.

use crate::dictation::session::DictationCallbacks;

/// Start/stop-able streaming transcription engine.
///
/// The engine reports progress through the [`DictationCallbacks`] handle it
/// receives on `start`. Callbacks may fire from any thread, including from
/// inside `start` itself.
pub trait TranscriptionEngine: Send {
    /// Checks whether the engine can run in the current environment.
    ///
    /// Called once when the dictation session is built. `Err` carries the
    /// user-facing reason the feature is unavailable.
    fn probe(&mut self) -> Result<(), String>;

    /// Begins capturing. Returns the cause when capture cannot begin, for
    /// example on permission denial.
    fn start(&mut self, callbacks: DictationCallbacks) -> Result<(), String>;

    /// Requests cessation. Must not block until the engine actually halts;
    /// the end callback signals that.
    fn stop(&mut self) -> Result<(), String>;
}
