//! Dictation session state machine.
//!
//! # Responsibility
//! - Own the single transcription engine handle, reused across start/stop
//!   cycles.
//! - Expose result/error/end callbacks through a cloneable handle.
//!
//! # Invariants
//! - `start` while recording never opens a second session.
//! - `stop` does not block on the engine.
//! - Each session generation leaves `Recording` at most once.

use crate::capability::transcription::TranscriptionEngine;
use crate::dictation::buffer::InputBuffer;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Message recorded when no engine is available.
pub const UNSUPPORTED_MESSAGE: &str = "Speech recognition not supported in this environment";
/// Message recorded when the engine refuses to start capturing.
pub const START_FAILED_MESSAGE: &str =
    "Failed to start recording. Make sure microphone permissions are granted.";

/// Observable dictation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictationState {
    /// No usable engine; terminal.
    Unsupported,
    Idle,
    Recording,
}

/// Dictation failures surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationError {
    /// The environment has no usable transcription engine.
    Unsupported(String),
    /// The engine could not begin capturing.
    StartFailed(String),
}

impl Display for DictationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported(reason) => write!(f, "dictation unsupported: {reason}"),
            Self::StartFailed(cause) => write!(f, "dictation failed to start: {cause}"),
        }
    }
}

impl Error for DictationError {}

#[derive(Debug, Default)]
struct SharedState {
    recording: bool,
    generation: u64,
    last_error: Option<String>,
}

fn lock(shared: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Callback slots handed to the engine for one session.
///
/// Safe to clone and call from any thread. Signals from a session that has
/// since been replaced do not touch the recording flag.
#[derive(Debug, Clone)]
pub struct DictationCallbacks {
    shared: Arc<Mutex<SharedState>>,
    buffer: InputBuffer,
    generation: u64,
}

impl DictationCallbacks {
    /// Replaces the input buffer with the cumulative transcript.
    ///
    /// The state lock is held across the write so a newer session cannot
    /// begin between the generation check and the buffer update.
    pub fn on_result(&self, transcript: &str) {
        let state = lock(&self.shared);
        if state.generation != self.generation {
            debug!(
                "event=dictation_result module=dictation status=stale generation={}",
                self.generation
            );
            return;
        }
        self.buffer.set(transcript);
    }

    /// Records the engine error and leaves `Recording`.
    pub fn on_error(&self, code: &str) {
        let mut state = lock(&self.shared);
        if state.generation != self.generation {
            debug!(
                "event=dictation_error module=dictation status=stale generation={} code={code}",
                self.generation
            );
            return;
        }
        state.last_error = Some(format!("Error: {code}"));
        state.recording = false;
        warn!(
            "event=dictation_error module=dictation status=error generation={} code={code}",
            self.generation
        );
    }

    /// Handles engine termination for any reason.
    pub fn on_end(&self) {
        let mut state = lock(&self.shared);
        if state.generation != self.generation || !state.recording {
            return;
        }
        state.recording = false;
        info!(
            "event=dictation_end module=dictation status=ok generation={}",
            self.generation
        );
    }
}

/// Start/stop wrapper around one transcription engine.
pub struct DictationSession {
    engine: Option<Box<dyn TranscriptionEngine>>,
    unsupported_reason: Option<String>,
    shared: Arc<Mutex<SharedState>>,
    buffer: InputBuffer,
}

impl DictationSession {
    /// Builds a session and probes `engine` once.
    ///
    /// `None`, or a failed probe, leaves the session `Unsupported` for its
    /// whole lifetime.
    pub fn new(engine: Option<Box<dyn TranscriptionEngine>>, buffer: InputBuffer) -> Self {
        let (engine, unsupported_reason) = match engine {
            Some(mut engine) => match engine.probe() {
                Ok(()) => (Some(engine), None),
                Err(reason) => (None, Some(reason)),
            },
            None => (None, Some(UNSUPPORTED_MESSAGE.to_string())),
        };

        if let Some(reason) = unsupported_reason.as_deref() {
            info!("event=dictation_probe module=dictation status=unsupported reason={reason}");
        } else {
            info!("event=dictation_probe module=dictation status=ok");
        }

        let shared = SharedState {
            last_error: unsupported_reason.clone(),
            ..SharedState::default()
        };
        Self {
            engine,
            unsupported_reason,
            shared: Arc::new(Mutex::new(shared)),
            buffer,
        }
    }

    /// Begins a dictation session.
    ///
    /// Already recording is a no-op success.
    ///
    /// # Errors
    /// - `Unsupported` when no engine passed the probe.
    /// - `StartFailed` when the engine refuses to capture; recording stays
    ///   `false`.
    pub fn start(&mut self) -> Result<(), DictationError> {
        let Some(engine) = self.engine.as_mut() else {
            let reason = self
                .unsupported_reason
                .clone()
                .unwrap_or_else(|| UNSUPPORTED_MESSAGE.to_string());
            return Err(DictationError::Unsupported(reason));
        };

        let callbacks = {
            let mut state = lock(&self.shared);
            if state.recording {
                debug!("event=dictation_start module=dictation status=noop reason=already_recording");
                return Ok(());
            }
            state.last_error = None;
            state.generation += 1;
            // Set before engine start: the engine may signal end/error synchronously.
            state.recording = true;
            DictationCallbacks {
                shared: Arc::clone(&self.shared),
                buffer: self.buffer.clone(),
                generation: state.generation,
            }
        };
        let generation = callbacks.generation;

        if let Err(cause) = engine.start(callbacks) {
            let mut state = lock(&self.shared);
            if state.generation == generation {
                state.recording = false;
                state.last_error = Some(START_FAILED_MESSAGE.to_string());
            }
            warn!(
                "event=dictation_start module=dictation status=error generation={generation} error={cause}"
            );
            return Err(DictationError::StartFailed(cause));
        }

        info!("event=dictation_start module=dictation status=ok generation={generation}");
        Ok(())
    }

    /// Requests the engine to stop and leaves `Recording` immediately.
    ///
    /// Late engine signals for this session keep the flag `false`.
    pub fn stop(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        {
            let mut state = lock(&self.shared);
            if !state.recording {
                return;
            }
            state.recording = false;
        }

        if let Err(cause) = engine.stop() {
            warn!("event=dictation_stop module=dictation status=error error={cause}");
            return;
        }
        info!("event=dictation_stop module=dictation status=ok");
    }

    /// Starts when idle, stops when recording.
    pub fn toggle(&mut self) -> Result<DictationState, DictationError> {
        if self.is_recording() {
            self.stop();
        } else {
            self.start()?;
        }
        Ok(self.state())
    }

    pub fn state(&self) -> DictationState {
        if self.engine.is_none() {
            DictationState::Unsupported
        } else if self.is_recording() {
            DictationState::Recording
        } else {
            DictationState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        lock(&self.shared).recording
    }

    pub fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    /// Last user-facing dictation message, if any.
    pub fn last_error(&self) -> Option<String> {
        lock(&self.shared).last_error.clone()
    }

    /// Input buffer the transcripts are written to.
    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }
}

impl Drop for DictationSession {
    fn drop(&mut self) {
        self.stop();
    }
}
