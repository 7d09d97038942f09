//! Session context tying input, notes, dictation and theme together.
//!
//! # Responsibility
//! - Own the state a UI shell would otherwise keep as ambient globals: the
//!   input buffer, the edit pointer (inside `NoteStore`), the recording flag
//!   (inside `DictationSession`) and the theme flag.
//! - Implement the commit and copy-to-clipboard flows.
//!
//! # Invariants
//! - The input buffer is cleared only after a successful commit.
//! - `NoteStore` and `DictationSession` share nothing but the input buffer.

use crate::capability::effects::Clipboard;
use crate::capability::transcription::TranscriptionEngine;
use crate::dictation::buffer::InputBuffer;
use crate::dictation::session::{DictationError, DictationSession, DictationState};
use crate::model::note::{Note, NoteId};
use crate::preference::ThemePreference;
use crate::store::note_store::{LoadOutcome, NoteStore, NoteStoreError};
use log::{info, warn};

/// Confirmation reported after a successful copy.
pub const COPY_CONFIRMATION: &str = "Note copied to clipboard!";

/// Result of a copy-to-clipboard request for an existing note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Text reached the clipboard; carries the confirmation message.
    Copied(&'static str),
    /// Clipboard write failed; carries the cause.
    Failed(String),
}

/// One user session over a note collection.
pub struct NotesSession {
    notes: NoteStore,
    dictation: DictationSession,
    input: InputBuffer,
    theme: ThemePreference,
    clipboard: Option<Box<dyn Clipboard>>,
    startup: LoadOutcome,
}

impl NotesSession {
    /// Rehydrates `notes` and the theme flag, and probes `engine`.
    pub fn open(mut notes: NoteStore, engine: Option<Box<dyn TranscriptionEngine>>) -> Self {
        let startup = notes.load();
        let theme = ThemePreference::load(notes.storage());
        let input = InputBuffer::new();
        let dictation = DictationSession::new(engine, input.clone());
        info!(
            "event=session_open module=session status=ok notes={} dictation={:?}",
            notes.len(),
            dictation.state()
        );
        Self {
            notes,
            dictation,
            input,
            theme,
            clipboard: None,
            startup,
        }
    }

    /// Installs the clipboard used by [`NotesSession::copy_note`].
    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Some(Box::new(clipboard));
        self
    }

    /// Outcome of the startup load.
    pub fn startup_outcome(&self) -> &LoadOutcome {
        &self.startup
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    /// Replaces the input buffer with typed text.
    pub fn set_input(&self, text: impl Into<String>) {
        self.input.set(text);
    }

    /// Hands the current input to the store and clears it on success.
    ///
    /// # Errors
    /// - `EmptyInput` when the buffer is blank; the buffer is left as is.
    pub fn commit_input(&mut self) -> Result<Note, NoteStoreError> {
        let snapshot = self.input.snapshot();
        let note = self.notes.create(&snapshot)?;
        self.input.clear();
        Ok(note)
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut NoteStore {
        &mut self.notes
    }

    pub fn dictation(&self) -> &DictationSession {
        &self.dictation
    }

    pub fn dictation_mut(&mut self) -> &mut DictationSession {
        &mut self.dictation
    }

    /// Starts or stops dictation and returns the resulting state.
    pub fn toggle_dictation(&mut self) -> Result<DictationState, DictationError> {
        self.dictation.toggle()
    }

    pub fn is_dark_mode(&self) -> bool {
        self.theme.is_dark()
    }

    /// Flips dark mode. A failed write is logged; the new flag still applies.
    pub fn toggle_dark_mode(&mut self) -> bool {
        if let Err(err) = self.theme.toggle() {
            warn!("event=theme_save module=session status=error error={err}");
        }
        self.theme.is_dark()
    }

    /// Copies a note's text to the clipboard.
    ///
    /// # Errors
    /// - `NotFound` when no note has `id`.
    pub fn copy_note(&self, id: NoteId) -> Result<CopyOutcome, NoteStoreError> {
        let note = self.notes.get(id).ok_or(NoteStoreError::NotFound(id))?;
        let Some(clipboard) = self.clipboard.as_ref() else {
            warn!("event=note_copy module=session status=error note_id={id} error=no_clipboard");
            return Ok(CopyOutcome::Failed("clipboard unavailable".to_string()));
        };

        match clipboard.write_text(&note.text) {
            Ok(()) => {
                info!("event=note_copy module=session status=ok note_id={id}");
                Ok(CopyOutcome::Copied(COPY_CONFIRMATION))
            }
            Err(cause) => {
                warn!("event=note_copy module=session status=error note_id={id} error={cause}");
                Ok(CopyOutcome::Failed(cause))
            }
        }
    }
}
