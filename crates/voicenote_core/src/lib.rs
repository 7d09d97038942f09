//! Core domain logic for VoiceNote.
//! This crate is the single source of truth for note lifecycle invariants.

pub mod capability;
pub mod db;
pub mod dictation;
pub mod logging;
pub mod model;
pub mod preference;
pub mod session;
pub mod storage;
pub mod store;

pub use capability::clock::{Clock, SystemClock};
pub use capability::effects::{CelebrationEffect, Clipboard, NoCelebration};
pub use capability::storage::{KeyValueStore, StorageError, DARK_MODE_KEY, NOTES_KEY};
pub use capability::transcription::TranscriptionEngine;
pub use dictation::buffer::InputBuffer;
pub use dictation::session::{
    DictationCallbacks, DictationError, DictationSession, DictationState,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteId, Presentation, EDITED_MARKER};
pub use preference::ThemePreference;
pub use session::{CopyOutcome, NotesSession, COPY_CONFIRMATION};
pub use storage::memory::MemoryKeyValueStore;
pub use storage::sqlite::SqliteKeyValueStore;
pub use store::note_store::{
    EditSession, LoadOutcome, NoteStore, NoteStoreError, PersistenceError,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
