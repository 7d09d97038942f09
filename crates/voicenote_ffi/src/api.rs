//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note and theme operations over one process-wide `NoteStore`.
//! - Flatten core results into simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - When the database cannot be opened, notes live in memory for the rest of
//!   the process.

use log::error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use voicenote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    KeyValueStore, MemoryKeyValueStore, Note, NoteId, NoteStore, NoteStoreError,
    SqliteKeyValueStore, ThemePreference,
};

const DB_FILE_NAME: &str = "voicenote.sqlite3";
const DB_PATH_ENV: &str = "VOICENOTE_DB_PATH";

static NOTES_STATE: OnceLock<Mutex<NotesState>> = OnceLock::new();

struct NotesState {
    notes: NoteStore,
    theme: ThemePreference,
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Note projection returned to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteItem {
    pub id: i64,
    pub text: String,
    /// Creation display timestamp, with edit markers.
    pub created_at: String,
    pub pinned: bool,
    pub gradient: String,
    pub rotation: f64,
}

/// Response envelope for single-note commands.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteActionResponse {
    pub ok: bool,
    /// Affected note, when it still exists.
    pub note: Option<NoteItem>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Option<Note>) -> Self {
        Self {
            ok: true,
            note: note.map(to_note_item),
            message: message.into(),
        }
    }

    fn failure(operation: &str, err: NoteStoreError) -> Self {
        Self {
            ok: false,
            note: None,
            message: format!("{operation} failed: {err}"),
        }
    }
}

/// Lists notes in display order: pinned first, then newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> Vec<NoteItem> {
    with_state(|state| state.notes.list().into_iter().map(to_note_item).collect())
}

/// Creates a note. Blank text is rejected without side effects.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(text: String) -> NoteActionResponse {
    with_state(|state| match state.notes.create(&text) {
        Ok(note) => NoteActionResponse::success("Note created.", Some(note)),
        Err(err) => NoteActionResponse::failure("note_create", err),
    })
}

/// Replaces note text and marks it edited.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(id: i64, text: String) -> NoteActionResponse {
    with_state(|state| match state.notes.update(NoteId(id), &text) {
        Ok(note) => NoteActionResponse::success("Note updated.", Some(note)),
        Err(err) => NoteActionResponse::failure("note_update", err),
    })
}

/// Deletes a note. Unknown ids succeed as a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: i64) -> NoteActionResponse {
    with_state(|state| {
        if state.notes.delete(NoteId(id)) {
            NoteActionResponse::success("Note deleted.", None)
        } else {
            NoteActionResponse::success("Note already removed.", None)
        }
    })
}

/// Flips the pinned flag.
#[flutter_rust_bridge::frb(sync)]
pub fn note_toggle_pin(id: i64) -> NoteActionResponse {
    with_state(|state| match state.notes.toggle_pin(NoteId(id)) {
        Ok(note) => NoteActionResponse::success("Note pin toggled.", Some(note)),
        Err(err) => NoteActionResponse::failure("note_toggle_pin", err),
    })
}

/// Returns the persisted dark-mode flag.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_is_dark() -> bool {
    with_state(|state| state.theme.is_dark())
}

/// Persists the dark-mode flag. Returns an empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_set_dark(dark: bool) -> String {
    with_state(|state| match state.theme.set(dark) {
        Ok(()) => String::new(),
        Err(err) => format!("theme_set_dark failed: {err}"),
    })
}

fn with_state<T>(f: impl FnOnce(&mut NotesState) -> T) -> T {
    let state = NOTES_STATE.get_or_init(|| Mutex::new(open_state()));
    let mut guard: MutexGuard<'_, NotesState> =
        state.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut *guard)
}

fn open_state() -> NotesState {
    let db_path = resolve_db_path();
    let storage: Arc<dyn KeyValueStore> = match SqliteKeyValueStore::open(&db_path) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            error!(
                "event=ffi_open module=ffi status=error error_code=storage_unavailable path={} error={}",
                db_path.display(),
                err
            );
            Arc::new(MemoryKeyValueStore::new())
        }
    };

    let mut notes = NoteStore::new(Arc::clone(&storage));
    notes.load();
    NotesState {
        notes,
        theme: ThemePreference::load(storage),
    }
}

fn resolve_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

fn to_note_item(note: Note) -> NoteItem {
    NoteItem {
        id: note.id.value(),
        text: note.text,
        created_at: note.created_at,
        pinned: note.pinned,
        gradient: note.presentation.gradient,
        rotation: note.presentation.rotation,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, note_create, note_delete, note_toggle_pin, note_update,
        notes_list, ping,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_arguments() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn created_note_is_listed_and_editable() {
        let token = unique_token("ffi-create");
        let created = note_create(format!("  {token}  "));
        assert!(created.ok, "{}", created.message);
        let note = created.note.expect("create should return the note");
        assert_eq!(note.text, token);

        let updated = note_update(note.id, format!("{token} v2"));
        assert!(updated.ok, "{}", updated.message);
        assert!(updated
            .note
            .expect("update should return the note")
            .created_at
            .ends_with(" (edited)"));

        assert!(notes_list().iter().any(|item| item.id == note.id));
    }

    #[test]
    fn blank_create_is_rejected() {
        let response = note_create("   ".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("empty"));
    }

    #[test]
    fn pinned_note_lists_before_unpinned() {
        let pinned = note_create(unique_token("ffi-pin"))
            .note
            .expect("create should return the note");
        let toggled = note_toggle_pin(pinned.id);
        assert!(toggled.ok, "{}", toggled.message);

        let listed = notes_list();
        let first_unpinned = listed.iter().position(|item| !item.pinned);
        let pinned_at = listed
            .iter()
            .position(|item| item.id == pinned.id)
            .expect("pinned note should be listed");
        if let Some(first_unpinned) = first_unpinned {
            assert!(pinned_at < first_unpinned);
        }
    }

    #[test]
    fn delete_is_idempotent_and_unknown_update_fails() {
        let note = note_create(unique_token("ffi-delete"))
            .note
            .expect("create should return the note");
        assert!(note_delete(note.id).ok);
        assert!(note_delete(note.id).ok);
        assert!(!notes_list().iter().any(|item| item.id == note.id));

        let response = note_update(note.id, "gone".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("not found"));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
