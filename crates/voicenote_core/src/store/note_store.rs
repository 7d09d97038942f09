//! Note lifecycle, ordering and persistence.
//!
//! # Responsibility
//! - Provide create/update/delete/pin APIs over the canonical collection.
//! - Track the single active edit session.
//! - Serialize to and rehydrate from the `notes` storage key.
//!
//! # Invariants
//! - Issued ids strictly increase for the lifetime of the store, across
//!   deletions and reloads.
//! - `list()` yields pinned notes first, then descending id.
//! - Rejected operations leave the collection and storage untouched.
//! - Persistence failures never roll back in-memory state.

use crate::capability::clock::{Clock, SystemClock};
use crate::capability::effects::{CelebrationEffect, NoCelebration};
use crate::capability::storage::{KeyValueStore, StorageError, NOTES_KEY};
use crate::model::note::{Note, NoteId};
use crate::store::palette::random_presentation;
use log::{debug, error, info, warn};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Rejection reasons for note operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteStoreError {
    /// Input text is empty after trimming.
    EmptyInput,
    /// Target note does not exist.
    NotFound(NoteId),
    /// An edit operation was requested with no active edit session.
    NotEditing,
    /// No id above the highest issued one is representable.
    IdExhausted,
}

impl Display for NoteStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "note text must not be empty"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::NotEditing => write!(f, "no note is being edited"),
            Self::IdExhausted => write!(f, "note id space exhausted"),
        }
    }
}

impl Error for NoteStoreError {}

/// Failure to read or write the persisted collection.
#[derive(Debug)]
pub enum PersistenceError {
    /// The storage backend could not be reached.
    Unavailable(StorageError),
    /// Stored data could not be decoded.
    Malformed(String),
    /// The collection could not be encoded.
    Encode(String),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(err) => write!(f, "persistence unavailable: {err}"),
            Self::Malformed(details) => write!(f, "stored notes are malformed: {details}"),
            Self::Encode(details) => write!(f, "failed to encode notes: {details}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(err) => Some(err),
            Self::Malformed(_) | Self::Encode(_) => None,
        }
    }
}

impl From<StorageError> for PersistenceError {
    fn from(value: StorageError) -> Self {
        Self::Unavailable(value)
    }
}

/// Result of rehydrating the collection at startup.
#[derive(Debug)]
pub enum LoadOutcome {
    /// No prior state was stored.
    Empty,
    /// Notes were restored; carries the restored count.
    Restored(usize),
    /// Stored state was unusable; the store fell back to an empty collection.
    Recovered(PersistenceError),
}

/// Staged copy of a note's text while it is being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: NoteId,
    pub staged_text: String,
}

/// Owner of the canonical note collection.
pub struct NoteStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    celebration: Box<dyn CelebrationEffect>,
    /// Canonical order: most recently created first.
    notes: Vec<Note>,
    last_issued_id: i64,
    editing: Option<EditSession>,
    last_persistence_error: Option<String>,
}

impl NoteStore {
    /// Creates an empty store over `storage` using the system clock.
    ///
    /// Call [`NoteStore::load`] once to rehydrate prior state.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            clock: Box::new(SystemClock),
            celebration: Box::new(NoCelebration),
            notes: Vec::new(),
            last_issued_id: 0,
            editing: None,
            last_persistence_error: None,
        }
    }

    /// Replaces the wall clock used for ids and timestamps.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Installs the effect fired after each successful create.
    pub fn with_celebration(mut self, effect: impl CelebrationEffect + 'static) -> Self {
        self.celebration = Box::new(effect);
        self
    }

    /// Creates a note from user input.
    ///
    /// # Errors
    /// - `EmptyInput` when `text` is blank; nothing is mutated, persisted or
    ///   celebrated.
    /// - `IdExhausted` when the highest issued id is `i64::MAX`; same
    ///   no-side-effect guarantee.
    pub fn create(&mut self, text: &str) -> Result<Note, NoteStoreError> {
        let Some(text) = normalize_text(text) else {
            debug!("event=note_create module=store status=rejected reason=empty_input");
            return Err(NoteStoreError::EmptyInput);
        };

        let Some(id) = self.next_id() else {
            warn!(
                "event=note_create module=store status=rejected reason=id_exhausted last_id={}",
                self.last_issued_id
            );
            return Err(NoteStoreError::IdExhausted);
        };
        let note = Note {
            id,
            text,
            created_at: self.clock.display_timestamp(),
            pinned: false,
            presentation: random_presentation(),
        };
        self.notes.insert(0, note.clone());
        info!(
            "event=note_create module=store status=ok note_id={} total={}",
            id,
            self.notes.len()
        );

        self.persist("note_create");
        self.celebration.celebrate();
        Ok(note)
    }

    /// Replaces note text and appends the edit marker to its timestamp.
    ///
    /// # Errors
    /// - `EmptyInput` when `new_text` is blank.
    /// - `NotFound` when no note has `id`.
    pub fn update(&mut self, id: NoteId, new_text: &str) -> Result<Note, NoteStoreError> {
        let text = normalize_text(new_text).ok_or(NoteStoreError::EmptyInput)?;
        let note = self
            .notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or(NoteStoreError::NotFound(id))?;
        note.apply_edit(text);
        let updated = note.clone();
        info!("event=note_update module=store status=ok note_id={id}");

        self.persist("note_update");
        Ok(updated)
    }

    /// Removes the note with `id`.
    ///
    /// Returns `false` when no such note exists; that case is a no-op and
    /// does not write storage. Deleting the note under edit ends the edit.
    pub fn delete(&mut self, id: NoteId) -> bool {
        let before = self.notes.len();
        self.notes.retain(|note| note.id != id);
        if self.notes.len() == before {
            debug!("event=note_delete module=store status=noop note_id={id}");
            return false;
        }

        if self.editing.as_ref().is_some_and(|session| session.id == id) {
            self.editing = None;
            info!("event=note_edit module=store status=aborted reason=deleted note_id={id}");
        }
        info!(
            "event=note_delete module=store status=ok note_id={} total={}",
            id,
            self.notes.len()
        );

        self.persist("note_delete");
        true
    }

    /// Flips the pinned flag.
    ///
    /// # Errors
    /// - `NotFound` when no note has `id`.
    pub fn toggle_pin(&mut self, id: NoteId) -> Result<Note, NoteStoreError> {
        let note = self
            .notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or(NoteStoreError::NotFound(id))?;
        note.pinned = !note.pinned;
        let toggled = note.clone();
        info!(
            "event=note_pin module=store status=ok note_id={} pinned={}",
            id, toggled.pinned
        );

        self.persist("note_pin");
        Ok(toggled)
    }

    /// Returns a snapshot in display order.
    pub fn list(&self) -> Vec<Note> {
        let mut sorted = self.notes.clone();
        sorted.sort_by(display_order);
        sorted
    }

    /// Returns pinned notes in display order.
    pub fn pinned(&self) -> Vec<Note> {
        self.list().into_iter().filter(|note| note.pinned).collect()
    }

    /// Returns unpinned notes in display order.
    pub fn unpinned(&self) -> Vec<Note> {
        self.list().into_iter().filter(|note| !note.pinned).collect()
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Rehydrates the collection from storage.
    ///
    /// Never fails: absent state yields an empty collection, unusable state
    /// yields an empty collection plus the reason in
    /// [`LoadOutcome::Recovered`]. Duplicate stored ids keep the first entry.
    pub fn load(&mut self) -> LoadOutcome {
        self.editing = None;
        let outcome = match self.read_collection() {
            Ok(Some(notes)) => LoadOutcome::Restored(self.replace_collection(notes)),
            Ok(None) => {
                self.replace_collection(Vec::new());
                LoadOutcome::Empty
            }
            Err(err) => {
                warn!("event=notes_load module=store status=recovered error={err}");
                self.replace_collection(Vec::new());
                LoadOutcome::Recovered(err)
            }
        };
        info!(
            "event=notes_load module=store status=ok total={}",
            self.notes.len()
        );
        outcome
    }

    /// Flushes the full collection to storage.
    pub fn save(&self) -> Result<(), PersistenceError> {
        let encoded = serde_json::to_string(&self.notes)
            .map_err(|err| PersistenceError::Encode(err.to_string()))?;
        self.storage.set_item(NOTES_KEY, &encoded)?;
        Ok(())
    }

    /// Returns the current edit session, if any.
    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    /// Enters edit mode for `id`, staging a copy of its text.
    ///
    /// Any other in-progress edit is discarded.
    pub fn start_edit(&mut self, id: NoteId) -> Result<EditSession, NoteStoreError> {
        let note = self.get(id).ok_or(NoteStoreError::NotFound(id))?;
        let session = EditSession {
            id,
            staged_text: note.text.clone(),
        };
        if let Some(previous) = self.editing.replace(session.clone()) {
            if previous.id != id {
                debug!(
                    "event=note_edit module=store status=discarded note_id={}",
                    previous.id
                );
            }
        }
        Ok(session)
    }

    /// Replaces the staged text of the active edit.
    pub fn set_edit_text(&mut self, text: impl Into<String>) -> Result<(), NoteStoreError> {
        let session = self.editing.as_mut().ok_or(NoteStoreError::NotEditing)?;
        session.staged_text = text.into();
        Ok(())
    }

    /// Commits the staged text through [`NoteStore::update`].
    ///
    /// On `EmptyInput` the edit stays open so the user can fix the text; any
    /// other outcome ends the edit.
    pub fn save_edit(&mut self) -> Result<Note, NoteStoreError> {
        let session = self.editing.clone().ok_or(NoteStoreError::NotEditing)?;
        match self.update(session.id, &session.staged_text) {
            Err(NoteStoreError::EmptyInput) => Err(NoteStoreError::EmptyInput),
            result => {
                self.editing = None;
                result
            }
        }
    }

    /// Leaves edit mode without touching the note.
    pub fn cancel_edit(&mut self) -> Option<EditSession> {
        self.editing.take()
    }

    /// Shared handle to the backing key-value store.
    pub fn storage(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.storage)
    }

    /// Last save failure message, cleared by the next successful save.
    pub fn last_persistence_error(&self) -> Option<&str> {
        self.last_persistence_error.as_deref()
    }

    fn next_id(&mut self) -> Option<NoteId> {
        let floor = self.last_issued_id.checked_add(1)?;
        let id = self.clock.now_epoch_ms().max(floor);
        self.last_issued_id = id;
        Some(NoteId(id))
    }

    fn read_collection(&self) -> Result<Option<Vec<Note>>, PersistenceError> {
        let Some(raw) = self.storage.get_item(NOTES_KEY)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Vec<Note>>(&raw)
            .map(Some)
            .map_err(|err| PersistenceError::Malformed(err.to_string()))
    }

    fn replace_collection(&mut self, notes: Vec<Note>) -> usize {
        let mut seen = BTreeSet::new();
        let mut kept = Vec::with_capacity(notes.len());
        for note in notes {
            if seen.insert(note.id) {
                kept.push(note);
            } else {
                warn!(
                    "event=notes_load module=store status=skipped reason=duplicate_id note_id={}",
                    note.id
                );
            }
        }

        if let Some(max_id) = kept.iter().map(|note| note.id.value()).max() {
            self.last_issued_id = self.last_issued_id.max(max_id);
        }
        self.notes = kept;
        self.notes.len()
    }

    fn persist(&mut self, trigger: &'static str) {
        match self.save() {
            Ok(()) => {
                self.last_persistence_error = None;
                debug!("event=notes_save module=store status=ok trigger={trigger}");
            }
            Err(err) => {
                error!("event=notes_save module=store status=error trigger={trigger} error={err}");
                self.last_persistence_error = Some(err.to_string());
            }
        }
    }
}

/// Pinned first, then newest id first.
fn display_order(left: &Note, right: &Note) -> Ordering {
    right
        .pinned
        .cmp(&left.pinned)
        .then_with(|| right.id.cmp(&left.id))
}

fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
