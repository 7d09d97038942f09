use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use voicenote_core::{
    CelebrationEffect, Clock, KeyValueStore, LoadOutcome, MemoryKeyValueStore, Note, NoteId,
    NoteStore, NoteStoreError, PersistenceError, StorageError, NOTES_KEY,
};

#[derive(Clone)]
struct ManualClock {
    now_ms: Arc<AtomicI64>,
}

impl ManualClock {
    fn starting_at(now_ms: i64) -> Self {
        Self {
            now_ms: Arc::new(AtomicI64::new(now_ms)),
        }
    }

    fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn display_timestamp(&self) -> String {
        "2/14/2024, 10:30:00 AM".to_string()
    }
}

#[derive(Clone, Default)]
struct CountingCelebration {
    fired: Arc<AtomicUsize>,
}

impl CelebrationEffect for CountingCelebration {
    fn celebrate(&self) {
        self.fired.fetch_add(1, Ordering::SeqCst);
    }
}

/// Memory store that counts writes and can be switched to fail them.
#[derive(Default)]
struct ObservedStore {
    inner: MemoryKeyValueStore,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl KeyValueStore for ObservedStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("disk full".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_item(key, value)
    }
}

fn new_store() -> (NoteStore, Arc<ObservedStore>, ManualClock, CountingCelebration) {
    let storage = Arc::new(ObservedStore::default());
    let clock = ManualClock::starting_at(1_700_000_000_000);
    let celebration = CountingCelebration::default();
    let store = NoteStore::new(storage.clone())
        .with_clock(clock.clone())
        .with_celebration(celebration.clone());
    (store, storage, clock, celebration)
}

fn texts(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|note| note.text.as_str()).collect()
}

fn assert_display_order(notes: &[Note]) {
    for pair in notes.windows(2) {
        let (left, right) = (&pair[0], &pair[1]);
        if left.pinned == right.pinned {
            assert!(left.id > right.id, "same partition must be newest first");
        } else {
            assert!(left.pinned, "pinned notes must come first");
        }
    }
}

#[test]
fn create_assigns_defaults_and_persists() {
    let (mut store, storage, _clock, celebration) = new_store();

    let note = store.create("  buy milk  ").unwrap();
    assert_eq!(note.id, NoteId(1_700_000_000_000));
    assert_eq!(note.text, "buy milk");
    assert_eq!(note.created_at, "2/14/2024, 10:30:00 AM");
    assert!(!note.pinned);
    assert!(!note.presentation.gradient.is_empty());

    assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
    assert_eq!(celebration.fired.load(Ordering::SeqCst), 1);
    assert_eq!(store.list(), vec![note]);
}

#[test]
fn blank_create_never_mutates_persists_or_celebrates() {
    let (mut store, storage, _clock, celebration) = new_store();

    assert_eq!(store.create(""), Err(NoteStoreError::EmptyInput));
    assert_eq!(store.create("   "), Err(NoteStoreError::EmptyInput));
    assert_eq!(store.create("\n\t"), Err(NoteStoreError::EmptyInput));

    assert!(store.is_empty());
    assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
    assert_eq!(storage.get_item(NOTES_KEY).unwrap(), None);
    assert_eq!(celebration.fired.load(Ordering::SeqCst), 0);
}

#[test]
fn ids_strictly_increase_across_deletes_and_clock_stalls() {
    let (mut store, _storage, clock, _celebration) = new_store();
    let mut issued = Vec::new();

    for round in 0..20 {
        let note = store.create(&format!("note {round}")).unwrap();
        issued.push(note.id);
        if round % 3 == 0 {
            assert!(store.delete(note.id));
        }
        // Clock stalls on odd rounds.
        if round % 2 == 0 {
            clock.advance(5);
        }
    }

    for pair in issued.windows(2) {
        assert!(pair[1] > pair[0], "{:?} must exceed {:?}", pair[1], pair[0]);
    }
}

#[test]
fn scenario_pin_edit_delete_keeps_display_order() {
    let (mut store, _storage, clock, _celebration) = new_store();
    let a = store.create("A").unwrap();
    clock.advance(10);
    let b = store.create("B").unwrap();
    clock.advance(10);
    let c = store.create("C").unwrap();
    assert_eq!(texts(&store.list()), vec!["C", "B", "A"]);

    store.toggle_pin(a.id).unwrap();
    assert_eq!(texts(&store.list()), vec!["A", "C", "B"]);

    let edited = store.update(b.id, "B2").unwrap();
    assert_eq!(edited.id, b.id);
    assert_eq!(edited.created_at, format!("{} (edited)", b.created_at));
    assert_eq!(edited.presentation, b.presentation);
    assert!(!edited.pinned);
    assert_eq!(texts(&store.list()), vec!["A", "C", "B2"]);

    assert!(store.delete(c.id));
    assert_eq!(texts(&store.list()), vec!["A", "B2"]);
    assert_eq!(store.pinned().len(), 1);
    assert_eq!(texts(&store.unpinned()), vec!["B2"]);
}

#[test]
fn update_unknown_id_returns_not_found_without_changes() {
    let (mut store, storage, _clock, _celebration) = new_store();
    store.create("kept").unwrap();
    let before = store.list();
    let writes_before = storage.writes.load(Ordering::SeqCst);

    let err = store.update(NoteId(42), "x").unwrap_err();
    assert_eq!(err, NoteStoreError::NotFound(NoteId(42)));
    assert_eq!(store.list(), before);
    assert_eq!(storage.writes.load(Ordering::SeqCst), writes_before);
}

#[test]
fn update_rejects_blank_text() {
    let (mut store, _storage, _clock, _celebration) = new_store();
    let note = store.create("original").unwrap();

    assert_eq!(store.update(note.id, "  "), Err(NoteStoreError::EmptyInput));
    assert_eq!(store.get(note.id).unwrap().text, "original");
    assert!(!store.get(note.id).unwrap().is_edited());
}

#[test]
fn repeated_edits_append_marker_each_time() {
    let (mut store, _storage, _clock, _celebration) = new_store();
    let note = store.create("v1").unwrap();
    store.update(note.id, "v2").unwrap();
    let latest = store.update(note.id, "v3").unwrap();
    assert_eq!(
        latest.created_at,
        "2/14/2024, 10:30:00 AM (edited) (edited)"
    );
}

#[test]
fn delete_is_idempotent_and_skips_storage_on_noop() {
    let (mut store, storage, clock, _celebration) = new_store();
    let first = store.create("first").unwrap();
    clock.advance(1);
    store.create("second").unwrap();

    assert!(store.delete(first.id));
    let after_once = store.list();
    let writes = storage.writes.load(Ordering::SeqCst);

    assert!(!store.delete(first.id));
    assert_eq!(store.list(), after_once);
    assert_eq!(storage.writes.load(Ordering::SeqCst), writes);
}

#[test]
fn toggle_pin_unknown_id_is_not_found() {
    let (mut store, _storage, _clock, _celebration) = new_store();
    assert_eq!(
        store.toggle_pin(NoteId(7)),
        Err(NoteStoreError::NotFound(NoteId(7)))
    );
}

#[test]
fn ordering_holds_for_interleaved_operations() {
    let (mut store, _storage, clock, _celebration) = new_store();
    let mut seed: u64 = 0x5eed;
    let mut next = move || {
        seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        (seed >> 33) as usize
    };

    for step in 0..200 {
        let current = store.list();
        match next() % 4 {
            0 | 1 => {
                store.create(&format!("step {step}")).unwrap();
            }
            2 if !current.is_empty() => {
                let target = current[next() % current.len()].id;
                store.toggle_pin(target).unwrap();
            }
            3 if !current.is_empty() => {
                let target = current[next() % current.len()].id;
                assert!(store.delete(target));
            }
            _ => {}
        }
        clock.advance((next() % 3) as i64);
        assert_display_order(&store.list());
    }
}

#[test]
fn list_returns_independent_snapshots() {
    let (mut store, _storage, _clock, _celebration) = new_store();
    let note = store.create("snapshot").unwrap();

    let mut snapshot = store.list();
    snapshot[0].text = "mutated locally".to_string();
    snapshot.clear();

    assert_eq!(store.get(note.id).unwrap().text, "snapshot");
    assert_eq!(store.len(), 1);
}

#[test]
fn save_then_fresh_load_reproduces_collection() {
    let (mut store, storage, clock, _celebration) = new_store();
    let a = store.create("alpha").unwrap();
    clock.advance(3);
    let b = store.create("beta").unwrap();
    clock.advance(3);
    store.create("gamma").unwrap();
    store.toggle_pin(a.id).unwrap();
    store.update(b.id, "beta edited").unwrap();
    store.save().unwrap();
    let before = store.list();

    let mut reloaded = NoteStore::new(storage.clone());
    match reloaded.load() {
        LoadOutcome::Restored(count) => assert_eq!(count, 3),
        other => panic!("unexpected load outcome: {other:?}"),
    }
    assert_eq!(reloaded.list(), before);
}

#[test]
fn reloaded_store_issues_ids_above_stored_ones() {
    let (mut store, storage, _clock, _celebration) = new_store();
    let stored = store.create("from the future").unwrap();

    let mut reloaded =
        NoteStore::new(storage.clone()).with_clock(ManualClock::starting_at(1_000));
    reloaded.load();
    let fresh = reloaded.create("new").unwrap();
    assert!(fresh.id > stored.id);
}

#[test]
fn load_without_prior_state_is_empty() {
    let (mut store, _storage, _clock, _celebration) = new_store();
    assert!(matches!(store.load(), LoadOutcome::Empty));
    assert!(store.is_empty());
}

#[test]
fn load_recovers_from_malformed_state() {
    let storage = Arc::new(MemoryKeyValueStore::new());
    storage.set_item(NOTES_KEY, "{not json").unwrap();

    let mut store = NoteStore::new(storage.clone());
    match store.load() {
        LoadOutcome::Recovered(PersistenceError::Malformed(_)) => {}
        other => panic!("unexpected load outcome: {other:?}"),
    }
    assert!(store.is_empty());
}

#[test]
fn load_reads_stored_wire_format_and_drops_duplicate_ids() {
    let storage = Arc::new(MemoryKeyValueStore::new());
    storage
        .set_item(
            NOTES_KEY,
            r#"[
                {"id":20,"text":"second","date":"d2","pinned":true,
                 "gradient":"linear-gradient(135deg, #A0E7E5, #4ECDC4)","rotation":1.25},
                {"id":10,"text":"first","date":"d1","pinned":false,
                 "gradient":"linear-gradient(135deg, #FFDE59, #FFB830)","rotation":-2.5},
                {"id":10,"text":"duplicate","date":"d1","pinned":false,
                 "gradient":"linear-gradient(135deg, #FFDE59, #FFB830)","rotation":0.0}
            ]"#,
        )
        .unwrap();

    let mut store = NoteStore::new(storage);
    assert!(matches!(store.load(), LoadOutcome::Restored(2)));
    let listed = store.list();
    assert_eq!(texts(&listed), vec!["second", "first"]);
    assert_eq!(listed[0].presentation.rotation, 1.25);
    assert_eq!(listed[1].presentation.rotation, -2.5);
}

#[test]
fn create_after_loading_max_id_is_rejected_without_side_effects() {
    let (mut store, storage, _clock, celebration) = new_store();
    storage
        .set_item(
            NOTES_KEY,
            r#"[{"id":9223372036854775807,"text":"max","date":"d"}]"#,
        )
        .unwrap();
    let writes = storage.writes.load(Ordering::SeqCst);
    assert!(matches!(store.load(), LoadOutcome::Restored(1)));

    assert_eq!(store.create("a"), Err(NoteStoreError::IdExhausted));
    assert_eq!(store.create("b"), Err(NoteStoreError::IdExhausted));

    assert_eq!(texts(&store.list()), vec!["max"]);
    assert_eq!(store.get(NoteId(i64::MAX)).map(|note| note.text.as_str()), Some("max"));
    assert_eq!(storage.writes.load(Ordering::SeqCst), writes);
    assert_eq!(celebration.fired.load(Ordering::SeqCst), 0);
}

#[test]
fn failed_save_keeps_memory_authoritative() {
    let (mut store, storage, _clock, _celebration) = new_store();
    storage.fail_writes.store(true, Ordering::SeqCst);

    let note = store.create("survives").unwrap();
    assert_eq!(store.list(), vec![note.clone()]);
    assert!(store
        .last_persistence_error()
        .unwrap_or_default()
        .contains("disk full"));

    storage.fail_writes.store(false, Ordering::SeqCst);
    store.toggle_pin(note.id).unwrap();
    assert_eq!(store.last_persistence_error(), None);
}

#[test]
fn only_one_note_is_edited_at_a_time() {
    let (mut store, _storage, clock, _celebration) = new_store();
    let first = store.create("first").unwrap();
    clock.advance(1);
    let second = store.create("second").unwrap();

    store.start_edit(first.id).unwrap();
    let session = store.start_edit(second.id).unwrap();
    assert_eq!(session.staged_text, "second");
    assert_eq!(store.editing().map(|s| s.id), Some(second.id));

    store.set_edit_text("second, revised").unwrap();
    let saved = store.save_edit().unwrap();
    assert_eq!(saved.text, "second, revised");
    assert!(store.editing().is_none());
    assert_eq!(store.get(first.id).unwrap().text, "first");
}

#[test]
fn cancel_edit_discards_staged_text() {
    let (mut store, storage, _clock, _celebration) = new_store();
    let note = store.create("keep me").unwrap();
    let writes = storage.writes.load(Ordering::SeqCst);

    store.start_edit(note.id).unwrap();
    store.set_edit_text("throw away").unwrap();
    let cancelled = store.cancel_edit().unwrap();
    assert_eq!(cancelled.staged_text, "throw away");

    assert_eq!(store.get(note.id).unwrap(), &note);
    assert_eq!(storage.writes.load(Ordering::SeqCst), writes);
    assert_eq!(store.save_edit(), Err(NoteStoreError::NotEditing));
}

#[test]
fn blank_edit_keeps_session_open() {
    let (mut store, _storage, _clock, _celebration) = new_store();
    let note = store.create("draft").unwrap();

    store.start_edit(note.id).unwrap();
    store.set_edit_text("   ").unwrap();
    assert_eq!(store.save_edit(), Err(NoteStoreError::EmptyInput));
    assert_eq!(store.editing().map(|s| s.id), Some(note.id));
}

#[test]
fn deleting_edited_note_ends_edit_session() {
    let (mut store, _storage, _clock, _celebration) = new_store();
    let note = store.create("doomed").unwrap();
    store.start_edit(note.id).unwrap();

    assert!(store.delete(note.id));
    assert!(store.editing().is_none());
    assert_eq!(store.set_edit_text("late"), Err(NoteStoreError::NotEditing));
}
