use sleeknotes::{NoteStore, NotesError, DEFAULT_TITLE, HISTORY_LIMIT};

fn store_with_note() -> (NoteStore, String) {
    let mut store = NoteStore::new();
    let id = store.create_note().id;
    (store, id)
}

#[test]
fn create_note_is_empty_active_and_untitled() {
    let (store, id) = store_with_note();
    let note = store.get(&id).unwrap();

    assert_eq!(note.title, DEFAULT_TITLE);
    assert!(note.content.is_empty());
    assert!(note.history.is_empty());
    assert_eq!(note.created, note.updated);
    assert_eq!(store.active_id(), Some(id.as_str()));
}

#[test]
fn created_ids_are_unique_even_within_one_millisecond() {
    let mut store = NoteStore::new();
    let ids: Vec<String> = (0..20).map(|_| store.create_note().id).collect();

    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), ids.len());
    // newest first
    assert_eq!(store.notes()[0].id, ids[19]);
}

#[test]
fn commit_hello_then_hello_world_records_one_entry() {
    let (mut store, id) = store_with_note();

    store.commit_content(&id, "Hello").unwrap();
    let note = store.commit_content(&id, "Hello world").unwrap();

    assert_eq!(note.history.len(), 1);
    assert_eq!(note.history[0].content, "Hello");
    assert_eq!(note.content, "Hello world");
}

#[test]
fn committing_identical_content_twice_is_a_no_op() {
    let (mut store, id) = store_with_note();
    store.commit_content(&id, "first").unwrap();

    let once = store.commit_content(&id, "second").unwrap();
    let twice = store.commit_content(&id, "second").unwrap();

    assert_eq!(once.updated, twice.updated);
    assert_eq!(once.history, twice.history);
}

#[test]
fn history_never_exceeds_limit() {
    let (mut store, id) = store_with_note();
    for i in 0..25 {
        let note = store.commit_content(&id, &format!("revision {}", i)).unwrap();
        assert!(note.history.len() <= HISTORY_LIMIT);
    }
}

#[test]
fn full_history_evicts_oldest_on_commit() {
    let (mut store, id) = store_with_note();
    for i in 0..=HISTORY_LIMIT {
        store.commit_content(&id, &format!("v{}", i)).unwrap();
    }
    let before = store.get(&id).unwrap().clone();
    assert_eq!(before.history.len(), HISTORY_LIMIT);
    let oldest = before.history[0].content.clone();

    let after = store.commit_content(&id, "newest").unwrap();

    assert_eq!(after.history.len(), HISTORY_LIMIT);
    assert!(after.history.iter().all(|entry| entry.content != oldest));
    assert_eq!(after.history.last().unwrap().content, before.content);
}

#[test]
fn restore_keeps_only_entries_before_index() {
    let (mut store, id) = store_with_note();
    for i in 0..6 {
        store.commit_content(&id, &format!("v{}", i)).unwrap();
    }
    let before = store.get(&id).unwrap().history.clone();

    let restored = store.restore_history(&id, 2).unwrap();

    assert_eq!(restored.content, before[2].content);
    assert_eq!(restored.history, before[..2].to_vec());
}

#[test]
fn restore_out_of_range_leaves_note_untouched() {
    let (mut store, id) = store_with_note();
    store.commit_content(&id, "a").unwrap();
    store.commit_content(&id, "b").unwrap();
    let before = store.get(&id).unwrap().clone();

    let err = store.restore_history(&id, 5).unwrap_err();

    assert!(matches!(err, NotesError::HistoryOutOfRange { index: 5, len: 1, .. }));
    assert_eq!(store.get(&id).unwrap(), &before);
}

#[test]
fn operations_on_unknown_ids_change_nothing() {
    let (mut store, id) = store_with_note();
    let snapshot = store.export_all();

    assert!(store.rename_note("missing", "x").unwrap_err().is_no_op());
    assert!(store.commit_content("missing", "x").unwrap_err().is_no_op());
    assert!(store.delete_note("missing").unwrap_err().is_no_op());
    assert!(store.restore_history("missing", 0).unwrap_err().is_no_op());
    assert!(store.select_note("missing").is_err());

    assert_eq!(store.export_all(), snapshot);
    assert_eq!(store.active_id(), Some(id.as_str()));
}

#[test]
fn rename_trims_and_defaults_blank_titles() {
    let (mut store, id) = store_with_note();

    assert_eq!(store.rename_note(&id, "  Plans  ").unwrap().title, "Plans");
    assert_eq!(store.rename_note(&id, "   ").unwrap().title, DEFAULT_TITLE);
}

#[test]
fn deleting_only_note_clears_active_and_create_restores_it() {
    let (mut store, id) = store_with_note();

    store.delete_note(&id).unwrap();
    assert!(store.active_id().is_none());
    assert!(store.is_empty());

    let created = store.create_note();
    assert_eq!(store.active_id(), Some(created.id.as_str()));
}

#[test]
fn deleting_active_note_selects_first_remaining() {
    let mut store = NoteStore::new();
    let older = store.create_note().id;
    let newer = store.create_note().id;
    store.select_note(&older).unwrap();

    store.delete_note(&older).unwrap();

    assert_eq!(store.active_id(), Some(newer.as_str()));
}

#[test]
fn deleting_inactive_note_keeps_active() {
    let mut store = NoteStore::new();
    let older = store.create_note().id;
    let newer = store.create_note().id;

    store.delete_note(&older).unwrap();

    assert_eq!(store.active_id(), Some(newer.as_str()));
}

#[test]
fn import_of_own_export_adds_nothing() {
    let mut store = NoteStore::new();
    store.create_note();
    store.create_note();

    let summary = store.import_merge(store.export_all());

    assert_eq!(summary.added, 0);
    assert_eq!(summary.skipped, 2);
    assert_eq!(store.len(), 2);
}

#[test]
fn import_keeps_existing_notes_on_id_collision() {
    let (mut store, id) = store_with_note();
    store.commit_content(&id, "local").unwrap();

    let mut incoming = store.get(&id).unwrap().clone();
    incoming.content = "remote".to_string();
    let mut fresh = incoming.clone();
    fresh.id = "imported-1".to_string();

    let summary = store.import_merge(vec![incoming, fresh]);

    assert_eq!(summary.added, 1);
    assert_eq!(store.get(&id).unwrap().content, "local");
    assert_eq!(store.notes().last().unwrap().id, "imported-1");
}

#[test]
fn import_into_empty_store_activates_first_incoming() {
    let (mut source, _) = store_with_note();
    source.create_note();
    let exported = source.export_all();

    let mut target = NoteStore::new();
    target.import_merge(exported.clone());

    assert_eq!(target.active_id(), Some(exported[0].id.as_str()));
}

#[test]
fn from_parts_drops_duplicates_and_dangling_active_id() {
    let (source, id) = store_with_note();
    let mut notes = source.export_all();
    notes.push(notes[0].clone());

    let restored = NoteStore::from_parts(notes, Some("gone".to_string()));
    assert_eq!(restored.len(), 1);
    assert!(restored.active_id().is_none());

    let restored = NoteStore::from_parts(source.export_all(), Some(id.clone()));
    assert_eq!(restored.active_id(), Some(id.as_str()));
}
