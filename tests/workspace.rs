use std::time::Duration;

use sleeknotes::{
    Config, Direction, KeyValueStore, MemoryKeyValueStore, NoteStorage, Session, Workspace,
    THEME_KEY,
};
use tokio::time;

fn workspace() -> (Workspace<MemoryKeyValueStore>, String) {
    let mut store = MemoryKeyValueStore::new();
    store.set(THEME_KEY, "\"light\"").unwrap();
    let config = Config {
        commit_delay_ms: 1000,
        ..Config::default()
    };

    let session = Session::open(NoteStorage::new(store), &config).unwrap();
    let id = session.active_note().unwrap().id.clone();
    (Workspace::new(session, &config), id)
}

async fn committed_content(workspace: &Workspace<MemoryKeyValueStore>, id: &str) -> String {
    let session = workspace.session();
    let session = session.lock().await;
    session.store().get(id).unwrap().content.clone()
}

#[tokio::test(start_paused = true)]
async fn rapid_edits_commit_once_after_the_quiet_period() {
    let (workspace, id) = workspace();

    for (i, text) in ["H", "He", "Hel", "Hell", "Hello"].iter().enumerate() {
        workspace.edit_content(&id, text, i + 1).await.unwrap();
        time::sleep(Duration::from_millis(300)).await;
    }
    assert_eq!(committed_content(&workspace, &id).await, "");
    assert!(workspace.is_commit_pending(&id).await);

    time::sleep(Duration::from_millis(800)).await;

    assert_eq!(committed_content(&workspace, &id).await, "Hello");
    assert!(!workspace.is_commit_pending(&id).await);

    let session = workspace.session();
    let session = session.lock().await;
    let note = session.store().get(&id).unwrap();
    assert!(note.history.is_empty());
    assert_eq!(session.storage().load_notes().unwrap()[0].content, "Hello");
}

#[tokio::test(start_paused = true)]
async fn separate_quiet_periods_build_history() {
    let (workspace, id) = workspace();

    workspace.edit_content(&id, "Hello", 5).await.unwrap();
    time::sleep(Duration::from_millis(1100)).await;
    workspace.edit_content(&id, "Hello world", 11).await.unwrap();
    time::sleep(Duration::from_millis(1100)).await;

    let session = workspace.session();
    let session = session.lock().await;
    let note = session.store().get(&id).unwrap();
    assert_eq!(note.content, "Hello world");
    assert_eq!(note.history.len(), 1);
    assert_eq!(note.history[0].content, "Hello");
}

#[tokio::test(start_paused = true)]
async fn switching_notes_flushes_pending_draft() {
    let (workspace, first) = workspace();
    workspace.edit_content(&first, "draft text", 10).await.unwrap();

    let second = workspace.create_note().await.unwrap();
    workspace.select_note(&first).await.unwrap();

    assert_eq!(committed_content(&workspace, &first).await, "draft text");
    assert!(!workspace.is_commit_pending(&first).await);
    assert_ne!(second.id, first);
}

#[tokio::test(start_paused = true)]
async fn deleting_a_note_drops_its_pending_commit() {
    let (workspace, id) = workspace();
    workspace.edit_content(&id, "soon gone", 9).await.unwrap();

    workspace.delete_note(&id).await.unwrap();
    time::sleep(Duration::from_millis(2000)).await;

    let session = workspace.session();
    let session = session.lock().await;
    assert!(session.store().is_empty());
    assert!(!session.has_drafts());
}

#[tokio::test(start_paused = true)]
async fn accepted_suggestion_is_committed_with_the_draft() {
    let (workspace, id) = workspace();
    {
        let session = workspace.session();
        session.lock().await.commit_content(&id, "wonderful").unwrap();
    }

    let suggestions = workspace.edit_content(&id, "wonderful won", 13).await.unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].start, 10);

    workspace.navigate_suggestions(Direction::Next).await.unwrap();
    let splice = workspace.accept_suggestion(&id, None).await.unwrap().unwrap();
    assert_eq!(splice.text, "wonderful wonderful");
    assert_eq!(splice.cursor, 19);

    time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(committed_content(&workspace, &id).await, "wonderful wonderful");
}

#[tokio::test(start_paused = true)]
async fn autocomplete_off_suppresses_suggestions() {
    let (workspace, id) = workspace();
    {
        let session = workspace.session();
        let mut session = session.lock().await;
        session.commit_content(&id, "wonderful").unwrap();
        session.set_autocomplete(false).unwrap();
    }

    let suggestions = workspace.edit_content(&id, "won", 3).await.unwrap();
    assert!(suggestions.is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_commits_every_draft() {
    let (workspace, id) = workspace();
    workspace.edit_content(&id, "unsaved", 7).await.unwrap();

    workspace.shutdown().await.unwrap();

    assert_eq!(committed_content(&workspace, &id).await, "unsaved");
}

#[tokio::test(start_paused = true)]
async fn suggestion_from_one_note_never_lands_in_another() {
    let (workspace, first) = workspace();
    let second = workspace.create_note().await.unwrap().id;
    {
        let session = workspace.session();
        session.lock().await.commit_content(&first, "wonderful").unwrap();
    }

    workspace.edit_content(&second, "grocery list", 12).await.unwrap();
    let suggestions = workspace.edit_content(&first, "wonderful won", 13).await.unwrap();
    assert_eq!(suggestions.len(), 1);
    workspace.navigate_suggestions(Direction::Next).await.unwrap();

    assert!(workspace.accept_suggestion(&second, None).await.unwrap().is_none());
    {
        let session = workspace.session();
        let session = session.lock().await;
        assert_eq!(session.draft(&second).unwrap().text, "grocery list");
        assert!(session.popup().is_showing());
    }

    let splice = workspace.accept_suggestion(&first, None).await.unwrap().unwrap();
    assert_eq!(splice.text, "wonderful wonderful");
}

#[tokio::test(start_paused = true)]
async fn moving_the_cursor_in_another_note_hides_the_popup() {
    let (workspace, first) = workspace();
    let second = workspace.create_note().await.unwrap().id;
    {
        let session = workspace.session();
        session.lock().await.commit_content(&first, "wonderful").unwrap();
    }

    workspace.edit_content(&second, "grocery list", 12).await.unwrap();
    workspace.edit_content(&first, "wonderful won", 13).await.unwrap();
    workspace.move_cursor(&second, 12).await.unwrap();

    let session = workspace.session();
    assert!(!session.lock().await.popup().is_showing());
}
