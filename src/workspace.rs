use std::sync::Arc;

use log::{debug, error, info, trace};
use tokio::sync::Mutex;
use tokio::time::Duration;

use crate::{
    Config, Debouncer, Direction, ImportSummary, KeyValueStore, Note, NotesError, Result,
    Session, Splice, Suggestion,
};

/// Shares one [`Session`] between adapters and the commit timers.
///
/// Every mutation, including the ones fired by timers, goes through the
/// session mutex, so at most one mutation is in flight. Typing schedules a
/// commit per note that is pushed back by each further edit.
pub struct Workspace<S: KeyValueStore + Send + 'static> {
    /// The shared session
    session: Arc<Mutex<Session<S>>>,

    /// Pending content commits, keyed by note id
    commits: Mutex<Debouncer<String>>,

    /// Quiet period before a draft is committed
    commit_delay: Duration,
}

impl<S: KeyValueStore + Send + 'static> Workspace<S> {
    pub fn new(session: Session<S>, config: &Config) -> Self {
        info!(
            "Initializing workspace with commit delay {}ms",
            config.commit_delay_ms
        );

        Self {
            session: Arc::new(Mutex::new(session)),
            commits: Mutex::new(Debouncer::new()),
            commit_delay: config.commit_delay(),
        }
    }

    /// Handle to the shared session
    pub fn session(&self) -> Arc<Mutex<Session<S>>> {
        Arc::clone(&self.session)
    }

    pub async fn is_commit_pending(&self, id: &str) -> bool {
        self.commits.lock().await.is_pending(&id.to_string())
    }

    /// Records typed text and (re)starts the commit timer for the note
    pub async fn edit_content(
        &self,
        id: &str,
        text: &str,
        cursor: usize,
    ) -> Result<Vec<Suggestion>> {
        let suggestions = self.session.lock().await.edit_content(id, text, cursor)?;
        self.schedule_commit(id).await;
        Ok(suggestions)
    }

    pub async fn move_cursor(&self, id: &str, cursor: usize) -> Result<()> {
        self.session.lock().await.move_cursor(id, cursor)
    }

    pub async fn navigate_suggestions(&self, direction: Direction) -> Option<Suggestion> {
        self.session.lock().await.navigate_suggestions(direction)
    }

    /// Applies a suggestion to the draft; the edit restarts the commit timer
    pub async fn accept_suggestion(
        &self,
        id: &str,
        choice: Option<&str>,
    ) -> Result<Option<Splice>> {
        let splice = self.session.lock().await.accept_suggestion(id, choice)?;
        if splice.is_some() {
            self.schedule_commit(id).await;
        }
        Ok(splice)
    }

    pub async fn dismiss_suggestions(&self) {
        self.session.lock().await.dismiss_suggestions();
    }

    /// Commits a draft right away instead of waiting for its timer
    pub async fn commit_now(&self, id: &str) -> Result<Option<Note>> {
        self.commits.lock().await.cancel(&id.to_string());
        self.session.lock().await.commit_draft(id)
    }

    /// Cancels every timer and commits every draft
    pub async fn flush(&self) -> Result<usize> {
        self.commits.lock().await.cancel_all();
        let committed = self.session.lock().await.commit_all_drafts()?;
        if committed > 0 {
            debug!("Flushed {} drafts", committed);
        }
        Ok(committed)
    }

    /// Switches notes, committing pending edits first
    pub async fn select_note(&self, id: &str) -> Result<Note> {
        self.flush().await?;
        self.session.lock().await.select_note(id)
    }

    pub async fn create_note(&self) -> Result<Note> {
        self.flush().await?;
        self.session.lock().await.create_note()
    }

    /// Deletes a note; its pending commit is dropped
    pub async fn delete_note(&self, id: &str) -> Result<Note> {
        self.commits.lock().await.cancel(&id.to_string());
        self.session.lock().await.delete_note(id)
    }

    /// Restores history; a pending commit would overwrite it, so it is dropped
    pub async fn restore_history(&self, id: &str, index: usize) -> Result<Note> {
        self.commits.lock().await.cancel(&id.to_string());
        self.session.lock().await.restore_history(id, index)
    }

    /// Imports a backup through the same serialized path as typing
    pub async fn import(&self, raw: &[u8]) -> Result<ImportSummary> {
        self.session.lock().await.import(raw)
    }

    pub async fn shutdown(&self) -> Result<()> {
        let committed = self.flush().await?;
        info!("Workspace shut down ({} drafts committed)", committed);
        Ok(())
    }

    async fn schedule_commit(&self, id: &str) {
        let session = Arc::clone(&self.session);
        let note_id = id.to_string();

        self.commits
            .lock()
            .await
            .schedule(id.to_string(), self.commit_delay, async move {
                let mut session = session.lock().await;
                match session.commit_draft(&note_id) {
                    Ok(Some(note)) => debug!("Debounced commit of note {}", note.id),
                    Ok(None) => {}
                    Err(NotesError::NoteNotFound { .. }) => {
                        trace!("Note {} vanished before its commit", note_id)
                    }
                    Err(e) => error!("Debounced commit of note {} failed: {}", note_id, e),
                }
            });
    }
}
