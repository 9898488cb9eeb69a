//! The single mutation path between adapters and the core.
//!
//! A [`Session`] accepts the discrete events an editor front end produces
//! (create, select, rename, typing, delete, restore, import/export, toggles,
//! suggestion navigation) and rewrites the persisted records after every
//! state change. Typed content is held as a per-note draft until it is
//! committed, which is what keeps history coarse.
use std::collections::HashMap;

use log::{debug, info};

use crate::{
    export_json, parse_import, Config, Direction, ImportSummary, KeyValueStore, Note,
    NoteStorage, NoteStore, NotesError, Result, Splice, Suggestion, SuggestionEngine,
    SuggestionPopup, Theme,
};

/// Uncommitted editor state for one note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    /// Char offset of the cursor in `text`
    pub cursor: usize,
}

pub struct Session<S: KeyValueStore> {
    store: NoteStore,
    engine: SuggestionEngine,
    popup: SuggestionPopup,
    storage: NoteStorage<S>,
    drafts: HashMap<String, Draft>,
    autocomplete_enabled: bool,
    theme: Theme,
}

impl<S: KeyValueStore> Session<S> {
    /// Restores the persisted state and makes sure a note is active.
    ///
    /// An empty collection gets a fresh note. Otherwise the saved active note
    /// is reselected, or the first note when the saved one is gone. The
    /// vocabulary is seeded from every loaded note.
    pub fn open(storage: NoteStorage<S>, config: &Config) -> Result<Self> {
        let state = storage.load_state()?;

        let mut engine =
            SuggestionEngine::with_limits(config.min_prefix_len, config.max_suggestions);
        for note in &state.notes {
            engine.observe(&note.content);
        }

        let mut session = Self {
            store: NoteStore::from_parts(state.notes, state.active_id),
            engine,
            popup: SuggestionPopup::new(),
            storage,
            drafts: HashMap::new(),
            autocomplete_enabled: state.autocomplete_enabled,
            theme: state.theme,
        };

        if session.store.is_empty() {
            session.create_note()?;
        } else if session.store.active_id().is_none() {
            let first = session.store.notes()[0].id.clone();
            session.select_note(&first)?;
        }

        info!(
            "Session opened with {} notes, {} vocabulary words",
            session.store.len(),
            session.engine.vocabulary_len()
        );
        Ok(session)
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn engine(&self) -> &SuggestionEngine {
        &self.engine
    }

    pub fn popup(&self) -> &SuggestionPopup {
        &self.popup
    }

    pub fn storage(&self) -> &NoteStorage<S> {
        &self.storage
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn autocomplete_enabled(&self) -> bool {
        self.autocomplete_enabled
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.store.active_note()
    }

    pub fn draft(&self, id: &str) -> Option<&Draft> {
        self.drafts.get(id)
    }

    pub fn has_drafts(&self) -> bool {
        !self.drafts.is_empty()
    }

    /// What the editor shows for a note: the draft if any, else the content
    pub fn editor_text(&self, id: &str) -> Option<&str> {
        match self.drafts.get(id) {
            Some(draft) => Some(&draft.text),
            None => self.store.get(id).map(|note| note.content.as_str()),
        }
    }

    pub fn create_note(&mut self) -> Result<Note> {
        let note = self.store.create_note();
        self.popup.dismiss();
        self.persist_all()?;
        Ok(note)
    }

    pub fn select_note(&mut self, id: &str) -> Result<Note> {
        let note = self.store.select_note(id)?;
        self.popup.dismiss();
        self.storage.save_active_id(self.store.active_id())?;
        Ok(note)
    }

    pub fn rename_note(&mut self, id: &str, raw_title: &str) -> Result<Note> {
        let note = self.store.rename_note(id, raw_title)?;
        self.persist_notes()?;
        Ok(note)
    }

    /// Records typed text without committing it.
    ///
    /// The vocabulary learns the text immediately and the popup is refreshed
    /// when autocomplete is on. Returns the current suggestions.
    pub fn edit_content(
        &mut self,
        id: &str,
        text: &str,
        cursor: usize,
    ) -> Result<Vec<Suggestion>> {
        if !self.store.contains(id) {
            return Err(NotesError::not_found(id));
        }

        self.engine.observe(text);
        self.drafts.insert(
            id.to_string(),
            Draft {
                text: text.to_string(),
                cursor,
            },
        );

        if self.autocomplete_enabled && !text.is_empty() {
            self.popup.refresh(id, &self.engine, text, cursor);
        } else {
            self.popup.dismiss();
        }
        Ok(self.popup.suggestions().to_vec())
    }

    /// Moves the cursor inside the draft, hiding the popup if it left the word
    pub fn move_cursor(&mut self, id: &str, cursor: usize) -> Result<()> {
        let draft = self
            .drafts
            .get_mut(id)
            .ok_or_else(|| NotesError::not_found(id))?;
        draft.cursor = cursor;
        self.popup.cursor_moved(id, &draft.text, cursor);
        Ok(())
    }

    /// Commits the pending draft of a note, if there is one
    pub fn commit_draft(&mut self, id: &str) -> Result<Option<Note>> {
        let Some(draft) = self.drafts.remove(id) else {
            return Ok(None);
        };
        let note = self.store.commit_content(id, &draft.text)?;
        self.persist_notes()?;
        Ok(Some(note))
    }

    /// Commits every pending draft, returning how many notes were committed
    pub fn commit_all_drafts(&mut self) -> Result<usize> {
        let ids: Vec<String> = self.drafts.keys().cloned().collect();
        let mut committed = 0;
        for id in ids {
            match self.commit_draft(&id) {
                Ok(Some(_)) => committed += 1,
                Ok(None) => {}
                Err(e) if e.is_no_op() => debug!("Dropped draft of missing note {}", id),
                Err(e) => return Err(e),
            }
        }
        Ok(committed)
    }

    /// Commits `content` directly, discarding any draft
    pub fn commit_content(&mut self, id: &str, content: &str) -> Result<Note> {
        let note = self.store.commit_content(id, content)?;
        self.drafts.remove(id);
        self.engine.observe(content);
        self.persist_notes()?;
        Ok(note)
    }

    pub fn delete_note(&mut self, id: &str) -> Result<Note> {
        let removed = self.store.delete_note(id)?;
        self.drafts.remove(id);
        self.popup.dismiss();
        self.persist_all()?;
        Ok(removed)
    }

    /// Restores a history entry; the restored text replaces any draft
    pub fn restore_history(&mut self, id: &str, index: usize) -> Result<Note> {
        let note = self.store.restore_history(id, index)?;
        self.drafts.remove(id);
        self.popup.dismiss();
        self.persist_notes()?;
        Ok(note)
    }

    pub fn export_all(&self) -> Vec<Note> {
        self.store.export_all()
    }

    /// Pretty JSON backup of the whole collection
    pub fn export_json(&self) -> Result<String> {
        export_json(self.store.notes())
    }

    /// Merges a JSON backup. A malformed payload leaves everything unchanged.
    pub fn import(&mut self, raw: &[u8]) -> Result<ImportSummary> {
        let incoming = parse_import(raw)?;
        for note in &incoming {
            self.engine.observe(&note.content);
        }

        let summary = self.store.import_merge(incoming);
        self.persist_all()?;
        Ok(summary)
    }

    pub fn set_autocomplete(&mut self, enabled: bool) -> Result<()> {
        self.autocomplete_enabled = enabled;
        if !enabled {
            self.popup.dismiss();
        }
        self.storage.save_autocomplete_enabled(enabled)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<Theme> {
        self.theme = theme;
        self.storage.save_theme(theme)?;
        Ok(theme)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.set_theme(self.theme.toggled())
    }

    pub fn navigate_suggestions(&mut self, direction: Direction) -> Option<Suggestion> {
        self.popup.navigate(direction).cloned()
    }

    /// Applies `choice`, or the highlighted candidate when `None`, to the draft.
    ///
    /// Returns `None` when the popup is hidden, was triggered by another
    /// note, or nothing is highlighted.
    pub fn accept_suggestion(
        &mut self,
        id: &str,
        choice: Option<&str>,
    ) -> Result<Option<Splice>> {
        let draft = self
            .drafts
            .get_mut(id)
            .ok_or_else(|| NotesError::not_found(id))?;

        let splice = match choice {
            Some(chosen) => self.popup.accept(id, &draft.text, draft.cursor, chosen),
            None => self.popup.accept_selected(id, &draft.text, draft.cursor),
        };

        if let Some(splice) = &splice {
            draft.text = splice.text.clone();
            draft.cursor = splice.cursor;
            self.engine.observe(&splice.text);
        }
        Ok(splice)
    }

    pub fn dismiss_suggestions(&mut self) {
        self.popup.dismiss();
    }

    /// Completions against committed content, for adapters without drafts
    pub fn suggest(&self, id: &str, cursor: usize) -> Result<Vec<Suggestion>> {
        let note = self.store.get(id).ok_or_else(|| NotesError::not_found(id))?;
        Ok(self.engine.suggest(&note.content, cursor))
    }

    /// Splices `chosen` into committed content at `cursor` and commits it
    pub fn complete(&mut self, id: &str, cursor: usize, chosen: &str) -> Result<(Note, Splice)> {
        let content = self
            .store
            .get(id)
            .map(|note| note.content.clone())
            .ok_or_else(|| NotesError::not_found(id))?;

        let splice = SuggestionEngine::apply_suggestion(&content, cursor, chosen);
        let note = self.commit_content(id, &splice.text)?;
        Ok((note, splice))
    }

    fn persist_notes(&mut self) -> Result<()> {
        self.storage.save_notes(self.store.notes())
    }

    fn persist_all(&mut self) -> Result<()> {
        self.storage.save_notes(self.store.notes())?;
        self.storage.save_active_id(self.store.active_id())
    }
}
