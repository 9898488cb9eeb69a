use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::{ImportSummary, Note, NotesError, Result};

/// Owns the note collection and the active-note pointer.
///
/// Every mutation replaces a whole [`Note`] value, so a note is never left
/// half-updated. Operations on unknown ids or out-of-range history indices
/// return an error and leave the store untouched.
#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    /// Notes in display order
    notes: Vec<Note>,

    /// Currently selected note; always an id present in `notes`
    active_id: Option<String>,
}

impl NoteStore {
    /// Creates an empty store with no active note
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted records.
    ///
    /// Duplicate ids keep their first occurrence, and an active id that no
    /// longer exists is dropped.
    pub fn from_parts(notes: Vec<Note>, active_id: Option<String>) -> Self {
        let mut seen = HashSet::with_capacity(notes.len());
        let notes: Vec<Note> = notes
            .into_iter()
            .filter(|note| seen.insert(note.id.clone()))
            .collect();

        let active_id = active_id.filter(|id| seen.contains(id));

        Self { notes, active_id }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    /// Creates an empty note at the top of the list and makes it active
    pub fn create_note(&mut self) -> Note {
        let now = Utc::now();
        let note = Note::with_id(self.next_id(now), now);

        self.notes.insert(0, note.clone());
        self.active_id = Some(note.id.clone());

        info!("Created note {}", note.id);
        note
    }

    /// Makes an existing note the active one
    pub fn select_note(&mut self, id: &str) -> Result<Note> {
        let note = self.get(id).cloned().ok_or_else(|| NotesError::not_found(id))?;
        self.active_id = Some(note.id.clone());

        debug!("Selected note {}", id);
        Ok(note)
    }

    /// Sets the note title, trimming it and falling back to the default title
    pub fn rename_note(&mut self, id: &str, raw_title: &str) -> Result<Note> {
        let index = self.position(id).ok_or_else(|| NotesError::not_found(id))?;
        let renamed = self.notes[index].renamed(raw_title, Utc::now());
        self.notes[index] = renamed.clone();

        debug!("Renamed note {} to {:?}", id, renamed.title);
        Ok(renamed)
    }

    /// Commits new content, recording the previous content in history.
    ///
    /// Committing the current content again returns the note unchanged.
    pub fn commit_content(&mut self, id: &str, new_content: &str) -> Result<Note> {
        let index = self.position(id).ok_or_else(|| NotesError::not_found(id))?;

        match self.notes[index].committed(new_content, Utc::now()) {
            Some(committed) => {
                self.notes[index] = committed.clone();
                info!(
                    "Committed content of note {} ({} history entries)",
                    id,
                    committed.history.len()
                );
                Ok(committed)
            }
            None => Ok(self.notes[index].clone()),
        }
    }

    /// Removes a note, moving the active pointer to the first remaining note
    pub fn delete_note(&mut self, id: &str) -> Result<Note> {
        let index = self.position(id).ok_or_else(|| NotesError::not_found(id))?;
        let removed = self.notes.remove(index);

        if self.active_id.as_deref() == Some(id) {
            self.active_id = self.notes.first().map(|note| note.id.clone());
        }

        info!("Deleted note {} ({:?})", id, removed.title);
        Ok(removed)
    }

    /// Restores `history[index]`, discarding that entry and all newer ones
    pub fn restore_history(&mut self, id: &str, index: usize) -> Result<Note> {
        let position = self.position(id).ok_or_else(|| NotesError::not_found(id))?;
        let note = &self.notes[position];

        let restored = note
            .restored(index, Utc::now())
            .ok_or_else(|| NotesError::HistoryOutOfRange {
                id: id.to_string(),
                index,
                len: note.history.len(),
            })?;
        self.notes[position] = restored.clone();

        info!("Restored note {} from history entry {}", id, index);
        Ok(restored)
    }

    /// Full snapshot of the collection for serialization
    pub fn export_all(&self) -> Vec<Note> {
        self.notes.clone()
    }

    /// Appends incoming notes whose id is not present yet.
    ///
    /// Existing notes always win. When no note is active the first incoming
    /// note becomes active.
    pub fn import_merge(&mut self, incoming: Vec<Note>) -> ImportSummary {
        let total = incoming.len();
        let first_id = incoming.first().map(|note| note.id.clone());

        let mut known: HashSet<String> = self.notes.iter().map(|n| n.id.clone()).collect();
        let mut added = 0;
        for note in incoming {
            if known.insert(note.id.clone()) {
                self.notes.push(note);
                added += 1;
            }
        }

        if self.active_id.is_none() {
            self.active_id = first_id;
        }

        info!("Imported {} of {} notes", added, total);
        ImportSummary {
            total,
            added,
            skipped: total - added,
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    /// Millisecond timestamp id, bumped until it is unused
    fn next_id(&self, now: DateTime<Utc>) -> String {
        let mut candidate = now.timestamp_millis();
        while self.contains(&candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }
}
