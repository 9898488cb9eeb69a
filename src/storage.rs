use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, error, info, trace};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::{Note, NotesError, Result, Theme};

/// Record holding the full note collection.
pub const NOTES_KEY: &str = "notes";
/// Record holding the active note id, absent when none is active.
pub const ACTIVE_NOTE_KEY: &str = "activeNoteId";
/// Record holding the autocomplete switch.
pub const AUTOCOMPLETE_KEY: &str = "autocompleteEnabled";
/// Record holding the colour theme.
pub const THEME_KEY: &str = "theme";

/// A small keyed store of serialized records.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store, used by tests and embedders that persist elsewhere
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    records: HashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.records.remove(key);
        Ok(())
    }
}

/// Stores each record as `<key>.json` inside one directory.
///
/// Writes go through a temporary file in the same directory that is then
/// atomically moved over the target, so a record is never half-written.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Opens the store, creating the directory when needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        if !dir.exists() {
            debug!("Data directory does not exist, creating: {}", dir.display());
            fs::create_dir_all(&dir).map_err(|e| {
                error!("Failed to create data directory: {}", e);
                NotesError::DirectoryError { path: dir.clone() }
            })?;
        }

        info!("Opened record store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.record_path(key);
        if !path.exists() {
            trace!("Record {} is absent", key);
            return Ok(None);
        }

        let value = fs::read_to_string(&path).map_err(|e| {
            error!("Failed to read record {}: {}", path.display(), e);
            NotesError::Io(e)
        })?;
        Ok(Some(value))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.record_path(key);

        let mut temp_file = NamedTempFile::new_in(&self.dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            NotesError::Io(e)
        })?;

        temp_file.write_all(value.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            NotesError::Io(e)
        })?;

        temp_file.flush().map_err(|e| {
            error!("Failed to flush temporary file: {}", e);
            NotesError::Io(e)
        })?;

        temp_file.persist(&path).map_err(|e| {
            error!("Failed to persist file {}: {}", path.display(), e.error);
            NotesError::Io(e.error)
        })?;

        trace!("Wrote record {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.record_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
            trace!("Removed record {}", key);
        }
        Ok(())
    }
}

/// Everything restored at startup
#[derive(Debug, Clone)]
pub struct PersistedState {
    pub notes: Vec<Note>,
    pub active_id: Option<String>,
    pub autocomplete_enabled: bool,
    pub theme: Theme,
}

/// Typed access to the application records on top of a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct NoteStorage<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> NoteStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn load_state(&self) -> Result<PersistedState> {
        Ok(PersistedState {
            notes: self.load_notes()?,
            active_id: self.load_active_id()?,
            autocomplete_enabled: self.load_autocomplete_enabled()?,
            theme: self.load_theme()?,
        })
    }

    pub fn load_notes(&self) -> Result<Vec<Note>> {
        let notes: Vec<Note> = self.read(NOTES_KEY)?.unwrap_or_default();
        debug!("Loaded {} notes", notes.len());
        Ok(notes)
    }

    /// Rewrites the whole collection
    pub fn save_notes(&mut self, notes: &[Note]) -> Result<()> {
        self.write(NOTES_KEY, &notes)?;
        debug!("Saved {} notes", notes.len());
        Ok(())
    }

    pub fn load_active_id(&self) -> Result<Option<String>> {
        self.read(ACTIVE_NOTE_KEY)
    }

    pub fn save_active_id(&mut self, active_id: Option<&str>) -> Result<()> {
        match active_id {
            Some(id) => self.write(ACTIVE_NOTE_KEY, &id),
            None => self.store.remove(ACTIVE_NOTE_KEY),
        }
    }

    pub fn load_autocomplete_enabled(&self) -> Result<bool> {
        Ok(self.read(AUTOCOMPLETE_KEY)?.unwrap_or(true))
    }

    pub fn save_autocomplete_enabled(&mut self, enabled: bool) -> Result<()> {
        self.write(AUTOCOMPLETE_KEY, &enabled)
    }

    /// Saved theme, or the detected preference when none was saved
    pub fn load_theme(&self) -> Result<Theme> {
        Ok(self.read(THEME_KEY)?.unwrap_or_else(Theme::detect))
    }

    pub fn save_theme(&mut self, theme: Theme) -> Result<()> {
        self.write(THEME_KEY, &theme)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw).map_err(|e| {
                error!("Record {} is corrupt: {}", key, e);
                NotesError::Serialization(e)
            })?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)
    }
}
