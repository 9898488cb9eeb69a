//! Error types for the sleeknotes application.
//!
//! This module defines the error taxonomy shared by the note store, the
//! persistence layer and the command-line adapter.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the sleeknotes application.
#[derive(Error, Debug)]
pub enum NotesError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation referenced a note id absent from the collection.
    #[error("Note not found: {id}")]
    NoteNotFound { id: String },

    /// History index outside `[0, len)` on restore.
    #[error("History index {index} out of range for note {id} ({len} entries)")]
    HistoryOutOfRange { id: String, index: usize, len: usize },

    /// Import payload is not a sequence of note-shaped records.
    #[error("Invalid notes format: {message}")]
    MalformedImport { message: String },

    /// Export was requested on an empty collection.
    #[error("No notes to export")]
    NothingToExport,

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// file not found
    #[error("File not found: {file_path}")]
    FileNotFound { file_path: String },

    #[error("{message}")]
    EditorError { message: String },
}

impl NotesError {
    pub(crate) fn not_found(id: &str) -> Self {
        NotesError::NoteNotFound { id: id.to_string() }
    }

    /// Whether this error is one of the silent "no state change" cases.
    pub fn is_no_op(&self) -> bool {
        matches!(
            self,
            NotesError::NoteNotFound { .. } | NotesError::HistoryOutOfRange { .. }
        )
    }
}
