use chrono::{DateTime, Utc};
use log::{debug, error};
use serde_json::Value;

use crate::{HistoryEntry, Note, NotesError, Result};

/// File name used for full JSON exports.
pub const EXPORT_FILE_NAME: &str = "notepad-backup.json";

const WORDS_PER_MINUTE: usize = 200;
const PREVIEW_CHARS: usize = 50;

/// Word, character and reading-time figures for a note body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteStats {
    pub words: usize,
    pub characters: usize,
    /// Minutes at 200 words per minute, rounded up
    pub reading_minutes: usize,
}

impl NoteStats {
    pub fn of(content: &str) -> Self {
        let words = content.split_whitespace().count();
        NoteStats {
            words,
            characters: content.chars().count(),
            reading_minutes: words.div_ceil(WORDS_PER_MINUTE),
        }
    }

    pub fn reading_time(&self) -> String {
        if self.reading_minutes < 1 {
            "less than 1 min".to_string()
        } else {
            format!("{} min", self.reading_minutes)
        }
    }
}

/// One row of the history listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    /// Index into the stored, oldest-first history
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub preview: String,
}

/// History rows newest first, keeping their storage indices.
pub fn history_listing(history: &[HistoryEntry]) -> Vec<HistoryItem> {
    history
        .iter()
        .enumerate()
        .rev()
        .map(|(index, entry)| HistoryItem {
            index,
            timestamp: entry.timestamp,
            preview: preview(&entry.content),
        })
        .collect()
}

/// First 50 chars, with an ellipsis when the text is longer
pub fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Text file name for a single-note download.
///
/// Everything except ASCII word characters and whitespace is stripped.
pub fn download_file_name(title: &str) -> String {
    let stem: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    format!("{}.txt", stem)
}

/// Pretty JSON array of every note, as written to the export file
pub fn export_json(notes: &[Note]) -> Result<String> {
    if notes.is_empty() {
        return Err(NotesError::NothingToExport);
    }
    Ok(serde_json::to_string_pretty(notes)?)
}

/// Parses an import payload; anything but an array of notes is rejected.
pub fn parse_import(raw: &[u8]) -> Result<Vec<Note>> {
    let text = std::str::from_utf8(raw).map_err(|e| NotesError::MalformedImport {
        message: format!("payload is not UTF-8: {}", e),
    })?;

    let value: Value = serde_json::from_str(text).map_err(|e| {
        error!("Failed to import notes: {}", e);
        NotesError::MalformedImport {
            message: format!("payload is not JSON: {}", e),
        }
    })?;

    if !value.is_array() {
        return Err(NotesError::MalformedImport {
            message: "expected a JSON array of notes".to_string(),
        });
    }

    let notes: Vec<Note> =
        serde_json::from_value(value).map_err(|e| NotesError::MalformedImport {
            message: format!("entry is not a note: {}", e),
        })?;

    if let Some(note) = notes.iter().find(|note| note.id.is_empty()) {
        return Err(NotesError::MalformedImport {
            message: format!("note {:?} has an empty id", note.title),
        });
    }

    debug!("Parsed {} notes from import payload", notes.len());
    Ok(notes)
}
