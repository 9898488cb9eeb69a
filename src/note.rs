//! Core note value types.
//!
//! A [`Note`] is never edited in place by callers: every mutation builds a
//! new value from the old one, and the store swaps the whole value in.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of history snapshots kept per note.
pub const HISTORY_LIMIT: usize = 10;

/// Title used when the user leaves the title blank.
pub const DEFAULT_TITLE: &str = "Untitled Note";

/// A prior full-text snapshot of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The superseded content
    pub content: String,
    /// When that content was superseded
    #[serde(with = "crate::time_serde")]
    pub timestamp: DateTime<Utc>,
}

/// Represents a single note in our system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for the note
    pub id: String,
    /// Note title
    pub title: String,
    /// Committed note text
    pub content: String,
    /// When the note was created
    #[serde(with = "crate::time_serde")]
    pub created: DateTime<Utc>,
    /// Last title or content modification
    #[serde(with = "crate::time_serde")]
    pub updated: DateTime<Utc>,
    /// Prior snapshots, oldest first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Note {
    /// Creates an empty note with an explicit id
    pub fn with_id(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Note {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            content: String::new(),
            created: now,
            updated: now,
            history: Vec::new(),
        }
    }

    /// Returns a copy carrying the normalized title.
    pub fn renamed(&self, raw_title: &str, now: DateTime<Utc>) -> Note {
        Note {
            title: normalize_title(raw_title),
            updated: now,
            ..self.clone()
        }
    }

    /// Commits `new_content`, snapshotting the current content into history.
    ///
    /// Returns `None` when the content is unchanged. Empty prior content is
    /// never snapshotted, and the history is trimmed from the front so it
    /// holds at most [`HISTORY_LIMIT`] entries.
    pub fn committed(&self, new_content: &str, now: DateTime<Utc>) -> Option<Note> {
        if self.content == new_content {
            return None;
        }

        let mut history = self.history.clone();
        if !self.content.is_empty() {
            while history.len() >= HISTORY_LIMIT {
                history.remove(0);
            }
            history.push(HistoryEntry {
                content: self.content.clone(),
                timestamp: now,
            });
        }

        Some(Note {
            content: new_content.to_string(),
            updated: now,
            history,
            ..self.clone()
        })
    }

    /// Restores `history[index]` and drops that entry and everything after it.
    ///
    /// Returns `None` when `index` is out of bounds.
    pub fn restored(&self, index: usize, now: DateTime<Utc>) -> Option<Note> {
        let entry = self.history.get(index)?;

        Some(Note {
            content: entry.content.clone(),
            updated: now,
            history: self.history[..index].to_vec(),
            ..self.clone()
        })
    }

    /// Title as shown in lists; older exports may carry an empty one.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_TITLE
        } else {
            &self.title
        }
    }
}

/// Trims the raw title, falling back to [`DEFAULT_TITLE`] when nothing is left.
pub fn normalize_title(raw_title: &str) -> String {
    let trimmed = raw_title.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}
