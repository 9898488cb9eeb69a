//! Shared data structures for the sleeknotes application.
//!
//! This module contains the small value types passed between the store, the
//! suggestion engine and the adapters, plus the CLI subcommands.
use std::{fmt, path::PathBuf, str::FromStr};

use clap::Subcommand;
use serde::{Deserialize, Serialize};

use crate::NotesError;

/// A specialized Result type for sleeknotes operations.
pub type Result<T> = std::result::Result<T, NotesError>;

/// Outcome of merging an imported note list into the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Number of notes found in the payload
    pub total: usize,
    /// Number of notes appended to the collection
    pub added: usize,
    /// Number of notes dropped because their id was already present
    pub skipped: usize,
}

/// A completion candidate for the word at the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// The full word to insert
    pub text: String,
    /// Char offset in the text where the word being replaced begins
    pub start: usize,
}

/// Result of splicing a chosen completion into a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub text: String,
    /// Char offset immediately after the inserted word
    pub cursor: usize,
}

/// Direction for cycling through suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Guesses the preferred theme from the terminal background.
    ///
    /// `COLORFGBG` is `fg;bg`; background colours 0-6 and 8 are dark.
    pub fn detect() -> Theme {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|value| Self::from_colorfgbg(&value))
            .unwrap_or(Theme::Light)
    }

    pub(crate) fn from_colorfgbg(value: &str) -> Option<Theme> {
        let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        Some(match background {
            0..=6 | 8 => Theme::Dark,
            _ => Theme::Light,
        })
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(NotesError::ConfigError {
                message: format!("Unknown theme: {}", other),
            }),
        }
    }
}

/// Available subcommands for the sleeknotes application
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note and make it active
    New {
        /// Title of the note
        #[clap(short = 'T', long)]
        title: Option<String>,
    },

    /// List notes in collection order
    List {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show a note with its statistics
    Show {
        /// ID of the note to show (defaults to the active note)
        id: Option<String>,
    },

    /// Make a note the active one
    Select {
        /// ID of the note to select
        id: String,
    },

    /// Rename a note
    Rename {
        /// ID of the note to rename
        id: String,

        /// New title; blank titles become the default title
        title: String,
    },

    /// Replace the content of a note
    Edit {
        /// ID of the note to edit
        id: String,

        /// New content for the note
        #[clap(short, long)]
        content: Option<String>,

        /// Path to a file containing the new note content
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Open the current content in the editor
        #[clap(short, long)]
        editor: bool,
    },

    /// Delete a note by ID
    Delete {
        /// ID of the note to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Show the version history of a note, newest first
    History {
        /// ID of the note
        id: String,
    },

    /// Restore a note from a history entry
    Restore {
        /// ID of the note
        id: String,

        /// History index as printed by `history`
        index: usize,
    },

    /// Export every note as a JSON backup
    Export {
        /// Path of the backup file
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge notes from a JSON backup
    Import {
        /// Path to the backup file
        source: PathBuf,
    },

    /// Write a note's content to a text file
    Download {
        /// ID of the note
        id: String,

        /// Directory to write into
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// List completions for the word before a cursor offset
    Suggest {
        /// ID of the note
        id: String,

        /// Char offset of the cursor in the note content
        cursor: usize,
    },

    /// Apply a completion at a cursor offset and commit the result
    Complete {
        /// ID of the note
        id: String,

        /// Char offset of the cursor in the note content
        cursor: usize,

        /// The word to insert
        choice: String,
    },

    /// Turn autocomplete on or off
    Autocomplete {
        /// `on` or `off`
        #[clap(value_parser = ["on", "off"])]
        state: String,
    },

    /// Show, set or toggle the colour theme
    Theme {
        /// `light`, `dark` or `toggle`
        #[clap(value_parser = ["light", "dark", "toggle"])]
        value: Option<String>,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}
