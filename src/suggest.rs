//! Word completion from the vocabulary of everything typed so far.
//!
//! Offsets are counted in chars, never bytes, so a cursor can not land inside
//! a multi-byte character.
use std::collections::BTreeSet;

use log::trace;

use crate::{Splice, Suggestion};

/// Shortest typed prefix that produces suggestions.
pub const DEFAULT_MIN_PREFIX_LEN: usize = 3;

/// Most suggestions offered at once.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// Words must be longer than this to enter the vocabulary.
const MIN_WORD_LEN_EXCLUSIVE: usize = 3;

/// Accumulated vocabulary and the completion rules applied to it.
///
/// The vocabulary only grows; deleting text never removes a word. It is kept
/// sorted, so suggestions come out in lexicographic order.
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    vocabulary: BTreeSet<String>,
    min_prefix_len: usize,
    max_suggestions: usize,
}

impl SuggestionEngine {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MIN_PREFIX_LEN, DEFAULT_MAX_SUGGESTIONS)
    }

    pub fn with_limits(min_prefix_len: usize, max_suggestions: usize) -> Self {
        Self {
            vocabulary: BTreeSet::new(),
            min_prefix_len,
            max_suggestions,
        }
    }

    /// Adds every whitespace-delimited token longer than three chars,
    /// lowercased. Returns how many words were new.
    pub fn observe(&mut self, text: &str) -> usize {
        let before = self.vocabulary.len();
        self.vocabulary.extend(
            text.split_whitespace()
                .filter(|word| word.chars().count() > MIN_WORD_LEN_EXCLUSIVE)
                .map(str::to_lowercase),
        );

        let added = self.vocabulary.len() - before;
        if added > 0 {
            trace!("Vocabulary grew by {} to {} words", added, self.vocabulary.len());
        }
        added
    }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.iter().map(String::as_str)
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.vocabulary.contains(word)
    }

    /// Completions for the word ending at `cursor`.
    ///
    /// Only text before the cursor counts. Exact matches are excluded.
    pub fn suggest(&self, text: &str, cursor: usize) -> Vec<Suggestion> {
        let (start, word) = current_word(text, cursor);
        let prefix = word.to_lowercase();

        if prefix.chars().count() < self.min_prefix_len {
            return Vec::new();
        }

        self.vocabulary
            .range(prefix.clone()..)
            .take_while(|entry| entry.starts_with(&prefix))
            .filter(|entry| **entry != prefix)
            .take(self.max_suggestions)
            .map(|entry| Suggestion {
                text: entry.clone(),
                start,
            })
            .collect()
    }

    /// Replaces the word ending at `cursor` with `chosen`.
    pub fn apply_suggestion(text: &str, cursor: usize, chosen: &str) -> Splice {
        let (start, _) = current_word(text, cursor);
        let start_byte = byte_offset(text, start);
        let cursor_byte = byte_offset(text, cursor);

        let mut spliced = String::with_capacity(text.len() + chosen.len());
        spliced.push_str(&text[..start_byte]);
        spliced.push_str(chosen);
        spliced.push_str(&text[cursor_byte..]);

        Splice {
            text: spliced,
            cursor: start + chosen.chars().count(),
        }
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The last whitespace-delimited token before `cursor`, with its start offset.
///
/// A cursor past the end of the text is clamped to the end.
pub fn current_word(text: &str, cursor: usize) -> (usize, &str) {
    let cursor = cursor.min(text.chars().count());
    let before = &text[..byte_offset(text, cursor)];
    let word = before.rsplit(char::is_whitespace).next().unwrap_or("");

    (cursor - word.chars().count(), word)
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(index, _)| index)
}
