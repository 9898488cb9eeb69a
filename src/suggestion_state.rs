//! Visibility and selection state of the completion popup.

use crate::{current_word, Direction, Splice, Suggestion, SuggestionEngine};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PopupState {
    #[default]
    Hidden,
    Showing {
        /// Note whose draft triggered the popup
        note_id: String,
        suggestions: Vec<Suggestion>,
        /// No candidate is highlighted until the user navigates
        selected: Option<usize>,
        /// Char offset where the triggering word starts
        anchor: usize,
    },
}

/// Drives the Hidden/Showing machine from engine output and user input.
#[derive(Debug, Clone, Default)]
pub struct SuggestionPopup {
    state: PopupState,
}

impl SuggestionPopup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PopupState {
        &self.state
    }

    pub fn is_showing(&self) -> bool {
        matches!(self.state, PopupState::Showing { .. })
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        match &self.state {
            PopupState::Showing { suggestions, .. } => suggestions,
            PopupState::Hidden => &[],
        }
    }

    /// Note the showing popup belongs to
    pub fn note_id(&self) -> Option<&str> {
        match &self.state {
            PopupState::Showing { note_id, .. } => Some(note_id),
            PopupState::Hidden => None,
        }
    }

    pub fn selected(&self) -> Option<&Suggestion> {
        match &self.state {
            PopupState::Showing {
                suggestions,
                selected: Some(index),
                ..
            } => suggestions.get(*index),
            _ => None,
        }
    }

    /// Recomputes candidates after a content change in `note_id`. Returns
    /// whether the popup is showing afterwards.
    pub fn refresh(
        &mut self,
        note_id: &str,
        engine: &SuggestionEngine,
        text: &str,
        cursor: usize,
    ) -> bool {
        let suggestions = engine.suggest(text, cursor);

        self.state = if suggestions.is_empty() {
            PopupState::Hidden
        } else {
            PopupState::Showing {
                note_id: note_id.to_string(),
                anchor: suggestions[0].start,
                suggestions,
                selected: None,
            }
        };
        self.is_showing()
    }

    /// Moves the highlight, wrapping at both ends.
    pub fn navigate(&mut self, direction: Direction) -> Option<&Suggestion> {
        if let PopupState::Showing {
            suggestions,
            selected,
            ..
        } = &mut self.state
        {
            let len = suggestions.len();
            let next = match (direction, *selected) {
                (Direction::Next, None) => 0,
                (Direction::Next, Some(index)) => (index + 1) % len,
                (Direction::Previous, None) | (Direction::Previous, Some(0)) => len - 1,
                (Direction::Previous, Some(index)) => index - 1,
            };
            *selected = Some(next);
        }
        self.selected()
    }

    /// Applies the highlighted candidate, if any, and hides the popup.
    pub fn accept_selected(
        &mut self,
        note_id: &str,
        text: &str,
        cursor: usize,
    ) -> Option<Splice> {
        let chosen = self.selected()?.text.clone();
        self.accept(note_id, text, cursor, &chosen)
    }

    /// Applies `chosen` at the cursor and hides the popup.
    ///
    /// Does nothing unless the popup is showing for `note_id`.
    pub fn accept(
        &mut self,
        note_id: &str,
        text: &str,
        cursor: usize,
        chosen: &str,
    ) -> Option<Splice> {
        if self.note_id() != Some(note_id) {
            return None;
        }

        self.dismiss();
        Some(SuggestionEngine::apply_suggestion(text, cursor, chosen))
    }

    pub fn dismiss(&mut self) {
        self.state = PopupState::Hidden;
    }

    /// Hides the popup once the cursor leaves the word that triggered it,
    /// including moves inside another note.
    pub fn cursor_moved(&mut self, note_id: &str, text: &str, cursor: usize) {
        let left = match &self.state {
            PopupState::Showing {
                note_id: owner,
                anchor,
                ..
            } => {
                let (start, word) = current_word(text, cursor);
                owner != note_id || word.is_empty() || start != *anchor
            }
            PopupState::Hidden => false,
        };
        if left {
            self.dismiss();
        }
    }
}
