use std::collections::HashSet;

use sleeknotes::{Direction, SuggestionEngine, SuggestionPopup};

fn engine_from(words: &[&str]) -> SuggestionEngine {
    let mut engine = SuggestionEngine::new();
    engine.observe(&words.join(" "));
    engine
}

#[test]
fn suggestions_are_a_bounded_subset_of_matching_vocabulary() {
    let engine = engine_from(&["testing", "tester", "testers"]);
    let text = "I am tes";

    let suggestions = engine.suggest(text, text.chars().count());

    let allowed: HashSet<&str> = ["testing", "tester", "testers"].into_iter().collect();
    assert!(!suggestions.is_empty());
    assert!(suggestions.len() <= 5);
    for suggestion in &suggestions {
        assert!(allowed.contains(suggestion.text.as_str()));
        assert_ne!(suggestion.text, "tes");
        assert_eq!(suggestion.start, 5);
    }
}

#[test]
fn suggestions_are_deterministic_for_a_fixed_vocabulary() {
    let engine = engine_from(&["banana", "bandana", "banner", "bandit"]);
    assert_eq!(engine.suggest("ban", 3), engine.suggest("ban", 3));
}

#[test]
fn vocabulary_is_never_pruned() {
    let mut engine = SuggestionEngine::new();
    engine.observe("ephemeral words");
    engine.observe("");
    assert!(engine.contains("ephemeral"));
}

#[test]
fn configurable_prefix_threshold() {
    let mut engine = SuggestionEngine::with_limits(2, 5);
    engine.observe("octopus");

    assert_eq!(engine.suggest("oc", 2)[0].text, "octopus");
    assert!(SuggestionEngine::new().suggest("oc", 2).is_empty());
}

#[test]
fn apply_suggestion_mid_text_keeps_suffix() {
    let text = "first lin\nsecond line";
    let splice = SuggestionEngine::apply_suggestion(text, 9, "line");

    assert_eq!(splice.text, "first line\nsecond line");
    assert_eq!(splice.cursor, 10);
}

#[test]
fn popup_flow_from_typing_to_acceptance() {
    let mut engine = SuggestionEngine::new();
    engine.observe("remember the reminder");
    let mut popup = SuggestionPopup::new();

    let text = "please rem";
    assert!(popup.refresh("note", &engine, text, 10));
    assert_eq!(popup.suggestions().len(), 2);

    popup.navigate(Direction::Next);
    popup.navigate(Direction::Next);
    let chosen = popup.selected().unwrap().text.clone();

    let splice = popup.accept_selected("note", text, 10).unwrap();
    assert_eq!(splice.text, format!("please {}", chosen));
    assert!(!popup.is_showing());
}

#[test]
fn popup_hides_when_the_next_keystroke_has_no_match() {
    let engine = engine_from(&["remember"]);
    let mut popup = SuggestionPopup::new();

    assert!(popup.refresh("note", &engine, "rem", 3));
    assert!(!popup.refresh("note", &engine, "remx", 4));
}

#[test]
fn dismiss_hides_the_popup() {
    let engine = engine_from(&["remember"]);
    let mut popup = SuggestionPopup::new();
    popup.refresh("note", &engine, "rem", 3);

    popup.dismiss();

    assert!(!popup.is_showing());
    assert!(popup.navigate(Direction::Next).is_none());
}
