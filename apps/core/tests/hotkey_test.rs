use learnhub_core::hotkey::{parse_chord, KeyEvent, Platform, DEFAULT_SEARCH_CHORD};

#[test]
fn parses_default_search_chord() {
    let chord = parse_chord(DEFAULT_SEARCH_CHORD).unwrap();
    assert_eq!(chord.key(), "K");
    assert_eq!(chord.to_string(), "Mod+K");
}

#[test]
fn rejects_unknown_modifier_and_bare_key() {
    assert!(parse_chord("Hyper+K").is_err());
    assert!(parse_chord("K").is_err());
    assert!(parse_chord("Ctrl+Enter").is_err());
}

#[test]
fn explicit_ctrl_chord_matches_on_every_platform() {
    let chord = parse_chord("Ctrl+K").unwrap();
    let event = KeyEvent::new("k").with_ctrl();
    assert!(chord.matches(&event, Platform::Other));
    assert!(chord.matches(&event, Platform::MacOs));
}
