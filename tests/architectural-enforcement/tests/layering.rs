//! Layering rules for the workspace

use architectural_enforcement::{declared_dependencies, find_in_production, report};

const CORE: &str = "client/core";
const TUI: &str = "tui";

#[test]
fn core_has_no_ui_dependencies() {
    let deps = declared_dependencies(CORE);
    assert!(!deps.is_empty(), "could not read {CORE}/Cargo.toml");

    for forbidden in ["ratatui", "crossterm", "textwrap", "unicode-width"] {
        assert!(
            !deps.iter().any(|d| d == forbidden),
            "{CORE} must stay headless but depends on {forbidden}"
        );
    }
}

#[test]
fn core_sources_do_not_use_ui_crates() {
    for pattern in ["ratatui::", "crossterm::"] {
        let violations = find_in_production(CORE, pattern);
        assert!(violations.is_empty(), "{}", report(&violations));
    }
}

#[test]
fn only_core_talks_http() {
    assert!(!declared_dependencies(TUI).iter().any(|d| d == "reqwest"));

    let violations = find_in_production(TUI, "reqwest::");
    assert!(violations.is_empty(), "{}", report(&violations));
}

#[test]
fn tui_does_not_bypass_the_state_store() {
    // backend calls go through Effect / EffectRunner
    for pattern in [".post_message(", ".create_conversation(", ".delete_conversation("] {
        let violations = find_in_production(TUI, pattern);
        assert!(violations.is_empty(), "{}", report(&violations));
    }
}
