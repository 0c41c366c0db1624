//! No blocking calls in async production code

use architectural_enforcement::{find_in_production, report};

const CRATES: [&str; 2] = ["client/core", "tui"];

#[test]
fn no_thread_sleep() {
    for dir in CRATES {
        let violations = find_in_production(dir, "thread::sleep");
        assert!(violations.is_empty(), "{}", report(&violations));
    }
}

#[test]
fn no_blocking_http_client() {
    for dir in CRATES {
        let violations = find_in_production(dir, "reqwest::blocking");
        assert!(violations.is_empty(), "{}", report(&violations));
    }
}

#[test]
fn no_block_on_inside_runtime() {
    for dir in CRATES {
        let violations = find_in_production(dir, "block_on(");
        assert!(violations.is_empty(), "{}", report(&violations));
    }
}
