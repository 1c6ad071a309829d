//! Integration Test: Reveal Core Rules
//!
//! **Policy**: the reveal core moves time only through its logical timer
//! queue, never touches a terminal, and propagates errors instead of
//! panicking.
//! **Exceptions**: frame rate limiting in the TUI frame loop, test code.

use std::fs;
use std::path::Path;

use architectural_enforcement::{assert_clean, scan, workspace_root};

const CORE_SRC: &str = "reveal/core/src";
const TUI_SRC: &str = "tui/src";

// =============================================================================
// Time
// =============================================================================

#[test]
fn test_no_sleep_in_core() {
    let violations = scan(CORE_SRC, |_, lines, idx| is_sleep(lines[idx].1));
    assert_clean(
        "The reveal core must not sleep; schedule on the TimerQueue instead",
        &violations,
    );
}

#[test]
fn test_no_wall_clock_in_core() {
    let violations = scan(CORE_SRC, |_, lines, idx| {
        let code = lines[idx].1;
        code.contains("Instant::now") || code.contains("SystemTime::now")
    });
    assert_clean(
        "The reveal core runs on a logical clock; hosts pass elapsed time to advance()",
        &violations,
    );
}

#[test]
fn test_tui_sleeps_only_for_frame_limiting() {
    let violations = scan(TUI_SRC, |path, lines, idx| {
        is_sleep(lines[idx].1)
            && !(path.ends_with("tui/src/app.rs") && is_frame_limiting_context(lines, idx))
    });
    assert_clean(
        "TUI sleeps are only allowed as the frame tick in app.rs",
        &violations,
    );
}

// =============================================================================
// Separation of Concerns
// =============================================================================

#[test]
fn test_core_has_no_ui_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("reveal/core/Cargo.toml"))
        .expect("read reveal-core manifest");
    for forbidden in ["ratatui", "crossterm"] {
        assert!(
            !manifest.contains(forbidden),
            "reveal-core must not depend on {forbidden}"
        );
    }

    let violations = scan(CORE_SRC, |_, lines, idx| {
        let code = lines[idx].1;
        code.contains("ratatui::") || code.contains("crossterm::")
    });
    assert_clean("The reveal core must stay headless", &violations);
}

#[test]
fn test_no_panicking_shortcuts_in_core() {
    let violations = scan(CORE_SRC, |_, lines, idx| {
        let code = lines[idx].1;
        code.contains(".unwrap()") || code.contains(".expect(") || code.contains("panic!(")
    });
    assert_clean(
        "Production code in the reveal core propagates errors instead of panicking",
        &violations,
    );
}

#[test]
fn test_core_does_not_spawn_threads() {
    let violations = scan(CORE_SRC, |_, lines, idx| {
        let code = lines[idx].1;
        code.contains("thread::spawn") || code.contains("tokio::spawn")
    });
    assert_clean(
        "The reveal core is single-threaded; hosts own tasks and threads",
        &violations,
    );
}

// =============================================================================
// Helpers
// =============================================================================

fn is_sleep(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

/// Sleep used as the frame tick (looks for frame wording nearby)
fn is_frame_limiting_context(lines: &[(usize, &str)], idx: usize) -> bool {
    let start = idx.saturating_sub(5);
    let end = (idx + 2).min(lines.len());
    lines[start..end].iter().any(|(_, code)| {
        let code = code.to_lowercase();
        code.contains("frame_duration") || code.contains("fps")
    })
}

#[test]
fn test_scanned_directories_exist() {
    for dir in [CORE_SRC, TUI_SRC] {
        assert!(
            Path::new(&workspace_root().join(dir)).is_dir(),
            "{dir} is missing; the rules above would pass vacuously"
        );
    }
}
