//! Theme and Colors
//!
//! Palette for the search box and the result panel.

use ratatui::style::{Color, Modifier, Style};

use reveal_core::Stage;

// ============================================================================
// UI Colors
// ============================================================================

/// Accent for headings and the prompt
pub const ACCENT_CYAN: Color = Color::Rgb(110, 200, 230);

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Body text
pub const BODY_TEXT: Color = Color::Rgb(220, 220, 220);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Success green
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Warm yellow for the final answer
pub const ANSWER_YELLOW: Color = Color::Rgb(255, 223, 128);

/// Link blue for citations
pub const LINK_BLUE: Color = Color::Rgb(100, 180, 255);

// ============================================================================
// Spinner
// ============================================================================

/// Frames of the in-flight search spinner
pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Cursor drawn after the stage that is still typing
pub const TYPING_CURSOR: &str = "▌";

// ============================================================================
// Styles
// ============================================================================

/// Style of a stage heading
pub fn heading_style() -> Style {
    Style::default().fg(ACCENT_CYAN).add_modifier(Modifier::BOLD)
}

/// Style of a stage's revealed text
pub fn stage_style(stage: Stage) -> Style {
    match stage {
        Stage::SearchComplete => Style::default().fg(SUCCESS_GREEN),
        Stage::FinalAnswer => Style::default().fg(ANSWER_YELLOW),
        Stage::Citations => Style::default().fg(LINK_BLUE),
        Stage::RefinedThinking => Style::default().fg(DIM_GRAY),
        Stage::OriginalQuestion | Stage::RefinedQuestions | Stage::ThinkingProcess => {
            Style::default().fg(BODY_TEXT)
        }
    }
}
