//! Display State Types
//!
//! Types that represent what the TUI shows around the reveal: the state of
//! the current search, backend health, and the result panel's lines.
//!
//! # Design Philosophy
//!
//! The TUI is a thin client. The reveal itself lives in
//! [`RevealController`](reveal_core::RevealController); this module only
//! turns its [`RevealSnapshot`] into styled, wrapped lines.

use std::time::Duration;

use ratatui::style::Style;

use reveal_core::{RevealSnapshot, Stage, StageContent, StageView};

use crate::theme;

/// Time each spinner frame is shown
const SPINNER_FRAME: Duration = Duration::from_millis(80);

/// One wrapped, styled line of the result panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayLine {
    /// Line text, already wrapped to the panel width
    pub text: String,
    /// Style to draw it with
    pub style: Style,
}

impl DisplayLine {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn blank() -> Self {
        Self::new(String::new(), Style::default())
    }
}

/// Where the current search stands
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SearchStatus {
    /// Nothing in flight
    #[default]
    Idle,
    /// Waiting for the backend
    Searching {
        /// Query that was sent
        query: String,
    },
    /// The last search produced no result
    Failed {
        /// Why, for the status line
        message: String,
    },
}

/// Backend reachability as last probed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HealthStatus {
    /// Not probed yet
    #[default]
    Unknown,
    /// Health probe answered ok
    Healthy,
    /// Health probe failed
    Unreachable,
}

impl HealthStatus {
    /// Short label for the status line
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "backend ?",
            Self::Healthy => "backend ok",
            Self::Unreachable => "backend down",
        }
    }

    /// Color of the label
    pub fn style(self) -> Style {
        match self {
            Self::Unknown => Style::default().fg(theme::DIM_GRAY),
            Self::Healthy => Style::default().fg(theme::SUCCESS_GREEN),
            Self::Unreachable => Style::default().fg(theme::ERROR_RED),
        }
    }
}

/// Everything the TUI draws that is not the reveal itself
#[derive(Clone, Debug, Default)]
pub struct DisplayState {
    /// Current search
    pub search: SearchStatus,
    /// Backend health
    pub health: HealthStatus,
    /// Time spent searching, drives the spinner
    spinner_elapsed: Duration,
}

impl DisplayState {
    /// Create an idle display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance display timers
    pub fn update(&mut self, delta: Duration) {
        if self.is_searching() {
            self.spinner_elapsed += delta;
        }
    }

    /// Whether a search is in flight
    pub fn is_searching(&self) -> bool {
        matches!(self.search, SearchStatus::Searching { .. })
    }

    /// Mark a search as sent
    pub fn start_search(&mut self, query: impl Into<String>) {
        self.search = SearchStatus::Searching {
            query: query.into(),
        };
        self.spinner_elapsed = Duration::ZERO;
    }

    /// Mark the in-flight search as answered
    pub fn finish_search(&mut self) {
        self.search = SearchStatus::Idle;
    }

    /// Mark the in-flight search as failed
    pub fn fail_search(&mut self, message: impl Into<String>) {
        self.search = SearchStatus::Failed {
            message: message.into(),
        };
    }

    /// Current spinner frame
    pub fn spinner(&self) -> &'static str {
        let frames = theme::SPINNER_FRAMES;
        let index = (self.spinner_elapsed.as_millis() / SPINNER_FRAME.as_millis()) as usize;
        frames[index % frames.len()]
    }

    /// Left part of the status line
    pub fn status_text(&self) -> (String, Style) {
        match &self.search {
            SearchStatus::Idle => (
                "Enter to search".to_string(),
                Style::default().fg(theme::DIM_GRAY),
            ),
            SearchStatus::Searching { query } => (
                format!("{} Searching: {query}", self.spinner()),
                Style::default().fg(theme::ACCENT_CYAN),
            ),
            SearchStatus::Failed { message } => (
                format!("No result: {message}"),
                Style::default().fg(theme::ERROR_RED),
            ),
        }
    }
}

/// Lay out every visible stage of `snapshot` as wrapped lines
///
/// Each stage gets its heading, then its revealed content. The stage that
/// is still typing ends with a cursor.
pub fn result_lines(snapshot: &RevealSnapshot, width: usize) -> Vec<DisplayLine> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for view in snapshot.visible() {
        let title = view.stage.title();
        if !title.is_empty() {
            push_wrapped(&mut lines, title, width, theme::heading_style());
        }

        let style = theme::stage_style(view.stage);
        for text in stage_text_lines(view) {
            push_wrapped(&mut lines, &text, width, style);
        }
        lines.push(DisplayLine::blank());
    }

    lines
}

/// Unwrapped text lines of one stage, cursor included
fn stage_text_lines(view: &StageView) -> Vec<String> {
    let mut out: Vec<String> = match &view.content {
        StageContent::Text(text) => text.split('\n').map(str::to_string).collect(),
        StageContent::Items(items) => items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_empty())
            .map(|(index, item)| match view.stage {
                Stage::Citations => format!("[{}] {item}", index + 1),
                _ => format!("• {item}"),
            })
            .collect(),
    };

    if view.active {
        match out.last_mut() {
            Some(last) => last.push_str(theme::TYPING_CURSOR),
            None => out.push(theme::TYPING_CURSOR.to_string()),
        }
    }
    out
}

fn push_wrapped(lines: &mut Vec<DisplayLine>, text: &str, width: usize, style: Style) {
    if text.is_empty() {
        lines.push(DisplayLine::new(String::new(), style));
        return;
    }
    for wrapped in textwrap::wrap(text, width) {
        lines.push(DisplayLine::new(wrapped.into_owned(), style));
    }
}
