//! DeepSearch TUI - Terminal interface for progressive search results
//!
//! A search box over a result panel. Answers from the search backend are
//! revealed stage by stage, one character at a time, by
//! [`reveal_core::RevealController`].
//!
//! # Architecture
//!
//! - **App**: frame loop, key handling, background searches
//! - **Display**: snapshot to styled lines, status line state
//! - **Widgets**: borderless scrollable text block
//! - **Theme**: palette and per-stage styles

pub mod app;
pub mod display;
pub mod theme;
pub mod widgets;

pub use app::App;
