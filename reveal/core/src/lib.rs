//! Reveal Core - Headless Progressive Disclosure for DeepSearch Results
//!
//! A search backend answers a query with a structured result: the original
//! question, refined sub-questions, a thinking process, a final answer and
//! citations. This crate reveals that result section by section, one
//! character at a time, starting the next section only once the previous
//! one has finished typing. It knows nothing about terminals or browsers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Surfaces                                │
//! │        ┌──────────────┐                 ┌──────────────────┐      │
//! │        │     TUI      │                 │ Headless / tests │      │
//! │        │  (ratatui)   │                 │                  │      │
//! │        └──────┬───────┘                 └────────┬─────────┘      │
//! │               │ install / advance(elapsed) / snapshot            │
//! └───────────────┼──────────────────────────────────┼───────────────┘
//!                 │                                  │
//! ┌───────────────┼──────────────────────────────────┼───────────────┐
//! │               ▼           REVEAL CORE            ▼               │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                    RevealController                        │  │
//! │  │  ┌────────────┐  ┌─────────────┐  ┌──────────────────────┐ │  │
//! │  │  │ TimerQueue │  │  Sequencer  │  │ Renderers            │ │  │
//! │  │  │ (logical)  │  │ (pure fn)   │  │  text / list items   │ │  │
//! │  │  └────────────┘  └─────────────┘  └──────────────────────┘ │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! │  ┌──────────────────┐   ┌────────────────┐   ┌────────────────┐  │
//! │  │  SearchSession   │──►│ ResultFetcher  │   │ Config (TOML)  │  │
//! │  └──────────────────┘   └────────────────┘   └────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`RevealController`]: owns the timers and renderers of one installed result
//! - [`CharacterStreamRenderer`]: reveals one string per code point
//! - [`ListItemAggregator`]: reveals a list and completes with its last item
//! - [`transition`]: the sequencer as a pure function
//! - [`RevealSnapshot`]: what a surface reads to draw
//! - [`ResultFetcher`]: where results come from
//!
//! # Quick Start
//!
//! ```ignore
//! use reveal_core::{RevealController, RevealSettings, StructuredResult};
//! use std::time::Duration;
//!
//! let mut controller = RevealController::new(RevealSettings::default());
//! controller.install(StructuredResult::new("What is Rust?").with_final_answer("A language."));
//!
//! // Each frame: move the clock and redraw
//! controller.advance(Duration::from_millis(16));
//! for view in controller.snapshot().visible() {
//!     println!("{}: {}", view.stage.title(), view.text());
//! }
//! ```
//!
//! # Time
//!
//! Nothing in this crate sleeps or spawns timers. Time moves only when the
//! host calls [`RevealController::advance`], so every reveal is reproducible
//! in tests with a logical clock.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod config;
pub mod controller;
pub mod fetcher;
pub mod renderer;
pub mod result;
pub mod sequencer;
pub mod session;
pub mod snapshot;
pub mod stage;
pub mod timer;

pub use aggregator::ListItemAggregator;
pub use controller::RevealController;
pub use renderer::{CharacterStreamRenderer, CompletionCallback, RenderState};
pub use result::{ResponseStatus, SearchResponse, StructuredResult};
pub use sequencer::{
    transition, Effect, Rejection, SequencerEvent, SequencerPhase, SequencerState, Step,
};
pub use session::{install_fetched, normalize_query, SearchOutcome, SearchSession};
pub use snapshot::{RevealSnapshot, StageContent, StageView};
pub use stage::{RendererId, Stage, StagePlan, StageSource};
pub use timer::{TimerHandle, TimerQueue};

// Fetcher exports
pub use fetcher::{FetchError, HttpResultFetcher, ResultFetcher};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, RevealConfig, RevealSettings,
};
