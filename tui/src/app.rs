//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, resize, frame tick)
//! - Background tasks for searches and health probes
//! - RevealController for the progressive result panel
//! - DisplayState for everything around it
//!
//! # Frame Loop
//!
//! ```text
//!   key ──► handle_key ──► submit ──► tokio::spawn(fetch) ─┐
//!                                                          │ BackendEvent
//!   tick ──► drain events ──► controller.install ◄─────────┘
//!        ──► controller.advance(delta) ──► snapshot ──► draw
//! ```
//!
//! Searches never block the loop. A failed search only changes the status
//! line; whatever result is on screen keeps revealing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;

use reveal_core::{
    install_fetched, normalize_query, FetchError, ResultFetcher, RevealConfig, RevealController,
    SearchOutcome, StructuredResult,
};

use crate::display::{result_lines, DisplayState, HealthStatus};
use crate::theme;
use crate::widgets::text_block::truncate_to_width;
use crate::widgets::{TextBlock, TextBlockState};

/// Target frame interval
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Time between backend health probes
const HEALTH_INTERVAL: Duration = Duration::from_secs(30);

/// Input box height (separator + one line)
const INPUT_HEIGHT: u16 = 2;

/// Results of background work, delivered to the frame loop
#[derive(Debug)]
pub enum BackendEvent {
    /// A search finished
    SearchFinished(Result<StructuredResult, FetchError>),
    /// A health probe finished
    Health(bool),
}

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Reveal ===
    /// Progressive reveal of the current result
    controller: RevealController,
    /// Search backend
    fetcher: Arc<dyn ResultFetcher>,
    /// Sender handed to background tasks
    events_tx: mpsc::UnboundedSender<BackendEvent>,
    /// Drained once per frame
    events_rx: mpsc::UnboundedReceiver<BackendEvent>,

    // === Display State ===
    /// Search status, health, spinner
    display: DisplayState,
    /// Result panel scroll
    results: TextBlockState,

    // === Input State ===
    /// User input buffer
    input_buffer: String,

    // === Timing ===
    /// Last frame time
    last_frame: Instant,
    /// Time until the next health probe
    health_timer: Duration,
}

impl App {
    /// Create a new App instance
    pub fn new(config: &RevealConfig, fetcher: Arc<dyn ResultFetcher>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            running: true,
            controller: RevealController::new(config.reveal.clone()),
            fetcher,
            events_tx,
            events_rx,
            display: DisplayState::new(),
            results: TextBlockState::default(),
            input_buffer: String::new(),
            last_frame: Instant::now(),
            health_timer: Duration::ZERO,
        }
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        // Render initial frame immediately so user sees UI
        self.render(terminal)?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        // Only handle Press events (not Release or Repeat)
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => tracing::warn!(error = %e, "terminal event error"),
                        None => self.running = false,
                    }
                }

                // Frame tick
                _ = tokio::time::sleep(FRAME_DURATION) => {}
            }

            self.process_backend_events();
            self.update();
            self.render(terminal)?;
        }

        Ok(())
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }

            // Submit query
            KeyCode::Enter => self.submit(),

            // Typing
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }

            // Result scrolling
            KeyCode::PageUp => self.results.page_up(),
            KeyCode::PageDown => self.results.page_down(),
            KeyCode::Home if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.results.scroll_to_top();
            }
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.results.scroll_to_bottom();
            }

            _ => {}
        }
    }

    /// Send the input buffer as a query
    ///
    /// Ignored while a search is in flight or when the input is blank.
    fn submit(&mut self) {
        if self.display.is_searching() {
            tracing::debug!("search already in flight");
            return;
        }
        let Some(query) = normalize_query(&self.input_buffer).map(str::to_string) else {
            return;
        };

        self.display.start_search(query.clone());
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&query).await;
            // Receiver is gone only once the app has exited
            let _ = tx.send(BackendEvent::SearchFinished(result));
        });
    }

    fn spawn_health_check(&self) {
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let healthy = fetcher.health_check().await;
            let _ = tx.send(BackendEvent::Health(healthy));
        });
    }

    /// Apply every finished background result
    fn process_backend_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_backend_event(event);
        }
    }

    /// Apply one background result
    pub fn apply_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::SearchFinished(fetched) => {
                match install_fetched(&mut self.controller, fetched) {
                    SearchOutcome::Installed => {
                        self.display.finish_search();
                        self.input_buffer.clear();
                        self.results.scroll_to_bottom();
                    }
                    SearchOutcome::NoResult(e) => self.display.fail_search(e.to_string()),
                    SearchOutcome::Ignored => self.display.finish_search(),
                }
            }
            BackendEvent::Health(healthy) => {
                self.display.health = if healthy {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Unreachable
                };
            }
        }
    }

    /// Advance timers by the wall time since the last frame
    fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.tick(delta);
    }

    /// Advance timers by `delta`
    pub fn tick(&mut self, delta: Duration) {
        self.display.update(delta);
        self.controller.advance(delta);

        self.health_timer = self.health_timer.saturating_sub(delta);
        if self.health_timer.is_zero() {
            self.health_timer = HEALTH_INTERVAL;
            self.spawn_health_check();
        }
    }

    /// Render the UI
    fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        terminal.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    /// Draw one frame
    pub fn draw(&mut self, frame: &mut Frame) {
        let [results_area, input_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.draw_results(frame, results_area);
        self.draw_input(frame, input_area);
        self.draw_status(frame, status_area);
    }

    fn draw_results(&mut self, frame: &mut Frame, area: Rect) {
        let inner = Rect {
            x: area.x + 1,
            width: area.width.saturating_sub(2),
            ..area
        };
        if inner.width < 4 || inner.height < 1 {
            return;
        }

        let lines = result_lines(&self.controller.snapshot(), inner.width as usize);
        frame.render_stateful_widget(TextBlock::new(&lines), inner, &mut self.results);
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let buf = frame.buffer_mut();
        let width = area.width as usize;

        let separator = "─".repeat(width);
        buf.set_string(area.x, area.y, &separator, Style::default().fg(theme::DIM_GRAY));

        if area.height < 2 {
            return;
        }
        let prompt = format!("Search: {}_", self.input_buffer);
        // Keep the end of a long query in view
        let skip = prompt.chars().count().saturating_sub(width);
        let visible: String = prompt.chars().skip(skip).collect();
        buf.set_string(
            area.x,
            area.y + 1,
            truncate_to_width(&visible, width),
            Style::default().fg(theme::USER_GREEN),
        );
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let buf = frame.buffer_mut();
        let width = area.width as usize;

        let (status, status_style) = self.display.status_text();
        let status = format!(" {status} | Esc to quit | PgUp/PgDn scroll");
        buf.set_string(area.x, area.y, truncate_to_width(&status, width), status_style);

        let health = self.display.health;
        let label = health.label();
        let label_width = label.chars().count() + 1;
        if width > label_width + status.chars().count() {
            buf.set_string(
                area.x + area.width - label_width as u16,
                area.y,
                label,
                health.style(),
            );
        }
    }

    /// Whether the app is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The reveal
    pub fn controller(&self) -> &RevealController {
        &self.controller
    }

    /// Display state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Current input
    pub fn input(&self) -> &str {
        &self.input_buffer
    }
}
