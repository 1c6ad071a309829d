//! Reveal Controller
//!
//! Imperative shell around the [`sequencer`](crate::sequencer). Owns the
//! timer queue, the renderers of the installed result and the completion
//! channel, and carries out whatever effect each transition asks for.
//!
//! # Event Flow
//!
//! ```text
//!  install(result) ──► transition(Install) ──► Restart(stage 0)
//!                                                   │ start renderer
//!                                                   ▼
//!  advance(elapsed) ──► TimerQueue::pop_due ──► renderer.on_timer
//!                                                   │ last code point
//!                                                   ▼
//!                          completion channel ◄── on_complete()
//!                                  │
//!                                  ▼
//!                    transition(StageCompleted) ──► Activate(next) / Finished
//! ```
//!
//! Completion hooks never call back into the controller. They push a
//! `(generation, stage)` pair onto an unbounded channel which is drained
//! after every timer fire, so a hook that fires synchronously (empty text,
//! empty list) is handled the same way as one that fires from a tick.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::aggregator::ListItemAggregator;
use crate::config::RevealSettings;
use crate::renderer::{CharacterStreamRenderer, CompletionCallback};
use crate::result::StructuredResult;
use crate::sequencer::{
    transition, Effect, Rejection, SequencerEvent, SequencerPhase, SequencerState, Step,
};
use crate::snapshot::{RevealSnapshot, StageContent, StageView};
use crate::stage::{RendererId, Stage, StagePlan, StageSource};
use crate::timer::TimerQueue;

/// Completion notice pushed by a stage's hook
#[derive(Clone, Copy, Debug)]
struct StageCompletion {
    generation: u64,
    stage: Stage,
}

/// Renderer backing one stage
#[derive(Debug)]
enum StageRenderer {
    Text(CharacterStreamRenderer),
    List(ListItemAggregator),
}

impl StageRenderer {
    fn reset(&mut self, timers: &mut TimerQueue<RendererId>) {
        match self {
            Self::Text(renderer) => renderer.reset(timers),
            Self::List(aggregator) => aggregator.reset(timers),
        }
    }

    fn content(&self) -> StageContent {
        match self {
            Self::Text(renderer) => StageContent::Text(renderer.revealed().to_string()),
            Self::List(aggregator) => StageContent::Items(
                aggregator
                    .revealed_items()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }
}

/// Drives the progressive reveal of one result at a time
pub struct RevealController {
    /// Cadence and literals
    settings: RevealSettings,
    /// Pending reveal timers
    timers: TimerQueue<RendererId>,
    /// Sequencer state
    state: SequencerState,
    /// Plan of the installed result
    plan: StagePlan,
    /// Installed result, shared read-only by its renderers
    result: Option<Arc<StructuredResult>>,
    /// Renderers of activated stages
    renderers: BTreeMap<Stage, StageRenderer>,
    /// Handed (cloned) to every completion hook
    completions_tx: mpsc::UnboundedSender<StageCompletion>,
    /// Drained after every fire
    completions_rx: mpsc::UnboundedReceiver<StageCompletion>,
}

impl RevealController {
    /// Create an idle controller
    #[must_use]
    pub fn new(settings: RevealSettings) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            settings,
            timers: TimerQueue::new(),
            state: SequencerState::default(),
            plan: StagePlan::default(),
            result: None,
            renderers: BTreeMap::new(),
            completions_tx,
            completions_rx,
        }
    }

    /// Install a new result and start revealing it from the first stage
    ///
    /// Everything belonging to a previously installed result is cancelled
    /// first; none of its timers or completions can reach the new sequence.
    pub fn install(&mut self, result: impl Into<Arc<StructuredResult>>) {
        let result = result.into();
        let plan = StagePlan::for_result(&result);
        let step = transition(&self.state, &plan, SequencerEvent::Install);

        tracing::info!(
            generation = step.state.generation,
            stages = plan.len(),
            refined_questions = result.refined_questions.len(),
            "installing search result"
        );

        self.cancel_all();
        self.plan = plan;
        self.result = Some(result);
        self.apply(step);
        self.settle();
    }

    /// Cancel everything and return to idle
    pub fn reset(&mut self) {
        let step = transition(&self.state, &self.plan, SequencerEvent::Reset);
        self.apply(step);
        self.result = None;
        self.plan = StagePlan::default();
    }

    /// Move the logical clock forward by `elapsed`
    ///
    /// Fires every reveal due in that window in deadline order, advancing
    /// stages as their completions arrive. Returns the number of code points
    /// revealed.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let until = self.timers.now().saturating_add(elapsed);
        let mut revealed = 0;

        while let Some((handle, id)) = self.timers.pop_due(until) {
            let handled = match self.renderers.get_mut(&id.stage) {
                Some(StageRenderer::Text(renderer)) => renderer.on_timer(handle, &mut self.timers),
                Some(StageRenderer::List(aggregator)) => {
                    aggregator.on_timer(id, handle, &mut self.timers)
                }
                None => false,
            };
            if handled {
                revealed += 1;
            } else {
                tracing::trace!(renderer = ?id, "timer without a live renderer");
            }
            self.settle();
        }

        self.timers.advance_clock(until);
        revealed
    }

    /// Fire reveals until nothing is pending, returning the logical time spent
    ///
    /// Only terminates because every renderer reveals a finite string.
    pub fn run_to_completion(&mut self) -> Duration {
        let start = self.timers.now();
        while let Some(delay) = self.next_deadline() {
            self.advance(delay);
        }
        self.timers.now().saturating_sub(start)
    }

    /// Host read model for every stage of the installed plan
    #[must_use]
    pub fn snapshot(&self) -> RevealSnapshot {
        let active = self.active_stage();
        let done = self.state.phase == SequencerPhase::Done;

        let stages = self
            .plan
            .stages()
            .iter()
            .map(|&stage| {
                let visible = self.state.is_visible(stage);
                let is_active = active == Some(stage);
                let content = match self.renderers.get(&stage) {
                    Some(renderer) => renderer.content(),
                    None if stage.is_list() => StageContent::Items(Vec::new()),
                    None => StageContent::Text(String::new()),
                };
                StageView {
                    stage,
                    visible,
                    active: is_active,
                    complete: visible && (done || !is_active),
                    content,
                }
            })
            .collect();

        RevealSnapshot {
            generation: self.state.generation,
            phase: self.state.phase,
            stages,
        }
    }

    /// Sequencer state
    #[must_use]
    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> SequencerPhase {
        self.state.phase
    }

    /// Plan of the installed result
    #[must_use]
    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    /// Installed result
    #[must_use]
    pub fn result(&self) -> Option<&Arc<StructuredResult>> {
        self.result.as_ref()
    }

    /// Stage currently revealing
    #[must_use]
    pub fn active_stage(&self) -> Option<Stage> {
        self.state
            .current_stage_index()
            .and_then(|index| self.plan.get(index))
    }

    /// Whether every stage of the installed result has completed
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state.phase == SequencerPhase::Done
    }

    /// Whether no result is installed
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state.phase == SequencerPhase::Idle
    }

    /// Logical time until the next reveal is due
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(self.timers.now()))
    }

    /// Number of pending reveal timers
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Logical time elapsed since the controller was created
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Cadence and literals
    #[must_use]
    pub fn settings(&self) -> &RevealSettings {
        &self.settings
    }

    /// Replace cadence and literals
    ///
    /// Applies to stages activated afterwards; running renderers keep the
    /// delay they were started with.
    pub fn set_settings(&mut self, settings: RevealSettings) {
        self.settings = settings;
    }

    fn apply(&mut self, step: Step) {
        self.state = step.state;
        match step.effect {
            Effect::Restart(stage) => {
                self.cancel_all();
                self.activate(stage);
            }
            Effect::Activate(stage) => self.activate(stage),
            Effect::Finished => {
                tracing::info!(generation = self.state.generation, "reveal sequence done");
            }
            Effect::Cleared => {
                self.cancel_all();
                tracing::debug!(generation = self.state.generation, "reveal cleared");
            }
            Effect::Ignored(Rejection::StaleGeneration) => {
                tracing::warn!("dropped completion from a superseded result");
            }
            Effect::Ignored(Rejection::NotActive) => {
                tracing::debug!("dropped completion for an inactive stage");
            }
        }
    }

    /// Apply every queued completion
    fn settle(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            let event = SequencerEvent::StageCompleted {
                generation: completion.generation,
                stage: completion.stage,
            };
            let step = transition(&self.state, &self.plan, event);
            self.apply(step);
        }
    }

    fn activate(&mut self, stage: Stage) {
        let Some(result) = self.result.clone() else {
            return;
        };

        let tx = self.completions_tx.clone();
        let generation = self.state.generation;
        let on_complete: CompletionCallback = Box::new(move || {
            // The receiver lives as long as the controller
            let _ = tx.send(StageCompletion { generation, stage });
        });

        tracing::debug!(%stage, generation, "activating stage");

        let renderer = match result.source_for(stage, &self.settings.search_complete_text) {
            StageSource::Text(text) => {
                let mut renderer = CharacterStreamRenderer::new(RendererId::text(stage));
                renderer.start(text, self.settings.char_delay, &mut self.timers, Some(on_complete));
                StageRenderer::Text(renderer)
            }
            StageSource::List(items) => {
                let mut aggregator = ListItemAggregator::new(stage);
                aggregator.start(
                    items,
                    self.settings.list_item_char_delay,
                    &mut self.timers,
                    on_complete,
                );
                StageRenderer::List(aggregator)
            }
        };
        self.renderers.insert(stage, renderer);
    }

    fn cancel_all(&mut self) {
        for renderer in self.renderers.values_mut() {
            renderer.reset(&mut self.timers);
        }
        self.renderers.clear();

        let dropped = self.timers.clear();
        let mut stale = 0usize;
        while self.completions_rx.try_recv().is_ok() {
            stale += 1;
        }
        if dropped > 0 || stale > 0 {
            tracing::debug!(dropped, stale, "cancelled pending reveals");
        }
    }
}

impl Default for RevealController {
    fn default() -> Self {
        Self::new(RevealSettings::default())
    }
}

impl std::fmt::Debug for RevealController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealController")
            .field("state", &self.state)
            .field("plan", &self.plan)
            .field("pending_timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}
