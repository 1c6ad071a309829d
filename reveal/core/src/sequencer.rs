//! Step Sequencer
//!
//! Pure state machine over the stage plan. All sequencing decisions live
//! here; the [`RevealController`](crate::controller::RevealController) only
//! carries out the effect each transition asks for.
//!
//! # States
//!
//! ```text
//!          Install                StageCompleted(plan[i])
//!   Idle ──────────► Active(0) ─────────────────────────► Active(i+1)
//!    ▲                  │                                      │
//!    │ Reset            │ StageCompleted(last)                 │
//!    │                  ▼                                      ▼
//!    └──────────────  Done  ◄──────────────────────────────────┘
//! ```
//!
//! `Install` is accepted from any state and always restarts at stage 0 with
//! a fresh generation. Completions carry the generation they were issued
//! under, so anything left over from a superseded result is rejected.

use serde::{Deserialize, Serialize};

use crate::stage::{Stage, StagePlan};

/// Where the sequencer is in the plan
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencerPhase {
    /// No result installed
    #[default]
    Idle,
    /// Revealing the stage at this plan index
    Active(usize),
    /// Every stage in the plan has completed
    Done,
}

/// Explicit, reconstructible sequencer state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerState {
    /// Install counter; completions from other generations are stale
    pub generation: u64,
    /// Current phase
    pub phase: SequencerPhase,
    /// Stages shown so far, always a prefix of the plan
    pub visible_stages: Vec<Stage>,
}

impl SequencerState {
    /// Index of the active stage, if any
    #[must_use]
    pub fn current_stage_index(&self) -> Option<usize> {
        match self.phase {
            SequencerPhase::Active(index) => Some(index),
            SequencerPhase::Idle | SequencerPhase::Done => None,
        }
    }

    /// Whether `stage` has been made visible
    #[must_use]
    pub fn is_visible(&self, stage: Stage) -> bool {
        self.visible_stages.contains(&stage)
    }
}

/// Input to the sequencer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequencerEvent {
    /// A new result (whose plan is passed alongside) was installed
    Install,
    /// A stage's renderer or aggregator finished
    StageCompleted {
        /// Generation the completing renderer was started under
        generation: u64,
        /// Stage that completed
        stage: Stage,
    },
    /// Drop everything and go back to idle
    Reset,
}

/// Why an event was not applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Completion from a superseded generation
    StaleGeneration,
    /// Completion for a stage that is not the active one
    NotActive,
}

/// What the controller has to do after a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Cancel everything from the previous generation, then start this stage
    Restart(Stage),
    /// Start the renderer for this stage
    Activate(Stage),
    /// The last stage completed
    Finished,
    /// Cancel everything, nothing to start
    Cleared,
    /// The event was ignored
    Ignored(Rejection),
}

/// Result of applying one event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// State after the event
    pub state: SequencerState,
    /// Work for the controller
    pub effect: Effect,
}

/// Apply `event` to `state` under `plan`
///
/// For [`SequencerEvent::Install`], `plan` is the plan of the newly installed
/// result. An empty plan installs straight into `Done`.
#[must_use]
pub fn transition(state: &SequencerState, plan: &StagePlan, event: SequencerEvent) -> Step {
    match event {
        SequencerEvent::Install => {
            let generation = state.generation + 1;
            match plan.get(0) {
                Some(first) => Step {
                    state: SequencerState {
                        generation,
                        phase: SequencerPhase::Active(0),
                        visible_stages: vec![first],
                    },
                    effect: Effect::Restart(first),
                },
                None => Step {
                    state: SequencerState {
                        generation,
                        phase: SequencerPhase::Done,
                        visible_stages: Vec::new(),
                    },
                    effect: Effect::Finished,
                },
            }
        }

        SequencerEvent::StageCompleted { generation, stage } => {
            if generation != state.generation {
                return ignored(state, Rejection::StaleGeneration);
            }
            let Some(index) = state.current_stage_index() else {
                return ignored(state, Rejection::NotActive);
            };
            if plan.get(index) != Some(stage) {
                return ignored(state, Rejection::NotActive);
            }

            let mut next = state.clone();
            match plan.get(index + 1) {
                Some(following) => {
                    next.phase = SequencerPhase::Active(index + 1);
                    next.visible_stages.push(following);
                    Step {
                        state: next,
                        effect: Effect::Activate(following),
                    }
                }
                None => {
                    next.phase = SequencerPhase::Done;
                    Step {
                        state: next,
                        effect: Effect::Finished,
                    }
                }
            }
        }

        SequencerEvent::Reset => Step {
            state: SequencerState {
                generation: state.generation + 1,
                phase: SequencerPhase::Idle,
                visible_stages: Vec::new(),
            },
            effect: Effect::Cleared,
        },
    }
}

fn ignored(state: &SequencerState, reason: Rejection) -> Step {
    Step {
        state: state.clone(),
        effect: Effect::Ignored(reason),
    }
}
