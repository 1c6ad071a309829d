//! Host Read Model
//!
//! What a surface needs to draw the reveal: per stage, whether it is shown,
//! whether it is still typing, and the revealed prefix. Surfaces never touch
//! renderers directly.

use serde::Serialize;

use crate::sequencer::SequencerPhase;
use crate::stage::Stage;

/// Revealed content of one stage
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StageContent {
    /// Revealed prefix of a single text
    Text(String),
    /// Revealed prefix of each list item, in order
    Items(Vec<String>),
}

impl StageContent {
    /// Whether nothing has been revealed yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Items(items) => items.iter().all(String::is_empty),
        }
    }
}

/// One stage as the host sees it
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageView {
    /// Which stage
    pub stage: Stage,
    /// Whether the stage has been activated
    pub visible: bool,
    /// Whether the stage is the one currently revealing
    pub active: bool,
    /// Whether the sequencer has moved past this stage
    pub complete: bool,
    /// Revealed prefix
    pub content: StageContent,
}

impl StageView {
    /// Revealed content as a single string, list items one per line
    #[must_use]
    pub fn text(&self) -> String {
        match &self.content {
            StageContent::Text(text) => text.clone(),
            StageContent::Items(items) => items.join("\n"),
        }
    }
}

/// Point-in-time view of the whole reveal
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RevealSnapshot {
    /// Generation of the installed result
    pub generation: u64,
    /// Sequencer phase
    pub phase: SequencerPhase,
    /// Every stage in the installed plan, in reveal order
    pub stages: Vec<StageView>,
}

impl RevealSnapshot {
    /// View of `stage`, if it is part of the plan
    #[must_use]
    pub fn stage(&self, stage: Stage) -> Option<&StageView> {
        self.stages.iter().find(|view| view.stage == stage)
    }

    /// Visible stages only
    pub fn visible(&self) -> impl Iterator<Item = &StageView> {
        self.stages.iter().filter(|view| view.visible)
    }

    /// Whether every stage has completed
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.phase == SequencerPhase::Done
    }

    /// Whether no result is installed
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.phase == SequencerPhase::Idle
    }
}
