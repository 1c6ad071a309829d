//! Reveal Stages
//!
//! The fixed pipeline of sections a result is revealed in, and the per-result
//! plan derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::result::StructuredResult;

/// One named phase of the progressive reveal
///
/// Declaration order is reveal order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The question as asked
    OriginalQuestion,
    /// Reasoning behind the refined questions
    RefinedThinking,
    /// The refined questions, one animated item each
    RefinedQuestions,
    /// Constant "search complete" marker
    SearchComplete,
    /// Reasoning over the search results
    ThinkingProcess,
    /// The final answer
    FinalAnswer,
    /// Sources, only when the result has any
    Citations,
}

impl Stage {
    /// Every stage, in reveal order
    pub const ALL: [Stage; 7] = [
        Stage::OriginalQuestion,
        Stage::RefinedThinking,
        Stage::RefinedQuestions,
        Stage::SearchComplete,
        Stage::ThinkingProcess,
        Stage::FinalAnswer,
        Stage::Citations,
    ];

    /// Heading shown above the stage (empty for the bare marker)
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::OriginalQuestion => "Original question",
            Self::RefinedThinking => "Question analysis",
            Self::RefinedQuestions => "Refined questions",
            Self::SearchComplete => "",
            Self::ThinkingProcess => "Integrated results",
            Self::FinalAnswer => "Final answer",
            Self::Citations => "Citations",
        }
    }

    /// Whether the stage's source is a list of independently animated items
    #[must_use]
    pub fn is_list(self) -> bool {
        matches!(self, Self::RefinedQuestions | Self::Citations)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OriginalQuestion => "original_question",
            Self::RefinedThinking => "refined_thinking",
            Self::RefinedQuestions => "refined_questions",
            Self::SearchComplete => "search_complete",
            Self::ThinkingProcess => "thinking_process",
            Self::FinalAnswer => "final_answer",
            Self::Citations => "citations",
        };
        f.write_str(name)
    }
}

/// Where a stage's content comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageSource<'a> {
    /// A single string revealed by one renderer
    Text(&'a str),
    /// A list revealed by one renderer per item
    List(&'a [String]),
}

impl StructuredResult {
    /// Content source for `stage`
    ///
    /// `search_complete` is the constant literal shown for
    /// [`Stage::SearchComplete`].
    #[must_use]
    pub fn source_for<'a>(&'a self, stage: Stage, search_complete: &'a str) -> StageSource<'a> {
        match stage {
            Stage::OriginalQuestion => StageSource::Text(&self.original_question),
            Stage::RefinedThinking => StageSource::Text(&self.refined_thinking_process),
            Stage::RefinedQuestions => StageSource::List(&self.refined_questions),
            Stage::SearchComplete => StageSource::Text(search_complete),
            Stage::ThinkingProcess => StageSource::Text(&self.thinking_process),
            Stage::FinalAnswer => StageSource::Text(&self.final_answer),
            Stage::Citations => StageSource::List(self.citations.as_deref().unwrap_or_default()),
        }
    }
}

/// Ordered stages for one installed result
///
/// Decided once at install time. `Citations` is included only when the
/// result carries a non-empty citation list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StagePlan {
    stages: Vec<Stage>,
}

impl StagePlan {
    /// Build the plan for `result`
    #[must_use]
    pub fn for_result(result: &StructuredResult) -> Self {
        let with_citations = result.non_empty_citations().is_some();
        let stages = Stage::ALL
            .into_iter()
            .filter(|stage| *stage != Stage::Citations || with_citations)
            .collect();
        Self { stages }
    }

    /// Plan with an explicit stage list
    ///
    /// Used by tests and hosts that want a custom subset; the caller is
    /// responsible for keeping the declared order.
    #[must_use]
    pub fn from_stages(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Stages in reveal order
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Stage at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Stage> {
        self.stages.get(index).copied()
    }

    /// Index of `stage` in this plan
    #[must_use]
    pub fn position(&self, stage: Stage) -> Option<usize> {
        self.stages.iter().position(|s| *s == stage)
    }

    /// Whether `stage` is part of this plan
    #[must_use]
    pub fn contains(&self, stage: Stage) -> bool {
        self.position(stage).is_some()
    }

    /// Number of stages
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the plan has no stages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Identifies one renderer: a stage, and the item index for list stages
///
/// Non-list stages always use item 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RendererId {
    /// Owning stage
    pub stage: Stage,
    /// Item index within a list stage
    pub item: usize,
}

impl RendererId {
    /// Renderer of a single-text stage
    #[must_use]
    pub const fn text(stage: Stage) -> Self {
        Self { stage, item: 0 }
    }

    /// Renderer of one list item
    #[must_use]
    pub const fn item(stage: Stage, item: usize) -> Self {
        Self { stage, item }
    }
}
