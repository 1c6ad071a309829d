//! Search Result Model
//!
//! The structured answer returned by the search backend, and the wire shape
//! it arrives in.
//!
//! A [`StructuredResult`] is immutable once installed. The controller wraps
//! it in an `Arc` and every renderer of that result reads from the same copy.

use serde::{Deserialize, Serialize};

/// Structured answer for one query
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredResult {
    /// The question as the user asked it
    pub original_question: String,
    /// Sub-questions the backend derived from the original question
    pub refined_questions: Vec<String>,
    /// Raw search snippets (carried along, not revealed as a stage)
    pub search_results: Vec<String>,
    /// Reasoning behind the refined questions
    pub refined_thinking_process: String,
    /// Reasoning over the search results
    pub thinking_process: String,
    /// The answer shown last
    pub final_answer: String,
    /// Sources, when the backend reports any
    pub citations: Option<Vec<String>>,
}

impl StructuredResult {
    /// Create a result with only the original question filled in
    pub fn new(original_question: impl Into<String>) -> Self {
        Self {
            original_question: original_question.into(),
            ..Default::default()
        }
    }

    /// Set refined questions
    #[must_use]
    pub fn with_refined_questions<I, S>(mut self, questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.refined_questions = questions.into_iter().map(Into::into).collect();
        self
    }

    /// Set search result snippets
    #[must_use]
    pub fn with_search_results<I, S>(mut self, results: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_results = results.into_iter().map(Into::into).collect();
        self
    }

    /// Set the refined thinking process
    #[must_use]
    pub fn with_refined_thinking(mut self, text: impl Into<String>) -> Self {
        self.refined_thinking_process = text.into();
        self
    }

    /// Set the thinking process
    #[must_use]
    pub fn with_thinking(mut self, text: impl Into<String>) -> Self {
        self.thinking_process = text.into();
        self
    }

    /// Set the final answer
    #[must_use]
    pub fn with_final_answer(mut self, text: impl Into<String>) -> Self {
        self.final_answer = text.into();
        self
    }

    /// Set citations
    #[must_use]
    pub fn with_citations<I, S>(mut self, citations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.citations = Some(citations.into_iter().map(Into::into).collect());
        self
    }

    /// Citations, if present and non-empty
    #[must_use]
    pub fn non_empty_citations(&self) -> Option<&[String]> {
        self.citations.as_deref().filter(|c| !c.is_empty())
    }
}

/// Status discriminator on every backend response
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// The payload carries a result
    Success,
    /// The payload carries an error message
    Error,
}

/// Request body for `POST /query`
#[derive(Clone, Debug, Serialize)]
pub struct QueryRequest {
    /// Free-text query
    pub user_input: String,
}

/// Response body for `POST /query`
///
/// Content fields are optional here so a missing field can be reported as a
/// malformed payload instead of a generic decode failure.
#[derive(Clone, Debug, Deserialize)]
pub struct SearchResponse {
    /// Success or error
    pub status: ResponseStatus,
    /// See [`StructuredResult::original_question`]
    #[serde(default)]
    pub original_question: Option<String>,
    /// See [`StructuredResult::refined_questions`]
    #[serde(default)]
    pub refined_questions: Option<Vec<String>>,
    /// See [`StructuredResult::search_results`]
    #[serde(default)]
    pub search_results: Option<Vec<String>>,
    /// See [`StructuredResult::refined_thinking_process`]
    #[serde(default)]
    pub refined_thinking_process: Option<String>,
    /// See [`StructuredResult::thinking_process`]
    #[serde(default)]
    pub thinking_process: Option<String>,
    /// See [`StructuredResult::final_answer`]
    #[serde(default)]
    pub final_answer: Option<String>,
    /// See [`StructuredResult::citations`]
    #[serde(default)]
    pub citations: Option<Vec<String>>,
    /// Server-side timestamp
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Error message when `status` is `error`
    #[serde(default)]
    pub error: Option<String>,
}

/// Why a response could not be turned into a [`StructuredResult`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadProblem {
    /// The backend reported an error
    Backend(String),
    /// A required field was absent
    MissingField(&'static str),
}

impl SearchResponse {
    /// Validate the payload and extract the structured result
    ///
    /// # Errors
    ///
    /// Returns [`PayloadProblem::Backend`] for an error status and
    /// [`PayloadProblem::MissingField`] when a required field is absent.
    pub fn into_result(self) -> Result<StructuredResult, PayloadProblem> {
        if self.status == ResponseStatus::Error {
            return Err(PayloadProblem::Backend(
                self.error
                    .unwrap_or_else(|| "backend reported an error".to_string()),
            ));
        }

        Ok(StructuredResult {
            original_question: required(self.original_question, "original_question")?,
            refined_questions: required(self.refined_questions, "refined_questions")?,
            search_results: required(self.search_results, "search_results")?,
            refined_thinking_process: required(
                self.refined_thinking_process,
                "refined_thinking_process",
            )?,
            thinking_process: required(self.thinking_process, "thinking_process")?,
            final_answer: required(self.final_answer, "final_answer")?,
            citations: self.citations,
        })
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, PayloadProblem> {
    value.ok_or(PayloadProblem::MissingField(field))
}
