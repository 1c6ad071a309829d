//! Search Session
//!
//! Ties a [`ResultFetcher`] to a [`RevealController`]: a query goes out, and
//! whatever comes back is installed for reveal. A failed search leaves the
//! sequence that is already on screen alone.

use crate::config::RevealSettings;
use crate::controller::RevealController;
use crate::fetcher::{FetchError, ResultFetcher};
use crate::result::StructuredResult;

/// What a call to [`SearchSession::search`] did
#[derive(Debug)]
pub enum SearchOutcome {
    /// Blank query, nothing was sent
    Ignored,
    /// A new result was installed and is revealing from the first stage
    Installed,
    /// The search produced no result; the previous sequence is untouched
    NoResult(FetchError),
}

impl SearchOutcome {
    /// Whether a new result was installed
    #[must_use]
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed)
    }
}

/// The query to send for raw input, or `None` when it is blank
#[must_use]
pub fn normalize_query(input: &str) -> Option<&str> {
    let query = input.trim();
    (!query.is_empty()).then_some(query)
}

/// Install a finished fetch into `controller`
///
/// Hosts that fetch on their own task hand the result back through here. An
/// error leaves the controller exactly as it was.
pub fn install_fetched(
    controller: &mut RevealController,
    fetched: Result<StructuredResult, FetchError>,
) -> SearchOutcome {
    match fetched {
        Ok(result) => {
            controller.install(result);
            SearchOutcome::Installed
        }
        Err(e) => {
            tracing::warn!(error = %e, "search produced no result");
            SearchOutcome::NoResult(e)
        }
    }
}

/// One search box and its reveal
pub struct SearchSession<F> {
    fetcher: F,
    controller: RevealController,
}

impl<F: ResultFetcher> SearchSession<F> {
    /// Create a session with an idle controller
    pub fn new(fetcher: F, settings: RevealSettings) -> Self {
        Self {
            fetcher,
            controller: RevealController::new(settings),
        }
    }

    /// Run `query` and install its result
    pub async fn search(&mut self, query: &str) -> SearchOutcome {
        let Some(query) = normalize_query(query) else {
            tracing::debug!("blank query ignored");
            return SearchOutcome::Ignored;
        };

        tracing::info!(fetcher = self.fetcher.name(), "searching");
        let fetched = self.fetcher.fetch(query).await;
        install_fetched(&mut self.controller, fetched)
    }

    /// Probe the backend
    pub async fn check_health(&self) -> bool {
        self.fetcher.health_check().await
    }

    /// The reveal
    pub fn controller(&self) -> &RevealController {
        &self.controller
    }

    /// The reveal, for driving the clock
    pub fn controller_mut(&mut self) -> &mut RevealController {
        &mut self.controller
    }

    /// The fetcher
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}
