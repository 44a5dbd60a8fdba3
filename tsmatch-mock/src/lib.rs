//! Mock candidate sources for tests and demos.
//!
//! [`MockSource`] serves a fixed set of weekly fixture series, including
//! candidates that are constant, too short, fail, or respond slowly.
//! [`DynamicMockSource`] defers every answer to a [`DynamicMockController`]
//! so tests can script failures and hangs per candidate.
use std::time::Duration;

use async_trait::async_trait;
use tsmatch_core::{CandidateSource, Enumeration, MatchError, TimeSeries};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockSource, MockBehavior};
pub use fixtures::{CANDIDATES, MISSING_COLUMNS, REFERENCE, weekly};

/// Name reported by [`MockSource`].
pub const MOCK_SOURCE_NAME: &str = "tsmatch-mock";

/// Mock source for CI-safe runs. Serves deterministic data from static fixtures.
#[derive(Debug, Clone)]
pub struct MockSource {
    slow_delay: Duration,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slow_delay: Duration::from_millis(200),
        }
    }

    /// Change how long the `TIMEOUT` candidate takes to answer.
    #[must_use]
    pub const fn with_slow_delay(mut self, delay: Duration) -> Self {
        self.slow_delay = delay;
        self
    }

    /// The reference series the fixtures were shaped against.
    ///
    /// # Errors
    /// Never in practice; the fixture values are finite.
    pub fn reference() -> Result<TimeSeries, MatchError> {
        weekly("reference", REFERENCE)
    }

    async fn maybe_fail_or_delay(&self, candidate_id: &str) -> Result<(), MatchError> {
        match candidate_id {
            "FAIL" => Err(MatchError::store(
                MOCK_SOURCE_NAME,
                format!("forced failure: fetch {candidate_id}"),
            )),
            "TIMEOUT" => {
                tokio::time::sleep(self.slow_delay).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CandidateSource for MockSource {
    fn name(&self) -> &'static str {
        MOCK_SOURCE_NAME
    }

    async fn list_candidates(&self) -> Result<Enumeration, MatchError> {
        Ok(Enumeration {
            candidates: CANDIDATES.iter().map(ToString::to_string).collect(),
            skipped: vec![MatchError::validation(
                MISSING_COLUMNS,
                "missing column 'Value'",
            )],
        })
    }

    async fn fetch(&self, candidate_id: &str) -> Result<TimeSeries, MatchError> {
        self.maybe_fail_or_delay(candidate_id).await?;
        fixtures::by_id(candidate_id)
            .ok_or_else(|| MatchError::not_found(format!("candidate {candidate_id}")))
    }
}
