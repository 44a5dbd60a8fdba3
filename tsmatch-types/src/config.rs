//! Configuration types shared across the orchestrator and collaborators.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Variance convention used when normalizing series.
///
/// The same convention must be used for the reference and every candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Variance {
    /// Divide by `n` (ddof = 0).
    #[default]
    Population,
    /// Divide by `n - 1` (ddof = 1).
    Sample,
}

impl Variance {
    /// Delta degrees of freedom subtracted from `n` in the variance denominator.
    #[must_use]
    pub const fn ddof(self) -> usize {
        match self {
            Self::Population => 0,
            Self::Sample => 1,
        }
    }
}

/// Global configuration for the `Matcher` orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Number of top-ranked candidates kept in the assembled report.
    pub top_k: usize,
    /// Variance convention applied to every series.
    pub variance: Variance,
    /// Timeout for fetching a single candidate from its source.
    pub fetch_timeout: Duration,
    /// Optional deadline for the whole candidate fan-out.
    ///
    /// Candidates still in flight when it elapses are recorded as failed.
    pub request_timeout: Option<Duration>,
    /// Maximum number of candidates fetched and evaluated concurrently.
    pub max_concurrency: usize,
    /// Hand every successfully normalized candidate to the sink.
    pub persist_normalized: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            variance: Variance::Population,
            fetch_timeout: Duration::from_secs(5),
            request_timeout: None,
            max_concurrency: 8,
            persist_normalized: true,
        }
    }
}
