//! Result and report envelopes produced by the pipeline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::series::NormalizedSeries;

/// Outcome of evaluating one candidate against the reference.
///
/// A scored result carries `score` and `normalized`; a failed one carries
/// `failure`, plus `normalized` when only the scoring stage failed. Created
/// once per candidate and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Candidate identifier (table name or fixture key).
    pub candidate_id: String,
    /// Similarity to the reference in [-1, 1].
    pub score: Option<f64>,
    /// Normalized candidate series.
    pub normalized: Option<NormalizedSeries>,
    /// Reason the candidate could not be scored.
    pub failure: Option<MatchError>,
}

impl CandidateResult {
    /// Build a successful result.
    #[must_use]
    pub fn scored(candidate_id: impl Into<String>, score: f64, normalized: NormalizedSeries) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            score: Some(score),
            normalized: Some(normalized),
            failure: None,
        }
    }

    /// Build a failed result.
    #[must_use]
    pub fn failed(candidate_id: impl Into<String>, failure: MatchError) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            score: None,
            normalized: None,
            failure: Some(failure),
        }
    }

    /// Build a result for a candidate that normalized but could not be scored,
    /// e.g. on a length mismatch. It is never ranked.
    #[must_use]
    pub fn unscored(
        candidate_id: impl Into<String>,
        normalized: NormalizedSeries,
        failure: MatchError,
    ) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            score: None,
            normalized: Some(normalized),
            failure: Some(failure),
        }
    }

    /// True when the candidate was scored.
    #[must_use]
    pub const fn is_scored(&self) -> bool {
        self.score.is_some()
    }
}

/// Ranked subset of successful candidates plus the normalized reference.
///
/// Entries are sorted by descending score (ties by ascending id) and every
/// entry carries a score and a normalized series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedReport {
    /// Normalized reference series.
    pub reference: Arc<NormalizedSeries>,
    /// Ranked candidate results.
    pub entries: Vec<CandidateResult>,
}

/// One ranked candidate paired with the reference, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// 1-based rank position.
    pub rank: usize,
    /// Candidate identifier.
    pub candidate_id: String,
    /// Similarity to the reference.
    pub score: f64,
    /// Normalized reference series.
    pub reference: Arc<NormalizedSeries>,
    /// Normalized candidate series.
    pub candidate: NormalizedSeries,
}

/// Assembled hand-off structure for rendering and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Label of the reference series.
    pub reference_id: String,
    /// Entries in rank order.
    pub entries: Vec<ReportEntry>,
}

/// Summary of a candidate fan-out.
///
/// Carries one result per distinct candidate and any non-fatal problems
/// encountered while enumerating sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EvaluationReport {
    /// One result per evaluated candidate, in completion order.
    pub results: Vec<CandidateResult>,
    /// Non-fatal issues encountered while building the report.
    pub warnings: Vec<MatchError>,
}

/// Summary of a complete analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Every successful candidate, ranked.
    pub ranking: RankedReport,
    /// Top-K entries assembled for rendering.
    pub report: ComparisonReport,
    /// Candidates that could not be scored.
    pub failures: Vec<CandidateResult>,
    /// Non-fatal issues (skipped tables, persistence or render failures).
    pub warnings: Vec<MatchError>,
}
