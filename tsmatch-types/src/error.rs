use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the tsmatch workspace.
///
/// This covers per-series normalization and scoring failures, batch-level
/// ranking failures, and failures of the external collaborators (files,
/// relational stores, renderers) that feed or consume the pipeline.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MatchError {
    /// The series has too few values to compute a standard deviation.
    #[error("insufficient data in {series}: need at least 2 values, got {len}")]
    InsufficientData {
        /// Identifier of the offending series.
        series: String,
        /// Number of values the series carried.
        len: usize,
    },

    /// The series has zero variance and carries no directional information.
    #[error("degenerate series {series}: zero variance")]
    DegenerateSeries {
        /// Identifier of the offending series.
        series: String,
    },

    /// Reference and candidate differ in length; no positional comparison is possible.
    #[error("length mismatch: reference has {reference} values, candidate has {candidate}")]
    LengthMismatch {
        /// Number of values in the reference series.
        reference: usize,
        /// Number of values in the candidate series.
        candidate: usize,
    },

    /// Every evaluated candidate failed, so there is nothing to rank.
    #[error("no valid candidates among {attempted} evaluated")]
    NoValidCandidates {
        /// Number of candidates that were evaluated.
        attempted: usize,
    },

    /// The series violates a structural invariant (ordering, finiteness).
    #[error("invalid series {series}: {msg}")]
    InvalidSeries {
        /// Identifier of the offending series.
        series: String,
        /// Human-readable description of the violation.
        msg: String,
    },

    /// Invalid input argument or configuration.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// External input failed validation before entering the pipeline.
    #[error("validation failed for {origin}: {msg}")]
    Validation {
        /// File path or table name the input came from.
        origin: String,
        /// Human-readable description of the validation failure.
        msg: String,
    },

    /// The relational store (or another candidate source) returned an error.
    #[error("{store} failed: {msg}")]
    Store {
        /// Source name that failed.
        store: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A filesystem operation failed.
    #[error("i/o error at {path}: {msg}")]
    Io {
        /// Path involved in the failed operation.
        path: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A candidate or table could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "table flu_region_1".
        what: String,
    },

    /// Fetching a single candidate exceeded the configured timeout.
    #[error("fetch timed out: {candidate} via {source_name}")]
    FetchTimeout {
        /// Source name the fetch was issued against.
        source_name: String,
        /// Candidate identifier that timed out.
        candidate: String,
    },

    /// The overall request exceeded the configured deadline.
    #[error("request timed out: {stage}")]
    RequestTimeout {
        /// Pipeline stage that was running when the deadline elapsed.
        stage: String,
    },

    /// A candidate is sampled at a different cadence than the reference.
    ///
    /// Scoring still proceeds positionally; this is reported as a warning.
    #[error(
        "cadence mismatch for {candidate}: reference steps every {reference_step_secs}s, candidate every {candidate_step_secs}s"
    )]
    CadenceMismatch {
        /// Candidate whose sampling step differs.
        candidate: String,
        /// Inferred reference step in seconds.
        reference_step_secs: i64,
        /// Inferred candidate step in seconds.
        candidate_step_secs: i64,
    },

    /// Rendering a chart for one report entry failed.
    #[error("render failed for {candidate}: {msg}")]
    Render {
        /// Candidate whose chart could not be rendered.
        candidate: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Every registered source failed to enumerate candidates.
    #[error("all sources failed: {0:?}")]
    AllSourcesFailed(Vec<MatchError>),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl MatchError {
    /// Helper: build an `InsufficientData` error.
    pub fn insufficient(series: impl Into<String>, len: usize) -> Self {
        Self::InsufficientData {
            series: series.into(),
            len,
        }
    }

    /// Helper: build a `DegenerateSeries` error.
    pub fn degenerate(series: impl Into<String>) -> Self {
        Self::DegenerateSeries {
            series: series.into(),
        }
    }

    /// Helper: build an `InvalidSeries` error.
    pub fn invalid_series(series: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidSeries {
            series: series.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Validation` error tagged with the offending file or table.
    pub fn validation(origin: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            origin: origin.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Store` error with the source name and message.
    pub fn store(store: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Store {
            store: store.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `Io` error for a path.
    pub fn io(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `FetchTimeout` error.
    pub fn fetch_timeout(source_name: impl Into<String>, candidate: impl Into<String>) -> Self {
        Self::FetchTimeout {
            source_name: source_name.into(),
            candidate: candidate.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(stage: impl Into<String>) -> Self {
        Self::RequestTimeout {
            stage: stage.into(),
        }
    }

    /// Helper: build a `Render` error.
    pub fn render(candidate: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Render {
            candidate: candidate.into(),
            msg: msg.into(),
        }
    }

    /// Returns true if this error stays local to a single candidate.
    ///
    /// Candidate-scoped errors are downgraded to a recorded failure on that
    /// candidate's result and never abort a batch.
    #[must_use]
    pub const fn is_candidate_scoped(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. }
                | Self::DegenerateSeries { .. }
                | Self::LengthMismatch { .. }
                | Self::InvalidSeries { .. }
                | Self::Validation { .. }
                | Self::Store { .. }
                | Self::NotFound { .. }
                | Self::FetchTimeout { .. }
                | Self::RequestTimeout { .. }
                | Self::CadenceMismatch { .. }
        )
    }

    /// Flatten nested `AllSourcesFailed` errors into a single vector of leaf errors.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllSourcesFailed(v) => v.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }

    /// Returns true for failures of the pure normalize/score stages.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. }
                | Self::DegenerateSeries { .. }
                | Self::LengthMismatch { .. }
        )
    }
}
