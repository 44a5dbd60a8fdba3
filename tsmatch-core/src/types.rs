//! Re-export of foundational types from `tsmatch-types`.
// Consolidated re-exports so downstream crates can depend on `tsmatch-core` only

pub use tsmatch_types::{MatchConfig, MatchError, Variance};

pub use tsmatch_types::{NormalizedSeries, Observation, TimeSeries};

pub use tsmatch_types::{
    AnalysisReport, CandidateResult, ComparisonReport, EvaluationReport, RankedReport, ReportEntry,
};

pub use tsmatch_types::{SeriesRole, SourceKey};

// Optional: re-export the DataFrame conversion trait when the feature is enabled
#[cfg(feature = "dataframe")]
pub use crate::dataframe::ToDataFrame;
