//! tsmatch data transfer objects, error taxonomy, and configuration primitives.
#![warn(missing_docs)]

mod config;
mod error;
mod reports;
mod series;
mod source;

pub use config::{MatchConfig, Variance};
pub use error::MatchError;
pub use reports::{
    AnalysisReport, CandidateResult, ComparisonReport, EvaluationReport, RankedReport, ReportEntry,
};
pub use series::{NormalizedSeries, Observation, TimeSeries};
pub use source::{SeriesRole, SourceKey};
