//! tsmatch ranks candidate time series by how closely their shape follows a
//! reference series.
//!
//! Overview
//! - Candidates come from one or more [`CandidateSource`] implementations
//!   (a relational store, fixtures, anything that can list and fetch series).
//! - Every series is z-score normalized, then compared to the normalized
//!   reference by cosine similarity, so scale and offset do not matter.
//! - Failing candidates (too short, constant, wrong length, unreachable) are
//!   recorded and skipped; they never abort the batch.
//! - Successes are ranked by descending score with ties broken by candidate id,
//!   so identical input always yields identical output.
//! - Optional collaborators persist normalized series and the ranking
//!   ([`SeriesSink`]) and draw one comparison chart per top-K entry
//!   ([`ChartRenderer`]). Their failures are reported as warnings.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use tsmatch::Matcher;
//!
//! let matcher = Matcher::builder()
//!     .with_source(Arc::new(source))
//!     .top_k(5)
//!     .fetch_timeout(std::time::Duration::from_secs(2))
//!     .build()?;
//! let report = matcher.run(&reference).await?;
//! for entry in &report.report.entries {
//!     println!("{}. {} ({:.4})", entry.rank, entry.candidate_id, entry.score);
//! }
//! for warning in &report.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
mod pipeline;

pub use core::{Matcher, MatcherBuilder, tag_err};
pub use pipeline::util;
pub use pipeline::util::{collapse_enumeration_errors, join_with_deadline};

// Re-export core types for convenience
pub use tsmatch_core::{
    AnalysisReport, CandidateResult, CandidateSource, ChartRenderer, ComparisonReport,
    Enumeration, EvaluationReport, MatchConfig, MatchError, NormalizedSeries, Observation,
    RankedReport, ReportEntry, SeriesRole, SeriesSink, TimeSeries, Variance,
};
