//! tsmatch-core
//!
//! Core types, traits, and algorithms shared across the tsmatch workspace.
//!
//! - `types`: re-exported data model (series, results, reports, errors, config).
//! - `timeseries`: normalization, similarity scoring, cadence inference.
//! - `evaluate`: per-candidate normalize + score with failure isolation.
//! - `rank`: deterministic top-K ranking.
//! - `report`: assembly of the rendering/export hand-off structure.
//! - `source` / `sink`: collaborator traits for candidate acquisition,
//!   persistence, and chart rendering.
//!
//! Everything except the `CandidateSource` trait is synchronous and free of
//! I/O; the `tsmatch` crate drives sources on a Tokio runtime.
#![warn(missing_docs)]

/// Candidate evaluation against a fixed reference.
pub mod evaluate;
/// Ranking of evaluated candidates.
pub mod rank;
/// Report assembly for rendering and export.
pub mod report;
/// Persistence and rendering collaborator traits.
pub mod sink;
/// Candidate source trait.
pub mod source;
/// Numeric time-series stages.
pub mod timeseries;
pub mod types;

#[cfg(feature = "dataframe")]
mod dataframe;

pub use evaluate::{evaluate_all, evaluate_one};
pub use rank::{rank, rank_all};
pub use report::assemble;
pub use sink::{ChartRenderer, SeriesSink};
pub use source::{CandidateSource, Enumeration};
pub use timeseries::infer::{cadence_mismatch, estimate_step_seconds};
pub use timeseries::normalize::{
    DEGENERATE_TOLERANCE, Moments, moments, normalize, normalize_population,
};
pub use timeseries::similarity::{cosine, score};
pub use types::*;
