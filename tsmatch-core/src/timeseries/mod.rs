//! Numeric time-series stages of the pipeline.
//!
//! Modules include:
//! - `normalize`: per-series z-scoring
//! - `similarity`: positional cosine similarity of normalized series
//! - `infer`: sampling cadence inference for diagnostics
/// Cadence inference helpers.
pub mod infer;
/// Z-score normalization.
pub mod normalize;
/// Cosine similarity scoring.
pub mod similarity;
