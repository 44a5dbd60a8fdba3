//! Assembly of the rendering/export hand-off structure.

use std::sync::Arc;

use tsmatch_types::{ComparisonReport, RankedReport, ReportEntry};

/// Pair every ranked candidate with the normalized reference.
///
/// Ranks are 1-based and follow the order of `ranked.entries`. Entries that
/// somehow lack a score or series are skipped without consuming a rank.
#[must_use]
pub fn assemble(ranked: &RankedReport, reference_id: &str) -> ComparisonReport {
    let entries = ranked
        .entries
        .iter()
        .filter_map(|r| Some((r.candidate_id.clone(), r.score?, r.normalized.clone()?)))
        .enumerate()
        .map(|(i, (candidate_id, score, candidate))| ReportEntry {
            rank: i + 1,
            candidate_id,
            score,
            reference: Arc::clone(&ranked.reference),
            candidate,
        })
        .collect();

    ComparisonReport {
        reference_id: reference_id.to_string(),
        entries,
    }
}
