//! Deterministic ranking of evaluated candidates.

use std::cmp::Ordering;
use std::sync::Arc;

use tsmatch_types::{CandidateResult, MatchError, NormalizedSeries, RankedReport};

/// Order two scored results: higher score first, then ascending candidate id.
fn by_score_then_id(a: &CandidateResult, b: &CandidateResult) -> Ordering {
    let sa = a.score.unwrap_or(f64::NEG_INFINITY);
    let sb = b.score.unwrap_or(f64::NEG_INFINITY);
    // Scores are finite after clamping; IEEE equality (0.0 == -0.0) counts as a tie.
    sb.partial_cmp(&sa)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.candidate_id.cmp(&b.candidate_id))
}

/// Rank evaluated candidates and keep the best `top_k`.
///
/// - Results without a score are dropped.
/// - Sorting is by descending score; exact ties are broken by ascending
///   candidate id so repeated runs yield identical output.
/// - Fewer than `top_k` successes is not an error; all of them are returned.
///
/// # Errors
/// - `InvalidArg` if `top_k` is zero.
/// - `NoValidCandidates` if no result carries a score.
pub fn rank<I>(
    reference: Arc<NormalizedSeries>,
    results: I,
    top_k: usize,
) -> Result<RankedReport, MatchError>
where
    I: IntoIterator<Item = CandidateResult>,
{
    if top_k == 0 {
        return Err(MatchError::InvalidArg("top_k must be greater than zero".into()));
    }
    let mut attempted = 0usize;
    let mut scored: Vec<CandidateResult> = results
        .into_iter()
        .inspect(|_| attempted += 1)
        .filter(|r| r.score.is_some() && r.normalized.is_some())
        .collect();
    if scored.is_empty() {
        return Err(MatchError::NoValidCandidates { attempted });
    }
    scored.sort_by(by_score_then_id);
    scored.truncate(top_k);
    Ok(RankedReport {
        reference,
        entries: scored,
    })
}

/// Rank every successful candidate (no truncation).
///
/// # Errors
/// `NoValidCandidates` if no result carries a score.
pub fn rank_all<I>(reference: Arc<NormalizedSeries>, results: I) -> Result<RankedReport, MatchError>
where
    I: IntoIterator<Item = CandidateResult>,
{
    rank(reference, results, usize::MAX)
}
