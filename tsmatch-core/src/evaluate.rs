//! Candidate evaluation with per-candidate failure isolation.

use tsmatch_types::{CandidateResult, MatchError, NormalizedSeries, TimeSeries, Variance};

use crate::timeseries::normalize::normalize;
use crate::timeseries::similarity::score;

/// Normalize one candidate and score it against the normalized reference.
///
/// Never fails: normalization or scoring errors are recorded on the returned
/// result instead. A candidate that normalized but could not be scored keeps
/// its normalized series.
#[must_use]
pub fn evaluate_one(
    reference: &NormalizedSeries,
    candidate_id: &str,
    series: &TimeSeries,
    variance: Variance,
) -> CandidateResult {
    let normalized = match normalize(series, variance) {
        Ok(n) => n,
        Err(e) => return not_scored(candidate_id, e, None),
    };
    match score(reference, &normalized) {
        Ok(s) => CandidateResult::scored(candidate_id, s, normalized),
        Err(e) => not_scored(candidate_id, e, Some(normalized)),
    }
}

fn not_scored(
    candidate_id: &str,
    e: MatchError,
    normalized: Option<NormalizedSeries>,
) -> CandidateResult {
    #[cfg(feature = "tracing")]
    tracing::debug!(candidate = candidate_id, error = %e, "candidate not scored");
    match normalized {
        Some(n) => CandidateResult::unscored(candidate_id, n, e),
        None => CandidateResult::failed(candidate_id, e),
    }
}

/// Evaluate every candidate against a fixed reference.
///
/// Produces exactly one [`CandidateResult`] per input candidate. One
/// candidate's failure never prevents the others from being evaluated.
///
/// ```
/// use chrono::DateTime;
/// use tsmatch_core::{evaluate_all, normalize, Observation, TimeSeries, Variance};
///
/// let day = |d: i64| DateTime::from_timestamp(d * 86_400, 0).unwrap();
/// let mk = |id: &str, vals: &[f64]| {
///     TimeSeries::new(
///         id,
///         vals.iter().enumerate().map(|(i, v)| Observation::new(day(i as i64), *v)).collect(),
///     )
///     .unwrap()
/// };
/// let reference = normalize(&mk("ref", &[1.0, 2.0, 3.0]), Variance::Population).unwrap();
/// let results = evaluate_all(
///     &reference,
///     vec![
///         ("up".to_string(), mk("up", &[2.0, 4.0, 6.0])),
///         ("flat".to_string(), mk("flat", &[5.0, 5.0, 5.0])),
///     ],
///     Variance::Population,
/// );
/// assert_eq!(results.len(), 2);
/// assert!(results.iter().any(|r| r.candidate_id == "flat" && r.failure.is_some()));
/// ```
pub fn evaluate_all<I>(
    reference: &NormalizedSeries,
    candidates: I,
    variance: Variance,
) -> Vec<CandidateResult>
where
    I: IntoIterator<Item = (String, TimeSeries)>,
{
    candidates
        .into_iter()
        .map(|(id, series)| evaluate_one(reference, &id, &series, variance))
        .collect()
}
