use std::collections::BTreeMap;

use tsmatch_types::{MatchError, Observation};

/// Typical spacing between consecutive observations, in seconds.
///
/// The most frequent gap wins; when several gaps are equally frequent the
/// lower median gap is used instead, so a few missed weeks do not turn a
/// weekly series into a fortnightly one.
///
/// ```
/// use chrono::DateTime;
/// use tsmatch_core::{estimate_step_seconds, Observation};
///
/// let week = 7 * 86_400;
/// let at = |s: i64| Observation::new(DateTime::from_timestamp(s, 0).unwrap(), 1.0);
/// let weekly: Vec<_> = (0..6).map(|i| at(i * week)).collect();
/// assert_eq!(estimate_step_seconds(&weekly), Some(week));
///
/// // Gaps 60, 60, 120, 120: no single most frequent gap, lower median is 60
/// let mixed = vec![at(0), at(60), at(120), at(240), at(360)];
/// assert_eq!(estimate_step_seconds(&mixed), Some(60));
/// ```
///
/// Input order does not matter and repeated timestamps are ignored. Returns
/// `None` with fewer than two distinct timestamps.
#[must_use]
pub fn estimate_step_seconds(points: &[Observation]) -> Option<i64> {
    let mut stamps: Vec<i64> = points.iter().map(|p| p.ts.timestamp()).collect();
    stamps.sort_unstable();
    stamps.dedup();
    let mut gaps: Vec<i64> = stamps.windows(2).map(|w| w[1] - w[0]).collect();
    if gaps.is_empty() {
        return None;
    }
    gaps.sort_unstable();

    let mut freq: BTreeMap<i64, usize> = BTreeMap::new();
    for gap in &gaps {
        *freq.entry(*gap).or_default() += 1;
    }
    let top = freq.values().copied().max()?;
    let mut modal = freq.iter().filter(|(_, n)| **n == top).map(|(gap, _)| *gap);
    match (modal.next(), modal.next()) {
        (Some(gap), None) => Some(gap),
        _ => Some(gaps[(gaps.len() - 1) / 2]),
    }
}

/// Warning for a candidate whose inferred cadence differs from the reference's.
///
/// Positional scoring assumes comparable sampling, so callers surface this as
/// a diagnostic instead of rejecting the candidate. `None` when the cadences
/// agree or either one cannot be inferred.
#[must_use]
pub fn cadence_mismatch(
    candidate_id: &str,
    reference: &[Observation],
    candidate: &[Observation],
) -> Option<MatchError> {
    let reference_step_secs = estimate_step_seconds(reference)?;
    let candidate_step_secs = estimate_step_seconds(candidate)?;
    (reference_step_secs != candidate_step_secs).then(|| MatchError::CadenceMismatch {
        candidate: candidate_id.to_string(),
        reference_step_secs,
        candidate_step_secs,
    })
}
