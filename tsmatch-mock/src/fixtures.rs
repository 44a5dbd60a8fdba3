use chrono::{Duration, NaiveDate};
use tsmatch_core::{MatchError, Observation, TimeSeries};

/// Weekly detection counts used as the demo reference series.
pub const REFERENCE: &[f64] = &[
    12.0, 15.0, 21.0, 30.0, 44.0, 58.0, 63.0, 55.0, 41.0, 29.0, 20.0, 14.0,
];

/// Candidate ids served by [`crate::MockSource`], in listing order.
pub const CANDIDATES: &[&str] = &[
    "site_alpha",
    "site_bravo",
    "site_charlie",
    "site_delta",
    "flat_sensor",
    "short_series",
    "FAIL",
    "TIMEOUT",
];

/// A table the mock reports as skipped during enumeration.
pub const MISSING_COLUMNS: &str = "missing_columns";

/// Build a weekly series starting on the first week ending of 2023.
///
/// # Errors
/// Propagates `TimeSeries::new` validation failures (non-finite values).
pub fn weekly(id: &str, values: &[f64]) -> Result<TimeSeries, MatchError> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 7)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| MatchError::Other("invalid fixture start date".into()))?;
    let points = values
        .iter()
        .zip(0i64..)
        .map(|(v, week)| Observation::new(start + Duration::weeks(week), *v))
        .collect();
    TimeSeries::new(id, points)
}

pub fn values_for(id: &str) -> Option<Vec<f64>> {
    let v = match id {
        // 2x + 3: scores 1.0 against the reference
        "site_alpha" | "TIMEOUT" => REFERENCE.iter().map(|x| 2.0f64.mul_add(*x, 3.0)).collect(),
        "site_bravo" => vec![
            10.0, 17.0, 19.0, 33.0, 40.0, 61.0, 60.0, 57.0, 38.0, 31.0, 18.0, 15.0,
        ],
        // Mirror image of the reference
        "site_charlie" => REFERENCE.iter().map(|x| 100.0 - x).collect(),
        "site_delta" => vec![
            5.0, 9.0, 4.0, 8.0, 3.0, 7.0, 2.0, 6.0, 1.0, 5.0, 0.0, 4.0,
        ],
        "flat_sensor" => vec![7.0; REFERENCE.len()],
        "short_series" => vec![42.0],
        _ => return None,
    };
    Some(v)
}

pub fn by_id(id: &str) -> Option<TimeSeries> {
    values_for(id).and_then(|v| weekly(id, &v).ok())
}
