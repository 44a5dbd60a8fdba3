use tsmatch_types::{MatchError, NormalizedSeries, Observation, TimeSeries, Variance};

/// Fitted location and scale of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    /// Arithmetic mean.
    pub mean: f64,
    /// Standard deviation under the chosen variance convention.
    pub std_dev: f64,
}

/// Standard deviations at or below this fraction of the series' largest
/// magnitude are treated as zero.
pub const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Compute mean and standard deviation of `values`.
///
/// Values are divided by their largest magnitude before summing, so finite
/// inputs near `f64::MAX` do not overflow.
///
/// # Errors
/// - `InsufficientData` if fewer than 2 values are present.
/// - `DegenerateSeries` if the deviation is within [`DEGENERATE_TOLERANCE`]
///   of zero, relative to the largest magnitude.
pub fn moments(series_id: &str, values: &[f64], variance: Variance) -> Result<Moments, MatchError> {
    let (scale, unit) = unit_moments(series_id, values, variance)?;
    Ok(Moments {
        mean: unit.mean * scale,
        std_dev: unit.std_dev * scale,
    })
}

/// Moments of `values / scale`, where `scale` is the largest magnitude.
fn unit_moments(
    series_id: &str,
    values: &[f64],
    variance: Variance,
) -> Result<(f64, Moments), MatchError> {
    let n = values.len();
    if n < 2 {
        return Err(MatchError::insufficient(series_id, n));
    }
    let scale = values.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    if scale == 0.0 {
        return Err(MatchError::degenerate(series_id));
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = values.iter().map(|v| v / scale).sum::<f64>() / n as f64;
    let ss: f64 = values
        .iter()
        .map(|v| {
            let d = v / scale - mean;
            d * d
        })
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let denom = (n - variance.ddof()) as f64;
    let std_dev = (ss / denom).sqrt();

    // NaN fails this comparison as well
    if !(std_dev > DEGENERATE_TOLERANCE) {
        return Err(MatchError::degenerate(series_id));
    }
    Ok((scale, Moments { mean, std_dev }))
}

/// Rescale a series to zero mean and unit standard deviation.
///
/// Statistics are computed over the series' own values only; timestamps are
/// carried over unchanged.
///
/// ```
/// use chrono::DateTime;
/// use tsmatch_core::{normalize, Observation, TimeSeries, Variance};
///
/// let day = |d: i64| DateTime::from_timestamp(d * 86_400, 0).unwrap();
/// let s = TimeSeries::new(
///     "ref",
///     (1..=5).map(|d| Observation::new(day(d), d as f64)).collect(),
/// )
/// .unwrap();
/// let z = normalize(&s, Variance::Population).unwrap();
/// assert!(z.values().sum::<f64>().abs() < 1e-12);
/// assert_eq!(z.points[0].ts, s.points()[0].ts);
/// ```
///
/// # Errors
/// - `InsufficientData` for series with fewer than 2 values.
/// - `DegenerateSeries` for constant (or numerically constant) series.
pub fn normalize(series: &TimeSeries, variance: Variance) -> Result<NormalizedSeries, MatchError> {
    let values: Vec<f64> = series.values().collect();
    let (scale, unit) = unit_moments(series.id(), &values, variance)?;

    let points = series
        .points()
        .iter()
        .map(|p| Observation::new(p.ts, (p.value / scale - unit.mean) / unit.std_dev))
        .collect();

    Ok(NormalizedSeries {
        source_id: series.id().to_string(),
        points,
        mean: unit.mean * scale,
        std_dev: unit.std_dev * scale,
    })
}

/// [`normalize`] with the population (ddof = 0) convention.
///
/// # Errors
/// Same as [`normalize`].
pub fn normalize_population(series: &TimeSeries) -> Result<NormalizedSeries, MatchError> {
    normalize(series, Variance::Population)
}
