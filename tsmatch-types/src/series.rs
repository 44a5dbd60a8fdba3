//! Time-series value types shared by the pipeline and its collaborators.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// A single `(timestamp, value)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation timestamp (UTC).
    pub ts: DateTime<Utc>,
    /// Observed scalar value.
    pub value: f64,
}

impl Observation {
    /// Construct an observation.
    #[must_use]
    pub const fn new(ts: DateTime<Utc>, value: f64) -> Self {
        Self { ts, value }
    }
}

/// An ordered, validated series of observations identified by a source name.
///
/// Invariants: timestamps strictly increasing (no duplicates) and every value
/// finite. The series is immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    id: String,
    points: Vec<Observation>,
}

impl TimeSeries {
    /// Build a series from points that are already in timestamp order.
    ///
    /// # Errors
    /// Returns `InvalidSeries` if timestamps are not strictly increasing or a
    /// value is NaN/infinite.
    pub fn new(id: impl Into<String>, points: Vec<Observation>) -> Result<Self, MatchError> {
        let id = id.into();
        for (i, p) in points.iter().enumerate() {
            if !p.value.is_finite() {
                return Err(MatchError::invalid_series(
                    id,
                    format!("non-finite value at {}", p.ts),
                ));
            }
            if i > 0 && points[i - 1].ts >= p.ts {
                return Err(MatchError::invalid_series(
                    id,
                    format!(
                        "timestamps not strictly increasing: {} then {}",
                        points[i - 1].ts,
                        p.ts
                    ),
                ));
            }
        }
        Ok(Self { id, points })
    }

    /// Build a series from rows in arbitrary order.
    ///
    /// Rows are sorted by timestamp; on duplicate timestamps the first row wins.
    /// Returns the series together with the number of dropped duplicates.
    ///
    /// # Errors
    /// Returns `InvalidSeries` if any value is NaN/infinite.
    pub fn from_unordered(
        id: impl Into<String>,
        points: impl IntoIterator<Item = Observation>,
    ) -> Result<(Self, usize), MatchError> {
        let mut by_ts: BTreeMap<DateTime<Utc>, Observation> = BTreeMap::new();
        let mut dropped = 0usize;
        for p in points {
            match by_ts.entry(p.ts) {
                Entry::Vacant(v) => {
                    v.insert(p);
                }
                Entry::Occupied(_) => dropped += 1,
            }
        }
        let series = Self::new(id, by_ts.into_values().collect())?;
        Ok((series, dropped))
    }

    /// Source identifier (reference label or candidate id).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Observations in timestamp order.
    #[must_use]
    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    /// Iterator over the raw values.
    pub fn values(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series carries no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A series rescaled to zero mean and unit standard deviation.
///
/// Shares the timestamps of the series it was derived from and remembers the
/// fitted `mean` and `std_dev`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSeries {
    /// Identifier of the originating series.
    pub source_id: String,
    /// Rescaled observations, same timestamps as the source.
    pub points: Vec<Observation>,
    /// Mean of the source values.
    pub mean: f64,
    /// Standard deviation of the source values (always > 0).
    pub std_dev: f64,
}

impl NormalizedSeries {
    /// Iterator over the normalized values.
    pub fn values(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series carries no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
