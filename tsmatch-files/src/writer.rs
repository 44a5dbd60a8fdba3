use std::path::{Path, PathBuf};

use chrono::{DateTime, Timelike, Utc};
use tsmatch_core::{MatchError, NormalizedSeries, RankedReport, SeriesRole, SeriesSink};

use crate::file_stem;

/// File holding the normalized reference series.
pub const NORMALIZED_INPUT_FILE: &str = "normalized_input.csv";
/// File holding `(candidate_id, score)` rows in rank order.
pub const SIMILARITY_RESULTS_FILE: &str = "similarity_results.csv";

/// Persists normalized series and the ranking as CSV files in one directory.
///
/// Normalized files carry the date index and a single value column, with
/// headers taken from the configured column names.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
    reference_columns: (String, String),
    candidate_columns: (String, String),
}

impl CsvSink {
    /// Sink writing into `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            reference_columns: ("Week Ending Date".into(), "Detections".into()),
            candidate_columns: ("Date".into(), "Value".into()),
        }
    }

    /// Headers for `normalized_input.csv`.
    #[must_use]
    pub fn with_reference_columns(mut self, date: impl Into<String>, value: impl Into<String>) -> Self {
        self.reference_columns = (date.into(), value.into());
        self
    }

    /// Headers for each `{candidate}_normalized.csv`.
    #[must_use]
    pub fn with_candidate_columns(mut self, date: impl Into<String>, value: impl Into<String>) -> Self {
        self.candidate_columns = (date.into(), value.into());
        self
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the sink uses for a normalized series.
    #[must_use]
    pub fn normalized_path(&self, series_id: &str, role: SeriesRole) -> PathBuf {
        match role {
            SeriesRole::Reference => self.dir.join(NORMALIZED_INPUT_FILE),
            SeriesRole::Candidate => self
                .dir
                .join(format!("{}_normalized.csv", file_stem(series_id))),
        }
    }

    fn write_rows<I>(path: &Path, header: [&str; 2], rows: I) -> Result<(), MatchError>
    where
        I: IntoIterator<Item = [String; 2]>,
    {
        let io_err = |e: csv::Error| MatchError::io(path.display().to_string(), e.to_string());
        let mut w = csv::Writer::from_path(path).map_err(io_err)?;
        w.write_record(header).map_err(io_err)?;
        for row in rows {
            w.write_record(&row).map_err(io_err)?;
        }
        w.flush()
            .map_err(|e| MatchError::io(path.display().to_string(), e.to_string()))
    }
}

/// Date-only when the timestamp is midnight, RFC 3339 otherwise.
fn format_ts(ts: DateTime<Utc>) -> String {
    if ts.num_seconds_from_midnight() == 0 && ts.nanosecond() == 0 {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.to_rfc3339()
    }
}

impl SeriesSink for CsvSink {
    fn write_normalized(&self, series: &NormalizedSeries, role: SeriesRole) -> Result<(), MatchError> {
        let (date, value) = match role {
            SeriesRole::Reference => &self.reference_columns,
            SeriesRole::Candidate => &self.candidate_columns,
        };
        let path = self.normalized_path(&series.source_id, role);
        Self::write_rows(
            &path,
            [date.as_str(), value.as_str()],
            series
                .points
                .iter()
                .map(|p| [format_ts(p.ts), p.value.to_string()]),
        )?;
        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), rows = series.len(), "wrote normalized series");
        Ok(())
    }

    fn write_ranking(&self, ranking: &RankedReport) -> Result<(), MatchError> {
        let path = self.dir.join(SIMILARITY_RESULTS_FILE);
        Self::write_rows(
            &path,
            ["candidate_id", "score"],
            ranking.entries.iter().filter_map(|r| {
                r.score
                    .map(|s| [r.candidate_id.clone(), s.to_string()])
            }),
        )?;
        #[cfg(feature = "tracing")]
        tracing::info!(path = %path.display(), rows = ranking.entries.len(), "wrote similarity results");
        Ok(())
    }
}
