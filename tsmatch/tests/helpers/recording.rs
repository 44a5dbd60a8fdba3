use std::path::PathBuf;
use std::sync::Mutex;

use tsmatch::{
    ChartRenderer, MatchError, NormalizedSeries, RankedReport, ReportEntry, SeriesRole, SeriesSink,
};

/// In-memory sink that records every write and can be told to fail.
#[derive(Default)]
pub struct RecordingSink {
    pub normalized: Mutex<Vec<(String, SeriesRole)>>,
    pub rankings: Mutex<Vec<Vec<(String, f64)>>>,
    pub fail_series: Option<String>,
    pub fail_ranking: bool,
}

impl RecordingSink {
    pub fn failing_on(series: &str) -> Self {
        Self {
            fail_series: Some(series.to_string()),
            ..Self::default()
        }
    }
}

impl SeriesSink for RecordingSink {
    fn write_normalized(
        &self,
        series: &NormalizedSeries,
        role: SeriesRole,
    ) -> Result<(), MatchError> {
        if self.fail_series.as_deref() == Some(series.source_id.as_str()) {
            return Err(MatchError::io(
                format!("{}_normalized.csv", series.source_id),
                "disk full",
            ));
        }
        self.normalized
            .lock()
            .unwrap()
            .push((series.source_id.clone(), role));
        Ok(())
    }

    fn write_ranking(&self, ranking: &RankedReport) -> Result<(), MatchError> {
        if self.fail_ranking {
            return Err(MatchError::io("similarity_results.csv", "read-only"));
        }
        let rows = ranking
            .entries
            .iter()
            .map(|r| (r.candidate_id.clone(), r.score.unwrap_or(f64::NAN)))
            .collect();
        self.rankings.lock().unwrap().push(rows);
        Ok(())
    }
}

/// Renderer that records calls and fails for one candidate id.
#[derive(Default)]
pub struct RecordingRenderer {
    pub rendered: Mutex<Vec<(usize, String)>>,
    pub fail_candidate: Option<String>,
}

impl ChartRenderer for RecordingRenderer {
    fn render(&self, entry: &ReportEntry, reference_id: &str) -> Result<PathBuf, MatchError> {
        if self.fail_candidate.as_deref() == Some(entry.candidate_id.as_str()) {
            return Err(MatchError::render(&entry.candidate_id, "no font available"));
        }
        assert_eq!(reference_id, entry.reference.source_id);
        self.rendered
            .lock()
            .unwrap()
            .push((entry.rank, entry.candidate_id.clone()));
        Ok(PathBuf::from(format!("comparison_{}.svg", entry.candidate_id)))
    }
}
