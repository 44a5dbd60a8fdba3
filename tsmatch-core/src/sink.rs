use std::path::PathBuf;

use crate::MatchError;
use tsmatch_types::{NormalizedSeries, RankedReport, ReportEntry, SeriesRole};

/// Persistence collaborator for intermediate artifacts.
///
/// Implementations perform their own (blocking) I/O. Failures are reported to
/// the caller but never influence scoring or ranking.
pub trait SeriesSink: Send + Sync {
    /// Persist one normalized series (index plus a single value column).
    fn write_normalized(
        &self,
        series: &NormalizedSeries,
        role: SeriesRole,
    ) -> Result<(), MatchError>;

    /// Persist `(candidate_id, score)` rows in rank order.
    fn write_ranking(&self, ranking: &RankedReport) -> Result<(), MatchError>;
}

/// Rendering collaborator: one chart per report entry.
///
/// Each call is self-contained and receives only the data it draws, so a batch
/// may be rendered in any order or concurrently.
pub trait ChartRenderer: Send + Sync {
    /// Render the reference/candidate overlay for `entry`, returning the file written.
    fn render(&self, entry: &ReportEntry, reference_id: &str) -> Result<PathBuf, MatchError>;
}
