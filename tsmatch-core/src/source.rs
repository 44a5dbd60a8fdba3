use async_trait::async_trait;

use crate::MatchError;
pub use tsmatch_types::SourceKey;
use tsmatch_types::TimeSeries;

/// Producer of candidate series.
///
/// A source enumerates candidate identifiers and fetches one candidate's rows
/// on demand. Blocking or network I/O belongs here, before a series reaches
/// the normalizer. New backends plug in by implementing this trait; the
/// scoring logic never learns how candidates were discovered.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// A stable identifier used in logs and error tags (e.g. "tsmatch-postgres").
    fn name(&self) -> &'static str;

    /// Canonical source key constructed from the static name.
    fn key(&self) -> SourceKey {
        SourceKey::new(self.name())
    }

    /// List every candidate this source can serve.
    ///
    /// Candidates that fail cheap structural checks (for example a table
    /// without the configured columns) may be omitted here; such omissions are
    /// reported through [`Enumeration::skipped`].
    async fn list_candidates(&self) -> Result<Enumeration, MatchError>;

    /// Fetch the validated series for one candidate.
    async fn fetch(&self, candidate_id: &str) -> Result<TimeSeries, MatchError>;
}

/// Result of enumerating a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enumeration {
    /// Candidate identifiers that passed validation, in source order.
    pub candidates: Vec<String>,
    /// Candidates dropped during validation, with the reason.
    pub skipped: Vec<MatchError>,
}

impl Enumeration {
    /// Enumeration with no skipped entries.
    #[must_use]
    pub const fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            skipped: Vec::new(),
        }
    }
}

impl From<Vec<String>> for Enumeration {
    fn from(candidates: Vec<String>) -> Self {
        Self::new(candidates)
    }
}
