//! tsmatch-postgres
//!
//! Candidate source that treats every table in one PostgreSQL schema as a
//! candidate series. Each table must carry a date column and a value column;
//! tables without them are skipped during enumeration and reported as
//! validation warnings naming the table.
#![warn(missing_docs)]

/// Catalog abstraction and the production adapter backed by `sqlx`.
pub mod adapter;
mod sql;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tsmatch_core::source::SourceKey;
use tsmatch_core::{CandidateSource, Enumeration, MatchError, Observation, TimeSeries};

use adapter::{PgCatalog, RawRow, RealAdapter, SeriesQuery};

/// Name reported by [`PgSource`].
pub const PG_SOURCE_NAME: &str = "tsmatch-postgres";

/// Which schema to scan and which columns hold each candidate's series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgSourceConfig {
    /// Schema whose tables are the candidates.
    pub schema: String,
    /// Date column every candidate table must have.
    pub date_column: String,
    /// Value column every candidate table must have.
    pub value_column: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl Default for PgSourceConfig {
    fn default() -> Self {
        Self {
            schema: "public".to_string(),
            date_column: "Date".to_string(),
            value_column: "Value".to_string(),
            max_connections: 5,
        }
    }
}

/// Candidate source reading one table per candidate.
pub struct PgSource {
    catalog: Arc<dyn PgCatalog>,
    cfg: PgSourceConfig,
}

impl PgSource {
    /// Static source key for use in logs and error tags.
    pub const KEY: SourceKey = SourceKey::new(PG_SOURCE_NAME);

    /// Connect to `url` and build a source.
    ///
    /// # Errors
    /// Returns `Store` if the database is unreachable.
    pub async fn connect(url: &str, cfg: PgSourceConfig) -> Result<Self, MatchError> {
        let adapter = RealAdapter::connect(url, cfg.max_connections).await?;
        Ok(Self::from_catalog(Arc::new(adapter), cfg))
    }

    /// Build from an existing pool.
    #[must_use]
    pub fn from_pool(pool: sqlx::PgPool, cfg: PgSourceConfig) -> Self {
        Self::from_catalog(Arc::new(RealAdapter::new(pool)), cfg)
    }

    /// Build from any catalog implementation (used for injection in tests).
    #[must_use]
    pub fn from_catalog(catalog: Arc<dyn PgCatalog>, cfg: PgSourceConfig) -> Self {
        Self { catalog, cfg }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PgSourceConfig {
        &self.cfg
    }

    fn missing_columns(&self, present: Option<&HashSet<String>>) -> Vec<&str> {
        [self.cfg.date_column.as_str(), self.cfg.value_column.as_str()]
            .into_iter()
            .filter(|c| present.is_none_or(|cols| !cols.contains(*c)))
            .collect()
    }

    fn to_series(table: &str, rows: Vec<RawRow>) -> Result<TimeSeries, MatchError> {
        let total = rows.len();
        let observations: Vec<Observation> = rows
            .into_iter()
            .filter_map(|r| Some(Observation::new(r.ts?, r.value?)))
            .collect();
        let nulls = total - observations.len();
        let (series, duplicates) = TimeSeries::from_unordered(table, observations)
            .map_err(|e| MatchError::validation(table, e.to_string()))?;
        if nulls > 0 || duplicates > 0 {
            #[cfg(feature = "tracing")]
            tracing::debug!(table, nulls, duplicates, "dropped rows while reading candidate");
        }
        Ok(series)
    }
}

#[async_trait]
impl CandidateSource for PgSource {
    fn name(&self) -> &'static str {
        PG_SOURCE_NAME
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "tsmatch_postgres::list_candidates", skip(self), fields(schema = %self.cfg.schema))
    )]
    async fn list_candidates(&self) -> Result<Enumeration, MatchError> {
        let schema = self.cfg.schema.as_str();
        let tables = self.catalog.tables(schema).await?;
        let mut columns: HashMap<String, HashSet<String>> = HashMap::new();
        for (table, column) in self.catalog.columns(schema).await? {
            columns.entry(table).or_default().insert(column);
        }

        let mut out = Enumeration::default();
        for table in tables {
            let missing = self.missing_columns(columns.get(&table));
            if missing.is_empty() {
                out.candidates.push(table);
                continue;
            }
            let msg = match missing.as_slice() {
                [one] => format!("missing column '{one}'"),
                many => format!("missing columns '{}'", many.join("', '")),
            };
            #[cfg(feature = "tracing")]
            tracing::warn!(table = %table, %msg, "skipping candidate table");
            out.skipped.push(MatchError::validation(table, msg));
        }
        Ok(out)
    }

    async fn fetch(&self, candidate_id: &str) -> Result<TimeSeries, MatchError> {
        let rows = self
            .catalog
            .rows(SeriesQuery {
                schema: &self.cfg.schema,
                table: candidate_id,
                date_column: &self.cfg.date_column,
                value_column: &self.cfg.value_column,
            })
            .await?;
        Self::to_series(candidate_id, rows)
    }
}
