use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use tsmatch_core::MatchError;

use crate::sql;

/// One raw row read from a candidate table, before validation.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RawRow {
    /// Date column cast to `timestamptz`.
    pub ts: Option<DateTime<Utc>>,
    /// Value column cast to `float8`.
    pub value: Option<f64>,
}

/// Which table to read and which columns carry the series.
#[derive(Debug, Clone, Copy)]
pub struct SeriesQuery<'a> {
    /// Schema holding the table.
    pub schema: &'a str,
    /// Candidate table name.
    pub table: &'a str,
    /// Column holding observation dates.
    pub date_column: &'a str,
    /// Column holding observation values.
    pub value_column: &'a str,
}

/// Catalog and row access (so tests can inject a store without a database).
#[async_trait]
pub trait PgCatalog: Send + Sync {
    /// Names of the tables in `schema`.
    async fn tables(&self, schema: &str) -> Result<Vec<String>, MatchError>;

    /// `(table, column)` pairs for every column in `schema`.
    async fn columns(&self, schema: &str) -> Result<Vec<(String, String)>, MatchError>;

    /// Rows of one candidate table ordered by the date column.
    async fn rows(&self, query: SeriesQuery<'_>) -> Result<Vec<RawRow>, MatchError>;
}

/// Production catalog backed by a `sqlx` connection pool.
#[derive(Clone)]
pub struct RealAdapter {
    pool: PgPool,
}

impl RealAdapter {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `url`.
    ///
    /// # Errors
    /// Returns `Store` if the connection cannot be established.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, MatchError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error(e, "connect"))?;
        Ok(Self::new(pool))
    }
}

/// Map a driver error onto the shared error type.
///
/// Missing relations become `NotFound`; everything else is a `Store` error
/// naming the object being accessed.
pub(crate) fn map_sqlx_error(e: sqlx::Error, what: &str) -> MatchError {
    match &e {
        sqlx::Error::RowNotFound => MatchError::not_found(what.to_string()),
        sqlx::Error::Database(db) if db.code().as_deref() == Some("42P01") => {
            MatchError::not_found(what.to_string())
        }
        _ => MatchError::store(crate::PG_SOURCE_NAME, format!("{what}: {e}")),
    }
}

#[async_trait]
impl PgCatalog for RealAdapter {
    async fn tables(&self, schema: &str) -> Result<Vec<String>, MatchError> {
        let rows: Vec<(String,)> = sqlx::query_as(sql::LIST_TABLES)
            .bind(schema)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, &format!("schema {schema}")))?;
        Ok(rows.into_iter().map(|(t,)| t).collect())
    }

    async fn columns(&self, schema: &str) -> Result<Vec<(String, String)>, MatchError> {
        sqlx::query_as(sql::LIST_COLUMNS)
            .bind(schema)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, &format!("columns of schema {schema}")))
    }

    async fn rows(&self, query: SeriesQuery<'_>) -> Result<Vec<RawRow>, MatchError> {
        let stmt = sql::series_select(query);
        sqlx::query_as::<_, RawRow>(&stmt)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, &format!("table {}", query.table)))
    }
}
