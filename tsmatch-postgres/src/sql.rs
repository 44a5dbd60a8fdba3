//! SQL text used by the production catalog.

use crate::adapter::SeriesQuery;

pub const LIST_TABLES: &str = "SELECT tablename::text FROM pg_catalog.pg_tables \
     WHERE schemaname = $1 ORDER BY tablename";

pub const LIST_COLUMNS: &str = "SELECT table_name::text, column_name::text \
     FROM information_schema.columns WHERE table_schema = $1";

/// Quote an identifier for interpolation into SQL text.
///
/// Table and column names cannot be bound as parameters, so they are wrapped
/// in double quotes with embedded quotes doubled.
pub fn quote_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 2);
    out.push('"');
    for c in ident.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// `SELECT` reading one candidate's `(ts, value)` rows in date order.
pub fn series_select(q: SeriesQuery<'_>) -> String {
    format!(
        "SELECT {date}::timestamptz AS ts, {value}::float8 AS value FROM {schema}.{table} ORDER BY 1",
        date = quote_ident(q.date_column),
        value = quote_ident(q.value_column),
        schema = quote_ident(q.schema),
        table = quote_ident(q.table),
    )
}
