//! Conversion of normalized series into `polars` data frames.

use polars::prelude::{Column, DataFrame};

use crate::{MatchError, NormalizedSeries};

/// Conversion into a two-column (`ts`, `value`) data frame.
pub trait ToDataFrame {
    /// Build the data frame; `ts` holds UNIX seconds.
    ///
    /// # Errors
    /// Returns `Other` if `polars` rejects the columns.
    fn to_dataframe(&self) -> Result<DataFrame, MatchError>;
}

impl ToDataFrame for NormalizedSeries {
    fn to_dataframe(&self) -> Result<DataFrame, MatchError> {
        let ts: Vec<i64> = self.points.iter().map(|p| p.ts.timestamp()).collect();
        let values: Vec<f64> = self.values().collect();
        DataFrame::new(vec![
            Column::new("ts".into(), ts),
            Column::new("value".into(), values),
        ])
        .map_err(|e| MatchError::Other(e.to_string()))
    }
}
