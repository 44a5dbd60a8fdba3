use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use calamine::{Data, DataType, Reader, open_workbook_auto_from_rs};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tsmatch_core::{MatchError, Observation, TimeSeries};

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

static EMPTY_CELL: Data = Data::Empty;

/// Where the reference series lives and which columns hold it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSpec {
    /// CSV or spreadsheet file path.
    pub path: PathBuf,
    /// Column holding observation dates.
    pub date_column: String,
    /// Column holding observation values; also used as the series label.
    pub value_column: String,
}

impl ReferenceSpec {
    /// Spec for `path` with the default `Week Ending Date` / `Detections` columns.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            date_column: "Week Ending Date".to_string(),
            value_column: "Detections".to_string(),
        }
    }

    /// Override the column names.
    #[must_use]
    pub fn with_columns(mut self, date: impl Into<String>, value: impl Into<String>) -> Self {
        self.date_column = date.into();
        self.value_column = value.into();
        self
    }
}

/// Read the reference series described by `spec`.
///
/// Files ending in `.xlsx`, `.xlsm`, `.xlsb`, `.xls` or `.ods` are read as
/// workbooks (first worksheet, header row first); anything else as CSV.
/// The series is labelled with the value column name. Rows are sorted by
/// date; a repeated date keeps its first row.
///
/// # Errors
/// - `Validation` for unreadable workbooks, missing columns, or unparseable rows.
/// - `Io` if the file cannot be opened.
/// All errors name the file.
pub fn read_reference(spec: &ReferenceSpec) -> Result<TimeSeries, MatchError> {
    let origin = spec.path.display().to_string();
    if is_spreadsheet(&spec.path) {
        let bytes = std::fs::read(&spec.path).map_err(|e| MatchError::io(&origin, e.to_string()))?;
        return read_reference_sheet(bytes, &origin, spec);
    }
    let file = File::open(&spec.path).map_err(|e| MatchError::io(&origin, e.to_string()))?;
    read_reference_from(file, &origin, spec)
}

/// Read a reference series from any CSV byte stream; `origin` names it in errors.
///
/// # Errors
/// Same as [`read_reference`], minus file access.
pub fn read_reference_from<R: Read>(
    input: R,
    origin: &str,
    spec: &ReferenceSpec,
) -> Result<TimeSeries, MatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| MatchError::validation(origin, format!("failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(headers.iter());
    let date_idx = column_index(&header_map, &spec.date_column, "date", origin)?;
    let value_idx = column_index(&header_map, &spec.value_column, "value", origin)?;

    let mut observations = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header; lines are 1-based
        let line = idx + 2;
        let record = result
            .map_err(|e| MatchError::validation(origin, format!("line {line}: {e}")))?;
        let raw_date = record.get(date_idx).unwrap_or_default();
        let raw_value = record.get(value_idx).unwrap_or_default();
        if raw_date.is_empty() && raw_value.is_empty() {
            continue;
        }
        let ts = parse_date(raw_date).ok_or_else(|| {
            MatchError::validation(origin, format!("line {line}: unparseable date '{raw_date}'"))
        })?;
        let value = raw_value.parse::<f64>().map_err(|_| {
            MatchError::validation(origin, format!("line {line}: invalid value '{raw_value}'"))
        })?;
        observations.push(Observation::new(ts, value));
    }
    into_series(observations, origin, spec)
}

/// Read a reference series from the first worksheet of an in-memory workbook.
///
/// The format (xlsx, xlsb, xls, ods) is detected from the content. Date cells
/// may be native spreadsheet dates or text in any form [`parse_date`] accepts;
/// value cells may be numbers or numeric text.
///
/// # Errors
/// Same as [`read_reference`], minus file access. Row numbers in messages are
/// the worksheet's own.
pub fn read_reference_sheet(
    bytes: Vec<u8>,
    origin: &str,
    spec: &ReferenceSpec,
) -> Result<TimeSeries, MatchError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| MatchError::validation(origin, format!("failed to open workbook: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| MatchError::validation(origin, "workbook has no worksheets"))?
        .map_err(|e| MatchError::validation(origin, format!("failed to read first worksheet: {e}")))?;

    // Range coordinates are 0-based and may not start at A1
    let first_row = range.start().map_or(0, |(row, _)| row as usize) + 1;
    let mut rows = range.rows();
    let headers = rows
        .next()
        .ok_or_else(|| MatchError::validation(origin, "first worksheet is empty"))?;
    let header_map = build_header_map(headers.iter().map(ToString::to_string));
    let date_idx = column_index(&header_map, &spec.date_column, "date", origin)?;
    let value_idx = column_index(&header_map, &spec.value_column, "value", origin)?;

    let mut observations = Vec::new();
    for (idx, row) in rows.enumerate() {
        let line = first_row + idx + 1;
        let date_cell = row.get(date_idx).unwrap_or(&EMPTY_CELL);
        let value_cell = row.get(value_idx).unwrap_or(&EMPTY_CELL);
        if date_cell.is_empty() && value_cell.is_empty() {
            continue;
        }
        let ts = cell_date(date_cell).ok_or_else(|| {
            MatchError::validation(origin, format!("row {line}: unparseable date '{date_cell}'"))
        })?;
        let value = cell_value(value_cell).ok_or_else(|| {
            MatchError::validation(origin, format!("row {line}: invalid value '{value_cell}'"))
        })?;
        observations.push(Observation::new(ts, value));
    }
    into_series(observations, origin, spec)
}

fn cell_date(cell: &Data) -> Option<DateTime<Utc>> {
    match cell {
        Data::String(raw) => parse_date(raw),
        _ => cell.as_datetime().map(|ndt| ndt.and_utc()),
    }
}

#[allow(clippy::cast_precision_loss)]
fn cell_value(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(v) => Some(*v),
        Data::Int(v) => Some(*v as f64),
        Data::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

fn into_series(
    observations: Vec<Observation>,
    origin: &str,
    spec: &ReferenceSpec,
) -> Result<TimeSeries, MatchError> {
    let (series, duplicates) = TimeSeries::from_unordered(&spec.value_column, observations)
        .map_err(|e| MatchError::validation(origin, e.to_string()))?;
    if duplicates > 0 {
        #[cfg(feature = "tracing")]
        tracing::warn!(file = origin, duplicates, "reference has repeated dates; kept first rows");
    }
    Ok(series)
}

/// Parse a date cell: `YYYY-MM-DD`, `MM/DD/YYYY`, `YYYY-MM-DD HH:MM:SS`, or RFC 3339.
///
/// Dates without a time are taken as midnight UTC.
#[must_use]
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt.and_utc());
    }
    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SPREADSHEET_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

fn build_header_map<S: AsRef<str>>(headers: impl Iterator<Item = S>) -> HashMap<String, usize> {
    headers
        .enumerate()
        // Spreadsheet exports may prefix the first header with a BOM
        .map(|(idx, name)| (name.as_ref().trim_start_matches('\u{feff}').trim().to_string(), idx))
        .collect()
}

fn column_index(
    header_map: &HashMap<String, usize>,
    column: &str,
    role: &str,
    origin: &str,
) -> Result<usize, MatchError> {
    header_map.get(column).copied().ok_or_else(|| {
        MatchError::validation(origin, format!("{role} column '{column}' not found"))
    })
}
