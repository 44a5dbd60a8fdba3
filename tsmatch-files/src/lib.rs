//! tsmatch-files
//!
//! Filesystem collaborators for the tsmatch pipeline:
//! - [`read_reference`] loads the reference series from a CSV file or a workbook.
//! - [`CsvSink`] persists normalized series and the similarity ranking.
//! - [`SvgChartRenderer`] draws one reference/candidate overlay per report entry.
#![warn(missing_docs)]

use xxhash_rust::xxh64::xxh64;

/// SVG comparison charts.
pub mod chart;
/// CSV and spreadsheet reference reader.
pub mod reader;
/// CSV persistence sink.
pub mod writer;

pub use chart::SvgChartRenderer;
pub use reader::{
    ReferenceSpec, parse_date, read_reference, read_reference_from, read_reference_sheet,
};
pub use writer::{CsvSink, NORMALIZED_INPUT_FILE, SIMILARITY_RESULTS_FILE};

/// File-name-safe form of a series id.
///
/// Anything outside `[A-Za-z0-9._-]` becomes `_`. When that changes the id,
/// `-` and eight hex digits of the id's `xxh64` hash are appended, so ids that
/// only differ in replaced characters never share a file.
#[must_use]
pub fn file_stem(id: &str) -> String {
    let safe: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe == id {
        safe
    } else {
        format!("{safe}-{:08x}", xxh64(id.as_bytes(), 0) >> 32)
    }
}
