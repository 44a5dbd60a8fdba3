//! `tsmatch`: rank every candidate series in a store by shape similarity to a
//! reference CSV or workbook, persist the normalized data and write comparison charts.
//!
//! ```text
//! tsmatch --input detections.csv --db-url postgres://localhost/surveillance
//! TSMATCH_USE_MOCK=1 tsmatch --input detections.csv --output-dir out
//! ```
//!
//! Logging goes to stderr and honours `RUST_LOG` (default `info`).

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tsmatch::{AnalysisReport, CandidateSource, MatchConfig, Matcher};
use tsmatch_files::{CsvSink, ReferenceSpec, SvgChartRenderer, read_reference};
use tsmatch_mock::MockSource;
use tsmatch_postgres::{PgSource, PgSourceConfig};

const USE_MOCK_ENV: &str = "TSMATCH_USE_MOCK";

/// Time-series similarity search.
#[derive(Parser, Debug)]
#[command(name = "tsmatch", version)]
#[command(about = "Rank stored time series by cosine similarity to a reference series")]
struct Args {
    /// Reference CSV or spreadsheet (.xlsx, .xls, .ods) file.
    #[arg(long)]
    input: PathBuf,

    /// Postgres connection URL; every table in --schema is a candidate.
    #[arg(long, conflicts_with = "mock")]
    db_url: Option<String>,

    /// Use the built-in mock candidates instead of a database.
    #[arg(long)]
    mock: bool,

    /// Directory for normalized CSVs, the ranking and the charts.
    #[arg(long, default_value = "output_data")]
    output_dir: PathBuf,

    /// Date column of the reference CSV.
    #[arg(long, default_value = "Week Ending Date")]
    input_date_column: String,

    /// Value column of the reference CSV.
    #[arg(long, default_value = "Detections")]
    input_value_column: String,

    /// Date column every candidate table must have.
    #[arg(long, default_value = "Date")]
    db_date_column: String,

    /// Value column every candidate table must have.
    #[arg(long, default_value = "Value")]
    db_value_column: String,

    /// Schema scanned for candidate tables.
    #[arg(long, default_value = "public")]
    schema: String,

    /// Number of matches to report and chart; overrides --config.
    #[arg(long)]
    top_k: Option<usize>,

    /// JSON file holding a `MatchConfig`.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn use_mock(&self) -> bool {
        self.mock
            || (self.db_url.is_none()
                && std::env::var(USE_MOCK_ENV).is_ok_and(|v| !v.is_empty() && v != "0"))
    }
}

fn load_config(path: Option<&Path>) -> Result<MatchConfig, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(MatchConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| format!("invalid config {}: {e}", path.display()))?;
    Ok(cfg)
}

async fn candidate_source(args: &Args) -> Result<Arc<dyn CandidateSource>, Box<dyn Error>> {
    if args.use_mock() {
        tracing::info!("using mock candidate source");
        return Ok(Arc::new(MockSource::new()));
    }
    let Some(url) = args.db_url.as_deref() else {
        return Err(format!("either --db-url or --mock (or {USE_MOCK_ENV}=1) is required").into());
    };
    let cfg = PgSourceConfig {
        schema: args.schema.clone(),
        date_column: args.db_date_column.clone(),
        value_column: args.db_value_column.clone(),
        ..PgSourceConfig::default()
    };
    Ok(Arc::new(PgSource::connect(url, cfg).await?))
}

fn print_summary(report: &AnalysisReport) {
    println!(
        "Top {} matches for {}:",
        report.report.entries.len(),
        report.report.reference_id
    );
    for entry in &report.report.entries {
        println!("{}. {} ({:.4})", entry.rank, entry.candidate_id, entry.score);
    }
    if !report.failures.is_empty() {
        println!("{} candidate(s) could not be scored", report.failures.len());
    }
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(k) = args.top_k {
        cfg.top_k = k;
    }

    let spec = ReferenceSpec::new(&args.input)
        .with_columns(&args.input_date_column, &args.input_value_column);
    let reference = read_reference(&spec)?;
    tracing::info!(
        path = %args.input.display(),
        rows = reference.len(),
        "loaded reference series"
    );

    std::fs::create_dir_all(&args.output_dir)
        .map_err(|e| format!("cannot create {}: {e}", args.output_dir.display()))?;
    let sink = CsvSink::new(&args.output_dir)
        .with_reference_columns(&args.input_date_column, &args.input_value_column)
        .with_candidate_columns(&args.db_date_column, &args.db_value_column);
    let renderer = SvgChartRenderer::new(&args.output_dir);

    let matcher = Matcher::builder()
        .with_source(candidate_source(&args).await?)
        .sink(Arc::new(sink))
        .renderer(Arc::new(renderer))
        .config(cfg)
        .build()?;

    let report = matcher.run(&reference).await?;
    tracing::info!(
        scored = report.ranking.entries.len(),
        failed = report.failures.len(),
        output = %args.output_dir.display(),
        "analysis complete"
    );
    print_summary(&report);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
