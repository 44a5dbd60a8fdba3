use std::fmt::Write as _;
use std::path::PathBuf;

use tsmatch_core::{ChartRenderer, MatchError, NormalizedSeries, ReportEntry};

use crate::file_stem;

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 80.0;
const MARGIN_BOTTOM: f64 = 70.0;
const GRID_LINES: usize = 5;

/// Writes `comparison_{candidate}.svg` overlays into one directory.
///
/// The reference is drawn dashed and the candidate solid, on a shared
/// time axis. The renderer keeps no state between calls.
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    dir: PathBuf,
    width: u32,
    height: u32,
}

impl SvgChartRenderer {
    /// Renderer writing 1200x600 charts into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            width: 1200,
            height: 600,
        }
    }

    /// Override the canvas size in pixels.
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Path the chart for `candidate_id` is written to.
    #[must_use]
    pub fn chart_path(&self, candidate_id: &str) -> PathBuf {
        self.dir
            .join(format!("comparison_{}.svg", file_stem(candidate_id)))
    }

    /// Build the SVG document for one entry.
    ///
    /// # Errors
    /// `Render` if either series is empty.
    pub fn svg(&self, entry: &ReportEntry, reference_id: &str) -> Result<String, MatchError> {
        let (reference, candidate) = (entry.reference.as_ref(), &entry.candidate);
        if reference.is_empty() || candidate.is_empty() {
            return Err(MatchError::render(&entry.candidate_id, "nothing to plot"));
        }
        let frame = Frame::fit(
            [reference, candidate],
            f64::from(self.width),
            f64::from(self.height),
        );

        let mut doc = String::new();
        let (w, h) = (self.width, self.height);
        let _ = writeln!(
            doc,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#
        );
        let _ = writeln!(doc, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            doc,
            r#"<text x="{x}" y="30" font-size="18" text-anchor="middle">Time Series Comparison: {id}</text>"#,
            x = f64::from(w) / 2.0,
            id = escape(&entry.candidate_id),
        );
        let _ = writeln!(
            doc,
            r#"<text x="{x}" y="54" font-size="14" text-anchor="middle">Cosine Similarity: {score:.4}</text>"#,
            x = f64::from(w) / 2.0,
            score = entry.score,
        );
        frame.grid(&mut doc);
        frame.axes(&mut doc, reference, candidate);
        let _ = writeln!(
            doc,
            r##"<polyline fill="none" stroke="#1f77b4" stroke-width="2" points="{}"/>"##,
            frame.points(candidate)
        );
        let _ = writeln!(
            doc,
            r##"<polyline fill="none" stroke="#ff7f0e" stroke-width="2" stroke-dasharray="8 5" points="{}"/>"##,
            frame.points(reference)
        );
        legend(&mut doc, frame.right, &entry.candidate_id, reference_id);
        doc.push_str("</svg>\n");
        Ok(doc)
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, entry: &ReportEntry, reference_id: &str) -> Result<PathBuf, MatchError> {
        let doc = self.svg(entry, reference_id)?;
        let path = self.chart_path(&entry.candidate_id);
        std::fs::write(&path, doc).map_err(|e| {
            MatchError::render(&entry.candidate_id, format!("{}: {e}", path.display()))
        })?;
        #[cfg(feature = "tracing")]
        tracing::info!(candidate = %entry.candidate_id, path = %path.display(), "created comparison chart");
        Ok(path)
    }
}

/// Data-to-pixel mapping shared by both series.
struct Frame {
    t0: i64,
    t1: i64,
    y0: f64,
    y1: f64,
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Frame {
    fn fit(series: [&NormalizedSeries; 2], width: f64, height: f64) -> Self {
        let ts = series.iter().flat_map(|s| s.points.iter().map(|p| p.ts.timestamp()));
        let (t0, t1) = ts.fold((i64::MAX, i64::MIN), |(lo, hi), t| (lo.min(t), hi.max(t)));
        let vs = series.iter().flat_map(|s| s.values());
        let (lo, hi) = vs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let pad = ((hi - lo) * 0.05).max(0.1);
        Self {
            t0,
            t1,
            y0: lo - pad,
            y1: hi + pad,
            left: MARGIN_LEFT,
            right: width - MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom: height - MARGIN_BOTTOM,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn x(&self, t: i64) -> f64 {
        let span = (self.t1 - self.t0).max(1) as f64;
        (self.right - self.left).mul_add((t - self.t0) as f64 / span, self.left)
    }

    fn y(&self, v: f64) -> f64 {
        let frac = (v - self.y0) / (self.y1 - self.y0);
        (self.bottom - self.top).mul_add(-frac, self.bottom)
    }

    fn points(&self, s: &NormalizedSeries) -> String {
        s.points
            .iter()
            .map(|p| format!("{:.2},{:.2}", self.x(p.ts.timestamp()), self.y(p.value)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[allow(clippy::cast_precision_loss)]
    fn grid(&self, doc: &mut String) {
        for i in 0..=GRID_LINES {
            let v = (self.y1 - self.y0).mul_add(i as f64 / GRID_LINES as f64, self.y0);
            let y = self.y(v);
            let _ = writeln!(
                doc,
                r##"<line x1="{l}" y1="{y:.2}" x2="{r}" y2="{y:.2}" stroke="#000" stroke-opacity="0.1"/>"##,
                l = self.left,
                r = self.right,
            );
            let _ = writeln!(
                doc,
                r#"<text x="{x}" y="{ty:.2}" font-size="11" text-anchor="end">{v:.2}</text>"#,
                x = self.left - 8.0,
                ty = y + 4.0,
            );
        }
    }

    fn axes(&self, doc: &mut String, a: &NormalizedSeries, b: &NormalizedSeries) {
        let _ = writeln!(
            doc,
            r##"<rect x="{l}" y="{t}" width="{w}" height="{h}" fill="none" stroke="#333"/>"##,
            l = self.left,
            t = self.top,
            w = self.right - self.left,
            h = self.bottom - self.top,
        );
        let first = a.points.first().into_iter().chain(b.points.first()).map(|p| p.ts).min();
        let last = a.points.last().into_iter().chain(b.points.last()).map(|p| p.ts).max();
        for (ts, anchor) in [(first, "start"), (last, "end")] {
            if let Some(ts) = ts {
                let _ = writeln!(
                    doc,
                    r#"<text x="{x:.2}" y="{y}" font-size="11" text-anchor="{anchor}">{d}</text>"#,
                    x = self.x(ts.timestamp()),
                    y = self.bottom + 18.0,
                    d = ts.format("%Y-%m-%d"),
                );
            }
        }
        let _ = writeln!(
            doc,
            r#"<text x="{x}" y="{y}" font-size="13" text-anchor="middle">Date</text>"#,
            x = f64::midpoint(self.left, self.right),
            y = self.bottom + 45.0,
        );
        let _ = writeln!(
            doc,
            r#"<text x="20" y="{y}" font-size="13" text-anchor="middle" transform="rotate(-90 20 {y})">Normalized Value</text>"#,
            y = f64::midpoint(self.top, self.bottom),
        );
    }
}

fn legend(doc: &mut String, right: f64, candidate_id: &str, reference_id: &str) {
    let x = right - 230.0;
    let _ = writeln!(
        doc,
        r##"<line x1="{x}" y1="{y}" x2="{x2}" y2="{y}" stroke="#1f77b4" stroke-width="2"/><text x="{tx}" y="{ty}" font-size="12">Candidate: {id}</text>"##,
        y = MARGIN_TOP + 18.0,
        x2 = x + 30.0,
        tx = x + 38.0,
        ty = MARGIN_TOP + 22.0,
        id = escape(candidate_id),
    );
    let _ = writeln!(
        doc,
        r##"<line x1="{x}" y1="{y}" x2="{x2}" y2="{y}" stroke="#ff7f0e" stroke-width="2" stroke-dasharray="8 5"/><text x="{tx}" y="{ty}" font-size="12">Reference: {id}</text>"##,
        y = MARGIN_TOP + 38.0,
        x2 = x + 30.0,
        tx = x + 38.0,
        ty = MARGIN_TOP + 42.0,
        id = escape(reference_id),
    );
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
