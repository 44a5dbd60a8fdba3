// Re-export helpers so tests can `use helpers::*;`
pub mod recording;

pub use recording::{RecordingRenderer, RecordingSink};

use std::sync::Arc;

use tsmatch::{CandidateSource, TimeSeries};
use tsmatch_mock::{DynamicMockController, DynamicMockSource, MockBehavior, weekly};

/// Reference values shared by most orchestrator tests.
pub const REF: &[f64] = &[1.0, 3.0, 2.0, 5.0, 4.0, 6.0];

/// Build a weekly series without unwrap noise in tests.
pub fn series(id: &str, values: &[f64]) -> TimeSeries {
    weekly(id, values).expect("finite fixture values")
}

/// Reference series built from [`REF`].
pub fn reference() -> TimeSeries {
    series("reference", REF)
}

/// `a * REF + b`, which scores 1.0 for positive `a`.
pub fn affine(a: f64, b: f64) -> Vec<f64> {
    REF.iter().map(|x| a.mul_add(*x, b)).collect()
}

/// Dynamic source pre-loaded with `(id, behavior)` rules.
pub async fn dyn_source(
    name: &'static str,
    rules: Vec<(&str, MockBehavior<TimeSeries>)>,
) -> (Arc<dyn CandidateSource>, DynamicMockController) {
    let (src, controller) = DynamicMockSource::new_with_controller(name);
    for (id, behavior) in rules {
        controller.set_candidate(id, behavior).await;
    }
    (src, controller)
}

/// Shorthand for a candidate that returns `values`.
pub fn ret(id: &str, values: &[f64]) -> MockBehavior<TimeSeries> {
    MockBehavior::Return(series(id, values))
}
