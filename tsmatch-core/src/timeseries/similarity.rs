use tsmatch_types::{MatchError, NormalizedSeries};

/// Cosine similarity of two normalized series, compared positionally.
///
/// Inputs are mean-zero, so this equals the Pearson correlation of the
/// original series. The result is clamped to `[-1, 1]`.
///
/// # Errors
/// - `LengthMismatch` if the series differ in length (`a` is treated as the
///   reference side in the error).
/// - `DegenerateSeries` if either vector has zero norm.
pub fn score(a: &NormalizedSeries, b: &NormalizedSeries) -> Result<f64, MatchError> {
    if a.len() != b.len() {
        return Err(MatchError::LengthMismatch {
            reference: a.len(),
            candidate: b.len(),
        });
    }
    cosine(a.values(), b.values()).ok_or_else(|| {
        let flat = if a.values().all(|v| v == 0.0) { a } else { b };
        MatchError::degenerate(flat.source_id.clone())
    })
}

/// Raw cosine similarity of two equal-length value streams.
///
/// Returns `None` when either vector has zero norm. Iteration stops at the
/// shorter stream; callers check lengths first.
pub fn cosine<A, B>(a: A, b: B) -> Option<f64>
where
    A: IntoIterator<Item = f64>,
    B: IntoIterator<Item = f64>,
{
    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.into_iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    let denom = na.sqrt() * nb.sqrt();
    if denom > 0.0 && denom.is_finite() {
        Some((dot / denom).clamp(-1.0, 1.0))
    } else {
        None
    }
}
