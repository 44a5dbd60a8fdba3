//! Fan-out helpers shared by the pipeline stages.

use std::time::Duration;

use tsmatch_core::MatchError;

/// Join a collection of tasks and apply an optional request-level deadline.
///
/// On timeout returns `MatchError::RequestTimeout` labelled with `stage`.
///
/// # Errors
/// `RequestTimeout` when `deadline` elapses before every task completes.
pub async fn join_with_deadline<I, F, T>(
    tasks: I,
    deadline: Option<Duration>,
    stage: &str,
) -> Result<Vec<T>, MatchError>
where
    I: IntoIterator<Item = F>,
    F: core::future::Future<Output = T>,
{
    let all = futures::future::join_all(tasks);
    match deadline {
        Some(d) => tokio::time::timeout(d, all)
            .await
            .map_err(|_| MatchError::request_timeout(stage)),
        None => Ok(all.await),
    }
}

/// Collapse the enumeration errors of every source into one outcome.
///
/// Rules:
/// - No errors → `InvalidArg` (nothing was attempted).
/// - A single error → that error unchanged.
/// - All errors are timeouts → `RequestTimeout("enumerate")`.
/// - All errors are `NotFound` → `NotFound("candidates")`.
/// - Else → `AllSourcesFailed(errors)`.
#[must_use]
pub fn collapse_enumeration_errors(mut errors: Vec<MatchError>) -> MatchError {
    if errors.is_empty() {
        return MatchError::InvalidArg("no sources attempted enumeration".into());
    }
    if errors.len() == 1 {
        return errors.remove(0);
    }
    if errors.iter().all(|e| {
        matches!(
            e,
            MatchError::FetchTimeout { .. } | MatchError::RequestTimeout { .. }
        )
    }) {
        return MatchError::request_timeout("enumerate");
    }
    if errors
        .iter()
        .all(|e| matches!(e, MatchError::NotFound { .. }))
    {
        return MatchError::not_found("candidates");
    }
    MatchError::AllSourcesFailed(errors)
}
