use std::time::Duration;

use tsmatch::{MatchError, Matcher};
use tsmatch_mock::MockBehavior;

use crate::helpers::{REF, affine, dyn_source, reference, ret};

#[tokio::test(start_paused = true)]
async fn slow_fetch_fails_only_that_candidate() {
    let (src, _ctl) = dyn_source(
        "dyn",
        vec![
            ("fast", ret("fast", REF)),
            ("stuck", MockBehavior::Hang),
            ("quick", ret("quick", &affine(0.5, 2.0))),
        ],
    )
    .await;
    let m = Matcher::builder()
        .with_source(src)
        .fetch_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let out = m.run(&reference()).await.unwrap();

    assert_eq!(out.ranking.entries.len(), 2);
    assert_eq!(out.failures.len(), 1);
    assert_eq!(
        out.failures[0].failure,
        Some(MatchError::fetch_timeout("dyn", "stuck"))
    );
    assert!(out.warnings.is_empty());
}

#[tokio::test(start_paused = true)]
async fn deadline_keeps_finished_candidates() {
    let (src, _ctl) = dyn_source(
        "dyn",
        vec![
            ("done", ret("done", REF)),
            ("hung_a", MockBehavior::Hang),
            ("hung_b", MockBehavior::Hang),
        ],
    )
    .await;
    let m = Matcher::builder()
        .with_source(src)
        .fetch_timeout(Duration::from_secs(60))
        .request_timeout(Duration::from_secs(1))
        .build()
        .unwrap();
    let out = m.run(&reference()).await.unwrap();

    assert_eq!(out.report.entries.len(), 1);
    assert_eq!(out.report.entries[0].candidate_id, "done");
    let mut unfinished: Vec<_> = out
        .failures
        .iter()
        .map(|f| {
            assert_eq!(f.failure, Some(MatchError::request_timeout("evaluate")));
            f.candidate_id.as_str()
        })
        .collect();
    unfinished.sort_unstable();
    assert_eq!(unfinished, vec!["hung_a", "hung_b"]);
    assert_eq!(out.warnings, vec![MatchError::request_timeout("evaluate")]);
}

#[tokio::test(start_paused = true)]
async fn deadline_during_enumeration_aborts() {
    let (src, ctl) = dyn_source("dyn", vec![]).await;
    ctl.set_listing(MockBehavior::Hang).await;
    let m = Matcher::builder()
        .with_source(src)
        .request_timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    assert_eq!(
        m.run(&reference()).await.unwrap_err(),
        MatchError::request_timeout("enumerate")
    );
}

#[tokio::test(start_paused = true)]
async fn concurrency_limit_still_evaluates_everything() {
    let rules: Vec<_> = ["a", "b", "c", "d", "e"]
        .into_iter()
        .map(|id| (id, ret(id, REF)))
        .collect();
    let (src, ctl) = dyn_source("dyn", rules).await;
    let m = Matcher::builder()
        .with_source(src)
        .max_concurrency(2)
        .build()
        .unwrap();
    let out = m.run(&reference()).await.unwrap();
    assert_eq!(out.ranking.entries.len(), 5);
    assert_eq!(ctl.fetch_log().await.len(), 5);
}
