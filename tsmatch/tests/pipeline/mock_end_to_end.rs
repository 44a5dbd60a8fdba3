use std::sync::Arc;
use std::time::Duration;

use tsmatch::{MatchError, Matcher};
use tsmatch_mock::{MISSING_COLUMNS, MockSource};

#[tokio::test(start_paused = true)]
async fn fixtures_rank_as_expected() {
    let m = Matcher::builder()
        .with_source(Arc::new(MockSource::new()))
        .fetch_timeout(Duration::from_millis(50))
        .top_k(3)
        .build()
        .unwrap();
    let reference = MockSource::reference().unwrap();
    let out = m.run(&reference).await.unwrap();

    let top = &out.report.entries[0];
    assert_eq!(top.candidate_id, "site_alpha");
    assert!((top.score - 1.0).abs() < 1e-9);
    assert_eq!(top.reference.len(), reference.len());

    let last = out.ranking.entries.last().unwrap();
    assert_eq!(last.candidate_id, "site_charlie");
    assert!((last.score.unwrap() + 1.0).abs() < 1e-9);

    let mut failed: Vec<_> = out
        .failures
        .iter()
        .map(|f| f.candidate_id.as_str())
        .collect();
    failed.sort_unstable();
    assert_eq!(failed, vec!["FAIL", "TIMEOUT", "flat_sensor", "short_series"]);

    assert!(out.failures.iter().any(|f| {
        f.failure == Some(MatchError::fetch_timeout("tsmatch-mock", "TIMEOUT"))
    }));
    assert!(out.warnings.iter().any(|w| {
        matches!(w, MatchError::Validation { origin, .. } if origin == MISSING_COLUMNS)
    }));
}

#[tokio::test(start_paused = true)]
async fn slow_fixture_scores_with_generous_timeout() {
    let m = Matcher::builder()
        .with_source(Arc::new(MockSource::new()))
        .build()
        .unwrap();
    let out = m.run(&MockSource::reference().unwrap()).await.unwrap();
    let perfect: Vec<_> = out
        .ranking
        .entries
        .iter()
        .filter(|e| (e.score.unwrap() - 1.0).abs() < 1e-9)
        .map(|e| e.candidate_id.as_str())
        .collect();
    assert_eq!(perfect.len(), 2);
    assert!(perfect.contains(&"TIMEOUT"));
    assert!(perfect.contains(&"site_alpha"));
}
