use std::sync::Arc;

use tsmatch::{MatchError, Matcher, SeriesRole};

use crate::helpers::{REF, RecordingRenderer, RecordingSink, affine, dyn_source, reference, ret};

async fn three_candidates() -> Arc<dyn tsmatch::CandidateSource> {
    let (src, _ctl) = dyn_source(
        "dyn",
        vec![
            ("alpha", ret("alpha", &affine(2.0, 1.0))),
            ("beta", ret("beta", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
            ("gamma", ret("gamma", &[6.0, 5.0, 4.0, 3.0, 2.0, 1.0])),
        ],
    )
    .await;
    src
}

#[tokio::test]
async fn sink_receives_reference_candidates_and_ranking() {
    let sink = Arc::new(RecordingSink::default());
    let m = Matcher::builder()
        .with_source(three_candidates().await)
        .sink(sink.clone())
        .build()
        .unwrap();
    let out = m.run(&reference()).await.unwrap();
    assert!(out.warnings.is_empty());

    let written = sink.normalized.lock().unwrap().clone();
    assert_eq!(written[0], ("reference".to_string(), SeriesRole::Reference));
    let mut candidates: Vec<_> = written[1..]
        .iter()
        .map(|(id, role)| {
            assert_eq!(*role, SeriesRole::Candidate);
            id.clone()
        })
        .collect();
    candidates.sort();
    assert_eq!(candidates, vec!["alpha", "beta", "gamma"]);

    let rankings = sink.rankings.lock().unwrap().clone();
    assert_eq!(rankings.len(), 1);
    let ids: Vec<_> = rankings[0].iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "beta", "gamma"]);
}

#[tokio::test]
async fn persist_normalized_off_skips_candidates() {
    let sink = Arc::new(RecordingSink::default());
    let m = Matcher::builder()
        .with_source(three_candidates().await)
        .sink(sink.clone())
        .persist_normalized(false)
        .build()
        .unwrap();
    m.run(&reference()).await.unwrap();
    let written = sink.normalized.lock().unwrap().clone();
    assert_eq!(written, vec![("reference".to_string(), SeriesRole::Reference)]);
    assert_eq!(sink.rankings.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn persistence_failures_do_not_change_ranking() {
    let baseline = Matcher::builder()
        .with_source(three_candidates().await)
        .build()
        .unwrap()
        .run(&reference())
        .await
        .unwrap();

    let sink = Arc::new(RecordingSink {
        fail_ranking: true,
        ..RecordingSink::failing_on("beta")
    });
    let m = Matcher::builder()
        .with_source(three_candidates().await)
        .sink(sink)
        .build()
        .unwrap();
    let out = m.run(&reference()).await.unwrap();

    assert_eq!(out.ranking, baseline.ranking);
    assert_eq!(out.report, baseline.report);
    assert_eq!(
        out.warnings,
        vec![
            MatchError::io("beta_normalized.csv", "disk full"),
            MatchError::io("similarity_results.csv", "read-only"),
        ]
    );
}

#[tokio::test]
async fn one_render_failure_does_not_block_others() {
    let renderer = Arc::new(RecordingRenderer {
        fail_candidate: Some("alpha".into()),
        ..RecordingRenderer::default()
    });
    let m = Matcher::builder()
        .with_source(three_candidates().await)
        .renderer(renderer.clone())
        .top_k(2)
        .build()
        .unwrap();
    let out = m.run(&reference()).await.unwrap();

    assert_eq!(out.report.entries.len(), 2);
    assert_eq!(
        renderer.rendered.lock().unwrap().clone(),
        vec![(2, "beta".to_string())]
    );
    assert_eq!(
        out.warnings,
        vec![MatchError::render("alpha", "no font available")]
    );
}

#[tokio::test]
async fn normalized_but_unscored_candidates_are_still_persisted() {
    let mut longer = REF.to_vec();
    longer.push(7.0);
    let (src, _ctl) = dyn_source(
        "dyn",
        vec![("ok", ret("ok", REF)), ("longer", ret("longer", &longer))],
    )
    .await;
    let sink = Arc::new(RecordingSink::default());
    let m = Matcher::builder()
        .with_source(src)
        .sink(sink.clone())
        .build()
        .unwrap();
    let out = m.run(&reference()).await.unwrap();

    assert_eq!(out.failures.len(), 1);
    assert_eq!(out.failures[0].candidate_id, "longer");
    assert!(out.failures[0].normalized.is_some());
    let ranked: Vec<_> = out.ranking.entries.iter().map(|e| e.candidate_id.as_str()).collect();
    assert_eq!(ranked, vec!["ok"]);

    let mut candidates: Vec<_> = sink
        .normalized
        .lock()
        .unwrap()
        .iter()
        .filter(|(_, role)| *role == SeriesRole::Candidate)
        .map(|(id, _)| id.clone())
        .collect();
    candidates.sort();
    assert_eq!(candidates, vec!["longer", "ok"]);
}
