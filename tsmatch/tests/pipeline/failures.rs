use tsmatch::{MatchError, Matcher, Observation, TimeSeries};
use tsmatch_mock::MockBehavior;

use crate::helpers::{REF, affine, dyn_source, reference, ret};

#[tokio::test]
async fn one_bad_candidate_does_not_abort() {
    let (src, _ctl) = dyn_source(
        "dyn",
        vec![
            ("X", ret("X", &affine(2.0, 1.0))),
            ("Y", ret("Y", &[4.0; 6])),
            ("Z", ret("Z", &[6.0, 5.0, 4.0, 3.0, 2.0, 1.0])),
        ],
    )
    .await;
    let m = Matcher::builder().with_source(src).build().unwrap();
    let out = m.run(&reference()).await.unwrap();

    let ranked: Vec<_> = out
        .ranking
        .entries
        .iter()
        .map(|e| e.candidate_id.as_str())
        .collect();
    assert_eq!(ranked, vec!["X", "Z"]);
    assert_eq!(out.failures.len(), 1);
    assert_eq!(out.failures[0].candidate_id, "Y");
    assert_eq!(out.failures[0].failure, Some(MatchError::degenerate("Y")));
    assert!(out.failures[0].score.is_none());
}

#[tokio::test]
async fn all_failed_reports_attempts() {
    let (src, _ctl) = dyn_source(
        "dyn",
        vec![
            ("flat", ret("flat", &[1.0; 6])),
            ("short", ret("short", &[1.0])),
            (
                "gone",
                MockBehavior::Fail(MatchError::not_found("table gone")),
            ),
        ],
    )
    .await;
    let m = Matcher::builder().with_source(src).build().unwrap();
    assert_eq!(
        m.run(&reference()).await.unwrap_err(),
        MatchError::NoValidCandidates { attempted: 3 }
    );
}

#[tokio::test]
async fn length_mismatch_is_local() {
    let mut longer = REF.to_vec();
    longer.push(7.0);
    let (src, _ctl) = dyn_source(
        "dyn",
        vec![("long", ret("long", &longer)), ("ok", ret("ok", REF))],
    )
    .await;
    let m = Matcher::builder().with_source(src).build().unwrap();
    let out = m.run(&reference()).await.unwrap();
    assert_eq!(out.report.entries.len(), 1);
    assert_eq!(
        out.failures[0].failure,
        Some(MatchError::LengthMismatch {
            reference: REF.len(),
            candidate: REF.len() + 1,
        })
    );
}

#[tokio::test]
async fn opaque_fetch_errors_are_tagged_with_source() {
    let (src, _ctl) = dyn_source(
        "warehouse",
        vec![
            ("ok", ret("ok", REF)),
            ("bad", MockBehavior::Fail(MatchError::Other("broken pipe".into()))),
        ],
    )
    .await;
    let m = Matcher::builder().with_source(src).build().unwrap();
    let out = m.run(&reference()).await.unwrap();
    assert!(matches!(
        &out.failures[0].failure,
        Some(MatchError::Store { store, .. }) if store == "warehouse"
    ));
}

#[tokio::test]
async fn top_k_truncates_report_not_ranking() {
    let rules = (0..8)
        .map(|i| {
            let id: &'static str = ["c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7"][i];
            let mut v = affine(1.0, 0.0);
            v[i % REF.len()] += f64::from(u32::try_from(i).unwrap()) * 0.5;
            (id, ret(id, &v))
        })
        .collect();
    let (src, _ctl) = dyn_source("dyn", rules).await;
    let m = Matcher::builder().with_source(src).top_k(3).build().unwrap();
    let out = m.run(&reference()).await.unwrap();

    assert_eq!(out.ranking.entries.len(), 8);
    assert_eq!(out.report.entries.len(), 3);
    for (i, entry) in out.report.entries.iter().enumerate() {
        assert_eq!(entry.rank, i + 1);
        assert_eq!(entry.candidate_id, out.ranking.entries[i].candidate_id);
        assert_eq!(Some(entry.score), out.ranking.entries[i].score);
    }
    assert_eq!(out.report.reference_id, "reference");
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let (src, _ctl) = dyn_source(
        "dyn",
        vec![
            ("b", ret("b", &affine(3.0, 1.0))),
            ("a", ret("a", &affine(2.0, -4.0))),
            ("c", ret("c", &[2.0, 1.0, 4.0, 3.0, 6.0, 5.0])),
        ],
    )
    .await;
    let m = Matcher::builder()
        .with_source(src)
        .max_concurrency(1)
        .build()
        .unwrap();
    let first = m.run(&reference()).await.unwrap();
    let ids: Vec<_> = first
        .report
        .entries
        .iter()
        .map(|e| e.candidate_id.clone())
        .collect();
    // a and b are both affine images of the reference
    let mut best = ids[..2].to_vec();
    best.sort();
    assert_eq!(best, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(ids[2], "c");
    for _ in 0..3 {
        assert_eq!(m.run(&reference()).await.unwrap().report, first.report);
    }
}

#[tokio::test]
async fn cadence_mismatch_is_a_warning_not_a_failure() {
    let start = chrono::DateTime::from_timestamp(1_673_049_600, 0).unwrap();
    let daily = TimeSeries::new(
        "daily",
        affine(3.0, 2.0)
            .into_iter()
            .zip(0i64..)
            .map(|(v, d)| Observation::new(start + chrono::Duration::days(d), v))
            .collect(),
    )
    .unwrap();
    let (src, _ctl) = dyn_source(
        "dyn",
        vec![
            ("daily", MockBehavior::Return(daily)),
            ("weekly", ret("weekly", REF)),
        ],
    )
    .await;
    let m = Matcher::builder().with_source(src).build().unwrap();
    let reference = m.normalize_reference(&reference()).unwrap();
    let out = m.evaluate(&reference).await.unwrap();

    assert_eq!(out.results.len(), 2);
    assert!(out.results.iter().all(|r| r.is_scored()));
    assert_eq!(
        out.warnings,
        vec![MatchError::CadenceMismatch {
            candidate: "daily".into(),
            reference_step_secs: 7 * 86_400,
            candidate_step_secs: 86_400,
        }]
    );
}
