use tsmatch::{Enumeration, MatchError, Matcher};
use tsmatch_mock::MockBehavior;

use crate::helpers::{REF, affine, dyn_source, reference, ret};

#[tokio::test]
async fn duplicate_ids_keep_first_source() {
    let (first, first_ctl) = dyn_source("first", vec![("dup", ret("dup", &affine(2.0, 0.0)))]).await;
    let (second, second_ctl) = dyn_source(
        "second",
        vec![("dup", ret("dup", &[1.0; 6])), ("other", ret("other", REF))],
    )
    .await;
    let m = Matcher::builder()
        .with_source(first)
        .with_source(second)
        .build()
        .unwrap();
    let out = m.run(&reference()).await.unwrap();

    assert_eq!(out.ranking.entries.len(), 2);
    assert!(out.failures.is_empty());
    assert_eq!(first_ctl.fetch_log().await, vec!["dup"]);
    assert_eq!(second_ctl.fetch_log().await, vec!["other"]);
    assert!(matches!(
        out.warnings.as_slice(),
        [MatchError::Validation { origin, msg }] if origin == "dup" && msg.contains("first")
    ));
}

#[tokio::test]
async fn skipped_tables_become_warnings() {
    let (src, ctl) = dyn_source("dyn", vec![("ok", ret("ok", REF))]).await;
    ctl.set_listing(MockBehavior::Return(Enumeration {
        candidates: vec!["ok".into()],
        skipped: vec![MatchError::validation("no_value", "missing column 'Value'")],
    }))
    .await;
    let m = Matcher::builder().with_source(src).build().unwrap();
    let out = m.run(&reference()).await.unwrap();
    assert_eq!(out.report.entries.len(), 1);
    assert_eq!(
        out.warnings,
        vec![MatchError::validation("no_value", "missing column 'Value'")]
    );
}

#[tokio::test]
async fn one_failing_source_is_a_warning() {
    let (good, _g) = dyn_source("good", vec![("ok", ret("ok", REF))]).await;
    let (bad, bad_ctl) = dyn_source("bad", vec![]).await;
    bad_ctl
        .set_listing(MockBehavior::Fail(MatchError::store("bad", "connection refused")))
        .await;
    let m = Matcher::builder()
        .with_source(good)
        .with_source(bad)
        .build()
        .unwrap();
    let out = m.run(&reference()).await.unwrap();
    assert_eq!(out.report.entries.len(), 1);
    assert_eq!(
        out.warnings,
        vec![MatchError::store("bad", "connection refused")]
    );
}

#[tokio::test]
async fn every_source_failing_aborts() {
    let (a, a_ctl) = dyn_source("a", vec![]).await;
    let (b, b_ctl) = dyn_source("b", vec![]).await;
    a_ctl
        .set_listing(MockBehavior::Fail(MatchError::store("a", "down")))
        .await;
    b_ctl
        .set_listing(MockBehavior::Fail(MatchError::Other("tls".into())))
        .await;
    let m = Matcher::builder().with_source(a).with_source(b).build().unwrap();
    let err = m.run(&reference()).await.unwrap_err();
    assert_eq!(
        err.flatten(),
        vec![
            MatchError::store("a", "down"),
            MatchError::store("b", "unknown error: tls"),
        ]
    );
}

#[tokio::test]
async fn empty_listing_has_nothing_to_rank() {
    let (src, _ctl) = dyn_source("empty", vec![]).await;
    let m = Matcher::builder().with_source(src).build().unwrap();
    assert_eq!(
        m.run(&reference()).await.unwrap_err(),
        MatchError::NoValidCandidates { attempted: 0 }
    );
}
