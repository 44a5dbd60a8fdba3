use std::sync::Arc;
use std::time::Duration;

use tsmatch::{MatchConfig, MatchError, Matcher, Variance};
use tsmatch_mock::MockSource;

#[test]
fn build_requires_a_source() {
    let err = Matcher::builder().build().err().expect("no sources");
    assert!(matches!(err, MatchError::InvalidArg(_)));
}

#[test]
fn build_rejects_zero_top_k() {
    let err = Matcher::builder()
        .with_source(Arc::new(MockSource::new()))
        .top_k(0)
        .build()
        .err()
        .expect("zero top_k");
    assert!(matches!(err, MatchError::InvalidArg(msg) if msg.contains("top_k")));
}

#[test]
fn build_rejects_zero_concurrency() {
    let err = Matcher::builder()
        .with_source(Arc::new(MockSource::new()))
        .max_concurrency(0)
        .build()
        .err()
        .expect("zero concurrency");
    assert!(matches!(err, MatchError::InvalidArg(msg) if msg.contains("max_concurrency")));
}

#[test]
fn modifiers_land_in_config() {
    let m = Matcher::builder()
        .with_source(Arc::new(MockSource::new()))
        .top_k(3)
        .variance(Variance::Sample)
        .fetch_timeout(Duration::from_millis(250))
        .request_timeout(Duration::from_secs(2))
        .max_concurrency(2)
        .persist_normalized(false)
        .build()
        .unwrap();
    let cfg = m.config();
    assert_eq!(cfg.top_k, 3);
    assert_eq!(cfg.variance, Variance::Sample);
    assert_eq!(cfg.fetch_timeout, Duration::from_millis(250));
    assert_eq!(cfg.request_timeout, Some(Duration::from_secs(2)));
    assert_eq!(cfg.max_concurrency, 2);
    assert!(!cfg.persist_normalized);
}

#[test]
fn config_replaces_defaults_wholesale() {
    let cfg = MatchConfig {
        top_k: 1,
        ..MatchConfig::default()
    };
    let m = Matcher::builder()
        .with_source(Arc::new(MockSource::new()))
        .config(cfg.clone())
        .build()
        .unwrap();
    assert_eq!(m.config(), &cfg);
}

#[test]
fn degenerate_reference_is_fatal() {
    let m = Matcher::builder()
        .with_source(Arc::new(MockSource::new()))
        .build()
        .unwrap();
    let flat = crate::helpers::series("reference", &[2.0, 2.0, 2.0]);
    assert_eq!(
        m.normalize_reference(&flat).unwrap_err(),
        MatchError::degenerate("reference")
    );
}
