use chrono::DateTime;
use proptest::prelude::*;
use tsmatch_core::{MatchError, Observation, TimeSeries, Variance, normalize};

fn series(values: &[f64]) -> TimeSeries {
    let points = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            Observation::new(
                DateTime::from_timestamp(i64::try_from(i).unwrap() * 86_400, 0).unwrap(),
                *v,
            )
        })
        .collect();
    TimeSeries::new("s", points).unwrap()
}

fn arb_values() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(-1.0e6f64..1.0e6, 2..200)
        .prop_filter("needs two distinct values", |v| v.iter().any(|x| *x != v[0]))
}

proptest! {
    #[test]
    fn population_output_has_zero_mean_unit_std(values in arb_values()) {
        let z = normalize(&series(&values), Variance::Population).unwrap();
        let n = z.len() as f64;
        let mean = z.values().sum::<f64>() / n;
        let var = z.values().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        prop_assert!(mean.abs() < 1e-9, "mean = {mean}");
        prop_assert!((var.sqrt() - 1.0).abs() < 1e-9, "std = {}", var.sqrt());
    }

    #[test]
    fn sample_output_has_unit_sample_std(values in arb_values()) {
        let z = normalize(&series(&values), Variance::Sample).unwrap();
        let n = z.len() as f64;
        let var = z.values().map(|v| v * v).sum::<f64>() / (n - 1.0);
        prop_assert!((var.sqrt() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn timestamps_are_preserved(values in arb_values()) {
        let s = series(&values);
        let z = normalize(&s, Variance::Population).unwrap();
        prop_assert_eq!(z.len(), s.len());
        for (a, b) in z.points.iter().zip(s.points()) {
            prop_assert_eq!(a.ts, b.ts);
        }
    }

    #[test]
    fn affine_rescaling_is_invisible(values in arb_values(), scale in 0.001f64..1000.0, shift in -1.0e3f64..1.0e3) {
        let a = normalize(&series(&values), Variance::Population).unwrap();
        let moved: Vec<f64> = values.iter().map(|v| v * scale + shift).collect();
        let b = normalize(&series(&moved), Variance::Population).unwrap();
        for (x, y) in a.values().zip(b.values()) {
            prop_assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn constant_series_always_degenerate(value in -1.0e6f64..1.0e6, n in 2usize..50) {
        let err = normalize(&series(&vec![value; n]), Variance::Population).unwrap_err();
        prop_assert!(
            matches!(err, MatchError::DegenerateSeries { .. }),
            "expected DegenerateSeries, got {:?}",
            err
        );
    }
}

#[test]
fn fewer_than_two_values_is_insufficient() {
    assert_eq!(
        normalize(&series(&[]), Variance::Population).unwrap_err(),
        MatchError::insufficient("s", 0)
    );
    assert_eq!(
        normalize(&series(&[42.0]), Variance::Sample).unwrap_err(),
        MatchError::insufficient("s", 1)
    );
}
