//! Property-based tests for the derivation, smoothing, and combination
//! invariants, plus the simulated bias-test sanity check.

use proptest::prelude::*;
use revcast::core::{is_missing, Month, ReleasePanel};
use revcast::derive::{derive, smooth_series, SmoothingRule};
use revcast::nowcast::{combine, CorrectedSeries, TrainEvalSplit};
use revcast::regress::{fit_hac, DesignBuilder};

fn months(n: usize) -> Vec<Month> {
    let start = Month::new(2012, 1).unwrap();
    (0..n as i32).map(|i| start.offset(i)).collect()
}

/// Strategy: a complete release matrix of `h` horizons over `n` periods.
fn release_matrix(h: usize, n: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-10.0..10.0f64, n), h)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// e_h equals the telescoping sum of later revisions, exactly.
    #[test]
    fn telescoping_identity(columns in release_matrix(5, 8)) {
        let panel = ReleasePanel::new(months(8), columns).unwrap();
        let derived = derive(&panel, 5).unwrap();

        for t in 0..8 {
            for h in 1..5 {
                let error = derived.error_series(h).unwrap()[t];
                let sum: f64 = (h + 1..=5)
                    .map(|k| derived.revision_series(k).unwrap()[t])
                    .sum();
                prop_assert!((error - sum).abs() < 1e-9,
                    "telescoping failed at t={t} h={h}: {error} vs {sum}");
            }
        }
    }

    /// Nulling one release cell kills exactly the derived cells that
    /// reference it, and no others.
    #[test]
    fn missingness_propagation(
        columns in release_matrix(4, 6),
        t in 0usize..6,
        hole in 1usize..=4,
    ) {
        let mut columns = columns;
        columns[hole - 1][t] = f64::NAN;
        let panel = ReleasePanel::new(months(6), columns).unwrap();
        let derived = derive(&panel, 4).unwrap();

        // revisions referencing the hole are missing
        if hole >= 2 {
            prop_assert!(is_missing(derived.revision_series(hole).unwrap()[t]));
        }
        if hole < 4 {
            prop_assert!(is_missing(derived.revision_series(hole + 1).unwrap()[t]));
        }
        // errors referencing the hole are missing
        if hole < 4 {
            prop_assert!(is_missing(derived.error_series(hole).unwrap()[t]));
        } else {
            // the final release is the hole: every error at t dies
            for h in 1..4 {
                prop_assert!(is_missing(derived.error_series(h).unwrap()[t]));
            }
        }
        // errors at other horizons below final stay defined
        if hole < 4 {
            for h in (1..4).filter(|&h| h != hole) {
                prop_assert!(!is_missing(derived.error_series(h).unwrap()[t]),
                    "e_{h} should survive a hole at horizon {hole}");
            }
        }
    }

    /// A missing observation carries the smoothed state forward unchanged.
    #[test]
    fn smoothing_carries_forward_on_missing(
        values in prop::collection::vec(
            prop_oneof![3 => -5.0..5.0f64, 1 => Just(f64::NAN)], 2..40),
        decay in 0.05..0.95f64,
    ) {
        let smoothed = smooth_series(&values, decay, SmoothingRule::Accumulate);
        prop_assert_eq!(smoothed.len(), values.len());
        for t in 1..values.len() {
            if values[t].is_nan() && !smoothed[t - 1].is_nan() {
                prop_assert_eq!(smoothed[t], smoothed[t - 1]);
            }
        }
    }

    /// Every combination weight is inside [0, 1], whatever the data.
    #[test]
    fn lambda_always_clipped(
        actual in prop::collection::vec(-3.0..3.0f64, 40),
        predicted in prop::collection::vec(-3.0..3.0f64, 40),
        floor in 1usize..20,
    ) {
        let raw: Vec<f64> = (0..40).map(|i| 1.0 + i as f64 * 0.01).collect();
        let series = CorrectedSeries {
            horizon: 1,
            periods: months(40),
            corrected: raw.iter().zip(&predicted).map(|(&y, &p)| y + p).collect(),
            raw,
            actual_error: actual,
            predicted_error: predicted,
        };
        let split = TrainEvalSplit::new(Month::new(2013, 8).unwrap()); // 20 train rows
        let result = combine(&series, &split, floor).unwrap();

        for &l in &result.lambda {
            prop_assert!((0.0..=1.0).contains(&l), "λ = {l} escaped [0, 1]");
        }
    }

    /// No look-ahead: changing data at or after an evaluation date never
    /// changes the weight estimated for that date.
    #[test]
    fn lambda_ignores_the_future(
        actual in prop::collection::vec(0.1..2.0f64, 40),
        predicted in prop::collection::vec(0.1..2.0f64, 40),
        tamper_offset in 0usize..15,
    ) {
        let raw: Vec<f64> = (0..40).map(|i| 1.0 + i as f64 * 0.01).collect();
        let make = |actual: &[f64], predicted: &[f64]| CorrectedSeries {
            horizon: 1,
            periods: months(40),
            corrected: raw.iter().zip(predicted).map(|(&y, &p)| y + p).collect(),
            raw: raw.clone(),
            actual_error: actual.to_vec(),
            predicted_error: predicted.to_vec(),
        };
        let split = TrainEvalSplit::new(Month::new(2013, 8).unwrap()); // 20 train rows
        let baseline = combine(&make(&actual, &predicted), &split, 5).unwrap();

        // tamper with everything from one evaluation date onward
        let tamper_at = 20 + tamper_offset;
        let mut tampered_actual = actual.clone();
        let mut tampered_predicted = predicted.clone();
        for t in tamper_at..40 {
            tampered_actual[t] = 99.0;
            tampered_predicted[t] = -42.0;
        }
        let tampered = combine(&make(&tampered_actual, &tampered_predicted), &split, 5).unwrap();

        // weights up to and including the tamper date are untouched
        for (i, (&l0, &l1)) in baseline.lambda.iter().zip(&tampered.lambda).enumerate() {
            if 20 + i <= tamper_at {
                prop_assert_eq!(l0, l1, "λ at eval index {} saw the future", i);
            }
        }
    }
}

/// λ clipping at the exact boundaries: data engineered to give raw
/// regression coefficients of −0.3 and 1.7 must come back as 0 and 1.
#[test]
fn lambda_clipping_boundary_values() {
    let n = 30;
    let raw: Vec<f64> = (0..n).map(|i| 1.0 + i as f64 * 0.01).collect();
    let predicted: Vec<f64> = (0..n).map(|i| 1.0 + ((i * 7) % 5) as f64 * 0.1).collect();

    for (slope, expected) in [(-0.3f64, 0.0f64), (1.7, 1.0)] {
        let actual: Vec<f64> = predicted.iter().map(|&p| slope * p).collect();
        let series = CorrectedSeries {
            horizon: 1,
            periods: months(n),
            corrected: raw.iter().zip(&predicted).map(|(&y, &p)| y + p).collect(),
            raw: raw.clone(),
            actual_error: actual,
            predicted_error: predicted.clone(),
        };
        let split = TrainEvalSplit::new(Month::new(2013, 8).unwrap());
        let result = combine(&series, &split, 5).unwrap();
        for &l in &result.lambda {
            assert_eq!(l, expected, "slope {slope} should clip to {expected}");
        }
    }
}

/// Simulated zero-mean errors: the bias test should fail to reject the null
/// in roughly nine out of ten runs at the 10% level. This is a statistical
/// sanity check with Monte Carlo slack, not an exact assertion.
#[test]
fn bias_test_size_under_the_null() {
    use rand::distributions::Distribution;
    use rand::prelude::*;
    use statrs::distribution::Normal;

    let mut rng = StdRng::seed_from_u64(170_681);
    let normal = Normal::new(0.0, 0.5).unwrap();
    let n = 120;
    let reps = 300;
    let critical = 1.658; // t(0.95, df ≈ 119)

    let mut non_rejections = 0usize;
    for _ in 0..reps {
        let errors: Vec<f64> = (0..n).map(|_| normal.sample(&mut rng)).collect();
        let design = DesignBuilder::new("e", &errors).build().unwrap();
        let fit = fit_hac(&design, 6).unwrap();
        if fit.t_stats()[0].abs() <= critical {
            non_rejections += 1;
        }
    }

    let share = non_rejections as f64 / reps as f64;
    assert!(
        share >= 0.85,
        "bias test rejected a true null too often: non-rejection share {share}"
    );
}
