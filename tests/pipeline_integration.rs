//! End-to-end pipeline scenarios.

use approx::assert_relative_eq;
use revcast::nowcast::CorrectionFit;
use revcast::prelude::*;
use revcast::rationality::TestKind;

fn months(start_year: i32, start_month: u32, n: usize) -> Vec<Month> {
    let start = Month::new(start_year, start_month).unwrap();
    (0..n as i32).map(|i| start.offset(i)).collect()
}

/// The deterministic fixture: every target period of 2020 gets releases
/// [1.0, 1.1, 1.2, 1.3]. Revisions are 0.1 at every step and errors are
/// 0.3 / 0.2 / 0.1 with no cross-period variation, so the bias test must
/// recover the constant exactly with a zero standard error.
fn constant_fixture() -> (ReleasePanel, BenchmarkPanel) {
    let periods = months(2020, 1, 12);
    let releases = ReleasePanel::new(
        periods.clone(),
        vec![vec![1.0; 12], vec![1.1; 12], vec![1.2; 12], vec![1.3; 12]],
    )
    .unwrap();
    let benchmark = BenchmarkPanel::new(periods, vec![vec![0.0; 12]; 4]).unwrap();
    (releases, benchmark)
}

#[test]
fn constant_panel_derivation_is_exact() {
    let (releases, _) = constant_fixture();
    let derived = derive(&releases, 4).unwrap();

    for t in 0..12 {
        for h in 2..=4 {
            assert_relative_eq!(
                derived.revision_series(h).unwrap()[t],
                0.1,
                epsilon = 1e-12
            );
        }
        assert_relative_eq!(derived.error_series(1).unwrap()[t], 0.3, epsilon = 1e-12);
        assert_relative_eq!(derived.error_series(2).unwrap()[t], 0.2, epsilon = 1e-12);
        assert_relative_eq!(derived.error_series(3).unwrap()[t], 0.1, epsilon = 1e-12);
    }
}

#[test]
fn constant_panel_bias_test_is_degenerate_but_exact() {
    let (releases, benchmark) = constant_fixture();
    let config = PipelineConfig::monthly(Month::new(2020, 8).unwrap()).with_final_horizon(4);

    let output = run_pipeline(&releases, &benchmark, &config).unwrap();

    let bias_h1 = output
        .battery
        .results
        .iter()
        .find(|r| r.horizon == 1 && r.kind == TestKind::Bias)
        .expect("bias test at horizon 1");
    assert_relative_eq!(
        bias_h1.fit.coefficient("const").unwrap(),
        0.3,
        epsilon = 1e-12
    );
    assert_relative_eq!(bias_h1.fit.std_errors()[0], 0.0, epsilon = 1e-12);
    assert_eq!(bias_h1.fit.nobs(), 12);
}

#[test]
fn constant_panel_produces_partial_results_not_failure() {
    let (releases, benchmark) = constant_fixture();
    let config = PipelineConfig::monthly(Month::new(2020, 8).unwrap()).with_final_horizon(4);

    let output = run_pipeline(&releases, &benchmark, &config).unwrap();

    // 12 observations < min_train_obs: every correction degrades to neutral
    for outcome in &output.horizons {
        assert!(matches!(outcome.fit, CorrectionFit::Neutral { .. }));
        // neutral correction + identical errors: evaluation is degenerate
        assert!(outcome.comparison.is_none());
        // below the floor, every λ is the neutral 0.5
        for &l in &outcome.combined.lambda {
            assert_relative_eq!(l, 0.5, epsilon = 1e-12);
        }
    }
    assert!(!output.skipped.is_empty());
}

/// A panel with genuine revision signal: later horizons move toward a final
/// value that over-states the first release by a persistent margin.
fn signal_fixture(n: usize) -> (ReleasePanel, BenchmarkPanel) {
    let periods = months(2010, 1, n);
    let y1: Vec<f64> = (0..n)
        .map(|i| 3.0 + 1.5 * (i as f64 * 0.37).sin() + 0.3 * (i as f64 * 0.11).cos())
        .collect();
    let y2: Vec<f64> = y1
        .iter()
        .enumerate()
        .map(|(i, &v)| v + 0.25 + 0.1 * (i as f64 * 0.53).sin())
        .collect();
    let y3: Vec<f64> = y2
        .iter()
        .enumerate()
        .map(|(i, &v)| v + 0.1 + 0.05 * (i as f64 * 0.89).cos())
        .collect();
    let y4: Vec<f64> = y3
        .iter()
        .enumerate()
        .map(|(i, &v)| v + 0.05 + 0.02 * (i as f64 * 1.31).sin())
        .collect();
    let releases = ReleasePanel::new(periods.clone(), vec![y1, y2, y3, y4]).unwrap();
    let indicator: Vec<f64> = (0..n).map(|i| if i % 24 == 0 { 1.0 } else { 0.0 }).collect();
    let benchmark = BenchmarkPanel::new(periods, vec![indicator; 4]).unwrap();
    (releases, benchmark)
}

#[test]
fn signal_panel_full_pipeline_runs_all_stages() {
    let (releases, benchmark) = signal_fixture(120);
    // 84 training months, 36 evaluation months
    let config = PipelineConfig::monthly(Month::new(2016, 12).unwrap())
        .with_final_horizon(4)
        .with_min_train_obs(24);

    let output = run_pipeline(&releases, &benchmark, &config).unwrap();

    assert_eq!(output.join_summary.dropped_periods, 0);

    // battery ran for horizons 1..3
    for horizon in 1..=3 {
        assert!(output
            .battery
            .results
            .iter()
            .any(|r| r.horizon == horizon && r.kind == TestKind::Bias));
    }

    // every horizon got a fitted (non-neutral) correction and an evaluation
    assert_eq!(output.horizons.len(), 3);
    for outcome in &output.horizons {
        assert!(matches!(outcome.fit, CorrectionFit::Fitted(_)));
        let comparison = outcome.comparison.expect("evaluation row");
        assert!(comparison.relative_rmse.is_finite());
        assert!(comparison.dm_stat.is_finite());
        assert_eq!(comparison.nobs, 36);
        for &l in &outcome.combined.lambda {
            assert!((0.0..=1.0).contains(&l));
        }
    }

    // the systematic under-statement is learnable: the corrected nowcast
    // should not be worse than the raw release at the first horizon
    let first = output.horizons[0].comparison.unwrap();
    assert!(first.relative_rmse < 110.0);
}

#[test]
fn excluded_window_propagates_to_all_stages() {
    let (releases, benchmark) = signal_fixture(120);
    let config = PipelineConfig::monthly(Month::new(2016, 12).unwrap())
        .with_final_horizon(4)
        .with_min_train_obs(24)
        .with_excluded_window(Month::new(2012, 3).unwrap(), Month::new(2012, 8).unwrap());

    let output = run_pipeline(&releases, &benchmark, &config).unwrap();

    // the nulled window shrinks every regression sample
    let bias_h1 = output
        .battery
        .results
        .iter()
        .find(|r| r.horizon == 1 && r.kind == TestKind::Bias)
        .unwrap();
    assert_eq!(bias_h1.fit.nobs(), 114);
}

#[test]
fn inner_join_shrinkage_is_counted() {
    let (releases, _) = signal_fixture(120);
    // benchmark covers only the last 100 periods
    let periods = months(2011, 9, 100);
    let indicator = vec![0.0; 100];
    let benchmark = BenchmarkPanel::new(periods, vec![indicator; 4]).unwrap();

    let config = PipelineConfig::monthly(Month::new(2016, 12).unwrap())
        .with_final_horizon(4)
        .with_min_train_obs(24);
    let output = run_pipeline(&releases, &benchmark, &config).unwrap();

    assert_eq!(output.join_summary.dropped_periods, 20);
    assert_eq!(output.join_summary.matched_periods, 100);
}

#[test]
fn csv_roundtrip_feeds_the_pipeline() {
    let mut release_csv = String::from("target_period,horizon,value\n");
    let mut benchmark_csv = String::from("target_period,horizon,value\n");
    let periods = months(2015, 1, 60);
    for (i, period) in periods.iter().enumerate() {
        for h in 1..=3 {
            let value = 2.0 + 0.4 * (i as f64 * 0.5).sin() + 0.1 * h as f64;
            release_csv.push_str(&format!("{period},{h},{value}\n"));
            benchmark_csv.push_str(&format!("{period},{h},0\n"));
        }
    }

    let releases = revcast::io::read_release_panel(release_csv.as_bytes()).unwrap();
    let benchmark = revcast::io::read_benchmark_panel(benchmark_csv.as_bytes()).unwrap();

    let config = PipelineConfig::monthly(Month::new(2018, 6).unwrap())
        .with_final_horizon(3)
        .with_min_train_obs(12);
    let output = run_pipeline(&releases, &benchmark, &config).unwrap();
    assert_eq!(output.horizons.len(), 2);
}
