//! The per-horizon rationality test battery.
//!
//! For every horizon with enough valid observations, runs in order: bias,
//! Mincer-Zarnowitz, encompassing, augmented MZ, omnibus (adds the
//! one-period-lagged same-horizon revision), and the benchmark-augmented
//! omnibus (adds the indicator and its interactions). All regressions use
//! Newey-West standard errors at the configured lag truncation. Horizons or
//! specifications below the observation floor are skipped and recorded, not
//! raised. Specifications whose defining regressor does not exist at a
//! horizon (there is no revision at horizon 1) are omitted for that horizon.

use crate::config::PipelineConfig;
use crate::core::is_missing;
use crate::derive::AlignedPanel;
use crate::error::{Result, RevcastError};
use crate::regress::{fit_hac, DesignBuilder, FittedRegression, WaldTest};
use rayon::prelude::*;
use std::fmt;

/// Which specification of the battery a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestKind {
    /// `e` on a constant; the t-statistic on the constant tests
    /// unbiasedness.
    Bias,
    /// `e` on the release; the joint null (const = 0, slope = 0) is the
    /// rationality hypothesis.
    MincerZarnowitz,
    /// `e` on the latest revision; tests whether revisions carry
    /// exploitable error information.
    Encompassing,
    /// `e` on release and revision jointly.
    AugmentedMz,
    /// Augmented MZ plus the one-period-lagged same-horizon revision.
    Omnibus,
    /// Omnibus plus the benchmark indicator and its interactions.
    BenchmarkOmnibus,
}

impl TestKind {
    pub const ALL: [TestKind; 6] = [
        TestKind::Bias,
        TestKind::MincerZarnowitz,
        TestKind::Encompassing,
        TestKind::AugmentedMz,
        TestKind::Omnibus,
        TestKind::BenchmarkOmnibus,
    ];
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestKind::Bias => "bias",
            TestKind::MincerZarnowitz => "mincer_zarnowitz",
            TestKind::Encompassing => "encompassing",
            TestKind::AugmentedMz => "augmented_mz",
            TestKind::Omnibus => "omnibus",
            TestKind::BenchmarkOmnibus => "benchmark_omnibus",
        };
        f.write_str(name)
    }
}

/// One fitted specification at one horizon.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub horizon: usize,
    pub kind: TestKind,
    pub fit: FittedRegression,
    /// Joint Wald test where the specification defines one; `None` when the
    /// HAC covariance was too degenerate to invert (logged).
    pub joint: Option<WaldTest>,
}

/// A unit of work that was skipped or failed, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedUnit {
    pub horizon: usize,
    pub kind: Option<TestKind>,
    pub reason: String,
}

/// Battery output: fitted specifications plus the skip/failure ledger.
#[derive(Debug, Clone, Default)]
pub struct BatteryReport {
    pub results: Vec<TestResult>,
    pub skipped: Vec<SkippedUnit>,
}

impl BatteryReport {
    /// Results for one horizon, in specification order.
    pub fn horizon_results(&self, horizon: usize) -> Vec<&TestResult> {
        self.results
            .iter()
            .filter(|r| r.horizon == horizon)
            .collect()
    }
}

/// Run the battery over every pre-final horizon of the aligned panel.
///
/// Horizons are independent and run on the rayon pool; each horizon writes
/// only its own output slot.
pub fn run_battery(panel: &AlignedPanel, config: &PipelineConfig) -> Result<BatteryReport> {
    config.validate()?;
    let last = panel.final_horizon().saturating_sub(1);
    if last == 0 {
        return Err(RevcastError::InvalidParameter(
            "no pre-final horizons to test".to_string(),
        ));
    }

    let per_horizon: Vec<(Vec<TestResult>, Vec<SkippedUnit>)> = (1..=last)
        .into_par_iter()
        .map(|horizon| run_horizon(panel, config, horizon))
        .collect::<Result<_>>()?;

    let mut report = BatteryReport::default();
    for (results, skipped) in per_horizon {
        report.results.extend(results);
        report.skipped.extend(skipped);
    }
    for skip in &report.skipped {
        match skip.kind {
            Some(kind) => log::warn!(
                "skipped {kind} at horizon {}: {}",
                skip.horizon,
                skip.reason
            ),
            None => log::warn!("skipped horizon {}: {}", skip.horizon, skip.reason),
        }
    }
    Ok(report)
}

fn run_horizon(
    panel: &AlignedPanel,
    config: &PipelineConfig,
    horizon: usize,
) -> Result<(Vec<TestResult>, Vec<SkippedUnit>)> {
    let mut results = Vec::new();
    let mut skipped = Vec::new();

    let errors = panel.error_series(horizon)?;
    let releases = panel.release_series(horizon)?;
    let benchmark = panel.benchmark_series(horizon)?;

    let valid = errors.iter().filter(|&&e| !is_missing(e)).count();
    if valid < config.min_regression_obs {
        skipped.push(SkippedUnit {
            horizon,
            kind: None,
            reason: format!(
                "{valid} valid observations, need {}",
                config.min_regression_obs
            ),
        });
        return Ok((results, skipped));
    }

    // horizon 1 has no own revision; those specifications are omitted
    let revisions = if horizon >= 2 {
        Some(panel.revision_series(horizon)?)
    } else {
        None
    };
    let lag_revisions = revisions.map(lag1);

    let response = format!("error_h{horizon}");

    for kind in TestKind::ALL {
        let mut builder = DesignBuilder::new(response.as_str(), errors);
        let mut joint_names: Vec<&str> = Vec::new();

        match kind {
            TestKind::Bias => {}
            TestKind::MincerZarnowitz => {
                builder = builder.term("release", releases);
                joint_names = vec!["const", "release"];
            }
            TestKind::Encompassing => {
                let Some(r) = revisions else { continue };
                builder = builder.term("revision", r);
            }
            TestKind::AugmentedMz => {
                let Some(r) = revisions else { continue };
                builder = builder.term("release", releases).term("revision", r);
                joint_names = vec!["release", "revision"];
            }
            TestKind::Omnibus => {
                let (Some(r), Some(lagged)) = (revisions, lag_revisions.as_deref()) else {
                    continue;
                };
                builder = builder
                    .term("release", releases)
                    .term("revision", r)
                    .term("lag_revision", lagged);
                joint_names = vec!["release", "revision", "lag_revision"];
            }
            TestKind::BenchmarkOmnibus => {
                let (Some(r), Some(lagged)) = (revisions, lag_revisions.as_deref()) else {
                    continue;
                };
                let bench_release = product(benchmark, releases);
                let bench_revision = product(benchmark, r);
                let bench_lag = product(benchmark, lagged);
                builder = builder
                    .term("release", releases)
                    .term("revision", r)
                    .term("lag_revision", lagged)
                    .term("benchmark", benchmark)
                    .term("bench_x_release", &bench_release)
                    .term("bench_x_revision", &bench_revision)
                    .term("bench_x_lag_revision", &bench_lag);
                joint_names = vec![
                    "benchmark",
                    "bench_x_release",
                    "bench_x_revision",
                    "bench_x_lag_revision",
                ];
            }
        }

        let design = match builder.build() {
            Ok(design) => design,
            Err(RevcastError::EmptyData) => {
                skipped.push(SkippedUnit {
                    horizon,
                    kind: Some(kind),
                    reason: "no jointly observed rows".to_string(),
                });
                continue;
            }
            Err(err) => return Err(err),
        };

        if design.nobs() < config.min_regression_obs {
            skipped.push(SkippedUnit {
                horizon,
                kind: Some(kind),
                reason: format!(
                    "{} valid observations, need {}",
                    design.nobs(),
                    config.min_regression_obs
                ),
            });
            continue;
        }

        match fit_hac(&design, config.hac_lag) {
            Ok(fit) => {
                let joint = if joint_names.is_empty() {
                    None
                } else {
                    match fit.wald_joint(&joint_names) {
                        Ok(wald) => Some(wald),
                        Err(RevcastError::Degenerate(reason)) => {
                            log::warn!("joint test degenerate for {kind} at horizon {horizon}: {reason}");
                            None
                        }
                        Err(err) => return Err(err),
                    }
                };
                results.push(TestResult {
                    horizon,
                    kind,
                    fit,
                    joint,
                });
            }
            Err(RevcastError::Degenerate(reason)) => {
                // fatal for this one regression only
                skipped.push(SkippedUnit {
                    horizon,
                    kind: Some(kind),
                    reason,
                });
            }
            Err(RevcastError::InsufficientData { needed, got }) => {
                skipped.push(SkippedUnit {
                    horizon,
                    kind: Some(kind),
                    reason: format!("{got} observations for {needed} parameters"),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok((results, skipped))
}

/// One-period lag by panel position (panels are period-sorted).
fn lag1(series: &[f64]) -> Vec<f64> {
    let mut lagged = Vec::with_capacity(series.len());
    lagged.push(f64::NAN);
    lagged.extend_from_slice(&series[..series.len().saturating_sub(1)]);
    lagged
}

/// Elementwise product, NaN-propagating.
fn product(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(&x, &y)| x * y).collect()
}
