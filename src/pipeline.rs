//! End-to-end orchestration.
//!
//! Panel → exclusion masking → derivation → benchmark alignment, then the
//! two independent downstream branches: the rationality battery, and the
//! EWS → correction → combination → evaluation chain. Every panel object is
//! an immutable value passed between stages; nothing is patched in place.
//!
//! Per-unit failures (thin samples, degenerate regressions) skip that unit
//! and are collected in the output; the pipeline delivers partial results
//! rather than aborting on a single horizon.

use crate::config::PipelineConfig;
use crate::core::{BenchmarkPanel, ReleasePanel};
use crate::derive::{align, derive, JoinSummary};
use crate::error::{Result, RevcastError};
use crate::eval::{compare_forecasts, ForecastComparison};
use crate::nowcast::{
    combine, CombinedNowcast, CorrectionFit, CorrectionModel, HorizonData, TrainEvalSplit,
};
use crate::rationality::{run_battery, BatteryReport};
use rayon::prelude::*;

/// A pipeline unit that was skipped, with the stage and reason.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSkip {
    pub stage: &'static str,
    pub horizon: usize,
    pub reason: String,
}

/// Nowcasting outcome for one horizon.
#[derive(Debug, Clone)]
pub struct HorizonOutcome {
    pub horizon: usize,
    pub fit: CorrectionFit,
    pub combined: CombinedNowcast,
    /// Corrected vs raw-release errors over the evaluation window.
    pub comparison: Option<ForecastComparison>,
    /// λ-combined vs raw-release errors over the evaluation window.
    pub combined_comparison: Option<ForecastComparison>,
}

/// Full pipeline output: battery results, per-horizon nowcasting outcomes,
/// join accounting, and the skip ledger.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub join_summary: JoinSummary,
    pub battery: BatteryReport,
    pub horizons: Vec<HorizonOutcome>,
    pub skipped: Vec<PipelineSkip>,
}

impl PipelineOutput {
    /// The evaluation results table, one row per horizon with a comparison.
    pub fn comparison_rows(&self) -> Vec<ForecastComparison> {
        self.horizons
            .iter()
            .filter_map(|h| h.comparison)
            .collect()
    }
}

/// Run the full pipeline.
pub fn run_pipeline(
    releases: &ReleasePanel,
    benchmark: &BenchmarkPanel,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    config.validate()?;

    let masked = releases.with_excluded_windows(&config.excluded);
    log::debug!("deriving revisions and errors");
    let derived = derive(&masked, config.final_horizon)?;
    let aligned = align(&derived, benchmark, config.join_policy)?;
    let join_summary = aligned.summary();

    log::debug!("running rationality battery");
    let battery = run_battery(&aligned, config)?;

    let split = TrainEvalSplit::new(config.cutoff);
    let last = config.final_horizon - 1;

    log::debug!("running nowcast correction for horizons 1..={last}");
    let per_horizon: Vec<(Option<HorizonOutcome>, Vec<PipelineSkip>)> = (1..=last)
        .into_par_iter()
        .map(|horizon| run_horizon(&aligned, config, &split, horizon))
        .collect::<Result<_>>()?;

    let mut horizons = Vec::new();
    let mut skipped = Vec::new();
    for (outcome, skips) in per_horizon {
        horizons.extend(outcome);
        skipped.extend(skips);
    }
    for skip in &skipped {
        log::warn!(
            "pipeline skipped {} at horizon {}: {}",
            skip.stage,
            skip.horizon,
            skip.reason
        );
    }

    Ok(PipelineOutput {
        join_summary,
        battery,
        horizons,
        skipped,
    })
}

fn run_horizon(
    aligned: &crate::derive::AlignedPanel,
    config: &PipelineConfig,
    split: &TrainEvalSplit,
    horizon: usize,
) -> Result<(Option<HorizonOutcome>, Vec<PipelineSkip>)> {
    let mut skips = Vec::new();

    let data = HorizonData::build(aligned, config, horizon)?;
    let mut model = CorrectionModel::new(horizon);
    model.fit(&data, split, config)?;

    let series = match model.apply(&data) {
        Ok(series) => series,
        Err(RevcastError::Degenerate(reason)) => {
            skips.push(PipelineSkip {
                stage: "correction",
                horizon,
                reason,
            });
            return Ok((None, skips));
        }
        Err(err) => return Err(err),
    };

    let combined = combine(&series, split, config.min_train_obs)?;

    // evaluation-window error pairs: corrected vs raw-release benchmark
    let eval = split.eval_indices(&series.periods);
    let corrected_errors: Vec<f64> = eval
        .iter()
        .map(|&t| series.actual_error[t] - series.predicted_error[t])
        .collect();
    let benchmark_errors: Vec<f64> = eval.iter().map(|&t| series.actual_error[t]).collect();

    let comparison = match compare_forecasts(horizon, &corrected_errors, &benchmark_errors, config.hac_lag)
    {
        Ok(row) => Some(row),
        Err(RevcastError::Degenerate(reason)) => {
            skips.push(PipelineSkip {
                stage: "evaluation",
                horizon,
                reason,
            });
            None
        }
        Err(RevcastError::InsufficientData { needed, got }) => {
            skips.push(PipelineSkip {
                stage: "evaluation",
                horizon,
                reason: format!("{got} evaluation pairs, need {needed}"),
            });
            None
        }
        Err(err) => return Err(err),
    };

    // λ-combined errors: e_comb = y_final − y_comb = e + y − y_comb
    let combined_errors: Vec<f64> = eval
        .iter()
        .zip(combined.combined.iter())
        .map(|(&t, &y_comb)| series.actual_error[t] + series.raw[t] - y_comb)
        .collect();
    let combined_comparison =
        match compare_forecasts(horizon, &combined_errors, &benchmark_errors, config.hac_lag) {
            Ok(row) => Some(row),
            Err(RevcastError::Degenerate(reason)) => {
                skips.push(PipelineSkip {
                    stage: "combined-evaluation",
                    horizon,
                    reason,
                });
                None
            }
            Err(RevcastError::InsufficientData { needed, got }) => {
                skips.push(PipelineSkip {
                    stage: "combined-evaluation",
                    horizon,
                    reason: format!("{got} evaluation pairs, need {needed}"),
                });
                None
            }
            Err(err) => return Err(err),
        };

    let fit = model
        .fit_result()
        .cloned()
        .ok_or(RevcastError::FitRequired)?;

    Ok((
        Some(HorizonOutcome {
            horizon,
            fit,
            combined,
            comparison,
            combined_comparison,
        }),
        skips,
    ))
}
