//! Forecast evaluation: relative RMSE, Diebold-Mariano, encompassing.
//!
//! Compares corrected-nowcast errors against benchmark errors over the
//! evaluation window. All HAC statistics share one lag-truncation convention
//! with the rationality battery, so the columns of the results table are
//! comparable.

use crate::core::is_missing;
use crate::error::{Result, RevcastError};
use crate::regress::{fit_hac, DesignBuilder};

/// One row of the evaluation results table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastComparison {
    pub horizon: usize,
    /// `rmse(corrected) / rmse(benchmark)`, ×100; below 100 favors the
    /// corrected nowcast.
    pub relative_rmse: f64,
    /// HAC t-statistic of the mean squared-loss differential.
    pub dm_stat: f64,
    pub dm_p_value: f64,
    /// Slope of `e_benchmark` on `(e_benchmark − e_corrected)`.
    pub encompassing_beta: f64,
    pub encompassing_t_stat: f64,
    pub nobs: usize,
}

/// Root mean squared error of a series of forecast errors.
pub fn rmse(errors: &[f64]) -> f64 {
    if errors.is_empty() {
        return f64::NAN;
    }
    let mss = errors.iter().map(|e| e * e).sum::<f64>() / errors.len() as f64;
    mss.sqrt()
}

/// Compare corrected against benchmark forecast errors.
///
/// Both inputs are aligned period-wise; rows where either is missing are
/// dropped pairwise. Needs at least two jointly observed rows.
pub fn compare_forecasts(
    horizon: usize,
    corrected_errors: &[f64],
    benchmark_errors: &[f64],
    hac_lag: usize,
) -> Result<ForecastComparison> {
    if corrected_errors.len() != benchmark_errors.len() {
        return Err(RevcastError::DimensionMismatch {
            expected: corrected_errors.len(),
            got: benchmark_errors.len(),
        });
    }

    let pairs: Vec<(f64, f64)> = corrected_errors
        .iter()
        .zip(benchmark_errors)
        .filter(|(&c, &b)| !is_missing(c) && !is_missing(b))
        .map(|(&c, &b)| (c, b))
        .collect();

    if pairs.len() < 2 {
        return Err(RevcastError::InsufficientData {
            needed: 2,
            got: pairs.len(),
        });
    }

    let corrected: Vec<f64> = pairs.iter().map(|&(c, _)| c).collect();
    let benchmark: Vec<f64> = pairs.iter().map(|&(_, b)| b).collect();

    let benchmark_rmse = rmse(&benchmark);
    if benchmark_rmse == 0.0 {
        return Err(RevcastError::Degenerate(format!(
            "benchmark errors are identically zero at horizon {horizon}"
        )));
    }
    let relative_rmse = 100.0 * rmse(&corrected) / benchmark_rmse;

    // Diebold-Mariano: constant-only regression of the loss differential
    let differential: Vec<f64> = corrected
        .iter()
        .zip(&benchmark)
        .map(|(&c, &b)| c * c - b * b)
        .collect();
    let dm_design = DesignBuilder::new("loss_differential", &differential).build()?;
    let dm_fit = fit_hac(&dm_design, hac_lag)?;
    let dm_stat = dm_fit.t_stats()[0];
    let dm_p_value = dm_fit.p_values()[0];

    // encompassing: benchmark error on the error differential, no intercept
    let error_gap: Vec<f64> = benchmark
        .iter()
        .zip(&corrected)
        .map(|(&b, &c)| b - c)
        .collect();
    let enc_design = DesignBuilder::new("benchmark_error", &benchmark)
        .without_intercept()
        .term("error_gap", &error_gap)
        .build()?;
    let enc_fit = fit_hac(&enc_design, hac_lag)?;
    let encompassing_beta = enc_fit.coefficient("error_gap").unwrap_or(f64::NAN);
    let encompassing_t_stat = enc_fit.t_stat("error_gap").unwrap_or(f64::NAN);

    Ok(ForecastComparison {
        horizon,
        relative_rmse,
        dm_stat,
        dm_p_value,
        encompassing_beta,
        encompassing_t_stat,
        nobs: pairs.len(),
    })
}
