//! Per-horizon nowcast correction model.
//!
//! Trains a small linear model of the release error on smoothed release and
//! revision histories over the training window, then reconstructs predicted
//! errors out of sample and corrects the raw nowcast. Lifecycle is
//! Untrained → Trained → Applied: coefficients are frozen once fit and the
//! model never transitions back.
//!
//! Per-horizon regressor selection: horizon 1 uses the constant, the lagged
//! error, and the smoothed release; horizon 2 adds the smoothed revision;
//! horizons 3 and above add the lagged smoothed revision.

use crate::config::PipelineConfig;
use crate::core::{is_missing, Month};
use crate::derive::{smooth_series, AlignedPanel};
use crate::error::{Result, RevcastError};
use crate::nowcast::split::TrainEvalSplit;
use crate::regress::{fit_hac, DesignBuilder, FittedRegression};

/// Column bundle for one horizon, in panel period order.
#[derive(Debug, Clone)]
pub struct HorizonData {
    horizon: usize,
    periods: Vec<Month>,
    release: Vec<f64>,
    error: Vec<f64>,
    lag_error: Vec<f64>,
    smoothed_release: Vec<f64>,
    smoothed_revision: Option<Vec<f64>>,
    lag_smoothed_revision: Option<Vec<f64>>,
}

impl HorizonData {
    /// Assemble the correction inputs for one horizon from the aligned panel.
    ///
    /// Smoothed states are built over the full history in chronological
    /// order; each `S[t]` depends only on observations up to `t`, so using
    /// them at training rows introduces no look-ahead.
    pub fn build(panel: &AlignedPanel, config: &PipelineConfig, horizon: usize) -> Result<Self> {
        if horizon == 0 || horizon >= panel.final_horizon() {
            return Err(RevcastError::InvalidParameter(format!(
                "correction horizon {horizon} outside 1..{}",
                panel.final_horizon()
            )));
        }

        let release = panel.release_series(horizon)?.to_vec();
        let error = panel.error_series(horizon)?.to_vec();
        let smoothed_release = smooth_series(&release, config.decay, config.smoothing_rule);

        let (smoothed_revision, lag_smoothed_revision) = if horizon >= 2 {
            let revision = panel.revision_series(horizon)?;
            let smoothed = smooth_series(revision, config.decay, config.smoothing_rule);
            let lagged = if horizon >= 3 {
                Some(lag1(&smoothed))
            } else {
                None
            };
            (Some(smoothed), lagged)
        } else {
            (None, None)
        };

        Ok(Self {
            horizon,
            periods: panel.periods().to_vec(),
            lag_error: lag1(&error),
            release,
            error,
            smoothed_release,
            smoothed_revision,
            lag_smoothed_revision,
        })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn periods(&self) -> &[Month] {
        &self.periods
    }
}

/// Outcome of a correction fit: a regression, or the neutral zero-correction
/// fallback when the training window is too thin or degenerate.
#[derive(Debug, Clone)]
pub enum CorrectionFit {
    Fitted(FittedRegression),
    /// Graceful degradation, not silent data loss: the reason is kept and
    /// logged, and `apply` leaves the nowcast unchanged.
    Neutral { reason: String },
}

/// The per-horizon correction model.
#[derive(Debug, Clone)]
pub struct CorrectionModel {
    horizon: usize,
    fit: Option<CorrectionFit>,
}

/// Corrected series over the full panel, produced by `apply`.
#[derive(Debug, Clone)]
pub struct CorrectedSeries {
    pub horizon: usize,
    pub periods: Vec<Month>,
    /// Raw release values.
    pub raw: Vec<f64>,
    /// Actual errors `e_h` (missing where the final release is not out).
    pub actual_error: Vec<f64>,
    /// Model-predicted errors `ê_h`.
    pub predicted_error: Vec<f64>,
    /// Corrected nowcast `ŷ = y + ê`.
    pub corrected: Vec<f64>,
}

impl CorrectionModel {
    pub fn new(horizon: usize) -> Self {
        Self { horizon, fit: None }
    }

    pub fn is_trained(&self) -> bool {
        self.fit.is_some()
    }

    pub fn fit_result(&self) -> Option<&CorrectionFit> {
        self.fit.as_ref()
    }

    /// Fit on the training window. Coefficients are frozen afterwards;
    /// fitting twice is an error, there is no transition back to untrained.
    pub fn fit(
        &mut self,
        data: &HorizonData,
        split: &TrainEvalSplit,
        config: &PipelineConfig,
    ) -> Result<()> {
        if self.fit.is_some() {
            return Err(RevcastError::InvalidParameter(
                "correction model is already trained".to_string(),
            ));
        }
        if data.horizon != self.horizon {
            return Err(RevcastError::InvalidParameter(format!(
                "horizon mismatch: model {}, data {}",
                self.horizon, data.horizon
            )));
        }

        let train = split.train_indices(&data.periods);
        let pick = |series: &[f64]| -> Vec<f64> { train.iter().map(|&t| series[t]).collect() };

        let mut builder = DesignBuilder::new(
            format!("error_h{}", self.horizon),
            &pick(&data.error),
        )
        .term("lag_error", &pick(&data.lag_error))
        .term("smoothed_release", &pick(&data.smoothed_release));
        if let Some(sr) = &data.smoothed_revision {
            builder = builder.term("smoothed_revision", &pick(sr));
        }
        if let Some(lsr) = &data.lag_smoothed_revision {
            builder = builder.term("lag_smoothed_revision", &pick(lsr));
        }

        let outcome = match builder.build() {
            Ok(design) => {
                // every row entering the fit must be a training-window row
                let used: Vec<Month> = design
                    .kept_rows()
                    .iter()
                    .map(|&i| data.periods[train[i]])
                    .collect();
                split.guard_train(&used)?;

                if design.nobs() < config.min_train_obs {
                    CorrectionFit::Neutral {
                        reason: format!(
                            "{} training observations, need {}",
                            design.nobs(),
                            config.min_train_obs
                        ),
                    }
                } else {
                    match fit_hac(&design, config.hac_lag) {
                        Ok(fit) => CorrectionFit::Fitted(fit),
                        Err(RevcastError::Degenerate(reason)) => CorrectionFit::Neutral { reason },
                        Err(err) => return Err(err),
                    }
                }
            }
            Err(RevcastError::EmptyData) => CorrectionFit::Neutral {
                reason: "no jointly observed training rows".to_string(),
            },
            Err(err) => return Err(err),
        };

        if let CorrectionFit::Neutral { reason } = &outcome {
            log::warn!(
                "horizon {} correction falls back to neutral: {reason}",
                self.horizon
            );
        }
        self.fit = Some(outcome);
        Ok(())
    }

    /// Reconstruct predicted errors and corrected nowcasts over the full
    /// panel.
    ///
    /// The lagged actual error is not observable in real time, so its
    /// autoregressive contribution enters through the fitted long-run level
    /// `α/(1 − ρ)`, with ρ the lagged-error coefficient; the smoothed-state
    /// contributions are added on top.
    pub fn apply(&self, data: &HorizonData) -> Result<CorrectedSeries> {
        let fit = self.fit.as_ref().ok_or(RevcastError::FitRequired)?;
        if data.horizon != self.horizon {
            return Err(RevcastError::InvalidParameter(format!(
                "horizon mismatch: model {}, data {}",
                self.horizon, data.horizon
            )));
        }

        let n = data.periods.len();
        let mut predicted = vec![f64::NAN; n];
        let mut corrected = vec![f64::NAN; n];

        match fit {
            CorrectionFit::Neutral { .. } => {
                for t in 0..n {
                    if !is_missing(data.release[t]) {
                        predicted[t] = 0.0;
                        corrected[t] = data.release[t];
                    }
                }
            }
            CorrectionFit::Fitted(fit) => {
                let alpha = fit.coefficient("const").unwrap_or(0.0);
                let rho = fit.coefficient("lag_error").unwrap_or(0.0);
                if (1.0 - rho).abs() < 1e-10 {
                    return Err(RevcastError::Degenerate(format!(
                        "lagged-error coefficient {rho} has no long-run level",
                    )));
                }
                let level = alpha / (1.0 - rho);
                let theta = fit.coefficient("smoothed_release").unwrap_or(0.0);
                let gamma = fit.coefficient("smoothed_revision").unwrap_or(0.0);
                let rho_lag = fit.coefficient("lag_smoothed_revision").unwrap_or(0.0);

                for t in 0..n {
                    if is_missing(data.release[t]) || is_missing(data.smoothed_release[t]) {
                        continue;
                    }
                    let mut e_hat = level + theta * data.smoothed_release[t];
                    if let Some(sr) = &data.smoothed_revision {
                        if is_missing(sr[t]) {
                            continue;
                        }
                        e_hat += gamma * sr[t];
                    }
                    if let Some(lsr) = &data.lag_smoothed_revision {
                        if is_missing(lsr[t]) {
                            continue;
                        }
                        e_hat += rho_lag * lsr[t];
                    }
                    predicted[t] = e_hat;
                    corrected[t] = data.release[t] + e_hat;
                }
            }
        }

        Ok(CorrectedSeries {
            horizon: self.horizon,
            periods: data.periods.clone(),
            raw: data.release.clone(),
            actual_error: data.error.clone(),
            predicted_error: predicted,
            corrected,
        })
    }
}

fn lag1(series: &[f64]) -> Vec<f64> {
    let mut lagged = Vec::with_capacity(series.len());
    lagged.push(f64::NAN);
    lagged.extend_from_slice(&series[..series.len().saturating_sub(1)]);
    lagged
}
