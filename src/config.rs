//! Pipeline configuration surface.

use crate::core::Month;
use crate::derive::align::JoinPolicy;
use crate::derive::ews::SmoothingRule;
use crate::error::{Result, RevcastError};

/// Configuration for the full revision-analysis pipeline.
///
/// The defaults match the monthly GDP-release setup: twelve horizons with the
/// twelfth release as ground truth, Newey-West lag truncation of 6, smoothing
/// decay 0.5.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Horizon designated as the final/ground-truth release.
    pub final_horizon: usize,
    /// Newey-West lag truncation for every HAC-robust statistic
    /// (6 for monthly data, 1 for annual).
    pub hac_lag: usize,
    /// Smoothing decay δ ∈ (0, 1).
    pub decay: f64,
    /// Which smoothing recursion to use. One rule per run, never mixed.
    pub smoothing_rule: SmoothingRule,
    /// Last target period of the training window (inclusive).
    pub cutoff: Month,
    /// Minimum training observations for correction-model and combination
    /// fits; below it the neutral fallback applies.
    pub min_train_obs: usize,
    /// Minimum valid observations per rationality regression; horizons below
    /// it are skipped.
    pub min_regression_obs: usize,
    /// Inclusive period windows nulled in the raw panel before derivation.
    pub excluded: Vec<(Month, Month)>,
    /// Benchmark-indicator merge policy.
    pub join_policy: JoinPolicy,
}

impl PipelineConfig {
    /// Monthly-data defaults with the given train/eval cutoff.
    pub fn monthly(cutoff: Month) -> Self {
        Self {
            final_horizon: 12,
            hac_lag: 6,
            decay: 0.5,
            smoothing_rule: SmoothingRule::Accumulate,
            cutoff,
            min_train_obs: 24,
            min_regression_obs: 5,
            excluded: Vec::new(),
            join_policy: JoinPolicy::Inner,
        }
    }

    /// Annual-data defaults: HAC lag truncation of 1.
    pub fn annual(cutoff: Month) -> Self {
        Self {
            hac_lag: 1,
            ..Self::monthly(cutoff)
        }
    }

    pub fn with_final_horizon(mut self, final_horizon: usize) -> Self {
        self.final_horizon = final_horizon;
        self
    }

    pub fn with_hac_lag(mut self, hac_lag: usize) -> Self {
        self.hac_lag = hac_lag;
        self
    }

    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    pub fn with_smoothing_rule(mut self, rule: SmoothingRule) -> Self {
        self.smoothing_rule = rule;
        self
    }

    pub fn with_min_train_obs(mut self, min_train_obs: usize) -> Self {
        self.min_train_obs = min_train_obs;
        self
    }

    pub fn with_min_regression_obs(mut self, min_regression_obs: usize) -> Self {
        self.min_regression_obs = min_regression_obs;
        self
    }

    /// Add an inclusive excluded window (e.g. a pandemic-shock period
    /// treated as missing by policy).
    pub fn with_excluded_window(mut self, start: Month, end: Month) -> Self {
        self.excluded.push((start, end));
        self
    }

    pub fn with_join_policy(mut self, policy: JoinPolicy) -> Self {
        self.join_policy = policy;
        self
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.final_horizon < 2 {
            return Err(RevcastError::InvalidParameter(
                "final_horizon must be at least 2".to_string(),
            ));
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(RevcastError::InvalidParameter(format!(
                "decay must lie in (0, 1), got {}",
                self.decay
            )));
        }
        if self.min_regression_obs < 2 {
            return Err(RevcastError::InvalidParameter(
                "min_regression_obs must be at least 2".to_string(),
            ));
        }
        for (start, end) in &self.excluded {
            if end < start {
                return Err(RevcastError::InvalidParameter(format!(
                    "excluded window {start}..{end} is reversed"
                )));
            }
        }
        Ok(())
    }
}
