//! Train/evaluation partition of target periods.
//!
//! The cutoff is fixed before any model fitting. Every fit restricted to the
//! training window runs through [`TrainEvalSplit::guard_train`], which fails
//! loudly on a look-ahead violation instead of silently producing an invalid
//! evaluation.

use crate::core::Month;
use crate::error::{Result, RevcastError};

/// Boolean partition of target periods at a fixed cutoff (train: `≤ cutoff`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainEvalSplit {
    cutoff: Month,
}

impl TrainEvalSplit {
    pub fn new(cutoff: Month) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> Month {
        self.cutoff
    }

    /// Whether a period belongs to the training window.
    pub fn is_train(&self, period: Month) -> bool {
        period <= self.cutoff
    }

    /// Indices of training rows.
    pub fn train_indices(&self, periods: &[Month]) -> Vec<usize> {
        periods
            .iter()
            .enumerate()
            .filter(|(_, p)| self.is_train(**p))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of evaluation rows.
    pub fn eval_indices(&self, periods: &[Month]) -> Vec<usize> {
        periods
            .iter()
            .enumerate()
            .filter(|(_, p)| !self.is_train(**p))
            .map(|(i, _)| i)
            .collect()
    }

    /// Verify that every period used by a training fit lies in the training
    /// window.
    pub fn guard_train(&self, used: &[Month]) -> Result<()> {
        for &period in used {
            if !self.is_train(period) {
                return Err(RevcastError::LookaheadViolation {
                    fit_period: self.cutoff.to_string(),
                    data_period: period.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Verify that every period feeding a real-time fit at `asof` is strictly
/// earlier than `asof`.
pub fn guard_strictly_prior(asof: Month, used: &[Month]) -> Result<()> {
    for &period in used {
        if period >= asof {
            return Err(RevcastError::LookaheadViolation {
                fit_period: asof.to_string(),
                data_period: period.to_string(),
            });
        }
    }
    Ok(())
}
