//! Exponentially-weighted smoothing state constructor.
//!
//! Builds the recursive smoothed versions of the release and revision series
//! used as correction-model regressors and as the real-time nowcasting input.
//! The recursion is strictly sequential in time: `S[0]` initializes at the
//! first observed value, later steps fold in one observation at a time, and
//! a missing observation carries the previous state forward with the decay
//! skipped. Two update rules exist in the wild; one is chosen per run and
//! never mixed.

use crate::core::is_missing;

/// The smoothing recursion applied when an observation is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothingRule {
    /// `S = δ·S_prev + x`. The canonical variant: an unnormalized
    /// decayed accumulation of the observation history.
    #[default]
    Accumulate,
    /// `S = δ·x + (1−δ)·S_prev`, the standard EWMA form.
    Ewma,
}

impl SmoothingRule {
    #[inline]
    fn apply(self, decay: f64, prev: f64, x: f64) -> f64 {
        match self {
            SmoothingRule::Accumulate => decay * prev + x,
            SmoothingRule::Ewma => decay * x + (1.0 - decay) * prev,
        }
    }
}

/// Recursive smoothing state for one series.
///
/// Restartable: [`SmoothedState::resume`] rebuilds the state from a saved
/// `(decay, rule, last)` checkpoint so a production caller can continue a
/// series without replaying history. The batch path ([`smooth_series`])
/// simply folds a full history through one state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedState {
    decay: f64,
    rule: SmoothingRule,
    last: Option<f64>,
}

impl SmoothedState {
    /// Fresh state with no observations absorbed yet.
    pub fn new(decay: f64, rule: SmoothingRule) -> Self {
        Self {
            decay,
            rule,
            last: None,
        }
    }

    /// Rebuild from a checkpoint (`last` as returned by [`Self::value`]).
    pub fn resume(decay: f64, rule: SmoothingRule, last: Option<f64>) -> Self {
        Self { decay, rule, last }
    }

    /// Current state value, NaN before the first observation.
    pub fn value(&self) -> f64 {
        self.last.unwrap_or(f64::NAN)
    }

    /// Checkpoint for [`Self::resume`].
    pub fn checkpoint(&self) -> Option<f64> {
        self.last
    }

    /// Absorb one step and return the updated state value.
    ///
    /// A NaN input is a missing observation: the previous state carries
    /// forward unchanged (decay skipped). Before the first observed value the
    /// state stays undefined and NaN is returned.
    pub fn update(&mut self, x: f64) -> f64 {
        match (self.last, is_missing(x)) {
            (None, true) => f64::NAN,
            (None, false) => {
                self.last = Some(x);
                x
            }
            (Some(prev), true) => prev,
            (Some(prev), false) => {
                let next = self.rule.apply(self.decay, prev, x);
                self.last = Some(next);
                next
            }
        }
    }
}

/// Batch-smooth a full series, returning a series of the same length.
pub fn smooth_series(values: &[f64], decay: f64, rule: SmoothingRule) -> Vec<f64> {
    let mut state = SmoothedState::new(decay, rule);
    values.iter().map(|&x| state.update(x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn accumulate_rule_known_values() {
        let out = smooth_series(&[1.0, 2.0, 3.0], 0.5, SmoothingRule::Accumulate);
        // S0 = 1; S1 = 0.5*1 + 2 = 2.5; S2 = 0.5*2.5 + 3 = 4.25
        assert_relative_eq!(out[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(out[1], 2.5, epsilon = 1e-12);
        assert_relative_eq!(out[2], 4.25, epsilon = 1e-12);
    }

    #[test]
    fn ewma_rule_known_values() {
        let out = smooth_series(&[1.0, 2.0, 3.0], 0.5, SmoothingRule::Ewma);
        // S0 = 1; S1 = 0.5*2 + 0.5*1 = 1.5; S2 = 0.5*3 + 0.5*1.5 = 2.25
        assert_relative_eq!(out[1], 1.5, epsilon = 1e-12);
        assert_relative_eq!(out[2], 2.25, epsilon = 1e-12);
    }

    #[test]
    fn missing_observation_carries_state_forward() {
        let out = smooth_series(&[1.0, f64::NAN, 3.0], 0.5, SmoothingRule::Accumulate);
        // the missing step keeps S = 1 with the decay skipped,
        // then S = 0.5*1 + 3 = 3.5
        assert_relative_eq!(out[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(out[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(out[2], 3.5, epsilon = 1e-12);
    }

    #[test]
    fn leading_missing_values_stay_undefined() {
        let out = smooth_series(
            &[f64::NAN, f64::NAN, 2.0, 4.0],
            0.3,
            SmoothingRule::Accumulate,
        );
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert_relative_eq!(out[2], 2.0, epsilon = 1e-12);
        assert_relative_eq!(out[3], 0.3 * 2.0 + 4.0, epsilon = 1e-12);
    }

    #[test]
    fn all_missing_series_stays_nan() {
        let out = smooth_series(&[f64::NAN; 3], 0.5, SmoothingRule::Accumulate);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn resume_continues_exactly_where_batch_left_off() {
        let full = smooth_series(&[1.0, 2.0, f64::NAN, 4.0, 5.0], 0.4, SmoothingRule::Accumulate);

        let mut head = SmoothedState::new(0.4, SmoothingRule::Accumulate);
        for &x in &[1.0, 2.0, f64::NAN] {
            head.update(x);
        }
        let mut resumed =
            SmoothedState::resume(0.4, SmoothingRule::Accumulate, head.checkpoint());
        assert_relative_eq!(resumed.update(4.0), full[3], epsilon = 1e-12);
        assert_relative_eq!(resumed.update(5.0), full[4], epsilon = 1e-12);
    }

    #[test]
    fn ewma_carries_forward_on_missing_too() {
        let out = smooth_series(&[2.0, f64::NAN, f64::NAN], 0.7, SmoothingRule::Ewma);
        assert_relative_eq!(out[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(out[2], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn output_length_matches_input() {
        let out = smooth_series(&[1.0; 17], 0.5, SmoothingRule::Accumulate);
        assert_eq!(out.len(), 17);
    }
}
