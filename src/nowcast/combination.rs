//! Expanding-window forecast combination.
//!
//! For each evaluation date `t`, a no-intercept regression of the actual
//! error on the model-predicted error over strictly-prior rows yields a
//! weight λ, clipped to `[0, 1]`; the combined nowcast is
//! `λ·ŷ + (1−λ)·y`. Below the observation floor λ falls back to 0.5.
//!
//! The expanding window is carried by incremental accumulators (running
//! Σ a·p and Σ p²) rather than re-slicing all prior data at each date; the
//! strictly-prior boundary is asserted on every push.

use crate::core::{is_missing, Month};
use crate::error::Result;
use crate::nowcast::correction::CorrectedSeries;
use crate::nowcast::split::{guard_strictly_prior, TrainEvalSplit};

/// Combined nowcasts over the evaluation window of one horizon.
#[derive(Debug, Clone)]
pub struct CombinedNowcast {
    pub horizon: usize,
    /// Evaluation periods, chronological.
    pub periods: Vec<Month>,
    /// Combination weight per evaluation period.
    pub lambda: Vec<f64>,
    /// `λ·ŷ + (1−λ)·y` per evaluation period.
    pub combined: Vec<f64>,
    /// Periods where the observation floor forced the λ = 0.5 fallback.
    pub fallbacks: usize,
}

/// Incremental no-intercept regression accumulator for
/// `actual = λ·predicted`.
#[derive(Debug, Clone, Copy, Default)]
struct LambdaAccumulator {
    sum_ap: f64,
    sum_pp: f64,
    count: usize,
}

impl LambdaAccumulator {
    fn push(&mut self, actual: f64, predicted: f64) {
        self.sum_ap += actual * predicted;
        self.sum_pp += predicted * predicted;
        self.count += 1;
    }

    /// λ clipped to [0, 1]; `None` below the floor or with a degenerate
    /// denominator.
    fn lambda(&self, floor: usize) -> Option<f64> {
        if self.count < floor || self.sum_pp <= 0.0 {
            return None;
        }
        Some((self.sum_ap / self.sum_pp).clamp(0.0, 1.0))
    }
}

/// Combine raw and corrected nowcasts over the evaluation window.
///
/// `min_obs` is the floor on strictly-prior observation pairs; below it the
/// weight is the neutral 0.5. Rows enter the accumulator only once their
/// period is strictly behind the date being combined, which is asserted.
pub fn combine(
    series: &CorrectedSeries,
    split: &TrainEvalSplit,
    min_obs: usize,
) -> Result<CombinedNowcast> {
    let mut accumulator = LambdaAccumulator::default();
    let mut periods = Vec::new();
    let mut lambdas = Vec::new();
    let mut combined = Vec::new();
    let mut fallbacks = 0usize;
    let mut absorbed: Vec<Month> = Vec::new();

    for t in 0..series.periods.len() {
        let period = series.periods[t];

        if !split.is_train(period) {
            // everything absorbed so far must be strictly prior to this date
            guard_strictly_prior(period, &absorbed)?;

            let lambda = match accumulator.lambda(min_obs) {
                Some(lambda) => lambda,
                None => {
                    fallbacks += 1;
                    0.5
                }
            };
            let raw = series.raw[t];
            let corrected = series.corrected[t];
            let value = if is_missing(raw) || is_missing(corrected) {
                f64::NAN
            } else {
                lambda * corrected + (1.0 - lambda) * raw
            };
            periods.push(period);
            lambdas.push(lambda);
            combined.push(value);
        }

        // the current row becomes available to later dates only
        let actual = series.actual_error[t];
        let predicted = series.predicted_error[t];
        if !is_missing(actual) && !is_missing(predicted) {
            accumulator.push(actual, predicted);
            absorbed.push(period);
        }
    }

    if fallbacks > 0 {
        log::warn!(
            "horizon {}: λ fell back to 0.5 on {fallbacks} of {} evaluation dates",
            series.horizon,
            periods.len()
        );
    }

    Ok(CombinedNowcast {
        horizon: series.horizon,
        periods,
        lambda: lambdas,
        combined,
        fallbacks,
    })
}
