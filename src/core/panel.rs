//! Rectangular release-vintage panels.
//!
//! A [`ReleasePanel`] holds one value per `(target period, horizon)` key:
//! the growth rate as known `horizon` releases after first publication.
//! Storage is column-major per horizon (`values[h-1][t]`), with `f64::NAN`
//! as the missing-cell marker. Cells go missing for target periods too
//! recent to have reached a horizon yet, and inside explicitly excluded
//! windows.
//!
//! A [`BenchmarkPanel`] is a parallel 0/1 indicator panel with identical
//! keys, flagging releases that coincide with a base-year benchmark
//! revision event.

use crate::core::period::Month;
use crate::error::{Result, RevcastError};

/// Missing-cell test. Panels mark absent values with NaN.
#[inline]
pub fn is_missing(v: f64) -> bool {
    v.is_nan()
}

/// A panel of release vintages keyed by `(target period, horizon)`.
#[derive(Debug, Clone)]
pub struct ReleasePanel {
    periods: Vec<Month>,
    /// Column-major: `values[h - 1][t]` is the release at horizon `h` for
    /// target period `periods[t]`.
    values: Vec<Vec<f64>>,
}

/// Builder for [`ReleasePanel`].
#[derive(Debug, Clone, Default)]
pub struct ReleasePanelBuilder {
    periods: Vec<Month>,
    values: Vec<Vec<f64>>,
}

impl ReleasePanelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target periods (must be strictly increasing).
    pub fn periods(mut self, periods: Vec<Month>) -> Self {
        self.periods = periods;
        self
    }

    /// Append one horizon column (release values per target period, in
    /// period order). Horizons are numbered by insertion order starting at 1.
    pub fn horizon_column(mut self, column: Vec<f64>) -> Self {
        self.values.push(column);
        self
    }

    pub fn build(self) -> Result<ReleasePanel> {
        ReleasePanel::new(self.periods, self.values)
    }
}

impl ReleasePanel {
    /// Create a panel from periods and per-horizon columns.
    pub fn new(periods: Vec<Month>, values: Vec<Vec<f64>>) -> Result<Self> {
        if periods.is_empty() || values.is_empty() {
            return Err(RevcastError::EmptyData);
        }
        if values.len() < 2 {
            return Err(RevcastError::InvalidParameter(
                "a release panel needs at least two horizons".to_string(),
            ));
        }
        for pair in periods.windows(2) {
            if pair[1] <= pair[0] {
                return Err(RevcastError::PeriodError(
                    "target periods must be strictly increasing".to_string(),
                ));
            }
        }
        for column in &values {
            if column.len() != periods.len() {
                return Err(RevcastError::DimensionMismatch {
                    expected: periods.len(),
                    got: column.len(),
                });
            }
        }
        Ok(Self { periods, values })
    }

    /// Number of target periods.
    pub fn num_periods(&self) -> usize {
        self.periods.len()
    }

    /// Number of horizons `H`.
    pub fn num_horizons(&self) -> usize {
        self.values.len()
    }

    /// Target periods in chronological order.
    pub fn periods(&self) -> &[Month] {
        &self.periods
    }

    /// Position of a target period, if present.
    pub fn period_index(&self, period: Month) -> Option<usize> {
        self.periods.binary_search(&period).ok()
    }

    /// The release at `(period index, horizon)`. Horizons are 1-based.
    pub fn value(&self, t: usize, horizon: usize) -> Result<f64> {
        let column = self.horizon_series(horizon)?;
        column
            .get(t)
            .copied()
            .ok_or(RevcastError::IndexOutOfBounds {
                index: t,
                size: self.periods.len(),
            })
    }

    /// All releases at one horizon, in period order.
    pub fn horizon_series(&self, horizon: usize) -> Result<&[f64]> {
        if horizon == 0 || horizon > self.values.len() {
            return Err(RevcastError::IndexOutOfBounds {
                index: horizon,
                size: self.values.len(),
            });
        }
        Ok(&self.values[horizon - 1])
    }

    /// Whether any cell is missing.
    pub fn has_missing_values(&self) -> bool {
        self.values
            .iter()
            .any(|column| column.iter().any(|&v| is_missing(v)))
    }

    /// A copy with every cell inside the inclusive `[start, end]` windows set
    /// missing, across all horizons.
    ///
    /// Exclusion is applied to the raw panel before any derivation, so every
    /// derived column is consistent by construction.
    pub fn with_excluded_windows(&self, windows: &[(Month, Month)]) -> ReleasePanel {
        let mut values = self.values.clone();
        let mut nulled = 0usize;
        for (t, period) in self.periods.iter().enumerate() {
            let excluded = windows
                .iter()
                .any(|&(start, end)| *period >= start && *period <= end);
            if excluded {
                for column in values.iter_mut() {
                    if !is_missing(column[t]) {
                        column[t] = f64::NAN;
                        nulled += 1;
                    }
                }
            }
        }
        if nulled > 0 {
            log::info!("excluded windows nulled {nulled} release cells");
        }
        ReleasePanel {
            periods: self.periods.clone(),
            values,
        }
    }
}

/// A 0/1 indicator panel flagging base-year benchmark revision events,
/// keyed identically to [`ReleasePanel`].
#[derive(Debug, Clone)]
pub struct BenchmarkPanel {
    periods: Vec<Month>,
    /// Column-major, same addressing as the release panel. Cells are 0.0,
    /// 1.0, or NaN where indicator coverage is absent.
    values: Vec<Vec<f64>>,
}

impl BenchmarkPanel {
    pub fn new(periods: Vec<Month>, values: Vec<Vec<f64>>) -> Result<Self> {
        if periods.is_empty() || values.is_empty() {
            return Err(RevcastError::EmptyData);
        }
        for pair in periods.windows(2) {
            if pair[1] <= pair[0] {
                return Err(RevcastError::PeriodError(
                    "target periods must be strictly increasing".to_string(),
                ));
            }
        }
        for column in &values {
            if column.len() != periods.len() {
                return Err(RevcastError::DimensionMismatch {
                    expected: periods.len(),
                    got: column.len(),
                });
            }
            for &v in column {
                if !is_missing(v) && v != 0.0 && v != 1.0 {
                    return Err(RevcastError::InvalidParameter(format!(
                        "benchmark indicator must be 0 or 1, got {v}"
                    )));
                }
            }
        }
        Ok(Self { periods, values })
    }

    pub fn num_periods(&self) -> usize {
        self.periods.len()
    }

    pub fn num_horizons(&self) -> usize {
        self.values.len()
    }

    pub fn periods(&self) -> &[Month] {
        &self.periods
    }

    pub fn period_index(&self, period: Month) -> Option<usize> {
        self.periods.binary_search(&period).ok()
    }

    /// The indicator at `(period index, horizon)`. Horizons are 1-based.
    pub fn value(&self, t: usize, horizon: usize) -> Result<f64> {
        if horizon == 0 || horizon > self.values.len() {
            return Err(RevcastError::IndexOutOfBounds {
                index: horizon,
                size: self.values.len(),
            });
        }
        self.values[horizon - 1]
            .get(t)
            .copied()
            .ok_or(RevcastError::IndexOutOfBounds {
                index: t,
                size: self.periods.len(),
            })
    }
}
