//! Benchmark-indicator alignment.
//!
//! Merges the 0/1 benchmark panel onto the derived revision/error panel by
//! `(target period, horizon)`. The canonical path is an inner join on the
//! period axis; rows the benchmark panel does not cover are dropped, and the
//! drop is counted and logged rather than swallowed, since silent sample
//! shrinkage changes statistical power per horizon.

use crate::core::{is_missing, BenchmarkPanel, Month};
use crate::derive::revisions::DerivedPanel;
use crate::error::{Result, RevcastError};

/// How to treat derived-panel periods absent from the benchmark panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinPolicy {
    /// Keep only periods present in both panels.
    #[default]
    Inner,
    /// Keep every derived-panel period; unmatched benchmark cells stay
    /// missing.
    Outer,
}

/// Accounting for an alignment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinSummary {
    /// Periods present in both panels.
    pub matched_periods: usize,
    /// Derived-panel periods without a benchmark counterpart.
    pub dropped_periods: usize,
    /// Matched-period cells where the indicator itself is missing.
    pub unmatched_cells: usize,
}

/// The derived panel with the benchmark indicator merged on.
#[derive(Debug, Clone)]
pub struct AlignedPanel {
    derived: DerivedPanel,
    /// `benchmark[h-1][t]`, addressed like every other panel column.
    benchmark: Vec<Vec<f64>>,
    summary: JoinSummary,
}

/// Merge a benchmark panel onto a derived panel.
pub fn align(
    derived: &DerivedPanel,
    benchmark: &BenchmarkPanel,
    policy: JoinPolicy,
) -> Result<AlignedPanel> {
    if benchmark.num_horizons() < derived.num_horizons() {
        return Err(RevcastError::DimensionMismatch {
            expected: derived.num_horizons(),
            got: benchmark.num_horizons(),
        });
    }

    let keep: Vec<usize> = match policy {
        JoinPolicy::Inner => derived
            .periods()
            .iter()
            .enumerate()
            .filter(|(_, p)| benchmark.period_index(**p).is_some())
            .map(|(t, _)| t)
            .collect(),
        JoinPolicy::Outer => (0..derived.num_periods()).collect(),
    };

    if keep.is_empty() {
        return Err(RevcastError::EmptyData);
    }

    let dropped_periods = derived.num_periods() - keep.len();
    let h_count = derived.num_horizons();
    let mut columns = vec![Vec::with_capacity(keep.len()); h_count];
    let mut unmatched_cells = 0usize;

    for &t in &keep {
        let period = derived.periods()[t];
        let source = benchmark.period_index(period);
        for (h0, column) in columns.iter_mut().enumerate() {
            let value = match source {
                Some(s) => benchmark.value(s, h0 + 1)?,
                None => f64::NAN,
            };
            if source.is_some() && is_missing(value) {
                unmatched_cells += 1;
            }
            column.push(value);
        }
    }

    let matched_periods = keep
        .iter()
        .filter(|&&t| benchmark.period_index(derived.periods()[t]).is_some())
        .count();

    let summary = JoinSummary {
        matched_periods,
        dropped_periods: match policy {
            JoinPolicy::Inner => dropped_periods,
            JoinPolicy::Outer => 0,
        },
        unmatched_cells,
    };

    if summary.dropped_periods > 0 || summary.unmatched_cells > 0 {
        log::warn!(
            "benchmark alignment dropped {} periods and found {} uncovered cells",
            summary.dropped_periods,
            summary.unmatched_cells
        );
    }

    let derived = restrict(derived, &keep)?;

    Ok(AlignedPanel {
        derived,
        benchmark: columns,
        summary,
    })
}

/// Rebuild a derived panel restricted to the kept period indices.
fn restrict(derived: &DerivedPanel, keep: &[usize]) -> Result<DerivedPanel> {
    if keep.len() == derived.num_periods() {
        return Ok(derived.clone());
    }
    let periods: Vec<Month> = keep.iter().map(|&t| derived.periods()[t]).collect();
    let pick = |series: &[f64]| -> Vec<f64> { keep.iter().map(|&t| series[t]).collect() };

    let h_count = derived.num_horizons();
    let releases = (1..=h_count)
        .map(|h| derived.release_series(h).map(pick))
        .collect::<Result<Vec<_>>>()?;
    DerivedPanel::from_parts(
        periods,
        derived.final_horizon(),
        releases,
        (1..=h_count)
            .map(|h| derived.revision_series(h).map(pick))
            .collect::<Result<Vec<_>>>()?,
        (1..=h_count)
            .map(|h| derived.error_series(h).map(pick))
            .collect::<Result<Vec<_>>>()?,
    )
}

impl AlignedPanel {
    pub fn num_periods(&self) -> usize {
        self.derived.num_periods()
    }

    pub fn num_horizons(&self) -> usize {
        self.derived.num_horizons()
    }

    pub fn final_horizon(&self) -> usize {
        self.derived.final_horizon()
    }

    pub fn periods(&self) -> &[Month] {
        self.derived.periods()
    }

    pub fn summary(&self) -> JoinSummary {
        self.summary
    }

    pub fn release_series(&self, horizon: usize) -> Result<&[f64]> {
        self.derived.release_series(horizon)
    }

    pub fn revision_series(&self, horizon: usize) -> Result<&[f64]> {
        self.derived.revision_series(horizon)
    }

    pub fn error_series(&self, horizon: usize) -> Result<&[f64]> {
        self.derived.error_series(horizon)
    }

    /// Benchmark indicator at a horizon, in period order.
    pub fn benchmark_series(&self, horizon: usize) -> Result<&[f64]> {
        if horizon == 0 || horizon > self.benchmark.len() {
            return Err(RevcastError::IndexOutOfBounds {
                index: horizon,
                size: self.benchmark.len(),
            });
        }
        Ok(&self.benchmark[horizon - 1])
    }
}
