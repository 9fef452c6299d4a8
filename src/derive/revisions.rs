//! Revision and forecast-error derivation.
//!
//! For each target period with releases `y_1..y_H`, the derived panel holds
//! revisions `r_h = y_h - y_{h-1}` (h ≥ 2) and errors `e_h = y_F - y_h`
//! (h < F) against the designated final release `y_F`. Missingness
//! propagates strictly: a derived cell exists only where both operands do.

use crate::core::{is_missing, Month, ReleasePanel};
use crate::error::{Result, RevcastError};

/// Releases together with their derived revision and error series.
///
/// Immutable once built; changing the final-horizon designation means
/// deriving a fresh panel, never patching this one.
#[derive(Debug, Clone)]
pub struct DerivedPanel {
    periods: Vec<Month>,
    final_horizon: usize,
    /// `releases[h-1][t]`, copied from the source panel.
    releases: Vec<Vec<f64>>,
    /// `revisions[h-1][t]`; the h = 1 column is all-missing by definition.
    revisions: Vec<Vec<f64>>,
    /// `errors[h-1][t]`; columns at and beyond the final horizon are
    /// all-missing by definition.
    errors: Vec<Vec<f64>>,
}

/// Derive revisions and errors from a release panel.
///
/// `final_horizon` designates the ground-truth release; it must be within the
/// panel and at least 2.
pub fn derive(panel: &ReleasePanel, final_horizon: usize) -> Result<DerivedPanel> {
    let h_count = panel.num_horizons();
    if final_horizon < 2 || final_horizon > h_count {
        return Err(RevcastError::InvalidParameter(format!(
            "final horizon {final_horizon} outside panel horizons 2..={h_count}"
        )));
    }

    let n = panel.num_periods();
    let mut revisions = vec![vec![f64::NAN; n]; h_count];
    let mut errors = vec![vec![f64::NAN; n]; h_count];

    let final_column = panel.horizon_series(final_horizon)?;

    for h in 2..=h_count {
        let current = panel.horizon_series(h)?;
        let previous = panel.horizon_series(h - 1)?;
        for t in 0..n {
            if !is_missing(current[t]) && !is_missing(previous[t]) {
                revisions[h - 1][t] = current[t] - previous[t];
            }
        }
    }

    for h in 1..final_horizon {
        let column = panel.horizon_series(h)?;
        for t in 0..n {
            if !is_missing(final_column[t]) && !is_missing(column[t]) {
                errors[h - 1][t] = final_column[t] - column[t];
            }
        }
    }

    let releases = (1..=h_count)
        .map(|h| panel.horizon_series(h).map(<[f64]>::to_vec))
        .collect::<Result<Vec<_>>>()?;

    Ok(DerivedPanel {
        periods: panel.periods().to_vec(),
        final_horizon,
        releases,
        revisions,
        errors,
    })
}

impl DerivedPanel {
    /// Reassemble a panel from already-derived columns. Used when restricting
    /// to a period subset; the columns must share one length and addressing.
    pub(crate) fn from_parts(
        periods: Vec<Month>,
        final_horizon: usize,
        releases: Vec<Vec<f64>>,
        revisions: Vec<Vec<f64>>,
        errors: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let n = periods.len();
        if n == 0 {
            return Err(RevcastError::EmptyData);
        }
        for column in releases.iter().chain(&revisions).chain(&errors) {
            if column.len() != n {
                return Err(RevcastError::DimensionMismatch {
                    expected: n,
                    got: column.len(),
                });
            }
        }
        Ok(Self {
            periods,
            final_horizon,
            releases,
            revisions,
            errors,
        })
    }

    pub fn num_periods(&self) -> usize {
        self.periods.len()
    }

    pub fn num_horizons(&self) -> usize {
        self.releases.len()
    }

    pub fn final_horizon(&self) -> usize {
        self.final_horizon
    }

    pub fn periods(&self) -> &[Month] {
        &self.periods
    }

    /// Release series at a horizon, in period order.
    pub fn release_series(&self, horizon: usize) -> Result<&[f64]> {
        column(&self.releases, horizon)
    }

    /// Revision series `r_h`; all-missing for h = 1.
    pub fn revision_series(&self, horizon: usize) -> Result<&[f64]> {
        column(&self.revisions, horizon)
    }

    /// Error series `e_h`; all-missing at and beyond the final horizon.
    pub fn error_series(&self, horizon: usize) -> Result<&[f64]> {
        column(&self.errors, horizon)
    }
}

fn column(columns: &[Vec<f64>], horizon: usize) -> Result<&[f64]> {
    if horizon == 0 || horizon > columns.len() {
        return Err(RevcastError::IndexOutOfBounds {
            index: horizon,
            size: columns.len(),
        });
    }
    Ok(&columns[horizon - 1])
}
