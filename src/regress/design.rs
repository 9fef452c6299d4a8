//! Named-regressor design construction.
//!
//! A design is assembled from period-ordered columns; the valid-sample mask
//! is computed directly from the missingness of the dependent and independent
//! columns, never by fitting and discarding a throwaway model. Row order is
//! preserved, which downstream HAC estimation relies on.

use crate::core::is_missing;
use crate::error::{Result, RevcastError};

/// A regression design: response and regressors restricted to rows where
/// every column is observed, in original (chronological) row order.
#[derive(Debug, Clone)]
pub struct Design {
    response_name: String,
    names: Vec<String>,
    /// Row-major design matrix, `x[i][j]` = regressor `j` at kept row `i`.
    x: Vec<Vec<f64>>,
    y: Vec<f64>,
    /// Indices into the original columns that survived the mask.
    kept_rows: Vec<usize>,
}

/// Builder collecting named columns of equal length.
#[derive(Debug, Clone)]
pub struct DesignBuilder {
    response_name: String,
    response: Vec<f64>,
    intercept: bool,
    terms: Vec<(String, Vec<f64>)>,
}

impl DesignBuilder {
    pub fn new(response_name: impl Into<String>, response: &[f64]) -> Self {
        Self {
            response_name: response_name.into(),
            response: response.to_vec(),
            intercept: true,
            terms: Vec::new(),
        }
    }

    /// Drop the intercept column (used by the no-intercept combination fit).
    pub fn without_intercept(mut self) -> Self {
        self.intercept = false;
        self
    }

    /// Add a named regressor column.
    pub fn term(mut self, name: impl Into<String>, values: &[f64]) -> Self {
        self.terms.push((name.into(), values.to_vec()));
        self
    }

    /// Compute the valid-sample mask and assemble the design.
    pub fn build(self) -> Result<Design> {
        let n = self.response.len();
        if n == 0 {
            return Err(RevcastError::EmptyData);
        }
        for (name, column) in &self.terms {
            if column.len() != n {
                log::debug!("regressor '{name}' length mismatch");
                return Err(RevcastError::DimensionMismatch {
                    expected: n,
                    got: column.len(),
                });
            }
        }

        let kept_rows: Vec<usize> = (0..n)
            .filter(|&i| {
                !is_missing(self.response[i])
                    && self.terms.iter().all(|(_, col)| !is_missing(col[i]))
            })
            .collect();

        if kept_rows.is_empty() {
            return Err(RevcastError::EmptyData);
        }

        let mut names = Vec::with_capacity(self.terms.len() + 1);
        if self.intercept {
            names.push("const".to_string());
        }
        names.extend(self.terms.iter().map(|(name, _)| name.clone()));

        let x: Vec<Vec<f64>> = kept_rows
            .iter()
            .map(|&i| {
                let mut row = Vec::with_capacity(names.len());
                if self.intercept {
                    row.push(1.0);
                }
                row.extend(self.terms.iter().map(|(_, col)| col[i]));
                row
            })
            .collect();
        let y: Vec<f64> = kept_rows.iter().map(|&i| self.response[i]).collect();

        Ok(Design {
            response_name: self.response_name,
            names,
            x,
            y,
            kept_rows,
        })
    }
}

impl Design {
    /// Number of kept observations.
    pub fn nobs(&self) -> usize {
        self.y.len()
    }

    /// Number of regressors including the intercept when present.
    pub fn nparams(&self) -> usize {
        self.names.len()
    }

    pub fn response_name(&self) -> &str {
        &self.response_name
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.x
    }

    pub fn response(&self) -> &[f64] {
        &self.y
    }

    /// Original row indices that survived the valid-sample mask.
    pub fn kept_rows(&self) -> &[usize] {
        &self.kept_rows
    }
}
