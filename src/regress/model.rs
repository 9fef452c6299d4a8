//! HAC-robust OLS fitting and fitted-model summaries.

use crate::error::{Result, RevcastError};
use crate::regress::design::Design;
use crate::regress::hac::newey_west_cov;
use crate::regress::ols::{cross_product, inverse_spd, moment_vector, solve_spd};
use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};

/// A fitted linear model with Newey-West standard errors.
#[derive(Debug, Clone)]
pub struct FittedRegression {
    response: String,
    names: Vec<String>,
    coefficients: Vec<f64>,
    std_errors: Vec<f64>,
    t_stats: Vec<f64>,
    p_values: Vec<f64>,
    covariance: Vec<Vec<f64>>,
    residuals: Vec<f64>,
    nobs: usize,
    hac_lag: usize,
}

/// A Wald joint test on a coefficient subset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaldTest {
    /// Chi-square statistic.
    pub statistic: f64,
    /// Degrees of freedom (number of restrictions).
    pub df: usize,
    pub p_value: f64,
}

/// Fit OLS on a design and compute Newey-West covariance at the given lag
/// truncation.
///
/// Rows must be in chronological order (the design preserves input order,
/// and panels store periods sorted, so this holds by construction; it is
/// asserted here because HAC autocovariances are silently wrong otherwise).
pub fn fit_hac(design: &Design, hac_lag: usize) -> Result<FittedRegression> {
    let n = design.nobs();
    let k = design.nparams();
    if k == 0 {
        return Err(RevcastError::InvalidParameter(
            "design has no regressors".to_string(),
        ));
    }
    if n < k {
        return Err(RevcastError::InsufficientData { needed: k, got: n });
    }
    debug_assert!(
        design.kept_rows().windows(2).all(|w| w[0] < w[1]),
        "design rows must stay in chronological order for HAC estimation"
    );

    let rows = design.rows();
    let y = design.response();

    let xtx = cross_product(rows);
    let coefficients = solve_spd(&xtx, &moment_vector(rows, y)).ok_or_else(|| {
        RevcastError::Degenerate(format!(
            "singular design for response '{}' ({:?})",
            design.response_name(),
            design.names()
        ))
    })?;
    let xtx_inv = inverse_spd(&xtx).ok_or_else(|| {
        RevcastError::Degenerate(format!(
            "cross-product not invertible for response '{}'",
            design.response_name()
        ))
    })?;

    let residuals: Vec<f64> = rows
        .iter()
        .zip(y)
        .map(|(row, &yi)| {
            let fitted: f64 = row.iter().zip(&coefficients).map(|(x, b)| x * b).sum();
            yi - fitted
        })
        .collect();

    let covariance = newey_west_cov(rows, &residuals, &xtx_inv, hac_lag);

    let std_errors: Vec<f64> = (0..k).map(|j| covariance[j][j].max(0.0).sqrt()).collect();
    let t_stats: Vec<f64> = coefficients
        .iter()
        .zip(&std_errors)
        .map(|(&b, &se)| {
            if se > 0.0 {
                b / se
            } else if b == 0.0 {
                0.0
            } else {
                f64::INFINITY.copysign(b)
            }
        })
        .collect();

    let df = n.saturating_sub(k);
    let p_values: Vec<f64> = t_stats.iter().map(|&t| student_p(t, df)).collect();

    Ok(FittedRegression {
        response: design.response_name().to_string(),
        names: design.names().to_vec(),
        coefficients,
        std_errors,
        t_stats,
        p_values,
        covariance,
        residuals,
        nobs: n,
        hac_lag,
    })
}

/// Two-sided p-value of a t-statistic with `df` degrees of freedom.
fn student_p(t: f64, df: usize) -> f64 {
    if df == 0 {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    if t.is_nan() {
        return f64::NAN;
    }
    match StudentsT::new(0.0, 1.0, df as f64) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
        Err(_) => f64::NAN,
    }
}

impl FittedRegression {
    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn std_errors(&self) -> &[f64] {
        &self.std_errors
    }

    pub fn t_stats(&self) -> &[f64] {
        &self.t_stats
    }

    pub fn p_values(&self) -> &[f64] {
        &self.p_values
    }

    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    pub fn nobs(&self) -> usize {
        self.nobs
    }

    pub fn hac_lag(&self) -> usize {
        self.hac_lag
    }

    /// Coefficient by regressor name.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|j| self.coefficients[j])
    }

    /// t-statistic by regressor name.
    pub fn t_stat(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|j| self.t_stats[j])
    }

    /// Wald chi-square test that the named coefficients are jointly zero.
    pub fn wald_joint(&self, names: &[&str]) -> Result<WaldTest> {
        let indices: Vec<usize> = names
            .iter()
            .map(|name| {
                self.names
                    .iter()
                    .position(|n| n == name)
                    .ok_or_else(|| {
                        RevcastError::InvalidParameter(format!("unknown regressor '{name}'"))
                    })
            })
            .collect::<Result<_>>()?;

        let q = indices.len();
        let sub_cov: Vec<Vec<f64>> = indices
            .iter()
            .map(|&i| indices.iter().map(|&j| self.covariance[i][j]).collect())
            .collect();
        let sub_inv = inverse_spd(&sub_cov).ok_or_else(|| {
            RevcastError::Degenerate(format!(
                "HAC covariance singular in joint test for '{}'",
                self.response
            ))
        })?;
        let b: Vec<f64> = indices.iter().map(|&i| self.coefficients[i]).collect();

        let mut statistic = 0.0;
        for i in 0..q {
            for j in 0..q {
                statistic += b[i] * sub_inv[i][j] * b[j];
            }
        }

        let p_value = match ChiSquared::new(q as f64) {
            Ok(dist) => 1.0 - dist.cdf(statistic),
            Err(_) => f64::NAN,
        };

        Ok(WaldTest {
            statistic,
            df: q,
            p_value,
        })
    }
}
