//! Newey-West HAC covariance for OLS coefficients.
//!
//! The sandwich estimator `(XᵀX)⁻¹ · S · (XᵀX)⁻¹` where the meat `S`
//! accumulates Bartlett-weighted autocovariances of the score vectors
//! `g_t = x_t·u_t`:
//!
//! ```text
//! S = Σ_t g_t g_tᵀ + Σ_{l=1}^{L} w_l Σ_{t>l} (g_t g_{t-l}ᵀ + g_{t-l} g_tᵀ)
//! w_l = 1 − l/(L+1)
//! ```
//!
//! The lag truncation `L` is fixed by configuration (6 for monthly panels,
//! 1 for annual), not chosen by a plug-in rule. Rows must arrive in
//! chronological order; the residual autocovariances are meaningless
//! otherwise.

/// Bartlett kernel weight for `lag` at truncation `max_lag`.
pub fn bartlett_weight(lag: usize, max_lag: usize) -> f64 {
    if lag == 0 {
        1.0
    } else if lag <= max_lag {
        1.0 - lag as f64 / (max_lag as f64 + 1.0)
    } else {
        0.0
    }
}

/// HAC covariance of OLS coefficients.
///
/// `rows` is the row-major design in chronological order, `residuals` the
/// matching OLS residuals, `xtx_inv` the bread `(XᵀX)⁻¹`, `lag` the Bartlett
/// truncation. The truncation is clamped to `n − 1`.
pub fn newey_west_cov(
    rows: &[Vec<f64>],
    residuals: &[f64],
    xtx_inv: &[Vec<f64>],
    lag: usize,
) -> Vec<Vec<f64>> {
    let n = rows.len();
    let k = xtx_inv.len();
    let max_lag = lag.min(n.saturating_sub(1));

    // score vectors g_t = x_t * u_t
    let scores: Vec<Vec<f64>> = rows
        .iter()
        .zip(residuals)
        .map(|(row, &u)| row.iter().map(|&x| x * u).collect())
        .collect();

    let mut meat = vec![vec![0.0; k]; k];
    for g in &scores {
        for i in 0..k {
            for j in 0..k {
                meat[i][j] += g[i] * g[j];
            }
        }
    }
    for l in 1..=max_lag {
        let w = bartlett_weight(l, max_lag);
        for t in l..n {
            let (g_t, g_lag) = (&scores[t], &scores[t - l]);
            for i in 0..k {
                for j in 0..k {
                    meat[i][j] += w * (g_t[i] * g_lag[j] + g_lag[i] * g_t[j]);
                }
            }
        }
    }

    // sandwich: bread * meat * bread
    let mut half = vec![vec![0.0; k]; k];
    for i in 0..k {
        for j in 0..k {
            for m in 0..k {
                half[i][j] += xtx_inv[i][m] * meat[m][j];
            }
        }
    }
    let mut cov = vec![vec![0.0; k]; k];
    for i in 0..k {
        for j in 0..k {
            for m in 0..k {
                cov[i][j] += half[i][m] * xtx_inv[m][j];
            }
        }
    }
    cov
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bartlett_weights_decline_linearly() {
        assert_relative_eq!(bartlett_weight(0, 4), 1.0);
        assert_relative_eq!(bartlett_weight(1, 4), 0.8);
        assert_relative_eq!(bartlett_weight(4, 4), 0.2);
        assert_relative_eq!(bartlett_weight(5, 4), 0.0);
    }

    #[test]
    fn zero_lag_matches_white_covariance() {
        // constant-only design: variance of the mean with White weights
        let rows: Vec<Vec<f64>> = (0..4).map(|_| vec![1.0]).collect();
        let residuals = vec![1.0, -1.0, 2.0, -2.0];
        let xtx_inv = vec![vec![0.25]];

        let cov = newey_west_cov(&rows, &residuals, &xtx_inv, 0);
        // (1/16) * sum(u^2) = 10/16
        assert_relative_eq!(cov[0][0], 10.0 / 16.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_residuals_give_zero_covariance() {
        let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![1.0, i as f64]).collect();
        let residuals = vec![0.0; 6];
        let xtx_inv = vec![vec![0.5, -0.1], vec![-0.1, 0.05]];

        let cov = newey_west_cov(&rows, &residuals, &xtx_inv, 3);
        for row in &cov {
            for &v in row {
                assert_relative_eq!(v, 0.0, epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn positive_autocorrelation_inflates_variance() {
        // AR(1)-ish residual pattern: HAC variance should exceed the
        // lag-0 (White) variance for a constant-only design
        let n = 40;
        let rows: Vec<Vec<f64>> = (0..n).map(|_| vec![1.0]).collect();
        let mut residuals = vec![0.0; n];
        residuals[0] = 1.0;
        for t in 1..n {
            residuals[t] = 0.8 * residuals[t - 1] + if t % 2 == 0 { 0.3 } else { -0.2 };
        }
        let mean = residuals.iter().sum::<f64>() / n as f64;
        for u in residuals.iter_mut() {
            *u -= mean;
        }
        let xtx_inv = vec![vec![1.0 / n as f64]];

        let white = newey_west_cov(&rows, &residuals, &xtx_inv, 0);
        let hac = newey_west_cov(&rows, &residuals, &xtx_inv, 6);
        assert!(hac[0][0] > white[0][0]);
    }

    #[test]
    fn lag_is_clamped_to_sample_size() {
        let rows: Vec<Vec<f64>> = (0..3).map(|_| vec![1.0]).collect();
        let residuals = vec![0.5, -0.5, 0.25];
        let xtx_inv = vec![vec![1.0 / 3.0]];
        // lag far beyond n must not panic
        let cov = newey_west_cov(&rows, &residuals, &xtx_inv, 100);
        assert!(cov[0][0].is_finite());
    }

    #[test]
    fn covariance_is_symmetric() {
        let rows: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![1.0, (i as f64).sin(), (i as f64) * 0.1])
            .collect();
        let residuals: Vec<f64> = (0..10).map(|i| ((i * 7 % 5) as f64 - 2.0) * 0.1).collect();
        let xtx = crate::regress::ols::cross_product(&rows);
        let xtx_inv = crate::regress::ols::inverse_spd(&xtx).unwrap();

        let cov = newey_west_cov(&rows, &residuals, &xtx_inv, 2);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(cov[i][j], cov[j][i], epsilon = 1e-10);
            }
        }
    }
}
