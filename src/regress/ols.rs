//! Small dense linear algebra for the normal equations.
//!
//! Cholesky factorization of the symmetric positive definite cross-product
//! matrix, solve, and inverse. Dimensions here are tiny (a handful of
//! regressors), so plain nested vectors are the right tool.

/// Cholesky factor L of a symmetric positive definite matrix, `A = L·Lᵀ`.
/// Returns `None` when the matrix is not positive definite.
pub fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    if n == 0 || a.iter().any(|row| row.len() != n) {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }
    Some(l)
}

/// Solve `A·x = b` for symmetric positive definite `A` via Cholesky.
pub fn solve_spd(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let l = cholesky(a)?;
    Some(solve_with_factor(&l, b))
}

/// Inverse of a symmetric positive definite matrix via its Cholesky factor.
pub fn inverse_spd(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let l = cholesky(a)?;
    let mut inv = vec![vec![0.0; n]; n];
    for j in 0..n {
        let mut e = vec![0.0; n];
        e[j] = 1.0;
        let column = solve_with_factor(&l, &e);
        for i in 0..n {
            inv[i][j] = column[i];
        }
    }
    Some(inv)
}

fn solve_with_factor(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    // forward substitution: L·z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * z[j];
        }
        z[i] = sum / l[i][i];
    }

    // backward substitution: Lᵀ·x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = z[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }
    x
}

/// Cross-product matrix `XᵀX` from a row-major design.
pub fn cross_product(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let k = rows.first().map(Vec::len).unwrap_or(0);
    let mut xtx = vec![vec![0.0; k]; k];
    for row in rows {
        for i in 0..k {
            for j in 0..=i {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in (i + 1)..k {
            xtx[i][j] = xtx[j][i];
        }
    }
    xtx
}

/// Moment vector `Xᵀy`.
pub fn moment_vector(rows: &[Vec<f64>], y: &[f64]) -> Vec<f64> {
    let k = rows.first().map(Vec::len).unwrap_or(0);
    let mut xty = vec![0.0; k];
    for (row, &yi) in rows.iter().zip(y) {
        for j in 0..k {
            xty[j] += row[j] * yi;
        }
    }
    xty
}
