//! Ordinary least squares via Householder QR.
//!
//! Only what the unit-root regression needs: coefficients, their standard
//! errors, the residual sum of squares and the Gaussian AIC.

use crate::domain::error::SpreadError;

/// Relative size below which a diagonal of R marks a dependent column.
const RANK_TOLERANCE: f64 = 1e-10;

/// Dense row-major design matrix.
#[derive(Debug, Clone)]
pub struct Design {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Design {
    pub fn with_capacity(rows: usize, cols: usize) -> Self {
        Self {
            rows: 0,
            cols,
            data: Vec::with_capacity(rows * cols),
        }
    }

    /// Append one observation. Panics if `row` is not `cols` wide.
    pub fn push_row(&mut self, row: &[f64]) {
        assert_eq!(row.len(), self.cols, "design row width mismatch");
        self.data.extend_from_slice(row);
        self.rows += 1;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.data[r * self.cols + c]
    }
}

#[derive(Debug, Clone)]
pub struct OlsFit {
    pub params: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub ssr: f64,
    pub nobs: usize,
    pub log_likelihood: f64,
    pub aic: f64,
}

impl OlsFit {
    pub fn t_value(&self, i: usize) -> f64 {
        self.params[i] / self.std_errors[i]
    }
}

pub fn fit(y: &[f64], x: &Design) -> Result<OlsFit, SpreadError> {
    let n = x.rows();
    let k = x.cols();
    assert_eq!(y.len(), n, "response length must match design rows");

    if n <= k {
        return Err(SpreadError::InsufficientObservations {
            observations: n,
            required: k + 1,
        });
    }

    // Column-major working copy, reduced in place to R.
    let mut a: Vec<Vec<f64>> = (0..k).map(|c| (0..n).map(|r| x.get(r, c)).collect()).collect();
    let col_norms: Vec<f64> = a.iter().map(|col| norm(col)).collect();
    let mut qty = y.to_vec();

    for j in 0..k {
        let alpha = {
            let tail_norm = norm(&a[j][j..]);
            if a[j][j] > 0.0 { -tail_norm } else { tail_norm }
        };
        let mut v: Vec<f64> = a[j][j..].to_vec();
        v[0] -= alpha;
        let v_norm2: f64 = v.iter().map(|e| e * e).sum();
        if v_norm2 == 0.0 {
            continue;
        }

        for col in a.iter_mut().skip(j) {
            reflect(&v, v_norm2, &mut col[j..]);
        }
        reflect(&v, v_norm2, &mut qty[j..]);
    }

    for j in 0..k {
        if a[j][j].abs() <= RANK_TOLERANCE * col_norms[j] || col_norms[j] == 0.0 {
            return Err(SpreadError::DegenerateSeries {
                reason: format!("design matrix is rank deficient at column {j}"),
            });
        }
    }

    // Back-substitution R b = Q'y.
    let mut params = vec![0.0; k];
    for i in (0..k).rev() {
        let mut acc = qty[i];
        for c in (i + 1)..k {
            acc -= a[c][i] * params[c];
        }
        params[i] = acc / a[i][i];
    }

    let ssr: f64 = (0..n)
        .map(|r| {
            let fitted: f64 = (0..k).map(|c| x.get(r, c) * params[c]).sum();
            let resid = y[r] - fitted;
            resid * resid
        })
        .sum();

    let scale: f64 = y.iter().map(|v| v * v).sum();
    if ssr <= f64::EPSILON * scale.max(f64::MIN_POSITIVE) {
        return Err(SpreadError::DegenerateSeries {
            reason: "regression fits exactly; residual variance is zero".into(),
        });
    }

    // diag((X'X)^-1) = row norms of R^-1.
    let r_inv = invert_upper(&a, k);
    let sigma2 = ssr / (n - k) as f64;
    let std_errors: Vec<f64> = (0..k)
        .map(|i| {
            let row_sq: f64 = (i..k).map(|c| r_inv[i][c] * r_inv[i][c]).sum();
            (sigma2 * row_sq).sqrt()
        })
        .collect();

    let nobs_f = n as f64;
    let log_likelihood =
        -nobs_f / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (ssr / nobs_f).ln() + 1.0);
    let aic = -2.0 * log_likelihood + 2.0 * k as f64;

    Ok(OlsFit {
        params,
        std_errors,
        ssr,
        nobs: n,
        log_likelihood,
        aic,
    })
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|e| e * e).sum::<f64>().sqrt()
}

/// Apply H = I - 2 v v' / (v'v) to `target` in place.
fn reflect(v: &[f64], v_norm2: f64, target: &mut [f64]) {
    let dot: f64 = v.iter().zip(target.iter()).map(|(a, b)| a * b).sum();
    let factor = 2.0 * dot / v_norm2;
    for (t, vi) in target.iter_mut().zip(v) {
        *t -= factor * vi;
    }
}

/// Inverse of the upper-triangular R stored column-major in `a`, returned
/// row-major.
fn invert_upper(a: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
    let mut inv = vec![vec![0.0; k]; k];
    for j in 0..k {
        inv[j][j] = 1.0 / a[j][j];
        for i in (0..j).rev() {
            let mut acc = 0.0;
            for m in (i + 1)..=j {
                acc += a[m][i] * inv[m][j];
            }
            inv[i][j] = -acc / a[i][i];
        }
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn design(rows: &[&[f64]]) -> Design {
        let mut d = Design::with_capacity(rows.len(), rows[0].len());
        for r in rows {
            d.push_row(r);
        }
        d
    }

    #[test]
    fn simple_line_fit() {
        // y = 1 + 2x with residuals +-0.1 alternating.
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = xs
            .iter()
            .enumerate()
            .map(|(i, x)| 1.0 + 2.0 * x + if i % 2 == 0 { 0.1 } else { -0.1 })
            .collect();
        let rows: Vec<[f64; 2]> = xs.iter().map(|&x| [1.0, x]).collect();
        let row_refs: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
        let fit = fit(&y, &design(&row_refs)).unwrap();

        // Closed-form values for this data set.
        let n = 6.0;
        let sx: f64 = xs.iter().sum();
        let sxx: f64 = xs.iter().map(|x| x * x).sum();
        let sy: f64 = y.iter().sum();
        let sxy: f64 = xs.iter().zip(&y).map(|(x, y)| x * y).sum();
        let slope = (n * sxy - sx * sy) / (n * sxx - sx * sx);
        let intercept = (sy - slope * sx) / n;
        assert_relative_eq!(fit.params[1], slope, epsilon = 1e-12);
        assert_relative_eq!(fit.params[0], intercept, epsilon = 1e-12);

        let ssr: f64 = xs
            .iter()
            .zip(&y)
            .map(|(x, y)| (y - intercept - slope * x).powi(2))
            .sum();
        assert_relative_eq!(fit.ssr, ssr, epsilon = 1e-12);

        let sigma2 = ssr / (n - 2.0);
        let mean_x = sx / n;
        let sxx_c: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        assert_relative_eq!(fit.std_errors[1], (sigma2 / sxx_c).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(
            fit.std_errors[0],
            (sigma2 * (1.0 / n + mean_x * mean_x / sxx_c)).sqrt(),
            epsilon = 1e-12
        );

        let llf = -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (ssr / n).ln() + 1.0);
        assert_relative_eq!(fit.log_likelihood, llf, epsilon = 1e-10);
        assert_relative_eq!(fit.aic, -2.0 * llf + 4.0, epsilon = 1e-10);
    }

    #[test]
    fn collinear_columns_are_degenerate() {
        let d = design(&[
            &[1.0, 2.0],
            &[1.0, 2.0],
            &[1.0, 2.0],
            &[1.0, 2.0],
        ]);
        let err = fit(&[1.0, 2.0, 3.0, 4.0], &d).unwrap_err();
        assert!(matches!(err, SpreadError::DegenerateSeries { .. }));
    }

    #[test]
    fn exact_fit_is_degenerate() {
        let d = design(&[&[1.0, 0.0], &[1.0, 1.0], &[1.0, 2.0], &[1.0, 3.0]]);
        let err = fit(&[1.0, 3.0, 5.0, 7.0], &d).unwrap_err();
        assert!(matches!(err, SpreadError::DegenerateSeries { .. }));
    }

    #[test]
    fn too_few_rows() {
        let d = design(&[&[1.0, 0.0], &[1.0, 1.0]]);
        let err = fit(&[1.0, 2.0], &d).unwrap_err();
        assert!(matches!(
            err,
            SpreadError::InsufficientObservations {
                observations: 2,
                required: 3
            }
        ));
    }
}
