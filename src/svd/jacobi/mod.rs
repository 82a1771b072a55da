//! One-sided (Hestenes) Jacobi SVD.
//!
//! Columns of the working matrix are rotated pairwise until they are mutually
//! orthogonal; their norms are then the singular values. Wide inputs are
//! processed through their transpose so the rotations always act on the
//! shorter dimension.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::error::{Result, RsvdError};

use super::DenseSvd;

pub struct JacobiSvd {
    max_sweeps: usize,
    tolerance: Option<f64>,
}

impl Default for JacobiSvd {
    fn default() -> Self {
        Self::new()
    }
}

impl JacobiSvd {
    pub fn new() -> Self {
        JacobiSvd {
            max_sweeps: 60,
            tolerance: None,
        }
    }

    pub fn max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    /// Relative orthogonality threshold; defaults to `rows · ε`.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn decompose(&self, a: &DMatrix<f64>) -> Result<DenseSvd> {
        let wide = a.nrows() < a.ncols();
        let work = if wide { a.transpose() } else { a.clone() };
        let (rows, cols) = work.shape();

        let mut w: Vec<Vec<f64>> = (0..cols).map(|j| work.column(j).iter().cloned().collect()).collect();
        let mut v: Vec<Vec<f64>> = (0..cols)
            .map(|j| {
                let mut e = vec![0.0; cols];
                e[j] = 1.0;
                e
            })
            .collect();

        let tol = self.tolerance.unwrap_or(rows as f64 * f64::EPSILON);
        let mut converged = false;
        let mut sweeps = 0;
        while sweeps < self.max_sweeps {
            sweeps += 1;
            let mut rotated = false;
            for i in 0..cols.saturating_sub(1) {
                for j in (i + 1)..cols {
                    if let Some((c, s)) = Self::compute_rotation(&w[i], &w[j], tol) {
                        Self::apply_rotation(&mut w, i, j, c, s);
                        Self::apply_rotation(&mut v, i, j, c, s);
                        rotated = true;
                    }
                }
            }
            if !rotated {
                converged = true;
                break;
            }
        }

        if !converged {
            return Err(RsvdError::NumericalInstability(format!(
                "Jacobi SVD did not converge after {} sweeps",
                self.max_sweeps
            )));
        }
        log::trace!("Jacobi SVD of {}x{} converged in {} sweeps", rows, cols, sweeps);

        let sigma: Vec<f64> = w
            .par_iter()
            .map(|col| col.iter().map(|x| x * x).sum::<f64>().sqrt())
            .collect();

        // columns with a zero norm carry no direction and stay zero
        let left = DMatrix::from_fn(rows, cols, |i, j| {
            if sigma[j] > 0.0 {
                w[j][i] / sigma[j]
            } else {
                0.0
            }
        });
        let right = DMatrix::from_fn(cols, cols, |i, j| v[j][i]);
        let s = DVector::from_vec(sigma);

        if wide {
            Ok(DenseSvd {
                u: right,
                s,
                vt: left.transpose(),
            })
        } else {
            Ok(DenseSvd {
                u: left,
                s,
                vt: right.transpose(),
            })
        }
    }

    fn compute_rotation(wi: &[f64], wj: &[f64], tol: f64) -> Option<(f64, f64)> {
        let mut a = 0.0;
        let mut b = 0.0;
        let mut d = 0.0;
        for (x, y) in wi.iter().zip(wj.iter()) {
            a += x * x;
            b += x * y;
            d += y * y;
        }
        if a == 0.0 || d == 0.0 || b.abs() <= tol * (a * d).sqrt() {
            return None;
        }

        let zeta = (d - a) / (2.0 * b);
        let t = if zeta >= 0.0 {
            1.0 / (zeta + (zeta * zeta + 1.0).sqrt())
        } else {
            -1.0 / (-zeta + (zeta * zeta + 1.0).sqrt())
        };
        let c = 1.0 / (1.0 + t * t).sqrt();
        Some((c, t * c))
    }

    fn apply_rotation(cols: &mut [Vec<f64>], i: usize, j: usize, c: f64, s: f64) {
        let (head, tail) = cols.split_at_mut(j);
        for (x, y) in head[i].iter_mut().zip(tail[0].iter_mut()) {
            let xi = *x;
            let yj = *y;
            *x = c * xi - s * yj;
            *y = s * xi + c * yj;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_diagonal_input() {
        let a = DMatrix::from_row_slice(3, 3, &[2.0, 0.0, 0.0, 0.0, -5.0, 0.0, 0.0, 0.0, 1.0]);
        let svd = JacobiSvd::new().decompose(&a).unwrap();

        let mut s: Vec<f64> = svd.s.iter().cloned().collect();
        s.sort_by(|a, b| b.total_cmp(a));
        assert_eq!(s, vec![5.0, 2.0, 1.0]);

        let reconstructed = svd.reconstruct();
        for (r, o) in reconstructed.iter().zip(a.iter()) {
            assert_abs_diff_eq!(*r, *o, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_tall_and_wide_agree() {
        let a = DMatrix::from_row_slice(4, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let tall = JacobiSvd::new().decompose(&a).unwrap();
        let wide = JacobiSvd::new().decompose(&a.transpose()).unwrap();

        assert_eq!(tall.u.shape(), (4, 2));
        assert_eq!(tall.vt.shape(), (2, 2));
        assert_eq!(wide.u.shape(), (2, 2));
        assert_eq!(wide.vt.shape(), (2, 4));

        let mut s_tall: Vec<f64> = tall.s.iter().cloned().collect();
        let mut s_wide: Vec<f64> = wide.s.iter().cloned().collect();
        s_tall.sort_by(|a, b| b.total_cmp(a));
        s_wide.sort_by(|a, b| b.total_cmp(a));
        for (x, y) in s_tall.iter().zip(s_wide.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(s_tall[0], 14.2690954, epsilon = 1e-6);
        assert_abs_diff_eq!(s_tall[1], 0.6268282, epsilon = 1e-6);
    }

    #[test]
    fn test_rank_deficient_input() {
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0]);
        let svd = JacobiSvd::new().decompose(&a).unwrap();

        let reconstructed = svd.reconstruct();
        for (r, o) in reconstructed.iter().zip(a.iter()) {
            assert_abs_diff_eq!(*r, *o, epsilon = 1e-12);
        }
        let smallest = svd.s.iter().cloned().fold(f64::INFINITY, f64::min);
        assert!(smallest < 1e-12);
    }

    #[test]
    fn test_sweep_limit() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let err = JacobiSvd::new().max_sweeps(0).decompose(&a).unwrap_err();
        assert!(matches!(err, RsvdError::NumericalInstability(_)));
    }
}
