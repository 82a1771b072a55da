//! Dense helpers shared by the randomized SVD stages.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use nshare::IntoNdarray2;

use crate::error::{Result, RsvdError};

pub mod lu;
pub mod qr;

/// Fails with `NumericalInstability` if any entry of `m` is NaN or infinite.
pub fn ensure_finite(m: &DMatrix<f64>, stage: &str) -> Result<()> {
    if let Some(pos) = m.iter().position(|v| !v.is_finite()) {
        let rows = m.nrows().max(1);
        return Err(RsvdError::NumericalInstability(format!(
            "{}: non-finite value at ({}, {})",
            stage,
            pos % rows,
            pos / rows
        )));
    }
    Ok(())
}

/// Largest absolute entry of `QᵗQ - I`.
pub fn orthogonality_error(q: &DMatrix<f64>) -> f64 {
    let gram = q.tr_mul(q);
    let mut worst = 0.0f64;
    for j in 0..gram.ncols() {
        for i in 0..gram.nrows() {
            let target = if i == j { 1.0 } else { 0.0 };
            worst = worst.max((gram[(i, j)] - target).abs());
        }
    }
    worst
}

/// Deterministic sign convention for singular vectors.
///
/// Each column of `u` is flipped so that its largest-magnitude entry is positive,
/// and the matching row of `vt` is flipped with it, leaving `u·diag(s)·vt` unchanged.
pub fn svd_flip(u: &mut DMatrix<f64>, vt: &mut DMatrix<f64>) {
    let ncols = u.ncols();
    for j in 0..ncols {
        let mut max_abs = 0.0;
        let mut max_idx = 0;
        for i in 0..u.nrows() {
            let abs_val = u[(i, j)].abs();
            if abs_val > max_abs {
                max_abs = abs_val;
                max_idx = i;
            }
        }

        if u[(max_idx, j)] < 0.0 {
            u.column_mut(j).neg_mut();
            if j < vt.nrows() {
                vt.row_mut(j).neg_mut();
            }
        }
    }
}

pub(crate) fn into_array2(m: DMatrix<f64>) -> Array2<f64> {
    m.into_ndarray2()
}

pub(crate) fn into_array1(v: DVector<f64>) -> Array1<f64> {
    Array1::from(v.as_slice().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ensure_finite() {
        let mut m = DMatrix::from_element(3, 2, 1.0);
        assert!(ensure_finite(&m, "test").is_ok());

        m[(2, 1)] = f64::INFINITY;
        let err = ensure_finite(&m, "stage x").unwrap_err();
        match err {
            RsvdError::NumericalInstability(msg) => {
                assert!(msg.contains("stage x"));
                assert!(msg.contains("(2, 1)"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_orthogonality_error() {
        let identity = DMatrix::<f64>::identity(4, 3);
        assert_eq!(orthogonality_error(&identity), 0.0);

        let scaled = identity * 2.0;
        assert_abs_diff_eq!(orthogonality_error(&scaled), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_svd_flip() {
        let mut u = DMatrix::from_row_slice(2, 2, &[-3.0, 1.0, 1.0, 2.0]);
        let mut vt = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let before = &u * &vt;

        svd_flip(&mut u, &mut vt);

        assert_eq!(u[(0, 0)], 3.0);
        assert_eq!(u[(1, 0)], -1.0);
        assert_eq!(u[(1, 1)], 2.0);
        assert_eq!(vt.row(0).iter().cloned().collect::<Vec<_>>(), vec![-1.0, -2.0, -3.0]);
        assert_eq!(vt.row(1).iter().cloned().collect::<Vec<_>>(), vec![4.0, 5.0, 6.0]);

        let after = &u * &vt;
        for (a, b) in before.iter().zip(after.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_into_array2_keeps_layout() {
        let m = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let a = into_array2(m);
        assert_eq!(a.shape(), &[2, 3]);
        assert_eq!(a[[0, 2]], 3.0);
        assert_eq!(a[[1, 0]], 4.0);
    }
}
