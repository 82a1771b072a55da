//! # Exact SVD of small dense matrices
//!
//! The randomized pipeline only ever decomposes the projected `k × n` block
//! `B = Qᵗ·A`, so every backend here works on a dense [`DMatrix`]. All backends
//! return a thin [`DenseSvd`] with singular values sorted in descending order.

use nalgebra::{DMatrix, DVector};

use crate::dense::ensure_finite;
use crate::error::{Result, RsvdError};

#[cfg(feature = "faer")]
pub mod faer;
pub mod jacobi;
#[cfg(feature = "lapack")]
pub mod lapack;

const NALGEBRA_MAX_ITERATIONS: usize = 10_000;

/// Which dense SVD implementation decomposes the projected block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SvdBackend {
    /// Golub-Kahan bidiagonalization with implicit QR sweeps (nalgebra).
    #[default]
    Nalgebra,
    /// One-sided Jacobi rotations.
    Jacobi,
    #[cfg(feature = "faer")]
    Faer,
    #[cfg(feature = "lapack")]
    Lapack,
}

/// Thin SVD `a = u · diag(s) · vt` of a `p × q` matrix, with `d = min(p, q)`.
#[derive(Debug, Clone)]
pub struct DenseSvd {
    /// `p × d`
    pub u: DMatrix<f64>,
    /// `d`, descending, non-negative
    pub s: DVector<f64>,
    /// `d × q`
    pub vt: DMatrix<f64>,
}

impl DenseSvd {
    pub fn compute(a: &DMatrix<f64>, backend: SvdBackend) -> Result<Self> {
        ensure_finite(a, "dense SVD input")?;
        if a.nrows() == 0 || a.ncols() == 0 {
            return Ok(DenseSvd {
                u: DMatrix::zeros(a.nrows(), 0),
                s: DVector::zeros(0),
                vt: DMatrix::zeros(0, a.ncols()),
            });
        }

        let svd = match backend {
            SvdBackend::Nalgebra => Self::nalgebra(a)?,
            SvdBackend::Jacobi => jacobi::JacobiSvd::new().decompose(a)?,
            #[cfg(feature = "faer")]
            SvdBackend::Faer => faer::decompose(a)?,
            #[cfg(feature = "lapack")]
            SvdBackend::Lapack => lapack::decompose(a)?,
        };

        let svd = svd.sorted();
        ensure_finite(&svd.u, "dense SVD left vectors")?;
        ensure_finite(&svd.vt, "dense SVD right vectors")?;
        if svd.s.iter().any(|v| !v.is_finite()) {
            return Err(RsvdError::NumericalInstability(
                "dense SVD produced non-finite singular values".to_string(),
            ));
        }
        Ok(svd)
    }

    fn nalgebra(a: &DMatrix<f64>) -> Result<Self> {
        let svd = a
            .clone()
            .try_svd(true, true, f64::EPSILON, NALGEBRA_MAX_ITERATIONS)
            .ok_or_else(|| {
                RsvdError::NumericalInstability(format!(
                    "dense SVD did not converge within {} iterations",
                    NALGEBRA_MAX_ITERATIONS
                ))
            })?;
        let u = svd
            .u
            .ok_or_else(|| RsvdError::NumericalInstability("SVD U computation failed".to_string()))?;
        let vt = svd
            .v_t
            .ok_or_else(|| RsvdError::NumericalInstability("SVD V_t computation failed".to_string()))?;

        Ok(DenseSvd {
            u,
            s: svd.singular_values,
            vt,
        })
    }

    /// Reorders the triplets by descending singular value.
    fn sorted(self) -> Self {
        let d = self.s.len();
        let mut order: Vec<usize> = (0..d).collect();
        order.sort_by(|&a, &b| self.s[b].total_cmp(&self.s[a]));
        if order.iter().enumerate().all(|(i, &o)| i == o) {
            return self;
        }

        let u = DMatrix::from_fn(self.u.nrows(), d, |i, j| self.u[(i, order[j])]);
        let vt = DMatrix::from_fn(d, self.vt.ncols(), |i, j| self.vt[(order[i], j)]);
        let s = DVector::from_fn(d, |i, _| self.s[order[i]]);
        DenseSvd { u, s, vt }
    }

    pub fn rank(&self) -> usize {
        self.s.len()
    }

    pub fn reconstruct(&self) -> DMatrix<f64> {
        &self.u * DMatrix::from_diagonal(&self.s) * &self.vt
    }
}
