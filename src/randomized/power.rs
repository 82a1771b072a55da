use nalgebra::DMatrix;

use crate::dense::{ensure_finite, lu, qr};
use crate::error::Result;
use crate::sparse::SparseProduct;

/// Re-normalization applied after every half-step of the power iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerIterationNormalizer {
    /// Permuted lower factor of a partial-pivoting LU.
    #[default]
    LU,
    /// Householder QR.
    QR,
    None,
}

impl PowerIterationNormalizer {
    pub fn apply(self, block: DMatrix<f64>) -> DMatrix<f64> {
        match self {
            PowerIterationNormalizer::LU => lu::permuted_lower(&block),
            PowerIterationNormalizer::QR => qr::thin_q(&block),
            PowerIterationNormalizer::None => block,
        }
    }
}

/// Runs `n_iter` rounds of `Z = Aᵗ·Y`, `Y = A·Z`.
///
/// The incoming `Y` and every `Z` are normalized before they are multiplied. The
/// last `A·Z` is returned as is: normalizing it cannot change its column space, and
/// the LU normalizer would fill the columns of a rank-deficient block with unit
/// entries that lie outside the range of `A`.
pub fn refine<M: SparseProduct>(
    a: &M,
    mut y: DMatrix<f64>,
    n_iter: usize,
    normalizer: PowerIterationNormalizer,
) -> Result<DMatrix<f64>> {
    for iter in 0..n_iter {
        let z = normalizer.apply(a.transpose_mul_dense(&normalizer.apply(y))?);
        ensure_finite(&z, &format!("power iteration {} (At * Y)", iter + 1))?;

        y = a.mul_dense(&z)?;
        ensure_finite(&y, &format!("power iteration {} (A * Z)", iter + 1))?;

        log::trace!("power iteration {}/{} done", iter + 1, n_iter);
    }
    Ok(y)
}
