use nalgebra::DMatrix;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::dense::ensure_finite;
use crate::error::Result;
use crate::sparse::SparseProduct;

/// Draws the `rows × cols` Gaussian test matrix `Ω`.
///
/// Entries are drawn column by column from a ChaCha8 stream, so a narrower test
/// matrix with the same seed is exactly the leading columns of a wider one.
pub fn gaussian_test_matrix(rows: usize, cols: usize, seed: u64) -> DMatrix<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(rows * cols);
    for _ in 0..cols {
        for _ in 0..rows {
            let value: f64 = StandardNormal.sample(&mut rng);
            data.push(value);
        }
    }
    DMatrix::from_vec(rows, cols, data)
}

/// `Y₀ = A · Ω` for a freshly drawn `Ω` of width `width`.
pub fn sketch<M: SparseProduct>(a: &M, ncols: usize, width: usize, seed: u64) -> Result<DMatrix<f64>> {
    let omega = gaussian_test_matrix(ncols, width, seed);
    let y = a.mul_dense(&omega)?;
    ensure_finite(&y, "random projection")?;
    Ok(y)
}
