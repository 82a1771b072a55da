//! # Sparse matrix construction and sparse-dense products
//!
//! The input matrix is held as a [`CsrMatrix<f64>`] for its whole lifetime. It is built
//! once from coordinate triplets and then only read through [`SparseProduct`], so the
//! randomized SVD never materializes it as a dense array.

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{Result, RsvdError};

pub mod csr;

/// A `(row, column, value)` coordinate entry.
pub type Triplet = (usize, usize, f64);

/// Products of a sparse matrix `A` with dense blocks.
pub trait SparseProduct {
    /// `A · X`
    fn mul_dense(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>>;

    /// `Aᵗ · X`
    fn transpose_mul_dense(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>>;

    /// `Qᵗ · A`, the projection of `A` onto the columns of `q`.
    fn dense_transpose_mul(&self, q: &DMatrix<f64>) -> Result<DMatrix<f64>>;

    fn frobenius_norm(&self) -> f64;
}

/// Builds an `nrows × ncols` CSR matrix from coordinate triplets.
///
/// Every coordinate is checked against the declared shape before anything is
/// allocated. Duplicate coordinates are summed.
pub fn from_triplets(nrows: usize, ncols: usize, triplets: &[Triplet]) -> Result<CsrMatrix<f64>> {
    let mut rows = Vec::with_capacity(triplets.len());
    let mut cols = Vec::with_capacity(triplets.len());
    let mut vals = Vec::with_capacity(triplets.len());
    for &(row, col, value) in triplets {
        rows.push(row);
        cols.push(col);
        vals.push(value);
    }
    from_columns(nrows, ncols, rows, cols, vals)
}

/// Same as [`from_triplets`] for data that is already split into index and value columns.
pub fn from_columns(
    nrows: usize,
    ncols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
) -> Result<CsrMatrix<f64>> {
    if rows.len() != cols.len() || rows.len() != values.len() {
        return Err(RsvdError::InvalidArgument(format!(
            "triplet columns differ in length: {} rows, {} cols, {} values",
            rows.len(),
            cols.len(),
            values.len()
        )));
    }

    for ((&row, &col), &value) in rows.iter().zip(cols.iter()).zip(values.iter()) {
        if row >= nrows || col >= ncols {
            return Err(RsvdError::IndexOutOfBounds {
                row,
                col,
                nrows,
                ncols,
            });
        }
        if !value.is_finite() {
            return Err(RsvdError::NumericalInstability(format!(
                "non-finite value {} at ({}, {})",
                value, row, col
            )));
        }
    }

    let nnz = values.len();
    let coo = CooMatrix::try_from_triplets(nrows, ncols, rows, cols, values)
        .map_err(|e| RsvdError::InvalidArgument(format!("invalid coordinate data: {}", e)))?;
    let csr = CsrMatrix::from(&coo);

    log::debug!(
        "Built {}x{} CSR matrix from {} triplets ({} stored entries)",
        nrows,
        ncols,
        nnz,
        csr.nnz()
    );

    Ok(csr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_triplets_shape_and_values() {
        let csr = from_triplets(3, 4, &[(0, 1, 2.0), (2, 3, -1.5), (1, 0, 4.0)]).unwrap();

        assert_eq!(csr.nrows(), 3);
        assert_eq!(csr.ncols(), 4);
        assert_eq!(csr.nnz(), 3);
        assert_eq!(csr.row_offsets(), &[0, 1, 2, 3]);
        assert_eq!(csr.col_indices(), &[1, 0, 3]);
        assert_eq!(csr.values(), &[2.0, 4.0, -1.5]);
    }

    #[test]
    fn test_duplicates_accumulate() {
        let csr = from_triplets(2, 2, &[(0, 0, 1.0), (0, 0, 2.5), (1, 1, 1.0)]).unwrap();

        assert_eq!(csr.nnz(), 2);
        let entry = csr.get_entry(0, 0).unwrap().into_value();
        assert_eq!(entry, 3.5);
    }

    #[test]
    fn test_row_out_of_bounds() {
        let err = from_triplets(4, 4, &[(0, 0, 1.0), (4, 1, 1.0)]).unwrap_err();
        assert!(matches!(
            err,
            RsvdError::IndexOutOfBounds {
                row: 4,
                col: 1,
                nrows: 4,
                ncols: 4
            }
        ));
    }

    #[test]
    fn test_col_out_of_bounds() {
        let err = from_triplets(4, 3, &[(1, 3, 1.0)]).unwrap_err();
        assert!(matches!(err, RsvdError::IndexOutOfBounds { col: 3, .. }));
    }

    #[test]
    fn test_mismatched_columns() {
        let err = from_columns(2, 2, vec![0, 1], vec![0], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, RsvdError::InvalidArgument(_)));
    }

    #[test]
    fn test_non_finite_value() {
        let err = from_triplets(2, 2, &[(0, 0, f64::NAN)]).unwrap_err();
        assert!(matches!(err, RsvdError::NumericalInstability(_)));
    }

    #[test]
    fn test_empty_matrix() {
        let csr = from_triplets(3, 2, &[]).unwrap();
        assert_eq!(csr.nnz(), 0);
        assert_eq!(csr.nrows(), 3);
        assert_eq!(csr.ncols(), 2);
    }
}
