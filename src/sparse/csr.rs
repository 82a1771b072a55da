use nalgebra::DMatrix;
use nalgebra_sparse::CsrMatrix;
use rayon::prelude::*;

use crate::error::{Result, RsvdError};

use super::SparseProduct;

fn check_inner_dim(expected: usize, got: usize, op: &str) -> Result<()> {
    if expected != got {
        return Err(RsvdError::InvalidArgument(format!(
            "{}: inner dimensions differ ({} vs {})",
            op, expected, got
        )));
    }
    Ok(())
}

impl SparseProduct for CsrMatrix<f64> {
    fn mul_dense(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        check_inner_dim(self.ncols(), x.nrows(), "A * X")?;

        let m = self.nrows();
        let k = x.ncols();
        let mut out = vec![0.0; m * k];
        if m == 0 || k == 0 {
            return Ok(DMatrix::from_vec(m, k, out));
        }

        let offsets = self.row_offsets();
        let indices = self.col_indices();
        let values = self.values();

        // One output column per task; within a column every row is a fixed-order dot product.
        out.par_chunks_mut(m).enumerate().for_each(|(j, col)| {
            let xj = x.column(j);
            for (i, slot) in col.iter_mut().enumerate() {
                let mut acc = 0.0;
                for idx in offsets[i]..offsets[i + 1] {
                    acc += values[idx] * xj[indices[idx]];
                }
                *slot = acc;
            }
        });

        Ok(DMatrix::from_vec(m, k, out))
    }

    fn transpose_mul_dense(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        check_inner_dim(self.nrows(), x.nrows(), "At * X")?;

        let n = self.ncols();
        let k = x.ncols();
        let mut out = vec![0.0; n * k];
        if n == 0 || k == 0 {
            return Ok(DMatrix::from_vec(n, k, out));
        }

        let offsets = self.row_offsets();
        let indices = self.col_indices();
        let values = self.values();

        out.par_chunks_mut(n).enumerate().for_each(|(j, col)| {
            let xj = x.column(j);
            for i in 0..self.nrows() {
                let xi = xj[i];
                if xi == 0.0 {
                    continue;
                }
                for idx in offsets[i]..offsets[i + 1] {
                    col[indices[idx]] += values[idx] * xi;
                }
            }
        });

        Ok(DMatrix::from_vec(n, k, out))
    }

    fn dense_transpose_mul(&self, q: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        check_inner_dim(self.nrows(), q.nrows(), "Qt * A")?;
        Ok(self.transpose_mul_dense(q)?.transpose())
    }

    fn frobenius_norm(&self) -> f64 {
        self.values().iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}
