use faer_ext::*;
use nalgebra::{DMatrix, DVector};
use nshare::{IntoNalgebra, IntoNdarray2};

use crate::error::Result;
use crate::svd::DenseSvd;

/// Thin SVD through faer.
pub fn decompose(a: &DMatrix<f64>) -> Result<DenseSvd> {
    let array = a.clone().into_ndarray2();
    let faer_mat = array.view().into_faer();
    let svd = faer_mat.thin_svd();

    let u = svd.u().into_ndarray().to_owned().into_nalgebra();
    let s = DVector::from_iterator(
        svd.s_diagonal().nrows(),
        svd.s_diagonal().iter().cloned(),
    );
    let vt = svd.v().transpose().into_ndarray().to_owned().into_nalgebra();

    Ok(DenseSvd { u, s, vt })
}
