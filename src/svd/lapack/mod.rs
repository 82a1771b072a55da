use nalgebra::DMatrix;

use crate::error::{Result, RsvdError};
use crate::svd::DenseSvd;

/// SVD through LAPACK `gesdd`.
///
/// `nalgebra_lapack::SVD` always returns full square factors, which for the
/// wide `k × n` projected block would mean an `n × n` right factor. The block is
/// therefore first reduced with a QR of its transpose (`aᵗ = Q·R`), the square
/// `k × k` factor `Rᵗ` is decomposed, and the right vectors are lifted through `Q`.
pub fn decompose(a: &DMatrix<f64>) -> Result<DenseSvd> {
    if a.nrows() >= a.ncols() {
        return square_or_tall(a);
    }

    let qr = a.transpose().qr();
    let q = qr.q();
    let r_t = qr.r().transpose();

    let small = square_or_tall(&r_t)?;
    let vt = &small.vt * q.transpose();
    Ok(DenseSvd {
        u: small.u,
        s: small.s,
        vt,
    })
}

fn square_or_tall(a: &DMatrix<f64>) -> Result<DenseSvd> {
    let d = a.ncols();
    let svd = nalgebra_lapack::SVD::new(a.clone()).ok_or_else(|| {
        RsvdError::NumericalInstability("LAPACK SVD did not converge".to_string())
    })?;

    Ok(DenseSvd {
        u: svd.u.columns(0, d).into_owned(),
        s: svd.singular_values,
        vt: svd.vt,
    })
}
