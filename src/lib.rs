//! Randomized truncated SVD of large sparse matrices.
//!
//! A sparse `m × n` matrix is built from coordinate triplets into CSR storage and
//! factorized as `A ≈ P · diag(σ) · Vᵗ` by [`RandomizedSvd`], without ever being
//! densified.
//!
//! ```ignore
//! use sparse_rsvd::{from_triplets, RandomizedSvdBuilder};
//!
//! let a = from_triplets(4, 4, &[(0, 0, 1.0), (1, 1, 1.0), (2, 2, 1.0), (3, 3, 1.0)])?;
//! let factors = RandomizedSvdBuilder::new().n_components(2).build().fit(&a)?;
//! ```

pub mod config;
pub mod dense;
pub mod error;
pub mod io;
pub mod randomized;
pub mod sparse;
pub mod svd;

pub use error::{Result, RsvdError};
pub use randomized::{
    Diagnostics, Factorization, PowerIterationNormalizer, RandomizedSvd, RandomizedSvdBuilder,
    TransposeMode,
};
pub use sparse::{from_columns, from_triplets, SparseProduct, Triplet};
pub use svd::SvdBackend;
