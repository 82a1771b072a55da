use thiserror::Error;

/// Failures of the randomized SVD pipeline.
///
/// `InsufficientRank` is never returned by [`crate::randomized::RandomizedSvd::fit`];
/// a collapsed sketch is logged as a warning and the factorization is delivered
/// at the rank that is actually available.
#[derive(Debug, Error)]
pub enum RsvdError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("entry ({row}, {col}) lies outside the declared {nrows}x{ncols} shape")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    },

    #[error("sketch spans {available} independent directions but rank {requested} was requested")]
    InsufficientRank { requested: usize, available: usize },

    #[error("numerical instability: {0}")]
    NumericalInstability(String),
}

pub type Result<T> = std::result::Result<T, RsvdError>;
