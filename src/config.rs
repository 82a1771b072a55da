//! Command line configuration of the batch tool.
//!
//! Flags mirror the batch invocation `-r RANK -i ITER -d DIR -f FILE --shape ROWS COLS`.
//! Rank and iteration counts are parsed as signed integers so that a negative value
//! is reported as an invalid argument rather than a parse failure.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::{Result, RsvdError};
use crate::randomized::{PowerIterationNormalizer, RandomizedSvdBuilder};
use crate::svd::SvdBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NormalizerArg {
    Lu,
    Qr,
    None,
}

impl From<NormalizerArg> for PowerIterationNormalizer {
    fn from(arg: NormalizerArg) -> Self {
        match arg {
            NormalizerArg::Lu => PowerIterationNormalizer::LU,
            NormalizerArg::Qr => PowerIterationNormalizer::QR,
            NormalizerArg::None => PowerIterationNormalizer::None,
        }
    }
}

fn parse_backend(name: &str) -> std::result::Result<SvdBackend, String> {
    match name.to_ascii_lowercase().as_str() {
        "nalgebra" => Ok(SvdBackend::Nalgebra),
        "jacobi" => Ok(SvdBackend::Jacobi),
        #[cfg(feature = "faer")]
        "faer" => Ok(SvdBackend::Faer),
        #[cfg(feature = "lapack")]
        "lapack" => Ok(SvdBackend::Lapack),
        other => Err(format!("unknown SVD backend {:?}", other)),
    }
}

/// Randomized truncated SVD of a sparse matrix given as `row,col,value` triplets.
///
/// Writes `P*S`, `V` and the singular values as comma separated text.
#[derive(Parser, Debug, Clone)]
#[command(name = "sparse_rsvd", version, about)]
pub struct CliArgs {
    /// Target rank.
    #[arg(short = 'r', default_value_t = 100, allow_negative_numbers = true)]
    pub rank: i64,

    /// Number of power iterations.
    #[arg(short = 'i', default_value_t = 4, allow_negative_numbers = true)]
    pub iterations: i64,

    /// Directory holding the input and output files.
    #[arg(short = 'd', value_name = "DIR", default_value = ".")]
    pub directory: PathBuf,

    /// Input triplet file name.
    #[arg(short = 'f', value_name = "FILE", default_value = "matrix.csv")]
    pub input: String,

    /// Output file for P*S.
    #[arg(short = 'u', value_name = "FILE", default_value = "U.nd")]
    pub left: String,

    /// Output file for V.
    #[arg(short = 'v', value_name = "FILE", default_value = "V.nd")]
    pub right: String,

    /// Output file for the singular values.
    #[arg(short = 's', value_name = "FILE", default_value = "S.nd")]
    pub sigma: String,

    /// Matrix shape; inferred from the largest indices when omitted.
    #[arg(long, num_args = 2, value_names = ["ROWS", "COLS"])]
    pub shape: Option<Vec<usize>>,

    /// Seed of the Gaussian test matrix.
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Extra sketch columns beyond the rank.
    #[arg(long, default_value_t = 10)]
    pub oversamples: usize,

    /// Normalization applied during power iterations.
    #[arg(long, value_enum, default_value_t = NormalizerArg::Lu)]
    pub normalizer: NormalizerArg,

    /// Dense SVD backend for the projected block.
    #[arg(long, value_parser = parse_backend, default_value = "nalgebra")]
    pub backend: SvdBackend,

    /// Worker threads; all cores when omitted.
    #[arg(long)]
    pub threads: Option<usize>,
}

impl CliArgs {
    pub fn to_builder(&self) -> Result<RandomizedSvdBuilder> {
        if self.rank <= 0 {
            return Err(RsvdError::InvalidArgument(format!(
                "rank must be a positive integer, got {}",
                self.rank
            )));
        }
        if self.iterations < 0 {
            return Err(RsvdError::InvalidArgument(format!(
                "iteration count must be non-negative, got {}",
                self.iterations
            )));
        }
        if self.threads == Some(0) {
            return Err(RsvdError::InvalidArgument(
                "thread count must be at least 1".to_string(),
            ));
        }

        Ok(RandomizedSvdBuilder::new()
            .n_components(self.rank as usize)
            .n_power_iterations(self.iterations as usize)
            .n_oversamples(self.oversamples)
            .normalizer(self.normalizer.into())
            .backend(self.backend)
            .random_seed(self.seed))
    }

    /// `(rows, cols)` when `--shape` was given.
    pub fn shape(&self) -> Option<(usize, usize)> {
        match self.shape.as_deref() {
            Some([rows, cols]) => Some((*rows, *cols)),
            _ => None,
        }
    }

    pub fn input_path(&self) -> PathBuf {
        self.directory.join(&self.input)
    }

    pub fn left_path(&self) -> PathBuf {
        self.directory.join(&self.left)
    }

    pub fn right_path(&self) -> PathBuf {
        self.directory.join(&self.right)
    }

    pub fn sigma_path(&self) -> PathBuf {
        self.directory.join(&self.sigma)
    }
}
