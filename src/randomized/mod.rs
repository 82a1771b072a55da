//! # Randomized truncated SVD
//!
//! Computes `A ≈ P · diag(σ) · Vᵗ` for a sparse `A` by sketching its range with a
//! Gaussian test matrix, sharpening the sketch with power iterations, and solving
//! an exact SVD on the small projected block `Qᵗ·A`.
//!
//! The stages run strictly in sequence; parallelism lives inside the sparse-dense
//! products. Install the call in a [`rayon::ThreadPool`] to bound the thread count.

use nalgebra::DMatrix;
use nalgebra_sparse::CsrMatrix;
use ndarray::{Array1, Array2};

use crate::dense::qr::orthonormal_basis;
use crate::dense::{ensure_finite, into_array1, into_array2, orthogonality_error, svd_flip};
use crate::error::{Result, RsvdError};
use crate::sparse::SparseProduct;
use crate::svd::{DenseSvd, SvdBackend};

pub mod power;
pub mod projection;

pub use power::PowerIterationNormalizer;

/// Whether the sketch is taken on `A` or on `Aᵗ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransposeMode {
    /// Work on `Aᵗ` when `A` has fewer rows than columns.
    #[default]
    Auto,
    Never,
    Always,
}

/// Summary of one factorization run.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    pub nrows: usize,
    pub ncols: usize,
    pub non_zero: usize,
    pub requested_rank: usize,
    pub sketch_width: usize,
    /// Numerical rank of the sketch.
    pub basis_rank: usize,
    pub power_iterations: usize,
    pub normalizer: PowerIterationNormalizer,
    pub backend: SvdBackend,
    pub random_seed: u64,
    pub transposed: bool,
}

/// Truncated factorization `A ≈ u · diag(s) · vt`.
#[derive(Debug, Clone)]
pub struct Factorization {
    u: Array2<f64>,
    s: Array1<f64>,
    vt: Array2<f64>,
    diagnostics: Diagnostics,
}

impl Factorization {
    /// Left singular vectors, `m × rank`.
    pub fn u(&self) -> &Array2<f64> {
        &self.u
    }

    /// Singular values, descending.
    pub fn s(&self) -> &Array1<f64> {
        &self.s
    }

    /// Right singular vectors as rows, `rank × n`.
    pub fn vt(&self) -> &Array2<f64> {
        &self.vt
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Delivered rank; smaller than requested when the sketch collapsed.
    pub fn rank(&self) -> usize {
        self.s.len()
    }

    /// `P · diag(σ)`, the `m × rank` left factor written by the batch tool.
    pub fn scaled_left(&self) -> Array2<f64> {
        let mut scaled = self.u.clone();
        for (mut column, &sigma) in scaled.columns_mut().into_iter().zip(self.s.iter()) {
            column *= sigma;
        }
        scaled
    }

    /// `V`, the `n × rank` right factor.
    pub fn right_factor(&self) -> Array2<f64> {
        self.vt.t().to_owned()
    }

    /// Dense `u · diag(s) · vt`. Only meant for small matrices.
    pub fn reconstruct(&self) -> Array2<f64> {
        self.scaled_left().dot(&self.vt)
    }

    pub fn into_parts(self) -> (Array2<f64>, Array1<f64>, Array2<f64>) {
        (self.u, self.s, self.vt)
    }
}

/// Randomized SVD of sparse CSR matrices.
///
/// Only `f64` input is supported. Build instances with [`RandomizedSvdBuilder`].
#[derive(Debug, Clone)]
pub struct RandomizedSvd {
    n_components: usize,
    n_oversamples: usize,
    n_power_iterations: usize,
    normalizer: PowerIterationNormalizer,
    backend: SvdBackend,
    transpose: TransposeMode,
    random_seed: u64,
    flip_sign: bool,
}

impl RandomizedSvd {
    /// Sketch width for an `nrows × ncols` input: `rank + oversamples`, capped at `min(nrows, ncols)`.
    pub fn sketch_width(&self, nrows: usize, ncols: usize) -> usize {
        (self.n_components + self.n_oversamples).min(nrows.min(ncols))
    }

    /// Factorizes `a` to rank `n_components`.
    ///
    /// # Errors
    /// - `InvalidArgument` for an empty matrix, a zero rank, or a rank larger than
    ///   the sketch width
    /// - `NumericalInstability` when an intermediate block turns non-finite or the
    ///   dense SVD does not converge
    ///
    /// A sketch that spans fewer directions than requested is not an error: it is
    /// logged as a warning and the factorization is returned at the available rank.
    pub fn fit(&self, a: &CsrMatrix<f64>) -> Result<Factorization> {
        let (m, n) = (a.nrows(), a.ncols());
        if m == 0 || n == 0 {
            return Err(RsvdError::InvalidArgument(format!(
                "cannot factorize an empty {}x{} matrix",
                m, n
            )));
        }
        if self.n_components == 0 {
            return Err(RsvdError::InvalidArgument(
                "rank must be at least 1".to_string(),
            ));
        }

        let transposed = match self.transpose {
            TransposeMode::Auto => m < n,
            TransposeMode::Never => false,
            TransposeMode::Always => true,
        };
        let transposed_copy;
        let work = if transposed {
            transposed_copy = a.transpose();
            &transposed_copy
        } else {
            a
        };
        let (wm, wn) = (work.nrows(), work.ncols());

        let k = self.sketch_width(wm, wn);
        if self.n_components > k {
            return Err(RsvdError::InvalidArgument(format!(
                "rank {} exceeds the sketch width {} available for a {}x{} matrix",
                self.n_components, k, m, n
            )));
        }

        log::debug!(
            "Randomized SVD: {}x{} input ({} non-zeros), rank {}, sketch width {}, {} power iterations ({:?}), transposed: {}",
            m, n, a.nnz(), self.n_components, k, self.n_power_iterations, self.normalizer, transposed
        );

        let y = projection::sketch(work, wn, k, self.random_seed)?;
        let y = power::refine(work, y, self.n_power_iterations, self.normalizer)?;

        let basis = orthonormal_basis(&y);
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Basis: {} of {} columns kept, orthogonality error {:e}",
                basis.rank,
                k,
                orthogonality_error(&basis.q)
            );
        }
        if basis.rank < self.n_components {
            log::warn!(
                "{}; continuing with rank {}",
                RsvdError::InsufficientRank {
                    requested: self.n_components,
                    available: basis.rank,
                },
                basis.rank
            );
        }

        let diagnostics = Diagnostics {
            nrows: m,
            ncols: n,
            non_zero: a.nnz(),
            requested_rank: self.n_components,
            sketch_width: k,
            basis_rank: basis.rank,
            power_iterations: self.n_power_iterations,
            normalizer: self.normalizer,
            backend: self.backend,
            random_seed: self.random_seed,
            transposed,
        };

        if basis.rank == 0 {
            return Ok(Factorization {
                u: Array2::zeros((m, 0)),
                s: Array1::zeros(0),
                vt: Array2::zeros((0, n)),
                diagnostics,
            });
        }

        let b = work.dense_transpose_mul(&basis.q)?;
        ensure_finite(&b, "projection onto the basis")?;
        let small = DenseSvd::compute(&b, self.backend)?;

        let rank = self.n_components.min(small.rank());
        let lifted: DMatrix<f64> = &basis.q * small.u.columns(0, rank);
        let s = small.s.rows(0, rank).into_owned();
        let right = small.vt.rows(0, rank).into_owned();

        // Aᵗ = P'·Σ·V'ᵗ gives A = V'·Σ·P'ᵗ
        let (mut u, mut vt) = if transposed {
            (right.transpose(), lifted.transpose())
        } else {
            (lifted, right)
        };
        if self.flip_sign {
            svd_flip(&mut u, &mut vt);
        }
        ensure_finite(&u, "left singular vectors")?;
        ensure_finite(&vt, "right singular vectors")?;

        log::info!(
            "Randomized SVD done: rank {} of {}x{}, leading singular value {:.5}",
            rank,
            m,
            n,
            s.get(0).cloned().unwrap_or(0.0)
        );

        Ok(Factorization {
            u: into_array2(u),
            s: into_array1(s),
            vt: into_array2(vt),
            diagnostics,
        })
    }
}

/// Builder for [`RandomizedSvd`].
///
/// ```ignore
/// let svd = RandomizedSvdBuilder::new()
///     .n_components(100)
///     .n_power_iterations(4)
///     .normalizer(PowerIterationNormalizer::LU)
///     .random_seed(1)
///     .build();
/// let factors = svd.fit(&csr)?;
/// ```
#[derive(Debug, Clone)]
pub struct RandomizedSvdBuilder {
    n_components: usize,
    n_oversamples: usize,
    n_power_iterations: usize,
    normalizer: PowerIterationNormalizer,
    backend: SvdBackend,
    transpose: TransposeMode,
    random_seed: u64,
    flip_sign: bool,
}

impl Default for RandomizedSvdBuilder {
    fn default() -> Self {
        Self {
            n_components: 100,
            n_oversamples: 10,
            n_power_iterations: 4,
            normalizer: PowerIterationNormalizer::LU,
            backend: SvdBackend::default(),
            transpose: TransposeMode::Auto,
            random_seed: 1,
            flip_sign: true,
        }
    }
}

impl RandomizedSvdBuilder {
    /// Creates a builder with default parameters.
    ///
    /// Default values:
    /// - `n_components`: 100
    /// - `n_oversamples`: 10
    /// - `n_power_iterations`: 4
    /// - `normalizer`: LU
    /// - `backend`: nalgebra
    /// - `transpose`: Auto
    /// - `random_seed`: 1
    /// - `flip_sign`: true
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    /// Extra sketch columns beyond the requested rank.
    pub fn n_oversamples(mut self, n_oversamples: usize) -> Self {
        self.n_oversamples = n_oversamples;
        self
    }

    pub fn n_power_iterations(mut self, n_power_iterations: usize) -> Self {
        self.n_power_iterations = n_power_iterations;
        self
    }

    pub fn normalizer(mut self, normalizer: PowerIterationNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn backend(mut self, backend: SvdBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn transpose(mut self, transpose: TransposeMode) -> Self {
        self.transpose = transpose;
        self
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Makes the largest-magnitude entry of every left singular vector positive.
    pub fn flip_sign(mut self, flip_sign: bool) -> Self {
        self.flip_sign = flip_sign;
        self
    }

    pub fn build(self) -> RandomizedSvd {
        RandomizedSvd {
            n_components: self.n_components,
            n_oversamples: self.n_oversamples,
            n_power_iterations: self.n_power_iterations,
            normalizer: self.normalizer,
            backend: self.backend,
            transpose: self.transpose,
            random_seed: self.random_seed,
            flip_sign: self.flip_sign,
        }
    }
}
