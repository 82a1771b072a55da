use nalgebra::DMatrix;

const RANK_TOLERANCE: f64 = 10.0;

/// Orthonormal basis of a sketch's column space.
#[derive(Debug, Clone)]
pub struct OrthonormalBasis {
    /// `m × rank`, orthonormal columns.
    pub q: DMatrix<f64>,
    /// Numerical rank of the sketch.
    pub rank: usize,
}

/// Applies `I - beta·v·vᵗ` to rows `offset..` of column `col`.
fn reflect(a: &mut DMatrix<f64>, col: usize, offset: usize, v: &[f64], beta: f64) {
    let s = beta
        * v.iter()
            .enumerate()
            .map(|(t, vt)| vt * a[(offset + t, col)])
            .sum::<f64>();
    for (t, vt) in v.iter().enumerate() {
        a[(offset + t, col)] -= s * vt;
    }
}

/// Thin `Q` factor of an unpivoted Householder QR (`m × min(m, k)`).
pub fn thin_q(a: &DMatrix<f64>) -> DMatrix<f64> {
    a.clone().qr().q()
}

/// Rank-revealing orthonormalization of `y` (`m × k`).
///
/// Householder QR with column pivoting (largest remaining column first). The
/// factorization stops at the first step whose diagonal `|R_jj|` falls below
/// `10 · max(m, k) · ε · |R_00|`; the columns computed so far form the basis.
pub fn orthonormal_basis(y: &DMatrix<f64>) -> OrthonormalBasis {
    let (m, k) = y.shape();
    let steps = m.min(k);
    let mut a = y.clone();
    let mut reflectors: Vec<(Vec<f64>, f64)> = Vec::with_capacity(steps);
    let mut r00 = 0.0;

    for j in 0..steps {
        let mut best = j;
        let mut best_norm = -1.0;
        for c in j..k {
            let norm: f64 = (j..m).map(|i| a[(i, c)] * a[(i, c)]).sum();
            if norm > best_norm {
                best = c;
                best_norm = norm;
            }
        }
        if best != j {
            a.swap_columns(j, best);
        }

        let alpha = best_norm.sqrt();
        if j == 0 {
            r00 = alpha;
        }
        let tol = RANK_TOLERANCE * (m.max(k) as f64) * f64::EPSILON * r00;
        if alpha == 0.0 || alpha <= tol {
            break;
        }

        let mut v: Vec<f64> = (j..m).map(|i| a[(i, j)]).collect();
        v[0] += if v[0] >= 0.0 { alpha } else { -alpha };
        let beta = 2.0 / v.iter().map(|x| x * x).sum::<f64>();

        for c in j..k {
            reflect(&mut a, c, j, &v, beta);
        }
        reflectors.push((v, beta));
    }

    let rank = reflectors.len();
    let mut q = DMatrix::<f64>::zeros(m, rank);
    for i in 0..rank {
        q[(i, i)] = 1.0;
    }
    for (j, (v, beta)) in reflectors.iter().enumerate().rev() {
        for c in 0..rank {
            reflect(&mut q, c, j, v, *beta);
        }
    }

    OrthonormalBasis { q, rank }
}
