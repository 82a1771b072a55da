use nalgebra::DMatrix;

/// Returns the permuted lower factor `P·L` of a partial-pivoting LU factorization
/// of the tall block `a` (`m × k`, `k ≤ m`), i.e. `a = (P·L)·U`.
///
/// The result has the same column space as `a` and is far better conditioned,
/// which is all the power iteration needs between products. Rows are kept in
/// their original order: row `p` chosen as the `j`-th pivot carries the unit
/// diagonal entry of column `j` and zeros to its right.
///
/// A column whose remaining entries are all zero gets a unit entry on the first
/// unused row instead of a pivot division.
pub fn permuted_lower(a: &DMatrix<f64>) -> DMatrix<f64> {
    let (m, k) = a.shape();
    let steps = m.min(k);
    let mut work = a.clone();
    let mut l = DMatrix::<f64>::zeros(m, steps);
    let mut used = vec![false; m];

    for j in 0..steps {
        let mut pivot_row = None;
        let mut pivot_abs = 0.0;
        for i in 0..m {
            if used[i] {
                continue;
            }
            let v = work[(i, j)].abs();
            if pivot_row.is_none() || v > pivot_abs {
                pivot_row = Some(i);
                pivot_abs = v;
            }
        }
        let p = match pivot_row {
            Some(p) => p,
            None => break,
        };
        used[p] = true;
        l[(p, j)] = 1.0;

        if pivot_abs == 0.0 {
            continue;
        }

        let pivot = work[(p, j)];
        for i in 0..m {
            if used[i] {
                continue;
            }
            let factor = work[(i, j)] / pivot;
            l[(i, j)] = factor;
            if factor != 0.0 {
                for c in (j + 1)..k {
                    let delta = factor * work[(p, c)];
                    work[(i, c)] -= delta;
                }
            }
            work[(i, j)] = 0.0;
        }
    }

    l
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_tall(m: usize, k: usize, seed: u64) -> DMatrix<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        DMatrix::from_fn(m, k, |_, _| rng.random_range(-1.0..1.0))
    }

    #[test]
    fn test_known_factorization() {
        // pivots land on row 1, then on row 2 (remaining entries -0.5 and 3.5)
        let a = DMatrix::from_row_slice(3, 2, &[2.0, 1.0, 4.0, 3.0, 2.0, 5.0]);
        let l = permuted_lower(&a);

        let expected = DMatrix::from_row_slice(3, 2, &[0.5, -0.5 / 3.5, 1.0, 0.0, 0.5, 1.0]);

        for (x, y) in l.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_entries_bounded_by_one() {
        let a = random_tall(40, 6, 3);
        let l = permuted_lower(&a);
        assert_eq!(l.shape(), (40, 6));
        assert!(l.iter().all(|v| v.abs() <= 1.0 + 1e-12));
    }

    #[test]
    fn test_preserves_column_space() {
        let a = random_tall(20, 4, 9);
        let l = permuted_lower(&a);

        // projecting a onto span(l) must reproduce a
        let q = l.clone().qr().q();
        let residual = &a - &q * (q.transpose() * &a);
        assert!(residual.norm() < 1e-10 * a.norm());
    }

    #[test]
    fn test_zero_column() {
        let mut a = random_tall(6, 3, 5);
        a.column_mut(1).fill(0.0);
        let l = permuted_lower(&a);
        assert!(l.iter().all(|v| v.is_finite()));
        assert_eq!(l.column(1).iter().filter(|v| **v == 1.0).count(), 1);
    }
}
