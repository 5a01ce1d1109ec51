// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Dense Cholesky factorization and triangular solves

use ndarray::Array2;

/// Lower-triangular `L` with `L L^T = a`, or `None` if `a` is not
/// numerically positive definite
pub(crate) fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols());
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if !(sum > 0.0) || !sum.is_finite() {
                    return None;
                }
                l[[i, j]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Solve `L L^T X = B` for every column of `b`
pub(crate) fn cholesky_solve(l: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    let n = l.nrows();
    let mut x = b.clone();

    for col in 0..b.ncols() {
        // Forward substitution: L y = b
        for i in 0..n {
            let mut sum = x[[i, col]];
            for k in 0..i {
                sum -= l[[i, k]] * x[[k, col]];
            }
            x[[i, col]] = sum / l[[i, i]];
        }
        // Backward substitution: L^T x = y
        for i in (0..n).rev() {
            let mut sum = x[[i, col]];
            for k in (i + 1)..n {
                sum -= l[[k, i]] * x[[k, col]];
            }
            x[[i, col]] = sum / l[[i, i]];
        }
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_factor_and_solve() {
        let a = arr2(&[[4.0, 2.0, 0.4], [2.0, 5.0, 1.0], [0.4, 1.0, 3.0]]);
        let l = cholesky(&a).unwrap();
        let rebuilt = l.dot(&l.t());
        for (x, y) in rebuilt.iter().zip(a.iter()) {
            assert!((x - y).abs() < 1e-12);
        }

        let b = arr2(&[[1.0, 0.0], [2.0, 1.0], [3.0, -1.0]]);
        let x = cholesky_solve(&l, &b);
        let check = a.dot(&x);
        for (x, y) in check.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-10);
        }
    }

    #[test]
    fn test_not_positive_definite() {
        let a = arr2(&[[1.0, 2.0], [2.0, 1.0]]);
        assert!(cholesky(&a).is_none());
        let zero = Array2::<f64>::zeros((2, 2));
        assert!(cholesky(&zero).is_none());
    }
}
