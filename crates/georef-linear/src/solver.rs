//! Dense linear solver shared by every transformation family.
//!
//! Systems are stored as one coefficient matrix and one right-hand-side
//! column per output axis. Square systems are solved directly; overdetermined
//! ones through their normal equations. Elimination is Gauss–Jordan with
//! partial pivoting; ties in pivot magnitude resolve to the first row, so the
//! same input always yields bit-identical coefficients.

use georef_core::{GeorefError, MatX, Real, Result, VecX};

/// Pivot magnitudes at or below this fraction of the largest matrix entry are
/// treated as zero.
pub const PIVOT_TOLERANCE: Real = 1e-12;

/// Coefficient matrix and right-hand sides of a linear fit.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    /// `rows × unknowns` design matrix.
    pub matrix: MatX,
    /// `rows × axes` right-hand sides.
    pub rhs: MatX,
}

impl LinearSystem {
    pub fn new(matrix: MatX, rhs: MatX) -> Result<Self> {
        if matrix.nrows() != rhs.nrows() {
            return Err(GeorefError::DimensionMismatch {
                source_len: matrix.nrows(),
                destination_len: rhs.nrows(),
            });
        }
        Ok(Self { matrix, rhs })
    }

    /// All-zero system to be filled row by row.
    pub fn zeros(rows: usize, unknowns: usize, axes: usize) -> Self {
        Self {
            matrix: MatX::zeros(rows, unknowns),
            rhs: MatX::zeros(rows, axes),
        }
    }

    pub fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn unknowns(&self) -> usize {
        self.matrix.ncols()
    }

    /// Add `sign · terms` to `row`, starting at column `offset`. Two
    /// writes into the same block accumulate.
    pub fn put_terms(&mut self, row: usize, offset: usize, terms: &VecX, sign: Real) {
        for (k, t) in terms.iter().enumerate() {
            self.matrix[(row, offset + k)] += sign * t;
        }
    }

    /// Solve for one coefficient column per right-hand side.
    pub fn solve(&self) -> Result<MatX> {
        solve_least_squares(&self.matrix, &self.rhs)
    }
}

/// Solve `m · c = rhs` exactly when square, in the least-squares sense when
/// overdetermined.
///
/// # Errors
///
/// - [`GeorefError::NotEnoughPoints`] when there are fewer rows than unknowns,
/// - [`GeorefError::DimensionMismatch`] when `rhs` has a different row count,
/// - [`GeorefError::Unsolvable`] when the (normal) matrix is singular.
pub fn solve_least_squares(m: &MatX, rhs: &MatX) -> Result<MatX> {
    let (rows, cols) = m.shape();
    if rhs.nrows() != rows {
        return Err(GeorefError::DimensionMismatch {
            source_len: rows,
            destination_len: rhs.nrows(),
        });
    }
    if rows < cols {
        return Err(GeorefError::NotEnoughPoints {
            required: cols,
            found: rows,
        });
    }

    if rows == cols {
        gauss_jordan(m.clone(), rhs.clone())
    } else {
        let mt = m.transpose();
        gauss_jordan(&mt * m, &mt * rhs)
    }
}

/// Gauss–Jordan elimination with partial pivoting on a square matrix.
///
/// `b` is row-reduced alongside `a` and returned as the solution.
pub fn gauss_jordan(mut a: MatX, mut b: MatX) -> Result<MatX> {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols(), "gauss_jordan expects a square matrix");
    debug_assert_eq!(n, b.nrows());

    let scale = a.iter().fold(0.0, |m: Real, v| m.max(v.abs()));
    let tol = PIVOT_TOLERANCE * scale;

    for j in 0..n {
        // Largest magnitude in column j among the remaining rows; strict
        // comparison keeps the first occurrence on ties.
        let mut pivot_row = j;
        let mut best = a[(j, j)].abs();
        for i in (j + 1)..n {
            let v = a[(i, j)].abs();
            if v > best {
                best = v;
                pivot_row = i;
            }
        }
        if !(best > tol) {
            return Err(GeorefError::Unsolvable { column: j });
        }
        if pivot_row != j {
            a.swap_rows(j, pivot_row);
            b.swap_rows(j, pivot_row);
        }

        let pivot = a[(j, j)];
        for c in j..n {
            a[(j, c)] /= pivot;
        }
        for c in 0..b.ncols() {
            b[(j, c)] /= pivot;
        }

        for i in 0..n {
            if i == j {
                continue;
            }
            let factor = a[(i, j)];
            if factor == 0.0 {
                continue;
            }
            for c in j..n {
                a[(i, c)] -= factor * a[(j, c)];
            }
            for c in 0..b.ncols() {
                b[(i, c)] -= factor * b[(j, c)];
            }
        }
    }

    Ok(b)
}
