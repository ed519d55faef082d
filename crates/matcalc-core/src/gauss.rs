//! Gauss–Jordan elimination.
//!
//! The state machine walks `(row, column)` from `(1, 1)`:
//!
//! 1. a non-zero entry becomes the pivot: its row is scaled so the pivot is exactly 1 and the
//!    column is cleared in every other row; both `row` and `column` advance;
//! 2. otherwise a lower row with a non-zero entry in this column is swapped in and step 1
//!    is retried;
//! 3. otherwise the column is a free variable and only `column` advances.
//!
//! When a transform matrix is requested every row operation is mirrored onto it, so for an
//! invertible input it ends up holding the inverse.

use crate::error::{ComputationError, CoreError, Result};
use crate::matrix::Matrix;
use crate::solution::Solution;

/// Magnitude below which a value is treated as exactly zero.
pub const ZERO_TOLERANCE: f64 = 1e-10;

pub fn is_zero(x: f64) -> bool {
    x.abs() < ZERO_TOLERANCE
}

/// Outcome of an elimination run.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussResult {
    /// The canonical (reduced row-echelon) form.
    pub reduced: Matrix,
    /// The accumulated row operations, when requested.
    pub transform: Option<Matrix>,
    /// Pivot values as found, before their rows were normalized.
    pub pivots: Vec<f64>,
    /// Number of row swaps performed.
    pub swaps: usize,
}

impl GaussResult {
    pub fn rank(&self) -> usize {
        self.pivots.len()
    }
}

pub struct Gauss {
    result: Matrix,
    transform: Option<Matrix>,
    pivots: Vec<f64>,
    swaps: usize,
}

impl Gauss {
    pub fn new(matrix: &Matrix, with_transform: bool) -> Self {
        let (rows, cols) = matrix.size();
        Self {
            result: matrix.clone(),
            transform: with_transform.then(|| Matrix::identity(rows, cols, 1.0)),
            pivots: Vec::new(),
            swaps: 0,
        }
    }

    fn scale_row(&mut self, row: usize, factor: f64) {
        self.result.scale_row(row, factor);
        if let Some(t) = self.transform.as_mut() {
            t.scale_row(row, factor);
        }
    }

    fn add_row_multiple(&mut self, target: usize, source: usize, factor: f64) {
        self.result.add_row_multiple(target, source, factor);
        if let Some(t) = self.transform.as_mut() {
            t.add_row_multiple(target, source, factor);
        }
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        self.result.swap_rows(a, b);
        if let Some(t) = self.transform.as_mut() {
            t.swap_rows(a, b);
        }
        self.swaps += 1;
    }

    fn eliminate(&mut self, row: usize, column: usize) {
        let pivot = self.result[(row, column)];
        self.pivots.push(pivot);
        self.scale_row(row, 1.0 / pivot);
        self.result[(row, column)] = 1.0;

        for other in 1..=self.result.rows() {
            if other == row {
                continue;
            }
            let entry = self.result[(other, column)];
            if !is_zero(entry) {
                self.add_row_multiple(other, row, -entry);
            }
            // Float drift: the column is zero outside the pivot by construction.
            self.result[(other, column)] = 0.0;
        }
    }

    /// Runs the reduction to completion.
    pub fn calculate(mut self) -> GaussResult {
        let (max_row, max_col) = self.result.size();
        let (mut row, mut column) = (1, 1);

        while row <= max_row && column <= max_col {
            if !is_zero(self.result[(row, column)]) {
                self.eliminate(row, column);
                row += 1;
                column += 1;
                continue;
            }

            let below = (row + 1..=max_row).find(|&i| !is_zero(self.result[(i, column)]));
            match below {
                Some(i) => self.swap_rows(row, i),
                None => column += 1,
            }
        }

        GaussResult {
            reduced: self.result,
            transform: self.transform,
            pivots: self.pivots,
            swaps: self.swaps,
        }
    }
}

/// Canonical form of `matrix`.
pub fn canonical(matrix: &Matrix) -> Matrix {
    Gauss::new(matrix, false).calculate().reduced
}

/// Reduces an augmented matrix and wraps the result as a [`Solution`].
pub fn solve(matrix: &Matrix) -> Solution {
    Solution::from_reduced(canonical(matrix))
}

fn require_square(matrix: &Matrix, what: &str) -> Result<()> {
    if !matrix.is_square() {
        return Err(ComputationError::new(format!(
            "{} is only defined for square matrices, got {} x {}",
            what,
            matrix.rows(),
            matrix.cols()
        ))
        .with_left(matrix.clone())
        .into());
    }
    Ok(())
}

/// Inverse of a square matrix.
pub fn invert(matrix: &Matrix) -> Result<Matrix> {
    require_square(matrix, "the inverse")?;

    let result = Gauss::new(matrix, true).calculate();
    let singular = (1..=result.reduced.min_dimension()).any(|i| is_zero(result.reduced[(i, i)]));
    if singular {
        return Err(ComputationError::new("the matrix has no inverse")
            .with_left(result.reduced)
            .into());
    }

    result
        .transform
        .ok_or_else(|| CoreError::Internal("elimination ran without a transform matrix".into()))
}

/// Determinant of a square matrix.
///
/// Computed as `(-1)^swaps` times the product of the pivots found during elimination; a
/// column without a pivot makes the matrix singular.
pub fn determinant(matrix: &Matrix) -> Result<f64> {
    require_square(matrix, "the determinant")?;

    let result = Gauss::new(matrix, false).calculate();
    if result.rank() < matrix.min_dimension() {
        return Ok(0.0);
    }
    let sign = if result.swaps % 2 == 0 { 1.0 } else { -1.0 };
    Ok(sign * result.pivots.iter().product::<f64>())
}

/// Sum of the main diagonal of a square matrix.
pub fn trace(matrix: &Matrix) -> Result<f64> {
    require_square(matrix, "the trace")?;
    Ok((1..=matrix.min_dimension()).map(|i| matrix[(i, i)]).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    fn assert_close(a: &Matrix, b: &Matrix) {
        assert_eq!(a.size(), b.size());
        for (x, y) in a.data().iter().zip(b.data()) {
            assert!((x - y).abs() < 1e-10, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_canonical_full_rank() {
        let a = m(vec![vec![2.0, 4.0], vec![1.0, 3.0]]);
        assert_close(&canonical(&a), &Matrix::identity(2, 2, 1.0));
    }

    #[test]
    fn test_canonical_with_free_column() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 7.0]]);
        let reduced = canonical(&a);
        assert_close(&reduced, &m(vec![vec![1.0, 2.0, 0.0], vec![0.0, 0.0, 1.0]]));
    }

    #[test]
    fn test_swap_when_pivot_is_zero() {
        let a = m(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        let result = Gauss::new(&a, true).calculate();
        assert_eq!(result.swaps, 1);
        assert_close(&result.reduced, &Matrix::identity(2, 2, 1.0));
        assert_close(result.transform.as_ref().unwrap(), &a);
    }

    #[test]
    fn test_zero_matrix_has_rank_zero() {
        let result = Gauss::new(&Matrix::zeros(2, 3), false).calculate();
        assert_eq!(result.rank(), 0);
        assert_eq!(result.reduced, Matrix::zeros(2, 3));
    }

    #[test]
    fn test_determinant() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert!((determinant(&a).unwrap() + 2.0).abs() < 1e-10);

        let swapped = m(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        assert!((determinant(&swapped).unwrap() + 1.0).abs() < 1e-10);

        let singular = m(vec![vec![1.0, 2.0], vec![2.0, 4.0]]);
        assert_eq!(determinant(&singular).unwrap(), 0.0);

        let diag = m(vec![
            vec![2.0, 0.0, 0.0],
            vec![0.0, 3.0, 0.0],
            vec![0.0, 0.0, 4.0],
        ]);
        assert!((determinant(&diag).unwrap() - 24.0).abs() < 1e-10);

        assert!(determinant(&Matrix::zeros(2, 3)).is_err());
    }

    #[test]
    fn test_trace_uses_full_diagonal() {
        let a = m(vec![
            vec![1.0, 9.0, 9.0],
            vec![9.0, 2.0, 9.0],
            vec![9.0, 9.0, 3.0],
        ]);
        assert_eq!(trace(&a).unwrap(), 6.0);
        assert!(trace(&Matrix::zeros(1, 2)).is_err());
    }

    #[test]
    fn test_invert() {
        let a = m(vec![vec![4.0, 7.0], vec![2.0, 6.0]]);
        let inv = invert(&a).unwrap();
        assert_close(&a.multiply(&inv).unwrap(), &Matrix::identity(2, 2, 1.0));

        let singular = m(vec![vec![1.0, 2.0], vec![2.0, 4.0]]);
        let err = invert(&singular).unwrap_err();
        assert!(err.to_string().contains("no inverse"));
    }
}
