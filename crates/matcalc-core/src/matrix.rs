use crate::error::{ComputationError, CoreError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A dense `rows x cols` matrix stored in row-major order.
///
/// Indexing is 1-based, as in the usual mathematical notation: `m[(1, 1)]` is the top-left
/// entry. The size is fixed for the lifetime of the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixData", into = "MatrixData")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

/// Serialized form of [`Matrix`], validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MatrixData {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TryFrom<MatrixData> for Matrix {
    type Error = CoreError;

    fn try_from(raw: MatrixData) -> Result<Self> {
        if (raw.rows == 0) != (raw.cols == 0) {
            return Err(CoreError::Internal(format!(
                "matrix of size {} x {} has an empty dimension",
                raw.rows, raw.cols
            )));
        }
        Matrix::from_vec(raw.rows, raw.cols, raw.data)
    }
}

impl From<Matrix> for MatrixData {
    fn from(matrix: Matrix) -> Self {
        Self {
            rows: matrix.rows,
            cols: matrix.cols,
            data: matrix.data,
        }
    }
}

impl Matrix {
    /// Creates a zero matrix of the given size.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a `rows x cols` matrix with `scale` on the main diagonal.
    pub fn identity(rows: usize, cols: usize, scale: f64) -> Self {
        let mut result = Self::zeros(rows, cols);
        for i in 1..=result.min_dimension() {
            result[(i, i)] = scale;
        }
        result
    }

    /// Builds a matrix from row-major data, checking `data.len() == rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(CoreError::Internal(format!(
                "matrix of size {} x {} cannot hold {} values",
                rows,
                cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a matrix from a list of rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(ComputationError::new(format!(
                "jagged matrix: row 1 has {} columns, but row {} has {}",
                cols,
                i + 1,
                row.len()
            ))
            .into());
        }
        let height = rows.len();
        Self::from_vec(height, cols, rows.into_iter().flatten().collect())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// `min(rows, cols)`, the length of the main diagonal.
    pub fn min_dimension(&self) -> usize {
        self.rows.min(self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Row-major view of all entries.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Returns the entries of row `row` (1-based).
    pub fn row(&self, row: usize) -> &[f64] {
        let start = self.offset(row, 1);
        &self.data[start..start + self.cols]
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            (1..=self.rows).contains(&row) && (1..=self.cols).contains(&col),
            "index ({}, {}) out of bounds for {} x {} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        (row - 1) * self.cols + (col - 1)
    }

    /// Applies `func` to every entry, producing a new matrix.
    pub fn map(&self, func: impl Fn(f64) -> f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| func(x)).collect(),
        }
    }

    /// Combines corresponding entries of two matrices of identical size.
    ///
    /// Callers validate sizes first; a mismatch here is an internal error.
    pub fn zip(&self, other: &Matrix, func: impl Fn(f64, f64) -> f64) -> Result<Matrix> {
        if self.size() != other.size() {
            return Err(CoreError::Internal(format!(
                "zip over matrices of different sizes: {} x {} and {} x {}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| func(a, b))
                .collect(),
        })
    }

    /// Copy of this matrix with `value` added to every diagonal entry.
    pub fn add_diagonal(&self, value: f64) -> Matrix {
        let mut result = self.clone();
        for i in 1..=self.min_dimension() {
            result[(i, i)] += value;
        }
        result
    }

    pub fn transpose(&self) -> Matrix {
        let mut result = Matrix::zeros(self.cols, self.rows);
        for row in 1..=self.rows {
            for col in 1..=self.cols {
                result[(col, row)] = self[(row, col)];
            }
        }
        result
    }

    /// True matrix product `self * other`.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(ComputationError::new(format!(
                "cannot multiply: a {} x {} matrix by a {} x {} matrix",
                self.rows, self.cols, other.rows, other.cols
            ))
            .with_left(self.clone())
            .with_right(other.clone())
            .into());
        }

        let mut result = Matrix::zeros(self.rows, other.cols);
        for row in 1..=self.rows {
            for col in 1..=other.cols {
                result[(row, col)] = (1..=self.cols)
                    .map(|i| self[(row, i)] * other[(i, col)])
                    .sum();
            }
        }
        Ok(result)
    }

    /// Entry-by-entry product of two matrices of the same size.
    pub fn multiply_elements(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_size(other, "multiply element-wise")?;
        self.zip(other, |a, b| a * b)
    }

    /// Block matrix `[self | other]`.
    pub fn join_horizontal(&self, other: &Matrix) -> Result<Matrix> {
        if self.rows != other.rows {
            return Err(ComputationError::new(format!(
                "cannot join side by side: {} rows on the left, {} on the right",
                self.rows, other.rows
            ))
            .with_left(self.clone())
            .with_right(other.clone())
            .into());
        }

        let mut data = Vec::with_capacity(self.data.len() + other.data.len());
        for row in 1..=self.rows {
            data.extend_from_slice(self.row(row));
            data.extend_from_slice(other.row(row));
        }
        Matrix::from_vec(self.rows, self.cols + other.cols, data)
    }

    /// Block matrix with `self` on top of `other`.
    pub fn join_vertical(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.cols {
            return Err(ComputationError::new(format!(
                "cannot stack: {} columns on top, {} below",
                self.cols, other.cols
            ))
            .with_left(self.clone())
            .with_right(other.clone())
            .into());
        }

        let mut data = self.data.clone();
        data.extend_from_slice(&other.data);
        Matrix::from_vec(self.rows + other.rows, self.cols, data)
    }

    pub(crate) fn check_same_size(&self, other: &Matrix, action: &str) -> Result<()> {
        if self.size() != other.size() {
            return Err(ComputationError::new(format!(
                "cannot {}: matrix sizes differ ({} x {} and {} x {})",
                action, self.rows, self.cols, other.rows, other.cols
            ))
            .with_left(self.clone())
            .with_right(other.clone())
            .into());
        }
        Ok(())
    }

    /// Swaps rows `a` and `b`.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 1..=self.cols {
            let (i, j) = (self.offset(a, col), self.offset(b, col));
            self.data.swap(i, j);
        }
    }

    /// Multiplies every entry of `row` by `factor`.
    pub fn scale_row(&mut self, row: usize, factor: f64) {
        for col in 1..=self.cols {
            self[(row, col)] *= factor;
        }
    }

    /// Adds `factor` times row `source` to row `target`.
    pub fn add_row_multiple(&mut self, target: usize, source: usize, factor: f64) {
        for col in 1..=self.cols {
            let delta = factor * self[(source, col)];
            self[(target, col)] += delta;
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[self.offset(row, col)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        let offset = self.offset(row, col);
        &mut self.data[offset]
    }
}
