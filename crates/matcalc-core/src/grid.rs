//! Display grids: each value is turned into a table of text cells that a front end lays out.

use crate::solution::SolutionSet;
use crate::value::Value;

/// Largest number of rows or columns shown before a matrix is truncated.
pub const MAX_SHOWN: usize = 10;

/// How a front end should decorate a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridStyle {
    /// Cells printed as they are, one row per line.
    Plain,
    /// Cells aligned in columns and wrapped in tall parentheses.
    Bracketed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub cells: Vec<Vec<String>>,
    pub style: GridStyle,
}

impl Grid {
    fn plain(cells: Vec<Vec<String>>) -> Self {
        Self {
            cells,
            style: GridStyle::Plain,
        }
    }

    fn bracketed(cells: Vec<Vec<String>>) -> Self {
        Self {
            cells,
            style: GridStyle::Bracketed,
        }
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Formats a number with at most seven fractional digits and no trailing zeros.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let mut text = format!("{:.7}", value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

impl Value {
    /// Lays the value out as display cells.
    pub fn to_grid(&self) -> Grid {
        match self {
            Value::Number(x) => Grid::plain(vec![vec![format_number(*x)]]),
            Value::IdentityMatrix(x) => {
                let v = format_number(*x);
                let row = |cells: [&str; 5]| cells.iter().map(|c| c.to_string()).collect();
                Grid::bracketed(vec![
                    row([&v, "0", "⋯", "0", "0"]),
                    row(["0", &v, "⋯", "0", "0"]),
                    row(["⋮", "⋮", "⋱", "⋮", "⋮"]),
                    row(["0", "0", "⋯", &v, "0"]),
                    row(["0", "0", "⋯", "0", &v]),
                ])
            }
            Value::Matrix(m) => {
                if m.rows() == 0 || m.cols() == 0 {
                    return Grid::bracketed(vec![vec![String::new()]]);
                }
                let shown_rows = m.rows().min(MAX_SHOWN);
                let shown_cols = m.cols().min(MAX_SHOWN);
                let mut cells: Vec<Vec<String>> = (1..=shown_rows)
                    .map(|row| {
                        let mut line: Vec<String> = (1..=shown_cols)
                            .map(|col| format_number(m[(row, col)]))
                            .collect();
                        if m.cols() > MAX_SHOWN {
                            line.push("…".to_string());
                        }
                        line
                    })
                    .collect();
                if m.rows() > MAX_SHOWN {
                    let width = cells.first().map_or(0, Vec::len);
                    cells.push(vec!["…".to_string(); width]);
                }
                Grid::bracketed(cells)
            }
            Value::List(items) => {
                Grid::plain(items.iter().map(|item| vec![item.to_string()]).collect())
            }
            Value::Solution(s) => match s.render() {
                SolutionSet::Inconsistent => Grid::plain(vec![vec!["No solutions.".to_string()]]),
                SolutionSet::Equations(lines) => {
                    Grid::plain(lines.into_iter().map(|line| vec![line]).collect())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(1.0 / 3.0), "0.3333333");
        assert_eq!(format_number(-0.00000001), "0");
        assert_eq!(format_number(1200.0), "1200");
        assert_eq!(format_number(f64::INFINITY), "inf");
    }

    #[test]
    fn test_matrix_grid() {
        let m = Matrix::from_rows(vec![vec![1.0, 0.5], vec![-3.0, 4.0]]).unwrap();
        let grid = Value::Matrix(m).to_grid();
        assert_eq!(grid.style, GridStyle::Bracketed);
        assert_eq!(
            grid.cells,
            vec![vec!["1".to_string(), "0.5".to_string()], vec!["-3".to_string(), "4".to_string()]]
        );
    }

    #[test]
    fn test_large_matrix_is_truncated() {
        let grid = Value::Matrix(Matrix::zeros(12, 15)).to_grid();
        assert_eq!(grid.height(), MAX_SHOWN + 1);
        assert_eq!(grid.width(), MAX_SHOWN + 1);
        assert_eq!(grid.cells[0][MAX_SHOWN], "…");
        assert!(grid.cells[MAX_SHOWN].iter().all(|c| c == "…"));
    }

    #[test]
    fn test_identity_grid_pattern() {
        let grid = Value::IdentityMatrix(2.0).to_grid();
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.cells[2][2], "⋱");
        assert_eq!(grid.cells[4][4], "2");
    }

    #[test]
    fn test_list_grid() {
        let list = Value::List(vec![Value::Number(1.0), Value::Matrix(Matrix::zeros(2, 2))]);
        let grid = list.to_grid();
        assert_eq!(grid.cells, vec![vec!["1".to_string()], vec!["Matrix<2 x 2>".to_string()]]);
    }
}
