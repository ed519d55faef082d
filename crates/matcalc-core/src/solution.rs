use crate::gauss::{canonical, is_zero};
use crate::grid::format_number;
use crate::matrix::Matrix;
use serde::{Deserialize, Serialize};

/// An augmented matrix already reduced to canonical form, displayed as the parametric
/// solution of the linear system it describes (the last column holds the free terms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Matrix", into = "Matrix")]
pub struct Solution {
    reduced: Matrix,
}

/// Rendered form of a [`Solution`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionSet {
    /// Some equation reduced to `0 = c` with `c != 0`.
    Inconsistent,
    /// One `x_c = ...` line per pivot row.
    Equations(Vec<String>),
}

impl Solution {
    /// Wraps a matrix that is already in canonical form.
    pub(crate) fn from_reduced(reduced: Matrix) -> Self {
        Self { reduced }
    }

    pub fn matrix(&self) -> &Matrix {
        &self.reduced
    }

    pub fn into_matrix(self) -> Matrix {
        self.reduced
    }

    pub fn render(&self) -> SolutionSet {
        let m = &self.reduced;
        let (rows, cols) = m.size();
        if cols == 0 {
            return SolutionSet::Equations(Vec::new());
        }
        let mut lines = Vec::new();
        let mut column = 1;

        for row in 1..=rows {
            while column < cols && is_zero(m[(row, column)]) {
                column += 1;
            }

            if column >= cols {
                // No pivot left: only free terms remain, which must all be zero.
                if (row..=rows).any(|i| !is_zero(m[(i, cols)])) {
                    return SolutionSet::Inconsistent;
                }
                break;
            }

            let mut line = format!("x{} = {}", column, format_number(m[(row, cols)]));
            for i in column + 1..cols {
                let coefficient = -m[(row, i)];
                if is_zero(coefficient) {
                    continue;
                }
                let sign = if coefficient < 0.0 { '-' } else { '+' };
                line.push_str(&format!(
                    " {} {}⋅x{}",
                    sign,
                    format_number(coefficient.abs()),
                    i
                ));
            }
            lines.push(line);
        }

        SolutionSet::Equations(lines)
    }
}

impl From<Matrix> for Solution {
    /// Reduces `matrix` first, so the canonical-form invariant always holds.
    fn from(matrix: Matrix) -> Self {
        Self::from_reduced(canonical(&matrix))
    }
}

impl From<Solution> for Matrix {
    fn from(solution: Solution) -> Self {
        solution.reduced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gauss::solve;
    use expect_test::expect;

    fn system(rows: Vec<Vec<f64>>) -> Solution {
        solve(&Matrix::from_rows(rows).unwrap())
    }

    fn rendered(solution: &Solution) -> String {
        match solution.render() {
            SolutionSet::Inconsistent => "no solutions".to_string(),
            SolutionSet::Equations(lines) => lines.join("\n"),
        }
    }

    #[test]
    fn test_unique_solution() {
        // x + y = 5, x - y = 1
        let s = system(vec![vec![1.0, 1.0, 5.0], vec![1.0, -1.0, 1.0]]);
        expect![[r#"
            x1 = 3
            x2 = 2"#]]
        .assert_eq(&rendered(&s));
    }

    #[test]
    fn test_free_variables() {
        // x1 + 2 x2 - x3 = 3
        let s = system(vec![vec![1.0, 2.0, -1.0, 3.0]]);
        expect!["x1 = 3 - 2⋅x2 + 1⋅x3"].assert_eq(&rendered(&s));
    }

    #[test]
    fn test_dependent_rows_are_dropped() {
        let s = system(vec![vec![1.0, 1.0, 2.0], vec![2.0, 2.0, 4.0]]);
        expect!["x1 = 2 - 1⋅x2"].assert_eq(&rendered(&s));
    }

    #[test]
    fn test_inconsistent_system() {
        let s = system(vec![vec![1.0, 1.0, 2.0], vec![1.0, 1.0, 3.0]]);
        assert_eq!(s.render(), SolutionSet::Inconsistent);
    }

    #[test]
    fn test_deserialize_reduces() {
        let json = r#"{"rows":2,"cols":2,"data":[2.0,4.0,0.0,0.0]}"#;
        let s: Solution = serde_json::from_str(json).unwrap();
        assert_eq!(s.matrix().data(), &[1.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_no_columns_has_no_equations() {
        let s = solve(&Matrix::zeros(2, 0));
        assert_eq!(s.render(), SolutionSet::Equations(Vec::new()));
        assert!(crate::Value::Solution(s).to_grid().cells.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_empty_dimension() {
        let json = r#"{"rows":2,"cols":0,"data":[]}"#;
        assert!(serde_json::from_str::<Solution>(json).is_err());
    }
}
