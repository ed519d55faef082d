use crate::error::{ComputationError, Result};
use crate::grid::format_number;
use crate::matrix::Matrix;
use crate::solution::Solution;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything the engine computes with.
///
/// `Number` and `IdentityMatrix` share a scalar payload but are distinct variants: a
/// `Number` is a plain scalar, an `IdentityMatrix` is `k·E` of a size that is only fixed
/// once it meets a sized matrix (or is widened explicitly with [`Value::widen`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Value {
    Number(f64),
    IdentityMatrix(f64),
    Matrix(Matrix),
    List(Vec<Value>),
    Solution(Solution),
}

/// The variant of a [`Value`], for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    IdentityMatrix,
    Matrix,
    List,
    Solution,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Number => "Number",
            ValueKind::IdentityMatrix => "IdentityMatrix",
            ValueKind::Matrix => "Matrix",
            ValueKind::List => "List",
            ValueKind::Solution => "Solution",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::IdentityMatrix(_) => ValueKind::IdentityMatrix,
            Value::Matrix(_) => ValueKind::Matrix,
            Value::List(_) => ValueKind::List,
            Value::Solution(_) => ValueKind::Solution,
        }
    }

    /// The matrix storage of a `Matrix` or a `Solution`.
    pub fn as_matrix(&self) -> Option<&Matrix> {
        match self {
            Value::Matrix(m) => Some(m),
            Value::Solution(s) => Some(s.matrix()),
            _ => None,
        }
    }

    /// The scalar payload of a `Number` or an `IdentityMatrix`.
    pub fn scalar(&self) -> Option<f64> {
        match self {
            Value::Number(x) | Value::IdentityMatrix(x) => Some(*x),
            _ => None,
        }
    }

    /// Expands a `Number` or `IdentityMatrix` into a concrete `rows x cols` matrix with the
    /// scalar on the diagonal.
    pub fn widen(&self, rows: usize, cols: usize) -> Result<Matrix> {
        match self {
            Value::Number(x) | Value::IdentityMatrix(x) => Ok(Matrix::identity(rows, cols, *x)),
            other => Err(ComputationError::new(format!(
                "cannot widen {} to a {} x {} matrix",
                other.kind(),
                rows,
                cols
            ))
            .with_incorrect(other.clone())
            .into()),
        }
    }

    /// Whether any entry lies outside `[low, high]` in absolute value.
    ///
    /// Exact zeros never count. Lists and solutions are never extreme.
    pub fn is_extreme(&self, low: f64, high: f64) -> bool {
        let outside = |x: &f64| {
            let abs = x.abs();
            abs != 0.0 && (abs < low || abs > high)
        };
        match self {
            Value::Number(x) | Value::IdentityMatrix(x) => outside(x),
            Value::Matrix(m) => m.data().iter().any(outside),
            Value::List(_) | Value::Solution(_) => false,
        }
    }
}

impl From<Matrix> for Value {
    fn from(m: Matrix) -> Self {
        Value::Matrix(m)
    }
}

impl From<Solution> for Value {
    fn from(s: Solution) -> Self {
        Value::Solution(s)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

/// Short one-line summary, used in error details and list rendering.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(x) => f.write_str(&format_number(*x)),
            Value::IdentityMatrix(x) => write!(f, "{}·E", format_number(*x)),
            Value::Matrix(m) => write!(f, "Matrix<{} x {}>", m.rows(), m.cols()),
            Value::List(items) => write!(f, "List<{} elements>", items.len()),
            Value::Solution(s) => {
                let (rows, cols) = s.matrix().size();
                write!(f, "Solution<{} x {}>", rows, cols)
            }
        }
    }
}
