use crate::error::EvalError;
use matcalc_core::{ComputationError, Matrix, Value};

/// Evaluates one expression in the environment of the running evaluation.
pub type Evaluate<'e> = dyn FnMut(&str) -> Result<Option<Value>, EvalError> + 'e;

/// Interaction with whoever drives the evaluator.
pub trait Host {
    /// Produces a random matrix, asking for whatever parameters are needed. Answers may be
    /// expressions and can be evaluated with `eval`.
    fn random_matrix(&mut self, eval: &mut Evaluate<'_>) -> Result<Matrix, EvalError>;

    /// Reads a matrix entered by hand; usually implemented with [`matrix_from_text`].
    fn read_matrix(&mut self, eval: &mut Evaluate<'_>) -> Result<Matrix, EvalError>;

    /// Called at most once per evaluator, the first time a result has an entry whose
    /// magnitude lies outside `[low, high]`.
    fn warn_extreme_magnitude(&mut self, low: f64, high: f64);
}

/// Host without a user behind it: interactive commands fail and warnings go to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl Host for Detached {
    fn random_matrix(&mut self, _eval: &mut Evaluate<'_>) -> Result<Matrix, EvalError> {
        Err(ComputationError::new("random matrices need an interactive session").into())
    }

    fn read_matrix(&mut self, _eval: &mut Evaluate<'_>) -> Result<Matrix, EvalError> {
        Err(ComputationError::new("reading a matrix needs an interactive session").into())
    }

    fn warn_extreme_magnitude(&mut self, low: f64, high: f64) {
        log::warn!(
            "results are only reliable for magnitudes between {} and {}",
            low,
            high
        );
    }
}

/// Builds a matrix from text such as `1 2; 3 4`.
///
/// Rows are separated by `;` or line breaks and entries by whitespace. Every entry is
/// evaluated and has to produce a number. Short rows are padded with zeros and blank input
/// gives a `0 x 0` matrix.
pub fn matrix_from_text(text: &str, eval: &mut Evaluate<'_>) -> Result<Matrix, EvalError> {
    let rows: Vec<Vec<&str>> = text
        .split([';', '\n'])
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .filter(|entries| !entries.is_empty())
        .collect();

    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut matrix = Matrix::zeros(rows.len(), cols);
    for (r, entries) in rows.iter().enumerate() {
        for (c, entry) in entries.iter().copied().enumerate() {
            matrix[(r + 1, c + 1)] = match eval(entry)? {
                Some(Value::Number(x)) => x,
                Some(other) => {
                    return Err(ComputationError::new(format!(
                        "matrix entry `{}` is not a number",
                        entry
                    ))
                    .with_incorrect(other)
                    .into());
                }
                None => {
                    return Err(ComputationError::new(format!(
                        "matrix entry `{}` has no value",
                        entry
                    ))
                    .into());
                }
            };
        }
    }
    Ok(matrix)
}
