//! Operators over [`Value`].
//!
//! Every operator matches the pair of operand variants explicitly. A `Solution` takes part
//! as the matrix it wraps, and results built from it are plain matrices again.

use crate::error::{ComputationError, CoreError, Result};
use crate::gauss::{self, is_zero};
use crate::matrix::Matrix;
use crate::value::Value;

/// Borrowed view of an operand used for dispatch.
#[derive(Clone, Copy)]
enum Shape<'a> {
    Number(f64),
    Identity(f64),
    Matrix(&'a Matrix),
    List,
}

impl Value {
    fn shape(&self) -> Shape<'_> {
        match self {
            Value::Number(x) => Shape::Number(*x),
            Value::IdentityMatrix(x) => Shape::Identity(*x),
            Value::Matrix(m) => Shape::Matrix(m),
            Value::Solution(s) => Shape::Matrix(s.matrix()),
            Value::List(_) => Shape::List,
        }
    }

    fn unary_unsupported(&self, operation: &str) -> CoreError {
        ComputationError::new(format!(
            "operation `{}` is not defined for {}",
            operation,
            self.kind()
        ))
        .with_incorrect(self.clone())
        .into()
    }

    fn division_by_zero(&self, divisor: &Value) -> CoreError {
        ComputationError::new("division by zero")
            .with_left(self.clone())
            .with_right(divisor.clone())
            .into()
    }

    pub fn add(&self, other: &Value) -> Result<Value> {
        match (self.shape(), other.shape()) {
            (Shape::Number(a), Shape::Number(b)) => Ok(Value::Number(a + b)),
            (Shape::Number(a) | Shape::Identity(a), Shape::Identity(b))
            | (Shape::Identity(a), Shape::Number(b)) => Ok(Value::IdentityMatrix(a + b)),
            (Shape::Matrix(m), Shape::Number(x) | Shape::Identity(x))
            | (Shape::Number(x) | Shape::Identity(x), Shape::Matrix(m)) => {
                Ok(m.add_diagonal(x).into())
            }
            (Shape::Matrix(a), Shape::Matrix(b)) => {
                a.check_same_size(b, "add")?;
                Ok(a.zip(b, |x, y| x + y)?.into())
            }
            (Shape::List, _) | (_, Shape::List) => {
                Err(ComputationError::unsupported("add", self, other).into())
            }
        }
    }

    pub fn negate(&self) -> Result<Value> {
        match self.shape() {
            Shape::Number(x) => Ok(Value::Number(-x)),
            Shape::Identity(x) => Ok(Value::IdentityMatrix(-x)),
            Shape::Matrix(m) => Ok(m.map(|x| -x).into()),
            Shape::List => Err(self.unary_unsupported("negate")),
        }
    }

    /// `self + (-other)`.
    pub fn subtract(&self, other: &Value) -> Result<Value> {
        match other.shape() {
            Shape::List => Err(ComputationError::unsupported("subtract", self, other).into()),
            _ => self.add(&other.negate()?),
        }
    }

    /// Scalar scaling, or the true matrix product for two matrices.
    pub fn multiply(&self, other: &Value) -> Result<Value> {
        match (self.shape(), other.shape()) {
            (Shape::Number(a), Shape::Number(b)) => Ok(Value::Number(a * b)),
            (Shape::Number(a) | Shape::Identity(a), Shape::Identity(b))
            | (Shape::Identity(a), Shape::Number(b)) => Ok(Value::IdentityMatrix(a * b)),
            (Shape::Matrix(m), Shape::Number(x) | Shape::Identity(x))
            | (Shape::Number(x) | Shape::Identity(x), Shape::Matrix(m)) => {
                Ok(m.map(|v| v * x).into())
            }
            (Shape::Matrix(a), Shape::Matrix(b)) => Ok(a.multiply(b)?.into()),
            (Shape::List, _) | (_, Shape::List) => {
                Err(ComputationError::unsupported("multiply", self, other).into())
            }
        }
    }

    /// Division by a number or an identity matrix. Dividing by a general matrix always fails.
    pub fn divide(&self, other: &Value) -> Result<Value> {
        match (self.shape(), other.shape()) {
            (Shape::List, _) | (_, Shape::List) => {
                Err(ComputationError::unsupported("divide", self, other).into())
            }
            (_, Shape::Matrix(_)) => Err(ComputationError::new(
                "cannot divide by a matrix: the divisor must be a number or an identity matrix",
            )
            .with_left(self.clone())
            .with_right(other.clone())
            .into()),
            (_, Shape::Number(b) | Shape::Identity(b)) if is_zero(b) => {
                Err(self.division_by_zero(other))
            }
            (Shape::Number(a), Shape::Number(b)) => Ok(Value::Number(a / b)),
            (Shape::Number(a) | Shape::Identity(a), Shape::Identity(b))
            | (Shape::Identity(a), Shape::Number(b)) => Ok(Value::IdentityMatrix(a / b)),
            (Shape::Matrix(m), Shape::Number(x) | Shape::Identity(x)) => {
                Ok(m.map(|v| v / x).into())
            }
        }
    }

    /// Raises the value to `exponent`.
    ///
    /// Scalars use real exponentiation. Matrices need an integral exponent: `0` gives the
    /// identity of the same shape and a negative exponent inverts first.
    pub fn power(&self, exponent: f64) -> Result<Value> {
        match self.shape() {
            Shape::Number(x) => Ok(Value::Number(x.powf(exponent))),
            Shape::Identity(x) => Ok(Value::IdentityMatrix(x.powf(exponent))),
            Shape::Matrix(m) => {
                if !exponent.is_finite() || exponent.fract() != 0.0 {
                    return Err(ComputationError::new(format!(
                        "a matrix can only be raised to an integer power, got {}",
                        exponent
                    ))
                    .with_left(m.clone())
                    .into());
                }
                if exponent.abs() > u32::MAX as f64 {
                    return Err(ComputationError::new(format!(
                        "exponent {} is too large",
                        exponent
                    ))
                    .with_left(m.clone())
                    .into());
                }
                let count = exponent.abs() as u64;
                if count == 0 {
                    return Ok(Matrix::identity(m.rows(), m.cols(), 1.0).into());
                }
                let base = if exponent < 0.0 {
                    gauss::invert(m)?
                } else {
                    m.clone()
                };
                Ok(repeated_product(base, count)?.into())
            }
            Shape::List => Err(self.unary_unsupported("power")),
        }
    }

    /// Multiplicative inverse: `1 / x` for scalars, the inverse matrix for square matrices.
    pub fn invert(&self) -> Result<Value> {
        match self.shape() {
            Shape::Number(x) | Shape::Identity(x) if is_zero(x) => {
                Err(Value::Number(1.0).division_by_zero(self))
            }
            Shape::Number(x) => Ok(Value::Number(1.0 / x)),
            Shape::Identity(x) => Ok(Value::IdentityMatrix(1.0 / x)),
            Shape::Matrix(m) => Ok(gauss::invert(m)?.into()),
            Shape::List => Err(self.unary_unsupported("invert")),
        }
    }

    pub fn transpose(&self) -> Result<Value> {
        match self.shape() {
            Shape::Number(x) => Ok(Value::Number(x)),
            Shape::Identity(x) => Ok(Value::IdentityMatrix(x)),
            Shape::Matrix(m) => Ok(m.transpose().into()),
            Shape::List => Err(self.unary_unsupported("transpose")),
        }
    }

    pub fn multiply_elements(&self, other: &Value) -> Result<Value> {
        match (self.shape(), other.shape()) {
            (Shape::Matrix(a), Shape::Matrix(b)) => Ok(a.multiply_elements(b)?.into()),
            _ => Err(ComputationError::unsupported("multiply element-wise", self, other).into()),
        }
    }

    /// `[self | other]`.
    pub fn join_horizontal(&self, other: &Value) -> Result<Value> {
        match (self.shape(), other.shape()) {
            (Shape::Matrix(a), Shape::Matrix(b)) => Ok(a.join_horizontal(b)?.into()),
            _ => Err(ComputationError::unsupported("join side by side", self, other).into()),
        }
    }

    /// `self` stacked on top of `other`.
    pub fn join_vertical(&self, other: &Value) -> Result<Value> {
        match (self.shape(), other.shape()) {
            (Shape::Matrix(a), Shape::Matrix(b)) => Ok(a.join_vertical(b)?.into()),
            _ => Err(ComputationError::unsupported("stack", self, other).into()),
        }
    }

    /// A new list holding the elements of `self` followed by `item`. `self` is left as is.
    pub fn append(&self, item: Value) -> Result<Value> {
        match self {
            Value::List(items) => {
                let mut items = items.clone();
                items.push(item);
                Ok(Value::List(items))
            }
            other => Err(ComputationError::unsupported("append", other, &item).into()),
        }
    }
}

/// `base` multiplied by itself `count` times, by repeated squaring. `count` must be positive.
fn repeated_product(mut base: Matrix, mut count: u64) -> Result<Matrix> {
    let mut result: Option<Matrix> = None;
    loop {
        if count & 1 == 1 {
            result = Some(match result {
                Some(acc) => acc.multiply(&base)?,
                None => base.clone(),
            });
        }
        count >>= 1;
        if count == 0 {
            break;
        }
        base = base.multiply(&base)?;
    }
    result.ok_or_else(|| CoreError::Internal("matrix power with a zero exponent".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: Vec<Vec<f64>>) -> Value {
        Value::Matrix(Matrix::from_rows(rows).unwrap())
    }

    fn computation_message(err: CoreError) -> String {
        match err {
            CoreError::Computation(e) => e.message,
            other => panic!("expected a computation error, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_kinds_are_kept_apart() {
        let n = Value::Number(2.0);
        let e = Value::IdentityMatrix(3.0);
        assert_eq!(n.add(&n).unwrap(), Value::Number(4.0));
        assert_eq!(n.add(&e).unwrap(), Value::IdentityMatrix(5.0));
        assert_eq!(e.multiply(&n).unwrap(), Value::IdentityMatrix(6.0));
        assert_eq!(e.subtract(&e).unwrap(), Value::IdentityMatrix(0.0));
    }

    #[test]
    fn test_matrix_plus_identity_touches_diagonal() {
        let a = m(vec![vec![1.0, 1.0, 1.0], vec![1.0, 1.0, 1.0]]);
        let sum = a.add(&Value::IdentityMatrix(2.0)).unwrap();
        assert_eq!(sum, m(vec![vec![3.0, 1.0, 1.0], vec![1.0, 3.0, 1.0]]));
        assert_eq!(Value::IdentityMatrix(2.0).add(&a).unwrap(), sum);
    }

    #[test]
    fn test_identity_minus_matrix() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let diff = Value::IdentityMatrix(1.0).subtract(&a).unwrap();
        assert_eq!(diff, m(vec![vec![0.0, -2.0], vec![-3.0, -3.0]]));
    }

    #[test]
    fn test_matrix_sizes_must_match() {
        let a = m(vec![vec![1.0, 2.0]]);
        let b = m(vec![vec![1.0], vec![2.0]]);
        let message = computation_message(a.add(&b).unwrap_err());
        assert!(message.contains("sizes differ"), "{}", message);
        assert!(a.multiply_elements(&b).is_err());
    }

    #[test]
    fn test_division() {
        let a = m(vec![vec![2.0, 4.0]]);
        assert_eq!(a.divide(&Value::Number(2.0)).unwrap(), m(vec![vec![1.0, 2.0]]));
        assert_eq!(
            Value::Number(1.0).divide(&Value::Number(4.0)).unwrap(),
            Value::Number(0.25)
        );

        let message = computation_message(a.divide(&Value::Number(0.0)).unwrap_err());
        assert_eq!(message, "division by zero");

        let square = m(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert!(square.divide(&square).is_err());
        assert!(Value::Number(1.0).divide(&square).is_err());
    }

    #[test]
    fn test_matrix_power() {
        let a = m(vec![vec![1.0, 1.0], vec![0.0, 1.0]]);
        assert_eq!(a.power(1.0).unwrap(), a);
        assert_eq!(a.power(3.0).unwrap(), m(vec![vec![1.0, 3.0], vec![0.0, 1.0]]));
        assert_eq!(a.power(-2.0).unwrap(), m(vec![vec![1.0, -2.0], vec![0.0, 1.0]]));
        assert!(a.power(0.5).is_err());

        let wide = m(vec![vec![5.0, 6.0, 7.0]]);
        assert_eq!(wide.power(0.0).unwrap(), m(vec![vec![1.0, 0.0, 0.0]]));
        assert!(wide.power(2.0).is_err());
    }

    #[test]
    fn test_scalar_power() {
        assert_eq!(Value::Number(2.0).power(10.0).unwrap(), Value::Number(1024.0));
        assert_eq!(Value::Number(4.0).power(-1.0).unwrap(), Value::Number(0.25));
        assert_eq!(
            Value::IdentityMatrix(2.0).power(3.0).unwrap(),
            Value::IdentityMatrix(8.0)
        );
    }

    #[test]
    fn test_append_copies() {
        let empty = Value::List(Vec::new());
        let one = empty.append(Value::Number(1.0)).unwrap();
        assert_eq!(empty, Value::List(Vec::new()));
        assert_eq!(one, Value::List(vec![Value::Number(1.0)]));
        assert!(Value::Number(1.0).append(Value::Number(2.0)).is_err());
    }

    #[test]
    fn test_lists_are_rejected_by_arithmetic() {
        let list = Value::List(vec![Value::Number(1.0)]);
        let message = computation_message(list.add(&Value::Number(1.0)).unwrap_err());
        assert_eq!(message, "operation `add` is not defined for List and Number");
        assert!(list.negate().is_err());
        assert!(Value::Number(1.0).subtract(&list).is_err());
    }

    #[test]
    fn test_solution_acts_as_matrix() {
        let s = Value::Solution(gauss::solve(&Matrix::from_rows(vec![vec![2.0, 4.0]]).unwrap()));
        assert_eq!(s.transpose().unwrap(), m(vec![vec![1.0], vec![2.0]]));
    }

    #[test]
    fn test_invert_scalar() {
        assert_eq!(Value::Number(4.0).invert().unwrap(), Value::Number(0.25));
        assert!(Value::IdentityMatrix(0.0).invert().is_err());
    }
}
