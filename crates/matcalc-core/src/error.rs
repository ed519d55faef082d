use crate::value::Value;
use std::fmt::Write;
use thiserror::Error;

/// A failure caused by the operands of a computation: size mismatch, wrong variant,
/// singular matrix, non-square input to a square-only operator and so on.
///
/// The operands involved are kept so the caller can show them next to the message.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ComputationError {
    pub message: String,
    pub left: Option<Value>,
    pub right: Option<Value>,
    pub incorrect: Option<Value>,
}

impl ComputationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            left: None,
            right: None,
            incorrect: None,
        }
    }

    pub fn with_left(mut self, value: impl Into<Value>) -> Self {
        self.left = Some(value.into());
        self
    }

    pub fn with_right(mut self, value: impl Into<Value>) -> Self {
        self.right = Some(value.into());
        self
    }

    pub fn with_incorrect(mut self, value: impl Into<Value>) -> Self {
        self.incorrect = Some(value.into());
        self
    }

    /// Error for an operator that has no definition for the given pair of variants.
    pub fn unsupported(operation: &str, left: &Value, right: &Value) -> Self {
        Self::new(format!(
            "operation `{}` is not defined for {} and {}",
            operation,
            left.kind(),
            right.kind()
        ))
        .with_left(left.clone())
        .with_right(right.clone())
    }

    /// Multi-line description: the message followed by every operand that was recorded.
    pub fn details(&self) -> String {
        let mut out = self.message.clone();
        let operands = [
            ("left operand", &self.left),
            ("right operand", &self.right),
            ("incorrect value", &self.incorrect),
        ];
        for (label, value) in operands {
            if let Some(value) = value {
                let _ = write!(out, "\n{}: {}", label, value);
            }
        }
        out
    }
}

/// Errors produced by the core crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error(transparent)]
    Computation(#[from] ComputationError),
    /// An invariant the caller should already have checked was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
