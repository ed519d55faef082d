use matcalc_core::{ComputationError, CoreError};
use rowan::TextRange;
use thiserror::Error;

/// The input could not be turned into a computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed number `{text}`")]
    MalformedNumber {
        text: String,
        span: Option<TextRange>,
    },
    #[error("unbalanced brackets")]
    UnbalancedBrackets { span: Option<TextRange> },
    #[error("missing operand for `{operator}`")]
    MissingOperand {
        operator: String,
        span: Option<TextRange>,
    },
    #[error("expression too complex or malformed")]
    TooComplex { span: Option<TextRange> },
}

impl ParseError {
    /// Source range the error refers to, when known.
    pub fn span(&self) -> Option<TextRange> {
        match self {
            ParseError::MalformedNumber { span, .. }
            | ParseError::MissingOperand { span, .. }
            | ParseError::UnbalancedBrackets { span }
            | ParseError::TooComplex { span } => *span,
        }
    }

    fn span_mut(&mut self) -> &mut Option<TextRange> {
        match self {
            ParseError::MalformedNumber { span, .. }
            | ParseError::MissingOperand { span, .. }
            | ParseError::UnbalancedBrackets { span }
            | ParseError::TooComplex { span } => span,
        }
    }
}

/// Everything that can stop an evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Computation(#[from] ComputationError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for EvalError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Computation(e) => EvalError::Computation(e),
            CoreError::Internal(message) => EvalError::Internal(message),
        }
    }
}

impl EvalError {
    /// Human-readable name of the error family.
    pub fn category(&self) -> &'static str {
        match self {
            EvalError::Parse(_) => "parse error",
            EvalError::Computation(_) => "computation error",
            EvalError::Internal(_) => "internal error",
        }
    }

    pub fn span(&self) -> Option<TextRange> {
        match self {
            EvalError::Parse(e) => e.span(),
            _ => None,
        }
    }

    /// Forgets the source range. Used for errors raised while evaluating text other than
    /// the current input, such as answers typed at a prompt.
    pub fn without_span(mut self) -> Self {
        if let EvalError::Parse(e) = &mut self {
            *e.span_mut() = None;
        }
        self
    }

    /// Message plus any operands recorded by a computation error.
    pub fn details(&self) -> String {
        match self {
            EvalError::Computation(e) => e.details(),
            other => other.to_string(),
        }
    }
}
