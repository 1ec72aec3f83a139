//! Evaluation errors.

use thiserror::Error;

/// A runtime failure. Evaluation stops at the first error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A name with no binding, or an operator position holding a name
    /// that is neither registered nor aliased.
    #[error("undeclared identifier: {0}")]
    UndeclaredIdentifier(String),
    /// An operand or reference did not produce what the operation needs.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// A random choice over zero options.
    #[error("random choice has no options")]
    EmptyChoice,
    /// The random-value resolver produced something unusable, such as a
    /// non-finite number.
    #[error("unsupported random value: {0}")]
    UnsupportedRandNum(String),
}

pub type EvalResult<T> = Result<T, EvalError>;
