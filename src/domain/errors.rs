use thiserror::Error;

/// Classified evaluation failure.
///
/// The session shows both kinds as a single "Error" state, but callers and
/// tests can still tell them apart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Structurally invalid input: unknown symbol, unbalanced parentheses,
    /// missing operand, trailing tokens.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Numerically undefined result: division by zero, non-finite value,
    /// wrong number of function arguments.
    #[error("Domain error: {0}")]
    Domain(String),
}

impl EvalError {
    pub fn syntax(message: impl Into<String>) -> Self {
        EvalError::Syntax(message.into())
    }

    pub fn domain(message: impl Into<String>) -> Self {
        EvalError::Domain(message.into())
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, EvalError::Syntax(_))
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, EvalError::Domain(_))
    }
}

pub type EvalResult<T> = Result<T, EvalError>;
