//! Error types for thresh-expr

use thiserror::Error;

/// Expression compilation and evaluation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// Grammar violation; `position` is the zero-based character offset of `token`
    #[error("Syntax error at position {position} near '{token}': {message}")]
    Syntax {
        position: usize,
        token: String,
        message: String,
    },

    #[error("More than one value was given for dimension {0}")]
    DuplicateDimension(String),

    #[error("Expected a simple expression but got: {0}")]
    CompoundExpressionNotAllowed(String),

    #[error("Expected sub-expression was not found for {0}")]
    MissingSubExpressionValue(String),

    /// Postfix program that does not reduce to a single value
    #[error("Malformed expression program: {0}")]
    MalformedProgram(String),
}

impl ExprError {
    pub fn syntax(position: usize, token: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            token: token.into(),
            message: message.into(),
        }
    }

    pub fn duplicate_dimension(name: impl Into<String>) -> Self {
        Self::DuplicateDimension(name.into())
    }

    pub fn compound_expression(text: impl Into<String>) -> Self {
        Self::CompoundExpressionNotAllowed(text.into())
    }

    pub fn missing_value(sub_expression: impl Into<String>) -> Self {
        Self::MissingSubExpressionValue(sub_expression.into())
    }

    pub fn malformed_program(msg: impl Into<String>) -> Self {
        Self::MalformedProgram(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ExprError>;
