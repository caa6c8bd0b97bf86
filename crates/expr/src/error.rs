// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Raised while substituting `{name}` placeholders.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterpolationError {
    #[error("unknown variable {0:?}")]
    UnknownVariable(String),
    #[error("cannot select field {field:?} on non-object value {name:?}")]
    NotAnObject { name: String, field: String },
}

/// Raised while parsing or evaluating a Decision expression. Must never panic on malformed user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("unexpected character {0:?} at byte {1}")]
    UnexpectedChar(char, usize),
    #[error("unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),
    #[error("unexpected end of expression")]
    UnexpectedEof,
    #[error("unexpected token {found:?}, expected {expected}")]
    UnexpectedToken { found: String, expected: &'static str },
    #[error("unknown function {0:?}")]
    UnknownFunction(String),
    #[error("function {name:?} expects {expected} argument(s), got {got}")]
    ArityMismatch { name: String, expected: usize, got: usize },
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("{0}")]
    Interpolation(#[from] InterpolationError),
}

impl From<InterpolationError> for cronplus_core::CronplusError {
    fn from(err: InterpolationError) -> Self {
        cronplus_core::CronplusError::Interpolation(err.to_string())
    }
}

impl From<ExpressionError> for cronplus_core::CronplusError {
    fn from(err: ExpressionError) -> Self {
        cronplus_core::CronplusError::Expression(err.to_string())
    }
}
