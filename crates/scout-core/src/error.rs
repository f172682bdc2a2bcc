//! Error types for Scout Core

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Division by zero: 7d volume is zero for token {address}")]
    DivisionByZero { address: String },
}

pub type ScoringResult<T> = Result<T, ScoringError>;
