//! Parse errors for the textual forms of the core types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("invalid hex: expected {expected} hex characters")]
    InvalidHex { expected: usize },
}
