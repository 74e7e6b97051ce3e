use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtisError {
    #[error("Check field {check} does not match zero count {zeros}")]
    InvalidSymbol { check: u8, zeros: u8 },

    #[error("Symbol value {0} does not fit in 7 data bits")]
    SymbolOutOfRange(u8),

    #[error("Bit ring overflow (capacity {capacity})")]
    RingOverflow { capacity: usize },

    #[error("Invalid input size: expected {expected} samples, got {actual}")]
    InvalidInputSize { expected: usize, actual: usize },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AtisError>;
