use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Domain errors
    #[error("Invalid digit: {0} (must be 0-9)")]
    InvalidDigit(u8),

    #[error("Cursor {index} out of range for code length {length}")]
    InvalidCursor { index: usize, length: usize },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, Error>;
