//! Error types for alphacrop

use thiserror::Error;

/// Main error type for alphacrop operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for alphacrop operations
pub type Result<T> = std::result::Result<T, Error>;
