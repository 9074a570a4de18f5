//! Error types for I/O operations

use alphacrop_core::Error;
use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Write error: {message}")]
    WriteError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => Error::Io(e),
            IoError::FileNotFound { .. } => {
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, err.to_string()))
            }
            IoError::InvalidFormat { format } => Error::UnsupportedFormat(format),
            other => Error::InvalidData(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_into_core_error() {
        let err: Error = IoError::FileNotFound {
            path: "missing.png".to_string(),
        }
        .into();
        match err {
            Error::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
                assert!(e.to_string().contains("missing.png"));
            }
            other => panic!("unexpected error {:?}", other),
        }

        let err: Error = IoError::InvalidFormat {
            format: "tga".to_string(),
        }
        .into();
        assert!(matches!(err, Error::UnsupportedFormat(f) if f == "tga"));

        let err: Error = IoError::ParseError {
            message: "bad index".to_string(),
        }
        .into();
        assert!(matches!(err, Error::InvalidData(m) if m.contains("bad index")));
    }
}
