//! Error types for I/O operations

use drawmap_core::Error;
use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("OBJ error: {0}")]
    Obj(#[from] obj::ObjError),

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        IoError::ParseError {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn cache(message: impl Into<String>) -> Self {
        IoError::Cache {
            message: message.into(),
        }
    }
}

impl From<IoError> for Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => Error::Io(e),
            IoError::FileNotFound { path } => Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path),
            )),
            IoError::InvalidFormat { format } => Error::UnsupportedFormat(format),
            other => Error::InvalidData(other.to_string()),
        }
    }
}
