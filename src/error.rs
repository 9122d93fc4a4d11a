//! Error types for docrank library.

use std::io;
use thiserror::Error;

/// Result type alias for docrank operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while structuring and ranking documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and cannot be read.
    #[error("Document is encrypted")]
    Encrypted,

    /// The PDF structure is corrupted or malformed.
    #[error("Corrupted PDF structure: {0}")]
    Corrupted(String),

    /// The embedding backend failed or returned an unusable result.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// The analysis request (persona.json) could not be read.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error while rendering a report.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::UnsupportedVersion("3.0".to_string());
        assert_eq!(err.to_string(), "Unsupported PDF version: 3.0");

        let err = Error::Embedding("model not loaded".to_string());
        assert_eq!(err.to_string(), "Embedding error: model not loaded");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
