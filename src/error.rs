//! Error types for the mdpage library.
//!
//! Parsing and style resolution are total and never produce these errors;
//! only file loading and the export stage surface them to the caller.

use std::io;
use thiserror::Error;

/// Result type alias for mdpage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading configuration or exporting.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A style configuration file could not be read as JSON at all.
    ///
    /// Individual invalid fields never raise this; they fall back to defaults.
    #[error("Invalid style configuration: {0}")]
    InvalidStyleConfig(String),

    /// Rasterize-and-paginate failed or produced no output.
    #[error("PDF export failed: {0}")]
    ExportFailure(String),

    /// Another export is still running on the same exporter.
    #[error("An export is already in progress")]
    ExportInProgress,

    /// The print host could not open the fallback document.
    #[error("Print host unavailable: {0}")]
    HostUnavailable(String),

    /// Error while serializing the document (JSON, text).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Error raised by the PDF container library.
    #[error("PDF container error: {0}")]
    Pdf(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the print fallback is the right remedy for this error.
    pub fn offers_print_fallback(&self) -> bool {
        matches!(self, Error::ExportFailure(_) | Error::Pdf(_))
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidStyleConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ExportInProgress;
        assert_eq!(err.to_string(), "An export is already in progress");

        let err = Error::ExportFailure("canvas too large".into());
        assert_eq!(err.to_string(), "PDF export failed: canvas too large");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_fallback_eligibility() {
        assert!(Error::ExportFailure("x".into()).offers_print_fallback());
        assert!(!Error::ExportInProgress.offers_print_fallback());
        assert!(!Error::HostUnavailable("x".into()).offers_print_fallback());
    }
}
