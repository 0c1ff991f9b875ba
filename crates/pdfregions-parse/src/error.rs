//! Backend errors.
//!
//! [`BackendError`] is what the lopdf backend and the interpreter return; the
//! facade turns it into [`PdfError`] at the crate boundary.

use pdfregions_core::PdfError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error resolving font or encoding information.
    #[error("font error: {0}")]
    Font(String),

    /// Error during content stream interpretation.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// A document-level condition such as an encrypted file.
    #[error(transparent)]
    Core(#[from] PdfError),
}

impl From<BackendError> for PdfError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => PdfError::ParseError(msg),
            BackendError::Io(e) => PdfError::IoError(e.to_string()),
            BackendError::Font(msg) => PdfError::FontError(msg),
            BackendError::Interpreter(msg) => PdfError::InterpreterError(msg),
            BackendError::Core(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_parse_display() {
        let err = BackendError::Parse("invalid xref table".to_string());
        assert_eq!(err.to_string(), "PDF parse error: invalid xref table");
    }

    #[test]
    fn backend_error_io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: BackendError = io_err.into();
        assert!(matches!(err, BackendError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn converts_to_pdf_error() {
        let pdf_err: PdfError = BackendError::Font("missing widths".to_string()).into();
        assert_eq!(pdf_err, PdfError::FontError("missing widths".to_string()));

        let pdf_err: PdfError = BackendError::Interpreter("stack underflow".to_string()).into();
        assert_eq!(
            pdf_err,
            PdfError::InterpreterError("stack underflow".to_string())
        );
    }

    #[test]
    fn core_error_passes_through() {
        let pdf_err: PdfError = BackendError::Core(PdfError::PasswordRequired).into();
        assert_eq!(pdf_err, PdfError::PasswordRequired);
    }
}
