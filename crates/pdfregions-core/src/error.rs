//! Error types for pdfregions.
//!
//! [`PdfError`] covers fatal document errors (a document that cannot be opened
//! or interpreted). [`TemplateError`] and [`TableError`] cover the persisted
//! template and CSV outputs.

use std::fmt;

/// Fatal error types for PDF processing.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfError {
    /// Error parsing PDF structure or syntax.
    ParseError(String),
    /// I/O error reading PDF data.
    IoError(String),
    /// Error resolving font or encoding information.
    FontError(String),
    /// Error during content stream interpretation.
    InterpreterError(String),
    /// The PDF is encrypted and requires a password to open.
    PasswordRequired,
    /// The document has no pages.
    NoPages,
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::ParseError(msg) => write!(f, "parse error: {msg}"),
            PdfError::IoError(msg) => write!(f, "I/O error: {msg}"),
            PdfError::FontError(msg) => write!(f, "font error: {msg}"),
            PdfError::InterpreterError(msg) => write!(f, "interpreter error: {msg}"),
            PdfError::PasswordRequired => write!(f, "PDF is encrypted and requires a password"),
            PdfError::NoPages => write!(f, "PDF has no pages"),
        }
    }
}

impl std::error::Error for PdfError {}

impl From<std::io::Error> for PdfError {
    fn from(err: std::io::Error) -> Self {
        PdfError::IoError(err.to_string())
    }
}

/// Errors loading or saving a region template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The source is not a JSON object of `label -> [x0, y0, x1, y1]`,
    /// including text that is not JSON at all.
    #[error("malformed template: {reason}")]
    Malformed { reason: String },

    #[error("template I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TemplateError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        TemplateError::Malformed {
            reason: reason.into(),
        }
    }
}

/// Errors reading or writing CSV outputs.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("table I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
