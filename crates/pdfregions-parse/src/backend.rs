//! PDF backend trait.
//!
//! A backend opens a document and turns one page into [`PageContent`]:
//! visible size plus the characters and paths painted on it, all in
//! top-left page space.

use pdfregions_core::{Char, PagePath, PdfError};

use crate::interpreter::ExtractOptions;

/// Everything extracted from one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    /// Visible width in points (after CropBox and rotation).
    pub width: f64,
    /// Visible height in points.
    pub height: f64,
    /// Characters in content-stream order.
    pub chars: Vec<Char>,
    pub paths: Vec<PagePath>,
}

/// A PDF parsing backend.
pub trait PdfBackend {
    type Document;
    type Error: std::error::Error + Into<PdfError>;

    /// Parse a document from bytes.
    ///
    /// Encrypted documents are rejected with [`PdfError::PasswordRequired`].
    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error>;

    fn page_count(doc: &Self::Document) -> usize;

    /// Interpret page `index` (0-based).
    fn extract_page(
        doc: &Self::Document,
        index: usize,
        options: &ExtractOptions,
    ) -> Result<PageContent, Self::Error>;
}
