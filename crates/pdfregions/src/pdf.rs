//! Top-level PDF document type for opening documents and interpreting pages.

use std::path::Path;

use pdfregions_core::PdfError;
use pdfregions_parse::{ExtractOptions, LopdfBackend, LopdfDocument, PdfBackend};

use crate::Page;

/// A PDF document opened for extraction.
///
/// The document is parsed once; each call to [`Pdf::page`] interprets that
/// page's content stream afresh.
///
/// # Example
///
/// ```ignore
/// let pdf = Pdf::open_file("plan.pdf", None)?;
/// let page = pdf.first_page()?;
/// let text = page.region_text(&BBox::new(72.0, 60.0, 300.0, 90.0));
/// ```
pub struct Pdf {
    doc: LopdfDocument,
    options: ExtractOptions,
}

impl Pdf {
    /// Open a PDF document from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::IoError`] if the file cannot be read, and the
    /// errors of [`Pdf::open`] otherwise.
    pub fn open_file(
        path: impl AsRef<Path>,
        options: Option<ExtractOptions>,
    ) -> Result<Self, PdfError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| PdfError::IoError(e.to_string()))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "read document");
        Self::open(&bytes, options)
    }

    /// Open a PDF document from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::PasswordRequired`] if the PDF is encrypted,
    /// [`PdfError::NoPages`] if it has no pages, and [`PdfError::ParseError`]
    /// if the bytes are not a valid PDF document.
    pub fn open(bytes: &[u8], options: Option<ExtractOptions>) -> Result<Self, PdfError> {
        let doc = LopdfBackend::open(bytes).map_err(PdfError::from)?;
        if LopdfBackend::page_count(&doc) == 0 {
            return Err(PdfError::NoPages);
        }
        Ok(Self {
            doc,
            options: options.unwrap_or_default(),
        })
    }

    pub fn page_count(&self) -> usize {
        LopdfBackend::page_count(&self.doc)
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Interpret page `index` (0-based).
    pub fn page(&self, index: usize) -> Result<Page, PdfError> {
        let content =
            LopdfBackend::extract_page(&self.doc, index, &self.options).map_err(PdfError::from)?;
        tracing::debug!(
            page = index,
            chars = content.chars.len(),
            paths = content.paths.len(),
            "interpreted page"
        );
        Ok(Page::new(
            index,
            content.width,
            content.height,
            content.chars,
            content.paths,
        ))
    }

    /// Interpret the first page. Templates describe single-page documents,
    /// so this is the page every region is read from.
    pub fn first_page(&self) -> Result<Page, PdfError> {
        self.page(0)
    }
}

impl std::fmt::Debug for Pdf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pdf")
            .field("page_count", &self.page_count())
            .field("options", &self.options)
            .finish()
    }
}
