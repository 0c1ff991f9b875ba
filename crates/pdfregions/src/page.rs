//! Page type for reading text out of rectangular regions.

use pdfregions_core::{
    BBox, Char, PagePath, PdfError, RegionTextSource, TextOptions, assemble_text, region_text,
};

/// A single interpreted page.
///
/// Coordinates are points with the origin at the top-left corner of the
/// visible page area.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Page index (0-based).
    page_number: usize,
    width: f64,
    height: f64,
    /// Characters in content-stream order.
    chars: Vec<Char>,
    /// Painted paths, used by the preview renderer.
    paths: Vec<PagePath>,
}

impl Page {
    pub fn new(
        page_number: usize,
        width: f64,
        height: f64,
        chars: Vec<Char>,
        paths: Vec<PagePath>,
    ) -> Self {
        Self {
            page_number,
            width,
            height,
            chars,
            paths,
        }
    }

    /// Returns the page index (0-based).
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    /// Returns the page width in points.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the page height in points.
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn chars(&self) -> &[Char] {
        &self.chars
    }

    pub fn paths(&self) -> &[PagePath] {
        &self.paths
    }

    /// The visible page area as a point-space rectangle.
    pub fn bbox(&self) -> BBox {
        BBox::new(0.0, 0.0, self.width, self.height)
    }

    /// Normalized text of every character whose origin lies inside `region`,
    /// using the default tolerances.
    ///
    /// Never fails: an empty or off-page region yields `""`.
    pub fn region_text(&self, region: &BBox) -> String {
        self.region_text_with(region, &TextOptions::default())
    }

    pub fn region_text_with(&self, region: &BBox, options: &TextOptions) -> String {
        region_text(&self.chars, region, options)
    }

    /// Raw text of the whole page, characters joined in paint order.
    pub fn text(&self) -> String {
        assemble_text(&self.chars, &TextOptions::default())
    }
}

impl RegionTextSource for Page {
    fn region_text(&self, region: &BBox) -> Result<String, PdfError> {
        Ok(Page::region_text(self, region))
    }
}
