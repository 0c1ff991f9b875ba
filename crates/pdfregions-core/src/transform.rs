//! Conversion between raster pixel space and PDF point space.
//!
//! A page rendered at `dpi` dots per inch has `scale = dpi / 72` pixels per
//! point. Rectangles drawn by the user arrive in pixel space and are converted
//! with [`Scale::rect_to_point`] before they are stored or used for extraction.

use crate::geometry::{BBox, Point};

/// PDF user space units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Default capture render resolution.
pub const DEFAULT_DPI: f64 = 150.0;

/// Pixels per point for a given render resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f64);

impl Scale {
    /// Scale for a page rendered at `dpi`.
    ///
    /// Returns `None` for a non-finite or non-positive resolution.
    pub fn from_dpi(dpi: f64) -> Option<Self> {
        if dpi.is_finite() && dpi > 0.0 {
            Some(Self(dpi / POINTS_PER_INCH))
        } else {
            None
        }
    }

    pub fn factor(&self) -> f64 {
        self.0
    }

    pub fn dpi(&self) -> f64 {
        self.0 * POINTS_PER_INCH
    }

    pub fn to_point(&self, pixel: f64) -> f64 {
        to_point(pixel, self.0)
    }

    pub fn to_pixel(&self, point: f64) -> f64 {
        to_pixel(point, self.0)
    }

    pub fn rect_to_point(&self, rect: &PixelRect) -> BBox {
        BBox::new(
            self.to_point(rect.x0),
            self.to_point(rect.y0),
            self.to_point(rect.x1),
            self.to_point(rect.y1),
        )
    }

    pub fn rect_to_pixel(&self, bbox: &BBox) -> PixelRect {
        PixelRect {
            x0: self.to_pixel(bbox.x0),
            y0: self.to_pixel(bbox.top),
            x1: self.to_pixel(bbox.x1),
            y1: self.to_pixel(bbox.bottom),
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self(DEFAULT_DPI / POINTS_PER_INCH)
    }
}

/// `pixel / scale`.
pub fn to_point(pixel: f64, scale: f64) -> f64 {
    pixel / scale
}

/// `point * scale`.
pub fn to_pixel(point: f64, scale: f64) -> f64 {
    point * scale
}

/// Rectangle in pixel space of a rendered page image (top-left origin).
///
/// Always normalized: `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PixelRect {
    /// Build from the two corners of a drag, in whatever order they came.
    pub fn from_drag(press: (f64, f64), release: (f64, f64)) -> Self {
        let bbox = BBox::from_corners(
            Point::new(press.0, press.1),
            Point::new(release.0, release.1),
        );
        Self {
            x0: bbox.x0,
            y0: bbox.top,
            x1: bbox.x1,
            y1: bbox.bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Whether both spans reach `min_span` pixels.
    pub fn spans_at_least(&self, min_span: f64) -> bool {
        self.width() >= min_span && self.height() >= min_span
    }
}
