//! Mapping from PDF user space to top-left page space.
//!
//! The visible area is the CropBox (MediaBox when there is none). Points are
//! shifted so the visible area starts at the origin, turned by the page's
//! `/Rotate`, and flipped so `y` grows downward like the rendered preview.

use pdfregions_core::{BBox, Ctm, Point};

/// Visible page size and the user space → page space transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    width: f64,
    height: f64,
    rotation: i32,
    to_page: Ctm,
}

impl PageGeometry {
    /// `media_box` and `crop_box` hold raw PDF box values
    /// (`x0`, `top` = lower-left; `x1`, `bottom` = upper-right).
    /// Rotation is normalized to 0, 90, 180 or 270; other values count as 0.
    pub fn new(media_box: BBox, crop_box: Option<BBox>, rotation: i64) -> Self {
        let view = crop_box.unwrap_or(media_box);
        let (llx, lly) = (view.x0.min(view.x1), view.top.min(view.bottom));
        let (urx, ury) = (view.x0.max(view.x1), view.top.max(view.bottom));
        let (w, h) = (urx - llx, ury - lly);

        let rotation = match rotation.rem_euclid(360) {
            90 => 90,
            180 => 180,
            270 => 270,
            _ => 0,
        };
        let (to_page, width, height) = match rotation {
            90 => (Ctm::new(0.0, 1.0, 1.0, 0.0, -lly, -llx), h, w),
            180 => (Ctm::new(-1.0, 0.0, 0.0, 1.0, urx, -lly), w, h),
            270 => (Ctm::new(0.0, -1.0, -1.0, 0.0, ury, urx), h, w),
            _ => (Ctm::new(1.0, 0.0, 0.0, -1.0, -llx, ury), w, h),
        };

        Self {
            width,
            height,
            rotation,
            to_page,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    pub fn normalize_point(&self, p: Point) -> Point {
        self.to_page.transform_point(p)
    }

    /// Page-space box covering the user-space quadrilateral `corners`.
    pub fn normalize_corners(&self, corners: &[Point]) -> BBox {
        let mut mapped = corners.iter().map(|p| self.normalize_point(*p));
        let Some(first) = mapped.next() else {
            return BBox::new(0.0, 0.0, 0.0, 0.0);
        };
        mapped.fold(BBox::from_corners(first, first), |b, p| {
            BBox::new(b.x0.min(p.x), b.top.min(p.y), b.x1.max(p.x), b.bottom.max(p.y))
        })
    }
}
