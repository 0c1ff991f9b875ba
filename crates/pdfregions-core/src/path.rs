//! Painted vector paths in page space.
//!
//! Only used to draw the capture preview: ruling lines and boxes help the
//! user find the regions they want to select. Curves arrive already flattened
//! to polylines.

use crate::geometry::{BBox, Point};

/// How a path was painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOp {
    Stroke,
    Fill,
    FillAndStroke,
}

impl PaintOp {
    pub fn strokes(self) -> bool {
        matches!(self, PaintOp::Stroke | PaintOp::FillAndStroke)
    }

    pub fn fills(self) -> bool {
        matches!(self, PaintOp::Fill | PaintOp::FillAndStroke)
    }
}

/// A connected run of points, optionally closed back to its first point.
#[derive(Debug, Clone, PartialEq)]
pub struct Subpath {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// A painted path with top-left origin coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePath {
    pub subpaths: Vec<Subpath>,
    pub paint: PaintOp,
    /// Stroke width in points.
    pub line_width: f64,
}

impl PagePath {
    /// Smallest box containing every point, or `None` for an empty path.
    pub fn bbox(&self) -> Option<BBox> {
        let mut points = self.subpaths.iter().flat_map(|s| s.points.iter());
        let first = *points.next()?;
        Some(points.fold(BBox::from_corners(first, first), |b, p| {
            BBox::new(b.x0.min(p.x), b.top.min(p.y), b.x1.max(p.x), b.bottom.max(p.y))
        }))
    }
}
