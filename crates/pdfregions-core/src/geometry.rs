//! Point-space geometry: points, affine matrices, and bounding boxes.
//!
//! All page coordinates use a top-left origin (y grows downward), the same
//! orientation as a rendered page image, so a rectangle drawn on the preview
//! maps onto the page without a flip.

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Affine transformation matrix `[a b c d e f]`, as used by PDF for the
/// current transformation matrix (CTM) and the text matrix.
///
/// Maps `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ctm {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Ctm {
    fn default() -> Self {
        Self::identity()
    }
}

impl Ctm {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Matrix product `self × other`: apply `self` first, then `other`.
    pub fn concat(&self, other: &Ctm) -> Ctm {
        Ctm {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn transform_point(&self, p: Point) -> Point {
        Point {
            x: self.a * p.x + self.c * p.y + self.e,
            y: self.b * p.x + self.d * p.y + self.f,
        }
    }
}

/// Bounding box in point space with top-left origin.
///
/// - `x0`: left edge
/// - `top`: top edge (distance from top of page)
/// - `x1`: right edge
/// - `bottom`: bottom edge (distance from top of page)
///
/// Serialized in templates as `[x0, top, x1, bottom]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Build a box from two opposite corners given in any order.
    ///
    /// The result always satisfies `x0 <= x1` and `top <= bottom`.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x0: a.x.min(b.x),
            top: a.y.min(b.y),
            x1: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether `p` lies inside the box, edges included.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.top && p.y <= self.bottom
    }

    /// Round every coordinate to `decimals` places (half away from zero).
    pub fn rounded(&self, decimals: i32) -> BBox {
        let factor = 10f64.powi(decimals);
        let r = |v: f64| (v * factor).round() / factor;
        BBox::new(r(self.x0), r(self.top), r(self.x1), r(self.bottom))
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.x0, self.top, self.x1, self.bottom]
    }
}
