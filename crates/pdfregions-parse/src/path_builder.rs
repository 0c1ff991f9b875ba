//! Path construction for `m l c v y h re`.
//!
//! Points are given already transformed by the CTM in force when the
//! operator ran. Bézier curves are flattened into short line runs.

use pdfregions_core::Point;

/// Line segments per flattened Bézier curve.
const CURVE_STEPS: usize = 8;

#[derive(Debug, Default)]
pub struct PathBuilder {
    subpaths: Vec<(Vec<Point>, bool)>,
    current: Vec<Point>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_point(&self) -> Option<Point> {
        self.current.last().copied()
    }

    pub fn move_to(&mut self, p: Point) {
        self.finish_subpath(false);
        self.current.push(p);
    }

    /// With no current point this starts a subpath at `p`.
    pub fn line_to(&mut self, p: Point) {
        self.current.push(p);
    }

    pub fn curve_to(&mut self, c1: Point, c2: Point, end: Point) {
        let Some(start) = self.current_point() else {
            self.current.push(end);
            return;
        };
        for step in 1..=CURVE_STEPS {
            let t = step as f64 / CURVE_STEPS as f64;
            let mt = 1.0 - t;
            let (w0, w1, w2, w3) = (mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t);
            self.current.push(Point::new(
                w0 * start.x + w1 * c1.x + w2 * c2.x + w3 * end.x,
                w0 * start.y + w1 * c1.y + w2 * c2.y + w3 * end.y,
            ));
        }
    }

    /// `h`: close the current subpath.
    pub fn close(&mut self) {
        let start = self.current.first().copied();
        self.finish_subpath(true);
        // The current point returns to the subpath start.
        if let Some(start) = start {
            self.current.push(start);
        }
    }

    /// `re`, given its four transformed corners in drawing order.
    pub fn rect(&mut self, corners: [Point; 4]) {
        self.finish_subpath(false);
        self.current.extend(corners);
        self.finish_subpath(true);
        self.current.push(corners[0]);
    }

    /// Take the built subpaths, leaving the builder empty.
    pub fn take(&mut self) -> Vec<(Vec<Point>, bool)> {
        self.finish_subpath(false);
        self.current.clear();
        std::mem::take(&mut self.subpaths)
    }

    pub fn clear(&mut self) {
        self.subpaths.clear();
        self.current.clear();
    }

    /// Move the current run into `subpaths`. A lone point (a bare `m`) is
    /// dropped.
    fn finish_subpath(&mut self, closed: bool) {
        let points = std::mem::take(&mut self.current);
        if points.len() > 1 {
            self.subpaths.push((points, closed));
        }
    }
}
