//! Content handler callback trait.
//!
//! The interpreter reports what a content stream paints through
//! [`ContentHandler`]; the backend turns those events into page objects.
//! Event coordinates are PDF user space (bottom-left origin), already
//! multiplied by the CTM.

use pdfregions_core::{Ctm, PaintOp, Point};

/// One shown glyph.
#[derive(Debug, Clone)]
pub struct CharEvent {
    /// Character code from the shown string.
    pub code: u32,
    /// Decoded Unicode text.
    pub text: String,
    /// Font `/BaseFont`, subset prefix removed.
    pub font_name: String,
    /// Text rendering matrix `[Tfs*Th 0 0 Tfs 0 Trise] × Tm × CTM`.
    pub trm: Ctm,
    /// Glyph width, 1/1000 em.
    pub width: f64,
    /// Font ascent and descent, 1/1000 em.
    pub ascent: f64,
    pub descent: f64,
    /// Baseline point after the glyph advance (spacing included).
    pub advance_end: Point,
}

impl CharEvent {
    /// Baseline start of the glyph.
    pub fn origin(&self) -> Point {
        self.trm.transform_point(Point::new(0.0, 0.0))
    }
}

/// A painted path, flattened to polylines.
#[derive(Debug, Clone)]
pub struct PathEvent {
    pub subpaths: Vec<(Vec<Point>, bool)>,
    pub paint: PaintOp,
    /// Stroke width in user space units.
    pub line_width: f64,
}

/// Callbacks for content stream interpretation.
///
/// Every method has an empty default so handlers only implement what they
/// collect.
pub trait ContentHandler {
    fn on_char(&mut self, _event: CharEvent) {}

    fn on_path_painted(&mut self, _event: PathEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Collecting {
        chars: Vec<CharEvent>,
        paths: Vec<PathEvent>,
    }

    impl ContentHandler for Collecting {
        fn on_char(&mut self, event: CharEvent) {
            self.chars.push(event);
        }

        fn on_path_painted(&mut self, event: PathEvent) {
            self.paths.push(event);
        }
    }

    struct Noop;

    impl ContentHandler for Noop {}

    fn sample_char() -> CharEvent {
        CharEvent {
            code: 72,
            text: "H".to_string(),
            font_name: "Helvetica".to_string(),
            trm: Ctm::new(12.0, 0.0, 0.0, 12.0, 72.0, 700.0),
            width: 722.0,
            ascent: 718.0,
            descent: -207.0,
            advance_end: Point::new(80.664, 700.0),
        }
    }

    #[test]
    fn origin_is_trm_translation() {
        assert_eq!(sample_char().origin(), Point::new(72.0, 700.0));
    }

    #[test]
    fn collecting_handler_receives_events() {
        let mut handler = Collecting {
            chars: Vec::new(),
            paths: Vec::new(),
        };
        let dyn_handler: &mut dyn ContentHandler = &mut handler;
        dyn_handler.on_char(sample_char());
        dyn_handler.on_path_painted(PathEvent {
            subpaths: vec![(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)], false)],
            paint: PaintOp::Stroke,
            line_width: 1.0,
        });
        assert_eq!(handler.chars.len(), 1);
        assert_eq!(handler.chars[0].text, "H");
        assert_eq!(handler.paths.len(), 1);
    }

    #[test]
    fn noop_handler_accepts_events() {
        let mut handler = Noop;
        handler.on_char(sample_char());
    }
}
