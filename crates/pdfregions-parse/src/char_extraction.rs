//! Turning interpreter events into page-space characters and paths.

use pdfregions_core::{Char, PagePath, Point, Subpath};

use crate::handler::{CharEvent, PathEvent};
use crate::page_geometry::PageGeometry;

/// Build a [`Char`] with origin, advance end and glyph box in top-left page
/// space.
///
/// The glyph box spans the font's descent to ascent vertically and the glyph
/// width horizontally; character and word spacing move the advance end but
/// not the box.
pub fn char_from_event(event: &CharEvent, geometry: &PageGeometry) -> Char {
    let trm = &event.trm;
    let w = event.width / 1000.0;
    let ascent = event.ascent / 1000.0;
    let descent = event.descent / 1000.0;

    let corners = [
        Point::new(0.0, descent),
        Point::new(w, descent),
        Point::new(w, ascent),
        Point::new(0.0, ascent),
    ]
    .map(|p| trm.transform_point(p));

    Char {
        text: event.text.clone(),
        origin: geometry.normalize_point(event.origin()),
        advance_end: geometry.normalize_point(event.advance_end),
        bbox: geometry.normalize_corners(&corners),
        size: trm.c.hypot(trm.d),
    }
}

/// Map a painted path into page space.
pub fn path_from_event(event: &PathEvent, geometry: &PageGeometry) -> PagePath {
    PagePath {
        subpaths: event
            .subpaths
            .iter()
            .map(|(points, closed)| Subpath {
                points: points.iter().map(|p| geometry.normalize_point(*p)).collect(),
                closed: *closed,
            })
            .collect(),
        paint: event.paint,
        line_width: event.line_width,
    }
}
