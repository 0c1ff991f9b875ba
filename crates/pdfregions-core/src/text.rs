//! Characters, region text assembly, and whitespace normalization.

use crate::geometry::{BBox, Point};

/// A single glyph placed on the page.
///
/// Positions are in point space with top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Char {
    /// Decoded Unicode text of the glyph (may be more than one char for ligatures).
    pub text: String,
    /// Glyph origin: the left end of the baseline where the glyph was painted.
    pub origin: Point,
    /// Baseline point after advancing past this glyph.
    pub advance_end: Point,
    /// Approximate glyph box (font ascent to descent, advance width).
    pub bbox: BBox,
    /// Effective font size in points.
    pub size: f64,
}

/// Tolerances used when joining characters into text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    /// Horizontal gap (points) beyond which a space is inserted.
    pub x_tolerance: f64,
    /// Baseline shift (points) beyond which a line break is inserted.
    pub y_tolerance: f64,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
        }
    }
}

/// Collapse every whitespace run (newlines included) into one ASCII space and
/// trim both ends.
///
/// Idempotent: `normalize_whitespace(&normalize_whitespace(t)) == normalize_whitespace(t)`.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join characters in paint order into raw text.
///
/// A newline separates characters whose baselines differ by more than
/// `y_tolerance`; a space separates characters on the same baseline when the
/// gap after the previous glyph exceeds `x_tolerance` or the text jumps back
/// to the left.
pub fn assemble_text<'a, I>(chars: I, options: &TextOptions) -> String
where
    I: IntoIterator<Item = &'a Char>,
{
    let mut out = String::new();
    let mut prev: Option<&Char> = None;

    for ch in chars {
        if let Some(p) = prev {
            if (ch.origin.y - p.origin.y).abs() > options.y_tolerance {
                out.push('\n');
            } else {
                let gap = ch.origin.x - p.advance_end.x;
                let jumped_back = ch.origin.x + options.x_tolerance < p.origin.x;
                if gap > options.x_tolerance || jumped_back {
                    out.push(' ');
                }
            }
        }
        out.push_str(&ch.text);
        prev = Some(ch);
    }

    out
}

/// Normalized text of every character whose origin lies inside `region`.
///
/// Returns an empty string when nothing falls inside, including regions that
/// lie entirely off the page.
pub fn region_text(chars: &[Char], region: &BBox, options: &TextOptions) -> String {
    let inside = chars.iter().filter(|c| region.contains(c.origin));
    normalize_whitespace(&assemble_text(inside, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lay out `text` on one baseline starting at `(x, y)` with 6pt advances.
    fn run(text: &str, x: f64, y: f64) -> Vec<Char> {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                let x0 = x + i as f64 * 6.0;
                Char {
                    text: c.to_string(),
                    origin: Point::new(x0, y),
                    advance_end: Point::new(x0 + 6.0, y),
                    bbox: BBox::new(x0, y - 9.6, x0 + 6.0, y + 2.4),
                    size: 12.0,
                }
            })
            .collect()
    }

    #[test]
    fn normalize_collapses_whitespace_runs() {
        assert_eq!(normalize_whitespace("  Hola   Mundo\n"), "Hola Mundo");
        assert_eq!(normalize_whitespace("a\t\tb\r\n c"), "a b c");
        assert_eq!(normalize_whitespace("\n\n  \t"), "");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            " ",
            "Hola   Mundo\n",
            "\u{00a0}no\u{2003}break\u{00a0}",
            "línea 1\nlínea 2\n\n",
            "already normal",
        ];
        for s in samples {
            let once = normalize_whitespace(s);
            assert_eq!(normalize_whitespace(&once), once);
        }
    }

    #[test]
    fn assemble_adjacent_chars_without_spaces() {
        let chars = run("Hola", 72.0, 100.0);
        assert_eq!(assemble_text(&chars, &TextOptions::default()), "Hola");
    }

    #[test]
    fn assemble_inserts_space_for_gap() {
        let mut chars = run("Hola", 72.0, 100.0);
        chars.extend(run("Mundo", 72.0 + 4.0 * 6.0 + 10.0, 100.0));
        assert_eq!(assemble_text(&chars, &TextOptions::default()), "Hola Mundo");
    }

    #[test]
    fn assemble_inserts_newline_for_baseline_change() {
        let mut chars = run("uno", 72.0, 100.0);
        chars.extend(run("dos", 72.0, 114.0));
        assert_eq!(assemble_text(&chars, &TextOptions::default()), "uno\ndos");
    }

    #[test]
    fn assemble_spaces_leftward_jump_on_same_baseline() {
        let mut chars = run("B", 200.0, 100.0);
        chars.extend(run("A", 72.0, 100.0));
        assert_eq!(assemble_text(&chars, &TextOptions::default()), "B A");
    }

    #[test]
    fn region_text_filters_by_origin() {
        let mut chars = run("$1,200", 300.0, 150.0);
        chars.extend(run("Deducible", 72.0, 150.0));
        let region = BBox::new(290.0, 140.0, 400.0, 160.0);
        assert_eq!(
            region_text(&chars, &region, &TextOptions::default()),
            "$1,200"
        );
    }

    #[test]
    fn region_text_empty_outside_page() {
        let chars = run("texto", 72.0, 100.0);
        let region = BBox::new(-500.0, -500.0, -400.0, -400.0);
        assert_eq!(region_text(&chars, &region, &TextOptions::default()), "");
    }

    #[test]
    fn region_text_normalizes_multiline() {
        let mut chars = run("Hola", 72.0, 100.0);
        chars.extend(run("Mundo", 72.0, 114.0));
        let region = BBox::new(70.0, 90.0, 200.0, 120.0);
        assert_eq!(
            region_text(&chars, &region, &TextOptions::default()),
            "Hola Mundo"
        );
    }
}
