//! Terminal collaborators for the capture session.
//!
//! The user inspects the rendered preview image and types the pixel corners
//! of each region; labels and yes/no answers are read from the same input.

use std::io::{BufRead, Write};

use pdfregions::pdfregions_core::{CAPTURE_COLUMNS, MIN_SELECTION_SPAN_PX, render_grid};
use pdfregions::{BBox, CaptureRow, LabelOutcome, LabelPrompt, PixelRect, SelectionSurface};

/// Words that end the selection loop.
const CLOSE_WORDS: [&str; 3] = ["q", "quit", "done"];

/// Answers accepted as "yes" (compared case-insensitively).
const AFFIRMATIVE: [&str; 5] = ["y", "yes", "s", "si", "sí"];

/// Line-oriented console over any reader and writer.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Write one line. Output failures are ignored; the session continues.
    pub fn say(&mut self, line: impl AsRef<str>) {
        let _ = writeln!(self.output, "{}", line.as_ref());
    }

    /// Print `question` and read one answer line. `None` at end of input.
    pub fn ask(&mut self, question: &str) -> Option<String> {
        let _ = write!(self.output, "{question}");
        let _ = self.output.flush();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    /// Ask a yes/no question; anything but an affirmative answer is "no".
    pub fn confirm(&mut self, question: &str) -> bool {
        self.ask(&format!("{question} [y/N]: "))
            .is_some_and(|answer| is_affirmative(&answer))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> SelectionSurface for Console<R, W> {
    fn next_selection(&mut self) -> Option<PixelRect> {
        loop {
            let line = self.ask("\nRegion in pixels (x0 y0 x1 y1), or q to finish: ")?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if CLOSE_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w)) {
                return None;
            }
            match parse_corners(line) {
                Some(rect) if rect.spans_at_least(MIN_SELECTION_SPAN_PX) => return Some(rect),
                Some(_) => self.say(format!(
                    "Region is smaller than {MIN_SELECTION_SPAN_PX} px on one side; ignored."
                )),
                None => self.say(format!("Could not read '{line}'; expected four numbers.")),
            }
        }
    }
}

impl<R: BufRead, W: Write> LabelPrompt for Console<R, W> {
    fn ask_label(&mut self, candidate_text: &str, bbox: &BBox) -> LabelOutcome {
        self.say(format!(
            "Selected region (PDF points): ({:.2}, {:.2}, {:.2}, {:.2})",
            bbox.x0, bbox.top, bbox.x1, bbox.bottom
        ));
        self.say("Captured text:");
        self.say(if candidate_text.is_empty() {
            "<empty>"
        } else {
            candidate_text
        });

        let answer = self
            .ask("Label for this text (Enter to discard): ")
            .unwrap_or_default();
        let outcome = LabelOutcome::from_input(&answer);
        match &outcome {
            LabelOutcome::Discarded => self.say("Region discarded."),
            LabelOutcome::Accepted(label) => {
                self.say(format!("[OK] Saved under label '{label}'. Keep selecting."));
            }
        }
        outcome
    }

    fn rows_updated(&mut self, rows: &[CaptureRow]) {
        self.say("\n[Accumulated preview]");
        self.say(capture_grid(rows).trim_end());
    }
}

/// `true` for `y`, `yes`, `s`, `si` or `sí` in any case.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE.contains(&answer.as_str())
}

/// Parse `x0 y0 x1 y1` separated by spaces and/or commas.
pub fn parse_corners(line: &str) -> Option<PixelRect> {
    let values: Vec<f64> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<_>>()?;
    match values[..] {
        [x0, y0, x1, y1] => Some(PixelRect::from_drag((x0, y0), (x1, y1))),
        _ => None,
    }
}

/// Capture rows as an aligned grid with the capture CSV headers.
pub fn capture_grid(rows: &[CaptureRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.label.clone(), row.text.clone()];
            cells.extend(row.bbox.to_array().iter().map(|v| format!("{v:.2}")));
            cells
        })
        .collect();
    render_grid(&CAPTURE_COLUMNS, &cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(console: Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn affirmative_answers() {
        for yes in ["y", "Y", "yes", "YES", "s", "si", "Sí", "SÍ", " y "] {
            assert!(is_affirmative(yes), "{yes}");
        }
        for no in ["", "n", "no", "nope", "sip", "1"] {
            assert!(!is_affirmative(no), "{no}");
        }
    }

    #[test]
    fn corners_accept_spaces_and_commas() {
        let expected = PixelRect::from_drag((10.0, 20.0), (30.0, 40.0));
        assert_eq!(parse_corners("10 20 30 40"), Some(expected));
        assert_eq!(parse_corners("10,20,30,40"), Some(expected));
        assert_eq!(parse_corners(" 10, 20  30 ,40 "), Some(expected));
    }

    #[test]
    fn corners_are_normalized() {
        let rect = parse_corners("30 40 10 20").unwrap();
        assert_eq!((rect.x0, rect.y0, rect.x1, rect.y1), (10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn bad_corner_lines_are_rejected() {
        assert_eq!(parse_corners("10 20 30"), None);
        assert_eq!(parse_corners("10 20 30 40 50"), None);
        assert_eq!(parse_corners("a b c d"), None);
        assert_eq!(parse_corners("10 20 inf 40"), None);
        assert_eq!(parse_corners(""), None);
    }

    #[test]
    fn surface_skips_noise_and_small_regions() {
        let mut c = console("\nhello\n1 1 3 3\n10 10 60 60\nq\n");
        let rect = c.next_selection().unwrap();
        assert_eq!((rect.x0, rect.y1), (10.0, 60.0));
        assert_eq!(c.next_selection(), None);

        let out = output(c);
        assert!(out.contains("Could not read 'hello'"));
        assert!(out.contains("ignored"));
    }

    #[test]
    fn surface_closes_on_end_of_input() {
        let mut c = console("10 10 60 60\n");
        assert!(c.next_selection().is_some());
        assert_eq!(c.next_selection(), None);
    }

    #[test]
    fn close_words_are_case_insensitive() {
        for word in ["Q", "quit", "DONE"] {
            let mut c = console(&format!("{word}\n"));
            assert_eq!(c.next_selection(), None);
        }
    }

    #[test]
    fn label_prompt_shows_empty_marker_and_discards_blank() {
        let mut c = console("   \n");
        let outcome = c.ask_label("", &BBox::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(outcome, LabelOutcome::Discarded);
        let out = output(c);
        assert!(out.contains("<empty>"));
        assert!(out.contains("(1.00, 2.00, 3.00, 4.00)"));
        assert!(out.contains("discarded"));
    }

    #[test]
    fn label_prompt_accepts_trimmed_label() {
        let mut c = console(" alto \n");
        let outcome = c.ask_label("1.200", &BBox::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(outcome, LabelOutcome::Accepted("alto".to_string()));
        assert!(output(c).contains("1.200"));
    }

    #[test]
    fn label_prompt_discards_at_end_of_input() {
        let mut c = console("");
        assert_eq!(
            c.ask_label("x", &BBox::new(0.0, 0.0, 1.0, 1.0)),
            LabelOutcome::Discarded
        );
    }

    #[test]
    fn confirm_reads_one_answer() {
        let mut c = console("sí\nno\n");
        assert!(c.confirm("Export?"));
        assert!(!c.confirm("Save?"));
        assert!(!c.confirm("Again?"));
        assert!(output(c).contains("Export? [y/N]: "));
    }

    #[test]
    fn rows_updated_prints_grid() {
        let mut c = console("");
        c.rows_updated(&[CaptureRow {
            label: "alto".to_string(),
            text: "1.200".to_string(),
            bbox: BBox::new(10.0, 20.5, 30.25, 40.0),
        }]);
        let out = output(c);
        assert!(out.contains("etiqueta"));
        assert!(out.contains("alto"));
        assert!(out.contains("30.25"));
    }
}
