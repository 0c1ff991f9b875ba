//! Interactive capture: turn pixel-space drags on a rendered page into
//! labeled rows, a [`Template`], and one plan row.
//!
//! The session is a small state machine driven by two collaborators:
//! a [`SelectionSurface`] that yields finished drags and a [`LabelPrompt`]
//! that names them. Text comes from a [`RegionTextSource`], normally the
//! document's first page.

use crate::error::PdfError;
use crate::geometry::BBox;
use crate::table::PlanRow;
use crate::template::Template;
use crate::transform::{PixelRect, Scale};

/// Drags narrower or shorter than this many pixels are treated as clicks.
pub const MIN_SELECTION_SPAN_PX: f64 = 5.0;

/// Decimal places kept in a captured rectangle.
const BBOX_DECIMALS: i32 = 2;

/// One labeled selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRow {
    pub label: String,
    /// Normalized text found inside `bbox` (possibly empty).
    pub text: String,
    /// Point-space rectangle rounded to two decimals.
    pub bbox: BBox,
}

/// Result of asking the user to name a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOutcome {
    Accepted(String),
    Discarded,
}

impl LabelOutcome {
    /// Interpret raw user input: surrounding whitespace is trimmed and a blank
    /// answer discards the selection.
    pub fn from_input(input: &str) -> Self {
        let label = input.trim();
        if label.is_empty() {
            LabelOutcome::Discarded
        } else {
            LabelOutcome::Accepted(label.to_string())
        }
    }
}

/// Where selections come from.
pub trait SelectionSurface {
    /// Block until the next drag completes. `None` means the user closed the
    /// surface.
    fn next_selection(&mut self) -> Option<PixelRect>;
}

/// Asks the user to label a selection.
pub trait LabelPrompt {
    fn ask_label(&mut self, candidate_text: &str, bbox: &BBox) -> LabelOutcome;

    /// Called after each accepted row with every row captured so far.
    fn rows_updated(&mut self, _rows: &[CaptureRow]) {}
}

/// Text lookup by point-space rectangle.
pub trait RegionTextSource {
    fn region_text(&self, region: &BBox) -> Result<String, PdfError>;
}

impl<T: RegionTextSource + ?Sized> RegionTextSource for &T {
    fn region_text(&self, region: &BBox) -> Result<String, PdfError> {
        (**self).region_text(region)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    AwaitingSelection,
    LabelPrompt,
    Closed,
}

/// What a closed session produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// The session closed without a single accepted row.
    Nothing,
    Captured(CapturedSession),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedSession {
    /// Every accepted row in capture order, repeated labels included.
    pub rows: Vec<CaptureRow>,
    /// Template built from `rows`; later rows win.
    pub template: Template,
    /// Plan row for the captured document.
    pub plan_row: PlanRow,
}

/// Capture state machine over one page.
pub struct CaptureSession<S> {
    source: S,
    scale: Scale,
    document_id: String,
    state: CaptureState,
    rows: Vec<CaptureRow>,
}

impl<S: RegionTextSource> CaptureSession<S> {
    /// `document_id` identifies the page's document in the plan row
    /// (normally the file stem).
    pub fn new(source: S, scale: Scale, document_id: impl Into<String>) -> Self {
        Self {
            source,
            scale,
            document_id: document_id.into(),
            state: CaptureState::Idle,
            rows: Vec::new(),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn rows(&self) -> &[CaptureRow] {
        &self.rows
    }

    /// Start waiting for selections. No-op unless the session is idle.
    pub fn begin(&mut self) {
        if self.state == CaptureState::Idle {
            self.state = CaptureState::AwaitingSelection;
        }
    }

    /// Process one completed drag.
    ///
    /// Returns the accepted row, or `None` when the drag was too small, the
    /// label was discarded, or the session is not awaiting a selection.
    pub fn handle_selection<P>(
        &mut self,
        rect: PixelRect,
        prompt: &mut P,
    ) -> Result<Option<&CaptureRow>, PdfError>
    where
        P: LabelPrompt + ?Sized,
    {
        if self.state != CaptureState::AwaitingSelection {
            return Ok(None);
        }
        if !rect.spans_at_least(MIN_SELECTION_SPAN_PX) {
            return Ok(None);
        }

        let region = self.scale.rect_to_point(&rect);
        let text = self.source.region_text(&region)?;
        let bbox = region.rounded(BBOX_DECIMALS);

        self.state = CaptureState::LabelPrompt;
        let outcome = prompt.ask_label(&text, &bbox);
        self.state = CaptureState::AwaitingSelection;

        match outcome {
            LabelOutcome::Discarded => Ok(None),
            LabelOutcome::Accepted(label) => {
                self.rows.push(CaptureRow { label, text, bbox });
                prompt.rows_updated(&self.rows);
                Ok(self.rows.last())
            }
        }
    }

    pub fn close(&mut self) {
        self.state = CaptureState::Closed;
    }

    /// Drive the session until the surface closes, then finish it.
    pub fn run<Surf, P>(mut self, surface: &mut Surf, prompt: &mut P) -> Result<CaptureOutcome, PdfError>
    where
        Surf: SelectionSurface + ?Sized,
        P: LabelPrompt + ?Sized,
    {
        self.begin();
        while let Some(rect) = surface.next_selection() {
            self.handle_selection(rect, prompt)?;
        }
        self.close();
        Ok(self.finish())
    }

    /// Consume the session and build its outputs.
    pub fn finish(self) -> CaptureOutcome {
        if self.rows.is_empty() {
            return CaptureOutcome::Nothing;
        }
        let template = Template::from_rows(&self.rows);
        let plan_row = PlanRow::from_capture(self.document_id, &self.rows);
        CaptureOutcome::Captured(CapturedSession {
            rows: self.rows,
            template,
            plan_row,
        })
    }
}
