//! pdfregions-core: Backend-independent data types and algorithms.
//!
//! This crate provides the foundational types ([`BBox`], [`Char`], [`Template`],
//! [`PlanTable`], etc.) and algorithms (pixel/point conversion, region text
//! assembly, the capture state machine) used by pdfregions. It knows nothing
//! about PDF syntax; a backend supplies the page characters.

pub mod capture;
pub mod error;
pub mod geometry;
pub mod path;
pub mod persist;
pub mod table;
pub mod template;
pub mod text;
pub mod transform;

pub use capture::{
    CaptureOutcome, CaptureRow, CaptureSession, CaptureState, CapturedSession, LabelOutcome,
    LabelPrompt, MIN_SELECTION_SPAN_PX, RegionTextSource, SelectionSurface,
};
pub use error::{PdfError, TableError, TemplateError};
pub use geometry::{BBox, Ctm, Point};
pub use path::{PagePath, PaintOp, Subpath};
pub use persist::write_atomic;
pub use table::{
    CAPTURE_COLUMNS, DOCUMENT_COLUMN, ExtractedRecord, FIELD_COLUMNS, PLAN_COLUMNS, PlanRow,
    PlanTable, accumulate, merge, render_grid, save_capture_csv, write_capture_csv,
};
pub use template::Template;
pub use text::{Char, TextOptions, assemble_text, normalize_whitespace, region_text};
pub use transform::{DEFAULT_DPI, PixelRect, POINTS_PER_INCH, Scale, to_pixel, to_point};
