//! pdfregions: template-driven text extraction from fixed-layout PDF pages.
//!
//! This is the public API facade for the workspace. It re-exports types from
//! pdfregions-core and uses pdfregions-parse for PDF reading and
//! interpretation.
//!
//! # Architecture
//!
//! - **pdfregions-core**: backend-independent types and algorithms
//! - **pdfregions-parse**: lopdf backend and content stream interpreter
//! - **pdfregions** (this crate): [`Pdf`], [`Page`] and [`BatchApplier`]

mod batch;
mod page;
mod pdf;

pub use batch::{BatchApplier, BatchError, BatchReport, document_id, list_documents};
pub use page::Page;
pub use pdf::Pdf;

pub use pdfregions_core;
pub use pdfregions_core::{
    BBox, CaptureOutcome, CaptureRow, CaptureSession, CaptureState, CapturedSession, Char,
    ExtractedRecord, LabelOutcome, LabelPrompt, PagePath, PaintOp, PdfError, PixelRect, PlanRow,
    PlanTable, Point, RegionTextSource, Scale, SelectionSurface, TableError, Template,
    TemplateError, TextOptions,
};
pub use pdfregions_parse;
pub use pdfregions_parse::ExtractOptions;
