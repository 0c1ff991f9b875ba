//! pdfregions-parse: PDF parsing backend and content stream interpreter.
//!
//! Opens documents with lopdf, interprets page content streams, and reports
//! characters (with decoded Unicode text and page-space origins) and painted
//! paths. It depends on pdfregions-core for shared data types.

pub mod backend;
pub mod char_extraction;
pub mod cmap;
pub mod encoding;
pub mod error;
pub mod font;
pub mod handler;
pub mod interpreter;
pub mod lopdf_backend;
pub mod page_geometry;
pub mod path_builder;
pub mod text_state;
pub mod tokenizer;

pub use backend::{PageContent, PdfBackend};
pub use error::BackendError;
pub use handler::{CharEvent, ContentHandler, PathEvent};
pub use interpreter::{ExtractOptions, Interpreter};
pub use lopdf_backend::{LopdfBackend, LopdfDocument};
pub use page_geometry::PageGeometry;
pub use pdfregions_core;
