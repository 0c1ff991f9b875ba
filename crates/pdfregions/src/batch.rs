//! Applying a saved template to one document or a directory of documents.

use std::path::{Path, PathBuf};

use pdfregions_core::{ExtractedRecord, PdfError, PlanRow, Template, TextOptions};
use pdfregions_parse::ExtractOptions;

use crate::{Page, Pdf};

/// Fatal batch input errors. Per-document failures are not errors; they are
/// collected in [`BatchReport::skipped`].
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("input path is neither a file nor a directory: {}", path.display())]
    InvalidInput { path: PathBuf },

    #[error("cannot read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One record per document that opened, in processing order.
    pub records: Vec<ExtractedRecord>,
    /// Documents that could not be opened or interpreted.
    pub skipped: Vec<(PathBuf, PdfError)>,
}

impl BatchReport {
    /// Records projected onto the plan table schema.
    ///
    /// Labels outside the plan's field columns are dropped here.
    pub fn plan_rows(&self) -> Vec<PlanRow> {
        self.records.iter().map(PlanRow::from_record).collect()
    }
}

/// Applies a [`Template`] to documents, one record per document.
#[derive(Debug, Clone, Default)]
pub struct BatchApplier {
    text_options: TextOptions,
    extract_options: ExtractOptions,
}

impl BatchApplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_options(mut self, options: TextOptions) -> Self {
        self.text_options = options;
        self
    }

    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    /// Run `template` over `input`, a PDF file or a directory of PDFs.
    ///
    /// Documents are processed sequentially in sorted filename order. A
    /// document that fails to open is logged, recorded in
    /// [`BatchReport::skipped`], and the run continues.
    pub fn run(&self, template: &Template, input: &Path) -> Result<BatchReport, BatchError> {
        let documents = list_documents(input)?;
        tracing::info!(
            documents = documents.len(),
            labels = template.len(),
            "starting batch"
        );

        let mut report = BatchReport::default();
        for path in documents {
            match self.apply_file(template, &path) {
                Ok(record) => {
                    tracing::info!(document = %record.document_id, "extracted");
                    report.records.push(record);
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping document");
                    report.skipped.push((path, err));
                }
            }
        }
        Ok(report)
    }

    /// Open one document and read every template region from its first page.
    pub fn apply_file(&self, template: &Template, path: &Path) -> Result<ExtractedRecord, PdfError> {
        let pdf = Pdf::open_file(path, Some(self.extract_options.clone()))?;
        let page = pdf.first_page()?;
        Ok(self.apply_page(template, &page, document_id(path)))
    }

    /// Read every template region from an already interpreted page.
    pub fn apply_page(
        &self,
        template: &Template,
        page: &Page,
        document_id: impl Into<String>,
    ) -> ExtractedRecord {
        let fields = template
            .iter()
            .map(|(label, bbox)| {
                (
                    label.to_string(),
                    page.region_text_with(bbox, &self.text_options),
                )
            })
            .collect();
        ExtractedRecord {
            document_id: document_id.into(),
            fields,
        }
    }
}

/// The identity a document is recorded under: its file stem.
pub fn document_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Resolve batch input into the documents to process.
///
/// A file is taken as given. A directory contributes its direct children
/// with a `.pdf` extension (any case), sorted by file name.
pub fn list_documents(input: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(BatchError::InvalidInput {
            path: input.to_path_buf(),
        });
    }

    let read_dir_error = |source| BatchError::ReadDir {
        path: input.to_path_buf(),
        source,
    };
    let mut documents = Vec::new();
    for entry in std::fs::read_dir(input).map_err(read_dir_error)? {
        let path = entry.map_err(read_dir_error)?.path();
        if path.is_file() && has_pdf_extension(&path) {
            documents.push(path);
        }
    }
    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(documents)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
}
