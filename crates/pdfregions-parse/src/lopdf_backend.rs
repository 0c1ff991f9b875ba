//! lopdf-based PDF parsing backend.
//!
//! Implements [`PdfBackend`] using the [lopdf](https://crates.io/crates/lopdf)
//! crate for document structure and stream decoding.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdfregions_core::{BBox, PdfError};
use tracing::debug;

use crate::backend::{PageContent, PdfBackend};
use crate::char_extraction::{char_from_event, path_from_event};
use crate::error::BackendError;
use crate::handler::{CharEvent, ContentHandler, PathEvent};
use crate::interpreter::{ExtractOptions, Interpreter};
use crate::page_geometry::PageGeometry;

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: Document,
    /// Page object ids in page order.
    page_ids: Vec<ObjectId>,
}

impl LopdfDocument {
    pub fn inner(&self) -> &Document {
        &self.inner
    }
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// The lopdf-based PDF backend.
pub struct LopdfBackend;

impl PdfBackend for LopdfBackend {
    type Document = LopdfDocument;
    type Error = BackendError;

    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error> {
        let inner = Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        if inner.is_encrypted() {
            return Err(BackendError::Core(PdfError::PasswordRequired));
        }

        // get_pages is keyed by 1-based page number, so values come out in order.
        let page_ids: Vec<ObjectId> = inner.get_pages().values().copied().collect();
        debug!(pages = page_ids.len(), "opened PDF");

        Ok(LopdfDocument { inner, page_ids })
    }

    fn page_count(doc: &Self::Document) -> usize {
        doc.page_ids.len()
    }

    fn extract_page(
        doc: &Self::Document,
        index: usize,
        options: &ExtractOptions,
    ) -> Result<PageContent, Self::Error> {
        let page_id = *doc.page_ids.get(index).ok_or_else(|| {
            BackendError::Parse(format!(
                "page index {index} out of range (0..{})",
                doc.page_ids.len()
            ))
        })?;
        let inner = &doc.inner;
        let page_dict = inner
            .get_object(page_id)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        let media_box = match resolve_inherited(inner, page_id, b"MediaBox")? {
            Some(obj) => box_from_object(inner, obj)?,
            None => {
                return Err(BackendError::Parse(
                    "MediaBox not found on page or ancestors".to_string(),
                ));
            }
        };
        let crop_box = match resolve_inherited(inner, page_id, b"CropBox")? {
            Some(obj) => Some(box_from_object(inner, obj)?),
            None => None,
        };
        let rotation = resolve_inherited(inner, page_id, b"Rotate")?
            .and_then(|o| resolve(inner, o).as_i64().ok())
            .unwrap_or(0);
        let geometry = PageGeometry::new(media_box, crop_box, rotation);

        let content = page_content_bytes(inner, page_dict)?;
        let resources = page_resources(inner, page_id)?;

        let mut collector = PageCollector {
            geometry,
            content: PageContent {
                width: geometry.width(),
                height: geometry.height(),
                ..PageContent::default()
            },
        };
        Interpreter::new(inner, options, &mut collector).run(&content, &resources)?;
        debug!(
            page = index,
            chars = collector.content.chars.len(),
            paths = collector.content.paths.len(),
            "interpreted page"
        );
        Ok(collector.content)
    }
}

/// Collects interpreter events as page-space objects.
struct PageCollector {
    geometry: PageGeometry,
    content: PageContent,
}

impl ContentHandler for PageCollector {
    fn on_char(&mut self, event: CharEvent) {
        self.content
            .chars
            .push(char_from_event(&event, &self.geometry));
    }

    fn on_path_painted(&mut self, event: PathEvent) {
        self.content
            .paths
            .push(path_from_event(&event, &self.geometry));
    }
}

/// Follow an indirect reference; anything else (or a dangling reference) is
/// returned as is.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Integer or real value as `f64`.
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Decoded stream data (filters applied).
pub(crate) fn stream_bytes(stream: &Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Look up `key` on the page, then on its `/Parent` chain.
fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current = page_id;
    // Bounded walk so a /Parent cycle cannot loop forever.
    for _ in 0..64 {
        let dict = doc
            .get_object(current)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::Parse(format!("failed to get page tree node: {e}")))?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => return Ok(None),
        }
    }
    Err(BackendError::Parse("page tree /Parent chain too deep".to_string()))
}

/// `[x0 y0 x1 y1]` box array, raw PDF values.
fn box_from_object(doc: &Document, obj: &Object) -> Result<BBox, BackendError> {
    let array = resolve(doc, obj)
        .as_array()
        .map_err(|e| BackendError::Parse(format!("page box is not an array: {e}")))?;
    let values: Vec<f64> = array
        .iter()
        .map(|o| {
            number(resolve(doc, o))
                .ok_or_else(|| BackendError::Parse(format!("expected number, got {o:?}")))
        })
        .collect::<Result<_, _>>()?;
    match values[..] {
        [x0, y0, x1, y1] => Ok(BBox::new(x0, y0, x1, y1)),
        _ => Err(BackendError::Parse(format!(
            "expected 4-element array for box, got {}",
            values.len()
        ))),
    }
}

/// Page content bytes; an array of streams is joined with whitespace.
fn page_content_bytes(doc: &Document, page: &Dictionary) -> Result<Vec<u8>, BackendError> {
    let Ok(contents) = page.get(b"Contents") else {
        return Ok(Vec::new());
    };

    let decode = |obj: &Object| -> Result<Vec<u8>, BackendError> {
        let stream = resolve(doc, obj)
            .as_stream()
            .map_err(|e| BackendError::Parse(format!("/Contents is not a stream: {e}")))?;
        stream_bytes(stream)
    };

    match resolve(doc, contents) {
        Object::Array(parts) => {
            let mut out = Vec::new();
            for part in parts {
                out.extend(decode(part)?);
                out.push(b'\n');
            }
            Ok(out)
        }
        _ => decode(contents),
    }
}

/// Page resources, inherited through the page tree. A page with none gets an
/// empty dictionary.
fn page_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary, BackendError> {
    match resolve_inherited(doc, page_id, b"Resources")? {
        Some(obj) => resolve(doc, obj)
            .as_dict()
            .cloned()
            .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string())),
        None => Ok(Dictionary::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    struct PageSpec {
        content: &'static [u8],
        extra: Dictionary,
    }

    fn page(content: &'static [u8]) -> PageSpec {
        PageSpec {
            content,
            extra: Dictionary::new(),
        }
    }

    fn ints(values: &[i64]) -> Object {
        Object::Array(values.iter().map(|v| Object::Integer(*v)).collect())
    }

    /// Build a PDF whose pages share one Helvetica /F1 resource inherited
    /// from the page tree root.
    fn build_pdf(pages: Vec<PageSpec>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut kids = Vec::new();
        for page_spec in pages {
            let content_id = doc.add_object(Stream::new(dictionary! {}, page_spec.content.to_vec()));
            let mut dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            };
            for (key, value) in page_spec.extra.iter() {
                dict.set(key.clone(), value.clone());
            }
            kids.push(Object::Reference(doc.add_object(dict)));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => ints(&[0, 0, 612, 792]),
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }

    fn page_text(content: &PageContent) -> String {
        content.chars.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn open_counts_pages() {
        let bytes = build_pdf(vec![page(b""), page(b"")]);
        let doc = LopdfBackend::open(&bytes).unwrap();
        assert_eq!(LopdfBackend::page_count(&doc), 2);
    }

    #[test]
    fn open_rejects_garbage() {
        let err = LopdfBackend::open(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, BackendError::Parse(_)));
    }

    #[test]
    fn extract_page_text_in_top_left_space() {
        let bytes = build_pdf(vec![page(b"BT /F1 12 Tf 72 700 Td (Hola) Tj ET")]);
        let doc = LopdfBackend::open(&bytes).unwrap();
        let content = LopdfBackend::extract_page(&doc, 0, &ExtractOptions::default()).unwrap();

        assert_eq!(content.width, 612.0);
        assert_eq!(content.height, 792.0);
        assert_eq!(page_text(&content), "Hola");
        let first = &content.chars[0];
        assert!((first.origin.x - 72.0).abs() < 1e-6);
        assert!((first.origin.y - 92.0).abs() < 1e-6);
    }

    #[test]
    fn crop_box_sets_visible_size() {
        let bytes = build_pdf(vec![PageSpec {
            content: b"BT /F1 12 Tf 100 700 Td (x) Tj ET",
            extra: dictionary! { "CropBox" => ints(&[50, 50, 550, 750]) },
        }]);
        let doc = LopdfBackend::open(&bytes).unwrap();
        let content = LopdfBackend::extract_page(&doc, 0, &ExtractOptions::default()).unwrap();
        assert_eq!(content.width, 500.0);
        assert_eq!(content.height, 700.0);
        assert!((content.chars[0].origin.x - 50.0).abs() < 1e-6);
        assert!((content.chars[0].origin.y - 50.0).abs() < 1e-6);
    }

    #[test]
    fn rotated_page_swaps_size() {
        let bytes = build_pdf(vec![PageSpec {
            content: b"",
            extra: dictionary! { "Rotate" => Object::Integer(90) },
        }]);
        let doc = LopdfBackend::open(&bytes).unwrap();
        let content = LopdfBackend::extract_page(&doc, 0, &ExtractOptions::default()).unwrap();
        assert_eq!(content.width, 792.0);
        assert_eq!(content.height, 612.0);
    }

    #[test]
    fn content_array_is_concatenated() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let part1 = doc.add_object(Stream::new(dictionary! {}, b"BT 10 700 Td".to_vec()));
        let part2 = doc.add_object(Stream::new(dictionary! {}, b"(ab) Tj ET".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => ints(&[0, 0, 200, 200]),
            "Contents" => vec![Object::Reference(part1), Object::Reference(part2)],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let doc = LopdfBackend::open(&bytes).unwrap();
        let content = LopdfBackend::extract_page(&doc, 0, &ExtractOptions::default()).unwrap();
        assert_eq!(page_text(&content), "ab");
        assert_eq!(content.width, 200.0);
    }

    #[test]
    fn paths_are_collected() {
        let bytes = build_pdf(vec![page(b"1 w 72 72 200 100 re S")]);
        let doc = LopdfBackend::open(&bytes).unwrap();
        let content = LopdfBackend::extract_page(&doc, 0, &ExtractOptions::default()).unwrap();
        assert_eq!(content.paths.len(), 1);
        let bbox = content.paths[0].bbox().unwrap();
        assert_eq!(bbox, BBox::new(72.0, 620.0, 272.0, 720.0));
    }

    #[test]
    fn page_index_out_of_range() {
        let bytes = build_pdf(vec![page(b"")]);
        let doc = LopdfBackend::open(&bytes).unwrap();
        let err = LopdfBackend::extract_page(&doc, 3, &ExtractOptions::default()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn backend_error_converts_to_pdf_error() {
        let err = LopdfBackend::open(b"%PDF-broken").unwrap_err();
        let pdf_err: PdfError = err.into();
        assert!(matches!(pdf_err, PdfError::ParseError(_)));
    }

    #[test]
    fn number_and_resolve_helpers() {
        let mut doc = Document::with_version("1.5");
        let id = doc.add_object(Object::Real(2.5));
        let reference = Object::Reference(id);
        assert_eq!(number(resolve(&doc, &reference)), Some(2.5));
        assert_eq!(number(&Object::Integer(7)), Some(7.0));
        assert_eq!(number(&Object::Null), None);
    }
}
