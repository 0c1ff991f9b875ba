//! Font loading: code splitting, Unicode decoding, and glyph metrics.
//!
//! A [`LoadedFont`] is built once per font resource and answers the three
//! questions the interpreter asks for every shown byte string: which codes
//! does it contain, what text does each code stand for, and how far does each
//! glyph advance.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};

use crate::cmap::{MAX_RANGE_CODES, ToUnicodeCMap};
use crate::encoding::{BaseEncoding, SimpleEncoding, glyph_name_to_char, latin1_char};
use crate::error::BackendError;
use crate::lopdf_backend::{number, resolve, stream_bytes};

/// Ascent used when the font has no descriptor (1/1000 em).
const DEFAULT_ASCENT: f64 = 750.0;

/// Descent used when the font has no descriptor (1/1000 em).
const DEFAULT_DESCENT: f64 = -250.0;

/// Advance for codes the font declares no width for.
const DEFAULT_WIDTH: f64 = 500.0;

/// Fixed-pitch fallback for Courier and its variants.
const COURIER_WIDTH: f64 = 600.0;

/// `/DW` default for CID fonts.
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// Glyph widths and vertical extent, in glyph space (1/1000 em).
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    widths: Vec<f64>,
    first_char: u32,
    cid_widths: HashMap<u32, f64>,
    missing_width: f64,
    ascent: f64,
    descent: f64,
}

impl FontMetrics {
    /// Metrics for a font with no width information at all.
    pub fn fallback(base_name: &str) -> Self {
        Self {
            widths: Vec::new(),
            first_char: 0,
            cid_widths: HashMap::new(),
            missing_width: fallback_width(base_name),
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
        }
    }

    pub fn width(&self, code: u32) -> f64 {
        if let Some(w) = self.cid_widths.get(&code) {
            return *w;
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.missing_width)
    }

    pub fn ascent(&self) -> f64 {
        self.ascent
    }

    pub fn descent(&self) -> f64 {
        self.descent
    }
}

fn fallback_width(base_name: &str) -> f64 {
    if base_name.contains("Courier") {
        COURIER_WIDTH
    } else {
        DEFAULT_WIDTH
    }
}

/// A font resource ready for text showing.
#[derive(Debug, Clone)]
pub struct LoadedFont {
    /// `/BaseFont` without any subset prefix (`ABCDEF+Arial` → `Arial`).
    pub base_name: String,
    composite: bool,
    to_unicode: Option<ToUnicodeCMap>,
    encoding: Option<SimpleEncoding>,
    metrics: FontMetrics,
}

impl LoadedFont {
    /// Stand-in for a font name missing from the resources: single-byte
    /// Latin-1 codes with default metrics.
    pub fn fallback(name: &str) -> Self {
        Self {
            base_name: name.to_string(),
            composite: false,
            to_unicode: None,
            encoding: None,
            metrics: FontMetrics::fallback(name),
        }
    }

    /// Build a font from its dictionary.
    ///
    /// Only an undecodable `/ToUnicode` stream is an error; unreadable CMap
    /// entries and every other missing or odd entry degrade to defaults.
    pub fn from_dict(doc: &Document, dict: &Dictionary) -> Result<Self, BackendError> {
        let raw_name = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| resolve(doc, o).as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();
        let base_name = strip_subset_prefix(&raw_name).to_string();

        let composite = matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Type0");

        let to_unicode = match dict.get(b"ToUnicode") {
            Ok(obj) => match resolve(doc, obj).as_stream() {
                Ok(stream) => Some(ToUnicodeCMap::parse(&stream_bytes(stream)?)?),
                Err(_) => None,
            },
            Err(_) => None,
        };

        let (encoding, metrics) = if composite {
            (None, composite_metrics(doc, dict, &base_name))
        } else {
            (
                simple_encoding(doc, dict),
                simple_metrics(doc, dict, &base_name),
            )
        };

        Ok(Self {
            base_name,
            composite,
            to_unicode,
            encoding,
            metrics,
        })
    }

    pub fn is_composite(&self) -> bool {
        self.composite
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Split a shown string into character codes: two bytes per code for
    /// composite fonts (Identity-H and friends), one byte otherwise.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.composite {
            bytes
                .chunks(2)
                .map(|pair| match pair {
                    [hi, lo] => u32::from(*hi) << 8 | u32::from(*lo),
                    [b] => u32::from(*b),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }

    /// Unicode text for a code: ToUnicode first, then the simple encoding,
    /// then Latin-1. Codes nothing can decode become U+FFFD.
    pub fn decode(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|c| c.lookup(code)) {
            return text.to_string();
        }
        let ch = if self.composite {
            char::from_u32(code).filter(|c| !c.is_control())
        } else {
            let byte = code as u8;
            match &self.encoding {
                Some(enc) => enc.decode(byte),
                None => latin1_char(byte),
            }
        };
        ch.unwrap_or('\u{FFFD}').to_string()
    }

    /// Glyph advance for `code`, 1/1000 em.
    pub fn width(&self, code: u32) -> f64 {
        self.metrics.width(code)
    }

    /// Word spacing applies to the single-byte code 32 only.
    pub fn is_word_space(&self, code: u32) -> bool {
        !self.composite && code == 32
    }
}

fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((prefix, rest))
            if prefix.len() == 6 && prefix.bytes().all(|b| b.is_ascii_uppercase()) =>
        {
            rest
        }
        _ => name,
    }
}

fn simple_encoding(doc: &Document, dict: &Dictionary) -> Option<SimpleEncoding> {
    let obj = resolve(doc, dict.get(b"Encoding").ok()?);

    if let Ok(name) = obj.as_name() {
        return BaseEncoding::from_name(name).map(SimpleEncoding::from_base);
    }

    let enc_dict = obj.as_dict().ok()?;
    let base = enc_dict
        .get(b"BaseEncoding")
        .ok()
        .and_then(|o| o.as_name().ok())
        .and_then(BaseEncoding::from_name)
        .unwrap_or(BaseEncoding::Standard);
    let mut encoding = SimpleEncoding::from_base(base);
    if let Ok(diffs) = enc_dict.get(b"Differences") {
        if let Ok(items) = resolve(doc, diffs).as_array() {
            encoding.apply_differences(&parse_differences(items));
        }
    }
    Some(encoding)
}

/// `[code /name /name … code /name …]`: each integer starts a run of
/// consecutive codes.
pub(crate) fn parse_differences(items: &[Object]) -> Vec<(u8, char)> {
    let mut out = Vec::new();
    let mut next: Option<u32> = None;

    for item in items {
        match item {
            Object::Integer(i) => next = u32::try_from(*i).ok(),
            Object::Name(name) => {
                let Some(code) = next else { continue };
                if let (Ok(byte), Some(ch)) = (
                    u8::try_from(code),
                    glyph_name_to_char(&String::from_utf8_lossy(name)),
                ) {
                    out.push((byte, ch));
                }
                next = Some(code + 1);
            }
            _ => {}
        }
    }
    out
}

fn simple_metrics(doc: &Document, dict: &Dictionary, base_name: &str) -> FontMetrics {
    let mut metrics = FontMetrics::fallback(base_name);

    metrics.first_char = dict
        .get(b"FirstChar")
        .ok()
        .and_then(|o| number(resolve(doc, o)))
        .map(|v| v.max(0.0) as u32)
        .unwrap_or(0);
    if let Ok(widths) = dict.get(b"Widths").and_then(|o| resolve(doc, o).as_array()) {
        metrics.widths = widths
            .iter()
            .map(|o| number(resolve(doc, o)).unwrap_or(0.0))
            .collect();
    }

    apply_descriptor(doc, dict, &mut metrics);
    metrics
}

fn composite_metrics(doc: &Document, dict: &Dictionary, base_name: &str) -> FontMetrics {
    let mut metrics = FontMetrics::fallback(base_name);
    metrics.missing_width = DEFAULT_CID_WIDTH;

    let descendant = dict
        .get(b"DescendantFonts")
        .ok()
        .and_then(|o| resolve(doc, o).as_array().ok())
        .and_then(|fonts| fonts.first())
        .and_then(|o| resolve(doc, o).as_dict().ok());
    let Some(descendant) = descendant else {
        return metrics;
    };

    if let Some(dw) = descendant
        .get(b"DW")
        .ok()
        .and_then(|o| number(resolve(doc, o)))
    {
        metrics.missing_width = dw;
    }
    if let Ok(w) = descendant
        .get(b"W")
        .and_then(|o| resolve(doc, o).as_array())
    {
        metrics.cid_widths = parse_cid_widths(doc, w);
    }

    apply_descriptor(doc, descendant, &mut metrics);
    metrics
}

/// `/W` entries: `c [w1 w2 …]` or `c_first c_last w`.
///
/// Entries that overflow the code space or span more than
/// [`MAX_RANGE_CODES`] codes are skipped.
pub(crate) fn parse_cid_widths(doc: &Document, items: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut iter = items.iter().map(|o| resolve(doc, o)).peekable();

    while let Some(first) = iter.next() {
        let Some(start) = number(first).map(|v| v as u32) else {
            continue;
        };
        match iter.next() {
            Some(Object::Array(run)) => {
                if run.len() as u64 > u64::from(MAX_RANGE_CODES) {
                    continue;
                }
                for (offset, w) in run.iter().enumerate() {
                    let Some(cid) = u32::try_from(offset)
                        .ok()
                        .and_then(|offset| start.checked_add(offset))
                    else {
                        break;
                    };
                    if let Some(w) = number(resolve(doc, w)) {
                        widths.insert(cid, w);
                    }
                }
            }
            Some(last) => {
                let (Some(end), Some(w)) = (number(last), iter.next().and_then(number)) else {
                    continue;
                };
                let end = end as u32;
                if end < start || end - start >= MAX_RANGE_CODES {
                    tracing::debug!(start, end, "skipping unusable /W range");
                    continue;
                }
                for cid in start..=end {
                    widths.insert(cid, w);
                }
            }
            None => break,
        }
    }
    widths
}

fn apply_descriptor(doc: &Document, dict: &Dictionary, metrics: &mut FontMetrics) {
    let Some(descriptor) = dict
        .get(b"FontDescriptor")
        .ok()
        .and_then(|o| resolve(doc, o).as_dict().ok())
    else {
        return;
    };
    let get = |key: &[u8]| {
        descriptor
            .get(key)
            .ok()
            .and_then(|o| number(resolve(doc, o)))
    };

    if let Some(ascent) = get(b"Ascent").filter(|v| *v != 0.0) {
        metrics.ascent = ascent;
    }
    if let Some(descent) = get(b"Descent").filter(|v| *v != 0.0) {
        metrics.descent = descent;
    }
    if let Some(missing) = get(b"MissingWidth").filter(|v| *v > 0.0) {
        metrics.missing_width = missing;
    }
}
