//! ToUnicode CMap parser.
//!
//! Reads the `beginbfchar`/`endbfchar` and `beginbfrange`/`endbfrange`
//! sections of an embedded `/ToUnicode` stream. Destination strings are
//! UTF-16BE; a single destination may hold several characters (ligatures).

use std::collections::HashMap;

use crate::error::BackendError;

/// Widest code range a single entry may expand to.
pub const MAX_RANGE_CODES: u32 = 0x1_0000;

/// Character code → Unicode text.
#[derive(Debug, Clone, Default)]
pub struct ToUnicodeCMap {
    mappings: HashMap<u32, String>,
}

impl ToUnicodeCMap {
    /// Parse a ToUnicode CMap from its decoded stream bytes.
    ///
    /// Unreadable entries are skipped; the remaining mappings are kept.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let text = String::from_utf8_lossy(data);
        let mut mappings = HashMap::new();

        for section in sections(&text, "beginbfchar", "endbfchar") {
            let tokens = cmap_tokens(section);
            for pair in tokens.chunks_exact(2) {
                let (CMapToken::Hex(src), CMapToken::Hex(dst)) = (&pair[0], &pair[1]) else {
                    continue;
                };
                let (Ok(code), Ok(value)) = (hex_code(src), utf16be(dst)) else {
                    tracing::debug!(src, dst, "skipping unreadable bfchar entry");
                    continue;
                };
                mappings.insert(code, value);
            }
        }

        for section in sections(&text, "beginbfrange", "endbfrange") {
            let tokens = cmap_tokens(section);
            for entry in tokens.chunks_exact(3) {
                let (CMapToken::Hex(lo), CMapToken::Hex(hi)) = (&entry[0], &entry[1]) else {
                    continue;
                };
                let (Ok(lo), Ok(hi)) = (hex_code(lo), hex_code(hi)) else {
                    continue;
                };
                if hi < lo || hi - lo >= MAX_RANGE_CODES {
                    tracing::debug!(lo, hi, "skipping unusable bfrange entry");
                    continue;
                }
                match &entry[2] {
                    CMapToken::Hex(dst) => {
                        if let Ok(start) = utf16be(dst) {
                            insert_incrementing(&mut mappings, lo, hi, &start);
                        }
                    }
                    CMapToken::Array(items) => {
                        for (code, dst) in (lo..=hi).zip(items) {
                            if let Ok(value) = utf16be(dst) {
                                mappings.insert(code, value);
                            }
                        }
                    }
                }
            }
        }

        Ok(Self { mappings })
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// `<lo> <hi> <dst>`: each code past `lo` maps to `dst` with its last
/// character incremented by the offset.
fn insert_incrementing(mappings: &mut HashMap<u32, String>, lo: u32, hi: u32, start: &str) {
    let mut chars: Vec<char> = start.chars().collect();
    let Some(last) = chars.pop() else { return };
    let prefix: String = chars.into_iter().collect();

    for code in lo..=hi {
        let Some(ch) = (last as u32)
            .checked_add(code - lo)
            .and_then(char::from_u32)
        else {
            continue;
        };
        let mut value = prefix.clone();
        value.push(ch);
        mappings.insert(code, value);
    }
}

#[derive(Debug)]
enum CMapToken<'a> {
    Hex(&'a str),
    Array(Vec<&'a str>),
}

/// Bodies between every `begin … end` keyword pair.
fn sections<'a>(text: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(begin) {
        let body = &rest[start + begin.len()..];
        let Some(stop) = body.find(end) else { break };
        out.push(&body[..stop]);
        rest = &body[stop + end.len()..];
    }
    out
}

/// Hex strings and bracketed arrays of hex strings, in order.
fn cmap_tokens(section: &str) -> Vec<CMapToken<'_>> {
    let mut tokens = Vec::new();
    let mut array: Option<Vec<&str>> = None;
    let mut rest = section;

    while let Some(i) = rest.find(['<', '[', ']']) {
        match rest.as_bytes()[i] {
            b'[' => {
                array = Some(Vec::new());
                rest = &rest[i + 1..];
            }
            b']' => {
                if let Some(items) = array.take() {
                    tokens.push(CMapToken::Array(items));
                }
                rest = &rest[i + 1..];
            }
            _ => {
                let Some(close) = rest[i + 1..].find('>') else { break };
                let hex = &rest[i + 1..i + 1 + close];
                match array.as_mut() {
                    Some(items) => items.push(hex),
                    None => tokens.push(CMapToken::Hex(hex)),
                }
                rest = &rest[i + 1 + close + 1..];
            }
        }
    }
    tokens
}

fn hex_code(hex: &str) -> Result<u32, BackendError> {
    let digits: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    u32::from_str_radix(&digits, 16)
        .map_err(|e| BackendError::Font(format!("invalid CMap code <{hex}>: {e}")))
}

fn utf16be(hex: &str) -> Result<String, BackendError> {
    let digits: Vec<char> = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() <= 2 {
        // Single-byte destinations show up in hand-written CMaps.
        return hex_code(hex).map(|v| char::from_u32(v).map(String::from).unwrap_or_default());
    }
    if digits.len() % 4 != 0 {
        return Err(BackendError::Font(format!(
            "UTF-16BE destination <{hex}> has {} hex digits",
            digits.len()
        )));
    }
    let units = digits
        .chunks(4)
        .map(|chunk| {
            let s: String = chunk.iter().collect();
            u16::from_str_radix(&s, 16)
                .map_err(|e| BackendError::Font(format!("invalid UTF-16BE unit {s}: {e}")))
        })
        .collect::<Result<Vec<u16>, _>>()?;
    Ok(String::from_utf16_lossy(&units))
}
