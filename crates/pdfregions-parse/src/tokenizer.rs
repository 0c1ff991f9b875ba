//! Content stream tokenizer.
//!
//! Splits raw (decoded) content stream bytes into [`Operator`]s, each carrying
//! the [`Operand`]s that preceded it. Comments are dropped and inline image
//! data (`BI … ID … EI`) is skipped over without being decoded.

use crate::error::BackendError;

/// A content stream operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Integer(i64),
    Real(f64),
    /// Name without the leading `/`, `#xx` escapes resolved.
    Name(String),
    /// Bytes of a `(literal)` or `<hex>` string, escapes resolved.
    String(Vec<u8>),
    Array(Vec<Operand>),
    Dictionary(Vec<(String, Operand)>),
    Boolean(bool),
    Null,
}

impl Operand {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Integer(i) => Some(*i as f64),
            Operand::Real(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::String(s) => Some(s),
            _ => None,
        }
    }
}

/// An operator with the operands collected since the previous operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub name: String,
    pub operands: Vec<Operand>,
}

impl Operator {
    /// Numeric operand at `index`, if present and numeric.
    pub fn f64_at(&self, index: usize) -> Option<f64> {
        self.operands.get(index).and_then(Operand::as_f64)
    }

    /// The first `N` operands as numbers, or `None` if any is missing.
    pub fn numbers<const N: usize>(&self) -> Option<[f64; N]> {
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.f64_at(i)?;
        }
        Some(out)
    }
}

/// Parse content stream bytes into operators.
///
/// Scanning stops at the first malformed token (an unterminated string,
/// array, dictionary or inline image, or an invalid hex digit). The
/// operators read up to that point are returned along with the
/// [`BackendError::Interpreter`] that stopped the scan.
pub fn tokenize(input: &[u8]) -> (Vec<Operator>, Option<BackendError>) {
    let mut ops = Vec::new();
    let error = scan(input, &mut ops).err();
    (ops, error)
}

fn scan(input: &[u8], ops: &mut Vec<Operator>) -> Result<(), BackendError> {
    let mut lexer = Lexer { input, pos: 0 };
    let mut operands = Vec::new();

    loop {
        lexer.skip_whitespace_and_comments();
        let Some(b) = lexer.peek() else { break };

        if is_regular(b) && !is_number_start(b) {
            let keyword = lexer.keyword();
            match keyword.as_str() {
                "true" => operands.push(Operand::Boolean(true)),
                "false" => operands.push(Operand::Boolean(false)),
                "null" => operands.push(Operand::Null),
                "BI" => {
                    lexer.skip_inline_image()?;
                    operands.clear();
                    ops.push(Operator {
                        name: keyword,
                        operands: Vec::new(),
                    });
                }
                _ => ops.push(Operator {
                    name: keyword,
                    operands: std::mem::take(&mut operands),
                }),
            }
        } else if matches!(b, b']' | b'>' | b')' | b'}' | b'{') {
            // Stray delimiter.
            lexer.pos += 1;
        } else {
            operands.push(lexer.object()?);
        }
    }

    Ok(())
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Lexer<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while let Some(c) = self.peek() {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Parse one operand object starting at the current byte.
    fn object(&mut self) -> Result<Operand, BackendError> {
        let Some(b) = self.peek() else {
            return Err(interp("unexpected end of content stream"));
        };
        match b {
            b'(' => self.literal_string().map(Operand::String),
            b'<' if self.peek_at(1) == Some(b'<') => self.dictionary().map(Operand::Dictionary),
            b'<' => self.hex_string().map(Operand::String),
            b'[' => self.array().map(Operand::Array),
            b'/' => Ok(Operand::Name(self.name())),
            _ if is_number_start(b) => self.number(),
            _ if is_regular(b) => {
                let word = self.keyword();
                Ok(match word.as_str() {
                    "true" => Operand::Boolean(true),
                    "false" => Operand::Boolean(false),
                    "null" => Operand::Null,
                    _ => Operand::Name(word),
                })
            }
            _ => Err(interp(format!("unexpected byte 0x{b:02X}"))),
        }
    }

    fn literal_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut depth = 1u32;

        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(b);
                }
                b'\\' => {
                    let Some(esc) = self.peek() else { break };
                    self.pos += 1;
                    match esc {
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0C),
                        b'\r' => {
                            if self.peek() == Some(b'\n') {
                                self.pos += 1;
                            }
                        }
                        b'\n' => {}
                        b'0'..=b'7' => {
                            let mut value = u32::from(esc - b'0');
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(d @ b'0'..=b'7') => {
                                        value = value * 8 + u32::from(d - b'0');
                                        self.pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            out.push((value & 0xFF) as u8);
                        }
                        other => out.push(other),
                    }
                }
                _ => out.push(b),
            }
        }

        Err(interp("unterminated literal string"))
    }

    fn hex_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut digits = Vec::new();
        loop {
            let Some(b) = self.peek() else {
                return Err(interp("unterminated hex string"));
            };
            self.pos += 1;
            if b == b'>' {
                break;
            }
            if !is_whitespace(b) {
                digits.push(hex_digit(b)?);
            }
        }
        if digits.len() % 2 != 0 {
            digits.push(0);
        }
        Ok(digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
    }

    fn array(&mut self) -> Result<Vec<Operand>, BackendError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => return Err(interp("unterminated array")),
                Some(b']') => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some(_) => items.push(self.object()?),
            }
        }
    }

    fn dictionary(&mut self) -> Result<Vec<(String, Operand)>, BackendError> {
        self.pos += 2;
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => return Err(interp("unterminated dictionary")),
                Some(b'>') if self.peek_at(1) == Some(b'>') => {
                    self.pos += 2;
                    return Ok(entries);
                }
                Some(b'/') => {
                    let key = self.name();
                    self.skip_whitespace_and_comments();
                    let value = self.object()?;
                    entries.push((key, value));
                }
                Some(b) => {
                    return Err(interp(format!(
                        "expected name key in dictionary, found 0x{b:02X}"
                    )));
                }
            }
        }
    }

    fn name(&mut self) -> String {
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        let raw = &self.input[start..self.pos];

        let mut bytes = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' && i + 2 < raw.len() {
                if let (Ok(hi), Ok(lo)) = (hex_digit(raw[i + 1]), hex_digit(raw[i + 2])) {
                    bytes.push((hi << 4) | lo);
                    i += 3;
                    continue;
                }
            }
            bytes.push(raw[i]);
            i += 1;
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn number(&mut self) -> Result<Operand, BackendError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut seen_dot = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !seen_dot => {
                    seen_dot = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }

        let token = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| interp("invalid number token"))?;
        // A lone sign or dot reads as zero, as most consumers do.
        if token.trim_start_matches(['+', '-']).trim_matches('.').is_empty() {
            return Ok(Operand::Integer(0));
        }
        if seen_dot {
            token
                .parse::<f64>()
                .map(Operand::Real)
                .map_err(|_| interp(format!("invalid real number: {token}")))
        } else {
            match token.parse::<i64>() {
                Ok(i) => Ok(Operand::Integer(i)),
                Err(_) => token
                    .parse::<f64>()
                    .map(Operand::Real)
                    .map_err(|_| interp(format!("invalid integer: {token}"))),
            }
        }
    }

    fn keyword(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    /// Skip an inline image after its `BI` keyword, through the closing `EI`.
    fn skip_inline_image(&mut self) -> Result<(), BackendError> {
        // Dictionary entries up to the ID keyword.
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => return Err(interp("unterminated inline image (missing ID)")),
                Some(b'I')
                    if self.peek_at(1) == Some(b'D')
                        && self.peek_at(2).is_none_or(|b| !is_regular(b)) =>
                {
                    self.pos += 3;
                    break;
                }
                Some(_) => {
                    self.object()?;
                }
            }
        }

        // Raw data up to whitespace + EI + delimiter/whitespace/end.
        while self.pos < self.input.len() {
            let at_ei = self.peek() == Some(b'E')
                && self.peek_at(1) == Some(b'I')
                && self.pos > 0
                && is_whitespace(self.input[self.pos - 1])
                && self.peek_at(2).is_none_or(|b| !is_regular(b));
            if at_ei {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(interp("unterminated inline image (missing EI)"))
    }
}

fn interp(msg: impl Into<String>) -> BackendError {
    BackendError::Interpreter(msg.into())
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

fn is_number_start(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.')
}

fn hex_digit(b: u8) -> Result<u8, BackendError> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(interp(format!("invalid hex digit: {:?}", b as char))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(input: &[u8]) -> Operator {
        let (mut ops, error) = tokenize(input);
        assert!(error.is_none(), "{error:?}");
        assert_eq!(ops.len(), 1, "expected one operator in {input:?}");
        ops.remove(0)
    }

    #[test]
    fn numbers() {
        let op = single(b"42 -7 3.14 .5 -.002 +1 cm");
        assert_eq!(op.name, "cm");
        assert_eq!(
            op.operands,
            vec![
                Operand::Integer(42),
                Operand::Integer(-7),
                Operand::Real(3.14),
                Operand::Real(0.5),
                Operand::Real(-0.002),
                Operand::Integer(1),
            ]
        );
        assert_eq!(op.numbers::<2>(), Some([42.0, -7.0]));
    }

    #[test]
    fn font_selection() {
        let op = single(b"/F1 12 Tf");
        assert_eq!(
            op.operands,
            vec![Operand::Name("F1".to_string()), Operand::Integer(12)]
        );
    }

    #[test]
    fn name_hex_escape() {
        let op = single(b"/A#20B Tf");
        assert_eq!(op.operands[0], Operand::Name("A B".to_string()));
    }

    #[test]
    fn literal_string_escapes_and_nesting() {
        let op = single(b"(a\\(b\\) (c) \\101\\n\\\\) Tj");
        assert_eq!(
            op.operands,
            vec![Operand::String(b"a(b) (c) A\n\\".to_vec())]
        );
    }

    #[test]
    fn literal_string_line_continuation() {
        let op = single(b"(Hola \\\nMundo) Tj");
        assert_eq!(op.operands, vec![Operand::String(b"Hola Mundo".to_vec())]);
    }

    #[test]
    fn hex_string_with_odd_digits() {
        let op = single(b"<48 6F6C 61 3> Tj");
        assert_eq!(op.operands, vec![Operand::String(vec![0x48, 0x6F, 0x6C, 0x61, 0x30])]);
    }

    #[test]
    fn tj_array() {
        let op = single(b"[(Ho) -250 (la)] TJ");
        assert_eq!(
            op.operands,
            vec![Operand::Array(vec![
                Operand::String(b"Ho".to_vec()),
                Operand::Integer(-250),
                Operand::String(b"la".to_vec()),
            ])]
        );
    }

    #[test]
    fn quote_operators() {
        let ops = tokenize(b"(a) ' 1 2 (b) \" T*").0;
        let names: Vec<_> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["'", "\"", "T*"]);
        assert_eq!(ops[1].operands.len(), 3);
    }

    #[test]
    fn comments_are_skipped() {
        let ops = tokenize(b"% header\nBT % begin\n/F1 9 Tf\nET").0;
        let names: Vec<_> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["BT", "Tf", "ET"]);
    }

    #[test]
    fn marked_content_dictionary() {
        let op = single(b"/Span <</MCID 3 /Alt (x)>> BDC");
        assert_eq!(
            op.operands[1],
            Operand::Dictionary(vec![
                ("MCID".to_string(), Operand::Integer(3)),
                ("Alt".to_string(), Operand::String(b"x".to_vec())),
            ])
        );
    }

    #[test]
    fn inline_image_is_skipped() {
        let ops = tokenize(b"q BI /W 2 /H 1 /BPC 8 /CS /G ID \x00EI\xff EI Q (x) Tj").0;
        let names: Vec<_> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["q", "BI", "Q", "Tj"]);
    }

    #[test]
    fn unterminated_string_is_error() {
        let (ops, error) = tokenize(b"(never closed Tj");
        assert!(ops.is_empty());
        assert!(matches!(error, Some(BackendError::Interpreter(_))));
    }

    #[test]
    fn invalid_hex_is_error() {
        assert!(tokenize(b"<4G> Tj").1.is_some());
    }

    #[test]
    fn operators_before_a_bad_token_are_kept() {
        let (ops, error) = tokenize(b"BT (ok) Tj <4G> Tj (later) Tj ET");
        let names: Vec<&str> = ops.iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, vec!["BT", "Tj"]);
        assert_eq!(ops[1].operands, vec![Operand::String(b"ok".to_vec())]);
        assert!(error.is_some());
    }

    #[test]
    fn empty_stream() {
        assert!(tokenize(b"").0.is_empty());
        assert!(tokenize(b"  \n\t ").0.is_empty());
    }
}
