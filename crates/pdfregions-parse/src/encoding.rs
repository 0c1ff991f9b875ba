//! Single-byte font encodings and glyph names.
//!
//! Simple (non-composite) fonts map each byte to a glyph through a base
//! encoding (`/WinAnsiEncoding`, `/MacRomanEncoding`, `StandardEncoding`)
//! optionally patched by a `/Differences` array of glyph names.

/// Named base encodings a simple font may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEncoding {
    WinAnsi,
    MacRoman,
    Standard,
}

impl BaseEncoding {
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"WinAnsiEncoding" => Some(Self::WinAnsi),
            b"MacRomanEncoding" => Some(Self::MacRoman),
            b"StandardEncoding" => Some(Self::Standard),
            _ => None,
        }
    }

    fn decode(self, code: u8) -> Option<char> {
        match self {
            Self::WinAnsi => decode_with(encoding_rs::WINDOWS_1252, code),
            Self::MacRoman => decode_with(encoding_rs::MACINTOSH, code),
            Self::Standard => standard_char(code),
        }
    }
}

fn decode_with(encoding: &'static encoding_rs::Encoding, code: u8) -> Option<char> {
    if code < 0x20 {
        return None;
    }
    let bytes = [code];
    let (text, _) = encoding.decode_without_bom_handling(&bytes);
    text.chars().next().filter(|c| *c != '\u{FFFD}')
}

/// Byte → character table for a simple font.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleEncoding {
    table: [Option<char>; 256],
}

impl SimpleEncoding {
    pub fn from_base(base: BaseEncoding) -> Self {
        let mut table = [None; 256];
        for (code, slot) in table.iter_mut().enumerate() {
            *slot = base.decode(code as u8);
        }
        Self { table }
    }

    /// Override codes with `(code, char)` pairs from a `/Differences` array.
    pub fn apply_differences(&mut self, differences: &[(u8, char)]) {
        for &(code, ch) in differences {
            self.table[code as usize] = Some(ch);
        }
    }

    pub fn decode(&self, code: u8) -> Option<char> {
        self.table[code as usize]
    }
}

/// Decode a byte with no font encoding information at all.
///
/// Bytes are read as Latin-1, which agrees with WinAnsi on printable ASCII.
pub fn latin1_char(code: u8) -> Option<char> {
    (code >= 0x20).then(|| char::from(code))
}

/// StandardEncoding: ASCII with curly quotes, plus the Adobe upper half.
fn standard_char(code: u8) -> Option<char> {
    let ch = match code {
        0x27 => '\u{2019}',
        0x60 => '\u{2018}',
        0x20..=0x7E => char::from(code),
        0xA1 => '¡',
        0xA2 => '¢',
        0xA3 => '£',
        0xA4 => '\u{2044}',
        0xA5 => '¥',
        0xA6 => 'ƒ',
        0xA7 => '§',
        0xA8 => '¤',
        0xA9 => '\'',
        0xAA => '\u{201C}',
        0xAB => '«',
        0xAC => '\u{2039}',
        0xAD => '\u{203A}',
        0xAE => '\u{FB01}',
        0xAF => '\u{FB02}',
        0xB1 => '\u{2013}',
        0xB2 => '\u{2020}',
        0xB3 => '\u{2021}',
        0xB4 => '·',
        0xB6 => '¶',
        0xB7 => '\u{2022}',
        0xB8 => '\u{201A}',
        0xB9 => '\u{201E}',
        0xBA => '\u{201D}',
        0xBB => '»',
        0xBC => '\u{2026}',
        0xBD => '\u{2030}',
        0xBF => '¿',
        0xC1 => '`',
        0xC2 => '´',
        0xC3 => 'ˆ',
        0xC4 => '˜',
        0xC5 => '¯',
        0xC6 => '˘',
        0xC7 => '˙',
        0xC8 => '¨',
        0xCA => '˚',
        0xCB => '¸',
        0xCD => '˝',
        0xCE => '˛',
        0xCF => 'ˇ',
        0xD0 => '\u{2014}',
        0xE1 => 'Æ',
        0xE3 => 'ª',
        0xE8 => 'Ł',
        0xE9 => 'Ø',
        0xEA => 'Œ',
        0xEB => 'º',
        0xF1 => 'æ',
        0xF5 => 'ı',
        0xF8 => 'ł',
        0xF9 => 'ø',
        0xFA => 'œ',
        0xFB => 'ß',
        _ => return None,
    };
    Some(ch)
}

/// Map an Adobe glyph name to its character.
///
/// Covers single-letter names, digit names, ASCII and Latin-1 punctuation,
/// accented Latin letters, common typographic glyphs, and the `uniXXXX` /
/// `uXXXX[XX]` forms. Subset-specific names such as `g42` return `None`.
pub fn glyph_name_to_char(name: &str) -> Option<char> {
    // Suffixes like `a.sc` or `f_i.liga` name variants of the base glyph.
    let base = name.split('.').next().unwrap_or(name);

    let mut chars = base.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            return Some(c);
        }
    }

    if let Some(hex) = base.strip_prefix("uni") {
        if hex.len() >= 4 && hex.is_char_boundary(4) {
            return u32::from_str_radix(&hex[..4], 16).ok().and_then(char::from_u32);
        }
    }
    if let Some(hex) = base.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
        }
    }

    if let Some(ch) = named_glyph(base) {
        return Some(ch);
    }

    // Lowercase accented letters mirror their uppercase names.
    let mut cs = base.chars();
    let first = cs.next()?;
    if first.is_ascii_lowercase() && base.len() > 1 {
        let upper: String = first.to_ascii_uppercase().to_string() + cs.as_str();
        return accented_upper(&upper).and_then(|c| c.to_lowercase().next());
    }
    accented_upper(base)
}

fn named_glyph(name: &str) -> Option<char> {
    let ch = match name {
        "zero" => '0',
        "one" => '1',
        "two" => '2',
        "three" => '3',
        "four" => '4',
        "five" => '5',
        "six" => '6',
        "seven" => '7',
        "eight" => '8',
        "nine" => '9',
        "space" | "nbspace" | "nonbreakingspace" => ' ',
        "exclam" => '!',
        "quotedbl" => '"',
        "numbersign" => '#',
        "dollar" => '$',
        "percent" => '%',
        "ampersand" => '&',
        "quotesingle" => '\'',
        "parenleft" => '(',
        "parenright" => ')',
        "asterisk" => '*',
        "plus" => '+',
        "comma" => ',',
        "hyphen" | "sfthyphen" => '-',
        "period" => '.',
        "slash" => '/',
        "colon" => ':',
        "semicolon" => ';',
        "less" => '<',
        "equal" => '=',
        "greater" => '>',
        "question" => '?',
        "at" => '@',
        "bracketleft" => '[',
        "backslash" => '\\',
        "bracketright" => ']',
        "asciicircum" => '^',
        "underscore" => '_',
        "grave" => '`',
        "braceleft" => '{',
        "bar" => '|',
        "braceright" => '}',
        "asciitilde" => '~',
        "exclamdown" => '¡',
        "cent" => '¢',
        "sterling" => '£',
        "currency" => '¤',
        "yen" => '¥',
        "brokenbar" => '¦',
        "section" => '§',
        "dieresis" => '¨',
        "copyright" => '©',
        "ordfeminine" => 'ª',
        "guillemotleft" => '«',
        "logicalnot" => '¬',
        "registered" => '®',
        "macron" => '¯',
        "degree" => '°',
        "plusminus" => '±',
        "twosuperior" => '²',
        "threesuperior" => '³',
        "acute" => '´',
        "mu" => 'µ',
        "paragraph" => '¶',
        "periodcentered" => '·',
        "cedilla" => '¸',
        "onesuperior" => '¹',
        "ordmasculine" => 'º',
        "guillemotright" => '»',
        "onequarter" => '¼',
        "onehalf" => '½',
        "threequarters" => '¾',
        "questiondown" => '¿',
        "multiply" => '×',
        "divide" => '÷',
        "germandbls" => 'ß',
        "AE" => 'Æ',
        "ae" => 'æ',
        "OE" => 'Œ',
        "oe" => 'œ',
        "Eth" => 'Ð',
        "eth" => 'ð',
        "Thorn" => 'Þ',
        "thorn" => 'þ',
        "dotlessi" => 'ı',
        "Lslash" => 'Ł',
        "lslash" => 'ł',
        "florin" => 'ƒ',
        "circumflex" => 'ˆ',
        "tilde" => '˜',
        "quoteleft" => '\u{2018}',
        "quoteright" => '\u{2019}',
        "quotesinglbase" => '\u{201A}',
        "quotedblleft" => '\u{201C}',
        "quotedblright" => '\u{201D}',
        "quotedblbase" => '\u{201E}',
        "endash" => '\u{2013}',
        "emdash" => '\u{2014}',
        "dagger" => '\u{2020}',
        "daggerdbl" => '\u{2021}',
        "bullet" => '\u{2022}',
        "ellipsis" => '\u{2026}',
        "perthousand" => '\u{2030}',
        "guilsinglleft" => '\u{2039}',
        "guilsinglright" => '\u{203A}',
        "fraction" => '\u{2044}',
        "Euro" => '\u{20AC}',
        "trademark" => '\u{2122}',
        "minus" => '\u{2212}',
        "fi" => '\u{FB01}',
        "fl" => '\u{FB02}',
        _ => return None,
    };
    Some(ch)
}

fn accented_upper(name: &str) -> Option<char> {
    let ch = match name {
        "Agrave" => 'À',
        "Aacute" => 'Á',
        "Acircumflex" => 'Â',
        "Atilde" => 'Ã',
        "Adieresis" => 'Ä',
        "Aring" => 'Å',
        "Ccedilla" => 'Ç',
        "Egrave" => 'È',
        "Eacute" => 'É',
        "Ecircumflex" => 'Ê',
        "Edieresis" => 'Ë',
        "Igrave" => 'Ì',
        "Iacute" => 'Í',
        "Icircumflex" => 'Î',
        "Idieresis" => 'Ï',
        "Ntilde" => 'Ñ',
        "Ograve" => 'Ò',
        "Oacute" => 'Ó',
        "Ocircumflex" => 'Ô',
        "Otilde" => 'Õ',
        "Odieresis" => 'Ö',
        "Oslash" => 'Ø',
        "Ugrave" => 'Ù',
        "Uacute" => 'Ú',
        "Ucircumflex" => 'Û',
        "Udieresis" => 'Ü',
        "Yacute" => 'Ý',
        "Ydieresis" => 'Ÿ',
        "Scaron" => 'Š',
        "Zcaron" => 'Ž',
        _ => return None,
    };
    Some(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_upper_half() {
        let enc = SimpleEncoding::from_base(BaseEncoding::WinAnsi);
        assert_eq!(enc.decode(b'A'), Some('A'));
        assert_eq!(enc.decode(0xF3), Some('ó'));
        assert_eq!(enc.decode(0x80), Some('€'));
        assert_eq!(enc.decode(0x96), Some('\u{2013}'));
        assert_eq!(enc.decode(0x0A), None);
    }

    #[test]
    fn mac_roman_differs_from_win_ansi() {
        let enc = SimpleEncoding::from_base(BaseEncoding::MacRoman);
        assert_eq!(enc.decode(0x8E), Some('é'));
        assert_eq!(enc.decode(0x96), Some('ñ'));
    }

    #[test]
    fn standard_encoding_quotes_and_ligatures() {
        let enc = SimpleEncoding::from_base(BaseEncoding::Standard);
        assert_eq!(enc.decode(0x27), Some('\u{2019}'));
        assert_eq!(enc.decode(0xAE), Some('\u{FB01}'));
        assert_eq!(enc.decode(0xA0), None);
    }

    #[test]
    fn differences_override_base() {
        let mut enc = SimpleEncoding::from_base(BaseEncoding::WinAnsi);
        enc.apply_differences(&[(0x41, 'ñ'), (0x01, 'x')]);
        assert_eq!(enc.decode(0x41), Some('ñ'));
        assert_eq!(enc.decode(0x01), Some('x'));
        assert_eq!(enc.decode(0x42), Some('B'));
    }

    #[test]
    fn base_encoding_names() {
        assert_eq!(
            BaseEncoding::from_name(b"WinAnsiEncoding"),
            Some(BaseEncoding::WinAnsi)
        );
        assert_eq!(BaseEncoding::from_name(b"Identity-H"), None);
    }

    #[test]
    fn glyph_names() {
        assert_eq!(glyph_name_to_char("A"), Some('A'));
        assert_eq!(glyph_name_to_char("seven"), Some('7'));
        assert_eq!(glyph_name_to_char("dollar"), Some('$'));
        assert_eq!(glyph_name_to_char("eacute"), Some('é'));
        assert_eq!(glyph_name_to_char("Ntilde"), Some('Ñ'));
        assert_eq!(glyph_name_to_char("ydieresis"), Some('ÿ'));
        assert_eq!(glyph_name_to_char("uni00F3"), Some('ó'));
        assert_eq!(glyph_name_to_char("u1F600"), Some('\u{1F600}'));
        assert_eq!(glyph_name_to_char("a.sc"), Some('a'));
        assert_eq!(glyph_name_to_char("g42"), None);
        assert_eq!(glyph_name_to_char(""), None);
    }

    #[test]
    fn latin1_fallback() {
        assert_eq!(latin1_char(b'H'), Some('H'));
        assert_eq!(latin1_char(0xE9), Some('é'));
        assert_eq!(latin1_char(0x05), None);
    }
}
