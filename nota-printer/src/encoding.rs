//! Code page utilities for thermal printers
//!
//! Thermal printer firmware renders a fixed single-byte table (or GBK on
//! Chinese models), never arbitrary Unicode. This module provides:
//! - Display width of a string under a code page
//! - Truncating/padding strings to a display width
//! - Lossy but total text encoding: unrepresentable characters become
//!   [`SUBSTITUTE`] and are reported back to the caller
//! - Decoding, so representable text round-trips

use std::fmt;
use std::str::FromStr;

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, EncodingResult, PrintError};

/// Glyph written in place of any character the code page cannot render
pub const SUBSTITUTE: char = '?';

/// Character tables a thermal printer can be switched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePage {
    /// Printable 7-bit ASCII only
    Ascii,
    /// IBM PC437, the power-on default of most ESC/POS printers
    Cp437,
    /// PC850 Multilingual (no mapping shipped)
    Cp850,
    /// PC858, PC850 with the Euro sign (no mapping shipped)
    Cp858,
    /// PC866 Cyrillic
    Cp866,
    /// Windows-1252 Latin-1
    Wpc1252,
    /// GBK, double-byte Chinese
    Gbk,
    /// UTF-8 input folded to ASCII look-alikes where possible
    Utf8FallbackAscii,
}

impl CodePage {
    /// Whether the encoder ships a mapping for this code page
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Cp850 | Self::Cp858)
    }

    /// Fail with [`EncodingError::UnsupportedCodePage`] if there is no mapping
    pub fn ensure_supported(self) -> EncodingResult<()> {
        if self.is_supported() {
            Ok(())
        } else {
            Err(EncodingError::UnsupportedCodePage(self))
        }
    }

    /// ESC/POS character table number for `ESC t n`
    ///
    /// `None` for code pages that need no table switch (ASCII is valid in
    /// every table) or use their own selection sequence (GBK).
    pub fn escpos_table(self) -> Option<u8> {
        match self {
            Self::Cp437 => Some(0),
            Self::Cp850 => Some(2),
            Self::Cp866 => Some(17),
            Self::Wpc1252 => Some(16),
            Self::Cp858 => Some(19),
            Self::Ascii | Self::Gbk | Self::Utf8FallbackAscii => None,
        }
    }

    /// Stable lower-case label, also accepted by [`FromStr`]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Cp437 => "cp437",
            Self::Cp850 => "cp850",
            Self::Cp858 => "cp858",
            Self::Cp866 => "cp866",
            Self::Wpc1252 => "wpc1252",
            Self::Gbk => "gbk",
            Self::Utf8FallbackAscii => "utf8_fallback_ascii",
        }
    }

    fn encoding_rs(self) -> Option<&'static Encoding> {
        match self {
            Self::Cp866 => Some(encoding_rs::IBM866),
            Self::Wpc1252 => Some(encoding_rs::WINDOWS_1252),
            Self::Gbk => Some(encoding_rs::GBK),
            _ => None,
        }
    }

    // === Width ===

    /// Printed width of one character in columns
    ///
    /// Single-byte tables print one column per character. GBK prints
    /// double-byte characters double width; characters GBK cannot encode
    /// are substituted and take one column.
    pub fn char_width(self, c: char) -> usize {
        match self {
            Self::Gbk if !c.is_ascii() => {
                let mut buf = [0u8; 4];
                let (cow, _, unmappable) = encoding_rs::GBK.encode(c.encode_utf8(&mut buf));
                if unmappable { 1 } else { cow.len() }
            }
            _ => 1,
        }
    }

    /// Printed width of a string in columns
    pub fn text_width(self, s: &str) -> usize {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Truncate a string to fit within `max_width` columns
    pub fn truncate(self, s: &str, max_width: usize) -> String {
        let mut width = 0;
        let mut result = String::new();
        for c in s.chars() {
            let char_width = self.char_width(c);
            if width + char_width > max_width {
                break;
            }
            result.push(c);
            width += char_width;
        }
        result
    }

    /// Pad a string to exactly `width` columns
    ///
    /// If the string is wider than `width`, it is truncated. A double-width
    /// character cut at the boundary leaves one column of padding.
    pub fn pad(self, s: &str, width: usize, align_right: bool) -> String {
        let fitted = self.truncate(s, width);
        let spaces = width - self.text_width(&fitted);
        if align_right {
            format!("{}{}", " ".repeat(spaces), fitted)
        } else {
            format!("{}{}", fitted, " ".repeat(spaces))
        }
    }

    // === Encoding ===

    /// Append the bytes for `c`, returning `false` if it is not representable
    fn encode_char(self, c: char, out: &mut Vec<u8>) -> bool {
        if c.is_control() {
            return false;
        }
        if c.is_ascii() {
            out.push(c as u8);
            return true;
        }
        match self {
            Self::Ascii | Self::Cp850 | Self::Cp858 => false,
            Self::Utf8FallbackAscii => match fold_to_ascii(c) {
                Some(folded) => {
                    out.push(folded as u8);
                    true
                }
                None => false,
            },
            Self::Cp437 => match CP437_HIGH.iter().position(|&mapped| mapped == c) {
                Some(idx) => {
                    out.push(0x80 + idx as u8);
                    true
                }
                None => false,
            },
            Self::Cp866 | Self::Wpc1252 | Self::Gbk => {
                let Some(encoding) = self.encoding_rs() else {
                    return false;
                };
                let mut buf = [0u8; 4];
                let (bytes, _, unmappable) = encoding.encode(c.encode_utf8(&mut buf));
                if unmappable {
                    return false;
                }
                out.extend_from_slice(&bytes);
                true
            }
        }
    }

    /// Encode text, substituting anything the code page cannot render
    pub fn encode(self, s: &str) -> EncodingResult<EncodedText> {
        self.ensure_supported()?;
        Ok(self.encode_supported(s))
    }

    /// [`CodePage::encode`] for a code page already known to be supported
    ///
    /// Every substituted byte is recorded, even for an unmapped code page.
    pub(crate) fn encode_supported(self, s: &str) -> EncodedText {
        let mut bytes = Vec::with_capacity(s.len());
        let mut substituted = Vec::new();
        for c in s.chars() {
            if !self.encode_char(c, &mut bytes) {
                bytes.push(SUBSTITUTE as u8);
                substituted.push(c);
            }
        }
        EncodedText { bytes, substituted }
    }

    /// Decode bytes produced by [`CodePage::encode`]
    pub fn decode(self, bytes: &[u8]) -> EncodingResult<String> {
        self.ensure_supported()?;

        let text = match self {
            Self::Cp437 => bytes
                .iter()
                .map(|&b| {
                    if b < 0x80 {
                        b as char
                    } else {
                        CP437_HIGH[(b - 0x80) as usize]
                    }
                })
                .collect(),
            Self::Ascii | Self::Utf8FallbackAscii | Self::Cp850 | Self::Cp858 => bytes
                .iter()
                .map(|&b| if b < 0x80 { b as char } else { char::REPLACEMENT_CHARACTER })
                .collect(),
            Self::Cp866 | Self::Wpc1252 | Self::Gbk => match self.encoding_rs() {
                Some(encoding) => encoding
                    .decode_without_bom_handling(bytes)
                    .0
                    .into_owned(),
                None => String::from_utf8_lossy(bytes).into_owned(),
            },
        };
        Ok(text)
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CodePage {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascii" => Ok(Self::Ascii),
            "cp437" | "pc437" => Ok(Self::Cp437),
            "cp850" | "pc850" => Ok(Self::Cp850),
            "cp858" | "pc858" => Ok(Self::Cp858),
            "cp866" | "pc866" => Ok(Self::Cp866),
            "wpc1252" | "windows-1252" | "cp1252" => Ok(Self::Wpc1252),
            "gbk" => Ok(Self::Gbk),
            "utf8" | "utf-8" | "utf8_fallback_ascii" => Ok(Self::Utf8FallbackAscii),
            other => Err(PrintError::InvalidConfig(format!(
                "Unknown code page: {}",
                other
            ))),
        }
    }
}

/// Encoded bytes for one string plus the characters that were substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    pub bytes: Vec<u8>,
    pub substituted: Vec<char>,
}

/// Map typography and Latin diacritics to a plain ASCII look-alike
///
/// Only one-to-one folds, so the printed width never changes.
fn fold_to_ascii(c: char) -> Option<char> {
    let folded = match c {
        '\u{00A0}' | '\u{2002}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => ' ',
        '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
        '\u{2022}' | '\u{00B7}' => '*',
        '\u{00D7}' => 'x',
        'À'..='Å' | 'Ā' | 'Ă' | 'Ą' => 'A',
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'Ç' | 'Ć' | 'Č' => 'C',
        'ç' | 'ć' | 'č' => 'c',
        'Ď' | 'Đ' => 'D',
        'ď' | 'đ' => 'd',
        'È'..='Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => 'E',
        'è'..='ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'Ğ' => 'G',
        'ğ' => 'g',
        'Ì'..='Ï' | 'Ī' | 'Į' | 'İ' => 'I',
        'ì'..='ï' | 'ī' | 'į' | 'ı' => 'i',
        'Ł' => 'L',
        'ł' => 'l',
        'Ñ' | 'Ń' | 'Ň' => 'N',
        'ñ' | 'ń' | 'ň' => 'n',
        'Ò'..='Ö' | 'Ø' | 'Ō' | 'Ő' => 'O',
        'ò'..='ö' | 'ø' | 'ō' | 'ő' => 'o',
        'Ř' => 'R',
        'ř' => 'r',
        'Ś' | 'Š' | 'Ş' => 'S',
        'ś' | 'š' | 'ş' => 's',
        'Ť' | 'Ţ' => 'T',
        'ť' | 'ţ' => 't',
        'Ù'..='Ü' | 'Ū' | 'Ů' | 'Ű' => 'U',
        'ù'..='ü' | 'ū' | 'ů' | 'ű' => 'u',
        'Ý' | 'Ÿ' => 'Y',
        'ý' | 'ÿ' => 'y',
        'Ź' | 'Ż' | 'Ž' => 'Z',
        'ź' | 'ż' | 'ž' => 'z',
        _ => return None,
    };
    Some(folded)
}

/// CP437 upper half, indexed by `byte - 0x80`
const CP437_HIGH: [char; 128] = [
    // 0x80
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    // 0x90
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    // 0xA0
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    // 0xB0
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    // 0xC0
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    // 0xD0
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    // 0xE0
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    // 0xF0
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gbk_width() {
        assert_eq!(CodePage::Gbk.text_width("hello"), 5);
        assert_eq!(CodePage::Gbk.text_width("你好"), 4);
        assert_eq!(CodePage::Gbk.text_width("AB中文CD"), 8);
        assert_eq!(CodePage::Cp437.text_width("你好"), 2);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(CodePage::Cp437.truncate("hello world", 5), "hello");
        assert_eq!(CodePage::Gbk.truncate("你好世界", 4), "你好");
        assert_eq!(CodePage::Gbk.truncate("AB中文", 4), "AB中");
        assert_eq!(CodePage::Gbk.truncate("A中", 2), "A");
    }

    #[test]
    fn test_pad() {
        assert_eq!(CodePage::Ascii.pad("hi", 5, false), "hi   ");
        assert_eq!(CodePage::Ascii.pad("hi", 5, true), "   hi");
        assert_eq!(CodePage::Ascii.pad("hello world", 5, false), "hello");
        assert_eq!(CodePage::Gbk.pad("A中文", 4, false), "A中 ");
    }

    #[test]
    fn test_cp437_round_trip() {
        let text = "Café Ñandú 25°C ½ ±1 ÄÖÜ ß";
        let encoded = CodePage::Cp437.encode(text).unwrap();
        assert!(encoded.substituted.is_empty());
        assert_eq!(encoded.bytes.len(), text.chars().count());
        assert_eq!(CodePage::Cp437.decode(&encoded.bytes).unwrap(), text);
    }

    #[test]
    fn test_cp437_known_bytes() {
        let encoded = CodePage::Cp437.encode("Çé£").unwrap();
        assert_eq!(encoded.bytes, vec![0x80, 0x82, 0x9C]);
    }

    #[test]
    fn test_round_trip_encoding_rs_pages() {
        for (page, text) in [
            (CodePage::Wpc1252, "Crème brûlée €5"),
            (CodePage::Cp866, "Привет мир"),
            (CodePage::Gbk, "宫保鸡丁 x2"),
        ] {
            let encoded = page.encode(text).unwrap();
            assert!(encoded.substituted.is_empty(), "{page}: {:?}", encoded.substituted);
            assert_eq!(page.decode(&encoded.bytes).unwrap(), text);
        }
    }

    #[test]
    fn test_substitution_counted_not_dropped() {
        let encoded = CodePage::Cp437.encode("Bunga 🌹 Mawar").unwrap();
        assert_eq!(encoded.substituted, vec!['🌹']);
        assert_eq!(encoded.bytes.len(), "Bunga ? Mawar".len());
        assert_eq!(encoded.bytes, b"Bunga ? Mawar".to_vec());
    }

    #[test]
    fn test_control_chars_substituted() {
        let encoded = CodePage::Ascii.encode("a\x1bb\tc").unwrap();
        assert_eq!(encoded.bytes, b"a?b?c".to_vec());
        assert_eq!(encoded.substituted, vec!['\x1b', '\t']);
    }

    #[test]
    fn test_ascii_rejects_latin1() {
        let encoded = CodePage::Ascii.encode("né").unwrap();
        assert_eq!(encoded.bytes, b"n?".to_vec());
        assert_eq!(encoded.substituted.len(), 1);
    }

    #[test]
    fn test_utf8_fallback_folds() {
        let encoded = CodePage::Utf8FallbackAscii
            .encode("Rp\u{00A0}50.000 \u{2014} “Mawar” Jalan Séná")
            .unwrap();
        assert!(encoded.substituted.is_empty());
        assert_eq!(
            String::from_utf8(encoded.bytes).unwrap(),
            "Rp 50.000 - \"Mawar\" Jalan Sena"
        );
    }

    #[test]
    fn test_unsupported_code_page() {
        assert_eq!(
            CodePage::Cp858.encode("abc"),
            Err(EncodingError::UnsupportedCodePage(CodePage::Cp858))
        );
        assert!(CodePage::Cp850.decode(b"abc").is_err());
    }

    #[test]
    fn test_from_str_labels() {
        assert_eq!("CP437".parse::<CodePage>().unwrap(), CodePage::Cp437);
        assert_eq!("windows-1252".parse::<CodePage>().unwrap(), CodePage::Wpc1252);
        assert_eq!("utf8".parse::<CodePage>().unwrap(), CodePage::Utf8FallbackAscii);
        assert!("ebcdic".parse::<CodePage>().is_err());
        for page in [CodePage::Ascii, CodePage::Gbk, CodePage::Utf8FallbackAscii] {
            assert_eq!(page.label().parse::<CodePage>().unwrap(), page);
        }
    }
}
