//! Font decoding for the text layer: character codes to Unicode text and glyph widths.
//!
//! Widths come from the font dictionary when present (`/Widths` + `/FirstChar`
//! for simple fonts, `/W` + `/DW` for Type0 composite fonts) and fall back to the
//! built-in base-14 tables. Text comes from `/ToUnicode` when present, then from
//! the glyph names of an `/Encoding /Differences` array, otherwise single-byte
//! codes are read as WinAnsi. Composite fonts are assumed to use
//! two-byte codes (Identity-H / Identity-V), which is what resume generators emit.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};
use tracing::debug;

use crate::document::font_metrics::{get_metrics, Base14Family, FontMetricTable};
use crate::document::{as_number, dict_get, resolve};

/// Caps a single code range (`bfrange`, `/W` run) so a hostile font cannot
/// allocate without bound.
const MAX_CODE_RANGE: u32 = 0xFFFF;

/// One shown glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub code: u32,
    /// Unicode text for the glyph. Usually one char, several for ligatures, empty
    /// when the font gives no way to map the code.
    pub text: String,
    /// Horizontal advance in glyph space units (1/1000 of the font size).
    pub width: f64,
    /// Single-byte code 32, the only glyph word spacing (`Tw`) applies to.
    pub is_word_space: bool,
}

#[derive(Debug, Clone)]
enum Widths {
    Simple {
        first_char: u32,
        widths: Vec<f64>,
        missing_width: f64,
    },
    Builtin(&'static FontMetricTable),
    Composite {
        widths: HashMap<u32, f64>,
        default_width: f64,
    },
}

#[derive(Debug, Clone)]
pub struct PdfFont {
    widths: Widths,
    to_unicode: HashMap<u32, String>,
    /// Codes remapped by `/Encoding /Differences`, already turned into text.
    differences: HashMap<u32, String>,
    two_byte_codes: bool,
    /// Converts widths to 1/1000 em for Type3 fonts with a custom `/FontMatrix`.
    width_scale: f64,
}

impl PdfFont {
    /// Builds a decoder from a font dictionary. Never fails: missing or broken
    /// entries degrade to built-in metrics and WinAnsi text.
    pub fn load(doc: &Document, dict: &Dictionary) -> Self {
        let subtype = name_of(dict_get(doc, dict, b"Subtype")).unwrap_or_default();
        let base_font = name_of(dict_get(doc, dict, b"BaseFont")).unwrap_or_default();
        let to_unicode = load_to_unicode(doc, dict);

        if subtype == "Type0" {
            return Self {
                widths: composite_widths(doc, dict),
                to_unicode,
                differences: HashMap::new(),
                two_byte_codes: true,
                width_scale: 1.0,
            };
        }

        let widths = simple_widths(doc, dict).unwrap_or_else(|| {
            let table = get_metrics(Base14Family::from_base_font(&base_font));
            debug!(
                base_font = %base_font,
                family = ?table.family,
                "No /Widths, using built-in metrics"
            );
            Widths::Builtin(table)
        });
        let width_scale = if subtype == "Type3" {
            type3_width_scale(doc, dict)
        } else {
            1.0
        };

        Self {
            widths,
            to_unicode,
            differences: load_differences(doc, dict),
            two_byte_codes: false,
            width_scale,
        }
    }

    /// Used when `Tf` names a font the page resources do not define.
    pub fn fallback() -> Self {
        Self {
            widths: Widths::Builtin(get_metrics(Base14Family::Helvetica)),
            to_unicode: HashMap::new(),
            differences: HashMap::new(),
            two_byte_codes: false,
            width_scale: 1.0,
        }
    }

    /// Splits a shown string into glyphs.
    pub fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        let codes: Vec<u32> = if self.two_byte_codes {
            bytes
                .chunks(2)
                .map(|pair| match pair {
                    [hi, lo] => (u32::from(*hi) << 8) | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        };

        codes
            .into_iter()
            .map(|code| Glyph {
                code,
                text: self.text_for(code),
                width: self.width_of(code) * self.width_scale,
                is_word_space: !self.two_byte_codes && code == 32,
            })
            .collect()
    }

    fn width_of(&self, code: u32) -> f64 {
        match &self.widths {
            Widths::Simple {
                first_char,
                widths,
                missing_width,
            } => code
                .checked_sub(*first_char)
                .and_then(|i| widths.get(i as usize))
                .copied()
                .unwrap_or(*missing_width),
            Widths::Builtin(table) => table.width_of(code),
            Widths::Composite {
                widths,
                default_width,
            } => widths.get(&code).copied().unwrap_or(*default_width),
        }
    }

    fn text_for(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.get(&code) {
            return text.clone();
        }
        if self.two_byte_codes {
            return String::new();
        }
        if let Some(text) = self.differences.get(&code) {
            return text.clone();
        }
        u8::try_from(code)
            .ok()
            .and_then(winansi_char)
            .map(String::from)
            .unwrap_or_default()
    }
}

fn name_of(obj: Option<&Object>) -> Option<String> {
    match obj? {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

fn simple_widths(doc: &Document, dict: &Dictionary) -> Option<Widths> {
    let widths = match dict_get(doc, dict, b"Widths")? {
        Object::Array(items) => items
            .iter()
            .map(|item| resolve(doc, item).and_then(as_number).unwrap_or(0.0))
            .collect::<Vec<f64>>(),
        _ => return None,
    };
    let first_char = dict_get(doc, dict, b"FirstChar")
        .and_then(as_number)
        .unwrap_or(0.0)
        .max(0.0) as u32;
    let missing_width = dict_get(doc, dict, b"FontDescriptor")
        .and_then(|d| d.as_dict().ok())
        .and_then(|d| dict_get(doc, d, b"MissingWidth"))
        .and_then(as_number)
        .unwrap_or(0.0);

    Some(Widths::Simple {
        first_char,
        widths,
        missing_width,
    })
}

/// `/W` entries come in two shapes: `c [w1 w2 ...]` and `c_first c_last w`.
fn composite_widths(doc: &Document, dict: &Dictionary) -> Widths {
    let descendant = dict_get(doc, dict, b"DescendantFonts")
        .and_then(|obj| match obj {
            Object::Array(items) => items.first().and_then(|first| resolve(doc, first)),
            _ => None,
        })
        .and_then(|obj| obj.as_dict().ok());

    let Some(cid_font) = descendant else {
        debug!("Type0 font without a usable DescendantFonts entry");
        return Widths::Composite {
            widths: HashMap::new(),
            default_width: 1000.0,
        };
    };

    let default_width = dict_get(doc, cid_font, b"DW")
        .and_then(as_number)
        .unwrap_or(1000.0);

    let mut widths = HashMap::new();
    if let Some(Object::Array(entries)) = dict_get(doc, cid_font, b"W") {
        let entries: Vec<&Object> = entries.iter().filter_map(|e| resolve(doc, e)).collect();
        let mut i = 0;
        while i < entries.len() {
            let Some(start) = as_number(entries[i]) else {
                break;
            };
            let start = start.max(0.0) as u32;
            match (entries.get(i + 1), entries.get(i + 2)) {
                (Some(Object::Array(list)), _) => {
                    for (offset, w) in list.iter().enumerate() {
                        if let Some(w) = resolve(doc, w).and_then(as_number) {
                            widths.insert(start + offset as u32, w);
                        }
                    }
                    i += 2;
                }
                (Some(last), Some(w)) => {
                    let (Some(last), Some(w)) = (as_number(last), as_number(w)) else {
                        break;
                    };
                    let last = (last.max(0.0) as u32).min(start.saturating_add(MAX_CODE_RANGE));
                    for cid in start..=last {
                        widths.insert(cid, w);
                    }
                    i += 3;
                }
                _ => break,
            }
        }
    }

    Widths::Composite {
        widths,
        default_width,
    }
}

fn type3_width_scale(doc: &Document, dict: &Dictionary) -> f64 {
    match dict_get(doc, dict, b"FontMatrix") {
        Some(Object::Array(m)) => m
            .first()
            .and_then(as_number)
            .map(|a| a * 1000.0)
            .unwrap_or(1.0),
        _ => 1.0,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ToUnicode CMaps
// ────────────────────────────────────────────────────────────────────────────

fn load_to_unicode(doc: &Document, dict: &Dictionary) -> HashMap<u32, String> {
    let Some(Object::Stream(stream)) = dict_get(doc, dict, b"ToUnicode") else {
        return HashMap::new();
    };
    let data = if stream.dict.has(b"Filter") {
        match stream.decompressed_content() {
            Ok(data) => data,
            Err(e) => {
                debug!("ToUnicode stream could not be decompressed: {e}");
                return HashMap::new();
            }
        }
    } else {
        stream.content.clone()
    };
    parse_to_unicode(&data)
}

#[derive(Debug, Clone, PartialEq)]
enum CmapToken {
    Hex(Vec<u8>),
    Word(String),
    OpenArray,
    CloseArray,
}

fn tokenize_cmap(data: &[u8]) -> Vec<CmapToken> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'>' if data.get(i + 1) == Some(&b'>') => i += 2,
            b'<' => {
                let end = data[i..]
                    .iter()
                    .position(|b| *b == b'>')
                    .map_or(data.len(), |p| i + p);
                tokens.push(CmapToken::Hex(decode_hex(&data[i + 1..end])));
                i = end + 1;
            }
            b'>' => i += 1,
            b'[' => {
                tokens.push(CmapToken::OpenArray);
                i += 1;
            }
            b']' => {
                tokens.push(CmapToken::CloseArray);
                i += 1;
            }
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                while i < data.len()
                    && !data[i].is_ascii_whitespace()
                    && !matches!(data[i], b'<' | b'>' | b'[' | b']' | b'%')
                {
                    i += 1;
                }
                tokens.push(CmapToken::Word(
                    String::from_utf8_lossy(&data[start..i]).into_owned(),
                ));
            }
        }
    }
    tokens
}

fn decode_hex(digits: &[u8]) -> Vec<u8> {
    let nibbles: Vec<u8> = digits
        .iter()
        .filter_map(|d| (*d as char).to_digit(16).map(|n| n as u8))
        .collect();
    nibbles
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => (hi << 4) | lo,
            [hi] => hi << 4,
            _ => 0,
        })
        .collect()
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b))
}

fn utf16_text(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [single] => u16::from(*single),
            _ => 0,
        })
        .collect();
    String::from_utf16_lossy(&units)
}

/// Destination text for the `offset`-th code of a `bfrange`: the last UTF-16
/// unit of the base destination is incremented by `offset`.
fn offset_text(base: &[u8], offset: u32) -> String {
    let mut bytes = base.to_vec();
    if bytes.len() >= 2 {
        let n = bytes.len();
        let last = u16::from_be_bytes([bytes[n - 2], bytes[n - 1]]);
        let [hi, lo] = last.wrapping_add(offset as u16).to_be_bytes();
        bytes[n - 2] = hi;
        bytes[n - 1] = lo;
    } else if let Some(last) = bytes.last_mut() {
        *last = last.wrapping_add(offset as u8);
    }
    utf16_text(&bytes)
}

/// Parses the `bfchar` and `bfrange` sections of a ToUnicode CMap.
pub fn parse_to_unicode(data: &[u8]) -> HashMap<u32, String> {
    let tokens = tokenize_cmap(data);
    let mut map = HashMap::new();
    let mut i = 0;

    let is_word = |token: Option<&CmapToken>, word: &str| {
        matches!(token, Some(CmapToken::Word(w)) if w == word)
    };

    while i < tokens.len() {
        if is_word(tokens.get(i), "beginbfchar") {
            i += 1;
            while i < tokens.len() && !is_word(tokens.get(i), "endbfchar") {
                if let (Some(CmapToken::Hex(src)), Some(CmapToken::Hex(dst))) =
                    (tokens.get(i), tokens.get(i + 1))
                {
                    map.insert(code_of(src), utf16_text(dst));
                    i += 2;
                } else {
                    i += 1;
                }
            }
        } else if is_word(tokens.get(i), "beginbfrange") {
            i += 1;
            while i < tokens.len() && !is_word(tokens.get(i), "endbfrange") {
                let (Some(CmapToken::Hex(lo)), Some(CmapToken::Hex(hi))) =
                    (tokens.get(i), tokens.get(i + 1))
                else {
                    i += 1;
                    continue;
                };
                let lo = code_of(lo);
                let hi = code_of(hi).min(lo.saturating_add(MAX_CODE_RANGE));
                match tokens.get(i + 2) {
                    Some(CmapToken::Hex(dst)) => {
                        for code in lo..=hi {
                            map.insert(code, offset_text(dst, code - lo));
                        }
                        i += 3;
                    }
                    Some(CmapToken::OpenArray) => {
                        let mut j = i + 3;
                        // `None` once the code space is exhausted; the rest of
                        // the array is still consumed.
                        let mut next = Some(lo);
                        while let Some(CmapToken::Hex(dst)) = tokens.get(j) {
                            if let Some(code) = next.filter(|c| *c <= hi) {
                                map.insert(code, utf16_text(dst));
                            }
                            next = next.and_then(|c| c.checked_add(1));
                            j += 1;
                        }
                        // Skip the closing bracket.
                        i = j + 1;
                    }
                    _ => i += 2,
                }
            }
        }
        i += 1;
    }

    map
}

// ────────────────────────────────────────────────────────────────────────────
// Encoding differences
// ────────────────────────────────────────────────────────────────────────────

/// Reads `/Encoding << /Differences [code /name /name ... code /name ...] >>`.
/// A number sets the next code; each name takes the current code and advances
/// it. Names without a known Unicode value are left to the base encoding.
fn load_differences(doc: &Document, dict: &Dictionary) -> HashMap<u32, String> {
    let mut map = HashMap::new();
    let Some(Object::Dictionary(encoding)) = dict_get(doc, dict, b"Encoding") else {
        return map;
    };
    let Some(Object::Array(items)) = dict_get(doc, encoding, b"Differences") else {
        return map;
    };

    let mut code: Option<u32> = None;
    for item in items {
        match resolve(doc, item) {
            Some(Object::Integer(n)) => code = u32::try_from(*n).ok().filter(|c| *c <= 0xFF),
            Some(Object::Name(name)) => {
                let Some(current) = code else { continue };
                if let Some(text) = glyph_name_text(&String::from_utf8_lossy(name)) {
                    map.insert(current, text);
                }
                code = Some(current + 1).filter(|c| *c <= 0xFF);
            }
            _ => {}
        }
    }

    if !map.is_empty() {
        debug!(codes = map.len(), "Applied /Encoding /Differences");
    }
    map
}

/// Unicode text for an Adobe glyph name. Covers the names resume fonts
/// actually remap plus the `uniXXXX` / `uXXXX` forms.
fn glyph_name_text(name: &str) -> Option<String> {
    let ch = match name {
        "ff" => '\u{FB00}',
        "fi" => '\u{FB01}',
        "fl" => '\u{FB02}',
        "ffi" => '\u{FB03}',
        "ffl" => '\u{FB04}',
        "quoteleft" => '\u{2018}',
        "quoteright" => '\u{2019}',
        "quotedblleft" => '\u{201C}',
        "quotedblright" => '\u{201D}',
        "quotesinglbase" => '\u{201A}',
        "quotedblbase" => '\u{201E}',
        "quotesingle" => '\'',
        "quotedbl" => '"',
        "endash" => '\u{2013}',
        "emdash" => '\u{2014}',
        "hyphen" => '-',
        "minus" => '\u{2212}',
        "bullet" => '\u{2022}',
        "periodcentered" => '\u{00B7}',
        "ellipsis" => '\u{2026}',
        "space" | "nbspace" => ' ',
        "period" => '.',
        "comma" => ',',
        "colon" => ':',
        "semicolon" => ';',
        "exclam" => '!',
        "question" => '?',
        "parenleft" => '(',
        "parenright" => ')',
        "bracketleft" => '[',
        "bracketright" => ']',
        "slash" => '/',
        "ampersand" => '&',
        "at" => '@',
        "percent" => '%',
        "plus" => '+',
        "numbersign" => '#',
        "dollar" => '$',
        "asterisk" => '*',
        "underscore" => '_',
        "bar" => '|',
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
        "aacute" => 'á',
        "eacute" => 'é',
        "egrave" => 'è',
        "iacute" => 'í',
        "oacute" => 'ó',
        "uacute" => 'ú',
        "ntilde" => 'ñ',
        "ccedilla" => 'ç',
        "adieresis" => 'ä',
        "odieresis" => 'ö',
        "udieresis" => 'ü',
        "germandbls" => 'ß',
        _ => return glyph_name_fallback(name),
    };
    Some(ch.to_string())
}

fn glyph_name_fallback(name: &str) -> Option<String> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_ascii_alphabetic().then(|| c.to_string());
    }

    let hex = name
        .strip_prefix("uni")
        .filter(|h| h.len() == 4)
        .or_else(|| name.strip_prefix('u').filter(|h| (4..=6).contains(&h.len())))?;
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .map(String::from)
}

// ────────────────────────────────────────────────────────────────────────────
// WinAnsi
// ────────────────────────────────────────────────────────────────────────────

/// 0x80..=0x9F in WinAnsiEncoding (CP-1252). Unassigned slots are `None`.
const WINANSI_HIGH: [Option<char>; 32] = [
    Some('€'), None, Some('‚'), Some('ƒ'), Some('„'), Some('…'), Some('†'), Some('‡'),
    Some('ˆ'), Some('‰'), Some('Š'), Some('‹'), Some('Œ'), None, Some('Ž'), None,
    None, Some('‘'), Some('’'), Some('“'), Some('”'), Some('•'), Some('–'), Some('—'),
    Some('˜'), Some('™'), Some('š'), Some('›'), Some('œ'), None, Some('ž'), Some('Ÿ'),
];

pub fn winansi_char(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E => Some(code as char),
        0x80..=0x9F => WINANSI_HIGH[(code - 0x80) as usize],
        0xA0..=0xFF => Some(char::from(code)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    #[test]
    fn test_base14_font_without_widths_uses_builtin_table() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        };
        let font = PdfFont::load(&doc, &dict);
        let glyphs = font.decode(b"Hi ");
        assert_eq!(glyphs.len(), 3);
        assert_eq!(glyphs[0].text, "H");
        assert_eq!(glyphs[0].width, 722.0);
        assert_eq!(glyphs[1].width, 222.0);
        assert!(glyphs[2].is_word_space);
    }

    #[test]
    fn test_simple_font_widths_and_first_char() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! {
            "Subtype" => "TrueType",
            "BaseFont" => "ABCDEF+Calibri",
            "FirstChar" => 65,
            "Widths" => vec![600.into(), 550.into()],
        };
        let font = PdfFont::load(&doc, &dict);
        let glyphs = font.decode(b"ABC");
        assert_eq!(glyphs[0].width, 600.0);
        assert_eq!(glyphs[1].width, 550.0);
        // Outside the Widths range with no MissingWidth.
        assert_eq!(glyphs[2].width, 0.0);
    }

    #[test]
    fn test_winansi_high_range() {
        let font = PdfFont::fallback();
        let glyphs = font.decode(&[0x95, 0x96, 0xE9]);
        let text: String = glyphs.iter().map(|g| g.text.as_str()).collect();
        assert_eq!(text, "•–é");
        assert_eq!(winansi_char(0x81), None);
    }

    #[test]
    fn test_parse_to_unicode_bfchar_and_bfrange() {
        let cmap = b"/CIDInit /ProcSet findresource begin
            12 dict begin
            begincmap
            1 begincodespacerange <0000> <FFFF> endcodespacerange
            2 beginbfchar
            <0003> <0020>
            <0024> <0041>
            endbfchar
            2 beginbfrange
            <0044> <0046> <0061>
            <0050> <0051> [<0066006C> <0078>]
            endbfrange
            endcmap";
        let map = parse_to_unicode(cmap);
        assert_eq!(map.get(&0x0003).map(String::as_str), Some(" "));
        assert_eq!(map.get(&0x0024).map(String::as_str), Some("A"));
        assert_eq!(map.get(&0x0044).map(String::as_str), Some("a"));
        assert_eq!(map.get(&0x0046).map(String::as_str), Some("c"));
        assert_eq!(map.get(&0x0050).map(String::as_str), Some("fl"));
        assert_eq!(map.get(&0x0051).map(String::as_str), Some("x"));
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn test_bfrange_array_at_end_of_code_space() {
        let cmap = b"1 beginbfrange
            <FFFFFFFF> <FFFFFFFF> [<0041> <0042>]
            <0001> <0001> <0043>
            endbfrange";
        let map = parse_to_unicode(cmap);
        assert_eq!(map.get(&0xFFFF_FFFF).map(String::as_str), Some("A"));
        assert_eq!(map.get(&0x0001).map(String::as_str), Some("C"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_encoding_differences_map_glyph_names() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! {
            "Subtype" => "Type1",
            "BaseFont" => "ABCDEF+SourceSerifPro",
            "Encoding" => dictionary! {
                "Type" => "Encoding",
                "BaseEncoding" => "WinAnsiEncoding",
                "Differences" => vec![
                    12.into(), Object::Name(b"fi".to_vec()), Object::Name(b"fl".to_vec()),
                    39.into(), Object::Name(b"quoteright".to_vec()),
                    128.into(), Object::Name(b"uni2022".to_vec()), Object::Name(b"glyph42".to_vec()),
                ],
            },
        };
        let font = PdfFont::load(&doc, &dict);
        let text: String = font
            .decode(b"\x0Cnance's \x0Dow \x80")
            .iter()
            .map(|g| g.text.as_str())
            .collect();
        assert_eq!(text, "\u{FB01}nance\u{2019}s \u{FB02}ow \u{2022}");
        // Unknown names keep the base encoding.
        assert_eq!(font.decode(&[0x81])[0].text, "");
        assert_eq!(font.decode(b"A")[0].text, "A");
    }

    #[test]
    fn test_glyph_name_forms() {
        assert_eq!(glyph_name_text("ffi").as_deref(), Some("\u{FB03}"));
        assert_eq!(glyph_name_text("endash").as_deref(), Some("\u{2013}"));
        assert_eq!(glyph_name_text("g").as_deref(), Some("g"));
        assert_eq!(glyph_name_text("uni00E9").as_deref(), Some("é"));
        assert_eq!(glyph_name_text("u1F600").as_deref(), Some("\u{1F600}"));
        assert_eq!(glyph_name_text("g123"), None);
        assert_eq!(glyph_name_text(".notdef"), None);
    }

    #[test]
    fn test_type0_font_uses_w_array_and_to_unicode() {
        let mut doc = Document::with_version("1.5");
        let cmap = b"1 beginbfchar <0001> <0052> endbfchar
                     1 beginbfrange <0002> <0004> <0075> endbfrange";
        let to_unicode = doc.add_object(Stream::new(dictionary! {}, cmap.to_vec()));
        let cid_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "DW" => 500,
            "W" => vec![
                1.into(),
                Object::Array(vec![640.into(), 560.into()]),
                3.into(), 4.into(), 480.into(),
            ],
        });
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "ABCDEF+Inter-Regular",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![cid_font.into()],
            "ToUnicode" => to_unicode,
        };

        let font = PdfFont::load(&doc, &dict);
        let glyphs = font.decode(&[0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04, 0x00, 0x09]);
        let text: String = glyphs.iter().map(|g| g.text.as_str()).collect();
        assert_eq!(text, "Ruvw");
        let widths: Vec<f64> = glyphs.iter().map(|g| g.width).collect();
        assert_eq!(widths, vec![640.0, 560.0, 480.0, 480.0, 500.0]);
        assert!(glyphs.iter().all(|g| !g.is_word_space));
    }
}
