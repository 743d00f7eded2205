//! Document information dictionary and header version.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lopdf::{Dictionary, Document, Object};

/// PDFDocEncoding characters for bytes 0x80..=0x9F.
const PDF_DOC_HIGH: [char; 32] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
    '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}', '\u{201D}', '\u{2018}',
    '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}', '\u{0141}', '\u{0152}', '\u{0160}',
    '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}',
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfMetadata {
    /// Header version, e.g. "1.7".
    pub pdf_version: String,
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// Local time.
    pub creation_date: Option<NaiveDateTime>,
    /// Local time.
    pub modification_date: Option<NaiveDateTime>,
}

/// Read the header version, page count and Info dictionary.
///
/// Missing or malformed entries are simply absent.
pub fn extract_metadata(document: &Document) -> PdfMetadata {
    let mut metadata = PdfMetadata {
        pdf_version: document.version.clone(),
        page_count: document.get_pages().len(),
        ..Default::default()
    };

    let Some(info) = info_dictionary(document) else {
        return metadata;
    };

    metadata.title = text_entry(document, info, b"Title");
    metadata.author = text_entry(document, info, b"Author");
    metadata.subject = text_entry(document, info, b"Subject");
    metadata.keywords = text_entry(document, info, b"Keywords");
    metadata.creator = text_entry(document, info, b"Creator");
    metadata.producer = text_entry(document, info, b"Producer");
    metadata.creation_date = text_entry(document, info, b"CreationDate")
        .as_deref()
        .and_then(parse_pdf_date);
    metadata.modification_date = text_entry(document, info, b"ModDate")
        .as_deref()
        .and_then(parse_pdf_date);

    metadata
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    let info = document.trailer.get(b"Info").ok()?;
    resolve(document, info)?.as_dict().ok()
}

fn text_entry(document: &Document, info: &Dictionary, key: &[u8]) -> Option<String> {
    let value = resolve(document, info.get(key).ok()?)?;
    let text = decode_text_string(value.as_str().ok()?);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Decode a PDF text string: UTF-16BE or UTF-8 when a byte order mark is
/// present, PDFDocEncoding otherwise.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units = utf16.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }
    if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(utf8).into_owned();
    }
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => PDF_DOC_HIGH[usize::from(b - 0x80)],
            _ => char::from(b),
        })
        .collect()
}

/// Parse a PDF date (`D:YYYYMMDDHHmmSSOHH'mm'`) and convert it to local time.
///
/// Only the year is required. A missing offset is read as UTC.
pub fn parse_pdf_date(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    let value = value.strip_prefix("D:").unwrap_or(value);

    let digits_end = value.find(|c: char| !c.is_ascii_digit()).unwrap_or(value.len());
    let (digits, zone) = value.split_at(digits_end);
    if digits.len() < 4 {
        return None;
    }

    let field = |start: usize, len: usize, default: u32| -> Option<u32> {
        match digits.get(start..start + len) {
            Some(part) => part.parse().ok(),
            None => Some(default),
        }
    };
    let year: i32 = digits[..4].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(4, 2, 1)?, field(6, 2, 1)?)?;
    let naive = date.and_hms_opt(field(8, 2, 0)?, field(10, 2, 0)?, field(12, 2, 0)?)?;

    let instant: DateTime<Utc> = match parse_offset(zone) {
        Some(offset) => offset.from_local_datetime(&naive).single()?.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    };
    Some(instant.with_timezone(&Local).naive_local())
}

/// `Z`, `+HH'mm'`, `-HH'mm`, `+HH` or nothing.
fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let mut chars = zone.chars();
    let sign = match chars.next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits: String = chars.filter(char::is_ascii_digit).collect();
    let hours: i32 = digits.get(..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..4).and_then(|m| m.parse().ok()).unwrap_or(0);
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
