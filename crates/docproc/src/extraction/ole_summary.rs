//! `\x05SummaryInformation` property set of OLE compound documents.
//!
//! The stream is a property set: a header naming one or more sections, each
//! section a table of `(property id, offset)` pairs followed by typed values.
//! Only the first section is read, and only the value types the summary
//! properties use (`VT_I2`, `VT_I4`, `VT_LPSTR`, `VT_LPWSTR`, `VT_FILETIME`).
//! `VT_LPSTR` values are decoded with the code page named by `PID_CODEPAGE`,
//! Windows-1252 when the set has none.

use super::binary::{le_u16, le_u32, slice_at};
use crate::error::{DocprocError, Result};
use ahash::AHashMap;
use chrono::{DateTime, Local, NaiveDateTime};
use encoding_rs::{Encoding, WINDOWS_1252};
use std::io::{Read, Seek};

pub const SUMMARY_INFORMATION_STREAM: &str = "/\u{5}SummaryInformation";

const PID_CODEPAGE: u32 = 1;
const PID_TITLE: u32 = 2;
const PID_SUBJECT: u32 = 3;
const PID_AUTHOR: u32 = 4;
const PID_KEYWORDS: u32 = 5;
const PID_LAST_AUTHOR: u32 = 8;
const PID_CREATE_DTM: u32 = 12;
const PID_LAST_SAVE_DTM: u32 = 13;
const PID_PAGE_COUNT: u32 = 14;
const PID_WORD_COUNT: u32 = 15;
const PID_CHAR_COUNT: u32 = 16;
const PID_APP_NAME: u32 = 18;

const VT_I2: u16 = 0x0002;
const VT_I4: u16 = 0x0003;
const VT_LPSTR: u16 = 0x001E;
const VT_LPWSTR: u16 = 0x001F;
const VT_FILETIME: u16 = 0x0040;

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_EPOCH_SECS: u64 = 11_644_473_600;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryInformation {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub keywords: Option<String>,
    pub last_author: Option<String>,
    pub application_name: Option<String>,
    pub create_time: Option<NaiveDateTime>,
    pub last_save_time: Option<NaiveDateTime>,
    pub page_count: Option<i64>,
    pub word_count: Option<i64>,
    pub char_count: Option<i64>,
}

/// Read summary information from an open compound file.
///
/// Returns `None` when the stream is missing or cannot be decoded; both are
/// logged and never fail the caller.
pub fn read_summary_information<F: Read + Seek>(compound: &mut cfb::CompoundFile<F>) -> Option<SummaryInformation> {
    if !compound.exists(SUMMARY_INFORMATION_STREAM) {
        return None;
    }

    let mut data = Vec::new();
    let read = compound
        .open_stream(SUMMARY_INFORMATION_STREAM)
        .and_then(|mut stream| stream.read_to_end(&mut data));
    if let Err(e) = read {
        tracing::warn!(error = %e, "Error reading DOC summary information");
        return None;
    }

    match parse_summary_information(&data) {
        Ok(summary) => Some(summary),
        Err(e) => {
            tracing::warn!(error = %e, "Error extracting DOC properties");
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PropertyValue {
    Int(i64),
    AnsiString(Vec<u8>),
    String(String),
    FileTime(u64),
}

/// Decode a `\x05SummaryInformation` stream.
///
/// # Errors
///
/// Returns `DocprocError::Parsing` when the header is not a property set, or
/// when the property table or an offset points past the end of the stream.
pub fn parse_summary_information(data: &[u8]) -> Result<SummaryInformation> {
    if read_u16(data, 0)? != 0xFFFE {
        return Err(DocprocError::parsing("Summary information has an invalid byte order mark"));
    }
    if read_u32(data, 24)? == 0 {
        return Ok(SummaryInformation::default());
    }

    let section = read_u32(data, 44)? as usize;
    let count = read_u32(data, section + 4)? as usize;
    let table_fits = count
        .checked_mul(8)
        .and_then(|len| len.checked_add(section + 8))
        .is_some_and(|end| end <= data.len());
    if !table_fits {
        return Err(DocprocError::parsing(format!(
            "Summary information declares {} properties, more than the stream holds",
            count
        )));
    }

    let mut properties = AHashMap::with_capacity(count);
    for i in 0..count {
        let entry = section + 8 + i * 8;
        let id = read_u32(data, entry)?;
        let offset = section + read_u32(data, entry + 4)? as usize;
        if let Some(value) = read_value(data, offset)? {
            properties.insert(id, value);
        }
    }

    let encoding = match properties.get(&PID_CODEPAGE) {
        Some(PropertyValue::Int(code_page)) => code_page_encoding(*code_page),
        _ => WINDOWS_1252,
    };
    let text = |id: u32| match properties.get(&id)? {
        PropertyValue::AnsiString(bytes) => non_empty(decode_ansi(bytes, encoding)),
        PropertyValue::String(s) => non_empty(s.clone()),
        _ => None,
    };
    let int = |id: u32| match properties.get(&id)? {
        PropertyValue::Int(i) => Some(*i),
        _ => None,
    };
    let time = |id: u32| match properties.get(&id)? {
        PropertyValue::FileTime(ft) => filetime_to_local(*ft),
        _ => None,
    };

    Ok(SummaryInformation {
        title: text(PID_TITLE),
        subject: text(PID_SUBJECT),
        author: text(PID_AUTHOR),
        keywords: text(PID_KEYWORDS),
        last_author: text(PID_LAST_AUTHOR),
        application_name: text(PID_APP_NAME),
        create_time: time(PID_CREATE_DTM),
        last_save_time: time(PID_LAST_SAVE_DTM),
        page_count: int(PID_PAGE_COUNT),
        word_count: int(PID_WORD_COUNT),
        char_count: int(PID_CHAR_COUNT),
    })
}

/// A typed value, or `None` for types the summary never uses.
fn read_value(data: &[u8], offset: usize) -> Result<Option<PropertyValue>> {
    let value = match read_u16(data, offset)? {
        VT_I2 => PropertyValue::Int(i64::from(read_u16(data, offset + 4)? as i16)),
        VT_I4 => PropertyValue::Int(i64::from(read_u32(data, offset + 4)? as i32)),
        VT_LPSTR => {
            let len = read_u32(data, offset + 4)? as usize;
            PropertyValue::AnsiString(read_bytes(data, offset + 8, len)?.to_vec())
        }
        VT_LPWSTR => {
            let chars = read_u32(data, offset + 4)? as usize;
            let bytes = read_bytes(data, offset + 8, chars * 2)?;
            let units = bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]]));
            let text: String = char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect();
            PropertyValue::String(text.trim_end_matches('\0').to_string())
        }
        VT_FILETIME => {
            let low = u64::from(read_u32(data, offset + 4)?);
            let high = u64::from(read_u32(data, offset + 8)?);
            PropertyValue::FileTime((high << 32) | low)
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// `PID_CODEPAGE` is a `VT_I2`, so code pages above 32767 (UTF-8 is 65001)
/// arrive as negative numbers.
fn code_page_encoding(code_page: i64) -> &'static Encoding {
    codepage::to_encoding_no_replacement(code_page as u16).unwrap_or_else(|| {
        tracing::debug!(code_page, "Unknown summary information code page, using Windows-1252");
        WINDOWS_1252
    })
}

/// Decode a `VT_LPSTR` value up to its terminating NUL.
fn decode_ansi(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    match text.find('\0') {
        Some(end) => text[..end].to_string(),
        None => text.into_owned(),
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// 100-nanosecond intervals since 1601-01-01 UTC, as local time. Zero is unset.
fn filetime_to_local(filetime: u64) -> Option<NaiveDateTime> {
    if filetime == 0 {
        return None;
    }
    let secs = (filetime / 10_000_000).checked_sub(FILETIME_UNIX_EPOCH_SECS)?;
    let nanos = (filetime % 10_000_000) * 100;
    DateTime::from_timestamp(i64::try_from(secs).ok()?, nanos as u32).map(|utc| utc.with_timezone(&Local).naive_local())
}

fn truncated(offset: usize) -> DocprocError {
    DocprocError::parsing(format!("Summary information truncated at offset {}", offset))
}

fn read_bytes(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    slice_at(data, offset, len).ok_or_else(|| truncated(offset))
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    le_u16(data, offset).ok_or_else(|| truncated(offset))
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    le_u32(data, offset).ok_or_else(|| truncated(offset))
}
