//! CSV parsing with delimiter sniffing, header detection and cell coercion.
//!
//! # Example
//!
//! ```rust
//! use docproc::core::config::CsvConfig;
//! use docproc::extraction::csv::parse_csv;
//! use docproc::types::CellValue;
//!
//! # fn example() -> docproc::Result<()> {
//! let table = parse_csv(b"id;name\n1;Ada\n2;Grace\n", &CsvConfig::default())?;
//! assert_eq!(table.delimiter, ';');
//! assert!(table.has_headers);
//! assert_eq!(table.rows[0]["id"], CellValue::Integer(1));
//! # Ok(())
//! # }
//! ```

use super::columns::unique_column_names;
use crate::core::config::CsvConfig;
use crate::types::{CellValue, Record};
use crate::{DocprocError, Result};
use std::borrow::Cow;

const UTF8_BOM: &str = "\u{feff}";

/// A parsed CSV document.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub delimiter: char,
    pub has_headers: bool,
    pub columns: Vec<String>,
    /// Data rows, header excluded. Empty when the input had no rows at all.
    pub rows: Vec<Record>,
}

impl CsvTable {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Parse CSV bytes.
///
/// Zero rows is not an error: the returned table has no columns.
///
/// # Errors
///
/// `DocprocError::Parsing` if the reader rejects the input.
pub fn parse_csv(bytes: &[u8], config: &CsvConfig) -> Result<CsvTable> {
    let text = decode_text(bytes);
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(&text);

    let first_line = text.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line, &config.delimiter_candidates);
    tracing::debug!(delimiter = %delimiter.escape_default(), "Detected CSV delimiter");

    let raw_rows = read_rows(text, delimiter)?;
    if raw_rows.is_empty() {
        return Ok(CsvTable {
            delimiter,
            has_headers: false,
            columns: Vec::new(),
            rows: Vec::new(),
        });
    }

    let has_headers = detect_headers(&raw_rows);
    tracing::debug!(has_headers, rows = raw_rows.len(), "Detected CSV header row");

    let columns = if has_headers {
        header_names(&raw_rows[0])
    } else {
        synthesized_names(raw_rows[0].len())
    };

    let data_start = usize::from(has_headers);
    let rows = raw_rows[data_start..]
        .iter()
        .map(|fields| {
            columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let value = fields.get(i).map(|f| coerce_value(f)).unwrap_or(CellValue::Null);
                    (column.clone(), value)
                })
                .collect()
        })
        .collect();

    Ok(CsvTable {
        delimiter,
        has_headers,
        columns,
        rows,
    })
}

/// Decode as UTF-8, replacing invalid sequences.
#[cfg(feature = "simd-utf8")]
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match simdutf8::basic::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => String::from_utf8_lossy(bytes),
    }
}

/// Decode as UTF-8, replacing invalid sequences.
#[cfg(not(feature = "simd-utf8"))]
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Pick the candidate occurring most often in `first_line`.
///
/// The first candidate wins ties and is the fallback when nothing matches.
/// Non-ASCII candidates are ignored.
pub fn detect_delimiter(first_line: &str, candidates: &[char]) -> char {
    let mut usable = candidates.iter().copied().filter(char::is_ascii);
    let Some(mut best) = usable.next() else {
        return ',';
    };
    let mut best_count = first_line.matches(best).count();

    for candidate in usable {
        let count = first_line.matches(candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }

    best
}

fn read_rows(text: &str, delimiter: char) -> Result<Vec<Vec<String>>> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| DocprocError::validation(format!("CSV delimiter '{}' is not ASCII", delimiter)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// A header row is assumed unless some column is numeric in both of the
/// first two rows. A single row is always data.
pub fn detect_headers(rows: &[Vec<String>]) -> bool {
    if rows.len() < 2 {
        return false;
    }

    let (first, second) = (&rows[0], &rows[1]);
    let shared = first.len().min(second.len());
    !(0..shared).any(|i| is_numeric(&first[i]) && is_numeric(&second[i]))
}

fn header_names(header: &[String]) -> Vec<String> {
    unique_column_names(header.iter().enumerate().map(|(i, raw)| (i, Some(raw.as_str()))))
}

fn synthesized_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Column_{}", i)).collect()
}

/// Whether a field parses as a finite-looking number.
pub fn is_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.bytes().any(|b| b.is_ascii_digit()) && trimmed.parse::<f64>().is_ok()
}

/// Coerce one field: blank to Null, then number, then boolean, else text.
pub fn coerce_value(value: &str) -> CellValue {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return CellValue::Null;
    }

    if is_numeric(trimmed) {
        if !trimmed.contains('.')
            && let Ok(integer) = trimmed.parse::<i64>()
        {
            return CellValue::Integer(integer);
        }
        if let Ok(decimal) = trimmed.parse::<f64>() {
            return CellValue::Decimal(decimal);
        }
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Boolean(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Boolean(false);
    }

    CellValue::Text(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter().map(|r| r.iter().map(|s| s.to_string()).collect()).collect()
    }

    #[test]
    fn test_detect_delimiter_highest_count() {
        let candidates = CsvConfig::default().delimiter_candidates;
        assert_eq!(detect_delimiter("a,b,c,d;e", &candidates), ',');
        assert_eq!(detect_delimiter("a;b;c", &candidates), ';');
        assert_eq!(detect_delimiter("a\tb\tc", &candidates), '\t');
        assert_eq!(detect_delimiter("a|b|c", &candidates), '|');
    }

    #[test]
    fn test_detect_delimiter_ties_and_misses() {
        let candidates = CsvConfig::default().delimiter_candidates;
        assert_eq!(detect_delimiter("a,b;c", &candidates), ',');
        assert_eq!(detect_delimiter("single", &candidates), ',');
        assert_eq!(detect_delimiter("", &candidates), ',');
        assert_eq!(detect_delimiter("a;b", &[]), ',');
    }

    #[test]
    fn test_detect_headers() {
        assert!(detect_headers(&rows(&[&["id", "name"], &["1", "Alice"], &["2", "Bob"]])));
        assert!(!detect_headers(&rows(&[&["1", "2"], &["3", "4"]])));
        assert!(!detect_headers(&rows(&[&["only", "row"]])));
        // numeric in row 1 only, so still a header
        assert!(detect_headers(&rows(&[&["x", "y"], &["1.5", "2"]])));
        // ragged rows compare the shorter prefix
        assert!(!detect_headers(&rows(&[&["7"], &["8", "label"]])));
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(coerce_value(""), CellValue::Null);
        assert_eq!(coerce_value("   "), CellValue::Null);
        assert_eq!(coerce_value("42"), CellValue::Integer(42));
        assert_eq!(coerce_value(" -7 "), CellValue::Integer(-7));
        assert_eq!(coerce_value("3.25"), CellValue::Decimal(3.25));
        assert_eq!(coerce_value("1e3"), CellValue::Decimal(1000.0));
        assert_eq!(coerce_value("99999999999999999999"), CellValue::Decimal(1e20));
        assert_eq!(coerce_value("TRUE"), CellValue::Boolean(true));
        assert_eq!(coerce_value("false"), CellValue::Boolean(false));
        assert_eq!(coerce_value("NaN"), CellValue::Text("NaN".to_string()));
        assert_eq!(coerce_value("inf"), CellValue::Text("inf".to_string()));
        assert_eq!(coerce_value(" hello "), CellValue::Text("hello".to_string()));
    }

    #[test]
    fn test_parse_with_headers() {
        let table = parse_csv(b"a,b\n1,2\n", &CsvConfig::default()).unwrap();
        assert!(table.has_headers);
        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0]["a"], CellValue::Integer(1));
        assert_eq!(table.rows[0]["b"], CellValue::Integer(2));
    }

    #[test]
    fn test_parse_headerless() {
        let table = parse_csv(b"1,2\n3,4\n", &CsvConfig::default()).unwrap();
        assert!(!table.has_headers);
        assert_eq!(table.columns, vec!["Column_1", "Column_2"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1]["Column_2"], CellValue::Integer(4));
    }

    #[test]
    fn test_parse_quoted_fields() {
        let table = parse_csv(b"name,quote\nAda,\"Hello, world\"\nBob,\"say \"\"hi\"\"\"\n", &CsvConfig::default())
            .unwrap();
        assert_eq!(table.rows[0]["quote"], CellValue::Text("Hello, world".to_string()));
        assert_eq!(table.rows[1]["quote"], CellValue::Text("say \"hi\"".to_string()));
    }

    #[test]
    fn test_parse_ragged_rows() {
        let table = parse_csv(b"a,b,c\nx\nu,v,w,extra\n", &CsvConfig::default()).unwrap();
        assert_eq!(table.rows[0]["b"], CellValue::Null);
        assert_eq!(table.rows[0]["c"], CellValue::Null);
        assert_eq!(table.rows[1].len(), 3);
    }

    #[test]
    fn test_parse_bom_and_crlf() {
        let table = parse_csv("\u{feff}id,name\r\n1,Ada\r\n".as_bytes(), &CsvConfig::default()).unwrap();
        assert_eq!(table.columns, vec!["id", "name"]);
        assert_eq!(table.rows[0]["name"], CellValue::Text("Ada".to_string()));
    }

    #[test]
    fn test_parse_blank_lines_only_is_empty() {
        let table = parse_csv(b"\n\n\r\n", &CsvConfig::default()).unwrap();
        assert!(table.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_header_names_blank_and_duplicates() {
        let table = parse_csv(b"id,,id\nx,y,z\n", &CsvConfig::default()).unwrap();
        assert_eq!(table.columns, vec!["id", "Column_2", "id_2"]);
        assert_eq!(table.rows[0]["id_2"], CellValue::Text("z".to_string()));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let table = parse_csv(b"name\ncaf\xe9\nbar\n", &CsvConfig::default()).unwrap();
        assert_eq!(table.rows[0]["name"], CellValue::Text("caf\u{fffd}".to_string()));
    }
}
