use crate::core::document_type::{DocumentType, extension_of};
use crate::error::ErrorCode;
use crate::text::DetectedLanguage;
use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

// ============================================================================
// Input
// ============================================================================

/// A document handed to the engine for processing.
///
/// Owned by the caller. The engine only reads it.
#[derive(Debug, Clone)]
pub struct Document {
    /// File name including extension. The extension drives classification.
    pub name: String,
    /// Raw bytes of the file.
    pub content: Vec<u8>,
    /// MIME type reported by the uploader, informational only.
    pub mime_type: Option<String>,
    /// Declared size; [`Document::size`] falls back to the content length.
    pub size: Option<u64>,
    pub upload_time: DateTime<Utc>,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            mime_type: None,
            size: None,
            upload_time: Utc::now(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Lower-cased substring after the last `.` of the name, or `""`.
    pub fn file_extension(&self) -> String {
        extension_of(&self.name)
    }

    /// Declared size, or the content length when none was declared.
    pub fn size(&self) -> u64 {
        self.size.unwrap_or(self.content.len() as u64)
    }

    /// The type derived from the extension. Not authoritative.
    pub fn determine_type(&self) -> Option<DocumentType> {
        DocumentType::from_extension(&self.file_extension()).ok()
    }
}

// ============================================================================
// Cell values and rows
// ============================================================================

/// A coerced cell value from a CSV field or spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Decimal(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Hashable identity used for distinct-value counting.
    ///
    /// `Integer(1)` and `Decimal(1.0)` are distinct, as are `Text("1")` and `Integer(1)`.
    pub(crate) fn distinct_key(&self) -> CellKey<'_> {
        match self {
            CellValue::Null => CellKey::Null,
            CellValue::Integer(i) => CellKey::Integer(*i),
            CellValue::Decimal(d) => CellKey::Decimal(d.to_bits()),
            CellValue::Boolean(b) => CellKey::Boolean(*b),
            CellValue::DateTime(dt) => CellKey::DateTime(*dt),
            CellValue::Text(s) => CellKey::Text(s),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Decimal(d) => write!(f, "{}", d),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub(crate) enum CellKey<'a> {
    Null,
    Integer(i64),
    Decimal(u64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Text(&'a str),
}

/// One row: column name to value, in column order.
pub type Record = IndexMap<String, CellValue>;

// ============================================================================
// Structured content
// ============================================================================

/// Row-oriented or structural content pulled out of a document.
///
/// Serializes as a plain JSON array in every case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractedData {
    /// CSV rows.
    Records(Vec<Record>),
    /// One entry per spreadsheet sheet.
    Sheets(Vec<SheetData>),
    /// A single entry describing a word-processing document's structure.
    Document(Vec<WordContent>),
}

impl ExtractedData {
    /// All rows, flattened across sheets. Word content has no rows.
    pub fn records(&self) -> Vec<&Record> {
        match self {
            ExtractedData::Records(rows) => rows.iter().collect(),
            ExtractedData::Sheets(sheets) => sheets.iter().flat_map(|s| s.data.iter()).collect(),
            ExtractedData::Document(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ExtractedData::Records(rows) => rows.len(),
            ExtractedData::Sheets(sheets) => sheets.len(),
            ExtractedData::Document(content) => content.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extracted content of a single spreadsheet sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetData {
    pub sheet_name: String,
    pub sheet_index: usize,
    pub has_data: bool,
    pub has_headers: bool,
    pub headers: Vec<String>,
    pub data: Vec<Record>,
    pub statistics: SheetStats,
}

/// Paragraphs, tables, headers and footers of a word-processing document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordContent {
    pub paragraphs: Vec<ParagraphData>,
    pub tables: Vec<TableData>,
    pub headers: Vec<String>,
    pub footers: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphData {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    /// Legacy binary paragraphs only: 0 left, 1 center, 2 right, 3 justified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<RunData>,
}

/// A run of uniformly formatted text inside a paragraph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunData {
    pub text: String,
    pub is_bold: bool,
    pub is_italic: bool,
    /// Size in points.
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub rows: Vec<Vec<String>>,
    pub row_count: usize,
    pub column_count: usize,
}

// ============================================================================
// Statistics
// ============================================================================

/// Per-format statistics. Serializes as the inner struct's fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessingStats {
    Csv(CsvStats),
    Spreadsheet(WorkbookStats),
    Pdf(PdfStats),
    Word(WordStats),
}

/// Per-column counts shared by CSV and spreadsheet statistics.
///
/// Type-tagged counts are only present when the column has non-null values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    pub non_null_count: usize,
    pub null_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_values: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvStats {
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<String>,
    pub column_statistics: IndexMap<String, ColumnStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetStats {
    pub sheet_name: String,
    pub has_data: bool,
    pub has_headers: bool,
    pub data_rows: usize,
    pub column_count: usize,
    pub total_cells: usize,
    pub cells_with_data: usize,
    pub empty_cells: usize,
    pub data_completeness: f64,
    pub column_statistics: IndexMap<String, ColumnStats>,
    pub merged_cells_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetInfo {
    pub name: String,
    pub index: usize,
    pub row_count: usize,
    pub column_count: usize,
    pub has_data: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookStats {
    pub total_sheets: usize,
    pub total_rows: usize,
    pub total_cells: usize,
    pub sheets_info: Vec<SheetInfo>,
    pub has_formulas: bool,
    pub has_merged_cells: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFrequency {
    pub word: String,
    pub frequency: usize,
}

/// Character, word, sentence and paragraph statistics over extracted text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStatistics {
    pub has_text: bool,
    pub character_count: usize,
    pub character_count_no_spaces: usize,
    pub word_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_word_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_word_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_words: Vec<WordFrequency>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub word_length_distribution: BTreeMap<usize, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<DetectedLanguage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfStats {
    pub text_extracted: bool,
    pub total_pages: usize,
    pub average_words_per_page: f64,
    pub average_characters_per_page: f64,
    #[serde(flatten)]
    pub text: TextStatistics,
}

/// Element counts of a word-processing document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStructureStats {
    pub paragraphs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattingStats {
    pub total_runs: usize,
    pub bold_runs: usize,
    pub italic_runs: usize,
    pub font_families_used: Vec<String>,
    pub font_sizes_used: Vec<f64>,
}

/// Table summary. Only `total_tables` is set when the document has none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStatistics {
    pub total_tables: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_columns: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rows_per_table: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordStats {
    pub structure: DocumentStructureStats,
    #[serde(flatten)]
    pub text: TextStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatting: Option<FormattingStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_statistics: Option<TableStatistics>,
}

// ============================================================================
// Output
// ============================================================================

/// Descriptive metadata gathered while processing a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<DocumentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom_properties: IndexMap<String, serde_json::Value>,

    // Spreadsheet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_count: Option<usize>,

    // CSV
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_headers: Option<bool>,

    // PDF
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_encrypted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_version: Option<String>,
}

impl DocumentMetadata {
    /// Metadata skeleton with the fields every strategy fills.
    pub fn for_document(document: &Document, document_type: DocumentType) -> Self {
        Self {
            file_name: document.name.clone(),
            file_type: Some(document_type),
            file_size_bytes: Some(document.size()),
            ..Default::default()
        }
    }

    pub fn insert_property(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.custom_properties.insert(key.to_string(), value.into());
    }
}

/// Outcome of processing one document.
///
/// `success` is false exactly when `errors` is non-empty. Use
/// [`add_error`](Self::add_error) to record a failure; warnings never change
/// the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub document_name: String,
    pub processing_strategy: String,
    success: bool,
    pub message: String,
    errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    pub processed_at: DateTime<Utc>,
    pub processing_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<ExtractedData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_stats: Option<ProcessingStats>,
}

impl ProcessingResult {
    /// A successful result with no payload yet.
    pub fn success(document_name: impl Into<String>, strategy: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            document_name: document_name.into(),
            processing_strategy: strategy.into(),
            success: true,
            message: message.into(),
            errors: Vec::new(),
            warnings: Vec::new(),
            error_code: None,
            processed_at: Utc::now(),
            processing_time_ms: None,
            metadata: None,
            extracted_text: None,
            extracted_data: None,
            processing_stats: None,
        }
    }

    /// A non-fatal failure carrying one error.
    pub fn failure(
        document_name: impl Into<String>,
        strategy: impl Into<String>,
        message: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let mut result = Self::success(document_name, strategy, message);
        result.add_error(error);
        result
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Record an error. Always marks the result as failed.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.success = false;
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.extracted_text = Some(text.into());
        self
    }

    pub fn with_data(mut self, data: ExtractedData) -> Self {
        self.extracted_data = Some(data);
        self
    }

    pub fn with_stats(mut self, stats: ProcessingStats) -> Self {
        self.processing_stats = Some(stats);
        self
    }

    /// Stamp the elapsed time since `start`.
    pub fn finished(mut self, start: Instant) -> Self {
        self.processing_time_ms = Some(elapsed_ms(start));
        self
    }
}

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_size_backfill() {
        let mut doc = Document::new("a.csv", b"a,b\n1,2".to_vec());
        assert_eq!(doc.size(), 7);
        doc.size = Some(100);
        assert_eq!(doc.size(), 100);
    }

    #[test]
    fn test_document_extension_and_type() {
        let doc = Document::new("Quarterly.Report.XLSX", vec![1]);
        assert_eq!(doc.file_extension(), "xlsx");
        assert_eq!(doc.determine_type(), Some(DocumentType::Excel));

        let no_ext = Document::new("README", vec![1]);
        assert_eq!(no_ext.file_extension(), "");
        assert_eq!(no_ext.determine_type(), None);
    }

    #[test]
    fn test_add_error_flips_success() {
        let mut result = ProcessingResult::success("a.csv", "CSV_PROCESSING_STRATEGY", "ok");
        assert!(result.is_success());
        assert!(result.errors().is_empty());

        result.add_warning("just a warning");
        assert!(result.is_success());

        result.add_error("broken");
        assert!(!result.is_success());
        assert_eq!(result.errors(), ["broken"]);
        assert_eq!(result.warnings, vec!["just a warning"]);
    }

    #[test]
    fn test_failure_has_error() {
        let result = ProcessingResult::failure("a.csv", "S", "CSV file is empty", "no data");
        assert!(!result.is_success());
        assert_eq!(result.errors().len(), 1);
    }

    #[test]
    fn test_cell_value_serialization() {
        let mut record = Record::new();
        record.insert("a".to_string(), CellValue::Integer(1));
        record.insert("b".to_string(), CellValue::Decimal(2.5));
        record.insert("c".to_string(), CellValue::Boolean(true));
        record.insert("d".to_string(), CellValue::Null);
        record.insert("e".to_string(), CellValue::Text("x".to_string()));

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"a":1,"b":2.5,"c":true,"d":null,"e":"x"}"#);
    }

    #[test]
    fn test_distinct_key_separates_types() {
        let int = CellValue::Integer(1);
        let dec = CellValue::Decimal(1.0);
        let text = CellValue::Text("1".to_string());
        assert_ne!(int.distinct_key(), dec.distinct_key());
        assert_ne!(int.distinct_key(), text.distinct_key());
        assert_eq!(int.distinct_key(), CellValue::Integer(1).distinct_key());
    }

    #[test]
    fn test_extracted_data_records_flatten_sheets() {
        let mut row = Record::new();
        row.insert("x".to_string(), CellValue::Integer(1));
        let sheet = SheetData {
            sheet_name: "S1".to_string(),
            sheet_index: 0,
            has_data: true,
            has_headers: false,
            headers: vec!["x".to_string()],
            data: vec![row.clone(), row],
            statistics: SheetStats::default(),
        };
        let data = ExtractedData::Sheets(vec![sheet.clone(), sheet]);
        assert_eq!(data.len(), 2);
        assert_eq!(data.records().len(), 4);
        assert!(ExtractedData::Document(vec![WordContent::default()]).records().is_empty());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ProcessingResult::success("a.csv", "S", "ok").with_text("hi");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["documentName"], "a.csv");
        assert_eq!(value["processingStrategy"], "S");
        assert_eq!(value["success"], true);
        assert_eq!(value["extractedText"], "hi");
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_table_statistics_zero_tables_shape() {
        let stats = TableStatistics {
            total_tables: 0,
            ..Default::default()
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value, serde_json::json!({"totalTables": 0}));
    }
}
