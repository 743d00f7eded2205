//! CSV strategy: delimiter and header sniffing, typed rows, column statistics.

use crate::Result;
use crate::core::config::ProcessorConfig;
use crate::core::document_type::DocumentType;
use crate::extraction::columns::{ColumnProfile, summarize_columns};
use crate::extraction::csv::{CsvTable, parse_csv};
use crate::plugins::{Plugin, ProcessingStrategy};
use crate::types::{CsvStats, Document, DocumentMetadata, ExtractedData, ProcessingResult, ProcessingStats};
use std::time::Instant;

const NAME: &str = "CSV_PROCESSING_STRATEGY";
const PRIORITY: i32 = 10;

pub struct CsvStrategy;

impl Default for CsvStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvStrategy {
    pub fn new() -> Self {
        Self
    }

    fn table_result(&self, document: &Document, table: CsvTable, config: &ProcessorConfig) -> ProcessingResult {
        let row_count = table.rows.len();
        let column_count = table.columns.len();

        let mut metadata = DocumentMetadata::for_document(document, DocumentType::Csv);
        metadata.row_count = Some(row_count);
        metadata.column_count = Some(column_count);
        metadata.delimiter = Some(table.delimiter.to_string());
        metadata.has_headers = Some(table.has_headers);
        metadata.encoding = Some(config.csv.encoding.clone());

        let stats = CsvStats {
            total_rows: row_count,
            total_columns: column_count,
            column_statistics: summarize_columns(&table.columns, &table.rows, ColumnProfile::Csv),
            columns: table.columns,
        };

        let mut result = ProcessingResult::success(
            &document.name,
            NAME,
            format!(
                "CSV processed successfully with {} rows and {} columns",
                row_count, column_count
            ),
        )
        .with_metadata(metadata)
        .with_data(ExtractedData::Records(table.rows))
        .with_stats(ProcessingStats::Csv(stats));

        let limit = config.limits.max_table_rows;
        if row_count > limit {
            tracing::warn!(document = %document.name, rows = row_count, limit, "CSV row count exceeds limit");
            result.add_warning(format!(
                "CSV has {} rows, exceeding the configured limit of {}",
                row_count, limit
            ));
        }

        result
    }
}

impl Plugin for CsvStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

impl ProcessingStrategy for CsvStrategy {
    fn supported_type(&self) -> DocumentType {
        DocumentType::Csv
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn process(&self, document: &Document, config: &ProcessorConfig) -> Result<ProcessingResult> {
        let start = Instant::now();
        tracing::debug!(document = %document.name, size = document.size(), "Processing CSV document");

        let result = match parse_csv(&document.content, &config.csv) {
            Ok(table) if table.is_empty() => ProcessingResult::failure(
                &document.name,
                NAME,
                "CSV file is empty",
                "No data found in the CSV file (file is empty)",
            ),
            Ok(table) => self.table_result(document, table, config),
            Err(e) => {
                tracing::warn!(document = %document.name, "CSV parsing failed: {}", e);
                ProcessingResult::failure(
                    &document.name,
                    NAME,
                    "Could not process the CSV document",
                    format!("processing error: {}", e),
                )
            }
        };

        Ok(result.finished(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn process(name: &str, content: &[u8]) -> ProcessingResult {
        CsvStrategy::new()
            .process(&Document::new(name, content.to_vec()), &ProcessorConfig::default())
            .unwrap()
    }

    #[test]
    fn test_csv_with_headers() {
        let result = process("people.csv", b"name;age;active\nAda;36;true\nGrace;45;false\n");

        assert!(result.is_success());
        assert_eq!(result.processing_strategy, NAME);
        assert_eq!(result.message, "CSV processed successfully with 2 rows and 3 columns");
        assert!(result.processing_time_ms.is_some());

        let metadata = result.metadata.as_ref().unwrap();
        assert_eq!(metadata.delimiter.as_deref(), Some(";"));
        assert_eq!(metadata.has_headers, Some(true));
        assert_eq!(metadata.row_count, Some(2));
        assert_eq!(metadata.column_count, Some(3));
        assert_eq!(metadata.encoding.as_deref(), Some("UTF-8"));

        let rows = result.extracted_data.as_ref().unwrap().records();
        assert_eq!(rows[1]["age"], CellValue::Integer(45));
        assert_eq!(rows[0]["active"], CellValue::Boolean(true));

        let Some(ProcessingStats::Csv(stats)) = &result.processing_stats else {
            panic!("expected CSV stats");
        };
        assert_eq!(stats.columns, vec!["name", "age", "active"]);
        assert_eq!(stats.column_statistics["age"].number_count, Some(2));
        assert_eq!(stats.column_statistics["name"].string_count, Some(2));
    }

    #[test]
    fn test_empty_csv_is_a_failed_result() {
        let result = process("empty.csv", b"\n\n");
        assert!(!result.is_success());
        assert_eq!(result.message, "CSV file is empty");
        assert_eq!(result.errors(), ["No data found in the CSV file (file is empty)"]);
        assert!(result.extracted_data.is_none());
    }

    #[test]
    fn test_row_limit_warning() {
        let mut config = ProcessorConfig::default();
        config.limits.max_table_rows = 1;
        let result = CsvStrategy::new()
            .process(&Document::new("a.csv", b"x,y\n1,2\n3,4\n".to_vec()), &config)
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.extracted_data.unwrap().len(), 2);
    }

    #[test]
    fn test_non_ascii_candidates_fall_back_to_comma() {
        let mut config = ProcessorConfig::default();
        config.csv.delimiter_candidates = vec!['§'];
        let result = CsvStrategy::new()
            .process(&Document::new("a.csv", b"a,b\n1,2\n".to_vec()), &config)
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.metadata.unwrap().delimiter.as_deref(), Some(","));
    }
}
