//! Spreadsheet strategy for XLSX and legacy XLS workbooks.

use crate::Result;
use crate::core::config::ProcessorConfig;
use crate::core::document_type::DocumentType;
use crate::extraction::excel::{Workbook, read_workbook};
use crate::plugins::{Plugin, ProcessingStrategy};
use crate::types::{Document, DocumentMetadata, ExtractedData, ProcessingResult, ProcessingStats};
use std::time::Instant;

const NAME: &str = "EXCEL_PROCESSING_STRATEGY";
const PRIORITY: i32 = 15;

pub struct ExcelStrategy;

impl Default for ExcelStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExcelStrategy {
    pub fn new() -> Self {
        Self
    }

    fn workbook_result(
        &self,
        document: &Document,
        workbook: Workbook,
        config: &ProcessorConfig,
    ) -> Result<ProcessingResult> {
        let stats = workbook.statistics();
        let sheet_count = workbook.sheet_count();
        let total_rows = workbook.total_rows();

        let mut metadata = DocumentMetadata::for_document(document, DocumentType::Excel);
        metadata.sheet_count = Some(sheet_count);
        metadata.row_count = Some(total_rows);
        metadata.column_count = Some(workbook.max_columns());
        metadata.insert_property("sheetsInfo", serde_json::to_value(&stats.sheets_info)?);
        metadata.insert_property("hasFormulas", workbook.has_formulas);
        metadata.insert_property("hasMergedCells", workbook.has_merged_cells);

        let mut result = ProcessingResult::success(
            &document.name,
            NAME,
            format!(
                "Excel file processed successfully with {} sheets and {} total rows",
                sheet_count, total_rows
            ),
        )
        .with_metadata(metadata)
        .with_data(ExtractedData::Sheets(workbook.sheets))
        .with_stats(ProcessingStats::Spreadsheet(stats));

        let limits = &config.limits;
        if sheet_count > limits.max_excel_sheets {
            tracing::warn!(document = %document.name, sheets = sheet_count, "Sheet count exceeds limit");
            result.add_warning(format!(
                "Workbook has {} sheets, exceeding the configured limit of {}",
                sheet_count, limits.max_excel_sheets
            ));
        }
        if total_rows > limits.max_table_rows {
            tracing::warn!(document = %document.name, rows = total_rows, "Row count exceeds limit");
            result.add_warning(format!(
                "Workbook has {} data rows, exceeding the configured limit of {}",
                total_rows, limits.max_table_rows
            ));
        }

        Ok(result)
    }
}

impl Plugin for ExcelStrategy {
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

impl ProcessingStrategy for ExcelStrategy {
    fn supported_type(&self) -> DocumentType {
        DocumentType::Excel
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn process(&self, document: &Document, config: &ProcessorConfig) -> Result<ProcessingResult> {
        let start = Instant::now();
        tracing::debug!(document = %document.name, size = document.size(), "Processing Excel document");

        let result = match read_workbook(&document.content) {
            Ok(workbook) => self.workbook_result(document, workbook, config)?,
            Err(e) => {
                tracing::warn!(document = %document.name, "Workbook could not be read: {}", e);
                ProcessingResult::failure(
                    &document.name,
                    NAME,
                    "Could not process the Excel document",
                    format!("processing error: {}", e),
                )
            }
        };

        Ok(result.finished(start))
    }
}
