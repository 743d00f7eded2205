//! Word-processing strategy. DOCX and legacy DOC are told apart by extension.

use super::{text_statistics, warn_on_text_length};
use crate::Result;
use crate::core::config::ProcessorConfig;
use crate::core::document_type::DocumentType;
use crate::extraction::doc::{DocContent, read_doc};
use crate::extraction::docx::{DocxContent, read_docx};
use crate::plugins::{Plugin, ProcessingStrategy};
use crate::types::{
    Document, DocumentMetadata, DocumentStructureStats, ExtractedData, ProcessingResult, ProcessingStats,
    TableData, TableStatistics, WordContent, WordStats,
};
use std::time::Instant;

const NAME: &str = "WORD_PROCESSING_STRATEGY";
const PRIORITY: i32 = 25;

pub struct WordStrategy;

impl Default for WordStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl WordStrategy {
    pub fn new() -> Self {
        Self
    }

    fn process_docx(&self, document: &Document, config: &ProcessorConfig) -> ProcessingResult {
        match read_docx(&document.content) {
            Ok(content) => docx_result(document, content, config),
            Err(e) => {
                tracing::warn!(document = %document.name, "DOCX could not be read: {}", e);
                ProcessingResult::failure(
                    &document.name,
                    NAME,
                    "Failed to process DOCX document",
                    format!("DOCX processing error: {}", e),
                )
            }
        }
    }

    fn process_doc(&self, document: &Document, config: &ProcessorConfig) -> ProcessingResult {
        match read_doc(&document.content) {
            Ok(content) => doc_result(document, content, config),
            Err(e) => {
                tracing::warn!(document = %document.name, "DOC could not be read: {}", e);
                ProcessingResult::failure(
                    &document.name,
                    NAME,
                    "Failed to process DOC document",
                    format!("DOC processing error: {}", e),
                )
            }
        }
    }
}

fn docx_result(document: &Document, docx: DocxContent, config: &ProcessorConfig) -> ProcessingResult {
    let text_stats = text_statistics(&docx.text, config);
    let table_count = docx.content.tables.len();

    let mut metadata = DocumentMetadata::for_document(document, DocumentType::Word);
    metadata.word_count = Some(text_stats.word_count);
    metadata.page_count = docx.app.pages.and_then(|p| usize::try_from(p).ok());
    metadata.creation_date = docx.core.created_local();
    metadata.last_modified = docx.core.modified_local();
    metadata.custom_properties.extend(docx.app.to_properties());
    for (key, value) in [
        ("subject", &docx.core.subject),
        ("keywords", &docx.core.keywords),
        ("description", &docx.core.description),
        ("lastModifiedBy", &docx.core.last_modified_by),
        ("revision", &docx.core.revision),
    ] {
        if let Some(value) = value {
            metadata.insert_property(key, value.as_str());
        }
    }
    metadata.title = docx.core.title;
    metadata.author = docx.core.creator;

    let stats = WordStats {
        structure: DocumentStructureStats {
            paragraphs: docx.paragraph_count,
            tables: Some(table_count),
            headers: Some(docx.content.headers.len()),
            footers: Some(docx.content.footers.len()),
            sections: None,
        },
        text: text_stats,
        formatting: Some(docx.formatting),
        table_statistics: Some(table_statistics(&docx.content.tables)),
    };

    let mut result = ProcessingResult::success(
        &document.name,
        NAME,
        format!(
            "Successfully processed DOCX with {} paragraphs and {} tables",
            docx.paragraph_count, table_count
        ),
    )
    .with_metadata(metadata)
    .with_data(ExtractedData::Document(vec![docx.content]))
    .with_stats(ProcessingStats::Word(stats));

    warn_on_text_length(&mut result, &docx.text, config);
    result.with_text(docx.text)
}

fn doc_result(document: &Document, doc: DocContent, config: &ProcessorConfig) -> ProcessingResult {
    let text_stats = text_statistics(&doc.text, config);

    let mut metadata = DocumentMetadata::for_document(document, DocumentType::Word);
    metadata.word_count = Some(text_stats.word_count);
    if let Some(summary) = doc.summary {
        metadata.page_count = summary.page_count.and_then(|p| usize::try_from(p).ok());
        metadata.creation_date = summary.create_time;
        metadata.last_modified = summary.last_save_time;
        for (key, value) in [
            ("wordCount", summary.word_count),
            ("charCount", summary.char_count),
            ("pageCount", summary.page_count),
        ] {
            if let Some(value) = value {
                metadata.insert_property(key, value);
            }
        }
        for (key, value) in [
            ("subject", &summary.subject),
            ("keywords", &summary.keywords),
            ("lastModifiedBy", &summary.last_author),
            ("application", &summary.application_name),
        ] {
            if let Some(value) = value {
                metadata.insert_property(key, value.as_str());
            }
        }
        metadata.title = summary.title;
        metadata.author = summary.author;
    }

    let stats = WordStats {
        structure: DocumentStructureStats {
            paragraphs: doc.paragraph_count,
            sections: Some(doc.section_count),
            ..Default::default()
        },
        text: text_stats,
        formatting: None,
        table_statistics: None,
    };

    let content = WordContent {
        paragraphs: doc.paragraphs,
        ..Default::default()
    };

    let mut result = ProcessingResult::success(&document.name, NAME, "Successfully processed DOC document")
        .with_metadata(metadata)
        .with_data(ExtractedData::Document(vec![content]))
        .with_stats(ProcessingStats::Word(stats));

    warn_on_text_length(&mut result, &doc.text, config);
    result.with_text(doc.text)
}

/// Table summary. With no tables only `total_tables` is set.
pub fn table_statistics(tables: &[TableData]) -> TableStatistics {
    if tables.is_empty() {
        return TableStatistics::default();
    }

    let total_rows: usize = tables.iter().map(|t| t.row_count).sum();
    TableStatistics {
        total_tables: tables.len(),
        total_rows: Some(total_rows),
        max_columns: tables.iter().map(|t| t.column_count).max(),
        average_rows_per_table: Some(total_rows as f64 / tables.len() as f64),
    }
}

impl Plugin for WordStrategy {
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

impl ProcessingStrategy for WordStrategy {
    fn supported_type(&self) -> DocumentType {
        DocumentType::Word
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn process(&self, document: &Document, config: &ProcessorConfig) -> Result<ProcessingResult> {
        let start = Instant::now();
        let extension = document.file_extension();
        tracing::debug!(document = %document.name, extension = %extension, "Processing Word document");

        let result = match extension.as_str() {
            "docx" => self.process_docx(document, config),
            "doc" => self.process_doc(document, config),
            other => ProcessingResult::failure(
                &document.name,
                NAME,
                format!("Unsupported Word document format: {}", other),
                "Only .doc and .docx formats are supported",
            ),
        };

        Ok(result.finished(start))
    }
}
