//! PDF strategy: page text, Info dictionary metadata and text statistics.

use super::{text_statistics, warn_on_text_length};
use crate::Result;
use crate::core::config::ProcessorConfig;
use crate::core::document_type::DocumentType;
use crate::pdf::{LoadedPdf, PdfError, extract_metadata, extract_page_texts, join_pages, load_pdf};
use crate::plugins::{Plugin, ProcessingStrategy};
use crate::types::{Document, DocumentMetadata, PdfStats, ProcessingResult, ProcessingStats};
use std::time::Instant;

const NAME: &str = "PDF_PROCESSING_STRATEGY";
const PRIORITY: i32 = 20;

pub struct PdfStrategy;

impl Default for PdfStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfStrategy {
    pub fn new() -> Self {
        Self
    }

    fn read(&self, document: &Document, config: &ProcessorConfig) -> ProcessingResult {
        let loaded = match load_pdf(&document.content) {
            Ok(loaded) => loaded,
            Err(PdfError::PasswordRequired) => {
                tracing::info!(document = %document.name, "PDF requires a password");
                let mut metadata = DocumentMetadata::for_document(document, DocumentType::Pdf);
                metadata.is_encrypted = Some(true);
                return ProcessingResult::failure(
                    &document.name,
                    NAME,
                    "The PDF requires a password to be processed",
                    "Document protected with password",
                )
                .with_metadata(metadata);
            }
            Err(e) => {
                tracing::warn!(document = %document.name, "PDF could not be read: {}", e);
                return ProcessingResult::failure(
                    &document.name,
                    NAME,
                    "Could not read the PDF document",
                    format!("I/O error reading PDF: {}", e),
                );
            }
        };

        self.loaded_result(document, loaded, config)
    }

    fn loaded_result(&self, document: &Document, loaded: LoadedPdf, config: &ProcessorConfig) -> ProcessingResult {
        let info = extract_metadata(&loaded.document);
        let pages = extract_page_texts(&loaded.document);
        let text = join_pages(&pages);
        let total_pages = info.page_count;

        let text_stats = text_statistics(&text, config);
        let per_page = |count: usize| {
            if total_pages == 0 {
                0.0
            } else {
                count as f64 / total_pages as f64
            }
        };
        let stats = PdfStats {
            text_extracted: !text.trim().is_empty(),
            total_pages,
            average_words_per_page: per_page(text_stats.word_count),
            average_characters_per_page: per_page(text_stats.character_count),
            text: text_stats,
        };

        let mut metadata = DocumentMetadata::for_document(document, DocumentType::Pdf);
        metadata.page_count = Some(total_pages);
        metadata.word_count = Some(stats.text.word_count);
        metadata.title = info.title;
        metadata.author = info.author;
        metadata.creation_date = info.creation_date;
        metadata.last_modified = info.modification_date;
        metadata.is_encrypted = Some(loaded.was_encrypted);
        metadata.pdf_version = Some(info.pdf_version);
        for (key, value) in [
            ("subject", info.subject),
            ("keywords", info.keywords),
            ("creator", info.creator),
            ("producer", info.producer),
        ] {
            if let Some(value) = value {
                metadata.insert_property(key, value);
            }
        }

        let mut result = ProcessingResult::success(
            &document.name,
            NAME,
            format!("PDF processed successfully with {} pages", total_pages),
        )
        .with_metadata(metadata)
        .with_stats(ProcessingStats::Pdf(stats));

        warn_on_text_length(&mut result, &text, config);
        result.with_text(text)
    }
}

impl Plugin for PdfStrategy {
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

impl ProcessingStrategy for PdfStrategy {
    fn supported_type(&self) -> DocumentType {
        DocumentType::Pdf
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn process(&self, document: &Document, config: &ProcessorConfig) -> Result<ProcessingResult> {
        let start = Instant::now();
        tracing::debug!(document = %document.name, size = document.size(), "Processing PDF document");

        Ok(self.read(document, config).finished(start))
    }
}
