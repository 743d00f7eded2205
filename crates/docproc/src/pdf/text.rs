use super::error::{PdfError, Result};
use lopdf::Document;

/// Inserted between consecutive pages of extracted text.
pub const PAGE_BREAK: &str = "\n\n--- PAGE BREAK ---\n\n";

/// Text of every page in page order, trailing whitespace removed.
///
/// A page whose content cannot be decoded contributes an empty string and a
/// warning; the other pages are still returned.
pub fn extract_page_texts(document: &Document) -> Vec<String> {
    document
        .get_pages()
        .keys()
        .map(|&page_number| {
            extract_page_text(document, page_number).unwrap_or_else(|e| {
                tracing::warn!(page = page_number, "{}", e);
                String::new()
            })
        })
        .collect()
}

/// Text of one page (1-based), trailing whitespace removed.
///
/// # Errors
///
/// `PdfError::TextExtractionFailed` when the page is missing or its content
/// stream cannot be decoded.
pub fn extract_page_text(document: &Document, page_number: u32) -> Result<String> {
    document
        .extract_text(&[page_number])
        .map(|text| text.trim_end().to_string())
        .map_err(|e| PdfError::TextExtractionFailed(format!("page {}: {}", page_number, e)))
}

pub fn join_pages(pages: &[String]) -> String {
    pages.join(PAGE_BREAK)
}
