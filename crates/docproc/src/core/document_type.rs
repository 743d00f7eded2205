//! Document type registry.
//!
//! A static table mapping the supported type tags to their file extensions
//! and MIME types. Extension sets are pairwise disjoint, so every extension
//! resolves to at most one type. Lookups are case-insensitive and tolerate a
//! leading dot.

use crate::{DocprocError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const EXCEL_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const WORD_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const CSV_MIME_TYPE: &str = "text/csv";

/// The document families the engine knows how to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    Pdf,
    Excel,
    Word,
    Csv,
}

impl DocumentType {
    /// Every type, in declaration order.
    pub fn all() -> &'static [DocumentType] {
        &[DocumentType::Pdf, DocumentType::Excel, DocumentType::Word, DocumentType::Csv]
    }

    /// The upper-case tag used in results and introspection output.
    pub fn type_name(&self) -> &'static str {
        match self {
            DocumentType::Pdf => "PDF",
            DocumentType::Excel => "EXCEL",
            DocumentType::Word => "WORD",
            DocumentType::Csv => "CSV",
        }
    }

    /// Lower-case extensions, without the leading dot.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            DocumentType::Pdf => &["pdf"],
            DocumentType::Excel => &["xlsx", "xls"],
            DocumentType::Word => &["docx", "doc"],
            DocumentType::Csv => &["csv"],
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentType::Pdf => PDF_MIME_TYPE,
            DocumentType::Excel => EXCEL_MIME_TYPE,
            DocumentType::Word => WORD_MIME_TYPE,
            DocumentType::Csv => CSV_MIME_TYPE,
        }
    }

    /// Resolve an extension such as `"PDF"`, `".xlsx"` or `" csv "`.
    ///
    /// # Errors
    ///
    /// Returns `DocprocError::UnsupportedDocumentType` when the input is blank
    /// or no type claims the extension.
    pub fn from_extension(extension: &str) -> Result<Self> {
        let normalized = normalize_extension(extension);
        if normalized.is_empty() {
            return Err(unsupported(&normalized, None));
        }

        Self::all()
            .iter()
            .copied()
            .find(|t| t.extensions().contains(&normalized.as_str()))
            .ok_or_else(|| unsupported(&normalized, None))
    }

    /// Resolve a type tag such as `"excel"` or `"PDF"`.
    pub fn from_type_name(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.type_name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DocprocError::UnknownDocumentType(name.to_string()))
    }

    /// Classify a file name by the text after its last dot.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = extension_of(filename);
        Self::from_extension(&extension).map_err(|_| unsupported(&extension, Some(filename)))
    }

    /// Membership test using the same normalization as [`from_extension`](Self::from_extension).
    pub fn supports_extension(&self, extension: &str) -> bool {
        let normalized = normalize_extension(extension);
        self.extensions().contains(&normalized.as_str())
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// All supported extensions across every type, sorted.
pub fn all_supported_extensions() -> Vec<String> {
    let mut extensions: Vec<String> = DocumentType::all()
        .iter()
        .flat_map(|t| t.extensions().iter().map(|e| e.to_string()))
        .collect();
    extensions.sort();
    extensions.dedup();
    extensions
}

/// Lower-cased substring after the last `.`, or an empty string.
pub fn extension_of(filename: &str) -> String {
    filename
        .rfind('.')
        .map(|idx| filename[idx + 1..].to_lowercase())
        .unwrap_or_default()
}

fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim();
    trimmed.strip_prefix('.').unwrap_or(trimmed).to_lowercase()
}

pub(crate) fn unsupported(extension: &str, document_name: Option<&str>) -> DocprocError {
    DocprocError::UnsupportedDocumentType {
        extension: extension.to_string(),
        document_name: document_name.map(str::to_string),
        supported: all_supported_extensions(),
    }
}
