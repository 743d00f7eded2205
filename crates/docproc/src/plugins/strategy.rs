//! Processing strategy plugin trait.
//!
//! A strategy handles exactly one [`DocumentType`]. The registry picks one
//! strategy per type by priority, and callers may also address a strategy
//! by name.

use crate::core::config::ProcessorConfig;
use crate::core::document_type::DocumentType;
use crate::plugins::Plugin;
use crate::types::{Document, ProcessingResult};
use crate::{DocprocError, Result};
use serde::{Deserialize, Serialize};

/// Default strategy priority. Lower numbers win.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Trait for document processing strategies.
///
/// # Outcomes
///
/// `process` returns `Ok` with `success == false` for expected content
/// problems: an empty CSV, a corrupt workbook, a password-protected PDF.
/// `Err` is reserved for failures nobody planned for. The orchestrator
/// wraps those once, together with panics, as `DocprocError::Processing`.
///
/// # Priority
///
/// When several strategies claim the same type, the one with the smallest
/// [`priority`](Self::priority) wins. The default is 100.
///
/// # Example
///
/// ```rust
/// use docproc::core::config::ProcessorConfig;
/// use docproc::core::document_type::DocumentType;
/// use docproc::plugins::{Plugin, ProcessingStrategy};
/// use docproc::types::{Document, ProcessingResult};
/// use docproc::Result;
///
/// struct UpperCsv;
///
/// impl Plugin for UpperCsv {
///     fn name(&self) -> &str { "UPPER_CSV_STRATEGY" }
///     fn version(&self) -> String { "1.0.0".to_string() }
///     fn initialize(&self) -> Result<()> { Ok(()) }
///     fn shutdown(&self) -> Result<()> { Ok(()) }
/// }
///
/// impl ProcessingStrategy for UpperCsv {
///     fn supported_type(&self) -> DocumentType {
///         DocumentType::Csv
///     }
///
///     fn process(&self, document: &Document, _config: &ProcessorConfig) -> Result<ProcessingResult> {
///         let text = String::from_utf8_lossy(&document.content).to_uppercase();
///         Ok(ProcessingResult::success(&document.name, self.name(), "done").with_text(text))
///     }
/// }
/// ```
pub trait ProcessingStrategy: Plugin {
    /// The single document type this strategy handles.
    fn supported_type(&self) -> DocumentType;

    /// Process a validated document.
    fn process(&self, document: &Document, config: &ProcessorConfig) -> Result<ProcessingResult>;

    /// Selection priority. Lower numbers win.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Whether this strategy accepts the document. See [`accepts_document`].
    fn can_process(&self, document: &Document) -> bool {
        accepts_document(self.supported_type(), document)
    }
}

/// Shared applicability check.
///
/// False for empty content. Otherwise the document's extension is classified
/// and compared to `supported_type`; a classification failure means "no",
/// never an error.
pub fn accepts_document(supported_type: DocumentType, document: &Document) -> bool {
    if document.content.is_empty() {
        return false;
    }
    DocumentType::from_extension(&document.file_extension())
        .map(|t| t == supported_type)
        .unwrap_or(false)
}

/// Caller-input validation run before any dispatch.
///
/// # Errors
///
/// `DocprocError::Validation` for a blank name or empty content.
pub fn validate_document(document: &Document) -> Result<()> {
    if document.name.trim().is_empty() {
        return Err(DocprocError::validation("Document name cannot be empty"));
    }
    if document.content.is_empty() {
        return Err(DocprocError::validation("Document content cannot be empty"));
    }
    Ok(())
}

/// Introspection record for one registered strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInfo {
    pub name: String,
    pub supported_type: DocumentType,
    pub supported_extensions: Vec<String>,
    pub priority: i32,
}

impl StrategyInfo {
    pub fn of(strategy: &dyn ProcessingStrategy) -> Self {
        let supported_type = strategy.supported_type();
        Self {
            name: strategy.name().to_string(),
            supported_type,
            supported_extensions: supported_type.extensions().iter().map(|e| e.to_string()).collect(),
            priority: strategy.priority(),
        }
    }
}
