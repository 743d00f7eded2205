//! Document processing orchestrator.
//!
//! [`DocumentProcessor`] validates a document, classifies it by extension,
//! dispatches it to the registered strategy and normalizes the outcome:
//!
//! 1. Validation errors are returned as-is, before any dispatch.
//! 2. An unknown extension is `UnsupportedDocumentType`.
//! 3. Expected content problems come back as a result with `success == false`.
//! 4. Anything else a strategy returns as `Err`, or a panic, is wrapped once
//!    as `DocprocError::Processing` with the document and strategy names.
//!
//! # Example
//!
//! ```rust
//! use docproc::core::config::ProcessorConfig;
//! use docproc::core::processor::DocumentProcessor;
//! use docproc::types::Document;
//!
//! # fn example() -> docproc::Result<()> {
//! let processor = DocumentProcessor::new(ProcessorConfig::default())?;
//! let result = processor.process(Document::new("scores.csv", b"name,score\nAda,10\n".to_vec()))?;
//! assert!(result.is_success());
//! assert_eq!(result.processing_strategy, "CSV_PROCESSING_STRATEGY");
//! # Ok(())
//! # }
//! ```

use crate::core::config::ProcessorConfig;
use crate::core::document_type::{DocumentType, unsupported};
use crate::error::ErrorCode;
use crate::plugins::{ProcessingStrategy, StrategyInfo, StrategyRegistry, validate_document};
use crate::strategies::default_strategies;
use crate::types::{Document, ProcessingResult, elapsed_ms};
use crate::{DocprocError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

#[cfg(feature = "tokio-runtime")]
use std::{sync::Arc, time::Duration};

/// Registry overview returned by [`DocumentProcessor::strategies_info`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategiesInfo {
    pub total_strategies: usize,
    pub supported_document_types: Vec<DocumentType>,
    pub strategies: Vec<StrategyInfo>,
}

/// Configuration summary returned by [`DocumentProcessor::processing_statistics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStatistics {
    pub configured_strategies: usize,
    pub supported_types: Vec<DocumentType>,
    /// Strategy name to priority, in ascending priority order.
    pub strategy_priorities: IndexMap<String, i32>,
}

/// Entry point for processing documents.
///
/// Holds an immutable registry and configuration, so one instance can be
/// shared (behind an `Arc`) by any number of concurrent callers.
#[derive(Debug)]
pub struct DocumentProcessor {
    registry: StrategyRegistry,
    config: ProcessorConfig,
}

impl DocumentProcessor {
    /// Processor over the built-in strategies.
    ///
    /// # Errors
    ///
    /// Whatever [`StrategyRegistry::new`] returns for the default list.
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        let registry = StrategyRegistry::new(default_strategies())?;
        Ok(Self::with_registry(registry, config))
    }

    pub fn with_registry(registry: StrategyRegistry, config: ProcessorConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Process a document with the strategy registered for its type.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank name or empty content
    /// - `UnsupportedDocumentType` when the extension maps to no type
    /// - `StrategyNotFound` when the type has no strategy
    /// - `Processing` for unexpected strategy failures and panics
    /// - `Io` unchanged
    #[tracing::instrument(
        skip(self, document),
        fields(document.name = %document.name, document.size_bytes = document.size())
    )]
    pub fn process(&self, document: Document) -> Result<ProcessingResult> {
        let document = prepare(document)?;

        let extension = document.file_extension();
        let document_type =
            DocumentType::from_extension(&extension).map_err(|_| unsupported(&extension, Some(&document.name)))?;
        let strategy = self.registry.resolve_by_type(document_type)?;

        self.run(strategy.as_ref(), &document)
    }

    /// Process a document with a strategy chosen by name.
    ///
    /// The strategy must still accept the document's type.
    ///
    /// # Errors
    ///
    /// As [`process`](Self::process), with `StrategyNotFound` for an unknown
    /// name and `Processing` when the strategy rejects the document.
    #[tracing::instrument(
        skip(self, document),
        fields(document.name = %document.name, document.size_bytes = document.size())
    )]
    pub fn process_with_strategy(&self, document: Document, strategy_name: &str) -> Result<ProcessingResult> {
        let document = prepare(document)?;
        let strategy = self.registry.resolve_by_name(strategy_name)?;
        self.run(strategy.as_ref(), &document)
    }

    fn run(&self, strategy: &dyn ProcessingStrategy, document: &Document) -> Result<ProcessingResult> {
        let strategy_name = strategy.name();

        if !strategy.can_process(document) {
            return Err(DocprocError::processing(
                format!(
                    "Strategy cannot process documents with extension '{}'",
                    document.file_extension()
                ),
                Some(&document.name),
                Some(strategy_name),
            ));
        }

        tracing::info!(strategy = strategy_name, "Processing document");
        let start = Instant::now();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.process(document, &self.config)));
        let mut result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e @ (DocprocError::Io(_) | DocprocError::Validation { .. }))) => return Err(e),
            Ok(Err(e)) => {
                tracing::error!(strategy = strategy_name, "Unexpected processing failure: {}", e);
                return Err(DocprocError::processing_with_source(
                    format!("Unexpected error during processing: {}", e),
                    Some(&document.name),
                    Some(strategy_name),
                    e,
                ));
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(strategy = strategy_name, "Strategy panicked: {}", message);
                return Err(DocprocError::processing(
                    format!("Strategy panicked: {}", message),
                    Some(&document.name),
                    Some(strategy_name),
                ));
            }
        };

        if result.processing_time_ms.is_none() {
            result.processing_time_ms = Some(elapsed_ms(start));
        }
        if result.document_name.is_empty() {
            result.document_name = document.name.clone();
        }
        if result.processing_strategy.is_empty() {
            result.processing_strategy = strategy_name.to_string();
        }

        if result.is_success() {
            tracing::info!(
                strategy = strategy_name,
                elapsed_ms = result.processing_time_ms,
                "Document processed"
            );
        } else {
            if result.error_code.is_none() {
                result.error_code = Some(ErrorCode::ProcessingError);
            }
            tracing::warn!(
                strategy = strategy_name,
                errors = ?result.errors(),
                "Document processed with errors"
            );
        }

        Ok(result)
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Registered strategies sorted ascending by priority.
    pub fn list_strategies(&self) -> Vec<StrategyInfo> {
        self.registry.list_all()
    }

    /// Extensions of every type that has a strategy.
    pub fn supported_extensions(&self) -> BTreeSet<String> {
        self.registry
            .supported_types()
            .iter()
            .flat_map(|t| t.extensions().iter().map(|e| e.to_string()))
            .collect()
    }

    /// Case-insensitive and dot-tolerant. Blank input is unsupported.
    pub fn is_extension_supported(&self, extension: &str) -> bool {
        DocumentType::from_extension(extension)
            .map(|t| self.registry.is_type_supported(t))
            .unwrap_or(false)
    }

    pub fn is_document_type_supported(&self, document_type: DocumentType) -> bool {
        self.registry.is_type_supported(document_type)
    }

    pub fn strategies_info(&self) -> StrategiesInfo {
        let strategies = self.list_strategies();
        StrategiesInfo {
            total_strategies: strategies.len(),
            supported_document_types: self.registry.supported_types(),
            strategies,
        }
    }

    pub fn processing_statistics(&self) -> ProcessingStatistics {
        let strategies = self.list_strategies();
        ProcessingStatistics {
            configured_strategies: strategies.len(),
            supported_types: self.registry.supported_types(),
            strategy_priorities: strategies.into_iter().map(|s| (s.name, s.priority)).collect(),
        }
    }
}

/// Validate and backfill the declared size.
fn prepare(mut document: Document) -> Result<Document> {
    validate_document(&document)?;
    if document.size.is_none() {
        document.size = Some(document.content.len() as u64);
    }
    Ok(document)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(feature = "tokio-runtime")]
impl DocumentProcessor {
    /// Run [`process`](Self::process) on the blocking thread pool.
    pub async fn process_async(self: Arc<Self>, document: Document) -> Result<ProcessingResult> {
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || {
            let _guard = span.entered();
            self.process(document)
        })
        .await
        .map_err(|e| DocprocError::Other(format!("Processing task failed: {}", e)))?
    }

    /// [`process_async`](Self::process_async) with a deadline.
    ///
    /// On elapse the caller gets a `Processing` error; the blocking task is
    /// left to finish in the background.
    pub async fn process_with_timeout(self: Arc<Self>, document: Document, limit: Duration) -> Result<ProcessingResult> {
        let name = document.name.clone();
        match tokio::time::timeout(limit, self.process_async(document)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(document = %name, ?limit, "Processing timed out");
                Err(DocprocError::processing(
                    "processing time limit exceeded",
                    Some(&name),
                    None,
                ))
            }
        }
    }

    /// [`process_with_timeout`](Self::process_with_timeout) using the
    /// configured `max_processing_time_ms`.
    pub async fn process_with_configured_timeout(self: Arc<Self>, document: Document) -> Result<ProcessingResult> {
        let limit = Duration::from_millis(self.config.limits.max_processing_time_ms);
        self.process_with_timeout(document, limit).await
    }

    /// Process documents concurrently, bounded by `batch.max_concurrent`.
    ///
    /// Results come back in input order. A document that fails with an error
    /// becomes a failed result carrying the error text and code; only `Io`
    /// errors abort the whole batch.
    pub async fn batch_process(self: Arc<Self>, documents: Vec<Document>) -> Result<Vec<ProcessingResult>> {
        use tokio::sync::Semaphore;
        use tokio::task::JoinSet;

        if documents.is_empty() {
            return Ok(vec![]);
        }

        let semaphore = Arc::new(Semaphore::new(self.config.batch.concurrency()));
        let names: Vec<String> = documents.iter().map(|d| d.name.clone()).collect();
        let mut tasks = JoinSet::new();

        for (index, document) in documents.into_iter().enumerate() {
            let processor = Arc::clone(&self);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let result = match semaphore.acquire().await {
                    Ok(_permit) => processor.process_async(document).await,
                    Err(e) => Err(DocprocError::Other(format!("Batch semaphore closed: {}", e))),
                };
                (index, result)
            });
        }

        let mut results: Vec<Option<ProcessingResult>> = vec![None; names.len()];

        while let Some(task_result) = tasks.join_next().await {
            match task_result {
                Ok((index, Ok(result))) => {
                    results[index] = Some(result);
                }
                Ok((index, Err(e))) => {
                    if matches!(e, DocprocError::Io(_)) {
                        return Err(e);
                    }
                    results[index] = Some(error_result(&names[index], &e));
                }
                Err(join_err) => {
                    return Err(DocprocError::Other(format!("Task panicked: {}", join_err)));
                }
            }
        }

        results
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| DocprocError::Other("Batch finished with missing results".to_string()))
    }
}

/// A failed result standing in for a thrown error inside a batch.
#[cfg(feature = "tokio-runtime")]
fn error_result(document_name: &str, error: &DocprocError) -> ProcessingResult {
    let strategy = match error {
        DocprocError::Processing {
            strategy: Some(strategy),
            ..
        } => strategy.as_str(),
        _ => "NONE",
    };
    let mut result = ProcessingResult::failure(document_name, strategy, "Document processing failed", error.to_string());
    result.error_code = Some(error.code());
    result
}
