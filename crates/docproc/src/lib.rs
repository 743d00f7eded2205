//! docproc - document processing engine
//!
//! Classifies uploaded documents by extension and runs them through a
//! per-format strategy that extracts text, structured data, metadata and
//! statistics. CSV, Excel (`.xlsx`/`.xls`), PDF and Word (`.docx`/`.doc`)
//! are supported.
//!
//! # Quick Start
//!
//! ```rust
//! use docproc::{Document, DocumentProcessor, ProcessorConfig};
//!
//! # fn main() -> docproc::Result<()> {
//! let processor = DocumentProcessor::new(ProcessorConfig::default())?;
//! let result = processor.process(Document::new("ids.csv", b"id,name\n1,Alice\n2,Bob\n".to_vec()))?;
//!
//! assert!(result.is_success());
//! assert_eq!(result.extracted_data.as_ref().map(|d| d.len()), Some(2));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core** (`core`): document types, configuration, file loading and the orchestrator
//! - **Plugin system** (`plugins`): the strategy trait and the priority-based registry
//! - **Strategies** (`strategies`): one per document type
//! - **Readers** (`extraction`, `pdf`): format parsing without any result shaping
//! - **Text** (`text`, `stopwords`): word statistics and the English/Spanish heuristic
//!
//! # Outcomes
//!
//! Caller-input problems (blank name, empty content, unknown extension,
//! unknown strategy) are returned as `Err`. Problems with the document
//! itself come back as a [`ProcessingResult`] with `success == false`.

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extraction;
pub mod pdf;
pub mod plugins;
pub mod stopwords;
pub mod strategies;
pub mod text;
pub mod types;

pub use error::{DocprocError, ErrorCode, Result};
pub use types::*;

pub use core::config::{BatchConfig, CsvConfig, ProcessingLimits, ProcessorConfig, StatisticsConfig};
pub use core::document_type::{DocumentType, all_supported_extensions};
pub use core::processor::{DocumentProcessor, ProcessingStatistics, StrategiesInfo};

pub use plugins::{Plugin, ProcessingStrategy, StrategyInfo, StrategyRegistry};
pub use strategies::default_strategies;
