//! Core orchestration module.
//!
//! - **Document types**: the static extension / MIME / tag table
//! - **Configuration**: limits, statistics and per-format options, loadable from TOML, YAML or JSON
//! - **I/O**: building a [`Document`](crate::types::Document) from a file
//! - **Processor**: validation, classification, dispatch and result normalization
//!
//! # Example
//!
//! ```rust,no_run
//! use docproc::core::config::ProcessorConfig;
//! use docproc::core::processor::DocumentProcessor;
//! use docproc::types::Document;
//!
//! # fn example() -> docproc::Result<()> {
//! let config = ProcessorConfig::discover()?.unwrap_or_default();
//! let processor = DocumentProcessor::new(config)?;
//! let result = processor.process(Document::from_path("report.pdf")?)?;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document_type;
pub mod io;
pub mod processor;

pub use config::{BatchConfig, CsvConfig, ProcessingLimits, ProcessorConfig, StatisticsConfig};
pub use document_type::{DocumentType, all_supported_extensions};
pub use processor::{DocumentProcessor, ProcessingStatistics, StrategiesInfo};
