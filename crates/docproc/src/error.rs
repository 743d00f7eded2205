//! Error types for docproc.
//!
//! Every fallible operation in the crate returns [`DocprocError`]. The
//! variants fall into two groups:
//!
//! **Caller-input errors are thrown, never wrapped:**
//! - `Validation` - blank document name, empty content, bad configuration
//! - `UnsupportedDocumentType` - the extension maps to no known type
//! - `StrategyNotFound` - no strategy registered for a type or name
//!
//! **Document-content problems are NOT errors.** A corrupt workbook or a
//! password-protected PDF produces a [`ProcessingResult`](crate::types::ProcessingResult)
//! with `success == false`. Only failures nobody planned for reach the
//! orchestrator, which wraps them once as `Processing`.
//!
//! `Io` errors (from `std::io::Error`) always bubble up unchanged.
//!
//! # Example
//!
//! ```rust
//! use docproc::{DocprocError, Result};
//!
//! fn require_name(name: &str) -> Result<()> {
//!     if name.trim().is_empty() {
//!         return Err(DocprocError::validation("Document name cannot be empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_name("report.pdf").is_ok());
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using `DocprocError`.
pub type Result<T> = std::result::Result<T, DocprocError>;

/// Stable error codes exposed to callers that serialize failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ProcessingError,
    ValidationError,
    UnsupportedDocumentType,
    StrategyNotFound,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ProcessingError => "PROCESSING_ERROR",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::UnsupportedDocumentType => "UNSUPPORTED_DOCUMENT_TYPE",
            ErrorCode::StrategyNotFound => "STRATEGY_NOT_FOUND",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for all docproc operations.
#[derive(Debug, Error)]
pub enum DocprocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(
        "{}Unsupported document type '{extension}'. Supported types are: {}",
        document_prefix(.document_name.as_deref()),
        .supported.join(", ")
    )]
    UnsupportedDocumentType {
        extension: String,
        document_name: Option<String>,
        supported: Vec<String>,
    },

    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),

    #[error("Strategy not found: {requested}. Available strategies: [{}]", .available.join(", "))]
    StrategyNotFound { requested: String, available: Vec<String> },

    #[error(
        "{}{}{message}",
        document_prefix(.document_name.as_deref()),
        strategy_prefix(.strategy.as_deref())
    )]
    Processing {
        message: String,
        document_name: Option<String>,
        strategy: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Plugin error in '{plugin_name}': {message}")]
    Plugin { message: String, plugin_name: String },

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("{0}")]
    Other(String),
}

fn document_prefix(name: Option<&str>) -> String {
    name.map(|n| format!("Document '{}': ", n)).unwrap_or_default()
}

fn strategy_prefix(strategy: Option<&str>) -> String {
    strategy.map(|s| format!("[{}] ", s)).unwrap_or_default()
}

impl From<calamine::Error> for DocprocError {
    fn from(err: calamine::Error) -> Self {
        DocprocError::Parsing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<csv::Error> for DocprocError {
    fn from(err: csv::Error) -> Self {
        DocprocError::Parsing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<zip::result::ZipError> for DocprocError {
    fn from(err: zip::result::ZipError) -> Self {
        DocprocError::Parsing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for DocprocError {
    fn from(err: serde_json::Error) -> Self {
        DocprocError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<crate::pdf::error::PdfError> for DocprocError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        DocprocError::Parsing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl DocprocError {
    error_constructor!(parsing, Parsing);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);

    /// Create a processing error tied to a document and, if known, a strategy.
    pub fn processing<S: Into<String>>(message: S, document_name: Option<&str>, strategy: Option<&str>) -> Self {
        Self::Processing {
            message: message.into(),
            document_name: document_name.map(str::to_string),
            strategy: strategy.map(str::to_string),
            source: None,
        }
    }

    /// Wrap an unexpected failure, keeping the original cause in the source chain.
    pub fn processing_with_source<S, E>(message: S, document_name: Option<&str>, strategy: Option<&str>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Processing {
            message: message.into(),
            document_name: document_name.map(str::to_string),
            strategy: strategy.map(str::to_string),
            source: Some(Box::new(source)),
        }
    }

    /// The stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DocprocError::Validation { .. } => ErrorCode::ValidationError,
            DocprocError::UnsupportedDocumentType { .. } | DocprocError::UnknownDocumentType(_) => {
                ErrorCode::UnsupportedDocumentType
            }
            DocprocError::StrategyNotFound { .. } => ErrorCode::StrategyNotFound,
            _ => ErrorCode::ProcessingError,
        }
    }
}
