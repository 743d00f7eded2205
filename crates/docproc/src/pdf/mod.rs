//! PDF loading, text and metadata extraction on top of `lopdf`.
//!
//! # Example
//!
//! ```rust,no_run
//! use docproc::pdf::{extract_metadata, extract_page_texts, join_pages, load_pdf};
//!
//! # fn example() -> docproc::Result<()> {
//! let bytes = std::fs::read("report.pdf")?;
//! let document = load_pdf(&bytes)?.document;
//!
//! let text = join_pages(&extract_page_texts(&document));
//! let metadata = extract_metadata(&document);
//! println!("PDF {} with {} pages: {}", metadata.pdf_version, metadata.page_count, text.len());
//! # Ok(())
//! # }
//! ```
pub mod document;
pub mod error;
pub mod metadata;
pub mod text;

pub use document::{LoadedPdf, load_pdf};
pub use error::PdfError;
pub use metadata::{PdfMetadata, extract_metadata};
pub use text::{PAGE_BREAK, extract_page_text, extract_page_texts, join_pages};
