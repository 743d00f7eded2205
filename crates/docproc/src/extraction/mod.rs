//! Format readers.
//!
//! Each reader turns raw bytes into plain Rust values and knows nothing about
//! strategies or results. Readers return `DocprocError::Parsing` for content
//! they cannot read; the strategies decide what that means for the caller.

mod binary;
pub(crate) mod columns;

pub mod csv;
pub mod doc;
pub mod docx;
pub mod excel;
pub mod office_metadata;
pub mod ole_summary;

pub use csv::{CsvTable, parse_csv};
pub use doc::{DocContent, DocPackage, DocParagraph, WordDocument, read_doc};
pub use docx::{DocxContent, read_docx};
pub use excel::{Workbook, read_workbook};
