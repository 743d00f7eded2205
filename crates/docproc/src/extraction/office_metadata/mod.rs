//! Office Open XML package properties.
//!
//! Word-processing packages describe themselves in two parts of the ZIP container:
//! - `docProps/core.xml` - Dublin Core metadata (title, creator, dates)
//! - `docProps/app.xml` - application statistics (pages, words, characters)
//!
//! Both parts are optional. A missing part yields default (empty) properties;
//! a present but malformed part is a parsing error.

pub mod app_properties;
pub mod core_properties;

pub use app_properties::{AppProperties, extract_app_properties};
pub use core_properties::{CoreProperties, extract_core_properties};

use crate::error::{DocprocError, Result};
use roxmltree::Node;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Read a package part as UTF-8, or `None` when the archive lacks it.
pub(crate) fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| DocprocError::parsing(format!("Failed to read {}: {}", path, e)))?;
    Ok(Some(content))
}

/// Trimmed, non-empty text of the first descendant with local name `name`.
pub(crate) fn parse_xml_text(node: Node, name: &str) -> Option<String> {
    node.descendants()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

pub(crate) fn parse_xml_int(node: Node, name: &str) -> Option<i64> {
    node.descendants()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
        .and_then(|s| s.trim().parse::<i64>().ok())
}
