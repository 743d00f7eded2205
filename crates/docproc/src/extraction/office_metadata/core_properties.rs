//! Dublin Core metadata from `docProps/core.xml`.

use super::{parse_xml_text, read_part};
use crate::error::{DocprocError, Result};
use chrono::{DateTime, Local, NaiveDateTime};
use std::io::{Read, Seek};
use zip::ZipArchive;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    /// Author (`dc:creator`).
    pub creator: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    pub revision: Option<String>,
    /// W3CDTF timestamp as written in the package.
    pub created: Option<String>,
    pub modified: Option<String>,
}

impl CoreProperties {
    /// Creation time converted to local time.
    pub fn created_local(&self) -> Option<NaiveDateTime> {
        self.created.as_deref().and_then(to_local)
    }

    pub fn modified_local(&self) -> Option<NaiveDateTime> {
        self.modified.as_deref().and_then(to_local)
    }
}

fn to_local(timestamp: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}

/// Extract core properties. A package without `docProps/core.xml` yields defaults.
///
/// # Errors
///
/// Returns `DocprocError::Parsing` when the part exists but is not well-formed XML.
pub fn extract_core_properties<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<CoreProperties> {
    let Some(xml) = read_part(archive, "docProps/core.xml")? else {
        return Ok(CoreProperties::default());
    };

    let doc = roxmltree::Document::parse(&xml)
        .map_err(|e| DocprocError::parsing(format!("Failed to parse core.xml: {}", e)))?;
    let root = doc.root_element();

    Ok(CoreProperties {
        title: parse_xml_text(root, "title"),
        subject: parse_xml_text(root, "subject"),
        creator: parse_xml_text(root, "creator"),
        keywords: parse_xml_text(root, "keywords"),
        description: parse_xml_text(root, "description"),
        last_modified_by: parse_xml_text(root, "lastModifiedBy"),
        revision: parse_xml_text(root, "revision"),
        created: parse_xml_text(root, "created"),
        modified: parse_xml_text(root, "modified"),
    })
}
