//! Application statistics from `docProps/app.xml`.

use super::{parse_xml_int, parse_xml_text, read_part};
use crate::error::{DocprocError, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Word-processing statistics recorded by the authoring application.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppProperties {
    pub application: Option<String>,
    pub company: Option<String>,
    /// Total editing time in minutes.
    pub total_time: Option<i64>,
    pub pages: Option<i64>,
    pub words: Option<i64>,
    /// Characters excluding spaces.
    pub characters: Option<i64>,
    pub characters_with_spaces: Option<i64>,
    pub paragraphs: Option<i64>,
    pub lines: Option<i64>,
}

impl AppProperties {
    /// Properties keyed by their camelCase names, absent values as `null`.
    pub fn to_properties(&self) -> IndexMap<String, Value> {
        let text = |v: &Option<String>| v.clone().map_or(Value::Null, Value::from);
        let int = |v: Option<i64>| v.map_or(Value::Null, Value::from);

        IndexMap::from([
            ("application".to_string(), text(&self.application)),
            ("company".to_string(), text(&self.company)),
            ("totalTime".to_string(), int(self.total_time)),
            ("pages".to_string(), int(self.pages)),
            ("words".to_string(), int(self.words)),
            ("characters".to_string(), int(self.characters)),
            ("charactersWithSpaces".to_string(), int(self.characters_with_spaces)),
            ("paragraphs".to_string(), int(self.paragraphs)),
            ("lines".to_string(), int(self.lines)),
        ])
    }
}

/// Extract application properties. A package without `docProps/app.xml` yields defaults.
///
/// # Errors
///
/// Returns `DocprocError::Parsing` when the part exists but is not well-formed XML.
pub fn extract_app_properties<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<AppProperties> {
    let Some(xml) = read_part(archive, "docProps/app.xml")? else {
        return Ok(AppProperties::default());
    };

    let doc = roxmltree::Document::parse(&xml)
        .map_err(|e| DocprocError::parsing(format!("Failed to parse app.xml: {}", e)))?;
    let root = doc.root_element();

    Ok(AppProperties {
        application: parse_xml_text(root, "Application"),
        company: parse_xml_text(root, "Company"),
        total_time: parse_xml_int(root, "TotalTime"),
        pages: parse_xml_int(root, "Pages"),
        words: parse_xml_int(root, "Words"),
        characters: parse_xml_int(root, "Characters"),
        characters_with_spaces: parse_xml_int(root, "CharactersWithSpaces"),
        paragraphs: parse_xml_int(root, "Paragraphs"),
        lines: parse_xml_int(root, "Lines"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn archive_with_app(xml: &str) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            zip.start_file("docProps/app.xml", SimpleFileOptions::default()).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        ZipArchive::new(Cursor::new(buffer)).unwrap()
    }

    #[test]
    fn test_extract_app_properties() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
  <Application>Microsoft Office Word</Application>
  <TotalTime>42</TotalTime>
  <Pages>3</Pages>
  <Words>512</Words>
  <Characters>2900</Characters>
  <Company>Acme</Company>
</Properties>"#;

        let props = extract_app_properties(&mut archive_with_app(xml)).unwrap();
        assert_eq!(props.application.as_deref(), Some("Microsoft Office Word"));
        assert_eq!(props.total_time, Some(42));
        assert_eq!(props.pages, Some(3));
        assert_eq!(props.words, Some(512));
        assert_eq!(props.lines, None);

        let map = props.to_properties();
        assert_eq!(map["company"], Value::from("Acme"));
        assert_eq!(map["lines"], Value::Null);
        assert_eq!(map.len(), 9);
    }
}
