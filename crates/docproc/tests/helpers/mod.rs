//! Shared fixtures for integration tests.
//!
//! Every fixture is built in memory: Office files are zipped by hand and
//! PDFs are assembled with `lopdf`.

#![allow(dead_code)]

use docproc::{Document, DocumentProcessor, ProcessorConfig};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, Stream, dictionary};
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const SHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub fn processor() -> DocumentProcessor {
    DocumentProcessor::new(ProcessorConfig::default()).expect("default processor")
}

pub fn doc(name: &str, content: impl Into<Vec<u8>>) -> Document {
    Document::new(name, content)
}

pub fn zip_parts(parts: &[(&str, String)]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        for (name, content) in parts {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}

/// A DOCX whose body is the given WordprocessingML, with optional
/// `docProps/core.xml` and `docProps/app.xml` payloads.
pub fn docx(body: &str, core: Option<&str>, app: Option<&str>) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#
    );
    let mut parts = vec![("word/document.xml", document)];
    if let Some(core) = core {
        parts.push(("docProps/core.xml", core.to_string()));
    }
    if let Some(app) = app {
        parts.push(("docProps/app.xml", app.to_string()));
    }
    zip_parts(&parts)
}

pub fn paragraph(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
}

pub fn core_properties(title: &str, creator: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"
  xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/"
  xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>{title}</dc:title>
  <dc:creator>{creator}</dc:creator>
  <dcterms:created xsi:type="dcterms:W3CDTF">2024-03-01T09:30:00Z</dcterms:created>
</cp:coreProperties>"#
    )
}

/// One worksheet of an XLSX fixture.
pub struct SheetSpec<'a> {
    pub name: &'a str,
    /// Raw `<row>` elements.
    pub rows: String,
    /// Raw trailing elements such as `<mergeCells>`.
    pub extra: &'a str,
}

/// A cell holding an inline string.
pub fn text_cell(reference: &str, value: &str) -> String {
    format!(r#"<c r="{reference}" t="inlineStr"><is><t>{value}</t></is></c>"#)
}

pub fn number_cell(reference: &str, value: f64) -> String {
    format!(r#"<c r="{reference}"><v>{value}</v></c>"#)
}

pub fn formula_cell(reference: &str, formula: &str, cached: f64) -> String {
    format!(r#"<c r="{reference}"><f>{formula}</f><v>{cached}</v></c>"#)
}

pub fn row(index: usize, cells: &[String]) -> String {
    format!(r#"<row r="{index}">{}</row>"#, cells.concat())
}

pub fn xlsx(sheets: &[SheetSpec<'_>]) -> Vec<u8> {
    let mut sheet_entries = String::new();
    let mut relationships = String::new();
    let mut overrides = String::new();
    let mut parts = Vec::new();

    for (i, sheet) in sheets.iter().enumerate() {
        let n = i + 1;
        sheet_entries.push_str(&format!(r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#, sheet.name));
        relationships.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        parts.push((
            format!("xl/worksheets/sheet{n}.xml"),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{SHEET_NS}" xmlns:r="{REL_NS}"><sheetData>{}</sheetData>{}</worksheet>"#,
                sheet.rows, sheet.extra
            ),
        ));
    }

    let content_types = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
{overrides}
</Types>"#
    );
    let root_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    );
    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{SHEET_NS}" xmlns:r="{REL_NS}"><sheets>{sheet_entries}</sheets></workbook>"#
    );
    let workbook_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{PKG_REL_NS}">{relationships}</Relationships>"#
    );

    let mut all: Vec<(&str, String)> = vec![
        ("[Content_Types].xml", content_types),
        ("_rels/.rels", root_rels),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", workbook_rels),
    ];
    for (name, content) in &parts {
        all.push((name.as_str(), content.clone()));
    }
    zip_parts(&all)
}

/// A PDF with one Courier text line per page.
pub fn pdf(pages: &[&str], info: Option<Dictionary>) -> Vec<u8> {
    pdf_document(pages, info).1
}

fn pdf_document(pages: &[&str], info: Option<Dictionary>) -> (lopdf::Document, Vec<u8>) {
    let mut document = lopdf::Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = document.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);
    if let Some(info) = info {
        let info_id = document.add_object(info);
        document.trailer.set("Info", info_id);
    }

    let mut out = Vec::new();
    document.save_to(&mut out).unwrap();
    (document, out)
}

/// A PDF declaring standard-handler encryption with a non-empty user password.
pub fn encrypted_pdf() -> Vec<u8> {
    let (mut document, _) = pdf_document(&["classified"], None);
    let encrypt_id = document.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "O" => Object::String(vec![0x5A; 32], lopdf::StringFormat::Hexadecimal),
        "U" => Object::String(vec![0xA5; 32], lopdf::StringFormat::Hexadecimal),
        "P" => -44,
    });
    document.trailer.set("Encrypt", encrypt_id);
    let id = Object::String(vec![0x11; 16], lopdf::StringFormat::Hexadecimal);
    document.trailer.set("ID", vec![id.clone(), id]);

    let mut out = Vec::new();
    document.save_to(&mut out).unwrap();
    out
}
