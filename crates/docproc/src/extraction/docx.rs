//! DOCX (Office Open XML word-processing) reading with `zip` and `roxmltree`.
//!
//! The body of `word/document.xml` is walked once in document order. Body
//! paragraphs keep their style, alignment and runs, body tables keep a grid of
//! cell text, and the plain text is assembled line by line: one line per
//! paragraph and one tab-separated line per table row.
//!
//! Header and footer parts (`word/header*.xml`, `word/footer*.xml`) are read in
//! part-number order. Core and application properties come from
//! [`office_metadata`](super::office_metadata); unreadable property parts are
//! logged and skipped.

use super::office_metadata::{AppProperties, CoreProperties, extract_app_properties, extract_core_properties, read_part};
use crate::error::{DocprocError, Result};
use crate::types::{FormattingStats, ParagraphData, RunData, TableData, WordContent};
use roxmltree::Node;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Everything read from a DOCX package.
#[derive(Debug, Clone, Default)]
pub struct DocxContent {
    pub text: String,
    /// Non-blank body paragraphs, body tables, headers and footers.
    pub content: WordContent,
    /// All body paragraphs, blank ones included.
    pub paragraph_count: usize,
    /// Run formatting over all body paragraphs.
    pub formatting: FormattingStats,
    pub core: CoreProperties,
    pub app: AppProperties,
}

/// Read a DOCX package from memory.
///
/// # Errors
///
/// Returns `DocprocError::Parsing` if the bytes are not a ZIP archive, the
/// package has no `word/document.xml`, or that part is not well-formed XML.
pub fn read_docx(bytes: &[u8]) -> Result<DocxContent> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let document_xml = read_part(&mut archive, "word/document.xml")?
        .ok_or_else(|| DocprocError::parsing("DOCX package has no word/document.xml part"))?;
    let doc = roxmltree::Document::parse(&document_xml)
        .map_err(|e| DocprocError::parsing_with_source("Failed to parse word/document.xml", e))?;

    let body = doc
        .root_element()
        .children()
        .find(|n| is_w(n, "body"))
        .ok_or_else(|| DocprocError::parsing("word/document.xml has no w:body element"))?;

    let mut walker = BodyWalker::default();
    walker.walk(body);

    let headers = read_header_footer_parts(&mut archive, "header")?;
    let footers = read_header_footer_parts(&mut archive, "footer")?;

    let core = extract_core_properties(&mut archive).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Error extracting document properties");
        CoreProperties::default()
    });
    let app = extract_app_properties(&mut archive).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Error extracting application properties");
        AppProperties::default()
    });

    let formatting = formatting_statistics(walker.paragraphs.iter().flat_map(|p| p.runs.iter()));
    let paragraph_count = walker.paragraphs.len();
    let paragraphs = walker
        .paragraphs
        .into_iter()
        .filter(|p| !p.text.trim().is_empty())
        .collect();

    Ok(DocxContent {
        text: walker.lines.join("\n"),
        content: WordContent {
            paragraphs,
            tables: walker.tables,
            headers,
            footers,
        },
        paragraph_count,
        formatting,
        core,
        app,
    })
}

#[derive(Default)]
struct BodyWalker {
    paragraphs: Vec<ParagraphData>,
    tables: Vec<TableData>,
    lines: Vec<String>,
}

impl BodyWalker {
    fn walk(&mut self, container: Node) {
        for child in container.children().filter(Node::is_element) {
            if is_w(&child, "p") {
                let paragraph = read_paragraph(child);
                self.lines.push(paragraph.text.clone());
                self.paragraphs.push(paragraph);
            } else if is_w(&child, "tbl") {
                let table = read_table(child);
                self.lines.extend(table.rows.iter().map(|row| row.join("\t")));
                self.tables.push(table);
            } else if is_w(&child, "sdt") {
                // content controls wrap ordinary body content
                if let Some(content) = child.children().find(|n| is_w(n, "sdtContent")) {
                    self.walk(content);
                }
            }
        }
    }
}

fn is_w(node: &Node, name: &str) -> bool {
    node.has_tag_name((W_NS, name))
}

fn w_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_w(n, name))
}

fn w_val<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute((W_NS, "val"))
}

/// Runs of a paragraph, including those nested in hyperlinks and tracked
/// insertions, but not those of nested paragraphs such as text boxes.
fn paragraph_runs<'a, 'input>(paragraph: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    paragraph.descendants().filter(move |n| {
        is_w(n, "r")
            && n.ancestors()
                .skip(1)
                .find(|a| is_w(a, "p"))
                .is_some_and(|p| p == paragraph)
    })
}

fn read_paragraph(paragraph: Node) -> ParagraphData {
    let properties = w_child(paragraph, "pPr");
    let style = properties
        .and_then(|p| w_child(p, "pStyle"))
        .and_then(w_val)
        .map(String::from);
    let alignment = properties.and_then(|p| w_child(p, "jc")).and_then(w_val);

    let runs: Vec<RunData> = paragraph_runs(paragraph).map(read_run).collect();
    let text = runs.iter().map(|r| r.text.as_str()).collect();

    ParagraphData {
        text,
        style,
        alignment: Some(alignment_name(alignment)),
        justification: None,
        runs,
    }
}

fn alignment_name(jc: Option<&str>) -> String {
    match jc {
        None | Some("left") | Some("start") => "LEFT".to_string(),
        Some("right") | Some("end") => "RIGHT".to_string(),
        Some(other) => other.to_ascii_uppercase(),
    }
}

fn read_run(run: Node) -> RunData {
    let mut text = String::new();
    for child in run.children().filter(Node::is_element) {
        if is_w(&child, "t") {
            text.push_str(child.text().unwrap_or(""));
        } else if is_w(&child, "tab") {
            text.push('\t');
        } else if is_w(&child, "br") || is_w(&child, "cr") {
            text.push('\n');
        }
    }

    let properties = w_child(run, "rPr");
    let toggle = |name: &str| properties.and_then(|p| w_child(p, name)).is_some_and(toggle_on);

    let font_size = properties
        .and_then(|p| w_child(p, "sz"))
        .and_then(w_val)
        .and_then(|v| v.parse::<f64>().ok())
        .map(|half_points| half_points / 2.0);
    let font_family = properties
        .and_then(|p| w_child(p, "rFonts"))
        .and_then(|f| f.attribute((W_NS, "ascii")))
        .map(String::from);

    RunData {
        text,
        is_bold: toggle("b"),
        is_italic: toggle("i"),
        font_size,
        font_family,
    }
}

/// `<w:b/>` is on; `<w:b w:val="0"/>` and friends are off.
fn toggle_on(node: Node) -> bool {
    !matches!(w_val(node), Some("0") | Some("false") | Some("off") | Some("none"))
}

fn read_table(table: Node) -> TableData {
    let rows: Vec<Vec<String>> = table
        .children()
        .filter(|n| is_w(n, "tr"))
        .map(|row| {
            row.children()
                .filter(|n| is_w(n, "tc"))
                .map(|cell| {
                    cell.children()
                        .filter(|n| is_w(n, "p"))
                        .map(paragraph_text)
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .collect()
        })
        .collect();

    TableData {
        row_count: rows.len(),
        column_count: rows.first().map_or(0, Vec::len),
        rows,
    }
}

fn paragraph_text(paragraph: Node) -> String {
    paragraph_runs(paragraph).map(|r| read_run(r).text).collect()
}

/// Text of every `word/<kind>N.xml` part, ordered by N.
fn read_header_footer_parts<R: Read + Seek>(archive: &mut ZipArchive<R>, kind: &str) -> Result<Vec<String>> {
    let prefix = format!("word/{}", kind);
    let mut parts: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name.strip_prefix(prefix.as_str())?.strip_suffix(".xml")?;
            let order = if number.is_empty() { 0 } else { number.parse().ok()? };
            Some((order, name.to_string()))
        })
        .collect();
    parts.sort();

    let mut texts = Vec::with_capacity(parts.len());
    for (_, name) in parts {
        let Some(xml) = read_part(archive, &name)? else {
            continue;
        };
        let doc = roxmltree::Document::parse(&xml)
            .map_err(|e| DocprocError::parsing(format!("Failed to parse {}: {}", name, e)))?;
        let text = doc
            .descendants()
            .filter(|n| is_w(n, "p"))
            .map(paragraph_text)
            .collect::<Vec<_>>()
            .join("\n");
        texts.push(text);
    }
    Ok(texts)
}

fn formatting_statistics<'a>(runs: impl Iterator<Item = &'a RunData>) -> FormattingStats {
    let mut stats = FormattingStats::default();

    for run in runs {
        stats.total_runs += 1;
        if run.is_bold {
            stats.bold_runs += 1;
        }
        if run.is_italic {
            stats.italic_runs += 1;
        }
        if let Some(family) = &run.font_family
            && !stats.font_families_used.contains(family)
        {
            stats.font_families_used.push(family.clone());
        }
        if let Some(size) = run.font_size
            && size > 0.0
            && !stats.font_sizes_used.contains(&size)
        {
            stats.font_sizes_used.push(size);
        }
    }

    stats
}
