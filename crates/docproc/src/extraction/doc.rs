//! Legacy Word 97-2003 (`.doc`) text extraction.
//!
//! A `.doc` file is an OLE compound document. The `WordDocument` stream
//! starts with the File Information Block (FIB), which locates everything
//! else: the piece table (CLX) in the `0Table`/`1Table` stream maps character
//! positions to byte offsets, the paragraph property pages (FKPs) carry the
//! paragraph justification, and the section table gives the section count.
//!
//! Only the main document text is read. Headers, footnotes and text boxes
//! live past `ccpText` and are skipped. Field codes are dropped and field
//! results kept.
//!
//! [`DocPackage`] is the OLE container; [`DocPackage::document`] parses the
//! main text into a [`WordDocument`]. [`read_doc`] does both and shapes the
//! result.
//!
//! ```rust,no_run
//! use docproc::extraction::doc::DocPackage;
//!
//! # fn example() -> docproc::Result<()> {
//! let bytes = std::fs::read("minutes.doc")?;
//! let mut package = DocPackage::open(&bytes)?;
//! for paragraph in package.document()?.paragraphs() {
//!     println!("[{}] {}", paragraph.justification, paragraph.text);
//! }
//! # Ok(())
//! # }
//! ```

use super::binary::{le_u16, le_u32, slice_at};
use super::ole_summary::{SummaryInformation, read_summary_information};
use crate::error::{DocprocError, Result};
use crate::types::ParagraphData;
use encoding_rs::WINDOWS_1252;
use std::io::{Cursor, Read, Seek};

const WORD_DOCUMENT_STREAM: &str = "/WordDocument";
const TABLE_STREAM_0: &str = "/0Table";
const TABLE_STREAM_1: &str = "/1Table";

const FIB_MAGIC: u16 = 0xA5EC;
const FIB_FLAGS_OFFSET: usize = 0x0A;
const FLAG_ENCRYPTED: u16 = 0x0100;
const FLAG_WHICH_TABLE: u16 = 0x0200;
const FIB_BASE_LEN: usize = 32;
const RG_LW_CCP_TEXT: usize = 3;

const FC_LCB_PLCF_SED: usize = 6;
const FC_LCB_PLCF_BTE_PAPX: usize = 13;
const FC_LCB_CLX: usize = 33;

const CLX_PRC: u8 = 0x01;
const CLX_PCDT: u8 = 0x02;
const PCD_LEN: usize = 8;
const FC_COMPRESSED: u32 = 0x4000_0000;
const FC_MASK: u32 = 0x3FFF_FFFF;

const FKP_PAGE_LEN: usize = 512;
const BX_LEN: usize = 13;
const SED_LEN: usize = 12;

const SPRM_PJC: u16 = 0x2461;
const SPRM_PJC80: u16 = 0x2403;

const FIELD_BEGIN: char = '\u{13}';
const FIELD_SEPARATOR: char = '\u{14}';
const FIELD_END: char = '\u{15}';

/// Text and structure read from a `.doc` file.
#[derive(Debug, Clone, Default)]
pub struct DocContent {
    /// Paragraphs joined with `\n`.
    pub text: String,
    /// Non-blank paragraphs, trimmed, with their justification code.
    pub paragraphs: Vec<ParagraphData>,
    /// Every paragraph mark in the main text, blank ones included.
    pub paragraph_count: usize,
    pub section_count: usize,
    pub summary: Option<SummaryInformation>,
}

/// Read a Word 97-2003 binary document.
///
/// # Errors
///
/// `DocprocError::Parsing` when the bytes are not a compound document, the
/// FIB or piece table is malformed, or the document is encrypted. Paragraph
/// properties, the section table and summary information are best effort:
/// problems there are logged and defaults used.
pub fn read_doc(bytes: &[u8]) -> Result<DocContent> {
    let mut package = DocPackage::open(bytes)?;
    let document = package.document()?;
    let summary = package.summary_information();

    let all_paragraphs = document.paragraphs();
    let paragraph_count = all_paragraphs.len();
    let text = all_paragraphs
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let paragraphs = all_paragraphs
        .into_iter()
        .filter(|p| !p.text.trim().is_empty())
        .map(|p| ParagraphData {
            text: p.text.trim().to_string(),
            justification: Some(p.justification),
            ..Default::default()
        })
        .collect();

    tracing::debug!(paragraph_count, section_count = document.section_count(), "Read legacy Word document");

    Ok(DocContent {
        text,
        paragraphs,
        paragraph_count,
        section_count: document.section_count(),
        summary,
    })
}

/// A `.doc` file opened as an OLE compound document.
pub struct DocPackage<'a> {
    compound: cfb::CompoundFile<Cursor<&'a [u8]>>,
}

impl<'a> DocPackage<'a> {
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        let compound = cfb::CompoundFile::open(Cursor::new(bytes))
            .map_err(|e| DocprocError::parsing_with_source("Not an OLE compound document", e))?;
        Ok(Self { compound })
    }

    /// Parse the main document from the `WordDocument` and table streams.
    ///
    /// # Errors
    ///
    /// `DocprocError::Parsing` for a missing stream, a malformed FIB or piece
    /// table, or an encrypted document.
    pub fn document(&mut self) -> Result<WordDocument> {
        let word = read_stream(&mut self.compound, WORD_DOCUMENT_STREAM)?;
        let fib = Fib::parse(&word)?;
        if fib.encrypted {
            return Err(DocprocError::parsing("Encrypted Word documents are not supported"));
        }

        let table = read_stream(&mut self.compound, fib.table_stream())?;
        let clx = table_slice(&table, fib.clx, "CLX")?;
        let pieces = parse_piece_table(clx)?;
        let characters = read_characters(&word, &pieces, fib.ccp_text);

        let justifications = match table_slice(&table, fib.plcf_bte_papx, "PlcfBtePapx")
            .and_then(|plc| paragraph_justifications(&word, plc))
        {
            Ok(runs) => runs,
            Err(e) => {
                tracing::warn!("Ignoring unreadable paragraph properties: {}", e);
                Vec::new()
            }
        };

        let section_count = match table_slice(&table, fib.plcf_sed, "PlcfSed") {
            Ok(plc) => plc.len().saturating_sub(4) / (SED_LEN + 4),
            Err(e) => {
                tracing::warn!("Ignoring unreadable section table: {}", e);
                0
            }
        };

        Ok(WordDocument {
            characters,
            justifications,
            section_count: section_count.max(1),
        })
    }

    /// Document properties from `\x05SummaryInformation`, if readable.
    pub fn summary_information(&mut self) -> Option<SummaryInformation> {
        read_summary_information(&mut self.compound)
    }
}

/// The main text of a Word document and its paragraph properties.
#[derive(Debug, Clone)]
pub struct WordDocument {
    characters: Vec<PositionedChar>,
    justifications: Vec<JustificationRun>,
    section_count: usize,
}

/// One paragraph of the main text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocParagraph {
    pub text: String,
    /// 0 left, 1 center, 2 right, 3 justified.
    pub justification: u8,
}

impl WordDocument {
    /// Every paragraph, blank ones included, in document order.
    pub fn paragraphs(&self) -> Vec<DocParagraph> {
        split_paragraphs(&self.characters)
            .into_iter()
            .map(|p| DocParagraph {
                justification: justification_at(&self.justifications, p.end_fc),
                text: p.text,
            })
            .collect()
    }

    pub fn section_count(&self) -> usize {
        self.section_count
    }
}

fn read_stream<F: Read + Seek>(compound: &mut cfb::CompoundFile<F>, path: &str) -> Result<Vec<u8>> {
    let mut stream = compound
        .open_stream(path)
        .map_err(|e| DocprocError::parsing_with_source(format!("Missing stream {}", path), e))?;
    let mut data = Vec::new();
    stream
        .read_to_end(&mut data)
        .map_err(|e| DocprocError::parsing_with_source(format!("Failed to read stream {}", path), e))?;
    Ok(data)
}

fn table_slice<'a>(table: &'a [u8], (fc, lcb): (u32, u32), what: &str) -> Result<&'a [u8]> {
    slice_at(table, fc as usize, lcb as usize)
        .ok_or_else(|| DocprocError::parsing(format!("{} points outside the table stream", what)))
}

/// The parts of the FIB this reader needs. Each `(fc, lcb)` pair is an
/// offset and length in the table stream.
#[derive(Debug)]
struct Fib {
    encrypted: bool,
    use_table_1: bool,
    ccp_text: u32,
    plcf_sed: (u32, u32),
    plcf_bte_papx: (u32, u32),
    clx: (u32, u32),
}

impl Fib {
    fn parse(word: &[u8]) -> Result<Self> {
        let truncated = || DocprocError::parsing("WordDocument stream is too short for a FIB");

        if le_u16(word, 0) != Some(FIB_MAGIC) {
            return Err(DocprocError::parsing("WordDocument stream has no Word 97 FIB signature"));
        }
        let flags = le_u16(word, FIB_FLAGS_OFFSET).ok_or_else(truncated)?;

        let csw = le_u16(word, FIB_BASE_LEN).ok_or_else(truncated)? as usize;
        let cslw_offset = FIB_BASE_LEN + 2 + csw * 2;
        let cslw = le_u16(word, cslw_offset).ok_or_else(truncated)? as usize;
        let rg_lw = cslw_offset + 2;
        let ccp_text = le_u32(word, rg_lw + RG_LW_CCP_TEXT * 4).ok_or_else(truncated)?;

        let cb_rg_fc_lcb_offset = rg_lw + cslw * 4;
        let fc_lcb = cb_rg_fc_lcb_offset + 2;
        let pair = |index: usize| -> Result<(u32, u32)> {
            let at = fc_lcb + index * 8;
            Ok((
                le_u32(word, at).ok_or_else(truncated)?,
                le_u32(word, at + 4).ok_or_else(truncated)?,
            ))
        };

        Ok(Self {
            encrypted: flags & FLAG_ENCRYPTED != 0,
            use_table_1: flags & FLAG_WHICH_TABLE != 0,
            ccp_text,
            plcf_sed: pair(FC_LCB_PLCF_SED)?,
            plcf_bte_papx: pair(FC_LCB_PLCF_BTE_PAPX)?,
            clx: pair(FC_LCB_CLX)?,
        })
    }

    fn table_stream(&self) -> &'static str {
        if self.use_table_1 { TABLE_STREAM_1 } else { TABLE_STREAM_0 }
    }
}

/// One contiguous run of text: character positions `[cp_start, cp_end)`
/// stored at byte offset `offset` in the WordDocument stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Piece {
    cp_start: u32,
    cp_end: u32,
    offset: usize,
    compressed: bool,
}

fn parse_piece_table(clx: &[u8]) -> Result<Vec<Piece>> {
    let malformed = |what: &str| DocprocError::parsing(format!("Malformed piece table: {}", what));

    let mut pos = 0;
    while clx.get(pos) == Some(&CLX_PRC) {
        let cb = le_u16(clx, pos + 1).ok_or_else(|| malformed("truncated Prc"))? as usize;
        pos += 3 + cb;
    }
    if clx.get(pos) != Some(&CLX_PCDT) {
        return Err(malformed("missing Pcdt"));
    }

    let lcb = le_u32(clx, pos + 1).ok_or_else(|| malformed("truncated Pcdt"))? as usize;
    let plc = slice_at(clx, pos + 5, lcb).ok_or_else(|| malformed("PlcPcd overruns the CLX"))?;
    if lcb < 4 || (lcb - 4) % (4 + PCD_LEN) != 0 {
        return Err(malformed("PlcPcd has an invalid length"));
    }

    let count = (lcb - 4) / (4 + PCD_LEN);
    let pcd_base = (count + 1) * 4;
    let mut pieces = Vec::with_capacity(count);
    for i in 0..count {
        let cp_start = le_u32(plc, i * 4).ok_or_else(|| malformed("truncated CP"))?;
        let cp_end = le_u32(plc, (i + 1) * 4).ok_or_else(|| malformed("truncated CP"))?;
        let fc = le_u32(plc, pcd_base + i * PCD_LEN + 2).ok_or_else(|| malformed("truncated PCD"))?;

        let compressed = fc & FC_COMPRESSED != 0;
        let raw = fc & FC_MASK;
        pieces.push(Piece {
            cp_start,
            cp_end,
            offset: if compressed { (raw / 2) as usize } else { raw as usize },
            compressed,
        });
    }

    Ok(pieces)
}

/// A decoded character and its byte offset in the WordDocument stream.
type PositionedChar = (char, u32);

/// Decode the first `ccp_text` characters. Pieces that point past the end
/// of the stream are cut short.
fn read_characters(word: &[u8], pieces: &[Piece], ccp_text: u32) -> Vec<PositionedChar> {
    // ccp_text is untrusted; the stream holds at most one character per byte
    let mut out = Vec::with_capacity((ccp_text as usize).min(word.len()));

    for piece in pieces {
        if piece.cp_start >= ccp_text {
            break;
        }
        let count = (piece.cp_end.min(ccp_text).saturating_sub(piece.cp_start)) as usize;

        if piece.compressed {
            let end = piece.offset.saturating_add(count).min(word.len());
            let bytes = word.get(piece.offset..end).unwrap_or_default();
            // single-byte code page: one char per byte
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            out.extend(text.chars().zip(piece.offset..).map(|(c, at)| (c, at as u32)));
        } else {
            let end = piece.offset.saturating_add(count.saturating_mul(2)).min(word.len());
            let units: Vec<(u16, u32)> = word
                .get(piece.offset..end)
                .unwrap_or_default()
                .chunks_exact(2)
                .enumerate()
                .map(|(i, pair)| (u16::from_le_bytes([pair[0], pair[1]]), (piece.offset + i * 2) as u32))
                .collect();

            let decoded = char::decode_utf16(units.iter().map(|(u, _)| *u));
            let mut index = 0;
            for ch in decoded {
                let fc = units[index].1;
                match ch {
                    Ok(c) => {
                        index += c.len_utf16();
                        out.push((c, fc));
                    }
                    Err(_) => {
                        index += 1;
                        out.push((char::REPLACEMENT_CHARACTER, fc));
                    }
                }
            }
        }
    }

    out
}

#[derive(Debug, Clone, PartialEq)]
struct RawParagraph {
    text: String,
    /// Offset of the paragraph mark, used to look up paragraph properties.
    end_fc: u32,
}

fn split_paragraphs(characters: &[PositionedChar]) -> Vec<RawParagraph> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    // one entry per open field: true once its separator has been seen
    let mut fields: Vec<bool> = Vec::new();
    let mut last_fc = 0;

    for &(ch, fc) in characters {
        last_fc = fc;
        match ch {
            FIELD_BEGIN => {
                fields.push(false);
                continue;
            }
            FIELD_SEPARATOR => {
                if let Some(in_result) = fields.last_mut() {
                    *in_result = true;
                }
                continue;
            }
            FIELD_END => {
                fields.pop();
                continue;
            }
            _ => {}
        }
        if fields.iter().any(|in_result| !in_result) {
            continue;
        }

        match ch {
            '\r' => paragraphs.push(RawParagraph {
                text: std::mem::take(&mut current),
                end_fc: fc,
            }),
            '\u{7}' => current.push('\t'),
            '\u{b}' | '\u{c}' => current.push('\n'),
            '\u{1e}' => current.push('-'),
            '\t' | '\n' => current.push(ch),
            c if (c as u32) < 0x20 => {}
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        paragraphs.push(RawParagraph {
            text: current,
            end_fc: last_fc,
        });
    }

    paragraphs
}

/// Paragraph justification by byte range `[start, end)` of the paragraph mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JustificationRun {
    start: u32,
    end: u32,
    jc: u8,
}

fn paragraph_justifications(word: &[u8], plc: &[u8]) -> Result<Vec<JustificationRun>> {
    if plc.len() < 4 || (plc.len() - 4) % 8 != 0 {
        return Err(DocprocError::parsing("PlcfBtePapx has an invalid length"));
    }
    let count = (plc.len() - 4) / 8;
    let pn_base = (count + 1) * 4;

    let mut runs = Vec::new();
    for i in 0..count {
        let pn = le_u32(plc, pn_base + i * 4).unwrap_or(0) & 0x003F_FFFF;
        let page = slice_at(word, pn as usize * FKP_PAGE_LEN, FKP_PAGE_LEN)
            .ok_or_else(|| DocprocError::parsing(format!("PAPX page {} is outside the WordDocument stream", pn)))?;
        read_papx_page(page, &mut runs);
    }

    runs.sort_by_key(|r| r.start);
    Ok(runs)
}

fn read_papx_page(page: &[u8], runs: &mut Vec<JustificationRun>) {
    let crun = page[FKP_PAGE_LEN - 1] as usize;
    let bx_base = (crun + 1) * 4;

    for i in 0..crun {
        let (Some(start), Some(end), Some(&b_offset)) =
            (le_u32(page, i * 4), le_u32(page, (i + 1) * 4), page.get(bx_base + i * BX_LEN))
        else {
            break;
        };
        let jc = if b_offset == 0 {
            0
        } else {
            papx_justification(page, b_offset as usize * 2).unwrap_or(0)
        };
        runs.push(JustificationRun { start, end, jc });
    }
}

/// Justification from the PAPX at `offset`: the last `sprmPJc` or
/// `sprmPJc80` wins.
fn papx_justification(page: &[u8], offset: usize) -> Option<u8> {
    let cb = *page.get(offset)? as usize;
    let (start, len) = if cb == 0 {
        (offset + 2, *page.get(offset + 1)? as usize * 2)
    } else {
        (offset + 1, (cb * 2).checked_sub(1)?)
    };
    // first two bytes are the style index
    let grpprl = slice_at(page, start, len)?.get(2..)?;

    let mut jc = None;
    let mut pos = 0;
    while let Some(sprm) = le_u16(grpprl, pos) {
        let operand = pos + 2;
        let size = match sprm >> 13 {
            0 | 1 => 1,
            2 | 4 | 5 => 2,
            3 => 4,
            6 => 1 + *grpprl.get(operand)? as usize,
            _ => 3,
        };
        if matches!(sprm, SPRM_PJC | SPRM_PJC80) {
            jc = grpprl.get(operand).copied().or(jc);
        }
        pos = operand + size;
    }
    jc
}

fn justification_at(runs: &[JustificationRun], fc: u32) -> u8 {
    let index = runs.partition_point(|r| r.start <= fc);
    index
        .checked_sub(1)
        .map(|i| runs[i])
        .filter(|r| fc < r.end)
        .map(|r| r.jc)
        .unwrap_or(0)
}
