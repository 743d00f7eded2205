//! Spreadsheet reading using the `calamine` library.
//!
//! Workbooks are opened as Office Open XML (`.xlsx`) first and as legacy
//! binary (`.xls`) when that fails, regardless of the file extension.
//!
//! Each sheet becomes a [`SheetData`]: a header row is detected with a
//! text/number heuristic over the first two rows, remaining rows are coerced
//! to [`CellValue`]s, and per-column statistics are computed.
//!
//! # Example
//!
//! ```rust,no_run
//! use docproc::extraction::excel::read_workbook;
//!
//! # fn example() -> docproc::Result<()> {
//! let bytes = std::fs::read("report.xlsx")?;
//! let workbook = read_workbook(&bytes)?;
//! for sheet in &workbook.sheets {
//!     println!("{}: {} rows", sheet.sheet_name, sheet.data.len());
//! }
//! # Ok(())
//! # }
//! ```
use calamine::{Data, Range, Reader, Xls, Xlsx};
use std::io::{Cursor, Read, Seek};

use super::columns::{ColumnProfile, summarize_columns, unique_column_names};
use crate::error::{DocprocError, Result};
use crate::types::{CellValue, Record, SheetData, SheetInfo, SheetStats, WorkbookStats};

/// Share of text cells the first row must exceed to be a header.
const HEADER_TEXT_RATIO: f64 = 0.6;
/// Numeric cells in the second row must exceed this fraction of the header's text cells.
const HEADER_NUMBER_RATIO: f64 = 0.5;

/// All sheets of a workbook plus workbook-wide flags.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub sheets: Vec<SheetData>,
    pub has_formulas: bool,
    pub has_merged_cells: bool,
}

impl Workbook {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Data rows summed over all sheets.
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.statistics.data_rows).sum()
    }

    /// Widest sheet, in columns.
    pub fn max_columns(&self) -> usize {
        self.sheets.iter().map(|s| s.statistics.column_count).max().unwrap_or(0)
    }

    pub fn sheets_info(&self) -> Vec<SheetInfo> {
        self.sheets
            .iter()
            .map(|sheet| SheetInfo {
                name: sheet.sheet_name.clone(),
                index: sheet.sheet_index,
                row_count: sheet.statistics.data_rows,
                column_count: sheet.statistics.column_count,
                has_data: sheet.statistics.has_data,
            })
            .collect()
    }

    pub fn statistics(&self) -> WorkbookStats {
        WorkbookStats {
            total_sheets: self.sheet_count(),
            total_rows: self.total_rows(),
            total_cells: self.sheets.iter().map(|s| s.statistics.total_cells).sum(),
            sheets_info: self.sheets_info(),
            has_formulas: self.has_formulas,
            has_merged_cells: self.has_merged_cells,
        }
    }
}

/// Read a workbook from memory.
///
/// # Errors
///
/// Returns `DocprocError::Parsing` when the bytes are neither a readable XLSX
/// nor a readable XLS workbook, or when a sheet cannot be decoded.
pub fn read_workbook(bytes: &[u8]) -> Result<Workbook> {
    let xlsx_error = match Xlsx::new(Cursor::new(bytes)) {
        Ok(workbook) => return process_workbook(workbook),
        Err(e) => e,
    };

    tracing::debug!(error = %xlsx_error, "Not an XLSX workbook, trying XLS");

    match Xls::new(Cursor::new(bytes)) {
        Ok(workbook) => process_workbook(workbook),
        Err(xls_error) => Err(DocprocError::parsing(format!(
            "Failed to open workbook as XLSX ({}) or XLS ({})",
            xlsx_error, xls_error
        ))),
    }
}

/// Merged-region lookup, which calamine exposes per workbook type.
trait MergedRegions {
    fn merged_region_count(&mut self, sheet: &str) -> usize;
}

impl<RS: Read + Seek> MergedRegions for Xlsx<RS> {
    fn merged_region_count(&mut self, sheet: &str) -> usize {
        match self.worksheet_merge_cells(sheet) {
            Some(Ok(regions)) => regions.len(),
            Some(Err(e)) => {
                tracing::debug!(sheet, error = %e, "Could not read merged regions");
                0
            }
            None => 0,
        }
    }
}

impl<RS: Read + Seek> MergedRegions for Xls<RS> {
    fn merged_region_count(&mut self, sheet: &str) -> usize {
        self.worksheet_merge_cells(sheet).map_or(0, |regions| regions.len())
    }
}

fn process_workbook<RS, R>(mut workbook: R) -> Result<Workbook>
where
    RS: Read + Seek,
    R: Reader<RS> + MergedRegions,
    calamine::Error: From<R::Error>,
{
    let sheet_names = workbook.sheet_names();
    let mut sheets = Vec::with_capacity(sheet_names.len());
    let mut has_formulas = false;
    let mut has_merged_cells = false;

    for (index, name) in sheet_names.iter().enumerate() {
        let values = workbook
            .worksheet_range(name)
            .map_err(|e| DocprocError::from(calamine::Error::from(e)))?;
        let formulas = match workbook.worksheet_formula(name) {
            Ok(formulas) => formulas,
            Err(e) => {
                tracing::debug!(sheet = %name, error = %calamine::Error::from(e), "Formulas unavailable");
                Range::empty()
            }
        };
        let merged = workbook.merged_region_count(name);

        let grid = SheetGrid::new(&values, &formulas);
        has_formulas |= grid.has_formulas;
        has_merged_cells |= merged > 0;

        sheets.push(grid.into_sheet(name, index, merged));
    }

    Ok(Workbook {
        sheets,
        has_formulas,
        has_merged_cells,
    })
}

/// How a cell counts for header detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Text,
    Number,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
struct GridCell {
    kind: CellKind,
    value: CellValue,
}

/// A sheet's used area in absolute coordinates: rows from the first used row,
/// columns from column A.
#[derive(Debug, Default)]
struct SheetGrid {
    rows: Vec<Vec<Option<GridCell>>>,
    column_count: usize,
    has_formulas: bool,
}

impl SheetGrid {
    fn new(values: &Range<Data>, formulas: &Range<String>) -> Self {
        let has_formulas = formulas.used_cells().any(|(_, _, f)| !f.is_empty());

        let Some((first_row, last_row, last_col)) = used_bounds(values, formulas) else {
            return Self {
                has_formulas,
                ..Default::default()
            };
        };

        let rows = (first_row..=last_row)
            .map(|row| {
                (0..=last_col)
                    .map(|col| {
                        let value = values.get_value((row, col));
                        let formula = formulas.get_value((row, col)).filter(|f| !f.is_empty());
                        grid_cell(value, formula.map(String::as_str))
                    })
                    .collect()
            })
            .collect();

        Self {
            rows,
            column_count: last_col as usize + 1,
            has_formulas,
        }
    }

    #[cfg(test)]
    fn from_rows(rows: Vec<Vec<Option<GridCell>>>) -> Self {
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            rows,
            column_count,
            has_formulas: false,
        }
    }

    fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.rows.get(row).and_then(|r| r.get(col)).and_then(Option::as_ref)
    }

    /// Header when the first row is mostly text and the second row carries
    /// enough plain numbers.
    fn detect_headers(&self) -> bool {
        if self.rows.len() < 2 || self.column_count == 0 {
            return false;
        }

        let mut present = 0usize;
        let mut text = 0usize;
        let mut numbers = 0usize;

        for col in 0..self.column_count {
            if let Some(cell) = self.cell(0, col) {
                present += 1;
                if cell.kind == CellKind::Text {
                    text += 1;
                }
            }
            if self.cell(1, col).is_some_and(|c| c.kind == CellKind::Number) {
                numbers += 1;
            }
        }

        present > 0
            && text as f64 / present as f64 > HEADER_TEXT_RATIO
            && numbers as f64 > text as f64 * HEADER_NUMBER_RATIO
    }

    fn into_sheet(self, name: &str, index: usize, merged_cells: usize) -> SheetData {
        if self.rows.is_empty() {
            return SheetData {
                sheet_name: name.to_string(),
                sheet_index: index,
                has_data: false,
                has_headers: false,
                headers: Vec::new(),
                data: Vec::new(),
                statistics: SheetStats {
                    sheet_name: name.to_string(),
                    ..Default::default()
                },
            };
        }

        let has_headers = self.detect_headers();
        tracing::debug!(sheet = name, has_headers, columns = self.column_count, "Detected sheet layout");

        let headers = if has_headers {
            let header_text: Vec<Option<String>> = (0..self.column_count)
                .map(|col| self.cell(0, col).map(|c| c.value.to_string()))
                .collect();
            unique_column_names(header_text.iter().enumerate().map(|(col, text)| (col, text.as_deref())))
        } else {
            (1..=self.column_count).map(|i| format!("Column_{}", i)).collect()
        };

        let data_start = usize::from(has_headers);
        let data: Vec<Record> = self.rows[data_start..]
            .iter()
            .filter(|row| row.iter().any(Option::is_some))
            .map(|row| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(col, header)| {
                        let value = row
                            .get(col)
                            .and_then(Option::as_ref)
                            .map(|c| c.value.clone())
                            .unwrap_or(CellValue::Null);
                        (header.clone(), value)
                    })
                    .collect()
            })
            .collect();

        let statistics = sheet_statistics(name, &headers, &data, has_headers, merged_cells);

        SheetData {
            sheet_name: name.to_string(),
            sheet_index: index,
            has_data: true,
            has_headers,
            headers,
            data,
            statistics,
        }
    }
}

/// First row, last row and last column covered by either values or formulas.
fn used_bounds(values: &Range<Data>, formulas: &Range<String>) -> Option<(u32, u32, u32)> {
    let bounds = |start: Option<(u32, u32)>, end: Option<(u32, u32)>| start.zip(end);

    match (
        bounds(values.start(), values.end()),
        bounds(formulas.start(), formulas.end()),
    ) {
        (Some((vs, ve)), Some((fs, fe))) => Some((vs.0.min(fs.0), ve.0.max(fe.0), ve.1.max(fe.1))),
        (Some((start, end)), None) | (None, Some((start, end))) => Some((start.0, end.0, end.1)),
        (None, None) => None,
    }
}

/// Combine a cached value with its formula, if any. `None` is an empty cell.
fn grid_cell(value: Option<&Data>, formula: Option<&str>) -> Option<GridCell> {
    let cached = value.and_then(coerce_cell);

    match (cached, formula) {
        (Some((value, kind)), None) => Some(GridCell { kind, value }),
        // formula cells never count as text or numbers for header detection
        (Some((value, _)), Some(_)) => Some(GridCell {
            kind: CellKind::Other,
            value,
        }),
        (None, Some(formula)) => Some(GridCell {
            kind: CellKind::Other,
            value: CellValue::Text(format!("[Formula: {}]", formula)),
        }),
        (None, None) => None,
    }
}

/// Convert one calamine value. Blank and error cells have no value.
fn coerce_cell(data: &Data) -> Option<(CellValue, CellKind)> {
    let coerced = match data {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => (CellValue::Text(s.clone()), CellKind::Text),
        Data::Int(i) => (CellValue::Integer(*i), CellKind::Number),
        Data::Float(f) => (number_value(*f), CellKind::Number),
        Data::Bool(b) => (CellValue::Boolean(*b), CellKind::Other),
        Data::DateTime(dt) => {
            let value = dt
                .as_datetime()
                .map(CellValue::DateTime)
                .unwrap_or_else(|| number_value(dt.as_f64()));
            (value, CellKind::Other)
        }
        Data::DateTimeIso(s) => {
            let value = s
                .parse::<chrono::NaiveDateTime>()
                .map(CellValue::DateTime)
                .or_else(|_| {
                    s.parse::<chrono::NaiveDate>()
                        .map(|d| CellValue::DateTime(d.and_time(chrono::NaiveTime::MIN)))
                })
                .unwrap_or_else(|_| CellValue::Text(s.clone()));
            (value, CellKind::Other)
        }
        Data::DurationIso(s) => (CellValue::Text(s.clone()), CellKind::Other),
    };
    Some(coerced)
}

/// Integral finite floats become integers.
fn number_value(value: f64) -> CellValue {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        CellValue::Integer(value as i64)
    } else {
        CellValue::Decimal(value)
    }
}

fn sheet_statistics(
    name: &str,
    headers: &[String],
    data: &[Record],
    has_headers: bool,
    merged_cells: usize,
) -> SheetStats {
    let total_cells = data.len() * headers.len();
    let cells_with_data = data
        .iter()
        .flat_map(|row| row.values())
        .filter(|v| !v.is_null())
        .count();

    SheetStats {
        sheet_name: name.to_string(),
        has_data: !data.is_empty(),
        has_headers,
        data_rows: data.len(),
        column_count: headers.len(),
        total_cells,
        cells_with_data,
        empty_cells: total_cells - cells_with_data,
        data_completeness: if total_cells > 0 {
            cells_with_data as f64 / total_cells as f64
        } else {
            0.0
        },
        column_statistics: summarize_columns(headers, data, ColumnProfile::Spreadsheet),
        merged_cells_count: merged_cells,
    }
}
