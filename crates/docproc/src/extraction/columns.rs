//! Per-column statistics over extracted rows.

use crate::types::{CellValue, ColumnStats, Record};
use ahash::AHashSet;
use indexmap::IndexMap;

/// Which counts a column summary carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnProfile {
    /// Type-tagged counts and distinct values.
    Csv,
    /// CSV counts plus date counts and min/max/average/sum over numbers.
    Spreadsheet,
}

static NULL_CELL: CellValue = CellValue::Null;

/// Column names from `(column index, raw header)` pairs.
///
/// Blank or missing headers become `Column_{index + 1}`. Repeated names get a
/// `_2`, `_3`, ... suffix so every column keeps its own key.
pub(crate) fn unique_column_names<'a>(headers: impl IntoIterator<Item = (usize, Option<&'a str>)>) -> Vec<String> {
    let mut seen = AHashSet::new();
    headers
        .into_iter()
        .map(|(index, raw)| {
            let base = match raw.map(str::trim) {
                Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
                _ => format!("Column_{}", index + 1),
            };

            let mut name = base.clone();
            let mut suffix = 2;
            while !seen.insert(name.clone()) {
                name = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}

pub(crate) fn summarize_columns(
    columns: &[String],
    rows: &[Record],
    profile: ColumnProfile,
) -> IndexMap<String, ColumnStats> {
    columns
        .iter()
        .map(|column| (column.clone(), summarize_column(column, rows, profile)))
        .collect()
}

fn summarize_column(column: &str, rows: &[Record], profile: ColumnProfile) -> ColumnStats {
    let values: Vec<&CellValue> = rows
        .iter()
        .map(|row| row.get(column).unwrap_or(&NULL_CELL))
        .collect();

    let non_null: Vec<&CellValue> = values.iter().copied().filter(|v| !v.is_null()).collect();
    let mut stats = ColumnStats {
        non_null_count: non_null.len(),
        null_count: values.len() - non_null.len(),
        ..Default::default()
    };

    if non_null.is_empty() {
        return stats;
    }

    let numbers: Vec<f64> = non_null.iter().filter_map(|v| v.as_f64()).collect();
    let count = |pred: fn(&CellValue) -> bool| non_null.iter().filter(|v| pred(v)).count();

    stats.number_count = Some(numbers.len());
    stats.boolean_count = Some(count(|v| matches!(v, CellValue::Boolean(_))));
    stats.string_count = Some(count(|v| matches!(v, CellValue::Text(_))));
    stats.unique_values = Some(
        non_null
            .iter()
            .map(|v| v.distinct_key())
            .collect::<AHashSet<_>>()
            .len(),
    );

    if profile == ColumnProfile::Spreadsheet {
        stats.date_count = Some(count(|v| matches!(v, CellValue::DateTime(_))));

        if !numbers.is_empty() {
            let sum: f64 = numbers.iter().sum();
            stats.min = numbers.iter().copied().reduce(f64::min);
            stats.max = numbers.iter().copied().reduce(f64::max);
            stats.sum = Some(sum);
            stats.average = Some(sum / numbers.len() as f64);
        }
    }

    stats
}
