//! Row shaping for the sheet proxy: header-row-to-field mapping for the
//! container lookup and hidden-row filtering for the tab pass-through.
//! Pure functions over already-fetched cell data; no network.

use serde::Serialize;
use std::fmt;

/// Row 2 of every tab is the column header row.
pub const HEADER_ROW_INDEX: usize = 1;

/// One fetched grid row: formatted cell values plus the user-hidden flag.
#[derive(Debug, Clone, Default)]
pub struct GridRow {
    pub cells: Vec<String>,
    pub hidden: bool,
}

impl GridRow {
    pub fn new<S: Into<String>>(cells: Vec<S>) -> Self {
        GridRow {
            cells: cells.into_iter().map(Into::into).collect(),
            hidden: false,
        }
    }

    pub fn hidden<S: Into<String>>(cells: Vec<S>) -> Self {
        GridRow {
            hidden: true,
            ..GridRow::new(cells)
        }
    }
}

/// Shaped payload for `GET /api/tab`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Why a tab could not be shaped. All variants surface as 404 with a
/// message naming what was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabError {
    NoData,
    MissingHeaderRow,
    EmptyHeader,
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            TabError::NoData => "No data in this tab",
            TabError::MissingHeaderRow => "Row 2 (header row) not found in this tab",
            TabError::EmptyHeader => "Row 2 (header row) is empty in this tab",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for TabError {}

/// Find the row matching a container number (first column) and, when given,
/// a shipping line (second column). Comparisons are trimmed and uppercased.
///
/// Returns the matched row as an object keyed by the header row (row 1 of
/// the range), with all whitespace stripped from header names and unnamed
/// columns skipped. Missing cells become empty strings.
pub fn match_container(
    rows: &[Vec<String>],
    number: &str,
    line: &str,
) -> Option<serde_json::Map<String, serde_json::Value>> {
    let header = rows.first()?;
    let number = number.trim().to_uppercase();
    let line = line.trim().to_uppercase();

    let matched = rows.iter().skip(1).find(|row| {
        let row_container = cell(row, 0).trim().to_uppercase();
        let row_line = cell(row, 1).trim().to_uppercase();
        row_container == number && (line.is_empty() || row_line == line)
    })?;

    let mut result = serde_json::Map::new();
    for (idx, name) in header.iter().enumerate() {
        let key: String = name.split_whitespace().collect();
        if key.is_empty() {
            continue;
        }
        result.insert(key, serde_json::Value::String(cell(matched, idx).to_string()));
    }
    Some(result)
}

/// Shape a fetched tab: row 2 is the header, later rows are data, rows
/// hidden by the user are dropped, and every data row is padded or truncated
/// to the header width.
pub fn tab_view(rows: &[GridRow]) -> Result<TabView, TabError> {
    if rows.is_empty() {
        return Err(TabError::NoData);
    }

    let header_row = rows.get(HEADER_ROW_INDEX).ok_or(TabError::MissingHeaderRow)?;
    let header = header_row.cells.clone();
    if header.is_empty() {
        return Err(TabError::EmptyHeader);
    }

    let data_rows = rows
        .iter()
        .skip(HEADER_ROW_INDEX + 1)
        .filter(|row| !row.hidden)
        .map(|row| {
            (0..header.len())
                .map(|idx| cell(&row.cells, idx).to_string())
                .collect()
        })
        .collect();

    Ok(TabView {
        header,
        rows: data_rows,
    })
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}
