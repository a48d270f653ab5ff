//! Table detection on extracted page text.
//!
//! A line is tabular when it splits into two or more cells on tabs or runs
//! of two or more spaces. Consecutive tabular lines with the same cell count
//! form a table; a single such line is just text.

use regex::Regex;
use std::sync::LazyLock;

/// A detected table: rows of cell text.
pub type PdfTable = Vec<Vec<String>>;

/// Tabs (with any surrounding blanks) or two or more whitespace characters.
static CELL_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\t\s*|\s{2,}").expect("valid regex"));

/// Minimum number of consecutive rows for a table.
const MIN_TABLE_ROWS: usize = 2;

/// Splits a line into cells, or `None` when it has fewer than two.
pub fn split_cells(line: &str) -> Option<Vec<String>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cells: Vec<String> = CELL_SEPARATOR
        .split(trimmed)
        .map(|cell| cell.trim().to_string())
        .collect();
    if cells.len() < 2 {
        return None;
    }
    Some(cells)
}

/// Finds the tables in one page of text, in reading order.
pub fn detect_tables(text: &str) -> Vec<PdfTable> {
    let mut tables = Vec::new();
    let mut current: PdfTable = Vec::new();

    for line in text.lines() {
        match split_cells(line) {
            Some(cells) if current.last().is_some_and(|row| row.len() == cells.len()) => {
                current.push(cells);
            }
            Some(cells) => {
                flush(&mut current, &mut tables);
                current.push(cells);
            }
            None => flush(&mut current, &mut tables),
        }
    }
    flush(&mut current, &mut tables);

    tables
}

fn flush(current: &mut PdfTable, tables: &mut Vec<PdfTable>) {
    if current.len() >= MIN_TABLE_ROWS {
        tables.push(std::mem::take(current));
    } else {
        current.clear();
    }
}
