//! Table structures for document model.

use serde::Serialize;

/// A table in the document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Table {
    /// Table rows
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Creates a table from rows of plain cell text.
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| TableRow {
                    cells: row.into_iter().map(TableCell::text).collect(),
                })
                .collect(),
        }
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the widest row's cell count.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Returns true if no cell has text.
    pub fn is_blank(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.cells.iter().all(|cell| cell.text.trim().is_empty()))
    }

    /// Gets a cell at the specified position.
    pub fn get_cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }
}

/// A row in a table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableRow {
    /// Cells in this row
    pub cells: Vec<TableCell>,
}

/// A cell in a table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableCell {
    /// Cell text; line breaks inside a cell are kept as `\n`
    pub text: String,
}

impl TableCell {
    /// Creates a cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
