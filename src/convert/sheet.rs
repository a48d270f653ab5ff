//! Spreadsheets (.xlsx, .xls) through calamine.

use crate::error::Result;
use crate::model::{Document, Section, Table};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::debug;

/// Reads every non-empty sheet as a titled section holding one table.
pub fn parse(path: &Path) -> Result<Document> {
    let mut workbook = open_workbook_auto(path)?;
    let mut document = Document::new();

    let names = workbook.sheet_names().to_owned();
    for (index, name) in names.iter().enumerate() {
        let range = match workbook.worksheet_range(name) {
            Ok(range) => range,
            Err(err) => {
                debug!(sheet = %name, error = %err, "skipping unreadable sheet");
                continue;
            }
        };

        let table = range_to_table(&range);
        if table.is_blank() {
            continue;
        }

        let mut section = Section::titled(index, name.as_str());
        section.push_table(table);
        document.sections.push(section);
    }

    Ok(document)
}

/// Converts a cell range into a table; the first row becomes the header.
pub fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    // Trailing blank rows come from formatted but empty cells
    while rows
        .last()
        .is_some_and(|row| row.iter().all(|c| c.trim().is_empty()))
    {
        rows.pop();
    }

    Table::from_rows(rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        _ => cell.to_string(),
    }
}
