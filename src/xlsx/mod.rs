//! Index sheet generation for OOXML workbooks.
//!
//! [`add_index_sheet`] opens a workbook, writes a sheet whose column A lists
//! every other sheet with an in-document hyperlink to its cell A1, and saves
//! the workbook in place.
//!
//! ```no_run
//! use officemd::xlsx::{add_index_sheet, IndexOptions};
//!
//! let summary = add_index_sheet("book.xlsx", &IndexOptions::default())?;
//! println!("{} entries", summary.entries);
//! # Ok::<(), officemd::Error>(())
//! ```

pub mod sheet;
pub mod styles;
pub mod workbook;

pub use workbook::{SheetRef, Workbook};

use crate::error::Result;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Default name of the generated sheet.
pub const DEFAULT_INDEX_SHEET: &str = "Index";

/// Options for index generation.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Name of the index sheet
    pub sheet_name: String,
    /// Quote sheet names in link targets when they need it
    pub quote_targets: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_INDEX_SHEET.to_string(),
            quote_targets: false,
        }
    }
}

impl IndexOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the index sheet name.
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Enables quoting of sheet names such as `'My Sheet'!A1`.
    pub fn with_quoted_targets(mut self, quote: bool) -> Self {
        self.quote_targets = quote;
        self
    }
}

/// What [`Workbook::write_index`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    /// Name of the index sheet
    pub sheet_name: String,
    /// True when the sheet was added, false when an existing one was refreshed
    pub created: bool,
    /// Number of rows written
    pub entries: usize,
}

/// A row read back from an index sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// 1-based row number
    pub row: u32,
    /// Column A text
    pub text: String,
    /// In-document hyperlink location, without the leading `#`
    pub location: Option<String>,
}

/// Adds or refreshes the index sheet of the workbook at `path` and saves it.
pub fn add_index_sheet(path: impl AsRef<Path>, options: &IndexOptions) -> Result<IndexSummary> {
    let path = path.as_ref();
    debug!(path = %path.display(), "indexing workbook");

    let mut workbook = Workbook::open(path)?;
    let summary = workbook.write_index(options)?;
    workbook.save(path)?;
    Ok(summary)
}

/// Hyperlink target for cell A1 of a sheet, e.g. `#Data!A1`.
pub fn hyperlink_target(sheet_name: &str, quote: bool) -> String {
    format!("#{}", sheet_reference(sheet_name, quote))
}

/// Cell reference `Name!A1`, quoted as `'My Sheet'!A1` when asked and needed.
pub fn sheet_reference(sheet_name: &str, quote: bool) -> String {
    if quote && needs_quotes(sheet_name) {
        format!("'{}'!A1", sheet_name.replace('\'', "''"))
    } else {
        format!("{}!A1", sheet_name)
    }
}

fn needs_quotes(name: &str) -> bool {
    let starts_with_digit = name.chars().next().is_some_and(|c| c.is_ascii_digit());
    starts_with_digit || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyperlink_target_verbatim() {
        assert_eq!(hyperlink_target("Data", false), "#Data!A1");
        assert_eq!(hyperlink_target("My Sheet", false), "#My Sheet!A1");
    }

    #[test]
    fn test_hyperlink_target_quoted() {
        assert_eq!(hyperlink_target("Data", true), "#Data!A1");
        assert_eq!(hyperlink_target("My Sheet", true), "#'My Sheet'!A1");
        assert_eq!(hyperlink_target("Bob's", true), "#'Bob''s'!A1");
        assert_eq!(hyperlink_target("2024", true), "#'2024'!A1");
    }

    #[test]
    fn test_options_builder() {
        let options = IndexOptions::new()
            .with_sheet_name("Contents")
            .with_quoted_targets(true);
        assert_eq!(options.sheet_name, "Contents");
        assert!(options.quote_targets);
    }
}
