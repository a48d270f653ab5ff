//! # officemd
//!
//! Office document utilities: hyperlinked index sheets for spreadsheet
//! workbooks, and batch conversion of documents and PDFs to Markdown.
//!
//! ## Supported Formats
//!
//! - **DOCX / PPTX / XLSX**: OOXML packages (ZIP containers)
//! - **DOC / PPT**: Office 97-2003 binaries (OLE containers), text only
//! - **XLS**: read through `calamine`
//! - **PDF**: page text from a table-aware extractor with a text-only fallback
//! - **HTML / TXT**
//!
//! ## Quick Start
//!
//! ```no_run
//! use officemd::{convert_file, ConvertOptions};
//!
//! fn main() -> officemd::Result<()> {
//!     let conversion = convert_file("report.docx", &ConvertOptions::default())?;
//!     println!("{}", conversion.markdown);
//!     Ok(())
//! }
//! ```
//!
//! Adding an index sheet to a workbook:
//!
//! ```no_run
//! use officemd::xlsx::{add_index_sheet, IndexOptions};
//!
//! let summary = add_index_sheet("book.xlsx", &IndexOptions::default())?;
//! assert_eq!(summary.sheet_name, "Index");
//! # Ok::<(), officemd::Error>(())
//! ```

pub mod batch;
pub mod cleanup;
pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod naming;
pub mod package;
pub mod pdf;
pub mod rename;
pub mod render;
pub mod xlsx;
pub mod xml;

// Re-exports
pub use batch::{BatchReport, FileOutcome, Outcome};
pub use cleanup::{cleanup, CleanupOptions};
pub use convert::{convert_file, Conversion, ConvertOptions};
pub use detect::{detect_container_from_bytes, detect_container_from_path, Container, FormatType};
pub use error::{Error, Result};
pub use model::Document;
pub use naming::{next_free_name, next_free_path};
pub use pdf::{PdfExtraction, PdfExtractor, PdfPage};
pub use render::RenderOptions;
pub use xlsx::{add_index_sheet, IndexOptions, IndexSummary};

use std::path::Path;

/// Parses an office or text document into the document model.
///
/// The format is chosen by extension. PDF and HTML files have no model and
/// are rejected; use [`convert_file`] for those.
///
/// # Example
///
/// ```no_run
/// let document = officemd::parse_file("slides.pptx")?;
/// println!("Sections: {}", document.sections.len());
/// # Ok::<(), officemd::Error>(())
/// ```
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let format = FormatType::from_path(path).ok_or(Error::UnknownFormat)?;
    convert::to_document(path, format)
}

/// Converts a file to Markdown with default options.
pub fn to_markdown(path: impl AsRef<Path>) -> Result<String> {
    Ok(convert_file(path, &ConvertOptions::default())?.markdown)
}

/// Converts a file to Markdown with custom render options.
pub fn to_markdown_with_options(path: impl AsRef<Path>, options: &RenderOptions) -> Result<String> {
    let options = ConvertOptions::default().with_render(options.clone());
    Ok(convert_file(path, &options)?.markdown)
}
