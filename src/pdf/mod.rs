//! PDF text extraction with an ordered fallback chain.
//!
//! Each [`PdfExtractor`] turns a file into pages. [`extract_with_fallback`]
//! tries them in order and keeps the first one whose rendered Markdown has
//! text. Errors and panics inside an extractor only fail that method.

pub mod layout;
pub mod plain;
pub mod tables;

pub use layout::LayoutExtractor;
pub use plain::PlainExtractor;
pub use tables::{detect_tables, split_cells, PdfTable};

use crate::error::{Error, Result};
use crate::render::pipe_row;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, warn};

/// Timestamp format of the report header.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One extracted page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PdfPage {
    /// 1-based page number
    pub number: usize,
    /// Page text as returned by the extractor
    pub text: String,
    /// Tables detected on the page
    pub tables: Vec<PdfTable>,
}

/// A PDF text extraction method.
pub trait PdfExtractor {
    /// Name written to the report and the batch summary.
    fn method(&self) -> &'static str;

    /// Extracts every page of the file.
    fn extract(&self, path: &Path) -> Result<Vec<PdfPage>>;
}

/// Result of a successful extraction chain.
#[derive(Debug, Clone, Serialize)]
pub struct PdfExtraction {
    /// Method that produced the text
    pub method: &'static str,
    /// Rendered page Markdown
    pub text: String,
    /// Number of pages the winning method saw
    pub page_count: usize,
    /// `"<method>: <error>"` for each method that failed first
    pub failures: Vec<String>,
}

/// The table-aware extractor followed by the text-only one.
pub fn default_extractors() -> Vec<Box<dyn PdfExtractor>> {
    vec![Box::new(LayoutExtractor), Box::new(PlainExtractor)]
}

/// Renders pages as Markdown.
///
/// Pages with text get a `## Page i/n` heading; tables follow under
/// `### Tables`, even on pages whose text is empty.
pub fn render_pages(pages: &[PdfPage]) -> String {
    let total = pages.len();
    let mut output = String::new();

    for page in pages {
        let text = page.text.trim_end();
        if !text.trim().is_empty() {
            output.push_str(&format!("\n## Page {}/{}\n\n", page.number, total));
            output.push_str(text);
            output.push_str("\n\n");
        }

        if page.tables.is_empty() {
            continue;
        }

        output.push_str("### Tables\n\n");
        for (index, table) in page.tables.iter().enumerate() {
            output.push_str(&format!("**Table {}:**\n\n", index + 1));
            let width = table.iter().map(Vec::len).max().unwrap_or(0);
            for row in table.iter().filter(|row| !row.is_empty()) {
                let mut cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
                cells.resize(width, String::new());
                output.push_str(&pipe_row(&cells));
                output.push('\n');
            }
            output.push('\n');
        }
    }

    output
}

/// Runs the extractors in order until one yields text.
///
/// Fails with [`Error::AllExtractorsFailed`] listing every attempt.
pub fn extract_with_fallback(
    path: &Path,
    extractors: &[Box<dyn PdfExtractor>],
) -> Result<PdfExtraction> {
    let mut failures = Vec::new();

    for extractor in extractors {
        let method = extractor.method();
        debug!(path = %path.display(), method, "trying extractor");

        let error = match run_guarded(extractor.as_ref(), path) {
            Ok(pages) => {
                let text = render_pages(&pages);
                if !text.trim().is_empty() {
                    return Ok(PdfExtraction {
                        method,
                        text,
                        page_count: pages.len(),
                        failures,
                    });
                }
                Error::EmptyDocument
            }
            Err(err) => err,
        };

        warn!(path = %path.display(), method, error = %error, "extractor failed");
        failures.push(format!("{}: {}", method, error));
    }

    Err(Error::AllExtractorsFailed(failures))
}

/// Calls an extractor, turning a panic into [`Error::ExtractorPanicked`].
fn run_guarded(extractor: &dyn PdfExtractor, path: &Path) -> Result<Vec<PdfPage>> {
    match catch_unwind(AssertUnwindSafe(|| extractor.extract(path))) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(Error::ExtractorPanicked(message))
        }
    }
}

/// Builds the output file: title, method, timestamp, rule, then the text.
pub fn render_report(file_name: &str, extraction: &PdfExtraction, converted: NaiveDateTime) -> String {
    format!(
        "# {}\n\n*Method: {}*\n\n*Converted: {}*\n\n---\n\n{}",
        file_name,
        extraction.method,
        converted.format(TIMESTAMP_FORMAT),
        extraction.text
    )
}
