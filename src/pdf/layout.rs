//! Table-aware extraction with `pdf-extract`.

use super::{detect_tables, PdfExtractor, PdfPage};
use crate::error::Result;
use std::path::Path;

/// Per-page text from `pdf-extract` plus column-aligned table detection.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayoutExtractor;

impl PdfExtractor for LayoutExtractor {
    fn method(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, path: &Path) -> Result<Vec<PdfPage>> {
        let pages = pdf_extract::extract_text_by_pages(path)?;

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                let tables = detect_tables(&text);
                PdfPage {
                    number: index + 1,
                    text,
                    tables,
                }
            })
            .collect())
    }
}
