//! Text-only extraction with `lopdf`.

use super::{PdfExtractor, PdfPage};
use crate::error::Result;
use lopdf::Document;
use std::path::Path;

/// Page text from `lopdf::Document::extract_text`; never reports tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainExtractor;

impl PdfExtractor for PlainExtractor {
    fn method(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, path: &Path) -> Result<Vec<PdfPage>> {
        let document = Document::load(path)?;

        let mut pages = Vec::new();
        for (index, (page_number, _)) in document.get_pages().into_iter().enumerate() {
            let text = document.extract_text(&[page_number])?;
            pages.push(PdfPage {
                number: index + 1,
                text,
                tables: Vec::new(),
            });
        }

        Ok(pages)
    }
}
