//! Document structure and metadata.

use super::{Paragraph, Table};
use serde::Serialize;

/// A document converted from one source file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,
    /// Document sections (pages, slides, sheets, or a single body)
    pub sections: Vec<Section>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of paragraphs in the document.
    pub fn paragraph_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| s.content.iter().filter(|b| matches!(b, Block::Paragraph(_))).count())
            .sum()
    }

    /// Returns the total number of tables in the document.
    pub fn table_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| s.content.iter().filter(|b| matches!(b, Block::Table(_))).count())
            .sum()
    }

    /// Returns true if no block carries any text.
    pub fn is_blank(&self) -> bool {
        self.sections.iter().all(|s| {
            s.content.iter().all(|b| match b {
                Block::Paragraph(p) => !p.has_text_content(),
                Block::Table(t) => t.is_blank(),
            })
        })
    }

    /// Returns the plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        let mut result = Vec::new();
        for section in &self.sections {
            if let Some(ref title) = section.title {
                result.push(title.clone());
            }
            for block in &section.content {
                match block {
                    Block::Paragraph(p) => result.push(p.plain_text()),
                    Block::Table(t) => {
                        for row in &t.rows {
                            let cells: Vec<&str> =
                                row.cells.iter().map(|c| c.text.as_str()).collect();
                            result.push(cells.join("\t"));
                        }
                    }
                }
            }
        }
        result.join("\n")
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Source format name (e.g. "DOCX")
    pub format: Option<String>,
}

/// A section of the document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Section {
    /// Section index (0-based)
    pub index: usize,
    /// Optional section heading (slide number, sheet name)
    pub title: Option<String>,
    /// Content blocks in this section
    pub content: Vec<Block>,
}

impl Section {
    /// Creates a new empty section.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            title: None,
            content: Vec::new(),
        }
    }

    /// Creates a new section with a heading.
    pub fn titled(index: usize, title: impl Into<String>) -> Self {
        Self {
            index,
            title: Some(title.into()),
            content: Vec::new(),
        }
    }

    /// Adds a paragraph to this section.
    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.content.push(Block::Paragraph(paragraph));
    }

    /// Adds a table to this section.
    pub fn push_table(&mut self, table: Table) {
        self.content.push(Block::Table(table));
    }

    /// Returns true if this section has no blocks.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A block-level content element.
#[derive(Debug, Clone, Serialize)]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),
    /// A table
    Table(Table),
}
