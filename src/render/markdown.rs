//! Markdown renderer implementation.

use super::RenderOptions;
use crate::error::Result;
use crate::model::{Block, Document, InlineContent, ListStyle, Paragraph, Table, TextRun};

/// Maximum character length for a heading.
/// Text longer than this is unlikely to be a semantic heading.
const MAX_HEADING_TEXT_LENGTH: usize = 120;

/// Markdown renderer.
#[derive(Debug)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Creates a new renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Renders a document to Markdown string.
    pub fn render(&self, document: &Document) -> Result<String> {
        let mut output = String::new();

        for section in &document.sections {
            if let Some(ref title) = section.title {
                let level = self
                    .options
                    .section_heading_level
                    .min(self.options.max_heading_level);
                output.push_str(&"#".repeat(level as usize));
                output.push(' ');
                output.push_str(title.trim());
                output.push_str("\n\n");
            }

            for block in &section.content {
                match block {
                    Block::Paragraph(para) => self.render_paragraph(para, &mut output),
                    Block::Table(table) => self.render_table(table, &mut output),
                }
            }
        }

        if let Some(ref cleanup_options) = self.options.cleanup {
            output = crate::cleanup::cleanup(&output, cleanup_options);
        }

        Ok(output)
    }

    /// Renders a paragraph.
    fn render_paragraph(&self, para: &Paragraph, output: &mut String) {
        if !para.has_text_content() {
            return;
        }

        let style = &para.style;
        let text_too_long = para.plain_text().trim().chars().count() > MAX_HEADING_TEXT_LENGTH;

        if style.heading_level > 0 && style.list_style.is_none() && !text_too_long {
            let level = style.heading_level.min(self.options.max_heading_level);
            output.push_str(&"#".repeat(level as usize));
            output.push(' ');
        }

        if let Some(ref list_style) = style.list_style {
            output.push_str(&"  ".repeat(style.indent_level as usize));
            match list_style {
                ListStyle::Ordered => output.push_str("1. "),
                ListStyle::Unordered => {
                    output.push(self.options.list_marker);
                    output.push(' ');
                }
            }
        }

        for item in &para.content {
            self.render_inline(item, output);
        }

        output.push('\n');
        if self.options.paragraph_spacing {
            output.push('\n');
        }
    }

    /// Renders inline content.
    fn render_inline(&self, item: &InlineContent, output: &mut String) {
        match item {
            InlineContent::Text(run) => self.render_text_run(run, output),
            InlineContent::LineBreak => {
                if self.options.preserve_line_breaks {
                    // Backslash hard break survives trailing-whitespace cleanup
                    output.push_str("\\\n");
                } else {
                    output.push(' ');
                }
            }
            InlineContent::Link { text, url } => {
                output.push_str(&format!("[{}]({})", text, url));
            }
        }
    }

    /// Renders a text run with formatting.
    fn render_text_run(&self, run: &TextRun, output: &mut String) {
        let style = &run.style;

        // Markers around surrounding whitespace would not parse as emphasis
        let trimmed = run.text.trim();
        if trimmed.is_empty() || !style.has_formatting() {
            output.push_str(&run.text);
            return;
        }

        let leading = &run.text[..run.text.len() - run.text.trim_start().len()];
        let trailing = &run.text[run.text.trim_end().len()..];

        let mut prefix = String::new();
        let mut suffix = String::new();

        if style.bold {
            prefix.push_str("**");
            suffix.insert_str(0, "**");
        }
        if style.italic {
            prefix.push('*');
            suffix.insert(0, '*');
        }
        if style.strikethrough {
            prefix.push_str("~~");
            suffix.insert_str(0, "~~");
        }

        output.push_str(leading);
        output.push_str(&prefix);
        output.push_str(trimmed);
        output.push_str(&suffix);
        output.push_str(trailing);
    }

    /// Renders a table as a pipe table, padding short rows.
    fn render_table(&self, table: &Table, output: &mut String) {
        if table.rows.is_empty() || table.is_blank() {
            return;
        }

        let width = table.column_count();

        for (row_idx, row) in table.rows.iter().enumerate() {
            let mut cells: Vec<String> = row
                .cells
                .iter()
                .map(|cell| sanitize_cell(&cell.text))
                .collect();
            cells.resize(width, String::new());
            output.push_str(&pipe_row(&cells));
            output.push('\n');

            if row_idx == 0 && self.options.table_header_separator {
                output.push_str(&pipe_row(&vec!["---".to_string(); width]));
                output.push('\n');
            }
        }

        output.push('\n');
    }
}

/// Formats cells as one `| a | b |` line.
pub fn pipe_row<S: AsRef<str>>(cells: &[S]) -> String {
    let mut line = String::from("|");
    for cell in cells {
        line.push(' ');
        line.push_str(cell.as_ref());
        line.push_str(" |");
    }
    line
}

/// Flattens cell text to a single line and escapes pipes.
fn sanitize_cell(text: &str) -> String {
    text.trim()
        .replace('|', "\\|")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParagraphStyle, Section, TextStyle};

    fn render(doc: &Document) -> String {
        MarkdownRenderer::new(RenderOptions::default())
            .render(doc)
            .unwrap()
    }

    #[test]
    fn test_render_simple_paragraph() {
        let mut doc = Document::new();
        let mut section = Section::new(0);
        section.push_paragraph(Paragraph::text("Hello, world!"));
        doc.sections.push(section);

        assert_eq!(render(&doc), "Hello, world!");
    }

    #[test]
    fn test_render_heading() {
        let mut doc = Document::new();
        let mut section = Section::new(0);
        section.push_paragraph(Paragraph::heading(2, "Section Title"));
        section.push_paragraph(Paragraph::text("Body"));
        doc.sections.push(section);

        assert_eq!(render(&doc), "## Section Title\n\nBody");
    }

    #[test]
    fn test_render_section_title() {
        let mut doc = Document::new();
        let mut section = Section::titled(0, "Slide 1");
        section.push_paragraph(Paragraph::text("Point"));
        doc.sections.push(section);

        assert!(render(&doc).starts_with("## Slide 1\n\nPoint"));
    }

    #[test]
    fn test_render_bold_text_keeps_outer_spaces() {
        let mut doc = Document::new();
        let mut section = Section::new(0);
        let mut para = Paragraph::new();
        para.push_text(TextRun::new("a"));
        para.push_text(TextRun::with_style(" bold ", TextStyle::bold()));
        para.push_text(TextRun::new("b"));
        section.push_paragraph(para);
        doc.sections.push(section);

        assert_eq!(render(&doc), "a **bold** b");
    }

    #[test]
    fn test_render_table_pads_short_rows() {
        let mut doc = Document::new();
        let mut section = Section::new(0);
        section.push_table(Table::from_rows(vec![
            vec!["Name", "Qty"],
            vec!["apple"],
        ]));
        doc.sections.push(section);

        assert_eq!(
            render(&doc),
            "| Name | Qty |\n| --- | --- |\n| apple |  |"
        );
    }

    #[test]
    fn test_table_cell_pipes_escaped() {
        let mut doc = Document::new();
        let mut section = Section::new(0);
        section.push_table(Table::from_rows(vec![vec!["a|b", "line1\nline2"]]));
        doc.sections.push(section);

        let out = render(&doc);
        assert!(out.contains("a\\|b"), "{}", out);
        assert!(out.contains("line1<br>line2"), "{}", out);
    }

    #[test]
    fn test_empty_paragraph_skipped() {
        let mut doc = Document::new();
        let mut section = Section::new(0);
        section.push_paragraph(Paragraph::with_style(ParagraphStyle::heading(3)));
        section.push_paragraph(Paragraph::text("Normal content"));
        doc.sections.push(section);

        let result = render(&doc);
        assert!(!result.contains("###"), "{}", result);
        assert!(result.contains("Normal content"));
    }

    #[test]
    fn test_list_item() {
        let mut doc = Document::new();
        let mut section = Section::new(0);
        let mut para = Paragraph::with_style(ParagraphStyle::list(ListStyle::Unordered, 1));
        para.push_text(TextRun::new("nested"));
        section.push_paragraph(para);
        doc.sections.push(section);

        assert_eq!(render(&doc), "  - nested");
    }

    #[test]
    fn test_max_heading_level_capped() {
        let mut doc = Document::new();
        let mut section = Section::new(0);
        section.push_paragraph(Paragraph::heading(6, "Deep Heading"));
        doc.sections.push(section);

        let options = RenderOptions::default().with_max_heading_level(4);
        let result = MarkdownRenderer::new(options).render(&doc).unwrap();
        assert_eq!(result, "#### Deep Heading");
    }

    #[test]
    fn test_pipe_row() {
        assert_eq!(pipe_row(&["a", "", "c"]), "| a |  | c |");
    }
}
