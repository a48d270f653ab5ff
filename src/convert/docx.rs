//! Word 2007+ documents (`word/document.xml`).

use super::core_properties;
use crate::error::Result;
use crate::model::{
    Document, InlineContent, ListStyle, Paragraph, ParagraphStyle, Section, Table, TextRun,
    TextStyle,
};
use crate::package::OoxmlPackage;
use crate::xml::{attr, attr_u32, local_name, local_name_end};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// Parses a `.docx` package into a document.
pub fn parse(package: &mut OoxmlPackage) -> Result<Document> {
    let styles = if package.file_exists(STYLES_PART) {
        parse_heading_styles(&package.read_file(STYLES_PART)?)?
    } else {
        HashMap::new()
    };

    let xml = package.read_file(DOCUMENT_PART)?;
    let section = parse_body(&xml, &styles)?;

    let mut document = Document::new();
    document.metadata = core_properties(package)?;
    document.metadata.format = Some("DOCX".into());
    document.sections.push(section);
    Ok(document)
}

/// Maps paragraph style ids to heading levels.
///
/// A style counts as a heading when its display name (or id) looks like
/// `heading N` or `Title`, or when it sets an outline level.
pub fn parse_heading_styles(xml: &str) -> Result<HashMap<String, u8>> {
    let mut reader = Reader::from_str(xml);
    let mut levels = HashMap::new();

    let mut current_id: Option<String> = None;
    let mut current_level: Option<u8> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if local_name(&e) == "style" => {
                current_id = attr(&e, "styleId");
                current_level = None;
            }
            Event::Start(e) | Event::Empty(e) => match local_name(&e).as_str() {
                "name" => {
                    if current_level.is_none() {
                        current_level = attr(&e, "val")
                            .as_deref()
                            .and_then(heading_level_from_style);
                    }
                }
                "outlineLvl" => {
                    if current_level.is_none() {
                        current_level = attr_u32(&e, "val")
                            .filter(|&lvl| lvl < 9)
                            .map(|lvl| (lvl + 1).min(6) as u8);
                    }
                }
                _ => {}
            },
            Event::End(e) if local_name_end(&e) == "style" => {
                if let Some(id) = current_id.take() {
                    if let Some(level) = current_level
                        .take()
                        .or_else(|| heading_level_from_style(&id))
                    {
                        levels.insert(id, level);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(levels)
}

/// Heading level implied by a style name such as `heading 2` or `Title`.
pub fn heading_level_from_style(style: &str) -> Option<u8> {
    let lowered = style.trim().to_lowercase();
    if lowered == "title" {
        return Some(1);
    }
    let rest = lowered.strip_prefix("heading")?;
    let digits: String = rest.chars().filter(|ch| ch.is_ascii_digit()).collect();
    match digits.parse::<u8>() {
        Ok(level) if (1..=6).contains(&level) => Some(level),
        Ok(_) => Some(6),
        Err(_) if rest.trim().is_empty() => Some(1),
        Err(_) => None,
    }
}

#[derive(Default)]
struct TableBuilder {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
}

#[derive(Default)]
struct BodyParser<'a> {
    styles: Option<&'a HashMap<String, u8>>,
    section: Section,
    tables: Vec<TableBuilder>,

    paragraph: Option<Paragraph>,
    style_id: Option<String>,
    outline_level: Option<u8>,
    numbered: bool,
    list_level: u8,

    in_paragraph_props: bool,
    in_run_props: bool,
    in_text: bool,
    run_style: TextStyle,
}

impl<'a> BodyParser<'a> {
    fn start(&mut self, e: &BytesStart, empty: bool) {
        match local_name(e).as_str() {
            "p" if !empty => {
                self.paragraph = Some(Paragraph::new());
                self.style_id = None;
                self.outline_level = None;
                self.numbered = false;
                self.list_level = 0;
            }
            "pPr" if !empty => self.in_paragraph_props = true,
            "pStyle" => self.style_id = attr(e, "val"),
            "outlineLvl" => {
                self.outline_level = attr_u32(e, "val")
                    .filter(|&lvl| lvl < 9)
                    .map(|lvl| (lvl + 1).min(6) as u8);
            }
            "numPr" => self.numbered = true,
            "ilvl" => self.list_level = attr_u32(e, "val").unwrap_or(0).min(8) as u8,
            "r" if !empty => self.run_style = TextStyle::default(),
            "rPr" if !empty => self.in_run_props = true,
            "b" if self.in_run_props && !self.in_paragraph_props => {
                self.run_style.bold = toggle_on(e);
            }
            "i" if self.in_run_props && !self.in_paragraph_props => {
                self.run_style.italic = toggle_on(e);
            }
            "strike" | "dstrike" if self.in_run_props && !self.in_paragraph_props => {
                self.run_style.strikethrough = toggle_on(e);
            }
            "t" if !empty => self.in_text = true,
            "tab" if !self.in_paragraph_props => self.push_text("\t"),
            "br" | "cr" => {
                if let Some(ref mut para) = self.paragraph {
                    para.push_line_break();
                }
            }
            "tbl" if !empty => self.tables.push(TableBuilder::default()),
            "tr" if !empty => {
                if let Some(table) = self.tables.last_mut() {
                    table.row.clear();
                }
            }
            "tc" if !empty => {
                if let Some(table) = self.tables.last_mut() {
                    table.cell.clear();
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &str) {
        match name {
            "pPr" => self.in_paragraph_props = false,
            "rPr" => self.in_run_props = false,
            "t" => self.in_text = false,
            "p" => self.finish_paragraph(),
            "tc" => {
                if let Some(table) = self.tables.last_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    table.row.push(cell);
                }
            }
            "tr" => {
                if let Some(table) = self.tables.last_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            "tbl" => self.finish_table(),
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        let Some(ref mut para) = self.paragraph else {
            return;
        };
        // Adjacent runs with the same style merge into one
        if let Some(InlineContent::Text(last)) = para.content.last_mut() {
            if last.style == self.run_style {
                last.text.push_str(text);
                return;
            }
        }
        para.push_text(TextRun::with_style(text, self.run_style.clone()));
    }

    fn finish_paragraph(&mut self) {
        let Some(mut para) = self.paragraph.take() else {
            return;
        };

        if let Some(table) = self.tables.last_mut() {
            let text = para.plain_text();
            let text = text.trim();
            if !text.is_empty() {
                if !table.cell.is_empty() {
                    table.cell.push('\n');
                }
                table.cell.push_str(text);
            }
            return;
        }

        let heading = self
            .style_id
            .as_deref()
            .and_then(|id| {
                self.styles
                    .and_then(|styles| styles.get(id).copied())
                    .or_else(|| heading_level_from_style(id))
            })
            .or(self.outline_level);

        para.style = match heading {
            Some(level) => ParagraphStyle::heading(level),
            None if self.numbered => ParagraphStyle::list(ListStyle::Unordered, self.list_level),
            None => ParagraphStyle::default(),
        };

        if para.has_text_content() {
            self.section.push_paragraph(para);
        }
    }

    fn finish_table(&mut self) {
        let Some(table) = self.tables.pop() else {
            return;
        };

        match self.tables.last_mut() {
            // Nested tables flatten into the enclosing cell
            Some(parent) => {
                for row in table.rows {
                    let line = row.join(" ");
                    if !line.trim().is_empty() {
                        if !parent.cell.is_empty() {
                            parent.cell.push('\n');
                        }
                        parent.cell.push_str(line.trim());
                    }
                }
            }
            None => {
                let table = Table::from_rows(table.rows);
                if !table.is_blank() {
                    self.section.push_table(table);
                }
            }
        }
    }
}

/// Parses the body of `word/document.xml` into a section.
pub fn parse_body(xml: &str, styles: &HashMap<String, u8>) -> Result<Section> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut parser = BodyParser {
        styles: Some(styles),
        ..BodyParser::default()
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => parser.start(&e, false),
            Event::Empty(e) => parser.start(&e, true),
            Event::End(e) => parser.end(&local_name_end(&e)),
            Event::Text(e) => {
                if parser.in_text {
                    let text = e.unescape()?;
                    parser.push_text(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(parser.section)
}

/// `<w:b/>` is on; `<w:b w:val="0"/>` or `"false"` is off.
fn toggle_on(e: &BytesStart) -> bool {
    !matches!(
        attr(e, "val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Block;

    fn body(inner: &str) -> String {
        format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            inner
        )
    }

    #[test]
    fn test_heading_level_from_style() {
        assert_eq!(heading_level_from_style("heading 2"), Some(2));
        assert_eq!(heading_level_from_style("Heading1"), Some(1));
        assert_eq!(heading_level_from_style("Title"), Some(1));
        assert_eq!(heading_level_from_style("heading 9"), Some(6));
        assert_eq!(heading_level_from_style("Normal"), None);
        assert_eq!(heading_level_from_style("HeadingText"), None);
    }

    #[test]
    fn test_paragraphs_and_headings() {
        let xml = body(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Intro</w:t></w:r></w:p>
               <w:p><w:r><w:t xml:space="preserve">Hello </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>world</w:t></w:r></w:p>"#,
        );
        let section = parse_body(&xml, &HashMap::new()).unwrap();
        assert_eq!(section.content.len(), 2);

        match &section.content[0] {
            Block::Paragraph(p) => {
                assert_eq!(p.style.heading_level, 2);
                assert_eq!(p.plain_text(), "Intro");
            }
            _ => panic!("expected paragraph"),
        }
        match &section.content[1] {
            Block::Paragraph(p) => {
                assert_eq!(p.plain_text(), "Hello world");
                assert_eq!(p.content.len(), 2);
            }
            _ => panic!("expected paragraph"),
        }
    }

    #[test]
    fn test_style_map_from_styles_part() {
        let styles = r#"<w:styles xmlns:w="x">
            <w:style w:type="paragraph" w:styleId="a1"><w:name w:val="heading 3"/></w:style>
            <w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
            <w:style w:type="paragraph" w:styleId="Custom"><w:name w:val="Custom"/><w:pPr><w:outlineLvl w:val="1"/></w:pPr></w:style>
        </w:styles>"#;
        let map = parse_heading_styles(styles).unwrap();
        assert_eq!(map.get("a1"), Some(&3));
        assert_eq!(map.get("Custom"), Some(&2));
        assert!(!map.contains_key("Normal"));
    }

    #[test]
    fn test_table_cells() {
        let xml = body(
            r#"<w:tbl>
                 <w:tr><w:tc><w:p><w:r><w:t>Name</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Qty</w:t></w:r></w:p></w:tc></w:tr>
                 <w:tr><w:tc><w:p><w:r><w:t>apple</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>3</w:t></w:r></w:p></w:tc></w:tr>
               </w:tbl>"#,
        );
        let section = parse_body(&xml, &HashMap::new()).unwrap();
        match &section.content[..] {
            [Block::Table(t)] => {
                assert_eq!(t.row_count(), 2);
                assert_eq!(t.get_cell(1, 0).map(|c| c.text.as_str()), Some("apple"));
                assert_eq!(t.get_cell(1, 1).map(|c| c.text.as_str()), Some("3"));
            }
            other => panic!("unexpected blocks {:?}", other),
        }
    }

    #[test]
    fn test_bold_off_and_list() {
        let xml = body(
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="1"/><w:numId w:val="3"/></w:numPr></w:pPr>
                 <w:r><w:rPr><w:b w:val="0"/></w:rPr><w:t>item</w:t></w:r></w:p>"#,
        );
        let section = parse_body(&xml, &HashMap::new()).unwrap();
        match &section.content[0] {
            Block::Paragraph(p) => {
                assert_eq!(p.style.list_style, Some(ListStyle::Unordered));
                assert_eq!(p.style.indent_level, 1);
                match &p.content[0] {
                    InlineContent::Text(run) => assert!(!run.style.bold),
                    other => panic!("unexpected {:?}", other),
                }
            }
            _ => panic!("expected paragraph"),
        }
    }
}
