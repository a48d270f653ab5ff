//! PowerPoint 2007+ presentations.

use super::core_properties;
use crate::error::Result;
use crate::model::{Document, Paragraph, Section, Table, TextRun, TextStyle};
use crate::package::OoxmlPackage;
use crate::xml::{attr, local_name, local_name_end};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Parses a `.pptx` package, one titled section per slide in numeric order.
pub fn parse(package: &mut OoxmlPackage) -> Result<Document> {
    let mut document = Document::new();
    document.metadata = core_properties(package)?;
    document.metadata.format = Some("PPTX".into());

    let slides = package.list_numbered("ppt/slides/slide", ".xml");
    for (index, part) in slides.iter().enumerate() {
        let xml = package.read_file(part)?;
        let mut section = parse_slide(&xml, index)?;
        if section.is_empty() {
            continue;
        }
        section.title = Some(format!("Slide {}", index + 1));
        document.sections.push(section);
    }

    Ok(document)
}

/// Parses one slide part: text paragraphs and `a:tbl` tables in reading order.
pub fn parse_slide(xml: &str, index: usize) -> Result<Section> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut section = Section::new(index);
    let mut paragraph: Option<Paragraph> = None;
    let mut run_style = TextStyle::default();
    let mut in_text = false;

    let mut table: Option<Vec<Vec<String>>> = None;
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match local_name(&e).as_str() {
                "p" => paragraph = Some(Paragraph::new()),
                "r" => run_style = TextStyle::default(),
                "rPr" => run_style = run_properties(&e),
                "t" => in_text = true,
                "tbl" => table = Some(Vec::new()),
                "tr" => row.clear(),
                "tc" => cell.clear(),
                _ => {}
            },
            Event::Empty(e) => match local_name(&e).as_str() {
                "rPr" => run_style = run_properties(&e),
                "br" => {
                    if let Some(ref mut para) = paragraph {
                        para.push_line_break();
                    }
                }
                _ => {}
            },
            Event::Text(e) => {
                if in_text {
                    if let Some(ref mut para) = paragraph {
                        para.push_text(TextRun::with_style(e.unescape()?, run_style.clone()));
                    }
                }
            }
            Event::End(e) => match local_name_end(&e).as_str() {
                "t" => in_text = false,
                "p" => {
                    let Some(para) = paragraph.take() else {
                        continue;
                    };
                    if !para.has_text_content() {
                        continue;
                    }
                    if table.is_some() {
                        if !cell.is_empty() {
                            cell.push('\n');
                        }
                        cell.push_str(para.plain_text().trim());
                    } else {
                        section.push_paragraph(para);
                    }
                }
                "tc" => row.push(std::mem::take(&mut cell)),
                "tr" => {
                    if let Some(ref mut rows) = table {
                        rows.push(std::mem::take(&mut row));
                    }
                }
                "tbl" => {
                    if let Some(rows) = table.take() {
                        let parsed = Table::from_rows(rows);
                        if !parsed.is_blank() {
                            section.push_table(parsed);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(section)
}

/// `a:rPr b="1" i="1" strike="sngStrike"`.
fn run_properties(e: &quick_xml::events::BytesStart) -> TextStyle {
    TextStyle {
        bold: attr(e, "b").as_deref() == Some("1"),
        italic: attr(e, "i").as_deref() == Some("1"),
        strikethrough: attr(e, "strike").is_some_and(|v| v != "noStrike"),
    }
}
