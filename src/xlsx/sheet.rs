//! Index worksheet XML: writing rows and hyperlinks, reading them back.

use super::styles::{element_prefix, qualified};
use super::IndexEntry;
use crate::error::{Error, Result};
use crate::xml::{attr, escape, local_name, local_name_end};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;

/// Worksheet written for a new Index sheet before rows are filled in.
pub const EMPTY_WORKSHEET: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    r#"<dimension ref="A1"/>"#,
    r#"<sheetViews><sheetView workbookViewId="0"/></sheetViews>"#,
    r#"<sheetFormatPr defaultRowHeight="15"/>"#,
    r#"<cols><col min="1" max="1" width="32" customWidth="1"/></cols>"#,
    r#"<sheetData/>"#,
    r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#,
    r#"</worksheet>"#
);

/// Worksheet children that must come after `<hyperlinks>`.
const AFTER_HYPERLINKS: &[&str] = &[
    "printOptions",
    "pageMargins",
    "pageSetup",
    "headerFooter",
    "rowBreaks",
    "colBreaks",
    "customProperties",
    "cellWatches",
    "ignoredErrors",
    "smartTags",
    "drawing",
    "legacyDrawing",
    "legacyDrawingHF",
    "drawingHF",
    "picture",
    "oleObjects",
    "controls",
    "webPublishItems",
    "tableParts",
    "extLst",
];

/// One row of the Index sheet.
#[derive(Debug, Clone)]
pub struct IndexRow {
    /// Sheet name shown in column A
    pub text: String,
    /// In-document link location, e.g. `Data!A1`
    pub location: String,
}

/// Replaces the rows and hyperlinks of a worksheet.
///
/// Everything else in the part (views, columns, margins) is copied through.
/// Rows start at 1; every cell uses the cell format `style`.
pub fn write_index_rows(xml: &str, rows: &[IndexRow], style: u32) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::new());

    let mut prefix = String::new();
    let mut depth = 0usize;
    // Depth of an element being dropped, with its contents
    let mut skipping: Option<usize> = None;
    let mut hyperlinks_written = false;

    loop {
        let event = reader.read_event()?;

        if let Some(skip_depth) = skipping {
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth < skip_depth {
                        skipping = None;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        let is_empty = matches!(event, Event::Empty(_));
        match event {
            Event::Start(e) | Event::Empty(e) if depth == 0 => {
                if local_name(&e) != "worksheet" {
                    return Err(Error::InvalidData(format!(
                        "Index part is a {}, not a worksheet",
                        local_name(&e)
                    )));
                }
                prefix = element_prefix(&e);
                writer.write_event(Event::Start(e))?;
                if is_empty {
                    write_sheet_data(&mut writer, rows, style, &prefix);
                    write_hyperlinks(&mut writer, rows, &prefix);
                    writer.write_event(Event::End(BytesEnd::new(format!("{}worksheet", prefix))))?;
                    break;
                }
                depth += 1;
            }
            Event::Start(e) => {
                let name = local_name(&e);
                depth += 1;
                if depth == 2
                    && handle_child(&mut writer, &e, &name, rows, style, &prefix, &mut hyperlinks_written)?
                {
                    skipping = Some(depth);
                    continue;
                }
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                if depth == 1
                    && handle_child(&mut writer, &e, &name, rows, style, &prefix, &mut hyperlinks_written)?
                {
                    continue;
                }
                writer.write_event(Event::Empty(e))?;
            }
            Event::End(e) => {
                depth -= 1;
                if depth == 0 && local_name_end(&e) == "worksheet" && !hyperlinks_written {
                    write_hyperlinks(&mut writer, rows, &prefix);
                    hyperlinks_written = true;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Handles a direct child of `<worksheet>`.
///
/// Returns true when the original element was replaced or dropped and must
/// not be copied.
fn handle_child(
    writer: &mut Writer<Vec<u8>>,
    e: &BytesStart,
    name: &str,
    rows: &[IndexRow],
    style: u32,
    prefix: &str,
    hyperlinks_written: &mut bool,
) -> Result<bool> {
    match name {
        "dimension" => {
            let reference = if rows.len() > 1 {
                format!("A1:A{}", rows.len())
            } else {
                "A1".to_string()
            };
            let mut dimension = BytesStart::new(qualified(e));
            dimension.push_attribute(("ref", reference.as_str()));
            writer.write_event(Event::Empty(dimension))?;
            Ok(true)
        }
        "sheetData" => {
            write_sheet_data(writer, rows, style, prefix);
            Ok(true)
        }
        "hyperlinks" => Ok(true),
        other if AFTER_HYPERLINKS.contains(&other) && !*hyperlinks_written => {
            write_hyperlinks(writer, rows, prefix);
            *hyperlinks_written = true;
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn write_sheet_data(writer: &mut Writer<Vec<u8>>, rows: &[IndexRow], style: u32, p: &str) {
    if rows.is_empty() {
        writer
            .get_mut()
            .extend_from_slice(format!("<{p}sheetData/>").as_bytes());
        return;
    }

    let mut out = format!("<{p}sheetData>");
    for (index, row) in rows.iter().enumerate() {
        let r = index + 1;
        out.push_str(&format!(
            r#"<{p}row r="{r}"><{p}c r="A{r}" s="{style}" t="inlineStr"><{p}is><{p}t xml:space="preserve">{}</{p}t></{p}is></{p}c></{p}row>"#,
            escape(&row.text)
        ));
    }
    out.push_str(&format!("</{p}sheetData>"));
    writer.get_mut().extend_from_slice(out.as_bytes());
}

fn write_hyperlinks(writer: &mut Writer<Vec<u8>>, rows: &[IndexRow], p: &str) {
    if rows.is_empty() {
        return;
    }

    let mut out = format!("<{p}hyperlinks>");
    for (index, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            r#"<{p}hyperlink ref="A{}" location="{}" display="{}"/>"#,
            index + 1,
            escape(&row.location),
            escape(&row.text)
        ));
    }
    out.push_str(&format!("</{p}hyperlinks>"));
    writer.get_mut().extend_from_slice(out.as_bytes());
}

/// Reads column A text and its in-document link for every row.
pub fn read_entries(xml: &str, shared_strings: &[String]) -> Result<Vec<IndexEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut texts: BTreeMap<u32, String> = BTreeMap::new();
    let mut links: BTreeMap<u32, String> = BTreeMap::new();

    // Current column-A cell: (row, type)
    let mut cell: Option<(u32, Option<String>)> = None;
    let mut value = String::new();
    let mut in_value = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match local_name(&e).as_str() {
                "c" => {
                    cell = attr(&e, "r")
                        .and_then(|r| column_a_row(&r))
                        .map(|row| (row, attr(&e, "t")));
                    value.clear();
                }
                "v" | "t" if cell.is_some() => in_value = true,
                _ => {}
            },
            Event::Empty(e) if local_name(&e) == "hyperlink" => {
                let row = attr(&e, "ref").and_then(|r| column_a_row(&r));
                if let (Some(row), Some(location)) = (row, attr(&e, "location")) {
                    links.insert(row, location);
                }
            }
            Event::Text(e) if in_value => value.push_str(&e.unescape()?),
            Event::End(e) => match local_name_end(&e).as_str() {
                "v" | "t" => in_value = false,
                "c" => {
                    if let Some((row, cell_type)) = cell.take() {
                        let text = match cell_type.as_deref() {
                            Some("s") => value
                                .trim()
                                .parse::<usize>()
                                .ok()
                                .and_then(|i| shared_strings.get(i).cloned())
                                .unwrap_or_default(),
                            _ => value.clone(),
                        };
                        texts.insert(row, text);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(texts
        .into_iter()
        .filter(|(_, text)| !text.is_empty())
        .map(|(row, text)| IndexEntry {
            row,
            location: links.remove(&row),
            text,
        })
        .collect())
}

/// Reads `xl/sharedStrings.xml`; rich-text runs are concatenated, phonetic runs skipped.
pub fn read_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match local_name(&e).as_str() {
                "si" => current.clear(),
                "rPh" => in_phonetic = true,
                "t" if !in_phonetic => in_text = true,
                _ => {}
            },
            Event::Empty(e) if local_name(&e) == "si" => strings.push(String::new()),
            Event::Text(e) if in_text => current.push_str(&e.unescape()?),
            Event::End(e) => match local_name_end(&e).as_str() {
                "t" => in_text = false,
                "rPh" => in_phonetic = false,
                "si" => strings.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

/// Row number of an `A<n>` cell reference; other columns give `None`.
fn column_a_row(reference: &str) -> Option<u32> {
    let digits = reference.strip_prefix('A')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
