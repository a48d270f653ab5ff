//! The `Hyperlink` cell style in `xl/styles.xml`.

use crate::error::{Error, Result};
use crate::xml::{attr, attr_u32, local_name, local_name_end};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

/// `builtinId` of Excel's Hyperlink cell style.
const HYPERLINK_BUILTIN_ID: u32 = 8;

/// Styles part written when a package has none.
pub const MINIMAL_STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"</styleSheet>"#
);

/// What the first pass found in the styles part.
#[derive(Debug, Default)]
struct StyleScan {
    prefix: String,
    font_count: u32,
    /// `fontId` of each cell style format
    style_xf_fonts: Vec<u32>,
    /// `xfId` of each cell format
    cell_xf_parents: Vec<u32>,
    /// Number of `cellStyle` entries, `None` without a `cellStyles` element
    cell_style_count: Option<u32>,
    /// `xfId` of the existing Hyperlink cell style
    hyperlink_style_xf: Option<u32>,
}

/// Elements appended by the second pass.
#[derive(Debug, Default)]
struct Additions {
    font: Option<String>,
    style_xf: Option<String>,
    cell_xf: Option<String>,
    cell_style: Option<String>,
}

impl Additions {
    /// Current child count and the element to append, for a container that grows.
    fn for_container<'a>(&'a self, scan: &StyleScan, name: &str) -> Option<(u32, &'a str)> {
        let (count, added) = match name {
            "fonts" => (scan.font_count, &self.font),
            "cellStyleXfs" => (scan.style_xf_fonts.len() as u32, &self.style_xf),
            "cellXfs" => (scan.cell_xf_parents.len() as u32, &self.cell_xf),
            "cellStyles" => (scan.cell_style_count.unwrap_or(0), &self.cell_style),
            _ => return None,
        };
        added.as_deref().map(|added| (count, added))
    }
}

/// Makes sure a cell format with the Hyperlink style exists.
///
/// Returns the cell format index to use in `s="..."` and, when the part had
/// to change, the rewritten XML.
pub fn ensure_hyperlink_style(xml: &str) -> Result<(u32, Option<String>)> {
    let scan = scan(xml)?;
    let index = scan.cell_xf_parents.len() as u32;
    let p = &scan.prefix;

    if let Some(style_xf) = scan.hyperlink_style_xf {
        if let Some(existing) = scan.cell_xf_parents.iter().position(|&x| x == style_xf) {
            return Ok((existing as u32, None));
        }
        // Named style exists but no cell format applies it yet
        let font = scan.style_xf_fonts.get(style_xf as usize).copied().unwrap_or(0);
        let additions = Additions {
            cell_xf: Some(cell_xf(p, font, style_xf)),
            ..Additions::default()
        };
        return Ok((index, Some(rewrite(xml, &scan, &additions)?)));
    }

    let font = scan.font_count;
    let style_xf = scan.style_xf_fonts.len() as u32;
    let additions = Additions {
        font: Some(format!(
            r#"<{p}font><{p}u/><{p}sz val="11"/><{p}color rgb="FF0563C1"/><{p}name val="Calibri"/><{p}family val="2"/></{p}font>"#
        )),
        style_xf: Some(format!(
            r#"<{p}xf numFmtId="0" fontId="{font}" fillId="0" borderId="0" applyNumberFormat="0" applyFill="0" applyBorder="0" applyAlignment="0" applyProtection="0"/>"#
        )),
        cell_xf: Some(cell_xf(p, font, style_xf)),
        cell_style: Some(format!(
            r#"<{p}cellStyle name="Hyperlink" xfId="{style_xf}" builtinId="{HYPERLINK_BUILTIN_ID}"/>"#
        )),
    };
    Ok((index, Some(rewrite(xml, &scan, &additions)?)))
}

fn cell_xf(prefix: &str, font: u32, style_xf: u32) -> String {
    format!(
        r#"<{prefix}xf numFmtId="0" fontId="{font}" fillId="0" borderId="0" xfId="{style_xf}" applyFont="1"/>"#
    )
}

fn scan(xml: &str) -> Result<StyleScan> {
    let mut reader = Reader::from_str(xml);
    let mut scan = StyleScan::default();
    let mut container: Option<String> = None;
    let mut present: Vec<String> = Vec::new();
    let mut depth = 0usize;

    loop {
        let (e, is_start) = match reader.read_event()? {
            Event::Start(e) => (e, true),
            Event::Empty(e) => (e, false),
            Event::End(_) => {
                if depth == 2 {
                    container = None;
                }
                depth -= 1;
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let name = local_name(&e);
        match (depth, container.as_deref(), name.as_str()) {
            (0, _, _) => scan.prefix = element_prefix(&e),
            (1, _, "fonts" | "cellStyleXfs" | "cellXfs" | "cellStyles") => {
                if name == "cellStyles" {
                    scan.cell_style_count = Some(0);
                }
                present.push(name.clone());
                container = Some(name);
            }
            (2, Some("fonts"), "font") => scan.font_count += 1,
            (2, Some("cellStyleXfs"), "xf") => {
                scan.style_xf_fonts.push(attr_u32(&e, "fontId").unwrap_or(0));
            }
            (2, Some("cellXfs"), "xf") => {
                scan.cell_xf_parents.push(attr_u32(&e, "xfId").unwrap_or(0));
            }
            (2, Some("cellStyles"), "cellStyle") => {
                scan.cell_style_count = scan.cell_style_count.map(|n| n + 1);
                let builtin = attr_u32(&e, "builtinId") == Some(HYPERLINK_BUILTIN_ID);
                let named = attr(&e, "name").as_deref() == Some("Hyperlink");
                if (builtin || named) && scan.hyperlink_style_xf.is_none() {
                    scan.hyperlink_style_xf = attr_u32(&e, "xfId");
                }
            }
            _ => {}
        }

        if is_start {
            depth += 1;
        } else if depth == 1 {
            // Self-closing container has no children
            container = None;
        }
    }

    for required in ["fonts", "cellStyleXfs", "cellXfs"] {
        if !present.iter().any(|name| name == required) {
            return Err(Error::InvalidData(format!("styles part lacks {}", required)));
        }
    }
    Ok(scan)
}

fn rewrite(xml: &str, scan: &StyleScan, additions: &Additions) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if depth == 2 {
                    if let Some((count, _)) = additions.for_container(scan, &local_name(&e)) {
                        writer.write_event(Event::Start(with_count(&e, count + 1)))?;
                        continue;
                    }
                }
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) => {
                if depth == 1 {
                    if let Some((count, added)) = additions.for_container(scan, &local_name(&e)) {
                        // Self-closing container expands to hold the addition
                        writer.write_event(Event::Start(with_count(&e, count + 1)))?;
                        writer.get_mut().extend_from_slice(added.as_bytes());
                        writer.write_event(Event::End(BytesEnd::new(qualified(&e))))?;
                        continue;
                    }
                }
                writer.write_event(Event::Empty(e))?;
            }
            Event::End(e) => {
                let name = local_name_end(&e);
                if depth == 2 {
                    if let Some((_, added)) = additions.for_container(scan, &name) {
                        writer.get_mut().extend_from_slice(added.as_bytes());
                    }
                }
                writer.write_event(Event::End(e))?;
                if depth == 2 && name == "cellXfs" && scan.cell_style_count.is_none() {
                    let block = new_cell_styles(&scan.prefix, additions);
                    writer.get_mut().extend_from_slice(block.as_bytes());
                }
                depth -= 1;
            }
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

/// `cellStyles` block for parts that have none: Normal plus any addition.
fn new_cell_styles(prefix: &str, additions: &Additions) -> String {
    let mut inner = format!(r#"<{prefix}cellStyle name="Normal" xfId="0" builtinId="0"/>"#);
    let mut count = 1;
    if let Some(ref added) = additions.cell_style {
        inner.push_str(added);
        count += 1;
    }
    format!(r#"<{prefix}cellStyles count="{count}">{inner}</{prefix}cellStyles>"#)
}

/// Copy of `e` with its `count` attribute set.
fn with_count(e: &BytesStart, count: u32) -> BytesStart<'static> {
    let mut updated = BytesStart::new(qualified(e));
    let mut found = false;
    for a in e.attributes().flatten() {
        if a.key.as_ref() == b"count" {
            updated.push_attribute(("count", count.to_string().as_str()));
            found = true;
        } else {
            updated.push_attribute(a);
        }
    }
    if !found {
        updated.push_attribute(("count", count.to_string().as_str()));
    }
    updated
}

/// Qualified element name (`x:fonts` or `fonts`).
pub(crate) fn qualified(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// `"x:"` for `<x:styleSheet>`, empty for the default namespace.
pub(crate) fn element_prefix(e: &BytesStart) -> String {
    e.name()
        .prefix()
        .map(|p| format!("{}:", String::from_utf8_lossy(p.as_ref())))
        .unwrap_or_default()
}
