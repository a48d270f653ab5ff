//! Spreadsheet package: sheet list, relationships, content types and saving.

use super::sheet::{self, IndexRow, EMPTY_WORKSHEET};
use super::styles::{element_prefix, ensure_hyperlink_style, qualified, MINIMAL_STYLES};
use super::{sheet_reference, IndexEntry, IndexOptions, IndexSummary};
use crate::detect::{detect_container_from_bytes, Container};
use crate::error::{Error, Result};
use crate::package::{resolve_target, OoxmlPackage};
use crate::xml::{attr, attr_u32, escape, local_name};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const PACKAGE_RELS: &str = "_rels/.rels";
const CONTENT_TYPES: &str = "[Content_Types].xml";
const DEFAULT_WORKBOOK: &str = "xl/workbook.xml";

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const WORKSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const STYLES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";

/// A sheet as listed in `<sheets>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    /// Display name
    pub name: String,
    /// `sheetId` attribute
    pub sheet_id: u32,
    /// Relationship id pointing at the sheet part
    pub rel_id: String,
    /// Package path of the sheet part, empty when the relationship is missing
    pub part: String,
}

#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    kind: String,
    target: String,
    external: bool,
}

/// An OOXML workbook opened for editing.
///
/// Edited parts are kept in memory until [`Workbook::save`].
pub struct Workbook {
    package: OoxmlPackage,
    workbook_part: String,
    relationships: Vec<Relationship>,
    sheets: Vec<SheetRef>,
    modified: BTreeMap<String, Vec<u8>>,
}

impl Workbook {
    /// Opens a workbook file.
    ///
    /// Legacy `.xls` files (OLE containers) cannot be written and are rejected.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        if detect_container_from_bytes(&data)? == Container::Ole {
            return Err(Error::UnsupportedFormat(
                "legacy .xls workbooks cannot be modified".into(),
            ));
        }
        Self::from_bytes(data)
    }

    /// Opens a workbook from package bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let mut package = OoxmlPackage::from_bytes(data)?;

        let workbook_part = if package.file_exists(PACKAGE_RELS) {
            let rels = parse_relationships(&package.read_file(PACKAGE_RELS)?)?;
            rels.iter()
                .find(|r| r.kind.ends_with("/officeDocument") && !r.external)
                .map(|r| resolve_target("", &r.target))
                .unwrap_or_else(|| DEFAULT_WORKBOOK.to_string())
        } else {
            DEFAULT_WORKBOOK.to_string()
        };

        let rels_part = rels_path_for(&workbook_part);
        let relationships = if package.file_exists(&rels_part) {
            parse_relationships(&package.read_file(&rels_part)?)?
        } else {
            Vec::new()
        };

        let xml = package.read_file(&workbook_part)?;
        let sheets = parse_sheets(&xml)?
            .into_iter()
            .map(|(name, sheet_id, rel_id)| {
                let part = relationships
                    .iter()
                    .find(|r| r.id == rel_id && !r.external)
                    .map(|r| resolve_target(&workbook_part, &r.target))
                    .unwrap_or_default();
                SheetRef {
                    name,
                    sheet_id,
                    rel_id,
                    part,
                }
            })
            .collect();

        Ok(Self {
            package,
            workbook_part,
            relationships,
            sheets,
            modified: BTreeMap::new(),
        })
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// Sheets in workbook order.
    pub fn sheets(&self) -> &[SheetRef] {
        &self.sheets
    }

    /// Reads column A text and links of the named sheet.
    pub fn index_entries(&mut self, name: &str) -> Result<Vec<IndexEntry>> {
        let part = self
            .sheets
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.part.clone())
            .ok_or_else(|| Error::MissingComponent(format!("sheet {}", name)))?;

        let shared = match self.related_part("/sharedStrings") {
            Some(part) if self.part_exists(&part) => sheet::read_shared_strings(&self.read_part(&part)?)?,
            _ => Vec::new(),
        };

        let xml = self.read_part(&part)?;
        sheet::read_entries(&xml, &shared)
    }

    /// Creates or refreshes the index sheet in memory.
    ///
    /// One row per other sheet, in workbook order, each linking to cell A1
    /// of that sheet. A new index sheet becomes the first sheet.
    pub fn write_index(&mut self, options: &IndexOptions) -> Result<IndexSummary> {
        let index_name = options.sheet_name.as_str();
        let existing = self.sheets.iter().position(|s| s.name == index_name);

        if existing.is_none() {
            let folded = index_name.to_lowercase();
            if let Some(clash) = self.sheets.iter().find(|s| s.name.to_lowercase() == folded) {
                warn!(sheet = %clash.name, index = index_name, "sheet name differs from index name only by case");
                return Err(Error::InvalidData(format!(
                    "sheet '{}' conflicts with index sheet name '{}'",
                    clash.name, index_name
                )));
            }
        }

        let style = self.hyperlink_style()?;
        let rows: Vec<IndexRow> = self
            .sheets
            .iter()
            .filter(|s| s.name != index_name)
            .map(|s| IndexRow {
                text: s.name.clone(),
                location: sheet_reference(&s.name, options.quote_targets),
            })
            .collect();

        let created = match existing {
            Some(position) => {
                let part = self.sheets[position].part.clone();
                if part.is_empty() {
                    return Err(Error::MissingComponent(format!("part of sheet {}", index_name)));
                }
                let xml = sheet::write_index_rows(&self.read_part(&part)?, &rows, style)?;
                self.modified.insert(part, xml.into_bytes());
                false
            }
            None => {
                let xml = sheet::write_index_rows(EMPTY_WORKSHEET, &rows, style)?;
                self.insert_first_sheet(index_name, xml)?;
                true
            }
        };

        debug!(sheet = index_name, created, rows = rows.len(), "index sheet written");
        Ok(IndexSummary {
            sheet_name: index_name.to_string(),
            created,
            entries: rows.len(),
        })
    }

    /// Writes the package to `path` through a temporary file in the same directory.
    ///
    /// Entries that were not edited are copied without recompression. An
    /// existing target is resolved through symlinks and keeps its permissions.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let (target, permissions) = match std::fs::canonicalize(path.as_ref()) {
            Ok(resolved) => {
                let permissions = std::fs::metadata(&resolved)?.permissions();
                (resolved, Some(permissions))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (path.as_ref().to_path_buf(), None),
            Err(e) => return Err(e.into()),
        };
        let path = target.as_path();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            let mut zip = ZipWriter::new(temp.as_file_mut());
            let mut written = HashSet::new();

            let archive = self.package.archive_mut();
            for i in 0..archive.len() {
                let entry = archive.by_index_raw(i)?;
                let name = entry.name().to_string();
                match self.modified.get(&name) {
                    Some(data) => {
                        drop(entry);
                        zip.start_file(name.as_str(), options)?;
                        zip.write_all(data)?;
                        written.insert(name);
                    }
                    None => zip.raw_copy_file(entry)?,
                }
            }

            for (name, data) in &self.modified {
                if !written.contains(name) {
                    zip.start_file(name.as_str(), options)?;
                    zip.write_all(data)?;
                }
            }
            zip.finish()?;
        }

        if let Some(permissions) = permissions {
            temp.as_file().set_permissions(permissions)?;
        }
        temp.persist(path).map_err(|e| Error::Io(e.error))?;
        debug!(path = %path.display(), "workbook saved");
        Ok(())
    }

    /// Cell format index of the Hyperlink style, creating styles as needed.
    fn hyperlink_style(&mut self) -> Result<u32> {
        let existing = self
            .related_part("/styles")
            .filter(|part| self.part_exists(part));

        let (part, xml) = match existing {
            Some(part) => {
                let xml = self.read_part(&part)?;
                (part, xml)
            }
            None => {
                let part = resolve_target(&self.workbook_part, "styles.xml");
                let target = relative_target(&self.workbook_part, &part);
                self.add_relationship(&format!("{}/styles", REL_NS), &target)?;
                self.add_override(&part, STYLES_CONTENT_TYPE)?;
                self.modified.insert(part.clone(), MINIMAL_STYLES.as_bytes().to_vec());
                (part, MINIMAL_STYLES.to_string())
            }
        };

        let (index, updated) = ensure_hyperlink_style(&xml)?;
        if let Some(updated) = updated {
            self.modified.insert(part, updated.into_bytes());
        }
        Ok(index)
    }

    fn insert_first_sheet(&mut self, name: &str, xml: String) -> Result<()> {
        let part = self.free_sheet_part();
        let sheet_id = self.sheets.iter().map(|s| s.sheet_id).max().unwrap_or(0) + 1;
        let target = relative_target(&self.workbook_part, &part);
        let rel_id = self.add_relationship(&format!("{}/worksheet", REL_NS), &target)?;
        self.add_override(&part, WORKSHEET_CONTENT_TYPE)?;

        let workbook_part = self.workbook_part.clone();
        let workbook_xml = self.read_part(&workbook_part)?;
        let updated = insert_sheet_entry(&workbook_xml, name, sheet_id, &rel_id)?;
        self.modified.insert(workbook_part, updated.into_bytes());
        self.modified.insert(part.clone(), xml.into_bytes());

        self.sheets.insert(
            0,
            SheetRef {
                name: name.to_string(),
                sheet_id,
                rel_id,
                part,
            },
        );
        Ok(())
    }

    /// First `worksheets/sheetN.xml` beside the workbook part not yet in use.
    fn free_sheet_part(&self) -> String {
        let mut n = self.sheets.len() + 1;
        loop {
            let candidate = resolve_target(&self.workbook_part, &format!("worksheets/sheet{}.xml", n));
            if !self.part_exists(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Appends a workbook relationship and returns its id.
    fn add_relationship(&mut self, kind: &str, target: &str) -> Result<String> {
        let ids: HashSet<&str> = self.relationships.iter().map(|r| r.id.as_str()).collect();
        let id = (1..)
            .map(|n| format!("rId{}", n))
            .find(|candidate| !ids.contains(candidate.as_str()))
            .unwrap_or_default();

        let rels_part = rels_path_for(&self.workbook_part);
        let xml = if self.part_exists(&rels_part) {
            self.read_part(&rels_part)?
        } else {
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>{}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#,
                "\n"
            )
        };

        let fragment = |p: &str| {
            format!(
                r#"<{p}Relationship Id="{}" Type="{}" Target="{}"/>"#,
                id,
                escape(kind),
                escape(target)
            )
        };
        let updated = append_to_root(&xml, fragment)?;
        self.modified.insert(rels_part, updated.into_bytes());

        self.relationships.push(Relationship {
            id: id.clone(),
            kind: kind.to_string(),
            target: target.to_string(),
            external: false,
        });
        Ok(id)
    }

    /// Registers a content type override for a new part.
    fn add_override(&mut self, part: &str, content_type: &str) -> Result<()> {
        let xml = self.read_part(CONTENT_TYPES)?;
        let part_name = format!("/{}", part);
        if overrides(&xml)?.iter().any(|existing| existing == &part_name) {
            return Ok(());
        }

        let updated = append_to_root(&xml, |p| {
            format!(
                r#"<{p}Override PartName="{}" ContentType="{}"/>"#,
                escape(&part_name),
                content_type
            )
        })?;
        self.modified.insert(CONTENT_TYPES.to_string(), updated.into_bytes());
        Ok(())
    }

    fn related_part(&self, kind_suffix: &str) -> Option<String> {
        self.relationships
            .iter()
            .find(|r| r.kind.ends_with(kind_suffix) && !r.external)
            .map(|r| resolve_target(&self.workbook_part, &r.target))
    }

    fn part_exists(&self, part: &str) -> bool {
        self.modified.contains_key(part) || self.package.file_exists(part)
    }

    fn read_part(&mut self, part: &str) -> Result<String> {
        match self.modified.get(part) {
            Some(data) => Ok(String::from_utf8(data.clone())?),
            None => self.package.read_file(part),
        }
    }
}

/// `xl/workbook.xml` gives `xl/_rels/workbook.xml.rels`.
fn rels_path_for(part: &str) -> String {
    match part.rfind('/') {
        Some(pos) => format!("{}/_rels/{}.rels", &part[..pos], &part[pos + 1..]),
        None => format!("_rels/{}.rels", part),
    }
}

/// Target of `part` relative to the folder of `source`, when it lies below it.
fn relative_target(source: &str, part: &str) -> String {
    let folder = match source.rfind('/') {
        Some(pos) => &source[..=pos],
        None => "",
    };
    match part.strip_prefix(folder) {
        Some(relative) => relative.to_string(),
        None => format!("/{}", part),
    }
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if local_name(&e) == "Relationship" => {
                relationships.push(Relationship {
                    id: attr(&e, "Id").unwrap_or_default(),
                    kind: attr(&e, "Type").unwrap_or_default(),
                    target: attr(&e, "Target").unwrap_or_default(),
                    external: attr(&e, "TargetMode").as_deref() == Some("External"),
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(relationships)
}

/// `(name, sheetId, r:id)` for every `<sheet>` in order.
fn parse_sheets(xml: &str) -> Result<Vec<(String, u32, String)>> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if local_name(&e) == "sheet" => {
                sheets.push((
                    attr(&e, "name").unwrap_or_default(),
                    attr_u32(&e, "sheetId").unwrap_or(0),
                    attr(&e, "id").unwrap_or_default(),
                ));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sheets)
}

fn overrides(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut parts = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if local_name(&e) == "Override" => {
                if let Some(part) = attr(&e, "PartName") {
                    parts.push(part);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(parts)
}

/// Inserts `fragment(prefix)` as the last child of the root element.
fn append_to_root<F>(xml: &str, fragment: F) -> Result<String>
where
    F: Fn(&str) -> String,
{
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    let mut prefix = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if depth == 0 {
                    prefix = element_prefix(&e);
                }
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) if depth == 0 => {
                prefix = element_prefix(&e);
                let name = qualified(&e);
                writer.write_event(Event::Start(e))?;
                writer.get_mut().extend_from_slice(fragment(&prefix).as_bytes());
                writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
            Event::End(e) => {
                depth -= 1;
                if depth == 0 {
                    writer.get_mut().extend_from_slice(fragment(&prefix).as_bytes());
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Adds a `<sheet>` as the first entry of `<sheets>`.
///
/// Position-based attributes (`localSheetId`, `activeTab`, `firstSheet`)
/// are shifted by one so they keep naming the same sheets.
fn insert_sheet_entry(xml: &str, name: &str, sheet_id: u32, rel_id: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    let mut prefix = String::new();
    let mut rel_prefix = String::from("r");

    let sheet_entry = |prefix: &str, rel_prefix: &str| {
        format!(
            r#"<{prefix}sheet name="{}" sheetId="{sheet_id}" {rel_prefix}:id="{}"/>"#,
            escape(name),
            escape(rel_id)
        )
    };

    loop {
        let event = reader.read_event()?;
        let is_empty = matches!(event, Event::Empty(_));
        match event {
            Event::Start(e) | Event::Empty(e) => {
                let local = local_name(&e);
                let mut element = match local.as_str() {
                    "definedName" => shift_positions(&e, &["localSheetId"]),
                    "workbookView" => shift_positions(&e, &["activeTab", "firstSheet"]),
                    _ => e.into_owned(),
                };

                if depth == 0 {
                    prefix = element_prefix(&element);
                    rel_prefix = match namespace_prefix(&element, REL_NS) {
                        Some(bound) => bound,
                        None => {
                            let free = free_prefix(&element);
                            element.push_attribute((format!("xmlns:{}", free).as_str(), REL_NS));
                            free
                        }
                    };
                }

                if local == "sheets" {
                    let name = qualified(&element);
                    writer.write_event(Event::Start(element))?;
                    writer
                        .get_mut()
                        .extend_from_slice(sheet_entry(&prefix, &rel_prefix).as_bytes());
                    if is_empty {
                        writer.write_event(Event::End(BytesEnd::new(name)))?;
                    } else {
                        depth += 1;
                    }
                } else if is_empty {
                    writer.write_event(Event::Empty(element))?;
                } else {
                    depth += 1;
                    writer.write_event(Event::Start(element))?;
                }
            }
            Event::End(e) => {
                depth -= 1;
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Copy of `e` with the named numeric attributes incremented.
fn shift_positions(e: &BytesStart, names: &[&str]) -> BytesStart<'static> {
    let mut shifted = BytesStart::new(qualified(e));
    for a in e.attributes().flatten() {
        let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
        let value = a
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_default();
        match value.trim().parse::<u32>() {
            Ok(n) if names.contains(&key.as_str()) => {
                shifted.push_attribute((key.as_str(), (n + 1).to_string().as_str()));
            }
            _ => shifted.push_attribute(a),
        }
    }
    shifted
}

/// Prefix bound to `namespace` by an `xmlns:*` attribute on `e`.
fn namespace_prefix(e: &BytesStart, namespace: &str) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
        let bound = key.strip_prefix("xmlns:")?.to_string();
        let value = a.unescape_value().ok()?;
        (value == namespace).then_some(bound)
    })
}

/// `r` unless the root already binds it to something else.
fn free_prefix(e: &BytesStart) -> String {
    let declared: Vec<String> = e
        .attributes()
        .flatten()
        .filter_map(|a| {
            String::from_utf8_lossy(a.key.as_ref())
                .strip_prefix("xmlns:")
                .map(str::to_string)
        })
        .collect();
    ["r", "rel", "officeRel"]
        .iter()
        .find(|candidate| !declared.iter().any(|d| d == *candidate))
        .map(|s| s.to_string())
        .unwrap_or_else(|| "r2".to_string())
}
