//! Word and PowerPoint 97-2003 binaries (OLE compound files).
//!
//! Only text is recovered: Word text comes from the piece table referenced by
//! the FIB, PowerPoint text from the text atoms of each slide container.

use crate::error::{Error, Result};
use crate::model::{Document, Paragraph, Section};
use cfb::CompoundFile;
use std::io::{Cursor, Read};
use std::path::Path;

/// Word FIB magic (`wIdent`).
const WORD_MAGIC: u16 = 0xA5EC;
/// `fWhichTblStm` in the FIB flags word.
const FLAG_TABLE1: u16 = 0x0200;
/// Index of `fcClx`/`lcbClx` in `FibRgFcLcb97`.
const CLX_PAIR_INDEX: usize = 33;
/// Piece descriptor bit marking 8-bit (compressed) text.
const PCD_COMPRESSED: u32 = 0x4000_0000;

const PPT_STREAM: &str = "PowerPoint Document";
const RT_SLIDE: u16 = 0x03EE;
const RT_NOTES: u16 = 0x03F0;
const RT_SLIDE_LIST_WITH_TEXT: u16 = 0x0FF0;
const RT_SLIDE_PERSIST_ATOM: u16 = 0x03F3;
const RT_TEXT_CHARS_ATOM: u16 = 0x0FA0;
const RT_TEXT_BYTES_ATOM: u16 = 0x0FA8;

/// OLE container wrapper for legacy Office files.
pub struct OleFile {
    cfb: CompoundFile<Cursor<Vec<u8>>>,
}

impl OleFile {
    /// Opens a compound file from a path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Opens a compound file from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cfb = CompoundFile::open(Cursor::new(data))?;
        Ok(Self { cfb })
    }

    /// Reads a whole stream.
    pub fn read_stream(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut stream = self
            .cfb
            .open_stream(name)
            .map_err(|_| Error::MissingComponent(name.to_string()))?;

        let mut data = Vec::new();
        stream.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// Extracts `.doc` text; paragraphs split on the Word paragraph mark.
pub fn parse_doc(ole: &mut OleFile) -> Result<Document> {
    let word = ole.read_stream("WordDocument")?;
    let fib = Fib::parse(&word)?;

    let table_name = if fib.use_table1 { "1Table" } else { "0Table" };
    let table = ole.read_stream(table_name)?;

    let pieces = parse_pieces(&table, fib.fc_clx, fib.lcb_clx)?;
    let raw = decode_pieces(&word, &pieces);

    let mut section = Section::new(0);
    for para in split_word_text(&raw) {
        section.push_paragraph(Paragraph::text(para));
    }

    let mut document = Document::new();
    document.metadata.format = Some("DOC".into());
    document.sections.push(section);
    Ok(document)
}

/// Extracts `.ppt` text, one titled section per slide that carries text.
pub fn parse_ppt(ole: &mut OleFile) -> Result<Document> {
    let stream = ole.read_stream(PPT_STREAM)?;
    let slides = collect_slide_text(&stream);

    let mut document = Document::new();
    document.metadata.format = Some("PPT".into());

    for (index, lines) in slides.into_iter().enumerate() {
        if lines.is_empty() {
            continue;
        }
        let mut section = Section::titled(index, format!("Slide {}", index + 1));
        for line in lines {
            section.push_paragraph(Paragraph::text(line));
        }
        document.sections.push(section);
    }

    Ok(document)
}

#[derive(Debug)]
struct Fib {
    use_table1: bool,
    fc_clx: u32,
    lcb_clx: u32,
}

impl Fib {
    fn parse(word: &[u8]) -> Result<Self> {
        let invalid = || Error::InvalidData("truncated Word FIB".into());

        if read_u16(word, 0).ok_or_else(invalid)? != WORD_MAGIC {
            return Err(Error::InvalidData("not a Word binary document".into()));
        }
        let flags = read_u16(word, 0x0A).ok_or_else(invalid)?;

        // FibBase (32 bytes), then the variable-length csw/cslw/cbRgFcLcb blocks
        let mut pos = 32usize;
        let csw = read_u16(word, pos).ok_or_else(invalid)? as usize;
        pos += 2 + csw * 2;
        let cslw = read_u16(word, pos).ok_or_else(invalid)? as usize;
        pos += 2 + cslw * 4;
        let cb_rg_fc_lcb = read_u16(word, pos).ok_or_else(invalid)? as usize;
        pos += 2;

        if cb_rg_fc_lcb <= CLX_PAIR_INDEX {
            return Err(invalid());
        }
        let offset = pos + CLX_PAIR_INDEX * 8;

        Ok(Self {
            use_table1: flags & FLAG_TABLE1 != 0,
            fc_clx: read_u32(word, offset).ok_or_else(invalid)?,
            lcb_clx: read_u32(word, offset + 4).ok_or_else(invalid)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Piece {
    cp_start: u32,
    cp_end: u32,
    offset: usize,
    compressed: bool,
}

/// Walks the Clx: `Prc` entries (`0x01`, u16 size) then one `Pcdt` (`0x02`, u32 size).
fn parse_pieces(table: &[u8], fc_clx: u32, lcb_clx: u32) -> Result<Vec<Piece>> {
    let start = fc_clx as usize;
    let end = start + lcb_clx as usize;
    let clx = table
        .get(start..end)
        .ok_or_else(|| Error::InvalidData("Clx outside table stream".into()))?;

    let mut pos = 0usize;
    while pos < clx.len() {
        match clx[pos] {
            0x01 => {
                let cb = read_u16(clx, pos + 1).unwrap_or(0) as usize;
                pos += 3 + cb;
            }
            0x02 => {
                let lcb = read_u32(clx, pos + 1).unwrap_or(0) as usize;
                let plc = clx
                    .get(pos + 5..pos + 5 + lcb)
                    .ok_or_else(|| Error::InvalidData("truncated piece table".into()))?;
                return Ok(parse_plc_pcd(plc));
            }
            other => {
                return Err(Error::InvalidData(format!(
                    "unexpected Clx entry 0x{:02X}",
                    other
                )))
            }
        }
    }

    Err(Error::InvalidData("piece table not found".into()))
}

/// `PlcPcd`: (n + 1) character positions followed by n 8-byte piece descriptors.
fn parse_plc_pcd(plc: &[u8]) -> Vec<Piece> {
    if plc.len() < 4 {
        return Vec::new();
    }
    let count = (plc.len() - 4) / 12;

    (0..count)
        .filter_map(|i| {
            let cp_start = read_u32(plc, i * 4)?;
            let cp_end = read_u32(plc, (i + 1) * 4)?;
            let fc = read_u32(plc, (count + 1) * 4 + i * 8 + 2)?;
            let compressed = fc & PCD_COMPRESSED != 0;
            let offset = if compressed {
                ((fc & !PCD_COMPRESSED) / 2) as usize
            } else {
                fc as usize
            };
            Some(Piece {
                cp_start,
                cp_end,
                offset,
                compressed,
            })
        })
        .collect()
}

fn decode_pieces(word: &[u8], pieces: &[Piece]) -> String {
    let mut out = String::new();

    for piece in pieces {
        let chars = piece.cp_end.saturating_sub(piece.cp_start) as usize;
        if chars == 0 {
            continue;
        }
        let len = if piece.compressed { chars } else { chars * 2 };
        let Some(bytes) = word.get(piece.offset..piece.offset + len) else {
            continue;
        };

        if piece.compressed {
            let (decoded, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            out.push_str(&decoded);
        } else {
            out.push_str(&decode_utf16le(bytes));
        }
    }

    out
}

/// Splits Word text on paragraph marks, dropping field codes and control marks.
fn split_word_text(raw: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    // Inside a field, instruction text runs from 0x13 to 0x14
    let mut field_depth = 0usize;
    let mut in_instruction = false;

    for ch in raw.chars() {
        match ch {
            '\u{13}' => {
                field_depth += 1;
                in_instruction = true;
            }
            '\u{14}' => in_instruction = false,
            '\u{15}' => {
                field_depth = field_depth.saturating_sub(1);
                in_instruction = false;
            }
            _ if in_instruction && field_depth > 0 => {}
            '\r' | '\u{07}' | '\u{0C}' => {
                let text = current.trim().to_string();
                if !text.is_empty() {
                    paragraphs.push(text);
                }
                current.clear();
            }
            '\u{0B}' => current.push('\n'),
            '\t' => current.push('\t'),
            c if c.is_control() => {}
            c => current.push(c),
        }
    }

    let text = current.trim().to_string();
    if !text.is_empty() {
        paragraphs.push(text);
    }
    paragraphs
}

/// Where text atoms found during the record walk belong.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    Nowhere,
    Listed,
    Drawn,
}

#[derive(Default)]
struct SlideText {
    /// Groups from `SlideListWithText` (instance 0), split by `SlidePersistAtom`
    listed: Vec<Vec<String>>,
    /// Groups from `Slide` containers
    drawn: Vec<Vec<String>>,
}

impl SlideText {
    fn push_text(&mut self, target: Target, text: &str) {
        let group = match target {
            Target::Listed => self.listed.last_mut(),
            Target::Drawn => self.drawn.last_mut(),
            Target::Nowhere => None,
        };
        let Some(group) = group else {
            return;
        };
        for line in text.split(['\r', '\n', '\u{0B}']) {
            let line = line.trim();
            if !line.is_empty() && !group.iter().any(|l| l == line) {
                group.push(line.to_string());
            }
        }
    }
}

/// Collects text atoms per slide.
///
/// The slide list carries the outline text of every slide; slide containers
/// are used only when the list has none. Notes and masters are skipped.
fn collect_slide_text(stream: &[u8]) -> Vec<Vec<String>> {
    let mut text = SlideText::default();
    walk_records(stream, &mut text, Target::Nowhere);

    if text.listed.iter().any(|group| !group.is_empty()) {
        text.listed
    } else {
        text.drawn
    }
}

fn walk_records(data: &[u8], text: &mut SlideText, target: Target) {
    let mut pos = 0usize;

    while pos + 8 <= data.len() {
        let (Some(ver_inst), Some(rec_type), Some(len)) = (
            read_u16(data, pos),
            read_u16(data, pos + 2),
            read_u32(data, pos + 4),
        ) else {
            break;
        };
        let body_start = pos + 8;
        let body_end = body_start.saturating_add(len as usize).min(data.len());
        let body = &data[body_start..body_end];
        let is_container = ver_inst & 0x000F == 0x000F;
        let instance = ver_inst >> 4;

        match rec_type {
            RT_NOTES => {}
            RT_SLIDE_LIST_WITH_TEXT if is_container => {
                if instance == 0 {
                    walk_records(body, text, Target::Listed);
                }
            }
            RT_SLIDE if is_container => {
                text.drawn.push(Vec::new());
                walk_records(body, text, Target::Drawn);
            }
            RT_SLIDE_PERSIST_ATOM if target == Target::Listed => text.listed.push(Vec::new()),
            RT_TEXT_CHARS_ATOM => text.push_text(target, &decode_utf16le(body)),
            RT_TEXT_BYTES_ATOM => {
                let (decoded, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(body);
                text.push_text(target, &decoded);
            }
            _ if is_container => walk_records(body, text, target),
            _ => {}
        }

        pos = body_end;
    }
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}
