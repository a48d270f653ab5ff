//! Format detection for office documents.
//!
//! Detection is extension-driven (the batch tools select files by
//! extension), with magic bytes used to tell OOXML packages from legacy OLE
//! files that carry the wrong extension.

use crate::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Magic bytes for OLE Compound File (legacy .doc/.xls/.ppt)
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Magic bytes for ZIP archive (OOXML)
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Magic bytes for PDF
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Extensions accepted by the generic document converter.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "doc", "pptx", "ppt", "xlsx", "xls", "txt", "html", "htm",
];

/// Supported document format types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Portable Document Format
    Pdf,
    /// Word 2007+ (OOXML)
    Docx,
    /// Word 97-2003 (OLE)
    Doc,
    /// PowerPoint 2007+ (OOXML)
    Pptx,
    /// PowerPoint 97-2003 (OLE)
    Ppt,
    /// Excel 2007+ (OOXML)
    Xlsx,
    /// Excel 97-2003 (BIFF)
    Xls,
    /// Plain text
    Text,
    /// HTML page
    Html,
}

impl FormatType {
    /// Maps a file extension (without dot, any case) to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(FormatType::Pdf),
            "docx" => Some(FormatType::Docx),
            "doc" => Some(FormatType::Doc),
            "pptx" => Some(FormatType::Pptx),
            "ppt" => Some(FormatType::Ppt),
            "xlsx" => Some(FormatType::Xlsx),
            "xls" => Some(FormatType::Xls),
            "txt" => Some(FormatType::Text),
            "html" | "htm" => Some(FormatType::Html),
            _ => None,
        }
    }

    /// Maps a path's extension to a format.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns true for the ZIP-based OOXML formats.
    pub fn is_ooxml(self) -> bool {
        matches!(self, FormatType::Docx | FormatType::Pptx | FormatType::Xlsx)
    }

    /// Returns true for the OLE-based legacy formats.
    pub fn is_legacy(self) -> bool {
        matches!(self, FormatType::Doc | FormatType::Ppt | FormatType::Xls)
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Pdf => write!(f, "PDF"),
            FormatType::Docx => write!(f, "DOCX"),
            FormatType::Doc => write!(f, "DOC"),
            FormatType::Pptx => write!(f, "PPTX"),
            FormatType::Ppt => write!(f, "PPT"),
            FormatType::Xlsx => write!(f, "XLSX"),
            FormatType::Xls => write!(f, "XLS"),
            FormatType::Text => write!(f, "Text"),
            FormatType::Html => write!(f, "HTML"),
        }
    }
}

/// Container kind identified from leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// OLE compound file
    Ole,
    /// ZIP archive
    Zip,
    /// PDF file
    Pdf,
    /// Anything else (text, HTML, unknown binary)
    Other,
}

/// Returns true when `path` has an extension in [`SUPPORTED_EXTENSIONS`].
pub fn is_supported(path: impl AsRef<Path>) -> bool {
    FormatType::from_path(path).is_some()
}

/// Lower-cased extension of `path` with a leading dot, or an empty string.
pub fn dotted_extension(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Detect the container kind from a file path.
pub fn detect_container_from_path(path: impl AsRef<Path>) -> Result<Container> {
    let mut file = std::fs::File::open(path)?;
    detect_container(&mut file)
}

/// Detect the container kind from a reader.
pub fn detect_container<R: Read + Seek>(reader: &mut R) -> Result<Container> {
    let mut buffer = [0u8; 8];

    reader.seek(SeekFrom::Start(0))?;
    let bytes_read = reader.read(&mut buffer)?;
    reader.seek(SeekFrom::Start(0))?;

    detect_container_from_bytes(&buffer[..bytes_read])
}

/// Detect the container kind from leading bytes.
pub fn detect_container_from_bytes(data: &[u8]) -> Result<Container> {
    if data.is_empty() {
        return Err(Error::InvalidData("File is empty".into()));
    }

    if data.len() >= 8 && data[..8] == OLE_MAGIC {
        return Ok(Container::Ole);
    }

    if data.len() >= 4 && data[..4] == ZIP_MAGIC {
        return Ok(Container::Zip);
    }

    if data.starts_with(PDF_MAGIC) {
        return Ok(Container::Pdf);
    }

    Ok(Container::Other)
}

/// Checks that a file's leading bytes match what its extension promises.
///
/// Text and HTML files are never rejected.
pub fn verify_container(path: impl AsRef<Path>, format: FormatType) -> Result<()> {
    let container = detect_container_from_path(path)?;
    let expected = match format {
        FormatType::Docx | FormatType::Pptx | FormatType::Xlsx => Container::Zip,
        FormatType::Doc | FormatType::Ppt | FormatType::Xls => Container::Ole,
        FormatType::Pdf => Container::Pdf,
        FormatType::Text | FormatType::Html => return Ok(()),
    };

    if container == expected {
        Ok(())
    } else {
        Err(Error::UnsupportedFormat(format!(
            "{} file does not have a {:?} container",
            format, expected
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_ole_magic() {
        let data = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0x00, 0x00];
        assert_eq!(detect_container_from_bytes(&data).unwrap(), Container::Ole);
    }

    #[test]
    fn test_detect_zip_magic() {
        let data = [0x50, 0x4B, 0x03, 0x04, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(detect_container_from_bytes(&data).unwrap(), Container::Zip);
    }

    #[test]
    fn test_detect_pdf_magic() {
        assert_eq!(
            detect_container_from_bytes(b"%PDF-1.7\n").unwrap(),
            Container::Pdf
        );
    }

    #[test]
    fn test_detect_empty() {
        assert!(matches!(
            detect_container_from_bytes(&[]),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert_eq!(FormatType::from_path("a/B.DOCX"), Some(FormatType::Docx));
        assert_eq!(FormatType::from_path("report.Htm"), Some(FormatType::Html));
        assert_eq!(FormatType::from_path("notes.md"), None);
        assert_eq!(FormatType::from_path("no_extension"), None);
    }

    #[test]
    fn test_supported_extensions_all_map() {
        for ext in SUPPORTED_EXTENSIONS {
            assert!(FormatType::from_extension(ext).is_some(), "{}", ext);
        }
    }

    #[test]
    fn test_dotted_extension() {
        assert_eq!(dotted_extension("x/y/Image.PNG"), ".png");
        assert_eq!(dotted_extension("Makefile"), "");
    }
}
