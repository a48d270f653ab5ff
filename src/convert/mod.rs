//! Single-file conversion to Markdown.
//!
//! Office formats are parsed into a [`Document`] and rendered with the
//! Markdown renderer; HTML goes through `html2md`; PDFs go through the
//! extractor chain in [`crate::pdf`].

pub mod docx;
pub mod html;
pub mod legacy;
pub mod pptx;
pub mod sheet;
pub mod text;

use crate::detect::{detect_container_from_path, Container, FormatType};
use crate::error::{Error, Result};
use crate::model::{Document, Metadata, Paragraph, Section};
use crate::package::OoxmlPackage;
use crate::pdf::{self, PdfExtractor};
use crate::render::{render_markdown, RenderOptions};
use crate::xml::local_name;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

/// Options for [`convert_file`].
pub struct ConvertOptions {
    /// Rendering options for office formats
    pub render: RenderOptions,
    /// Extractor chain used for PDF files
    pub pdf_extractors: Vec<Box<dyn PdfExtractor>>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            pdf_extractors: pdf::default_extractors(),
        }
    }
}

impl ConvertOptions {
    /// Creates options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the render options.
    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Replaces the PDF extractor chain.
    pub fn with_pdf_extractors(mut self, extractors: Vec<Box<dyn PdfExtractor>>) -> Self {
        self.pdf_extractors = extractors;
        self
    }
}

impl std::fmt::Debug for ConvertOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let methods: Vec<&str> = self.pdf_extractors.iter().map(|e| e.method()).collect();
        f.debug_struct("ConvertOptions")
            .field("render", &self.render)
            .field("pdf_extractors", &methods)
            .finish()
    }
}

/// Markdown produced from one source file.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// Markdown text
    pub markdown: String,
    /// Format the file was parsed as
    #[serde(serialize_with = "serialize_format")]
    pub format: FormatType,
    /// Name of the converter that produced the text
    pub method: String,
}

fn serialize_format<S: serde::Serializer>(
    format: &FormatType,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(format)
}

/// Converts one file to Markdown, choosing the converter by extension.
///
/// Fails with [`Error::EmptyDocument`] when the result has no text.
pub fn convert_file(path: impl AsRef<Path>, options: &ConvertOptions) -> Result<Conversion> {
    let path = path.as_ref();
    let declared = FormatType::from_path(path).ok_or(Error::UnknownFormat)?;
    let format = sniff_format(path, declared)?;
    debug!(path = %path.display(), %format, "converting");

    let (markdown, method) = match format {
        FormatType::Pdf => {
            let extraction = pdf::extract_with_fallback(path, &options.pdf_extractors)?;
            (extraction.text, extraction.method.to_string())
        }
        FormatType::Html => (
            crate::cleanup::cleanup_default(&html::convert(path)?),
            "html2md".to_string(),
        ),
        _ => {
            let document = to_document(path, format)?;
            (
                render_markdown(&document, &options.render)?,
                method_name(format).to_string(),
            )
        }
    };

    if markdown.trim().is_empty() {
        return Err(Error::EmptyDocument);
    }

    Ok(Conversion {
        markdown,
        format,
        method,
    })
}

/// Parses an office or text file into the document model.
///
/// PDF and HTML have no model representation and are rejected.
pub fn to_document(path: &Path, format: FormatType) -> Result<Document> {
    match format {
        FormatType::Docx => docx::parse(&mut OoxmlPackage::open(path)?),
        FormatType::Pptx => pptx::parse(&mut OoxmlPackage::open(path)?),
        FormatType::Xlsx | FormatType::Xls => {
            let mut document = sheet::parse(path)?;
            document.metadata.format = Some(format.to_string());
            Ok(document)
        }
        FormatType::Doc => legacy::parse_doc(&mut legacy::OleFile::open(path)?),
        FormatType::Ppt => legacy::parse_ppt(&mut legacy::OleFile::open(path)?),
        FormatType::Text => {
            let content = text::read_text(path)?;
            let mut section = Section::new(0);
            for block in content.replace("\r\n", "\n").split("\n\n") {
                if !block.trim().is_empty() {
                    section.push_paragraph(Paragraph::text(block.trim_matches('\n')));
                }
            }
            let mut document = Document::new();
            document.metadata.format = Some(format.to_string());
            document.sections.push(section);
            Ok(document)
        }
        FormatType::Pdf | FormatType::Html => Err(Error::UnsupportedFormat(format!(
            "{} has no document model",
            format
        ))),
    }
}

/// Corrects the declared format when the container says otherwise.
///
/// Legacy extensions on OOXML packages are common (a `.doc` that is really a
/// `.docx`); those are parsed as the OOXML format.
fn sniff_format(path: &Path, declared: FormatType) -> Result<FormatType> {
    if !declared.is_legacy() {
        return Ok(declared);
    }

    let sniffed = match (declared, detect_container_from_path(path)?) {
        (FormatType::Doc, Container::Zip) => FormatType::Docx,
        (FormatType::Ppt, Container::Zip) => FormatType::Pptx,
        (FormatType::Xls, Container::Zip) => FormatType::Xlsx,
        (format, _) => format,
    };

    if sniffed != declared {
        debug!(path = %path.display(), %declared, %sniffed, "container does not match extension");
    }
    Ok(sniffed)
}

fn method_name(format: FormatType) -> &'static str {
    match format {
        FormatType::Docx => "docx",
        FormatType::Pptx => "pptx",
        FormatType::Xlsx | FormatType::Xls => "calamine",
        FormatType::Doc => "word-binary",
        FormatType::Ppt => "ppt-binary",
        FormatType::Text => "text",
        FormatType::Html => "html2md",
        FormatType::Pdf => "pdf",
    }
}

/// Reads title and creator from `docProps/core.xml` when present.
pub fn core_properties(package: &mut OoxmlPackage) -> Result<Metadata> {
    let mut metadata = Metadata::default();
    if !package.file_exists(CORE_PROPERTIES_PART) {
        return Ok(metadata);
    }

    let xml = package.read_file(CORE_PROPERTIES_PART)?;
    let mut reader = Reader::from_str(&xml);
    let mut field: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => field = Some(local_name(&e)),
            Event::Text(e) => {
                let value = e.unescape()?.trim().to_string();
                if value.is_empty() {
                    continue;
                }
                match field.as_deref() {
                    Some("title") => metadata.title = Some(value),
                    Some("creator") => metadata.author = Some(value),
                    _ => {}
                }
            }
            Event::End(_) => field = None,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    const DOCX_BODY: &str = r#"<w:document xmlns:w="w"><w:body>
        <w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Report</w:t></w:r></w:p>
        <w:p><w:r><w:t>Body text</w:t></w:r></w:p>
    </w:body></w:document>"#;

    #[test]
    fn test_convert_docx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");
        write_zip(
            &path,
            &[
                ("word/document.xml", DOCX_BODY),
                (
                    "docProps/core.xml",
                    r#"<cp:coreProperties xmlns:cp="cp" xmlns:dc="dc"><dc:title>Q3</dc:title><dc:creator>Kim</dc:creator></cp:coreProperties>"#,
                ),
            ],
        );

        let conversion = convert_file(&path, &ConvertOptions::default()).unwrap();
        assert_eq!(conversion.markdown, "# Report\n\nBody text");
        assert_eq!(conversion.format, FormatType::Docx);
        assert_eq!(conversion.method, "docx");

        let document = to_document(&path, FormatType::Docx).unwrap();
        assert_eq!(document.metadata.title.as_deref(), Some("Q3"));
        assert_eq!(document.metadata.author.as_deref(), Some("Kim"));
    }

    #[test]
    fn test_doc_extension_on_zip_is_parsed_as_docx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renamed.doc");
        write_zip(&path, &[("word/document.xml", DOCX_BODY)]);

        let conversion = convert_file(&path, &ConvertOptions::default()).unwrap();
        assert_eq!(conversion.format, FormatType::Docx);
        assert!(conversion.markdown.contains("Body text"));
    }

    #[test]
    fn test_convert_text_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "first line\nsecond line\n\n\nnext para\n").unwrap();

        let conversion = convert_file(&path, &ConvertOptions::default()).unwrap();
        assert_eq!(conversion.markdown, "first line\nsecond line\n\nnext para");
        assert_eq!(conversion.method, "text");
    }

    #[test]
    fn test_empty_text_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "  \n\n").unwrap();

        assert!(matches!(
            convert_file(&path, &ConvertOptions::default()),
            Err(Error::EmptyDocument)
        ));
    }

    #[test]
    fn test_unknown_extension() {
        assert!(matches!(
            convert_file("image.png", &ConvertOptions::default()),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_corrupt_docx_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"not a zip").unwrap();

        assert!(matches!(
            convert_file(&path, &ConvertOptions::default()),
            Err(Error::ZipArchive(_))
        ));
    }
}
