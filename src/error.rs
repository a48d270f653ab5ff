//! Error types for officemd library.

use std::io;
use thiserror::Error;

/// Result type alias for officemd operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for officemd library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but not supported by this operation.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// ZIP archive parsing or writing error.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// XML parsing error in an OOXML part.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Spreadsheet reader error.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// PDF reader error.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Required part or stream is missing.
    #[error("Missing required component: {0}")]
    MissingComponent(String),

    /// Invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The document converted successfully but produced no text.
    #[error("Document contains no extractable text")]
    EmptyDocument,

    /// A third-party parser panicked while processing the file.
    #[error("Extractor panicked: {0}")]
    ExtractorPanicked(String),

    /// Every extractor in a fallback chain failed.
    #[error("All extraction methods failed: {}", .0.join("; "))]
    AllExtractorsFailed(Vec<String>),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Error::Spreadsheet(err.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Pdf(err.to_string())
    }
}

impl From<pdf_extract::OutputError> for Error {
    fn from(err: pdf_extract::OutputError) -> Self {
        Error::Pdf(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}
