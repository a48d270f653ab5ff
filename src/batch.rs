//! Directory batch conversion with per-file error isolation.
//!
//! Every source file yields one [`FileOutcome`]. A failure in one file is
//! recorded and the loop moves on; only an unusable output directory stops
//! a batch.

use crate::convert::{convert_file, ConvertOptions};
use crate::detect::{dotted_extension, is_supported};
use crate::error::{Error, Result};
use crate::naming::output_path_for;
use crate::pdf::{extract_with_fallback, render_report, PdfExtractor};
use chrono::Local;
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Input folder under the base directory.
pub const DOCS_DIR: &str = "docs";
/// Output folder under the base directory.
pub const OUTPUT_DIR: &str = "docs_output";
/// Extension of written files.
pub const MARKDOWN_EXT: &str = "md";

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Markdown was written to `output`
    Converted { output: PathBuf, method: String },
    /// The file was not attempted
    Skipped { reason: String },
    /// Conversion or writing failed
    Failed { error: String },
}

/// Outcome of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    /// Source path
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl FileOutcome {
    /// True for [`Outcome::Converted`].
    pub fn is_converted(&self) -> bool {
        matches!(self.outcome, Outcome::Converted { .. })
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Folder the Markdown files were written to
    pub output_dir: PathBuf,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Outcomes in processing order
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: FileOutcome) -> &FileOutcome {
        match outcome.outcome {
            Outcome::Converted { .. } => self.converted += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
        self.files.push(outcome);
        &self.files[self.files.len() - 1]
    }

    /// Output paths of converted files, in order.
    pub fn outputs(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter_map(|f| match &f.outcome {
                Outcome::Converted { output, .. } => Some(output.as_path()),
                _ => None,
            })
            .collect()
    }
}

/// Every regular file below `input`, sorted by name within each folder.
pub fn document_sources(input: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if entry.file_type().is_file() {
            sources.push(entry.into_path());
        }
    }
    Ok(sources)
}

/// PDF files directly inside `base`, then inside `base/docs` when it exists.
pub fn pdf_sources(base: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = vec![base.to_path_buf()];
    let docs = base.join(DOCS_DIR);
    if docs.is_dir() {
        dirs.push(docs);
    }

    let mut sources = Vec::new();
    for dir in dirs {
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_file() && dotted_extension(&path) == ".pdf" {
                found.push(path);
            }
        }
        found.sort();
        sources.extend(found);
    }
    Ok(sources)
}

/// Converts `sources` to Markdown files in `output_dir`.
///
/// Unsupported extensions are skipped. `on_file` sees each outcome as soon
/// as it is recorded.
pub fn convert_documents<F>(
    sources: &[PathBuf],
    output_dir: &Path,
    options: &ConvertOptions,
    mut on_file: F,
) -> Result<BatchReport>
where
    F: FnMut(&FileOutcome),
{
    std::fs::create_dir_all(output_dir)?;
    let mut report = BatchReport::new(output_dir);

    for path in sources {
        let outcome = if is_supported(path) {
            match convert_guarded(path, options) {
                Ok(conversion) => write_output(path, output_dir, &conversion.markdown)
                    .map(|output| Outcome::Converted {
                        output,
                        method: conversion.method,
                    })
                    .unwrap_or_else(|e| failed(path, e)),
                Err(e) => failed(path, e),
            }
        } else {
            let extension = dotted_extension(path);
            debug!(path = %path.display(), %extension, "skipping unsupported file");
            Outcome::Skipped {
                reason: format!("unsupported format ({})", extension),
            }
        };

        on_file(report.record(FileOutcome {
            path: path.clone(),
            outcome,
        }));
    }

    info!(
        converted = report.converted,
        skipped = report.skipped,
        failed = report.failed,
        "document batch finished"
    );
    Ok(report)
}

/// Converts every file below `input` into `output_dir`.
pub fn convert_directory(input: &Path, output_dir: &Path, options: &ConvertOptions) -> Result<BatchReport> {
    let sources = document_sources(input)?;
    convert_documents(&sources, output_dir, options, |_| {})
}

/// Sources below `base/docs`, or `None` when that folder does not exist.
pub fn docs_folder_sources(base: &Path) -> Result<Option<Vec<PathBuf>>> {
    let input = base.join(DOCS_DIR);
    if !input.is_dir() {
        debug!(path = %input.display(), "docs folder missing");
        return Ok(None);
    }
    document_sources(&input).map(Some)
}

/// Converts `base/docs` into `base/docs_output`.
///
/// Returns `None` without creating the output folder when `base/docs` is missing.
pub fn convert_docs_folder(base: &Path, options: &ConvertOptions) -> Result<Option<BatchReport>> {
    match docs_folder_sources(base)? {
        Some(sources) => convert_documents(&sources, &base.join(OUTPUT_DIR), options, |_| {}).map(Some),
        None => Ok(None),
    }
}

/// Converts PDF `sources` to report files in `output_dir` using the extractor chain.
pub fn convert_pdfs<F>(
    sources: &[PathBuf],
    output_dir: &Path,
    extractors: &[Box<dyn PdfExtractor>],
    mut on_file: F,
) -> Result<BatchReport>
where
    F: FnMut(&FileOutcome),
{
    std::fs::create_dir_all(output_dir)?;
    let mut report = BatchReport::new(output_dir);

    for path in sources {
        let outcome = match extract_with_fallback(path, extractors) {
            Ok(extraction) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let markdown = render_report(&file_name, &extraction, Local::now().naive_local());
                write_output(path, output_dir, &markdown)
                    .map(|output| Outcome::Converted {
                        output,
                        method: extraction.method.to_string(),
                    })
                    .unwrap_or_else(|e| failed(path, e))
            }
            Err(e) => failed(path, e),
        };

        on_file(report.record(FileOutcome {
            path: path.clone(),
            outcome,
        }));
    }

    info!(converted = report.converted, failed = report.failed, "pdf batch finished");
    Ok(report)
}

/// Converts the PDFs of `base` and `base/docs` into `output_dir`.
pub fn convert_pdf_directory(
    base: &Path,
    output_dir: &Path,
    extractors: &[Box<dyn PdfExtractor>],
) -> Result<BatchReport> {
    let sources = pdf_sources(base)?;
    convert_pdfs(&sources, output_dir, extractors, |_| {})
}

fn convert_guarded(path: &Path, options: &ConvertOptions) -> Result<crate::convert::Conversion> {
    catch_unwind(AssertUnwindSafe(|| convert_file(path, options))).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(Error::ExtractorPanicked(message))
    })
}

fn write_output(source: &Path, output_dir: &Path, markdown: &str) -> Result<PathBuf> {
    let output = output_path_for(source, output_dir, MARKDOWN_EXT);
    std::fs::write(&output, markdown)?;
    debug!(source = %source.display(), output = %output.display(), "written");
    Ok(output)
}

fn failed(path: &Path, error: Error) -> Outcome {
    warn!(path = %path.display(), error = %error, "conversion failed");
    Outcome::Failed {
        error: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::PdfPage;

    struct Fixed;

    impl PdfExtractor for Fixed {
        fn method(&self) -> &'static str {
            "fixed"
        }

        fn extract(&self, _path: &Path) -> Result<Vec<PdfPage>> {
            Ok(vec![PdfPage {
                number: 1,
                text: "page text".into(),
                tables: Vec::new(),
            }])
        }
    }

    #[test]
    fn test_unsupported_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("docs");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("image.png"), b"\x89PNG").unwrap();
        std::fs::write(input.join("notes.txt"), "hello").unwrap();
        let output = dir.path().join("out");

        let report = convert_directory(&input, &output, &ConvertOptions::default()).unwrap();
        assert_eq!((report.converted, report.skipped, report.failed), (1, 1, 0));
        assert_eq!(report.files[0].path, input.join("image.png"));
        assert!(matches!(report.files[0].outcome, Outcome::Skipped { .. }));
        assert_eq!(std::fs::read_to_string(output.join("notes.md")).unwrap(), "hello");
    }

    #[test]
    fn test_pdf_sources_scans_base_and_docs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::create_dir(dir.path().join("docs/nested")).unwrap();
        std::fs::write(dir.path().join("b.PDF"), b"").unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"").unwrap();
        std::fs::write(dir.path().join("c.txt"), b"").unwrap();
        std::fs::write(dir.path().join("docs/d.pdf"), b"").unwrap();
        std::fs::write(dir.path().join("docs/nested/e.pdf"), b"").unwrap();

        let names: Vec<String> = pdf_sources(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.PDF", "d.pdf"]);
    }

    #[test]
    fn test_pdf_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("scan.pdf");
        std::fs::write(&source, b"%PDF-1.4").unwrap();
        let chain: Vec<Box<dyn PdfExtractor>> = vec![Box::new(Fixed)];

        let mut seen = 0;
        let report = convert_pdfs(&[source], dir.path(), &chain, |_| seen += 1).unwrap();
        assert_eq!(seen, 1);
        assert_eq!(report.converted, 1);

        let written = std::fs::read_to_string(dir.path().join("scan.md")).unwrap();
        assert!(written.starts_with("# scan.pdf\n\n*Method: fixed*\n\n*Converted: "));
        assert!(written.ends_with("---\n\n\n## Page 1/1\n\npage text\n\n"));
    }

    #[test]
    fn test_report_serializes_status() {
        let outcome = FileOutcome {
            path: PathBuf::from("a.doc"),
            outcome: Outcome::Failed {
                error: "boom".into(),
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");
        assert_eq!(json["path"], "a.doc");
    }
}
