mod common;

use common::write_pdf;
use officemd::batch::{convert_pdf_directory, convert_pdfs, pdf_sources, Outcome, DOCS_DIR, OUTPUT_DIR};
use officemd::pdf::{default_extractors, PdfExtractor, PdfPage, PlainExtractor};
use officemd::{Error, Result};
use std::path::Path;

struct Raising(&'static str);

impl PdfExtractor for Raising {
    fn method(&self) -> &'static str {
        self.0
    }

    fn extract(&self, _path: &Path) -> Result<Vec<PdfPage>> {
        Err(Error::Pdf(format!("{} cannot read this file", self.0)))
    }
}

#[test]
fn test_plain_extractor_reads_generated_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.pdf");
    write_pdf(&path, &["Hello PDF", "Second line"]);

    let pages = PlainExtractor.extract(&path).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].number, 1);
    assert!(pages[0].text.contains("Hello PDF"), "{:?}", pages[0].text);
}

#[test]
fn test_fallback_to_text_only_method() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    write_pdf(&path, &["Quarterly numbers"]);
    let output = dir.path().join(OUTPUT_DIR);

    let chain: Vec<Box<dyn PdfExtractor>> = vec![Box::new(Raising("pdf-extract")), Box::new(PlainExtractor)];
    let report = convert_pdfs(&[path], &output, &chain, |_| {}).unwrap();

    assert_eq!(report.converted, 1);
    match &report.files[0].outcome {
        Outcome::Converted { method, output } => {
            assert_eq!(method, "lopdf");
            let written = std::fs::read_to_string(output).unwrap();
            assert!(written.starts_with("# report.pdf\n\n*Method: lopdf*\n\n"), "{}", written);
            assert!(written.contains("## Page 1/1"), "{}", written);
            assert!(written.contains("Quarterly numbers"), "{}", written);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn test_double_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.pdf");
    write_pdf(&path, &["unused"]);
    let output = dir.path().join(OUTPUT_DIR);

    let chain: Vec<Box<dyn PdfExtractor>> = vec![Box::new(Raising("first")), Box::new(Raising("second"))];
    let report = convert_pdfs(&[path], &output, &chain, |_| {}).unwrap();

    assert_eq!((report.converted, report.failed), (0, 1));
    match &report.files[0].outcome {
        Outcome::Failed { error } => {
            assert!(error.contains("first"), "{}", error);
            assert!(error.contains("second"), "{}", error);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(std::fs::read_dir(&output).unwrap().count(), 0);
}

#[test]
fn test_end_to_end_good_and_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join(DOCS_DIR);
    std::fs::create_dir(&docs).unwrap();
    write_pdf(&docs.join("a.pdf"), &["Hello from a"]);
    std::fs::write(docs.join("b.pdf"), b"%PDF-1.4\nthis is not a pdf body").unwrap();
    let output = dir.path().join(OUTPUT_DIR);

    let report = convert_pdf_directory(dir.path(), &output, &default_extractors()).unwrap();
    assert_eq!(report.converted, 1, "{:?}", report.files);
    assert_eq!(report.failed, 1, "{:?}", report.files);

    let names: Vec<String> = std::fs::read_dir(&output)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.md"]);

    let written = std::fs::read_to_string(output.join("a.md")).unwrap();
    assert!(written.starts_with("# a.pdf\n\n*Method: "), "{}", written);
    assert!(written.contains("Hello"), "{}", written);
}

#[test]
fn test_output_folder_is_not_scanned() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(OUTPUT_DIR)).unwrap();
    std::fs::write(dir.path().join(OUTPUT_DIR).join("x.pdf"), b"").unwrap();
    write_pdf(&dir.path().join("top.pdf"), &["top"]);

    let sources = pdf_sources(dir.path()).unwrap();
    assert_eq!(sources, vec![dir.path().join("top.pdf")]);
}
