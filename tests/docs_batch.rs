mod common;

use common::{write_workbook, write_zip};
use officemd::batch::{convert_directory, convert_docs_folder, Outcome, DOCS_DIR, OUTPUT_DIR};
use officemd::ConvertOptions;
use std::path::Path;

fn output_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_unsupported_extension_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    std::fs::write(docs.join("photo.jpg"), b"\xFF\xD8\xFF").unwrap();
    let output = dir.path().join("docs_output");

    let report = convert_directory(&docs, &output, &ConvertOptions::default()).unwrap();
    assert_eq!(report.converted, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);
    assert!(output.is_dir());
    assert!(output_names(&output).is_empty());
}

#[test]
fn test_collisions_get_numbered_suffixes() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir_all(docs.join("a")).unwrap();
    std::fs::create_dir_all(docs.join("b")).unwrap();
    std::fs::write(docs.join("a/report.txt"), "from a").unwrap();
    std::fs::write(docs.join("b/report.txt"), "from b").unwrap();

    let output = dir.path().join("docs_output");
    std::fs::create_dir(&output).unwrap();
    std::fs::write(output.join("report.md"), "existing").unwrap();

    let report = convert_directory(&docs, &output, &ConvertOptions::default()).unwrap();
    assert_eq!(report.converted, 2);
    assert_eq!(output_names(&output), vec!["report.md", "report_1.md", "report_2.md"]);
    assert_eq!(std::fs::read_to_string(output.join("report.md")).unwrap(), "existing");
    assert_eq!(std::fs::read_to_string(output.join("report_1.md")).unwrap(), "from a");
    assert_eq!(std::fs::read_to_string(output.join("report_2.md")).unwrap(), "from b");
}

#[test]
fn test_failure_does_not_stop_batch() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    std::fs::write(docs.join("a_broken.docx"), b"not a zip").unwrap();
    std::fs::write(docs.join("b_notes.txt"), "still converted").unwrap();
    std::fs::write(docs.join("c_empty.txt"), "   ").unwrap();
    let output = dir.path().join("docs_output");

    let report = convert_directory(&docs, &output, &ConvertOptions::default()).unwrap();
    assert_eq!((report.converted, report.skipped, report.failed), (1, 0, 2));
    assert!(matches!(report.files[0].outcome, Outcome::Failed { .. }));
    assert!(report.files[1].is_converted());
    assert_eq!(output_names(&output), vec!["b_notes.md"]);
}

#[test]
fn test_office_formats() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();

    write_workbook(&docs.join("budget.xlsx"), &[("Costs", &["Item", "Rent"])], false);
    write_zip(
        &docs.join("memo.docx"),
        &[(
            "word/document.xml".to_string(),
            r#"<w:document xmlns:w="w"><w:body><w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Memo</w:t></w:r></w:p><w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Bold</w:t></w:r><w:r><w:t> plain</w:t></w:r></w:p></w:body></w:document>"#
                .to_string(),
        )],
    );
    write_zip(
        &docs.join("deck.pptx"),
        &[(
            "ppt/slides/slide1.xml".to_string(),
            r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>Agenda</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#
                .to_string(),
        )],
    );
    std::fs::write(
        docs.join("page.html"),
        "<html><body><h1>Title</h1><p>Some <b>bold</b> text</p></body></html>",
    )
    .unwrap();

    let output = dir.path().join("docs_output");
    let report = convert_directory(&docs, &output, &ConvertOptions::default()).unwrap();
    assert_eq!(report.failed, 0, "{:?}", report.files);
    assert_eq!(report.converted, 4);

    let budget = std::fs::read_to_string(output.join("budget.md")).unwrap();
    assert!(budget.contains("Costs"), "{}", budget);
    assert!(budget.contains("Rent"), "{}", budget);

    let memo = std::fs::read_to_string(output.join("memo.md")).unwrap();
    assert!(memo.starts_with("# Memo"), "{}", memo);
    assert!(memo.contains("**Bold** plain"), "{}", memo);

    let deck = std::fs::read_to_string(output.join("deck.md")).unwrap();
    assert!(deck.contains("Slide 1"), "{}", deck);
    assert!(deck.contains("Agenda"), "{}", deck);

    let page = std::fs::read_to_string(output.join("page.md")).unwrap();
    assert!(page.contains("Title"), "{}", page);
    assert!(page.contains("bold"), "{}", page);
}

#[test]
fn test_missing_docs_folder_converts_nothing() {
    let dir = tempfile::tempdir().unwrap();

    let report = convert_docs_folder(dir.path(), &ConvertOptions::default()).unwrap();
    assert!(report.is_none());
    assert!(!dir.path().join(OUTPUT_DIR).exists());
}

#[test]
fn test_docs_folder_writes_to_sibling_output() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(DOCS_DIR)).unwrap();
    std::fs::write(dir.path().join(DOCS_DIR).join("notes.txt"), "hello").unwrap();

    let report = convert_docs_folder(dir.path(), &ConvertOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(report.converted, 1);
    assert_eq!(output_names(&dir.path().join(OUTPUT_DIR)), vec!["notes.md"]);
}
