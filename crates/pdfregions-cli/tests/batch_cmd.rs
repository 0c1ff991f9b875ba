//! Integration tests for the `batch` subcommand.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("pdfregions").unwrap()
}

/// Create a single-page PDF with the given content stream using lopdf.
fn pdf_with_content(content: &[u8]) -> Vec<u8> {
    use lopdf::{Object, Stream, dictionary};

    let mut doc = lopdf::Document::with_version("1.5");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
    let resources = dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_id),
        },
    };
    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ];
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => media_box,
        "Contents" => Object::Reference(content_id),
        "Resources" => resources,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Write a PDF with `text` drawn at 12pt, baseline at top=100pt, x=100pt.
fn write_pdf(dir: &Path, name: &str, text: &str) {
    let content = format!("BT /F1 12 Tf 100 692 Td ({text}) Tj ET");
    std::fs::write(dir.join(name), pdf_with_content(content.as_bytes())).unwrap();
}

fn write_template(dir: &Path, json: &str) -> String {
    let path = dir.join("template.json");
    std::fs::write(&path, json).unwrap();
    path.to_str().unwrap().to_string()
}

const TEMPLATE: &str = r#"{
  "alto": [90.0, 90.0, 300.0, 110.0],
  "bajo": [400.0, 400.0, 500.0, 500.0],
  "notas": [90.0, 90.0, 300.0, 110.0]
}"#;

#[test]
fn batch_over_directory_writes_sorted_rows() {
    let dir = tempfile::tempdir().unwrap();
    let pdfs = dir.path().join("pdfs");
    std::fs::create_dir(&pdfs).unwrap();
    write_pdf(&pdfs, "b_plan.pdf", "Hola   Mundo");
    write_pdf(&pdfs, "a_plan.PDF", "1.500");
    std::fs::write(pdfs.join("readme.txt"), "skip me").unwrap();
    let template = write_template(dir.path(), TEMPLATE);
    let output = dir.path().join("out/batch.csv");

    cmd()
        .args(["batch", &template, pdfs.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 document(s), skipped 0."));

    let csv = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        csv,
        "nombre_plan,alto,medio,bajo,alto_ambu,medio_ambu,bajo_ambu\n\
         a_plan,1.500,,,,,\n\
         b_plan,Hola Mundo,,,,,\n"
    );
}

#[test]
fn corrupt_document_is_skipped_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "good.pdf", "100");
    std::fs::write(dir.path().join("bad.pdf"), b"not a pdf").unwrap();
    let template = write_template(dir.path(), TEMPLATE);
    let output = dir.path().join("batch.csv");

    cmd()
        .args(["batch", &template, dir.path().to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped 1"))
        .stderr(predicate::str::contains("bad.pdf"));

    let csv = std::fs::read_to_string(&output).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("good,100,"));
}

#[test]
fn single_file_input_appends_on_each_run() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "plan.pdf", "42");
    let template = write_template(dir.path(), TEMPLATE);
    let pdf = dir.path().join("plan.pdf");
    let output = dir.path().join("batch.csv");

    for _ in 0..2 {
        cmd()
            .args(["batch", &template, pdf.to_str().unwrap(), "--output", output.to_str().unwrap()])
            .assert()
            .success();
    }

    let csv = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "plan,42,,,,,");
    assert_eq!(lines[1], lines[2]);
}

#[test]
fn x_tolerance_controls_word_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let content = b"BT /F1 12 Tf 100 692 Td (Hola) Tj 40 0 Td (Mundo) Tj ET";
    std::fs::write(dir.path().join("plan.pdf"), pdf_with_content(content)).unwrap();
    let template = write_template(dir.path(), TEMPLATE);
    let pdf = dir.path().join("plan.pdf");

    let default_out = dir.path().join("default.csv");
    cmd()
        .args(["batch", &template, pdf.to_str().unwrap(), "-o", default_out.to_str().unwrap()])
        .assert()
        .success();
    let csv = std::fs::read_to_string(&default_out).unwrap();
    assert_eq!(csv.lines().nth(1), Some("plan,Hola Mundo,,,,,"));

    let wide_out = dir.path().join("wide.csv");
    cmd()
        .args([
            "batch",
            &template,
            pdf.to_str().unwrap(),
            "-o",
            wide_out.to_str().unwrap(),
            "--x-tolerance",
            "50",
        ])
        .assert()
        .success();
    let csv = std::fs::read_to_string(&wide_out).unwrap();
    assert_eq!(csv.lines().nth(1), Some("plan,HolaMundo,,,,,"));
}

#[test]
fn existing_output_is_realigned_to_the_fixed_schema() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "plan.pdf", "7");
    let template = write_template(dir.path(), TEMPLATE);
    let output = dir.path().join("batch.csv");
    std::fs::write(&output, "bajo,extra,nombre_plan\n3,zzz,viejo\n").unwrap();

    cmd()
        .args([
            "batch",
            &template,
            dir.path().join("plan.pdf").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let csv = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        csv,
        "nombre_plan,alto,medio,bajo,alto_ambu,medio_ambu,bajo_ambu\n\
         viejo,,,3,,,\n\
         plan,7,,,,,\n"
    );
}

#[test]
fn default_output_path_is_batch_output_csv() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "plan.pdf", "9");
    let template = write_template(dir.path(), TEMPLATE);

    cmd()
        .current_dir(dir.path())
        .args(["batch", &template, "plan.pdf"])
        .assert()
        .success();

    assert!(dir.path().join("batch_output.csv").exists());
}

#[test]
fn malformed_template_exits_with_1() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "plan.pdf", "9");
    let template = write_template(dir.path(), r#"{"alto": [1, 2, 3]}"#);
    let output = dir.path().join("batch.csv");

    cmd()
        .args(["batch", &template, dir.path().to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("malformed template"));

    assert!(!output.exists());
}

#[test]
fn template_that_is_not_json_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "plan.pdf", "9");
    let template = write_template(dir.path(), "{alto: [1, 2, 3, 4]");

    cmd()
        .args(["batch", &template, dir.path().to_str().unwrap()])
        .current_dir(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("malformed template: not valid JSON"));
}

#[test]
fn missing_input_exits_with_1() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(dir.path(), TEMPLATE);

    cmd()
        .args(["batch", &template, "/nonexistent/pdfs"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn missing_template_exits_with_1() {
    cmd()
        .args(["batch", "/nonexistent/template.json", "."])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load template"));
}
