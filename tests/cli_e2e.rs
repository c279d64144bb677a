use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::Path;

fn docshelf(data: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docshelf").unwrap();
    cmd.env("DOCSHELF_DATA", data)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .current_dir(data);
    cmd
}

fn write_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
}

#[test]
fn add_list_and_search() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "first line").unwrap();
    std::fs::write(dir.path().join("budget.txt"), "numbers").unwrap();

    docshelf(dir.path())
        .args(["add", "notes.txt", "--name", "Meeting notes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Document added: Meeting notes"));
    docshelf(dir.path())
        .args(["add", "budget.txt"])
        .assert()
        .success();

    docshelf(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Meeting notes"))
        .stdout(predicate::str::contains("2. budget.txt"))
        .stdout(predicate::str::contains("txt"));

    docshelf(dir.path())
        .args(["search", "MEETING"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Meeting notes"))
        .stdout(predicate::str::contains("budget").not());
}

#[test]
fn empty_shelf_lists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    docshelf(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No documents found."));
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("archive.zip"), "PK").unwrap();

    docshelf(dir.path())
        .args(["add", "archive.zip"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn convert_text_saves_a_pdf() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("todo.txt"), "milk\neggs\nbread").unwrap();
    docshelf(dir.path()).args(["add", "todo.txt"]).assert().success();

    let out = dir.path().join("out");
    docshelf(dir.path())
        .args(["convert", "1", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("todo.pdf"));

    let pdf = std::fs::read(out.join("todo.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn convert_never_overwrites_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("todo.txt"), "milk").unwrap();
    docshelf(dir.path()).args(["add", "todo.txt"]).assert().success();

    docshelf(dir.path()).args(["convert", "1"]).assert().success();
    docshelf(dir.path())
        .args(["convert", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("todo (1).pdf"));
}

#[test]
fn convert_word_document_with_both_qualities() {
    let dir = tempfile::tempdir().unwrap();
    write_docx(&dir.path().join("report.docx"), &["Quarterly report", "All good."]);
    docshelf(dir.path()).args(["add", "report.docx"]).assert().success();
    docshelf(dir.path())
        .args(["config", "settle-delay-ms", "0"])
        .assert()
        .success();

    for quality in ["basic", "advanced"] {
        let out = dir.path().join(quality);
        docshelf(dir.path())
            .args(["convert", "1", "--quality", quality, "--out"])
            .arg(&out)
            .assert()
            .success();
        let pdf = std::fs::read(out.join("report.pdf")).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }
}

#[test]
fn converting_an_image_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("photo.png"), [0x89, b'P', b'N', b'G']).unwrap();
    docshelf(dir.path()).args(["add", "photo.png"]).assert().success();

    let out = dir.path().join("out");
    docshelf(dir.path())
        .args(["convert", "1", "--out"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
    assert!(!out.exists());
}

#[test]
fn export_restores_original_bytes() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("todo.txt"), "milk").unwrap();
    docshelf(dir.path()).args(["add", "todo.txt"]).assert().success();

    let out = dir.path().join("exported");
    docshelf(dir.path())
        .args(["export", "1", "--out"])
        .arg(&out)
        .assert()
        .success();
    assert_eq!(std::fs::read_to_string(out.join("todo.txt")).unwrap(), "milk");
}

#[test]
fn view_shows_details() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("todo.txt"), "milk").unwrap();
    docshelf(dir.path())
        .args(["add", "todo.txt", "--description", "Shopping"])
        .assert()
        .success();

    docshelf(dir.path())
        .args(["view", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("todo.txt"))
        .stdout(predicate::str::contains("Shopping"))
        .stdout(predicate::str::contains("4 Bytes"));

    docshelf(dir.path())
        .args(["view", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn delete_asks_for_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("todo.txt"), "milk").unwrap();
    docshelf(dir.path()).args(["add", "todo.txt"]).assert().success();

    docshelf(dir.path())
        .args(["delete", "1"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aborted."));
    docshelf(dir.path())
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("todo.txt"));

    docshelf(dir.path())
        .args(["rm", "1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Document deleted: todo.txt"));
    docshelf(dir.path())
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("No documents found."));
}

#[test]
fn deleting_a_missing_id_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    docshelf(dir.path())
        .args(["delete", "no-such-id", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing deleted"));
}

#[test]
fn config_set_and_show() {
    let dir = tempfile::tempdir().unwrap();
    docshelf(dir.path())
        .args(["config", "default-quality", "basic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default-quality set to basic"));

    docshelf(dir.path())
        .args(["config", "default-quality"])
        .assert()
        .success()
        .stdout(predicate::str::contains("basic"));

    docshelf(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max-upload-bytes = 10485760"));
}

#[test]
fn paths_lists_data_files() {
    let dir = tempfile::tempdir().unwrap();
    docshelf(dir.path())
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"))
        .stdout(predicate::str::contains("documents.json"));
}
