//! Integration tests for all CLI commands
//!
//! Each test runs the binary inside its own temporary working directory with
//! `HOME` pointed at an empty directory, so no real configuration leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::TempDir;
use zip::write::{SimpleFileOptions, ZipWriter};

const PDF_BYTES: &[u8] = b"%PDF-1.4\n%%EOF\n";

/// Temporary working and home directories for one invocation
struct Sandbox {
    work: TempDir,
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            work: TempDir::new().unwrap(),
            home: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.work.path()
    }

    fn cli(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_oleharvest"));
        cmd.current_dir(self.work.path())
            .env("HOME", self.home.path())
            .env_remove("RUST_LOG");
        cmd
    }

    fn write(&self, name: &str, bytes: &[u8]) {
        fs::write(self.work.path().join(name), bytes).unwrap();
    }
}

fn compound(streams: &[(&str, &[u8])]) -> Vec<u8> {
    let mut comp = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    for (path, contents) in streams {
        let mut stream = comp.create_stream(path).unwrap();
        stream.write_all(contents).unwrap();
        stream.flush().unwrap();
    }
    comp.flush().unwrap();
    comp.into_inner().into_inner()
}

fn docx(embedded: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let parts: [(&str, &[u8]); 2] = [
        ("[Content_Types].xml", b"<Types/>"),
        ("word/document.xml", b"<w:document/>"),
    ];
    for (name, contents) in parts.iter().chain(embedded) {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// `plan.docx` holding one OLE object that wraps a PDF
fn plan_docx() -> Vec<u8> {
    let object = compound(&[("/\u{1}CompObj", b"compobj"), ("/CONTENTS", PDF_BYTES)]);
    docx(&[("word/embeddings/oleObject1.bin", object.as_slice())])
}

// ============ EXTRACT COMMAND TESTS ============

#[test]
fn test_help() {
    Sandbox::new()
        .cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recover documents embedded"));
}

#[test]
fn test_extract_writes_artifacts() {
    let sandbox = Sandbox::new();
    sandbox.write("plan.docx", &plan_docx());

    sandbox
        .cli()
        .args(["extract", "plan.docx", "-o", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plan_1.bin"))
        .stdout(predicate::str::contains("plan_1_nested_doc_2.pdf"));

    let pdf = sandbox.path().join("out/plan_1_nested_doc_2.pdf");
    assert_eq!(fs::read(pdf).unwrap(), PDF_BYTES);
}

#[test]
fn test_extract_json_report() {
    let sandbox = Sandbox::new();
    sandbox.write("plan.docx", &plan_docx());

    let output = sandbox
        .cli()
        .args(["extract", "plan.docx", "-o", "out", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let artifacts = json["reports"][0]["artifacts"].as_array().unwrap();
    assert_eq!(artifacts.len(), 2);
    assert_eq!(artifacts[1]["kind"], "pdf");
    assert_eq!(artifacts[1]["file_name"], "plan_1_nested_doc_2.pdf");
    assert!(json.get("cleanup").is_none());
}

#[test]
fn test_extract_cleanup_removes_containers() {
    let sandbox = Sandbox::new();
    sandbox.write("plan.docx", &plan_docx());

    sandbox
        .cli()
        .args(["extract", "plan.docx", "-o", "out", "--cleanup", ".bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 files"));

    assert!(!sandbox.path().join("out/plan_1.bin").exists());
    assert!(sandbox.path().join("out/plan_1_nested_doc_2.pdf").exists());
}

#[test]
fn test_extract_quiet_prints_nothing() {
    let sandbox = Sandbox::new();
    sandbox.write("plan.docx", &plan_docx());

    sandbox
        .cli()
        .args(["-q", "extract", "plan.docx", "-o", "out"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(sandbox.path().join("out/plan_1.bin").exists());
}

#[test]
fn test_extract_uses_project_config() {
    let sandbox = Sandbox::new();
    sandbox.write("plan.docx", &plan_docx());
    sandbox.write(
        ".oleharvest.toml",
        b"[extract]\noutput_dir = \"from-config\"\ncleanup = [\"bin\"]\n",
    );

    sandbox.cli().args(["extract", "plan.docx"]).assert().success();

    let out = sandbox.path().join("from-config");
    assert!(out.join("plan_1_nested_doc_2.pdf").exists());
    assert!(!out.join("plan_1.bin").exists());
}

#[test]
fn test_extract_defaults_to_extracted_dir() {
    let sandbox = Sandbox::new();
    sandbox.write("plan.docx", &plan_docx());

    sandbox.cli().args(["extract", "plan.docx"]).assert().success();

    assert!(sandbox.path().join("extracted/plan_1.bin").exists());
}

#[test]
fn test_extract_entry_failure_still_succeeds() {
    let sandbox = Sandbox::new();
    let object = compound(&[("/CONTENTS", PDF_BYTES)]);
    let truncated = &object[..64];
    sandbox.write(
        "plan.docx",
        &docx(&[
            ("word/embeddings/oleObject1.bin", truncated),
            ("word/embeddings/oleObject2.bin", object.as_slice()),
        ]),
    );

    sandbox
        .cli()
        .args(["extract", "plan.docx", "-o", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 entries could not be extracted"));

    assert!(sandbox.path().join("out/plan_2_nested_doc_3.pdf").exists());
}

#[test]
fn test_extract_unsupported_input_fails() {
    let sandbox = Sandbox::new();
    sandbox.write("notes.txt", b"just text");

    sandbox
        .cli()
        .args(["extract", "notes.txt", "-o", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported input format"));
}

#[test]
fn test_extract_missing_input_fails() {
    Sandbox::new()
        .cli()
        .args(["extract", "missing.docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to extract missing.docx"));
}

#[test]
fn test_extract_multiple_inputs_share_names() {
    let sandbox = Sandbox::new();
    sandbox.write("a.docx", &plan_docx());
    sandbox.write("b.docx", &plan_docx());

    sandbox
        .cli()
        .args(["extract", "a.docx", "b.docx", "-o", "out"])
        .assert()
        .success();

    assert!(sandbox.path().join("out/a_1.bin").exists());
    assert!(sandbox.path().join("out/b_3.bin").exists());
    assert!(sandbox.path().join("out/b_3_nested_doc_4.pdf").exists());
}

// ============ LIST / INFO / UNPACK TESTS ============

#[test]
fn test_list_shows_classification() {
    let sandbox = Sandbox::new();
    sandbox.write("plan.docx", &plan_docx());

    sandbox
        .cli()
        .args(["list", "plan.docx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("word/embeddings/oleObject1.bin"))
        .stdout(predicate::str::contains("ole_package"));
}

#[test]
fn test_list_json() {
    let sandbox = Sandbox::new();
    sandbox.write("plan.docx", &plan_docx());

    let output = sandbox
        .cli()
        .args(["list", "plan.docx", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = listing.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    let candidates: Vec<&str> = entries
        .iter()
        .filter(|e| e["candidate"] == true)
        .map(|e| e["entry"].as_str().unwrap())
        .collect();
    assert_eq!(candidates, vec!["word/embeddings/oleObject1.bin"]);
}

#[test]
fn test_info_compound_json() {
    let sandbox = Sandbox::new();
    sandbox.write(
        "legacy.doc",
        &compound(&[("/WordDocument", b"word"), ("/\u{1}CompObj", b"c")]),
    );

    let output = sandbox
        .cli()
        .args(["info", "legacy.doc", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["envelope"], "compound");
    assert_eq!(info["entries"], 2);
    assert_eq!(info["candidates"], 1);
}

#[test]
fn test_info_text() {
    let sandbox = Sandbox::new();
    sandbox.write("plan.docx", &plan_docx());

    sandbox
        .cli()
        .args(["info", "plan.docx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive"))
        .stdout(predicate::str::contains("1 candidates"));
}

#[test]
fn test_unpack_preserves_paths() {
    let sandbox = Sandbox::new();
    sandbox.write("plan.docx", &plan_docx());

    sandbox
        .cli()
        .args(["unpack", "plan.docx", "-o", "unpacked"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unpacked 3 files"));

    assert!(sandbox.path().join("unpacked/word/document.xml").exists());
    assert!(sandbox
        .path()
        .join("unpacked/word/embeddings/oleObject1.bin")
        .exists());
}

#[test]
fn test_unpack_rejects_compound_file() {
    let sandbox = Sandbox::new();
    sandbox.write("legacy.doc", &compound(&[("/WordDocument", b"word")]));

    sandbox
        .cli()
        .args(["unpack", "legacy.doc", "-o", "unpacked"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open archive"));
}

// ============ CONFIG COMMAND TESTS ============

#[test]
fn test_config_path_defaults_to_project_file() {
    Sandbox::new()
        .cli()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".oleharvest.toml"));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let sandbox = Sandbox::new();

    sandbox.cli().args(["config", "init"]).assert().success();
    assert!(sandbox.path().join(".oleharvest.toml").exists());

    sandbox
        .cli()
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    sandbox
        .cli()
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_merges_user_and_project() {
    let sandbox = Sandbox::new();
    fs::write(
        sandbox.home.path().join(".oleharvest.toml"),
        "[extract]\noutput_dir = \"home-out\"\nmax_depth = 8\n",
    )
    .unwrap();
    sandbox.write(".oleharvest.toml", b"[extract]\nmax_depth = 2\n");

    let output = sandbox
        .cli()
        .args(["config", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["extract"]["output_dir"], "home-out");
    assert_eq!(config["extract"]["max_depth"], 2);
}
