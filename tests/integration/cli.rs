use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Temporary workspace with a template directory and an isolated config path.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("templates")).unwrap();
        Self {
            dir,
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn template(&self, name: &str, body: &str) {
        self.write(&format!("templates/{name}.wiki"), body);
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("wikiextract").unwrap();
        cmd.current_dir(self.path()).env_remove("RUST_LOG").arg("--config").arg(self.config_path());
        cmd
    }
}

#[test]
fn test_extract_text_to_stdout() {
    let ws = Workspace::new();
    ws.template("Convert", "{{{1}}} {{{2}}}");
    ws.write("Marathon.wiki", "'''Marathon''' is {{convert|42|km}} long.\n== Origin ==\nGreek.");

    ws.command()
        .args(["-q", "extract", "Marathon.wiki", "--templates", "templates"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Marathon\n\nMarathon is 42 km long.\n\nOrigin.\nGreek.\n"));
}

#[test]
fn test_extract_json_to_file_in_input_order() {
    let ws = Workspace::new();
    ws.write("First.wiki", "One.");
    ws.write("Second.wiki", "Two.");

    ws.command()
        .args([
            "-q",
            "extract",
            "First.wiki",
            "Second.wiki",
            "--format",
            "json",
            "--id",
            "10",
            "--url-base",
            "https://example.org/wiki",
            "--output",
            "out.jsonl",
            "--max-parallel",
            "2",
        ])
        .assert()
        .success();

    let out = std::fs::read_to_string(ws.path().join("out.jsonl")).unwrap();
    let records: Vec<serde_json::Value> =
        out.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["document_id"], "10");
    assert_eq!(records[0]["title"], "First");
    assert_eq!(records[0]["url"], "https://example.org/wiki?curid=10");
    assert_eq!(records[1]["document_id"], "11");
    assert_eq!(records[1]["text"], "Two.");
}

#[test]
fn test_extract_doc_envelope_with_title() {
    let ws = Workspace::new();
    ws.write("page.wiki", "Body text.");

    ws.command()
        .args(["-q", "extract", "page.wiki", "--format", "doc", "--title", "Custom Title", "--id", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<doc id=\"5\" url=\"https://en.wikipedia.org/wiki?curid=5\" title=\"Custom Title\">",
        ))
        .stdout(predicate::str::contains("Body text.\n</doc>"));
}

#[test]
fn test_discarded_document_produces_no_output() {
    let ws = Workspace::new();
    ws.write("config.toml", "discard_templates = [\"Disambiguation\"]\n");
    ws.write("Mercury.wiki", "Mercury may refer to:\n{{disambiguation}}");

    ws.command()
        .args(["-q", "extract", "Mercury.wiki"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_no_expand_removes_templates() {
    let ws = Workspace::new();
    ws.template("Greet", "Hello");
    ws.write("page.wiki", "Say {{greet}} now.");

    ws.command()
        .args(["-q", "extract", "page.wiki", "--templates", "templates", "--no-expand"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Say now."));
}

#[test]
fn test_expand_prints_wikitext() {
    let ws = Workspace::new();
    ws.template("Greet", "Hello, '''{{{1}}}'''");
    ws.write("page.wiki", "{{greet|Ada}} <!-- hidden --> [[Link]]");

    ws.command()
        .args(["-q", "expand", "page.wiki", "--templates", "templates"])
        .assert()
        .success()
        .stdout("Hello, '''Ada'''  [[Link]]\n");
}

#[test]
fn test_missing_input_fails() {
    let ws = Workspace::new();

    ws.command()
        .args(["extract", "absent.wiki"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_config_init_and_show() {
    let ws = Workspace::new();

    ws.command().args(["config", "init"]).assert().success();
    assert!(ws.config_path().exists());

    ws.command()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_template_depth = 30"))
        .stdout(predicate::str::contains("language = \"en\""));
}

#[test]
fn test_invalid_config_is_reported() {
    let ws = Workspace::new();
    ws.write("config.toml", "[limits]\nmax_template_depth = \"deep\"\n");
    ws.write("page.wiki", "text");

    ws.command()
        .args(["extract", "page.wiki"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}
