use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

const HASH: &str = "0123456789abcdef0123456789abcdef";

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn build_export(root: &Path) {
    write_file(
        &root.join(format!("Page {HASH}/Note {HASH}.md")),
        &format!("# Note\n\n[Note](Note {HASH}.md)\n"),
    );
}

/// `ntidy` with an empty config home so user settings never leak in.
fn ntidy(config_home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ntidy"));
    cmd.env("XDG_CONFIG_HOME", config_home);
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn cleans_export_tree() {
    let tmp = tempdir().unwrap();
    let export = tmp.path().join("export");
    build_export(&export);

    ntidy(tmp.path())
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run mode: No"))
        .stdout(predicate::str::contains("Renamed directory:"))
        .stdout(predicate::str::contains("Updated content in:"))
        .stdout(predicate::str::contains("Processing complete!"));

    let note = export.join("Page/Note.md");
    assert_eq!(
        fs::read_to_string(note).unwrap(),
        "# Note\n\n[Note](Cheat%20Sheets/Note.md)\n"
    );
}

#[test]
fn dry_run_reports_would_actions_only() {
    let tmp = tempdir().unwrap();
    let export = tmp.path().join("export");
    build_export(&export);
    let note = export.join(format!("Page {HASH}/Note {HASH}.md"));
    let before = fs::read(&note).unwrap();

    ntidy(tmp.path())
        .arg(&export)
        .arg("--dry-run")
        .arg("--backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run mode: Yes"))
        .stdout(predicate::str::contains("Would rename directory:"))
        .stdout(predicate::str::contains("Would update content in:"))
        .stdout(predicate::str::contains("Would rename:"))
        .stdout(predicate::str::contains("Renamed").not())
        .stdout(predicate::str::contains("Updated content").not())
        .stdout(predicate::str::contains("(dry-run mode - no changes made)"));

    assert_eq!(fs::read(&note).unwrap(), before);
    assert!(!export.join("Page").exists());
    assert!(!note.with_file_name(format!("Note {HASH}.md.bak")).exists());
}

#[test]
fn backup_flag_keeps_original() {
    let tmp = tempdir().unwrap();
    let export = tmp.path().join("export");
    build_export(&export);
    let original = format!("# Note\n\n[Note](Note {HASH}.md)\n");

    ntidy(tmp.path())
        .arg(&export)
        .arg("--backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("(backup: "));

    let backup = export.join(format!("Page/Note {HASH}.md.bak"));
    assert_eq!(fs::read_to_string(backup).unwrap(), original);
    assert!(export.join("Page/Note.md").is_file());
}

#[test]
fn invalid_root_fails() {
    let tmp = tempdir().unwrap();

    ntidy(tmp.path())
        .arg(tmp.path().join("missing"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn missing_root_without_terminal_fails() {
    let tmp = tempdir().unwrap();

    assert_cmd::Command::from_std(ntidy(tmp.path()))
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no directory selected"));
}

#[test]
fn json_report() {
    let tmp = tempdir().unwrap();
    let export = tmp.path().join("export");
    build_export(&export);

    let assert = ntidy(tmp.path()).arg(&export).arg("--json").assert().success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(report["dirs_renamed"], 1);
    assert_eq!(report["files_renamed"], 1);
    assert_eq!(report["files_updated"], 1);
    assert_eq!(report["dry_run"], false);
    assert_eq!(report["actions"][0]["action"], "rename");
    assert_eq!(report["actions"][0]["kind"], "directory");
}

#[test]
fn hashes_mode_and_prefix_flags() {
    let tmp = tempdir().unwrap();
    let export = tmp.path().join("export");
    write_file(
        &export.join(format!("Index {HASH}.md")),
        &format!("[Note](Sub%20{HASH}/Note%20{HASH}.md) [A B](x.md)\n"),
    );

    ntidy(tmp.path()).arg(&export).args(["--mode", "hashes"]).assert().success();
    assert_eq!(
        fs::read_to_string(export.join("Index.md")).unwrap(),
        "[Note](Sub/Note.md) [A B](x.md)\n"
    );

    ntidy(tmp.path()).arg(&export).args(["--prefix", "Docs"]).assert().success();
    assert_eq!(
        fs::read_to_string(export.join("Index.md")).unwrap(),
        "[Note](Docs/Note.md) [A B](Docs/A%20B.md)\n"
    );
}

#[test]
fn reads_config_from_xdg_home() {
    let tmp = tempdir().unwrap();
    write_file(
        &tmp.path().join("notion-tidy/config.toml"),
        r#"
version = 1
[rewrite]
prefix = "Wiki"
[[rewrite.collapse]]
pattern = " FAQ FAQ"
replacement = " FAQ"
"#,
    );
    let export = tmp.path().join("export");
    write_file(&export.join("index.md"), "[Billing FAQ FAQ](Billing%20FAQ%20FAQ.md)\n");

    ntidy(tmp.path()).arg(&export).assert().success();

    assert_eq!(
        fs::read_to_string(export.join("index.md")).unwrap(),
        "[Billing FAQ FAQ](Wiki/Billing%20FAQ.md)\n"
    );
}

#[test]
fn missing_explicit_config_fails() {
    let tmp = tempdir().unwrap();

    ntidy(tmp.path())
        .arg(tmp.path())
        .arg("--config")
        .arg(tmp.path().join("nope.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error loading config"));
}

#[test]
fn second_run_has_nothing_to_clean() {
    let tmp = tempdir().unwrap();
    let export = tmp.path().join("export");
    build_export(&export);

    ntidy(tmp.path()).arg(&export).assert().success();
    ntidy(tmp.path())
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to clean."));
}
