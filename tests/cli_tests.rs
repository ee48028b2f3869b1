use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use filetime::{FileTime, set_file_mtime};
use tempfile::TempDir;

fn replicate(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_replicate"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn source_tree(root: &Path) {
    fs::create_dir_all(root.join("src/a")).unwrap();
    fs::write(root.join("src/a/x.txt"), "x").unwrap();
    set_file_mtime(root.join("src/a/x.txt"), FileTime::from_unix_time(1_600_000_000, 0)).unwrap();
}

#[test]
fn test_sync_prints_actions_and_creates_destination() {
    let temp = TempDir::new().unwrap();
    source_tree(temp.path());

    let output = replicate(&["sync", "src", "out"], temp.path());
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    assert!(text.contains("Which"));
    assert!(text.contains("Create: [DIR] a/"));
    assert!(text.contains("Create: [FILE] a/x.txt"));
    assert!(text.contains("Touch: [DIR] a/"));
    assert_eq!(fs::read_to_string(temp.path().join("out/a/x.txt")).unwrap(), "x");

    let again = replicate(&["sync", "src", "out"], temp.path());
    assert!(stdout(&again).contains("(none)"));
}

#[test]
fn test_dry_run_leaves_destination_alone() {
    let temp = TempDir::new().unwrap();
    source_tree(temp.path());
    fs::create_dir(temp.path().join("out")).unwrap();
    fs::write(temp.path().join("out/stale"), "s").unwrap();

    let output = replicate(&["sync", "--dry-run", "src", "out"], temp.path());
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    assert!(text.contains("Delete: [FILE] stale"));
    assert!(text.contains("(dry run)"));
    assert!(temp.path().join("out/stale").exists());
    assert!(!temp.path().join("out/a").exists());
}

#[test]
fn test_json_output_lists_actions() {
    let temp = TempDir::new().unwrap();
    source_tree(temp.path());

    let output = replicate(&["sync", "--format", "json", "src", "out"], temp.path());
    assert!(output.status.success(), "{output:?}");

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["actions"].as_array().map(Vec::len), Some(3));
    assert_eq!(report["source"]["files"], 1);
    assert_eq!(report["summary"]["counts"]["create"], 2);
}

#[test]
fn test_run_uses_targets_file_in_order() {
    let temp = TempDir::new().unwrap();
    source_tree(temp.path());
    fs::write(
        temp.path().join("Replicate.toml"),
        r#"
[first]
source = "src"
dest = "one"

[second]
source = "src"
destination = "two"
exclude_source = "x\\.txt$"
"#,
    )
    .unwrap();

    let output = replicate(&["run"], temp.path());
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    let first = text.find("Target first").unwrap();
    let second = text.find("Target second").unwrap();
    assert!(first < second);
    assert!(temp.path().join("one/a/x.txt").exists());
    assert!(temp.path().join("two/a").is_dir());
    assert!(!temp.path().join("two/a/x.txt").exists());
}

#[test]
fn test_run_rejects_unknown_target() {
    let temp = TempDir::new().unwrap();
    source_tree(temp.path());
    fs::write(
        temp.path().join("Replicate.toml"),
        "[only]\nsource = \"src\"\ndest = \"out\"\n",
    )
    .unwrap();

    let output = replicate(&["run", "missing"], temp.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid configuration"));
    assert!(!temp.path().join("out").exists());
}

#[test]
fn test_run_rejects_empty_targets_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("Replicate.toml"), "# nothing yet\n").unwrap();

    let output = replicate(&["run"], temp.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no targets defined"));
}

#[test]
fn test_missing_source_fails() {
    let temp = TempDir::new().unwrap();
    let output = replicate(&["sync", "nope", "out"], temp.path());
    assert!(!output.status.success());
}

#[test]
fn test_scan_reports_counts() {
    let temp = TempDir::new().unwrap();
    source_tree(temp.path());

    let output = replicate(&["scan", "--format", "json", "src"], temp.path());
    assert!(output.status.success(), "{output:?}");

    let inventory: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(inventory["stats"]["dirs"], 2);
    assert_eq!(inventory["stats"]["files"], 1);
}

#[test]
fn test_scan_text_reports_rate_and_exclusions() {
    let temp = TempDir::new().unwrap();
    source_tree(temp.path());

    let output = replicate(&["scan", "--glob", "--exclude", "a/*.txt", "src"], temp.path());
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    assert!(text.contains("entries/s"));
    assert!(text.contains("1 excluded"));
}
