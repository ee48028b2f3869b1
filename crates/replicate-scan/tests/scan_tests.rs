use std::fs;
use std::time::{Duration, UNIX_EPOCH};

use filetime::{FileTime, set_file_mtime};
use replicate_core::{EntryKind, RegexMatcher};
use replicate_scan::TreeScanner;
use tempfile::TempDir;

#[test]
fn test_file_timestamps_are_captured() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("stamp.txt");
    fs::write(&file, "t").unwrap();
    set_file_mtime(&file, FileTime::from_unix_time(1_234_567_890, 500)).unwrap();

    let inventory = TreeScanner::new().scan(temp.path(), None).unwrap();
    let entry = inventory.get("stamp.txt").unwrap();

    assert_eq!(entry.kind, EntryKind::File);
    assert_eq!(
        entry.modified(),
        UNIX_EPOCH + Duration::new(1_234_567_890, 500)
    );
}

#[test]
fn test_regex_exclusion_matches_relative_paths() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("pkg/.git/objects")).unwrap();
    fs::create_dir_all(temp.path().join(".svn")).unwrap();
    fs::write(temp.path().join("pkg/lib.rs"), "").unwrap();
    fs::write(temp.path().join("pkg/.gitignore"), "").unwrap();

    let exclude = RegexMatcher::new(r"(?:^|/)\.(?:git|svn)(?:/|$)").unwrap();
    let inventory = TreeScanner::new()
        .scan(temp.path(), Some(&exclude))
        .unwrap();

    let mut paths: Vec<_> = inventory.paths().collect();
    paths.sort_unstable();
    assert_eq!(paths, vec!["", "pkg", "pkg/.gitignore", "pkg/lib.rs"]);
}

#[test]
fn test_listing_is_depth_first() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("a/b/c")).unwrap();
    fs::create_dir_all(temp.path().join("d/e")).unwrap();

    let inventory = TreeScanner::new().scan(temp.path(), None).unwrap();
    let paths: Vec<_> = inventory.paths().collect();

    let a = paths.iter().position(|p| *p == "a").unwrap();
    let d = paths.iter().position(|p| *p == "d").unwrap();
    let (first, second) = if a < d { (a, d) } else { (d, a) };
    let first_len = if a < d { 3 } else { 2 };
    assert_eq!(second, first + first_len);
    assert_eq!(inventory.stats().max_depth, 3);
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_recorded_not_followed() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("real")).unwrap();
    fs::write(temp.path().join("real/inner.txt"), "x").unwrap();
    std::os::unix::fs::symlink("real", temp.path().join("alias")).unwrap();
    std::os::unix::fs::symlink("nowhere", temp.path().join("dangling")).unwrap();

    let inventory = TreeScanner::new().scan(temp.path(), None).unwrap();

    assert_eq!(inventory.get("alias").map(|e| e.kind), Some(EntryKind::Symlink));
    assert_eq!(
        inventory.get("dangling").map(|e| e.kind),
        Some(EntryKind::Symlink)
    );
    assert!(!inventory.contains("alias/inner.txt"));
    assert_eq!(inventory.stats().files, 1);
    assert_eq!(inventory.stats().others, 2);
}

#[cfg(unix)]
#[test]
fn test_root_reached_through_symlink_is_followed() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("tree")).unwrap();
    fs::write(temp.path().join("tree/f"), "f").unwrap();
    std::os::unix::fs::symlink("tree", temp.path().join("entry")).unwrap();

    let inventory = TreeScanner::new()
        .scan(temp.path().join("entry"), None)
        .unwrap();

    assert_eq!(inventory.root().map(|e| e.kind), Some(EntryKind::Directory));
    assert!(inventory.contains("f"));
}

#[test]
fn test_rescan_yields_same_order() {
    let temp = TempDir::new().unwrap();
    for name in ["one", "two", "three"] {
        fs::create_dir(temp.path().join(name)).unwrap();
        fs::write(temp.path().join(name).join("leaf"), name).unwrap();
    }

    let scanner = TreeScanner::new();
    let first: Vec<String> = scanner
        .scan(temp.path(), None)
        .unwrap()
        .paths()
        .map(str::to_string)
        .collect();
    let second: Vec<String> = scanner
        .scan(temp.path(), None)
        .unwrap()
        .paths()
        .map(str::to_string)
        .collect();

    assert_eq!(first, second);
}
