//! Tests for the transactional directory writer

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use notif_codec::{DirectoryBundle, DirectoryWriter, ResourceKind};
use notif_fs::{NormalizedPath, TempProvider};

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sample_bundle() -> DirectoryBundle {
    let mut bundle = DirectoryBundle::new(
        ResourceKind::Partial,
        json!({"name": "header", "content@": "content.html"}),
    );
    bundle
        .insert_file("content", "content.html", "<p>Hello</p>".into())
        .unwrap();
    bundle
}

/// A bundle whose entries cannot all be written: `conflict` lands as a file
/// first, then `conflict/inner.txt` needs it to be a directory.
fn failing_bundle() -> DirectoryBundle {
    let mut bundle = DirectoryBundle::new(ResourceKind::Partial, json!({}));
    bundle.insert_file("a", "conflict", "file".into()).unwrap();
    bundle
        .insert_file("b", "conflict/inner.txt", "inner".into())
        .unwrap();
    bundle
}

fn snapshot(dir: &Path) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    collect(dir, dir, &mut entries);
    entries
}

fn collect(root: &Path, dir: &Path, out: &mut BTreeMap<String, String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, out);
        } else {
            let rel = path.strip_prefix(root).unwrap().to_string_lossy().to_string();
            out.insert(rel, fs::read_to_string(&path).unwrap());
        }
    }
}

#[test]
fn test_write_to_fresh_directory() {
    let temp = TempDir::new().unwrap();
    let target = NormalizedPath::new(temp.path()).join("header");
    let writer = DirectoryWriter::new(TempProvider::new(temp.path().join("scratch")));

    writer.write(&target, &sample_bundle()).unwrap();

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(target.join("partial.json").to_native()).unwrap())
            .unwrap();
    assert_eq!(manifest["content@"], json!("content.html"));
    assert_eq!(
        fs::read_to_string(target.join("content.html").to_native()).unwrap(),
        "<p>Hello</p>"
    );
}

#[test]
fn test_overwrite_clears_stale_files() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("header");
    write(&target, "stale.html", "old");
    write(&target, "partial.json", "{}");

    let writer = DirectoryWriter::new(TempProvider::new(temp.path().join("scratch")));
    writer
        .write(&NormalizedPath::new(&target), &sample_bundle())
        .unwrap();

    assert!(!target.join("stale.html").exists());
    assert!(target.join("content.html").exists());
}

#[test]
fn test_failed_write_restores_previous_content() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("header");
    write(&target, "partial.json", r#"{"name": "original"}"#);
    write(&target, "content.html", "<p>original</p>");
    write(&target, "nested/extra.txt", "keep me");
    let before = snapshot(&target);

    let scratch = temp.path().join("scratch");
    let writer = DirectoryWriter::new(TempProvider::new(&scratch));
    let result = writer.write(&NormalizedPath::new(&target), &failing_bundle());

    assert!(result.is_err());
    // Byte-identical to the pre-write content.
    assert_eq!(snapshot(&target), before);
    // The backup snapshot never leaks.
    assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
}

#[test]
fn test_failure_after_clear_restores_cleared_entries() {
    // By the time the failing entry is reached, the clear phase has already
    // removed every pre-existing file; all of them must come back.
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("header");
    write(&target, "partial.json", r#"{"name": "original"}"#);
    write(&target, "cleared_a.html", "<p>a</p>");
    write(&target, "nested/cleared_b.txt", "b");

    let writer = DirectoryWriter::new(TempProvider::new(temp.path().join("scratch")));
    let result = writer.write(&NormalizedPath::new(&target), &failing_bundle());

    assert!(result.is_err());
    assert_eq!(
        fs::read_to_string(target.join("cleared_a.html")).unwrap(),
        "<p>a</p>"
    );
    assert_eq!(
        fs::read_to_string(target.join("nested/cleared_b.txt")).unwrap(),
        "b"
    );
    // Nothing from the failed bundle survives.
    assert!(!target.join("conflict").exists());
}

#[test]
fn test_failed_write_to_fresh_directory_removes_it() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("header");

    let writer = DirectoryWriter::new(TempProvider::new(temp.path().join("scratch")));
    let result = writer.write(&NormalizedPath::new(&target), &failing_bundle());

    assert!(result.is_err());
    assert!(!target.exists());
}

#[test]
fn test_backup_removed_after_success() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("header");
    write(&target, "partial.json", "{}");

    let scratch = temp.path().join("scratch");
    let writer = DirectoryWriter::new(TempProvider::new(&scratch));
    writer
        .write(&NormalizedPath::new(&target), &sample_bundle())
        .unwrap();

    assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
}

#[test]
fn test_write_index_prunes_stale_and_keeps_survivors() {
    let temp = TempDir::new().unwrap();
    let index = temp.path().join("partials");
    write(&index, "keep/partial.json", r#"{"name": "old"}"#);
    write(&index, "keep/custom.html", "customized");
    write(&index, "stale/partial.json", "{}");

    let mut bundles = BTreeMap::new();
    bundles.insert("keep".to_string(), sample_bundle());
    bundles.insert("fresh".to_string(), sample_bundle());

    let writer = DirectoryWriter::new(TempProvider::new(temp.path().join("scratch")));
    writer
        .write_index(&NormalizedPath::new(&index), &bundles)
        .unwrap();

    // Stale directory is pruned, fresh one created, surviving one rewritten.
    assert!(!index.join("stale").exists());
    assert!(index.join("fresh/partial.json").exists());
    assert!(index.join("keep/content.html").exists());
    assert!(!index.join("keep/custom.html").exists());
}
