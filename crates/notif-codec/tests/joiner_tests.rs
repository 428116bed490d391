//! Tests for joining: inlining sidecars, rebasing, aggregated issues

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use notif_codec::{Error, IssueKind, JoinOptions, ResourceKind, join, read_manifest};
use notif_fs::NormalizedPath;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_join_inlines_sidecars() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "content.html", "<p>Hello</p>");

    let manifest = json!({"name": "header", "content@": "content.html"});
    let outcome = join(
        &NormalizedPath::new(temp.path()),
        &manifest,
        &JoinOptions::default(),
    );

    assert!(outcome.is_clean());
    assert_eq!(
        outcome.value,
        json!({"name": "header", "content": "<p>Hello</p>"})
    );
}

#[test]
fn test_missing_sidecar_is_collected_not_fatal() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "good.html", "<p/>");

    let manifest = json!({
        "content@": "good.html",
        "preview@": "missing.html"
    });
    let outcome = join(
        &NormalizedPath::new(temp.path()),
        &manifest,
        &JoinOptions::default(),
    );

    // The readable field is still joined.
    assert_eq!(outcome.value["content"], json!("<p/>"));
    // The broken one keeps its (rebased) marker and is reported.
    assert_eq!(outcome.value["preview@"], json!("missing.html"));
    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].path, "preview");
    assert_eq!(outcome.issues[0].kind, IssueKind::MissingSidecar);
}

#[test]
fn test_invalid_marker_paths_reported() {
    let temp = TempDir::new().unwrap();

    let manifest = json!({
        "a@": "/absolute.html",
        "b@": "../escape.html",
        "c@": 42
    });
    let outcome = join(
        &NormalizedPath::new(temp.path()),
        &manifest,
        &JoinOptions::default(),
    );

    assert_eq!(outcome.issues.len(), 3);
    assert!(outcome
        .issues
        .iter()
        .all(|i| i.kind == IssueKind::InvalidPath));
}

#[test]
fn test_duplicate_sidecar_reference_reported() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "shared.html", "<p/>");

    let manifest = json!({
        "a@": "shared.html",
        "b@": "shared.html"
    });
    let outcome = join(
        &NormalizedPath::new(temp.path()),
        &manifest,
        &JoinOptions::default(),
    );

    // Markers are visited in key order, so `a` wins and `b` is the duplicate.
    assert_eq!(outcome.value["a"], json!("<p/>"));
    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].path, "b");
    assert_eq!(outcome.issues[0].kind, IssueKind::InvalidPath);
}

#[test]
fn test_two_level_join_rebases_through_sidecar_dir() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "email_1/visual_blocks.json",
        r#"[{"content@": "visual_blocks/1.content.md", "settings": {}}]"#,
    );
    write(temp.path(), "email_1/visual_blocks/1.content.md", "# Block");

    let manifest = json!({
        "steps": [
            {"type": "channel", "ref": "email_1",
             "template": {"visual_blocks@": "email_1/visual_blocks.json"}}
        ]
    });
    let outcome = join(
        &NormalizedPath::new(temp.path()),
        &manifest,
        &JoinOptions::default(),
    );

    assert!(outcome.is_clean(), "issues: {:?}", outcome.issues);
    assert_eq!(
        outcome.value["steps"][0]["template"]["visual_blocks"],
        json!([{"content": "# Block", "settings": {}}])
    );
}

#[test]
fn test_level_cap_leaves_deeper_markers() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "blocks.json",
        r#"[{"content@": "blocks/1.content.md"}]"#,
    );
    write(temp.path(), "blocks/1.content.md", "# Block");

    let manifest = json!({"blocks@": "blocks.json"});
    let outcome = join(
        &NormalizedPath::new(temp.path()),
        &manifest,
        &JoinOptions { max_levels: 1 },
    );

    assert!(outcome.is_clean());
    // Level one inlined the JSON; its inner marker is left for level two.
    assert_eq!(
        outcome.value["blocks"][0]["content@"],
        json!("blocks/1.content.md")
    );
}

#[test]
fn test_nested_failure_keyed_by_inner_object_path() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "email_1/visual_blocks.json",
        r#"[{"content@": "visual_blocks/1.content.md"}]"#,
    );
    // The inner file is missing.

    let manifest = json!({
        "steps": [
            {"type": "channel", "ref": "email_1",
             "template": {"visual_blocks@": "email_1/visual_blocks.json"}}
        ]
    });
    let outcome = join(
        &NormalizedPath::new(temp.path()),
        &manifest,
        &JoinOptions::default(),
    );

    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(
        outcome.issues[0].path,
        "steps[0].template.visual_blocks[0].content"
    );
    assert_eq!(outcome.issues[0].kind, IssueKind::MissingSidecar);
    // The inner marker now shows where the file was expected.
    assert_eq!(
        outcome.value["steps"][0]["template"]["visual_blocks"][0]["content@"],
        json!("email_1/visual_blocks/1.content.md")
    );
}

#[test]
fn test_invalid_json_sidecar_is_read_failure() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "blocks.json", "not json at all {");

    let manifest = json!({"blocks@": "blocks.json"});
    let outcome = join(
        &NormalizedPath::new(temp.path()),
        &manifest,
        &JoinOptions::default(),
    );

    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].kind, IssueKind::ReadFailure);
    assert_eq!(outcome.value["blocks@"], json!("blocks.json"));
}

#[test]
fn test_read_manifest_classifies_malformed_json() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "workflow.json", "{ definitely broken");

    let err = read_manifest(&NormalizedPath::new(temp.path()), ResourceKind::Workflow);
    assert!(matches!(err, Err(Error::MalformedManifest { .. })));
}

#[test]
fn test_read_manifest_missing_file_is_fs_error() {
    let temp = TempDir::new().unwrap();
    let err = read_manifest(&NormalizedPath::new(temp.path()), ResourceKind::Guide);
    assert!(matches!(err, Err(Error::Fs(_))));
}
