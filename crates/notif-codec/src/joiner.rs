//! Bundle reader / joiner
//!
//! The inverse of the builder: reads a manifest tree and inlines every
//! extracted sidecar's content back under its field. Runs in levels, because
//! an inlined JSON sidecar can itself contain markers (structured content
//! inside a structured sidecar); a marker found at level two resolves
//! relative to the file that referenced it, not the manifest.
//!
//! Joining never fails fast on a broken field. Every defect is recorded as an
//! [`Issue`] and the marker is left in place with its rebased path, so the
//! caller can report everything wrong with a resource in one pass.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use notif_fs::{NormalizedPath, io, normalize_relative};

use crate::issue::{Issue, IssueKind};
use crate::marker::{find_markers, marker_key};
use crate::path::ObjectPath;
use crate::resource::ResourceKind;
use crate::value::parent_object_mut;
use crate::{Error, Result};

/// Deepest nesting of extracted content currently produced: structured block
/// content inside a structured sidecar inside the manifest. A pragmatic
/// limit, not an architectural one.
pub const MAX_EXTRACTION_LEVELS: usize = 2;

/// Join tuning
#[derive(Debug, Clone)]
pub struct JoinOptions {
    /// How many levels of nested extraction to resolve
    pub max_levels: usize,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            max_levels: MAX_EXTRACTION_LEVELS,
        }
    }
}

/// Result of joining one resource directory
#[derive(Debug)]
pub struct JoinOutcome {
    /// The manifest tree with every readable sidecar inlined
    pub value: Value,
    /// Everything wrong with the resource, keyed by object path
    pub issues: Vec<Issue>,
}

impl JoinOutcome {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Read and parse a resource directory's manifest file.
pub fn read_manifest(dir: &NormalizedPath, kind: ResourceKind) -> Result<Value> {
    let path = dir.join(kind.manifest_file_name());
    let text = io::read_text(&path)?;
    serde_json::from_str(&text).map_err(|e| Error::MalformedManifest {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Inline every extracted file referenced by `manifest` back into the tree.
pub fn join(dir: &NormalizedPath, manifest: &Value, options: &JoinOptions) -> JoinOutcome {
    let mut tree = manifest.clone();
    let mut issues = Vec::new();

    // Uniqueness is enforced across the whole resource, all levels.
    let mut seen: BTreeSet<String> = BTreeSet::new();
    // Field path -> directory its content was read from, for rebasing the
    // next level's markers.
    let mut inlined_dirs: Vec<(ObjectPath, String)> = Vec::new();
    // Markers already reported; left in the tree, skipped on later levels.
    let mut failed: BTreeSet<String> = BTreeSet::new();

    for _ in 0..options.max_levels {
        let mut progressed = false;

        for found in find_markers(&tree) {
            let field_str = found.field_path.to_string();
            if failed.contains(&field_str) {
                continue;
            }

            let base_dir = inlined_dirs
                .iter()
                .filter(|(path, _)| path.is_ancestor_of(&found.field_path))
                .max_by_key(|(path, _)| path.depth())
                .map(|(_, dir)| dir.clone())
                .unwrap_or_default();

            let mut fail = |tree: &mut Value,
                            issues: &mut Vec<Issue>,
                            kind: IssueKind,
                            message: String,
                            rebased: Option<&str>| {
                issues.push(Issue::new(&field_str, kind, message));
                if let Some(rebased) = rebased {
                    set_marker(tree, &found.field_path, rebased);
                }
                failed.insert(field_str.clone());
            };

            let Some(raw) = found.value.as_str() else {
                fail(
                    &mut tree,
                    &mut issues,
                    IssueKind::InvalidPath,
                    "marker value is not a path string".to_string(),
                    None,
                );
                continue;
            };

            let combined = if base_dir.is_empty() {
                raw.to_string()
            } else {
                format!("{}/{}", base_dir, raw)
            };
            let Some(rebased) = normalize_relative(&combined) else {
                fail(
                    &mut tree,
                    &mut issues,
                    IssueKind::InvalidPath,
                    format!("not a well-formed relative path: {}", raw),
                    None,
                );
                continue;
            };

            if !seen.insert(rebased.clone()) {
                fail(
                    &mut tree,
                    &mut issues,
                    IssueKind::InvalidPath,
                    format!("duplicate sidecar reference: {}", rebased),
                    Some(&rebased),
                );
                continue;
            }

            let file = dir.join(&rebased);
            if !file.is_file() {
                fail(
                    &mut tree,
                    &mut issues,
                    IssueKind::MissingSidecar,
                    format!("referenced file does not exist: {}", rebased),
                    Some(&rebased),
                );
                continue;
            }

            let text = match io::read_text(&file) {
                Ok(text) => text,
                Err(e) => {
                    fail(
                        &mut tree,
                        &mut issues,
                        IssueKind::ReadFailure,
                        e.to_string(),
                        Some(&rebased),
                    );
                    continue;
                }
            };

            // Structured sidecars come back as trees so their own markers
            // are discoverable on the next level.
            let content = if rebased.ends_with(".json") {
                match serde_json::from_str(&text) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        fail(
                            &mut tree,
                            &mut issues,
                            IssueKind::ReadFailure,
                            format!("invalid JSON in {}: {}", rebased, e),
                            Some(&rebased),
                        );
                        continue;
                    }
                }
            } else {
                Value::String(text)
            };

            inline(&mut tree, &found.field_path, content);
            debug!(field = %field_str, path = %rebased, "inlined sidecar");
            inlined_dirs.push((found.field_path.clone(), parent_dir(&rebased).to_string()));
            progressed = true;
        }

        if !progressed {
            break;
        }
    }

    JoinOutcome {
        value: tree,
        issues,
    }
}

/// Replace the marker with the field's inlined content.
fn inline(tree: &mut Value, field_path: &ObjectPath, content: Value) {
    let Some(field) = field_path.last_key().map(str::to_string) else {
        return;
    };
    if let Some(parent) = parent_object_mut(tree, field_path) {
        parent.remove(&marker_key(&field));
        parent.insert(field, content);
    }
}

/// Rewrite a marker's value in place, keeping the marker itself.
fn set_marker(tree: &mut Value, field_path: &ObjectPath, rebased: &str) {
    let Some(field) = field_path.last_key().map(str::to_string) else {
        return;
    };
    if let Some(parent) = parent_object_mut(tree, field_path) {
        parent.insert(marker_key(&field), Value::String(rebased.to_string()));
    }
}

fn parent_dir(rel_path: &str) -> &str {
    rel_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}
