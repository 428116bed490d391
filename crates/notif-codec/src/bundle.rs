//! Directory bundles
//!
//! A `DirectoryBundle` is the in-memory form of one resource directory:
//! exactly one manifest tree plus the sidecar files keyed by relative path.
//! It is built by the bundle builder and consumed by the writer within one
//! push or pull; nothing holds one longer than that.

use std::collections::BTreeMap;

use serde_json::Value;

use notif_fs::is_valid_relative_path;

use crate::resource::ResourceKind;
use crate::{Error, Result};

/// One resource directory's worth of content
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryBundle {
    kind: ResourceKind,
    manifest: Value,
    files: BTreeMap<String, String>,
}

impl DirectoryBundle {
    pub fn new(kind: ResourceKind, manifest: Value) -> Self {
        Self {
            kind,
            manifest,
            files: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn manifest(&self) -> &Value {
        &self.manifest
    }

    /// Replace the manifest tree.
    pub fn set_manifest(&mut self, manifest: Value) {
        self.manifest = manifest;
    }

    /// The manifest's file name within the directory.
    pub fn manifest_file_name(&self) -> &'static str {
        self.kind.manifest_file_name()
    }

    /// The manifest rendered as formatted JSON.
    pub fn manifest_json(&self) -> Result<String> {
        let mut rendered = serde_json::to_string_pretty(&self.manifest)?;
        rendered.push('\n');
        Ok(rendered)
    }

    /// Sidecar files by relative path, in stable order.
    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    pub fn get_file(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Add a sidecar file.
    ///
    /// Rejects malformed relative paths, a path equal to the manifest's file
    /// name, and collisions with an already added sidecar. A collision is
    /// always an error, never a silent overwrite.
    pub fn insert_file(
        &mut self,
        field: &str,
        path: impl Into<String>,
        content: String,
    ) -> Result<()> {
        let path = path.into();
        if !is_valid_relative_path(&path) || path == self.manifest_file_name() {
            return Err(Error::InvalidPath {
                field: field.to_string(),
                path,
            });
        }
        if self.files.contains_key(&path) {
            return Err(Error::PathCollision {
                field: field.to_string(),
                path,
            });
        }
        self.files.insert(path, content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_file_rejects_collision() {
        let mut bundle = DirectoryBundle::new(ResourceKind::Partial, json!({}));
        bundle
            .insert_file("content", "content.html", "<p/>".into())
            .unwrap();

        let err = bundle.insert_file("other", "content.html", "x".into());
        assert!(matches!(err, Err(Error::PathCollision { .. })));
    }

    #[test]
    fn test_insert_file_rejects_manifest_name_and_bad_paths() {
        let mut bundle = DirectoryBundle::new(ResourceKind::Partial, json!({}));
        assert!(matches!(
            bundle.insert_file("f", "partial.json", "x".into()),
            Err(Error::InvalidPath { .. })
        ));
        assert!(matches!(
            bundle.insert_file("f", "../escape.txt", "x".into()),
            Err(Error::InvalidPath { .. })
        ));
        assert!(matches!(
            bundle.insert_file("f", "/abs.txt", "x".into()),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_manifest_json_ends_with_newline() {
        let bundle = DirectoryBundle::new(ResourceKind::Layout, json!({"name": "default"}));
        let rendered = bundle.manifest_json().unwrap();
        assert!(rendered.ends_with('\n'));
        assert!(rendered.contains("\"name\""));
    }
}
