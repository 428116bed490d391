//! Snapshot-backed resource store
//!
//! A [`ResourceStore`] over a directory of exported resource records, laid
//! out as `<root>/<environment>[/branches/<branch>]/<kind>/<key>.json`. Used
//! for offline work against an export and as the fixture store in tests; the
//! real HTTP transport implements the same trait elsewhere.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use notif_codec::{Annotation, Issue, IssueKind, ResourceKind, ResourceNode, Step};
use notif_fs::{NormalizedPath, io};

use crate::remote::{EnvSelector, PushOutcome, RemoteResource, ResourceStore};
use crate::{Error, Result};

/// One resource record on disk
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotRecord {
    payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema_ref: Option<String>,
}

/// Store over a directory of snapshot records
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: NormalizedPath,
}

impl SnapshotStore {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    fn kind_dir(&self, kind: ResourceKind, env: &EnvSelector) -> NormalizedPath {
        let mut dir = self.root.join(&env.environment);
        if let Some(branch) = &env.branch {
            dir = dir.join("branches").join(branch);
        }
        dir.join(&kind.to_string())
    }

    fn record_path(&self, kind: ResourceKind, key: &str, env: &EnvSelector) -> NormalizedPath {
        self.kind_dir(kind, env).join(&format!("{}.json", key))
    }

    fn load(&self, kind: ResourceKind, key: &str, env: &EnvSelector) -> Result<SnapshotRecord> {
        let path = self.record_path(kind, key, env);
        if !path.is_file() {
            return Err(Error::NotFound {
                kind,
                key: key.to_string(),
            });
        }
        let text = io::read_text(&path)?;
        serde_json::from_str(&text).map_err(|e| Error::Remote {
            message: format!("invalid snapshot record {}: {}", path, e),
        })
    }

    /// Structural validation mirroring what the service rejects outright.
    fn check_payload(kind: ResourceKind, payload: &Value) -> Vec<Issue> {
        let mut issues = Vec::new();

        if !payload.is_object() {
            issues.push(Issue::new(
                "",
                IssueKind::RemoteValidation,
                "payload must be an object",
            ));
            return issues;
        }

        if kind == ResourceKind::Workflow
            && let Some(steps) = payload.get("steps")
            && let Err(e) = Step::parse_all(steps)
        {
            issues.push(Issue::new("steps", IssueKind::RemoteValidation, e.to_string()));
        }

        issues
    }
}

#[async_trait]
impl ResourceStore for SnapshotStore {
    async fn list(&self, kind: ResourceKind, env: &EnvSelector) -> Result<Vec<String>> {
        let dir = self.kind_dir(kind, env);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in std::fs::read_dir(dir.as_ref())
            .map_err(|e| notif_fs::Error::io(dir.to_native(), e))?
        {
            let entry = entry.map_err(|e| notif_fs::Error::io(dir.to_native(), e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(key) = name.strip_suffix(".json") {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn fetch(
        &self,
        kind: ResourceKind,
        key: &str,
        env: &EnvSelector,
    ) -> Result<RemoteResource> {
        let record = self.load(kind, key, env)?;
        let annotation = record
            .annotation
            .unwrap_or_else(|| kind.default_annotation());
        debug!(%kind, key, "fetched snapshot record");
        Ok(RemoteResource {
            node: ResourceNode::with_annotation(kind, record.payload, annotation),
            schema_ref: record.schema_ref,
        })
    }

    async fn validate(
        &self,
        kind: ResourceKind,
        _key: &str,
        _env: &EnvSelector,
        payload: &Value,
    ) -> Result<Vec<Issue>> {
        Ok(Self::check_payload(kind, payload))
    }

    async fn push(
        &self,
        kind: ResourceKind,
        key: &str,
        env: &EnvSelector,
        payload: &Value,
    ) -> Result<PushOutcome> {
        let issues = Self::check_payload(kind, payload);
        if !issues.is_empty() {
            return Ok(PushOutcome::Rejected(issues));
        }

        // Keep any existing annotation/schema_ref; replace the payload.
        let (annotation, schema_ref) = match self.load(kind, key, env) {
            Ok(record) => (record.annotation, record.schema_ref),
            Err(Error::NotFound { .. }) => (None, None),
            Err(e) => return Err(e),
        };

        let record = SnapshotRecord {
            payload: payload.clone(),
            annotation,
            schema_ref,
        };
        let path = self.record_path(kind, key, env);
        io::write_text(&path, &serde_json::to_string_pretty(&record)?)?;
        debug!(%kind, key, "stored snapshot record");

        let annotation = record
            .annotation
            .unwrap_or_else(|| kind.default_annotation());
        Ok(PushOutcome::Accepted(RemoteResource {
            node: ResourceNode::with_annotation(kind, record.payload, annotation),
            schema_ref: record.schema_ref,
        }))
    }
}
