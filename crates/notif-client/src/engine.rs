//! Push/pull/validate orchestration
//!
//! Single-resource flows wrap one codec round trip; bulk flows follow the
//! validate-all-then-write-all protocol: if any resource in a batch fails
//! validation, nothing in the batch is written. Once writing begins each
//! resource's directory transaction stands alone; a late failure does not
//! roll back completed siblings.
//!
//! Bulk flows run their per-resource fetch/join/validate work sequentially
//! in key order. The protocol does not require this; it keeps reports and
//! prune behavior deterministic, and the async [`ResourceStore`] boundary
//! leaves room for a transport that issues requests concurrently.
//!
//! The engine takes no locks. Callers must serialize operations that target
//! the same directory.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use notif_codec::{
    DirectoryBundle, DirectoryWriter, Issue, JoinOptions, READONLY_KEY, ResourceKind, SCHEMA_KEY,
    build, join, read_manifest,
};
use notif_fs::{NormalizedPath, dir};

use crate::remote::{EnvSelector, PushOutcome, RemoteResource, ResourceStore};
use crate::{Error, Result};

/// Options shared by engine operations
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Report what would happen without touching the filesystem or remote
    pub dry_run: bool,
}

/// Issues for one resource in a batch
#[derive(Debug)]
pub struct ResourceReport {
    pub key: String,
    pub issues: Vec<Issue>,
}

/// Outcome of one engine operation
#[derive(Debug, Default)]
pub struct SyncReport {
    pub success: bool,
    pub actions: Vec<String>,
    pub reports: Vec<ResourceReport>,
}

impl SyncReport {
    fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    fn action(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }

    fn record_issues(&mut self, key: &str, issues: Vec<Issue>) {
        if !issues.is_empty() {
            self.success = false;
            self.reports.push(ResourceReport {
                key: key.to_string(),
                issues,
            });
        }
    }
}

/// Drives pull, push, and validate against a [`ResourceStore`]
pub struct Engine<S> {
    store: S,
    writer: DirectoryWriter,
    join_options: JoinOptions,
}

impl<S: ResourceStore> Engine<S> {
    pub fn new(store: S, writer: DirectoryWriter) -> Self {
        Self {
            store,
            writer,
            join_options: JoinOptions::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Pull one resource into `target`.
    ///
    /// An existing manifest in `target` supplies the reference layout so the
    /// user's customized extraction paths survive the re-pull.
    pub async fn pull(
        &self,
        kind: ResourceKind,
        key: &str,
        env: &EnvSelector,
        target: &NormalizedPath,
        options: &SyncOptions,
    ) -> Result<SyncReport> {
        let remote = self.store.fetch(kind, key, env).await?;
        let local = read_local_reference(target, kind);
        let bundle = build(&remote.node, local.as_ref(), remote.schema_ref.as_deref())?;

        let mut report = SyncReport::ok();
        if options.dry_run {
            report.action(format!("[dry-run] Would write {}", target));
        } else {
            self.writer.write(target, &bundle)?;
            report.action(format!("Wrote {}", target));
        }
        Ok(report)
    }

    /// Pull every resource of a kind into an index directory, pruning
    /// subdirectories whose resource no longer exists.
    pub async fn pull_all(
        &self,
        kind: ResourceKind,
        env: &EnvSelector,
        index_dir: &NormalizedPath,
        options: &SyncOptions,
    ) -> Result<SyncReport> {
        let keys = self.store.list(kind, env).await?;
        debug!(%kind, count = keys.len(), "pulling resources");

        let mut bundles: BTreeMap<String, DirectoryBundle> = BTreeMap::new();
        for key in &keys {
            let remote = self.store.fetch(kind, key, env).await?;
            let local = read_local_reference(&index_dir.join(key), kind);
            let bundle = build(&remote.node, local.as_ref(), remote.schema_ref.as_deref())?;
            bundles.insert(key.clone(), bundle);
        }

        let mut report = SyncReport::ok();
        if options.dry_run {
            for key in bundles.keys() {
                report.action(format!("[dry-run] Would write {}", index_dir.join(key)));
            }
        } else {
            self.writer.write_index(index_dir, &bundles)?;
            for key in bundles.keys() {
                report.action(format!("Wrote {}", index_dir.join(key)));
            }
        }
        Ok(report)
    }

    /// Push one resource directory to the remote.
    ///
    /// On acceptance the directory is rebuilt from the canonical resource
    /// the remote returned, preserving the local extraction layout.
    pub async fn push(
        &self,
        kind: ResourceKind,
        key: &str,
        env: &EnvSelector,
        source: &NormalizedPath,
        options: &SyncOptions,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::ok();

        let Some((manifest, payload)) = self.read_joined(kind, key, source, &mut report)? else {
            return Ok(report);
        };

        if options.dry_run {
            report.action(format!("[dry-run] Would push {} {}", kind, key));
            return Ok(report);
        }

        match self.store.push(kind, key, env, &payload).await? {
            PushOutcome::Accepted(remote) => {
                self.write_accepted(kind, key, &remote, &manifest, source, &mut report)?;
            }
            PushOutcome::Rejected(issues) => {
                report.record_issues(key, issues);
            }
        }
        Ok(report)
    }

    /// Push every resource directory under an index directory.
    ///
    /// Validate-all-then-write-all: every directory is joined and validated
    /// first; if anything fails, nothing is pushed or written.
    pub async fn push_all(
        &self,
        kind: ResourceKind,
        env: &EnvSelector,
        index_dir: &NormalizedPath,
        options: &SyncOptions,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::ok();

        let mut pending: Vec<(String, Value, Value)> = Vec::new();
        for key in dir::list_subdirs(index_dir)? {
            let source = index_dir.join(&key);
            if let Some((manifest, payload)) =
                self.read_joined(kind, &key, &source, &mut report)?
            {
                pending.push((key, manifest, payload));
            }
        }

        for (key, _, payload) in &pending {
            let issues = self.store.validate(kind, key, env, payload).await?;
            report.record_issues(key, issues);
        }

        if !report.success {
            warn!(%kind, "batch failed validation, nothing written");
            return Ok(report);
        }

        if options.dry_run {
            for (key, _, _) in &pending {
                report.action(format!("[dry-run] Would push {} {}", kind, key));
            }
            return Ok(report);
        }

        for (key, manifest, payload) in &pending {
            match self.store.push(kind, key, env, payload).await? {
                PushOutcome::Accepted(remote) => {
                    let source = index_dir.join(key);
                    self.write_accepted(kind, key, &remote, manifest, &source, &mut report)?;
                }
                PushOutcome::Rejected(issues) => {
                    // The batch already validated; a rejection here is a
                    // race with a concurrent change.
                    report.record_issues(key, issues);
                }
            }
        }
        Ok(report)
    }

    /// Join and remote-validate one resource directory without writing.
    pub async fn validate(
        &self,
        kind: ResourceKind,
        key: &str,
        env: &EnvSelector,
        source: &NormalizedPath,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::ok();
        if let Some((_, payload)) = self.read_joined(kind, key, source, &mut report)? {
            let issues = self.store.validate(kind, key, env, &payload).await?;
            report.record_issues(key, issues);
            if report.success {
                report.action(format!("{} {} is valid", kind, key));
            }
        }
        Ok(report)
    }

    /// Join and remote-validate every resource directory without writing.
    pub async fn validate_all(
        &self,
        kind: ResourceKind,
        env: &EnvSelector,
        index_dir: &NormalizedPath,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::ok();

        for key in dir::list_subdirs(index_dir)? {
            let source = index_dir.join(&key);
            if let Some((_, payload)) = self.read_joined(kind, &key, &source, &mut report)? {
                let issues = self.store.validate(kind, &key, env, &payload).await?;
                report.record_issues(&key, issues);
                if report.reports.iter().all(|r| r.key != key) {
                    report.action(format!("{} {} is valid", kind, key));
                }
            }
        }
        Ok(report)
    }

    /// Read a directory's manifest and join it; issues are recorded on the
    /// report and `None` is returned so the caller skips the resource.
    fn read_joined(
        &self,
        kind: ResourceKind,
        key: &str,
        source: &NormalizedPath,
        report: &mut SyncReport,
    ) -> Result<Option<(Value, Value)>> {
        let manifest = match read_manifest(source, kind) {
            Ok(manifest) => manifest,
            Err(notif_codec::Error::MalformedManifest { path, message }) => {
                report.record_issues(
                    key,
                    vec![Issue::new(
                        "",
                        notif_codec::IssueKind::MalformedManifest,
                        format!("{}: {}", path, message),
                    )],
                );
                return Ok(None);
            }
            Err(e) => return Err(Error::Codec(e)),
        };

        let outcome = join(source, &manifest, &self.join_options);
        if !outcome.is_clean() {
            report.record_issues(key, outcome.issues);
            return Ok(None);
        }

        Ok(Some((manifest, prepare_payload(outcome.value))))
    }

    /// Rebuild a directory from the accepted canonical resource, keeping the
    /// layout recorded in the pre-push manifest.
    fn write_accepted(
        &self,
        kind: ResourceKind,
        key: &str,
        remote: &RemoteResource,
        manifest: &Value,
        target: &NormalizedPath,
        report: &mut SyncReport,
    ) -> Result<()> {
        debug_assert_eq!(remote.node.kind, kind);
        let bundle = build(&remote.node, Some(manifest), remote.schema_ref.as_deref())?;
        self.writer.write(target, &bundle)?;
        report.action(format!("Pushed {} {}", kind, key));
        Ok(())
    }
}

/// Strip local bookkeeping before a tree goes to the remote.
fn prepare_payload(mut tree: Value) -> Value {
    if let Some(map) = tree.as_object_mut() {
        map.remove(READONLY_KEY);
        map.remove(SCHEMA_KEY);
    }
    tree
}

/// Load an existing manifest as the reference layout, tolerating absence and
/// breakage: a manifest the user has broken by hand must not block a pull.
fn read_local_reference(target: &NormalizedPath, kind: ResourceKind) -> Option<Value> {
    if !target.join(kind.manifest_file_name()).is_file() {
        return None;
    }
    match read_manifest(target, kind) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            warn!(dir = %target, error = %e, "ignoring unreadable local manifest");
            None
        }
    }
}
