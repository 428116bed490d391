//! The remote service boundary
//!
//! Everything the engine needs from the service, as an abstract async store.
//! The HTTP transport, authentication, and retry policy live behind this
//! trait and are not part of this workspace.

use async_trait::async_trait;
use serde_json::Value;

use notif_codec::{Issue, ResourceKind, ResourceNode};

use crate::Result;

/// Which environment (and optional branch) a request targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSelector {
    pub environment: String,
    pub branch: Option<String>,
}

impl EnvSelector {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            branch: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// A fetched resource: the annotated tree plus an optional schema reference
#[derive(Debug, Clone)]
pub struct RemoteResource {
    pub node: ResourceNode,
    pub schema_ref: Option<String>,
}

/// What the remote did with a pushed payload
#[derive(Debug)]
pub enum PushOutcome {
    /// The payload was accepted; the canonical resource comes back
    Accepted(RemoteResource),
    /// The payload was rejected with field-level issues
    Rejected(Vec<Issue>),
}

/// Abstract fetch/push/validate access to the remote service
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// List the keys of every resource of a kind in the environment.
    async fn list(&self, kind: ResourceKind, env: &EnvSelector) -> Result<Vec<String>>;

    /// Fetch one resource.
    async fn fetch(&self, kind: ResourceKind, key: &str, env: &EnvSelector)
    -> Result<RemoteResource>;

    /// Ask the remote to validate a payload without persisting it.
    async fn validate(
        &self,
        kind: ResourceKind,
        key: &str,
        env: &EnvSelector,
        payload: &Value,
    ) -> Result<Vec<Issue>>;

    /// Persist a payload.
    async fn push(
        &self,
        kind: ResourceKind,
        key: &str,
        env: &EnvSelector,
        payload: &Value,
    ) -> Result<PushOutcome>;
}
