//! Aggregated per-field issues
//!
//! Joining a resource directory never fails fast: every defect found in the
//! tree is collected so a user sees one complete report. Remote validation
//! errors reuse the same shape.

use serde::{Deserialize, Serialize};

/// Classification of a per-field issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Manifest file is not valid structured data
    MalformedManifest,
    /// A marker references a sidecar file that does not exist
    MissingSidecar,
    /// A marker value is not a unique, well-formed relative path
    InvalidPath,
    /// I/O failure while reading a sidecar file
    ReadFailure,
    /// Field-level problem reported by the remote service
    RemoteValidation,
}

/// One problem with one field, keyed by its object path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Object path of the offending field (e.g. `steps[0].template.body`)
    pub path: String,
    /// What went wrong
    pub kind: IssueKind,
    /// Human-readable detail
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
