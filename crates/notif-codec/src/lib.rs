//! Resource directory codec
//!
//! Bidirectional translation between a tree-shaped remote resource payload
//! and an on-disk directory where long-form fields live in sidecar files,
//! plus the transactional writer that applies the result safely.
//!
//! Pull: [`builder::build`] turns a fetched [`ResourceNode`] into a
//! [`DirectoryBundle`] (reusing the local manifest's extraction layout),
//! which [`DirectoryWriter`] persists all-or-nothing. Push:
//! [`joiner::read_manifest`] + [`joiner::join`] inline every sidecar back
//! into the tree, aggregating per-field [`Issue`]s instead of failing fast.

pub mod annotation;
pub mod builder;
pub mod bundle;
pub mod compiler;
pub mod error;
pub mod index;
pub mod issue;
pub mod joiner;
pub mod marker;
pub mod path;
pub mod resource;
pub mod step;
pub mod value;
pub mod writer;

pub use annotation::{Annotation, ExtractionSettings, READONLY_KEY, SCHEMA_KEY};
pub use builder::build;
pub use bundle::DirectoryBundle;
pub use error::{Error, Result};
pub use index::LocalStepIndex;
pub use issue::{Issue, IssueKind};
pub use joiner::{JoinOptions, JoinOutcome, MAX_EXTRACTION_LEVELS, join, read_manifest};
pub use marker::MARKER_SUFFIX;
pub use path::{ObjectPath, PathSegment};
pub use resource::{ResourceKind, ResourceNode};
pub use step::{Branch, BranchStep, CommonStep, MAX_STEP_DEPTH, Step};
pub use writer::DirectoryWriter;
