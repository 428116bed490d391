//! Sync engine for notification resource directories
//!
//! Connects the directory codec in `notif-codec` to a remote resource
//! service behind the [`ResourceStore`] trait. [`Engine`] drives the three
//! flows: pull (fetch, extract, write), push (join, validate, persist), and
//! validate. [`SnapshotStore`] is a file-backed store for offline work
//! against an exported snapshot.

pub mod engine;
pub mod error;
pub mod remote;
pub mod snapshot;

pub use engine::{Engine, ResourceReport, SyncOptions, SyncReport};
pub use error::{Error, Result};
pub use remote::{EnvSelector, PushOutcome, RemoteResource, ResourceStore};
pub use snapshot::SnapshotStore;
