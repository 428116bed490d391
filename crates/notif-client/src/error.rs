//! Error types for notif-client

use notif_codec::ResourceKind;

/// Result type for notif-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in notif-client operations
///
/// Per-field validation problems are not errors; they travel in
/// [`crate::SyncReport`]s so a whole batch can be reported at once.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote store failed
    #[error("Remote error: {message}")]
    Remote { message: String },

    /// No such resource on the remote
    #[error("Not found: {kind} {key}")]
    NotFound { kind: ResourceKind, key: String },

    /// Codec error from notif-codec
    #[error(transparent)]
    Codec(#[from] notif_codec::Error),

    /// Filesystem error from notif-fs
    #[error(transparent)]
    Fs(#[from] notif_fs::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
