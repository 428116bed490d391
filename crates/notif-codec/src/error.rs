//! Error types for notif-codec

/// Result type for notif-codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in notif-codec operations
///
/// Join-time defects are not errors: they are aggregated as [`crate::Issue`]s
/// so a caller sees every problem in a resource at once. This enum covers the
/// fail-fast cases: malformed input to the builder and write-time failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The manifest file on disk is not valid structured data
    #[error("Malformed manifest at {path}: {message}")]
    MalformedManifest { path: String, message: String },

    /// Two fields resolved to the same sidecar path
    #[error("Sidecar path collision for {field}: {path}")]
    PathCollision { field: String, path: String },

    /// A computed or locally recorded sidecar path is not a well-formed
    /// relative path
    #[error("Invalid sidecar path for {field}: {path}")]
    InvalidPath { field: String, path: String },

    /// Workflow steps are structurally invalid
    #[error("Invalid workflow steps: {message}")]
    InvalidSteps { message: String },

    /// Step nesting exceeded the traversal guard
    #[error("Step nesting exceeds {max} levels")]
    DepthExceeded { max: usize },

    /// Filesystem error from notif-fs
    #[error(transparent)]
    Fs(#[from] notif_fs::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
