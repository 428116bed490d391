//! Error types for notif-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from notif-client
    #[error(transparent)]
    Client(#[from] notif_client::Error),

    /// Error from notif-codec
    #[error(transparent)]
    Codec(#[from] notif_codec::Error),

    /// Error from notif-fs
    #[error(transparent)]
    Fs(#[from] notif_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
