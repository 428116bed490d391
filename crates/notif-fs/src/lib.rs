//! Filesystem primitives for the notification CLI
//!
//! Normalized path handling, atomic single-file writes, recursive directory
//! operations, and an injectable temp-location provider.

pub mod dir;
pub mod error;
pub mod io;
pub mod path;
pub mod temp;

pub use error::{Error, Result};
pub use path::{NormalizedPath, is_valid_relative_path, normalize_relative, relative_to};
pub use temp::TempProvider;
