//! Config file loading
//!
//! `notif.toml` supplies defaults for flags the user does not pass. Lookup
//! order: an explicit `--config` path (missing file is an error), then
//! `./notif.toml`, then `<user config dir>/notif/notif.toml`. No file at all
//! is fine; every field has a flag.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CliError, Result};

pub const CONFIG_FILE_NAME: &str = "notif.toml";

/// Defaults loaded from notif.toml
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Environment to target when --env is not passed
    pub environment: Option<String>,

    /// Branch within the environment
    pub branch: Option<String>,

    /// Root directory of the snapshot store
    pub snapshot_root: Option<PathBuf>,
}

impl Config {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(CliError::user(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::read(path);
        }

        let local = Path::new(CONFIG_FILE_NAME);
        if local.is_file() {
            return Self::read(local);
        }

        if let Some(base) = dirs::config_dir() {
            let user = base.join("notif").join(CONFIG_FILE_NAME);
            if user.is_file() {
                return Self::read(&user);
            }
        }

        Ok(Self::default())
    }

    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
