//! Command implementations for notif-cli

pub mod sync;

pub use sync::{run_pull, run_push, run_validate};

use colored::Colorize;

use notif_client::{Engine, EnvSelector, SnapshotStore, SyncReport};
use notif_codec::{DirectoryWriter, ResourceKind};
use notif_fs::NormalizedPath;

use crate::cli::CommonArgs;
use crate::config::Config;
use crate::error::{CliError, Result};

const DEFAULT_ENVIRONMENT: &str = "development";

/// Resolved selection plus a ready engine, shared by every command
pub struct Context {
    pub engine: Engine<SnapshotStore>,
    pub env: EnvSelector,
    pub kind: ResourceKind,
    pub index_dir: NormalizedPath,
    pub key: Option<String>,
    pub all: bool,
}

impl Context {
    pub fn new(config: &Config, common: &CommonArgs) -> Result<Self> {
        let kind: ResourceKind = common
            .kind
            .parse()
            .map_err(|e: String| CliError::user(e))?;

        if !common.all && common.key.is_none() {
            return Err(CliError::user("pass a resource key or --all"));
        }
        if common.all && common.key.is_some() {
            return Err(CliError::user("--all does not take a key"));
        }

        let snapshot_root = common
            .snapshot
            .clone()
            .or_else(|| config.snapshot_root.clone())
            .ok_or_else(|| {
                CliError::user("no snapshot store configured (pass --snapshot or set snapshot_root)")
            })?;

        let environment = common
            .env
            .clone()
            .or_else(|| config.environment.clone())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        let mut env = EnvSelector::new(environment);
        if let Some(branch) = common.branch.clone().or_else(|| config.branch.clone()) {
            env = env.with_branch(branch);
        }

        let store = SnapshotStore::new(snapshot_root);
        // Resource directories live under <dir>/<kind>s, e.g. ./workflows/onboarding
        let index_dir = NormalizedPath::new(&common.dir).join(&format!("{}s", kind));

        Ok(Self {
            engine: Engine::new(store, DirectoryWriter::default()),
            env,
            kind,
            index_dir,
            key: common.key.clone(),
            all: common.all,
        })
    }

    /// Directory of the single selected resource. Callers check `all` first.
    pub fn target_dir(&self) -> NormalizedPath {
        let key = self.key.as_deref().unwrap_or_default();
        self.index_dir.join(key)
    }
}

/// Print a report and turn failure into a process-level error.
pub fn finish(report: &SyncReport) -> Result<()> {
    for action in &report.actions {
        println!("{} {}", "=>".blue().bold(), action);
    }
    for resource in &report.reports {
        println!("{} {}", "FAIL".red().bold(), resource.key.bold());
        for issue in &resource.issues {
            println!("   {}", issue);
        }
    }

    if report.success {
        Ok(())
    } else {
        Err(CliError::user("validation failed"))
    }
}
