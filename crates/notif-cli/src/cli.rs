//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Notification resource sync - edit workflows, guides, layouts, message
/// types, and partials as local directories
#[derive(Parser, Debug)]
#[command(name = "notif")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a config file (defaults to ./notif.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Selection and connection options shared by every command
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Resource kind (workflow, guide, layout, message_type, partial)
    pub kind: String,

    /// Resource key; omit with --all
    pub key: Option<String>,

    /// Operate on every resource of the kind
    #[arg(long)]
    pub all: bool,

    /// Base directory holding the resource directories
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Environment to target
    #[arg(short, long)]
    pub env: Option<String>,

    /// Branch within the environment
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Root of the snapshot store
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch resources and write them as local directories
    ///
    /// Examples:
    ///   notif pull workflow onboarding       # One workflow
    ///   notif pull workflow --all            # Every workflow, pruning removed ones
    Pull {
        #[command(flatten)]
        common: CommonArgs,

        /// Preview without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Join local directories and persist them to the remote
    ///
    /// With --all, every directory is validated before anything is written;
    /// one failure blocks the whole batch.
    Push {
        #[command(flatten)]
        common: CommonArgs,

        /// Validate and report without persisting
        #[arg(long)]
        dry_run: bool,
    },

    /// Join and validate local directories without persisting
    Validate {
        #[command(flatten)]
        common: CommonArgs,
    },
}
