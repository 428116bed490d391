//! Notification resource sync CLI
//!
//! Pull remote notification resources into editable local directories, and
//! push edited directories back.

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use commands::Context;
use config::Config;
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Pull { common, dry_run } => {
            let ctx = Context::new(&config, &common)?;
            commands::run_pull(&ctx, dry_run).await
        }
        Commands::Push { common, dry_run } => {
            let ctx = Context::new(&config, &common)?;
            commands::run_push(&ctx, dry_run).await
        }
        Commands::Validate { common } => {
            let ctx = Context::new(&config, &common)?;
            commands::run_validate(&ctx).await
        }
    }
}
