//! Pull, push, and validate command implementations

use colored::Colorize;

use notif_client::SyncOptions;

use crate::commands::{Context, finish};
use crate::error::Result;

/// Run the pull command
pub async fn run_pull(ctx: &Context, dry_run: bool) -> Result<()> {
    println!(
        "{} Pulling {} resources from {}...",
        "=>".blue().bold(),
        ctx.kind,
        ctx.env.environment.bold()
    );

    let options = SyncOptions { dry_run };
    let report = if ctx.all {
        ctx.engine
            .pull_all(ctx.kind, &ctx.env, &ctx.index_dir, &options)
            .await?
    } else {
        let key = ctx.key.as_deref().unwrap_or_default();
        ctx.engine
            .pull(ctx.kind, key, &ctx.env, &ctx.target_dir(), &options)
            .await?
    };

    finish(&report)?;
    println!("{} Pull complete.", "OK".green().bold());
    Ok(())
}

/// Run the push command
pub async fn run_push(ctx: &Context, dry_run: bool) -> Result<()> {
    println!(
        "{} Pushing {} resources to {}...",
        "=>".blue().bold(),
        ctx.kind,
        ctx.env.environment.bold()
    );

    let options = SyncOptions { dry_run };
    let report = if ctx.all {
        ctx.engine
            .push_all(ctx.kind, &ctx.env, &ctx.index_dir, &options)
            .await?
    } else {
        let key = ctx.key.as_deref().unwrap_or_default();
        ctx.engine
            .push(ctx.kind, key, &ctx.env, &ctx.target_dir(), &options)
            .await?
    };

    finish(&report)?;
    println!("{} Push complete.", "OK".green().bold());
    Ok(())
}

/// Run the validate command
///
/// Joins each directory and asks the remote to validate the result; nothing
/// is persisted either locally or remotely.
pub async fn run_validate(ctx: &Context) -> Result<()> {
    println!(
        "{} Validating {} resources...",
        "=>".blue().bold(),
        ctx.kind
    );

    let report = if ctx.all {
        ctx.engine
            .validate_all(ctx.kind, &ctx.env, &ctx.index_dir)
            .await?
    } else {
        let key = ctx.key.as_deref().unwrap_or_default();
        ctx.engine
            .validate(ctx.kind, key, &ctx.env, &ctx.target_dir())
            .await?
    };

    finish(&report)?;
    println!("{} All resources are valid.", "OK".green().bold());
    Ok(())
}
