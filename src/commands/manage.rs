use anyhow::{Context as _, Result};

use crate::commands::Context;

pub async fn remove(ctx: &Context, entry: &str, recursive: bool) -> Result<()> {
    ctx.client
        .remove(entry, recursive)
        .await
        .with_context(|| format!("Failed to remove '{}'", entry))?;
    println!("Removed '{}'.", entry);
    Ok(())
}

pub async fn rename(ctx: &Context, entry: &str, new_entry: &str, force: bool) -> Result<()> {
    ctx.client
        .rename(entry, new_entry, force)
        .await
        .with_context(|| format!("Failed to rename '{}' to '{}'", entry, new_entry))?;
    println!("Renamed '{}' to '{}'.", entry, new_entry);
    Ok(())
}

pub async fn duplicate(ctx: &Context, entry: &str, new_entry: &str, force: bool) -> Result<()> {
    ctx.client
        .duplicate(entry, new_entry, force)
        .await
        .with_context(|| format!("Failed to copy '{}' to '{}'", entry, new_entry))?;
    println!("Copied '{}' to '{}'.", entry, new_entry);
    Ok(())
}

pub async fn git(ctx: &Context, args: &[String]) -> Result<()> {
    let output = ctx
        .client
        .git(args)
        .await
        .context("git command failed")?;
    print!("{}", output);
    Ok(())
}

pub async fn version(ctx: &Context) -> Result<()> {
    let output = ctx
        .client
        .version()
        .await
        .context("Failed to query the pass version")?;
    print!("{}", output);
    Ok(())
}
