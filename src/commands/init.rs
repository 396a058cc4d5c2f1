use anyhow::{Context as _, Result};

use crate::commands::Context;

pub async fn run(ctx: &Context, gpg_ids: &[String], path: Option<&str>) -> Result<()> {
    let output = ctx
        .client
        .init(path, gpg_ids)
        .await
        .context("Failed to initialize the password store")?;
    print!("{}", output);

    println!();
    println!("  1. Add an entry:       passclip insert web/example.com");
    println!("  2. Copy its password:  passclip copy web/example.com");
    println!();
    println!(
        "Copied secrets are cleared from the clipboard after {} seconds.",
        ctx.settings.clip_timeout.as_secs()
    );
    Ok(())
}
