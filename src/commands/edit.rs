use anyhow::{Context as _, Result};

use crate::commands::Context;
use crate::pass::PassClient;

pub async fn run(ctx: &Context, entry: &str) -> Result<()> {
    edit_entry(&ctx.client, entry).await?;
    println!("Finished editing '{}'.", entry);
    Ok(())
}

/// Hand the terminal to `pass edit` and return only once the editor exits.
/// Nothing else may read stdin while this is pending.
pub async fn edit_entry(client: &PassClient, entry: &str) -> Result<()> {
    let session = client
        .edit(entry)
        .with_context(|| format!("Failed to start editing '{}'", entry))?;
    session
        .wait()
        .await
        .with_context(|| format!("Editing '{}' failed", entry))
}
