use anyhow::{Context as _, Result};

use crate::commands::{hold_until_purged, Context};

pub async fn run(ctx: &Context, entry: &str, field: &str) -> Result<()> {
    let secrets = ctx.secret_clipboard()?;
    secrets
        .copy(entry, field)
        .await
        .with_context(|| format!("Failed to copy {} of '{}'", field, entry))?;

    // The clipboard is only served while we are alive.
    hold_until_purged(&secrets).await
}
