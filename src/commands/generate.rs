use anyhow::{Context as _, Result};

use crate::commands::{hold_until_purged, Context};
use crate::store::SECRET_FIELD;

pub async fn run(
    ctx: &Context,
    entry: &str,
    length: Option<usize>,
    force: bool,
    no_symbols: bool,
    clip: bool,
) -> Result<()> {
    let length = length.unwrap_or(ctx.settings.generated_length);
    // Open the clipboard first so a headless session fails before the
    // password is replaced.
    let secrets = if clip {
        Some(ctx.secret_clipboard()?)
    } else {
        None
    };

    let output = ctx
        .client
        .generate(entry, length, force, no_symbols)
        .await
        .with_context(|| format!("Failed to generate a password for '{}'", entry))?;

    match secrets {
        Some(secrets) => {
            secrets
                .copy(entry, SECRET_FIELD)
                .await
                .with_context(|| format!("Failed to copy the new password of '{}'", entry))?;
            hold_until_purged(&secrets).await
        }
        None => {
            print!("{}", output);
            Ok(())
        }
    }
}
