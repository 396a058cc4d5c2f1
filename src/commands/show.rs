use anyhow::{Context as _, Result};
use secrecy::ExposeSecret;

use crate::commands::Context;

pub fn run(ctx: &Context, entry: &str, field: Option<&str>) -> Result<()> {
    let text = match field {
        Some(field) => ctx.client.field(entry, field),
        None => ctx.client.show(entry),
    }
    .with_context(|| format!("Failed to show '{}'", entry))?;

    let text = text.expose_secret();
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
    Ok(())
}

pub fn url(ctx: &Context, entry: &str) -> Result<()> {
    let contents = ctx
        .client
        .contents(entry)
        .with_context(|| format!("Failed to read '{}'", entry))?;
    match contents.url(&ctx.settings.url_field) {
        Some(url) => println!("{}", url),
        None => anyhow::bail!(
            "'{}' has no {} field.",
            entry,
            ctx.settings.url_field
        ),
    }
    Ok(())
}
