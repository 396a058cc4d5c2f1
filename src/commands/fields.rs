use anyhow::{Context as _, Result};

use crate::commands::Context;

pub fn run(ctx: &Context, entry: &str) -> Result<()> {
    let contents = ctx
        .client
        .contents(entry)
        .with_context(|| format!("Failed to read '{}'", entry))?;
    for name in contents.field_names() {
        println!("{}", name);
    }
    Ok(())
}
