use anyhow::{bail, Context as _, Result};
use secrecy::SecretString;
use zeroize::Zeroize;

use crate::commands::Context;

pub fn run(ctx: &Context, entry: &str, force: bool) -> Result<()> {
    if ctx.entries.contains(entry) && !force {
        bail!("'{}' already exists. Use --force to overwrite it.", entry);
    }

    let password = prompt_new_password(entry)?;
    ctx.client
        .insert(entry, &password, force)
        .with_context(|| format!("Failed to insert '{}'", entry))?;

    println!("Entry '{}' saved.", entry);
    Ok(())
}

/// Prompt twice; the returned text is the entry body (password plus newline).
fn prompt_new_password(entry: &str) -> Result<SecretString> {
    let mut password = rpassword::prompt_password(format!("Password for '{}': ", entry))
        .context("Failed to read password")?;
    let mut confirm = rpassword::prompt_password(format!("Retype password for '{}': ", entry))
        .context("Failed to read password confirmation")?;

    let matches = password == confirm;
    confirm.zeroize();
    if !matches {
        password.zeroize();
        bail!("Passwords do not match.");
    }
    if password.is_empty() {
        bail!("Password must not be empty.");
    }

    password.push('\n');
    Ok(SecretString::new(password))
}
