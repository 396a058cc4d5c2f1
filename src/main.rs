mod cli;
mod clipboard;
mod command;
mod commands;
mod config;
mod error;
mod lifecycle;
mod pass;
mod process;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use commands::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "passclip=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let ctx = Context::load(cli.config.as_deref())?;

    match cli.command {
        Command::Show { entry, field } => commands::show::run(&ctx, &entry, field.as_deref())?,
        Command::Copy { entry, field } => commands::copy::run(&ctx, &entry, &field).await?,
        Command::Url { entry } => commands::show::url(&ctx, &entry)?,
        Command::Fields { entry } => commands::fields::run(&ctx, &entry)?,
        Command::Edit { entry } => commands::edit::run(&ctx, &entry).await?,
        Command::Insert { entry, force } => commands::insert::run(&ctx, &entry, force)?,
        Command::Generate {
            entry,
            length,
            force,
            no_symbols,
            clip,
        } => commands::generate::run(&ctx, &entry, length, force, no_symbols, clip).await?,
        Command::Remove { entry, recursive } => {
            commands::manage::remove(&ctx, &entry, recursive).await?
        }
        Command::Rename {
            entry,
            new_entry,
            force,
        } => commands::manage::rename(&ctx, &entry, &new_entry, force).await?,
        Command::Duplicate {
            entry,
            new_entry,
            force,
        } => commands::manage::duplicate(&ctx, &entry, &new_entry, force).await?,
        Command::Init { gpg_ids, path } => {
            commands::init::run(&ctx, &gpg_ids, path.as_deref()).await?
        }
        Command::Git { args } => commands::manage::git(&ctx, &args).await?,
        Command::List { subdir } => commands::list::run(&ctx, subdir.as_deref())?,
        Command::Version => commands::manage::version(&ctx).await?,
        Command::Session => commands::session::run(&ctx).await?,
    }

    Ok(())
}
