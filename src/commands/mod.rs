pub mod copy;
pub mod edit;
pub mod fields;
pub mod generate;
pub mod init;
pub mod insert;
pub mod list;
pub mod manage;
pub mod session;
pub mod show;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::debug;

use crate::clipboard::SystemClipboard;
use crate::config::{self, Settings};
use crate::lifecycle::{ConsoleNotifier, SecretClipboard};
use crate::pass::PassClient;
use crate::process::ProcessInvoker;
use crate::store::EntryRepository;

/// Everything a command needs, resolved once at startup.
pub struct Context {
    pub settings: Settings,
    pub client: PassClient,
    pub entries: EntryRepository,
}

impl Context {
    pub fn load(config_override: Option<&Path>) -> Result<Self> {
        let path = config_override.map(Path::to_path_buf).or_else(config::config_path);
        let cfg = match &path {
            Some(path) => config::read(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => config::Config::default(),
        };
        let settings = Settings::load(cfg)?;
        debug!(?settings, "resolved settings");

        let mut invoker = ProcessInvoker::new(&settings.executable)?
            .with_env("PASSWORD_STORE_DIR", settings.store_dir.to_string_lossy());
        if let Some(editor) = &settings.editor {
            invoker = invoker.with_env("EDITOR", editor.as_str());
        }

        Ok(Self {
            entries: EntryRepository::new(&settings.store_dir),
            client: PassClient::new(invoker),
            settings,
        })
    }

    /// The exposed-secret slot, backed by the system clipboard.
    pub fn secret_clipboard(&self) -> Result<SecretClipboard> {
        let clipboard = SystemClipboard::new().context("Failed to open the system clipboard")?;
        Ok(SecretClipboard::new(
            self.client.clone(),
            Box::new(clipboard),
            self.settings.clip_timeout,
            Arc::new(ConsoleNotifier),
        ))
    }
}

/// Block until `secrets` purges itself, or purge right away on Ctrl-C.
pub async fn hold_until_purged(secrets: &SecretClipboard) -> Result<()> {
    tokio::select! {
        _ = secrets.wait_until_purged() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            secrets.purge().await?;
        }
    }
    Ok(())
}
