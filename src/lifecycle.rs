use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::clipboard::Clipboard;
use crate::error::{PassError, Result};
use crate::pass::PassClient;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);

/// Receives user-facing lifecycle messages. Messages never contain secret values.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("{}", message);
    }
}

struct ExposedSecret {
    entry: String,
    field: String,
    value: SecretString,
}

struct Slot {
    clipboard: Box<dyn Clipboard>,
    exposed: Option<ExposedSecret>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every install; a timer only purges the generation it was
    /// scheduled for.
    generation: u64,
}

/// The single "currently exposed secret" slot. Copy, purge and timer expiry
/// all run under one mutex, so purge-before-install never interleaves with
/// another copy.
#[derive(Clone)]
pub struct SecretClipboard {
    client: PassClient,
    slot: Arc<Mutex<Slot>>,
    live: Arc<watch::Sender<bool>>,
    timeout: Duration,
    notifier: Arc<dyn Notifier>,
}

impl SecretClipboard {
    pub fn new(
        client: PassClient,
        clipboard: Box<dyn Clipboard>,
        timeout: Duration,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (live, _) = watch::channel(false);
        Self {
            client,
            slot: Arc::new(Mutex::new(Slot {
                clipboard,
                exposed: None,
                timer: None,
                generation: 0,
            })),
            live: Arc::new(live),
            timeout,
            notifier,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Decrypt `field` of `entry` and expose it on the clipboard until the
    /// timeout elapses. If decryption fails the slot is left untouched.
    pub async fn copy(&self, entry: &str, field: &str) -> Result<()> {
        let client = self.client.clone();
        let (lookup_entry, lookup_field) = (entry.to_string(), field.to_string());
        let value = tokio::task::spawn_blocking(move || client.field(&lookup_entry, &lookup_field))
            .await
            .map_err(|e| PassError::external("show", entry, e.to_string()))??;

        self.copy_value(entry, field, value).await
    }

    /// Expose an already-resolved value.
    pub async fn copy_value(&self, entry: &str, field: &str, value: SecretString) -> Result<()> {
        let mut slot = self.slot.lock().await;
        self.purge_locked(&mut slot)?;

        slot.clipboard.set_text(value.expose_secret())?;
        slot.generation += 1;
        let generation = slot.generation;
        slot.exposed = Some(ExposedSecret {
            entry: entry.to_string(),
            field: field.to_string(),
            value,
        });
        slot.timer = Some(self.schedule_purge(generation));
        self.live.send_replace(true);

        info!(entry, field, generation, "secret copied to clipboard");
        self.notifier.notify(&format!(
            "Copied {} for {} to the clipboard. Will clear in {} seconds.",
            field,
            entry,
            self.timeout.as_secs()
        ));
        Ok(())
    }

    /// Remove the exposed secret, if any. Returns the name of the field that
    /// was cleared; calling it again is a no-op returning `None`.
    pub async fn purge(&self) -> Result<Option<String>> {
        let mut slot = self.slot.lock().await;
        self.purge_locked(&mut slot)
    }

    #[cfg(test)]
    pub async fn is_live(&self) -> bool {
        self.slot.lock().await.exposed.is_some()
    }

    #[cfg(test)]
    pub async fn has_pending_timer(&self) -> bool {
        self.slot
            .lock()
            .await
            .timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// `(entry, field)` currently exposed.
    pub async fn exposed(&self) -> Option<(String, String)> {
        self.slot
            .lock()
            .await
            .exposed
            .as_ref()
            .map(|e| (e.entry.clone(), e.field.clone()))
    }

    /// Resolves once nothing is exposed.
    pub async fn wait_until_purged(&self) {
        let mut live = self.live.subscribe();
        let _ = live.wait_for(|live| !*live).await;
    }

    fn schedule_purge(&self, generation: u64) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.timeout).await;
            let mut slot = this.slot.lock().await;
            if slot.generation != generation || slot.exposed.is_none() {
                debug!(generation, "stale purge timer ignored");
                return;
            }
            // Detach our own handle rather than aborting the running task.
            slot.timer = None;
            if let Err(e) = this.purge_locked(&mut slot) {
                warn!("automatic clipboard purge failed: {}", e);
            }
        })
    }

    fn purge_locked(&self, slot: &mut Slot) -> Result<Option<String>> {
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        let Some(mut exposed) = slot.exposed.take() else {
            return Ok(None);
        };
        self.live.send_replace(false);

        // Only blank the clipboard if it still holds our value; anything else
        // was put there by someone else.
        let still_ours = match slot.clipboard.get_text() {
            Ok(Some(mut current)) => {
                let same = current == *exposed.value.expose_secret();
                current.zeroize();
                same
            }
            Ok(None) => false,
            Err(e) => {
                warn!("could not read clipboard before purge: {}", e);
                true
            }
        };
        let cleared = if still_ours {
            slot.clipboard.clear()
        } else {
            debug!(field = %exposed.field, "clipboard changed since copy, leaving it alone");
            Ok(())
        };

        exposed.value = SecretString::new(String::new());
        info!(entry = %exposed.entry, field = %exposed.field, still_ours, "secret purged");
        self.notifier.notify(&if still_ours {
            format!("Field {} cleared from the clipboard.", exposed.field)
        } else {
            format!(
                "Field {} forgotten; the clipboard was changed since copying and was left as is.",
                exposed.field
            )
        });

        cleared.map(|_| Some(exposed.field))
    }
}
