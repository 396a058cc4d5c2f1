use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::command::{CommandBuilder, CommandLine};
use crate::error::{PassError, Result};
use crate::process::{EditSession, ProcessInvoker};
use crate::store::EntryContents;

/// Typed operations over the `pass` executable.
#[derive(Debug, Clone)]
pub struct PassClient {
    invoker: ProcessInvoker,
    commands: CommandBuilder,
}

impl PassClient {
    pub fn new(invoker: ProcessInvoker) -> Self {
        let commands = invoker.builder();
        Self { invoker, commands }
    }

    pub fn invoker(&self) -> &ProcessInvoker {
        &self.invoker
    }

    pub fn commands(&self) -> &CommandBuilder {
        &self.commands
    }

    /// Decrypt `entry` and return its full text.
    pub fn show(&self, entry: &str) -> Result<SecretString> {
        self.invoker
            .run(&self.commands.show(entry))
            .map(SecretString::new)
    }

    pub fn contents(&self, entry: &str) -> Result<EntryContents> {
        let text = self.show(entry)?;
        Ok(EntryContents::parse(text.expose_secret()))
    }

    /// The value of one field of `entry` (`secret` for the first line).
    pub fn field(&self, entry: &str, field: &str) -> Result<SecretString> {
        let contents = self.contents(entry)?;
        contents
            .field(field)
            .map(|value| SecretString::new(value.expose_secret().clone()))
            .ok_or_else(|| PassError::FieldNotFound {
                entry: entry.to_string(),
                field: field.to_string(),
            })
    }

    /// Store `contents` as the full text of `entry`.
    pub fn insert(&self, entry: &str, contents: &SecretString, force: bool) -> Result<()> {
        let cmd = self.commands.insert(entry, force);
        self.invoker
            .run_with_input(&cmd, Some(contents.expose_secret().as_str()))?;
        info!(entry, "inserted entry");
        Ok(())
    }

    pub async fn generate(
        &self,
        entry: &str,
        length: usize,
        force: bool,
        no_symbols: bool,
    ) -> Result<String> {
        self.run_to_completion(&self.commands.generate(entry, length, force, no_symbols))
            .await
    }

    pub async fn remove(&self, entry: &str, recursive: bool) -> Result<()> {
        self.run_to_completion(&self.commands.remove(entry, recursive))
            .await
            .map(drop)
    }

    pub async fn rename(&self, entry: &str, new_entry: &str, force: bool) -> Result<()> {
        self.run_to_completion(&self.commands.rename(entry, new_entry, force))
            .await
            .map(drop)
    }

    /// `pass copy`: duplicate an entry under a new name.
    pub async fn duplicate(&self, entry: &str, new_entry: &str, force: bool) -> Result<()> {
        self.run_to_completion(&self.commands.copy(entry, new_entry, force))
            .await
            .map(drop)
    }

    pub async fn init(&self, path: Option<&str>, gpg_ids: &[String]) -> Result<String> {
        self.run_to_completion(&self.commands.init(path, gpg_ids))
            .await
    }

    pub async fn git(&self, args: &[String]) -> Result<String> {
        self.run_to_completion(&self.commands.git(args)).await
    }

    pub async fn version(&self) -> Result<String> {
        self.run_to_completion(&self.commands.version()).await
    }

    pub fn edit(&self, entry: &str) -> Result<EditSession> {
        self.invoker.spawn_edit(&self.commands.edit(entry))
    }

    async fn run_to_completion(&self, cmd: &CommandLine) -> Result<String> {
        let output = self.invoker.spawn(cmd)?.finish().await?;
        info!(action = cmd.action(), entry = cmd.entry(), "external tool succeeded");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_pass, FakeStore};

    #[test]
    fn test_field_lookup_through_show() {
        let store = FakeStore::new();
        let client = store.client();
        assert_eq!(client.field("site", "secret").unwrap().expose_secret(), "hunter2");
        assert_eq!(client.field("site", "username").unwrap().expose_secret(), "alice");
    }

    #[test]
    fn test_missing_field_is_reported_with_entry() {
        let store = FakeStore::new();
        let err = store.client().field("site", "pin").unwrap_err();
        assert_eq!(err.to_string(), "Field 'pin' not found in 'site'.");
    }

    #[test]
    fn test_missing_entry_is_an_error_not_empty_output() {
        let store = FakeStore::new();
        let err = store.client().show("nope").unwrap_err();
        assert!(matches!(err, PassError::ExternalTool { ref entry, .. } if entry == "nope"));
        assert!(err.to_string().contains("not in the password store"));
    }

    #[test]
    fn test_insert_pipes_contents() {
        let store = FakeStore::new();
        let client = store.client();
        let contents = SecretString::new("s3cret\nusername: bob\n".to_string());
        client.insert("new/entry", &contents, false).unwrap();
        let written = std::fs::read_to_string(store.path().join("last-insert")).unwrap();
        assert_eq!(written, "insert --multiline new/entry\ns3cret\nusername: bob\n");
    }

    #[tokio::test]
    async fn test_generate_runs_asynchronously() {
        let store = FakeStore::new();
        let output = store.client().generate("foo", 20, true, true).await.unwrap();
        assert_eq!(output.trim(), "generate --force --no-symbols foo 20");
    }

    #[tokio::test]
    async fn test_async_failure_is_external_tool_error() {
        let store = FakeStore::new();
        let err = store.client().remove("locked", false).await.unwrap_err();
        assert!(matches!(err, PassError::ExternalTool { ref action, .. } if action == "remove"));
    }

    #[test]
    fn test_fake_pass_is_executable() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = fake_pass(dir.path(), "#!/bin/sh\nexit 0\n");
        assert!(ProcessInvoker::new(path.to_str().unwrap()).is_ok());
    }
}
