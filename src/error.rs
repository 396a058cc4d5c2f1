use thiserror::Error;

#[derive(Debug, Error)]
pub enum PassError {
    #[error("Executable '{0}' not found or not executable. Set `executable` in the config file.")]
    ExecutableNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{action}{} failed: {message}", quoted_entry(.entry))]
    ExternalTool {
        action: String,
        entry: String,
        message: String,
    },

    #[error("Cannot edit '{0}': another edit session is still running.")]
    EditInProgress(String),

    #[error("Argument cannot be passed safely to the shell: {0:?}")]
    UnsafeArgument(String),

    #[error("Field '{field}' not found in '{entry}'.")]
    FieldNotFound { entry: String, field: String },

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PassError {
    pub fn external(action: &str, entry: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = message.trim();
        PassError::ExternalTool {
            action: action.to_string(),
            entry: entry.to_string(),
            message: if message.is_empty() {
                "no diagnostic output".to_string()
            } else {
                message.to_string()
            },
        }
    }
}

/// ` 'entry'`, or nothing for commands that name no entry (`git`, `version`).
fn quoted_entry(entry: &str) -> String {
    if entry.is_empty() {
        String::new()
    } else {
        format!(" '{}'", entry)
    }
}

pub type Result<T> = std::result::Result<T, PassError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_error_names_entry() {
        let err = PassError::external("show", "web/site", "gpg: decryption failed\n");
        assert_eq!(err.to_string(), "show 'web/site' failed: gpg: decryption failed");
    }

    #[test]
    fn test_external_error_without_entry_omits_quotes() {
        let err = PassError::external("git", "", "fatal: not a git repository");
        assert_eq!(err.to_string(), "git failed: fatal: not a git repository");

        let err = PassError::external("version", "", "  ");
        assert_eq!(err.to_string(), "version failed: no diagnostic output");
    }
}
