use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::error::PassError;
use crate::lifecycle::DEFAULT_TIMEOUT;

const CONFIG_FILE: &str = "config.toml";
const DEFAULT_EXECUTABLE: &str = "pass";
const DEFAULT_STORE_DIR: &str = ".password-store";
const DEFAULT_GENERATED_LENGTH: usize = 25;
const DEFAULT_URL_FIELD: &str = "url";

const ENV_STORE_DIR: &str = "PASSWORD_STORE_DIR";
const ENV_CLIP_TIME: &str = "PASSWORD_STORE_CLIP_TIME";
const ENV_GENERATED_LENGTH: &str = "PASSWORD_STORE_GENERATED_LENGTH";

/// Contents of `config.toml`. Every key is optional; unset keys fall back to
/// the environment, then to built-in defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path or name of the `pass` executable.
    pub executable: Option<String>,
    pub store_dir: Option<PathBuf>,
    pub clip_timeout_secs: Option<u64>,
    pub generated_length: Option<usize>,
    pub url_field: Option<String>,
    /// Exported as `EDITOR` for edit sessions.
    pub editor: Option<String>,
}

/// Resolved settings, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct Settings {
    pub executable: String,
    pub store_dir: PathBuf,
    pub clip_timeout: Duration,
    pub generated_length: usize,
    pub url_field: String,
    pub editor: Option<String>,
}

impl Settings {
    /// Resolve against the process environment and the user's home directory.
    pub fn load(config: Config) -> Result<Self, PassError> {
        let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Self::resolve(config, |key| std::env::var(key).ok(), home)
    }

    /// Precedence for each setting: config file, then environment, then default.
    pub fn resolve(
        config: Config,
        env: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Result<Self, PassError> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let store_dir = match config.store_dir.or_else(|| env(ENV_STORE_DIR).map(PathBuf::from)) {
            Some(dir) => expand_home(&dir, home.as_deref())?,
            None => home
                .ok_or_else(|| {
                    PassError::Config(format!(
                        "Cannot locate the home directory; set {} or store_dir.",
                        ENV_STORE_DIR
                    ))
                })?
                .join(DEFAULT_STORE_DIR),
        };

        let clip_timeout = match config.clip_timeout_secs {
            Some(secs) => Duration::from_secs(secs),
            None => match env(ENV_CLIP_TIME) {
                Some(raw) => Duration::from_secs(parse_number(ENV_CLIP_TIME, &raw)?),
                None => DEFAULT_TIMEOUT,
            },
        };
        if clip_timeout.is_zero() {
            return Err(PassError::Config("Clipboard timeout must be at least one second.".into()));
        }

        let generated_length = match config.generated_length {
            Some(length) => length,
            None => match env(ENV_GENERATED_LENGTH) {
                Some(raw) => parse_number(ENV_GENERATED_LENGTH, &raw)?,
                None => DEFAULT_GENERATED_LENGTH,
            },
        };
        if generated_length == 0 {
            return Err(PassError::Config("Generated password length must be positive.".into()));
        }

        Ok(Self {
            executable: config
                .executable
                .unwrap_or_else(|| DEFAULT_EXECUTABLE.to_string()),
            store_dir,
            clip_timeout,
            generated_length,
            url_field: config
                .url_field
                .unwrap_or_else(|| DEFAULT_URL_FIELD.to_string()),
            editor: config.editor,
        })
    }
}

/// Default location of the config file, under the platform config directory.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "passclip").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Read and parse the config file. A missing file is an empty config.
pub fn read(path: &Path) -> Result<Config, PassError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(|e| PassError::Config(format!("{}: {}", path.display(), e)))
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, PassError> {
    raw.trim()
        .parse()
        .map_err(|_| PassError::Config(format!("{} must be a positive number, got {:?}", key, raw)))
}

fn expand_home(path: &Path, home: Option<&Path>) -> Result<PathBuf, PassError> {
    match path.strip_prefix("~") {
        Ok(rest) => home
            .map(|home| home.join(rest))
            .ok_or_else(|| PassError::Config("Cannot expand '~': no home directory.".into())),
        Err(_) => Ok(path.to_path_buf()),
    }
}
