//! Configuration management for linctl.
//!
//! Configuration is a YAML file with kebab-case keys:
//!
//! ```yaml
//! api-url: https://api.linear.app/graphql
//! api-key: lin_api_xxx
//! timeout-secs: 30
//! title-width: 50
//! ```
//!
//! The file is looked up from `--config`, then `LINCTL_CONFIG`, then the
//! platform config directory (`linctl/config.yaml`). Only an explicitly named
//! file must exist; otherwise a missing file yields the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::client::DEFAULT_API_URL;
use crate::error::{Error, Result};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "LINCTL_CONFIG";

/// Environment variable holding the API key; wins over the file.
pub const API_KEY_ENV_VAR: &str = "LINEAR_API_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// linctl configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// GraphQL endpoint.
    pub api_url: String,

    /// Personal API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum title width in rendered trees.
    pub title_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            title_width: linctl_graph::style::DEFAULT_TITLE_WIDTH,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// it is not valid YAML for this schema.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Resolve configuration for this process.
    ///
    /// `explicit` is the `--config` flag. Environment overrides are applied
    /// after loading.
    ///
    /// # Errors
    ///
    /// Fails if an explicitly named file is missing or any file is invalid.
    pub async fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let config = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => {
                if !fs::try_exists(&path).await? {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::load(&path).await?
            }
            None => Self::load_default().await?,
        };

        Ok(config.with_api_key(std::env::var(API_KEY_ENV_VAR).ok()))
    }

    async fn load_default() -> Result<Self> {
        let Some(path) = default_config_path() else {
            tracing::debug!("No platform config directory, using defaults");
            return Ok(Self::default());
        };
        if fs::try_exists(&path).await? {
            tracing::debug!(path = %path.display(), "Loading config");
            Self::load(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Override the API key when `key` is present and non-blank.
    #[must_use]
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Platform config file location, e.g. `~/.config/linctl/config.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "linctl").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
