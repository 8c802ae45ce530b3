//! Application context for CLI command execution.
//!
//! This module provides the `App` struct that owns the configured relation
//! source and provides a context for executing CLI commands.
//!
//! # Example
//!
//! ```no_run
//! use linctl::app::App;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_options(None, None).await?;
//!     // Execute commands using app...
//!     Ok(())
//! }
//! ```

use std::path::Path;

use crate::client::{LinearClient, RelationSource, SnapshotSource};
use crate::config::Config;
use crate::error::{Error, Result};

/// Application context for CLI operations.
///
/// Holds the relation source chosen at startup and the resolved
/// configuration.
pub struct App {
    /// The relation source (trait object for polymorphism)
    source: Box<dyn RelationSource>,

    /// Resolved configuration
    config: Config,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("api_url", &self.config.api_url)
            .field("source", &"<dyn RelationSource>")
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an App around an existing source.
    pub fn new(source: Box<dyn RelationSource>, config: Config) -> Self {
        Self { source, config }
    }

    /// Create an App from the global CLI options.
    ///
    /// Configuration is resolved from `config_path` (or its fallbacks). With
    /// a `snapshot` path the app reads that file instead of calling the API,
    /// and no API key is needed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration cannot be loaded
    /// - The snapshot file cannot be read or decoded
    /// - No API key is configured for the live client
    pub async fn from_options(config_path: Option<&Path>, snapshot: Option<&Path>) -> Result<Self> {
        let config = Config::resolve(config_path).await?;

        let source: Box<dyn RelationSource> = match snapshot {
            Some(path) => {
                let source = SnapshotSource::load(path)
                    .await
                    .map_err(|e| Error::fetch(format!("load snapshot {}", path.display()), e))?;
                Box::new(source)
            }
            None => {
                let client =
                    LinearClient::new(&config.api_url, config.api_key.clone(), config.timeout())
                        .map_err(|e| Error::Config(e.to_string()))?;
                tracing::debug!(endpoint = client.endpoint(), "Using live API");
                Box::new(client)
            }
        };

        Ok(Self::new(source, config))
    }

    /// Get a reference to the relation source.
    pub fn source(&self) -> &dyn RelationSource {
        self.source.as_ref()
    }

    /// Get the resolved configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
