//! Error types for linctl CLI operations.

use std::io;

use linctl_graph::GraphError;
use thiserror::Error;

use crate::client::ClientError;

/// The error type for linctl CLI operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A call to the relation source failed.
    ///
    /// `step` names what was being fetched, e.g. "fetch issue ENG-1".
    #[error("failed to {step}: {source}")]
    Fetch {
        /// Human-readable description of the failed step.
        step: String,
        /// Underlying client error.
        #[source]
        source: ClientError,
    },

    /// No team matches the given key or name.
    #[error("Team not found: {0}")]
    TeamNotFound(String),

    /// No project in the team matches the given name or identifier.
    #[error("Project not found: {project} (team {team})")]
    ProjectNotFound {
        /// The requested project.
        project: String,
        /// The team that was searched.
        team: String,
    },

    /// The arguments do not name exactly one issue or team.
    #[error("Usage error: {0}")]
    Usage(String),

    /// Graph construction or rendering failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap a client error with the step that produced it.
    pub fn fetch(step: impl Into<String>, source: ClientError) -> Self {
        Self::Fetch {
            step: step.into(),
            source,
        }
    }
}

/// A specialized Result type for linctl operations.
pub type Result<T> = std::result::Result<T, Error>;
