//! Relation fetching from the issue tracker.
//!
//! This module provides the [`RelationSource`] trait the `deps` command
//! fetches through, and two implementations:
//!
//! - [`LinearClient`]: GraphQL over HTTPS against the hosted service
//! - [`SnapshotSource`]: an offline JSON snapshot, used for scripting and tests
//!
//! # Architecture
//!
//! Sources decode their payloads into the typed records of
//! [`linctl_graph::model`] at the boundary. The trait is object-safe so the
//! application can hold a `Box<dyn RelationSource>` chosen at startup.

mod graphql;
mod snapshot;

pub use graphql::{LinearClient, DEFAULT_API_URL};
pub use snapshot::{Snapshot, SnapshotIssue, SnapshotRelation, SnapshotSource, SnapshotTeam};

use async_trait::async_trait;
use linctl_graph::model::{IssueRelations, ScopedIssue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A team as resolved by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Opaque team identifier.
    pub id: String,
    /// Short team key used as issue prefix (e.g. `ENG`).
    pub key: String,
    /// Human-readable team name.
    pub name: String,
}

/// A project as resolved by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Opaque project identifier.
    pub id: String,
    /// Project name.
    pub name: String,
}

/// Errors raised while talking to a relation source.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The GraphQL response carried an `errors` array.
    #[error("GraphQL error: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    /// The response could not be decoded into the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// No API key was configured.
    #[error("No API key configured. Set LINEAR_API_KEY or `api-key` in the config file")]
    MissingApiKey,

    /// The requested entity does not exist.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Entity kind ("Issue", "Team").
        kind: &'static str,
        /// The key that was looked up.
        key: String,
    },

    /// Reading a snapshot file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of issues and their relations.
///
/// Implementations perform no retries; a failed call surfaces immediately.
#[async_trait]
pub trait RelationSource: Send + Sync {
    /// Fetch one issue with its outgoing and incoming relations.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if no issue has this display key.
    async fn fetch_issue_relations(&self, key: &str) -> Result<IssueRelations, ClientError>;

    /// Look up a team by key or name (case-insensitive).
    ///
    /// Returns `None` when no team matches.
    async fn resolve_team(&self, key_or_name: &str) -> Result<Option<Team>, ClientError>;

    /// Look up a project within a team by raw identifier or name
    /// (case-insensitive).
    ///
    /// Returns `None` when no project matches.
    async fn resolve_project(
        &self,
        team: &Team,
        name_or_id: &str,
    ) -> Result<Option<Project>, ClientError>;

    /// Fetch up to `limit` issues of a team, each with its outgoing relations
    /// and project.
    async fn fetch_team_issues(
        &self,
        team: &Team,
        limit: usize,
    ) -> Result<Vec<ScopedIssue>, ClientError>;
}

/// Pick the project matching `name_or_id` from a team's projects.
///
/// An exact identifier match wins over a name match.
pub(crate) fn match_project<'a>(
    projects: impl IntoIterator<Item = &'a Project>,
    name_or_id: &str,
) -> Option<Project> {
    let needle = name_or_id.trim();
    let mut by_name = None;
    for project in projects {
        if project.id == needle {
            return Some(project.clone());
        }
        if by_name.is_none() && project.name.eq_ignore_ascii_case(needle) {
            by_name = Some(project.clone());
        }
    }
    by_name
}

/// Pick the team matching `key_or_name`, by key first, then by name.
pub(crate) fn match_team<'a>(
    teams: impl IntoIterator<Item = &'a Team>,
    key_or_name: &str,
) -> Option<Team> {
    let needle = key_or_name.trim();
    let mut by_name = None;
    for team in teams {
        if team.key.eq_ignore_ascii_case(needle) {
            return Some(team.clone());
        }
        if by_name.is_none() && team.name.eq_ignore_ascii_case(needle) {
            by_name = Some(team.clone());
        }
    }
    by_name
}
