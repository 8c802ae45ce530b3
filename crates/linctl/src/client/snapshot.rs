//! Offline relation source backed by a JSON snapshot file.
//!
//! A snapshot lists teams (with their projects) and issues (with their
//! outgoing relations by display key):
//!
//! ```json
//! {
//!   "teams": [{ "id": "t1", "key": "ENG", "name": "Engineering",
//!               "projects": [{ "id": "p1", "name": "Auth" }] }],
//!   "issues": [{ "id": "u1", "identifier": "ENG-1", "title": "Login",
//!                "state": "Todo", "project": "p1",
//!                "relations": [{ "type": "blocks", "related": "ENG-2" }] }]
//! }
//! ```
//!
//! Incoming relations are derived by scanning every issue's outgoing list.
//! Relation targets missing from the snapshot are returned as stubs.

use std::path::Path;

use async_trait::async_trait;
use linctl_graph::model::{IssueRef, IssueRelation, IssueRelations, RelationKind, ScopedIssue};
use serde::{Deserialize, Serialize};

use super::{match_project, match_team, ClientError, Project, RelationSource, Team};

/// Top-level snapshot document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Teams and their projects.
    #[serde(default)]
    pub teams: Vec<SnapshotTeam>,
    /// Issues across all teams.
    #[serde(default)]
    pub issues: Vec<SnapshotIssue>,
}

/// A team entry in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotTeam {
    /// Opaque team identifier.
    pub id: String,
    /// Team key (issue prefix).
    pub key: String,
    /// Team name.
    #[serde(default)]
    pub name: String,
    /// Projects owned by the team.
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// An issue entry in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotIssue {
    /// Opaque issue identifier.
    #[serde(default)]
    pub id: String,
    /// Display key, e.g. `ENG-1`.
    pub identifier: String,
    /// Issue title.
    #[serde(default)]
    pub title: String,
    /// Workflow state name.
    #[serde(default)]
    pub state: Option<String>,
    /// Team key; defaults to the display key prefix.
    #[serde(default)]
    pub team: Option<String>,
    /// Project identifier.
    #[serde(default)]
    pub project: Option<String>,
    /// Outgoing relations.
    #[serde(default)]
    pub relations: Vec<SnapshotRelation>,
}

impl SnapshotIssue {
    fn team_key(&self) -> &str {
        self.team
            .as_deref()
            .unwrap_or_else(|| self.identifier.split('-').next().unwrap_or_default())
    }

    fn to_ref(&self) -> IssueRef {
        IssueRef {
            id: self.id.clone(),
            identifier: self.identifier.clone(),
            title: self.title.clone(),
            state: self.state.clone(),
        }
    }
}

/// An outgoing relation in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRelation {
    /// Relation type tag.
    #[serde(rename = "type")]
    pub kind: RelationKind,
    /// Display key of the related issue.
    pub related: String,
}

/// [`RelationSource`] reading from an in-memory [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    /// Wrap an already decoded snapshot.
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Io` if the file cannot be read and
    /// `ClientError::Decode` if it is not a valid snapshot.
    pub async fn load(path: &Path) -> Result<Self, ClientError> {
        let content = tokio::fs::read_to_string(path).await?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            teams = snapshot.teams.len(),
            issues = snapshot.issues.len(),
            "Loaded snapshot"
        );
        Ok(Self::new(snapshot))
    }

    fn find_issue(&self, key: &str) -> Option<&SnapshotIssue> {
        self.snapshot
            .issues
            .iter()
            .find(|issue| issue.identifier.eq_ignore_ascii_case(key))
    }

    /// Full reference if the issue is in the snapshot, a stub otherwise.
    fn issue_ref(&self, key: &str) -> IssueRef {
        self.find_issue(key)
            .map_or_else(|| IssueRef::stub(key), SnapshotIssue::to_ref)
    }

    fn outgoing(&self, issue: &SnapshotIssue) -> Vec<IssueRelation> {
        issue
            .relations
            .iter()
            .map(|r| IssueRelation::new(r.kind.clone(), self.issue_ref(&r.related)))
            .collect()
    }

    fn teams(&self) -> Vec<Team> {
        self.snapshot
            .teams
            .iter()
            .map(|t| Team {
                id: t.id.clone(),
                key: t.key.clone(),
                name: t.name.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl RelationSource for SnapshotSource {
    async fn fetch_issue_relations(&self, key: &str) -> Result<IssueRelations, ClientError> {
        let issue = self.find_issue(key).ok_or_else(|| ClientError::NotFound {
            kind: "Issue",
            key: key.to_string(),
        })?;

        let target = issue.identifier.as_str();
        let inverse_relations = self
            .snapshot
            .issues
            .iter()
            .flat_map(move |source| {
                source
                    .relations
                    .iter()
                    .filter(move |r| r.related.eq_ignore_ascii_case(target))
                    .map(move |r| IssueRelation::new(r.kind.clone(), source.to_ref()))
            })
            .collect();

        Ok(IssueRelations {
            issue: issue.to_ref(),
            relations: self.outgoing(issue),
            inverse_relations,
        })
    }

    async fn resolve_team(&self, key_or_name: &str) -> Result<Option<Team>, ClientError> {
        Ok(match_team(&self.teams(), key_or_name))
    }

    async fn resolve_project(
        &self,
        team: &Team,
        name_or_id: &str,
    ) -> Result<Option<Project>, ClientError> {
        let Some(entry) = self.snapshot.teams.iter().find(|t| t.id == team.id) else {
            return Err(ClientError::NotFound {
                kind: "Team",
                key: team.key.clone(),
            });
        };
        Ok(match_project(&entry.projects, name_or_id))
    }

    async fn fetch_team_issues(
        &self,
        team: &Team,
        limit: usize,
    ) -> Result<Vec<ScopedIssue>, ClientError> {
        Ok(self
            .snapshot
            .issues
            .iter()
            .filter(|issue| issue.team_key().eq_ignore_ascii_case(&team.key))
            .take(limit)
            .map(|issue| ScopedIssue {
                issue: issue.to_ref(),
                project_id: issue.project.clone(),
                relations: self.outgoing(issue),
            })
            .collect())
    }
}
