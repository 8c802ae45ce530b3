//! Relation records handed to the engine by a fetcher.
//!
//! These types are the input contract of the graph builder. A fetcher (the
//! GraphQL client, an offline snapshot, a test) decodes whatever it talks to
//! into these structs once, and the engine never looks at raw payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to one issue as seen in a relation payload.
///
/// Only `identifier` is guaranteed to be meaningful. Relation stubs that
/// point outside the fetched scope may carry an empty title and no state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    /// Opaque identifier assigned by the service.
    #[serde(default)]
    pub id: String,

    /// Short human identifier, e.g. `ENG-123`.
    pub identifier: String,

    /// Issue title.
    #[serde(default)]
    pub title: String,

    /// Workflow state name (e.g. "Todo", "Done").
    #[serde(default)]
    pub state: Option<String>,
}

impl IssueRef {
    /// Create a fully populated issue reference.
    pub fn new(
        id: impl Into<String>,
        identifier: impl Into<String>,
        title: impl Into<String>,
        state: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            identifier: identifier.into(),
            title: title.into(),
            state: state.map(str::to_string),
        }
    }

    /// Create a stub that only knows its display key.
    pub fn stub(identifier: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            identifier: identifier.into(),
            title: String::new(),
            state: None,
        }
    }
}

/// Type of relationship between two issues.
///
/// Only [`RelationKind::Blocks`] takes part in graph construction. Unknown
/// tags from the service are preserved in [`RelationKind::Other`] rather
/// than rejected, since the service adds relation types over time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationKind {
    /// Hard blocker: the source must finish before the target.
    Blocks,

    /// Informational link.
    Related,

    /// The source duplicates the target.
    Duplicate,

    /// Suggested similarity link.
    Similar,

    /// A tag this client does not know about.
    Other(String),
}

impl RelationKind {
    /// Whether relations of this kind become graph edges.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Blocks)
    }

    /// Wire name of the relation kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Blocks => "blocks",
            Self::Related => "related",
            Self::Duplicate => "duplicate",
            Self::Similar => "similar",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for RelationKind {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "blocks" => Self::Blocks,
            "related" => Self::Related,
            "duplicate" => Self::Duplicate,
            "similar" => Self::Similar,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for RelationKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<RelationKind> for String {
    fn from(kind: RelationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One relation entry: a kind plus the issue on the other side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRelation {
    /// Relation type tag.
    pub kind: RelationKind,

    /// The issue on the other side of the relation.
    pub related: IssueRef,
}

impl IssueRelation {
    /// Create a relation entry.
    pub fn new(kind: RelationKind, related: IssueRef) -> Self {
        Self { kind, related }
    }
}

/// A single issue with its direct relations, used for single-issue mode.
///
/// `relations` are outgoing (this issue is the source, e.g. "this blocks
/// X"). `inverse_relations` are incoming (the related issue is the source,
/// e.g. "X blocks this").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRelations {
    /// The root issue.
    pub issue: IssueRef,

    /// Relations where the root is the source.
    #[serde(default)]
    pub relations: Vec<IssueRelation>,

    /// Relations where the root is the target.
    #[serde(default)]
    pub inverse_relations: Vec<IssueRelation>,
}

/// An issue fetched as part of a team scope, used for team mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedIssue {
    /// The issue itself.
    pub issue: IssueRef,

    /// Identifier of the project the issue belongs to, if any.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Outgoing relations of the issue.
    #[serde(default)]
    pub relations: Vec<IssueRelation>,
}
