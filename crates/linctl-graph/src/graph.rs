//! Graph construction from fetched relation records.
//!
//! A [`DependencyGraph`] is a normalized node/edge set keyed by display key
//! (`ENG-123`). It is built once per invocation, never mutated afterwards,
//! and shared read-only by the cycle detector and the tree renderer.
//!
//! Edge direction is always `blocker -> blocked`.

use crate::model::{IssueRef, IssueRelations, RelationKind, ScopedIssue};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Maximum number of issues considered in team/scope mode.
pub const MAX_SCOPE_ISSUES: usize = 250;

/// One issue in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Opaque identifier assigned by the service (empty for stubs).
    pub id: String,
    /// Short human identifier, unique within the graph.
    pub display_key: String,
    /// Issue title (empty for stubs).
    pub title: String,
    /// Workflow state name, if known.
    pub state: Option<String>,
}

impl Node {
    fn from_ref(issue: &IssueRef) -> Self {
        Self {
            id: issue.id.clone(),
            display_key: issue.identifier.clone(),
            title: issue.title.clone(),
            state: issue.state.clone(),
        }
    }

    /// Fill fields this node does not know yet from a later sighting.
    ///
    /// Fields already populated are never overwritten.
    fn fill_gaps(&mut self, issue: &IssueRef) {
        if self.id.is_empty() && !issue.id.is_empty() {
            self.id.clone_from(&issue.id);
        }
        if self.title.is_empty() && !issue.title.is_empty() {
            self.title.clone_from(&issue.title);
        }
        if self.state.is_none() {
            self.state.clone_from(&issue.state);
        }
    }
}

/// One directed "blocks" relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// Display key of the blocking issue.
    pub from: String,
    /// Display key of the blocked issue.
    pub to: String,
    /// Relation kind; always [`RelationKind::Blocks`] for built graphs.
    pub kind: RelationKind,
}

/// Immutable dependency graph for one render operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, Node>,
    edges: Vec<Edge>,
}

impl DependencyGraph {
    /// Build the graph around a single issue and its direct relations.
    ///
    /// The node set holds the root plus every directly related issue. Each
    /// outgoing "blocks" relation becomes `root -> related`; each incoming
    /// one becomes `related -> root`. Other relation kinds are ignored.
    pub fn from_issue(record: &IssueRelations) -> Self {
        let mut builder = GraphBuilder::default();
        let root = record.issue.identifier.as_str();
        builder.insert_node(&record.issue);

        for relation in record.relations.iter().filter(|r| r.kind.is_blocking()) {
            builder.insert_node(&relation.related);
            builder.add_edge(root, &relation.related.identifier);
        }

        for relation in record
            .inverse_relations
            .iter()
            .filter(|r| r.kind.is_blocking())
        {
            builder.insert_node(&relation.related);
            builder.add_edge(&relation.related.identifier, root);
        }

        builder.finish()
    }

    /// Build the graph for a team scope, optionally narrowed to one project.
    ///
    /// Only the first [`MAX_SCOPE_ISSUES`] issues are considered. Issues whose
    /// `project_id` differs from `project_filter` are skipped as sources, but
    /// any issue blocked by an in-scope issue still becomes a node so its
    /// edge can be rendered.
    pub fn from_scope(issues: &[ScopedIssue], project_filter: Option<&str>) -> Self {
        if issues.len() > MAX_SCOPE_ISSUES {
            tracing::debug!(
                total = issues.len(),
                limit = MAX_SCOPE_ISSUES,
                "Scope exceeds issue limit, ignoring the remainder"
            );
        }

        let in_scope: Vec<&ScopedIssue> = issues
            .iter()
            .take(MAX_SCOPE_ISSUES)
            .filter(|scoped| match project_filter {
                Some(project) => scoped.project_id.as_deref() == Some(project),
                None => true,
            })
            .collect();

        let mut builder = GraphBuilder::default();

        // Full records first, so relation stubs only ever fill gaps.
        for scoped in &in_scope {
            builder.insert_node(&scoped.issue);
        }

        for scoped in &in_scope {
            for relation in scoped.relations.iter().filter(|r| r.kind.is_blocking()) {
                builder.insert_node(&relation.related);
                builder.add_edge(&scoped.issue.identifier, &relation.related.identifier);
            }
        }

        builder.finish()
    }

    /// Look up a node by display key.
    pub fn node(&self, key: &str) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Whether the graph contains a node with this display key.
    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// All nodes in display key order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All display keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// All edges in construction order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no edges at all.
    pub fn has_no_dependencies(&self) -> bool {
        self.edges.is_empty()
    }

    /// Display keys that `key` blocks, sorted and de-duplicated.
    pub fn successors(&self, key: &str) -> Vec<&str> {
        let targets: BTreeSet<&str> = self
            .edges
            .iter()
            .filter(|e| e.from == key)
            .map(|e| e.to.as_str())
            .collect();
        targets.into_iter().collect()
    }

    /// Display keys that block `key`, sorted and de-duplicated.
    pub fn predecessors(&self, key: &str) -> Vec<&str> {
        let sources: BTreeSet<&str> = self
            .edges
            .iter()
            .filter(|e| e.to == key)
            .map(|e| e.from.as_str())
            .collect();
        sources.into_iter().collect()
    }
}

/// Accumulates nodes and edges while a graph is being built.
#[derive(Default)]
struct GraphBuilder {
    nodes: BTreeMap<String, Node>,
    edges: Vec<Edge>,
    seen_edges: HashSet<(String, String)>,
}

impl GraphBuilder {
    /// Insert a node, or fill gaps in the node already stored under its key.
    fn insert_node(&mut self, issue: &IssueRef) {
        if issue.identifier.is_empty() {
            tracing::debug!(id = %issue.id, "Skipping issue reference without identifier");
            return;
        }

        match self.nodes.get_mut(&issue.identifier) {
            Some(existing) => existing.fill_gaps(issue),
            None => {
                self.nodes
                    .insert(issue.identifier.clone(), Node::from_ref(issue));
            }
        }
    }

    /// Add a `from -> to` blocks edge.
    ///
    /// Edges with an endpoint outside the node set are dropped, as are exact
    /// duplicates of an edge already added.
    fn add_edge(&mut self, from: &str, to: &str) {
        if !self.nodes.contains_key(from) || !self.nodes.contains_key(to) {
            tracing::debug!(from, to, "Dropping edge with endpoint outside the node set");
            return;
        }

        if !self.seen_edges.insert((from.to_string(), to.to_string())) {
            return;
        }

        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
            kind: RelationKind::Blocks,
        });
    }

    fn finish(self) -> DependencyGraph {
        DependencyGraph {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IssueRelation;

    fn issue(key: &str, title: &str, state: &str) -> IssueRef {
        IssueRef::new(format!("id-{key}"), key, title, Some(state))
    }

    fn blocks(target: IssueRef) -> IssueRelation {
        IssueRelation::new(RelationKind::Blocks, target)
    }

    fn scoped(key: &str, project: Option<&str>, relations: Vec<IssueRelation>) -> ScopedIssue {
        ScopedIssue {
            issue: issue(key, &format!("Issue {key}"), "Todo"),
            project_id: project.map(str::to_string),
            relations,
        }
    }

    fn edge_pairs(graph: &DependencyGraph) -> Vec<(&str, &str)> {
        graph
            .edges()
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect()
    }

    // ========== Single-issue mode ==========

    #[test]
    fn test_from_issue_orients_edges_blocker_to_blocked() {
        let record = IssueRelations {
            issue: issue("ENG-100", "Root", "In Progress"),
            relations: vec![blocks(issue("ENG-101", "Downstream", "Todo"))],
            inverse_relations: vec![blocks(issue("ENG-099", "Upstream", "Done"))],
        };

        let graph = DependencyGraph::from_issue(&record);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(
            edge_pairs(&graph),
            vec![("ENG-100", "ENG-101"), ("ENG-099", "ENG-100")]
        );
    }

    #[test]
    fn test_from_issue_ignores_non_blocking_relations() {
        let record = IssueRelations {
            issue: issue("ENG-1", "Root", "Todo"),
            relations: vec![
                IssueRelation::new(RelationKind::Related, issue("ENG-2", "Related", "Todo")),
                IssueRelation::new(RelationKind::Duplicate, issue("ENG-3", "Dup", "Todo")),
            ],
            inverse_relations: vec![IssueRelation::new(
                RelationKind::Other("supersedes".into()),
                issue("ENG-4", "Other", "Todo"),
            )],
        };

        let graph = DependencyGraph::from_issue(&record);

        assert_eq!(graph.node_count(), 1);
        assert!(graph.has_no_dependencies());
    }

    #[test]
    fn test_from_issue_root_repeated_as_related_stub_yields_one_node() {
        let record = IssueRelations {
            issue: issue("ENG-1", "Root", "Todo"),
            relations: vec![blocks(IssueRef::stub("ENG-1"))],
            inverse_relations: vec![],
        };

        let graph = DependencyGraph::from_issue(&record);

        assert_eq!(graph.node_count(), 1);
        let node = graph.node("ENG-1").unwrap();
        assert_eq!(node.title, "Root");
        assert_eq!(node.state.as_deref(), Some("Todo"));
        assert_eq!(edge_pairs(&graph), vec![("ENG-1", "ENG-1")]);
    }

    #[test]
    fn test_from_issue_collapses_duplicate_edges() {
        let record = IssueRelations {
            issue: issue("ENG-1", "Root", "Todo"),
            relations: vec![
                blocks(issue("ENG-2", "Two", "Todo")),
                blocks(issue("ENG-2", "Two", "Todo")),
            ],
            inverse_relations: vec![],
        };

        let graph = DependencyGraph::from_issue(&record);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_relation_without_identifier_is_dropped() {
        let record = IssueRelations {
            issue: issue("ENG-1", "Root", "Todo"),
            relations: vec![blocks(IssueRef::stub(""))],
            inverse_relations: vec![],
        };

        let graph = DependencyGraph::from_issue(&record);

        assert_eq!(graph.node_count(), 1);
        assert!(graph.has_no_dependencies());
    }

    // ========== Node insertion policy ==========

    #[test]
    fn test_stub_seen_first_is_upgraded_in_place() {
        let issues = vec![
            scoped("ENG-1", None, vec![blocks(IssueRef::stub("ENG-2"))]),
            scoped("ENG-2", None, vec![]),
        ];

        let graph = DependencyGraph::from_scope(&issues, None);

        let node = graph.node("ENG-2").unwrap();
        assert_eq!(node.title, "Issue ENG-2");
        assert_eq!(node.state.as_deref(), Some("Todo"));
        assert_eq!(node.id, "id-ENG-2");
    }

    #[test]
    fn test_full_record_is_not_overwritten_by_later_sighting() {
        let record = IssueRelations {
            issue: issue("ENG-1", "Root", "Todo"),
            relations: vec![blocks(issue("ENG-2", "Original title", "Todo"))],
            inverse_relations: vec![blocks(issue("ENG-2", "Other title", "Done"))],
        };

        let graph = DependencyGraph::from_issue(&record);

        let node = graph.node("ENG-2").unwrap();
        assert_eq!(node.title, "Original title");
        assert_eq!(node.state.as_deref(), Some("Todo"));
    }

    // ========== Team/scope mode ==========

    #[test]
    fn test_from_scope_collects_all_blocks_edges() {
        let issues = vec![
            scoped("A", None, vec![blocks(issue("B", "b", "Todo"))]),
            scoped("B", None, vec![blocks(issue("C", "c", "Todo"))]),
            scoped("C", None, vec![]),
        ];

        let graph = DependencyGraph::from_scope(&issues, None);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(edge_pairs(&graph), vec![("A", "B"), ("B", "C")]);
    }

    #[test]
    fn test_project_filter_keeps_blocked_target_outside_project() {
        let issues = vec![
            scoped("X", Some("p1"), vec![blocks(issue("Y", "y", "Todo"))]),
            scoped("Y", Some("p2"), vec![blocks(issue("Z", "z", "Todo"))]),
        ];

        let graph = DependencyGraph::from_scope(&issues, Some("p1"));

        assert!(graph.contains("X"));
        assert!(graph.contains("Y"), "blocked target must remain a node");
        assert!(!graph.contains("Z"), "out-of-scope source edges are excluded");
        assert_eq!(edge_pairs(&graph), vec![("X", "Y")]);
    }

    #[test]
    fn test_project_filter_excludes_issues_without_project() {
        let issues = vec![
            scoped("X", None, vec![blocks(issue("Y", "y", "Todo"))]),
            scoped("W", Some("p1"), vec![]),
        ];

        let graph = DependencyGraph::from_scope(&issues, Some("p1"));

        assert_eq!(graph.keys().collect::<Vec<_>>(), vec!["W"]);
        assert!(graph.has_no_dependencies());
    }

    #[test]
    fn test_from_scope_respects_issue_limit() {
        let mut issues: Vec<ScopedIssue> = (0..MAX_SCOPE_ISSUES)
            .map(|i| scoped(&format!("ENG-{i}"), None, vec![]))
            .collect();
        issues.push(scoped(
            "ENG-LATE",
            None,
            vec![blocks(issue("ENG-0", "zero", "Todo"))],
        ));

        let graph = DependencyGraph::from_scope(&issues, None);

        assert_eq!(graph.node_count(), MAX_SCOPE_ISSUES);
        assert!(!graph.contains("ENG-LATE"));
        assert!(graph.has_no_dependencies());
    }

    #[test]
    fn test_neighbour_queries_are_sorted() {
        let issues = vec![
            scoped(
                "A",
                None,
                vec![blocks(IssueRef::stub("C")), blocks(IssueRef::stub("B"))],
            ),
            scoped("D", None, vec![blocks(IssueRef::stub("B"))]),
        ];

        let graph = DependencyGraph::from_scope(&issues, None);

        assert_eq!(graph.successors("A"), vec!["B", "C"]);
        assert_eq!(graph.predecessors("B"), vec!["A", "D"]);
        assert!(graph.predecessors("A").is_empty());
    }
}
