//! Blocking-dependency graph engine for linctl.
//!
//! The engine turns issue records and their "blocks" relations into an
//! immutable [`DependencyGraph`], finds cycles with a strongly connected
//! component pass, and renders the graph as an indented tree.
//!
//! Everything here is synchronous and in-memory. Fetching the records is the
//! caller's job; see [`model`] for the shapes a fetcher hands over.
//!
//! # Example
//!
//! ```
//! use linctl_graph::model::{IssueRef, IssueRelations, IssueRelation, RelationKind};
//! use linctl_graph::{detect_cycles, render_tree, DependencyGraph, RenderMode, RenderOptions};
//!
//! let root = IssueRef::new("id-100", "ENG-100", "Ship login", Some("Todo"));
//! let blocked = IssueRef::new("id-101", "ENG-101", "Write docs", Some("Backlog"));
//! let record = IssueRelations {
//!     issue: root,
//!     relations: vec![IssueRelation::new(RelationKind::Blocks, blocked)],
//!     inverse_relations: vec![],
//! };
//!
//! let graph = DependencyGraph::from_issue(&record);
//! assert!(detect_cycles(&graph).is_empty());
//!
//! let options = RenderOptions::plain();
//! let text = render_tree(&graph, &RenderMode::Issue("ENG-100".into()), &options).unwrap();
//! assert!(text.contains("ENG-101"));
//! ```

#![forbid(unsafe_code)]

pub mod cycles;
pub mod error;
pub mod graph;
pub mod model;
pub mod style;
pub mod tree;

pub use cycles::{detect_cycles, Cycle};
pub use error::{GraphError, Result};
pub use graph::{DependencyGraph, Edge, Node, MAX_SCOPE_ISSUES};
pub use style::RenderOptions;
pub use tree::{render_summary, render_tree, truncate, RenderMode, FALLBACK_ROOT_LIMIT, MAX_RENDER_DEPTH};
