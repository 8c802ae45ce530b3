//! Error types for the dependency graph engine.

use thiserror::Error;

/// The error type for graph rendering.
///
/// Building a graph and detecting cycles never fail; only rendering can
/// discover that the caller asked for something the graph does not contain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// The designated root is absent from the node set, which means the
    /// fetched records are inconsistent with the requested issue.
    #[error("root issue not found: {0}")]
    RootNotFound(String),
}

/// A specialized Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
