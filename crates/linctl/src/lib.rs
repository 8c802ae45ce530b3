//! linctl - a command-line client for a hosted issue tracker.
//!
//! This crate provides the CLI application and the pieces it is built from:
//! relation sources (live GraphQL API or an offline snapshot), configuration,
//! and output settings. Graph construction, cycle detection, and tree
//! rendering live in [`linctl_graph`].

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod output;

// Public CLI module (needed by binary)
pub mod cli;
