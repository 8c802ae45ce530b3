//! CLI argument structs for all commands.

use clap::{ArgGroup, Parser};

use super::validators::{validate_issue_key, validate_team};

/// Arguments for the `deps` command
///
/// Exactly one of an issue key or `--team` must be given.
#[derive(Parser, Debug, Clone)]
#[command(group(
    ArgGroup::new("scope")
        .required(true)
        .multiple(false)
        .args(["issue_id", "team"])
))]
pub struct DepsArgs {
    /// Issue key to show dependencies for (e.g., ENG-123)
    #[arg(value_parser = validate_issue_key)]
    pub issue_id: Option<String>,

    /// Show the dependency graph of a whole team (key or name)
    #[arg(short, long, value_parser = validate_team)]
    pub team: Option<String>,

    /// Restrict the team graph to one project (name or ID)
    #[arg(short, long, requires = "team")]
    pub project: Option<String>,
}

/// What a `deps` invocation asks for, once clap has enforced the argument group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepsTarget<'a> {
    /// One issue and its direct relations.
    Issue(&'a str),
    /// A team, optionally narrowed to a project.
    Team {
        /// Team key or name.
        team: &'a str,
        /// Project name or ID.
        project: Option<&'a str>,
    },
}

impl DepsArgs {
    /// The requested target.
    ///
    /// Returns `None` unless exactly one of an issue key or a team is set.
    pub fn target(&self) -> Option<DepsTarget<'_>> {
        match (&self.issue_id, &self.team) {
            (Some(issue), None) => Some(DepsTarget::Issue(issue)),
            (None, Some(team)) => Some(DepsTarget::Team {
                team,
                project: self.project.as_deref(),
            }),
            _ => None,
        }
    }
}
