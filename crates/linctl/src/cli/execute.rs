//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands. Output is
//! written to a caller-supplied writer so a report is only flushed once it
//! has been assembled completely.

use std::io::Write;

use linctl_graph::{
    detect_cycles, render_summary, render_tree, Cycle, DependencyGraph, Edge, Node, RenderMode,
    MAX_SCOPE_ISSUES,
};
use serde::Serialize;

use super::args::{DepsArgs, DepsTarget};
use crate::app::App;
use crate::client::{Project, Team};
use crate::error::{Error, Result};
use crate::output::{self, OutputConfig, OutputMode};

/// Machine-readable form of a dependency report.
#[derive(Debug, Serialize)]
struct DepsReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    team: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
    nodes: Vec<&'a Node>,
    edges: &'a [Edge],
    cycles: &'a [Cycle],
}

/// Execute the deps command
///
/// # Errors
///
/// Fails when a fetch fails, when the team or project cannot be resolved,
/// or when writing to `w` fails. An empty graph is not an error.
pub async fn execute_deps<W: Write>(
    app: &App,
    args: &DepsArgs,
    output_mode: OutputMode,
    config: &OutputConfig,
    w: &mut W,
) -> Result<()> {
    match args.target() {
        Some(DepsTarget::Issue(key)) => execute_issue_deps(app, key, output_mode, config, w).await,
        Some(DepsTarget::Team { team, project }) => {
            execute_team_deps(app, team, project, output_mode, config, w).await
        }
        None => Err(Error::Usage(
            "specify either an issue key or --team, not both".to_string(),
        )),
    }
}

async fn execute_issue_deps<W: Write>(
    app: &App,
    key: &str,
    output_mode: OutputMode,
    config: &OutputConfig,
    w: &mut W,
) -> Result<()> {
    let record = app
        .source()
        .fetch_issue_relations(key)
        .await
        .map_err(|e| Error::fetch(format!("fetch issue {key}"), e))?;
    tracing::info!(
        issue = %record.issue.identifier,
        outgoing = record.relations.len(),
        incoming = record.inverse_relations.len(),
        "Fetched issue relations"
    );

    let graph = DependencyGraph::from_issue(&record);
    let cycles = detect_cycles(&graph);
    let root = record.issue.identifier.as_str();

    match output_mode {
        OutputMode::Json => {
            let report = DepsReport {
                root: Some(root),
                team: None,
                project: None,
                nodes: graph.nodes().collect(),
                edges: graph.edges(),
                cycles: &cycles,
            };
            output::write_json(w, &report)?;
        }
        OutputMode::Text => {
            if graph.has_no_dependencies() {
                writeln!(w, "No dependencies found for {root}")?;
                return Ok(());
            }

            let options = config.render_options();
            let tree = render_tree(&graph, &RenderMode::Issue(root.to_string()), &options)?;
            let title = format!("Dependencies for {root}: {}", record.issue.title);
            writeln!(w, "{}", output::header(&title, config))?;
            writeln!(w)?;
            write!(w, "{tree}")?;
            write!(w, "{}", render_summary(&graph, &cycles, &options))?;
        }
    }

    Ok(())
}

async fn execute_team_deps<W: Write>(
    app: &App,
    team_ref: &str,
    project_ref: Option<&str>,
    output_mode: OutputMode,
    config: &OutputConfig,
    w: &mut W,
) -> Result<()> {
    let (team, project) = resolve_scope(app, team_ref, project_ref).await?;

    let issues = app
        .source()
        .fetch_team_issues(&team, MAX_SCOPE_ISSUES)
        .await
        .map_err(|e| Error::fetch(format!("fetch issues for team {}", team.key), e))?;
    tracing::info!(team = %team.key, issues = issues.len(), "Fetched team issues");

    let graph = DependencyGraph::from_scope(&issues, project.as_ref().map(|p| p.id.as_str()));
    let cycles = detect_cycles(&graph);
    if !cycles.is_empty() {
        tracing::debug!(cycles = cycles.len(), "Dependency cycles detected");
    }

    let scope = match &project {
        Some(project) => format!("team {} (project {})", team.key, project.name),
        None => format!("team {}", team.key),
    };

    match output_mode {
        OutputMode::Json => {
            let report = DepsReport {
                root: None,
                team: Some(&team.key),
                project: project.as_ref().map(|p| p.name.as_str()),
                nodes: graph.nodes().collect(),
                edges: graph.edges(),
                cycles: &cycles,
            };
            output::write_json(w, &report)?;
        }
        OutputMode::Text => {
            if graph.has_no_dependencies() {
                writeln!(w, "No dependencies found for {scope}")?;
                return Ok(());
            }

            let options = config.render_options();
            let tree = render_tree(&graph, &RenderMode::Scope, &options)?;
            let title = format!("Dependency graph for {scope}");
            writeln!(w, "{}", output::header(&title, config))?;
            writeln!(w)?;
            write!(w, "{tree}")?;
            write!(w, "{}", render_summary(&graph, &cycles, &options))?;
        }
    }

    Ok(())
}

/// Resolve the team and, if requested, the project within it.
async fn resolve_scope(
    app: &App,
    team_ref: &str,
    project_ref: Option<&str>,
) -> Result<(Team, Option<Project>)> {
    let team = app
        .source()
        .resolve_team(team_ref)
        .await
        .map_err(|e| Error::fetch(format!("resolve team {team_ref}"), e))?
        .ok_or_else(|| Error::TeamNotFound(team_ref.to_string()))?;

    let Some(project_ref) = project_ref else {
        return Ok((team, None));
    };

    let project = app
        .source()
        .resolve_project(&team, project_ref)
        .await
        .map_err(|e| Error::fetch(format!("resolve project {project_ref}"), e))?
        .ok_or_else(|| Error::ProjectNotFound {
            project: project_ref.to_string(),
            team: team.key.clone(),
        })?;

    Ok((team, Some(project)))
}
