//! Tree rendering for dependency graphs.
//!
//! Two modes are supported:
//!
//! - [`RenderMode::Issue`]: one root with what it blocks and what blocks it.
//! - [`RenderMode::Scope`]: a forest for a whole team or project, rooted at
//!   issues that block others but are not blocked themselves.
//!
//! Renders a scope like:
//! ```text
//! ENG-1 [Todo] Set up auth service
//! ├── ENG-2 [Todo] Login form
//! │   └── ENG-4 [Backlog] Session timeout
//! └── ENG-3 [In Progress] Password reset
//!     └── ENG-4 [Backlog] (already shown)
//! ```
//!
//! Each vertex is expanded at most once per render; later sightings print an
//! abbreviated "already shown" line. Descent also stops at
//! [`MAX_RENDER_DEPTH`] levels, so rendering terminates on any input.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::cycles::Cycle;
use crate::error::{GraphError, Result};
use crate::graph::{DependencyGraph, Node};
use crate::style::{colorize_key, colorize_state, dimmed, warning, RenderOptions};

/// Absolute ceiling on tree levels, counting the root as the first level.
pub const MAX_RENDER_DEPTH: usize = 10;

/// Number of blockers used as roots when every vertex has a blocker.
pub const FALLBACK_ROOT_LIMIT: usize = 5;

/// Width of the dashed separator before the summary.
const SEPARATOR_WIDTH: usize = 40;

const TRUNCATION_MARKER: &str = "...";

/// What to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderMode {
    /// A single issue and its direct relations, by display key.
    Issue(String),
    /// Every root in a team or project scope.
    Scope,
}

/// Mutable state of one traversal, passed explicitly through the recursion.
struct TraversalContext<'g> {
    /// Display keys already printed as a full line.
    rendered: HashSet<&'g str>,
    /// Accumulated output.
    out: String,
}

impl<'g> TraversalContext<'g> {
    fn new() -> Self {
        Self {
            rendered: HashSet::new(),
            out: String::new(),
        }
    }

    fn push_line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }
}

/// Render the dependency tree for the given mode.
///
/// # Errors
///
/// Returns [`GraphError::RootNotFound`] when rendering a single issue whose
/// display key is not in the graph.
pub fn render_tree(
    graph: &DependencyGraph,
    mode: &RenderMode,
    options: &RenderOptions,
) -> Result<String> {
    match mode {
        RenderMode::Issue(root) => render_issue(graph, root, options),
        RenderMode::Scope => Ok(render_scope(graph, options)),
    }
}

fn render_issue(graph: &DependencyGraph, root: &str, options: &RenderOptions) -> Result<String> {
    let root_node = graph
        .node(root)
        .ok_or_else(|| GraphError::RootNotFound(root.to_string()))?;

    let glyphs = options.glyphs();
    let mut ctx = TraversalContext::new();
    ctx.rendered.insert(root_node.display_key.as_str());
    ctx.push_line(&full_line(root_node, options));

    let outbound = graph
        .successors(root)
        .into_iter()
        .map(|key| (glyphs.blocks, "blocks", key));
    let inbound = graph
        .predecessors(root)
        .into_iter()
        .map(|key| (glyphs.blocked_by, "blocked by", key));
    let lines: Vec<_> = outbound.chain(inbound).collect();

    for (i, (arrow, label, key)) in lines.iter().enumerate() {
        let connector = if i + 1 == lines.len() {
            glyphs.corner
        } else {
            glyphs.branch
        };
        let Some(node) = graph.node(key) else {
            continue;
        };

        let body = if ctx.rendered.insert(node.display_key.as_str()) {
            full_line(node, options)
        } else {
            abbreviated_line(node, options)
        };

        ctx.push_line(&format!(
            "{}{} {} {}",
            dimmed(connector, options),
            arrow,
            label,
            body
        ));
    }

    Ok(ctx.out)
}

fn render_scope(graph: &DependencyGraph, options: &RenderOptions) -> String {
    let mut ctx = TraversalContext::new();
    let mut segments = Vec::with_capacity(MAX_RENDER_DEPTH);

    for root in scope_roots(graph) {
        let Some(node) = graph.node(root) else {
            continue;
        };
        if !ctx.rendered.insert(node.display_key.as_str()) {
            continue;
        }

        ctx.push_line(&full_line(node, options));
        render_children(graph, node, 1, &mut segments, &mut ctx, options);
    }

    ctx.out
}

/// Pick traversal roots for scope mode.
///
/// Pure blockers (outgoing edges, no incoming edges) in key order. When
/// there are none, every blocker sits on a cycle or below one, so fall back
/// to the first [`FALLBACK_ROOT_LIMIT`] blockers to guarantee some output.
fn scope_roots(graph: &DependencyGraph) -> Vec<&str> {
    let blockers: Vec<&str> = graph
        .keys()
        .filter(|key| !graph.successors(key).is_empty())
        .collect();

    let roots: Vec<&str> = blockers
        .iter()
        .copied()
        .filter(|key| graph.predecessors(key).is_empty())
        .collect();

    if roots.is_empty() {
        tracing::debug!(
            blockers = blockers.len(),
            limit = FALLBACK_ROOT_LIMIT,
            "No pure root found, falling back to first blockers"
        );
        blockers.into_iter().take(FALLBACK_ROOT_LIMIT).collect()
    } else {
        roots
    }
}

/// Recursively render the vertices `parent` blocks.
///
/// `segments` tracks which ancestor levels still have siblings below, used
/// to draw the vertical continuation lines. `depth` is the level of the
/// children about to be printed, with roots at level 0.
fn render_children<'g>(
    graph: &'g DependencyGraph,
    parent: &'g Node,
    depth: usize,
    segments: &mut Vec<bool>,
    ctx: &mut TraversalContext<'g>,
    options: &RenderOptions,
) {
    if depth >= MAX_RENDER_DEPTH {
        return;
    }

    let glyphs = options.glyphs();
    let children = graph.successors(&parent.display_key);

    for (i, key) in children.iter().enumerate() {
        let Some(child) = graph.node(key) else {
            continue;
        };
        let is_last = i + 1 == children.len();

        let mut prefix = String::new();
        for &has_more in segments.iter() {
            prefix.push_str(&dimmed(if has_more { glyphs.pipe } else { glyphs.space }, options));
        }
        prefix.push_str(&dimmed(if is_last { glyphs.corner } else { glyphs.branch }, options));

        if !ctx.rendered.insert(child.display_key.as_str()) {
            ctx.push_line(&format!("{prefix}{}", abbreviated_line(child, options)));
            continue;
        }

        ctx.push_line(&format!("{prefix}{}", full_line(child, options)));

        segments.push(!is_last);
        render_children(graph, child, depth + 1, segments, ctx, options);
        segments.pop();
    }
}

/// `KEY [state] title`, with the title truncated to the configured width.
fn full_line(node: &Node, options: &RenderOptions) -> String {
    let mut line = format!(
        "{} {}",
        colorize_key(&node.display_key, options),
        colorize_state(node.state.as_deref(), options)
    );
    if !node.title.is_empty() {
        line.push(' ');
        line.push_str(&truncate(&node.title, options.title_width));
    }
    line
}

/// `KEY [state] (already shown)`, for vertices expanded elsewhere.
fn abbreviated_line(node: &Node, options: &RenderOptions) -> String {
    format!(
        "{} {} {}",
        colorize_key(&node.display_key, options),
        colorize_state(node.state.as_deref(), options),
        dimmed("(already shown)", options)
    )
}

/// Render the post-tree summary: separator, counts, and cycle warnings.
///
/// The cycle block is only emitted when `cycles` is non-empty.
pub fn render_summary(graph: &DependencyGraph, cycles: &[Cycle], options: &RenderOptions) -> String {
    let glyphs = options.glyphs();
    let mut out = String::new();

    let _ = writeln!(out, "{}", dimmed(&glyphs.separator.repeat(SEPARATOR_WIDTH), options));
    let _ = writeln!(
        out,
        "{}, {}",
        plural(graph.node_count(), "issue", "issues"),
        plural(graph.edge_count(), "dependency", "dependencies")
    );

    if !cycles.is_empty() {
        let _ = writeln!(out);
        let header = format!(
            "{} {} detected:",
            glyphs.warning,
            plural(cycles.len(), "cycle", "cycles")
        );
        let _ = writeln!(out, "{}", warning(&header, options));
        for cycle in cycles {
            let _ = writeln!(out, "  {}", cycle.join(glyphs.cycle_arrow));
        }
    }

    out
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Cut `text` to at most `max` characters.
///
/// Longer text keeps `max - 3` characters followed by `...`. When `max` is 3
/// or less there is no room for the marker and the text is simply cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= TRUNCATION_MARKER.len() {
        return text.chars().take(max).collect();
    }

    let mut cut: String = text.chars().take(max - TRUNCATION_MARKER.len()).collect();
    cut.push_str(TRUNCATION_MARKER);
    cut
}
