//! Rendering options and styling helpers.
//!
//! Semantic color theme:
//!   - Info/Reference: cyan    (display keys, root line)
//!   - Done:           green   (completed states)
//!   - Active:         yellow  (started states, cycle warnings)
//!   - Cancelled:      red     (cancelled states)
//!   - Muted:          dimmed  (connectors, "already shown" markers)
//!   - Emphasis:       bold    (warning header)

use colored::Colorize;

/// Default maximum title width in characters.
pub const DEFAULT_TITLE_WIDTH: usize = 50;

/// Settings that control how the tree is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Maximum title length before truncation.
    pub title_width: usize,
    /// Whether to use ASCII-only glyphs instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl RenderOptions {
    /// Create options with explicit values.
    pub fn new(title_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            title_width,
            use_ascii,
            use_colors,
        }
    }

    /// Unicode glyphs, no colors, default title width.
    pub fn plain() -> Self {
        Self::new(DEFAULT_TITLE_WIDTH, false, false)
    }

    pub(crate) fn glyphs(&self) -> Glyphs {
        if self.use_ascii {
            Glyphs::ASCII
        } else {
            Glyphs::UNICODE
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE_WIDTH, false, true)
    }
}

/// Connector and arrow glyphs for one rendering style.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Glyphs {
    pub branch: &'static str,
    pub corner: &'static str,
    pub pipe: &'static str,
    pub space: &'static str,
    pub blocks: &'static str,
    pub blocked_by: &'static str,
    pub cycle_arrow: &'static str,
    pub separator: &'static str,
    pub warning: &'static str,
}

impl Glyphs {
    const UNICODE: Self = Self {
        branch: "├── ",
        corner: "└── ",
        pipe: "│   ",
        space: "    ",
        blocks: "→",
        blocked_by: "←",
        cycle_arrow: " → ",
        separator: "─",
        warning: "⚠",
    };

    const ASCII: Self = Self {
        branch: "|-- ",
        corner: "`-- ",
        pipe: "|   ",
        space: "    ",
        blocks: "->",
        blocked_by: "<-",
        cycle_arrow: " -> ",
        separator: "-",
        warning: "!",
    };
}

/// Colorize a display key (cyan).
pub(crate) fn colorize_key(key: &str, options: &RenderOptions) -> String {
    if !options.use_colors {
        return key.to_string();
    }
    key.cyan().to_string()
}

/// Render a bracketed state, colored by how far along the workflow it is.
///
/// States are free text, so the color is a best-effort guess from common
/// workflow names and never affects the plain text.
pub(crate) fn colorize_state(state: Option<&str>, options: &RenderOptions) -> String {
    let text = format!("[{}]", state.unwrap_or("?"));
    if !options.use_colors {
        return text;
    }

    let lower = state.unwrap_or_default().to_ascii_lowercase();
    if lower.contains("done") || lower.contains("complete") || lower.contains("merged") {
        text.green().to_string()
    } else if lower.contains("cancel") || lower.contains("duplicate") {
        text.red().to_string()
    } else if lower.contains("progress") || lower.contains("review") || lower.contains("started") {
        text.yellow().to_string()
    } else {
        text.white().to_string()
    }
}

/// Apply dimmed style to text (connectors, markers).
pub(crate) fn dimmed(text: &str, options: &RenderOptions) -> String {
    if !options.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply semantic "warning" color (yellow, bold) to text.
pub(crate) fn warning(text: &str, options: &RenderOptions) -> String {
    if !options.use_colors {
        return text.to_string();
    }
    text.yellow().bold().to_string()
}
