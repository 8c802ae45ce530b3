//! Output formatting for CLI commands.
//!
//! This module provides the output mode switch (text or JSON) and the
//! environment-driven settings that control how dependency trees are drawn.

use std::env;
use std::io::{self, Write};

use colored::Colorize;
use linctl_graph::RenderOptions;
use serde::Serialize;

// ============================================================================
// Output Configuration
// ============================================================================

const MIN_TITLE_WIDTH: usize = 4;

/// Configuration for output formatting.
///
/// Holds the title width used when truncating issue titles, ASCII fallback
/// mode, and color output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum characters of an issue title shown per line.
    pub title_width: usize,
    /// Whether to use ASCII-only connectors instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    pub fn new(title_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            title_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// `default_width` comes from the config file. Reads:
    /// - `LINCTL_TITLE_WIDTH`: Maximum title width
    /// - `LINCTL_ASCII`: Set to "1" or "true" for ASCII-only connectors (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `LINCTL_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env(default_width: usize) -> Self {
        Self::from_lookup(default_width, |name| env::var(name).ok())
    }

    fn from_lookup(default_width: usize, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let title_width = match lookup("LINCTL_TITLE_WIDTH") {
            Some(s) if !s.is_empty() => match s.parse::<usize>() {
                Ok(width) if width >= MIN_TITLE_WIDTH => width,
                _ => {
                    tracing::warn!(
                        env_var = "LINCTL_TITLE_WIDTH",
                        value = %s,
                        default = default_width,
                        "Invalid value, using default"
                    );
                    default_width
                }
            },
            _ => default_width,
        };

        let use_ascii = match lookup("LINCTL_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "LINCTL_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // NO_COLOR (https://no-color.org/) wins over LINCTL_COLOR
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("LINCTL_COLOR").is_none_or(|v| v != "0" && !v.eq_ignore_ascii_case("false"));

        Self {
            title_width,
            use_ascii,
            use_colors,
        }
    }

    /// Cap the title width to the terminal width when stdout is a terminal.
    #[must_use]
    pub fn fit_to_terminal(mut self) -> Self {
        if let Some((terminal_size::Width(width), _)) = terminal_size::terminal_size() {
            self.title_width = self.title_width.min(usize::from(width).max(MIN_TITLE_WIDTH));
        }
        self
    }

    /// Options for the tree renderer.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::new(self.title_width, self.use_ascii, self.use_colors)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            title_width: linctl_graph::style::DEFAULT_TITLE_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Write a JSON-formatted value followed by a newline.
pub fn write_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

/// Bold header text, honoring the color setting.
pub fn header(text: &str, config: &OutputConfig) -> String {
    if config.use_colors {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}
