//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for linctl using clap's derive API.
//!
//! # Commands
//!
//! - `deps`: Show blocking dependencies of an issue or of a whole team
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--config`: Path to the YAML config file
//! - `--snapshot`: Read issues from a JSON snapshot instead of the API
//!
//! # Example
//!
//! ```bash
//! linctl deps ENG-123
//! linctl deps --team ENG --project "Auth Revamp"
//! linctl --json deps --team ENG
//! ```

mod args;
mod execute;
mod validators;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{DepsArgs, DepsTarget};
pub use execute::execute_deps;
pub use validators::{validate_issue_key, validate_team, validate_team_key};

/// linctl - a command-line client for your issue tracker
///
/// Shows which issues block which, for one issue or a whole team.
#[derive(Parser, Debug)]
#[command(name = "linctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read issues from a JSON snapshot file instead of the API
    #[arg(long, global = true, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show blocking dependencies
    ///
    /// With an issue key, shows what the issue blocks and what blocks it.
    /// With `--team`, shows the dependency forest of the team's issues,
    /// optionally restricted to one project, and warns about cycles.
    Deps(DepsArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::{OutputConfig, OutputMode};

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Deps(args)) => {
                let app = App::from_options(self.config.as_deref(), self.snapshot.as_deref()).await?;
                let output_config =
                    OutputConfig::from_env(app.config().title_width).fit_to_terminal();

                // Fully assembled before anything reaches stdout
                let mut buffer = Vec::new();
                execute_deps(&app, args, output_mode, &output_config, &mut buffer).await?;

                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(&buffer)?;
                handle.flush()?;
                Ok(())
            }
            None => {
                println!("linctl issue tracker client");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    // ========== CLI Parsing Tests ==========

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["linctl"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_deps_issue() {
        let cli = Cli::try_parse_from(["linctl", "deps", "eng-100"]).unwrap();
        let Some(Commands::Deps(args)) = cli.command else {
            panic!("expected deps command");
        };
        assert_eq!(args.target(), Some(DepsTarget::Issue("ENG-100")));
    }

    #[test]
    fn test_parse_deps_team_with_project() {
        let cli =
            Cli::try_parse_from(["linctl", "deps", "--team", "ENG", "--project", "Auth"]).unwrap();
        let Some(Commands::Deps(args)) = cli.command else {
            panic!("expected deps command");
        };
        assert_eq!(
            args.target(),
            Some(DepsTarget::Team {
                team: "ENG",
                project: Some("Auth"),
            })
        );
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "linctl",
            "deps",
            "ENG-1",
            "--json",
            "--snapshot",
            "issues.json",
            "--config",
            "config.yaml",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.snapshot, Some(PathBuf::from("issues.json")));
        assert_eq!(cli.config, Some(PathBuf::from("config.yaml")));
    }

    #[test]
    fn test_deps_requires_issue_or_team() {
        let err = Cli::try_parse_from(["linctl", "deps"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_deps_rejects_issue_and_team_together() {
        let err = Cli::try_parse_from(["linctl", "deps", "ENG-1", "--team", "ENG"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_project_requires_team() {
        let err =
            Cli::try_parse_from(["linctl", "deps", "ENG-1", "--project", "Auth"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_deps_rejects_malformed_issue_key() {
        let err = Cli::try_parse_from(["linctl", "deps", "not-a-key"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
}
