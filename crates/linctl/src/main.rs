//! linctl CLI binary.

use anyhow::Result;
use linctl::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the linctl CLI.
///
/// Uses tokio's `current_thread` runtime; requests are issued one after another.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only command output.
    // Example: RUST_LOG=linctl=debug,linctl_graph=debug linctl deps ENG-1
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("linctl=info,linctl_graph=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting linctl CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("linctl CLI completed successfully");
    Ok(())
}
