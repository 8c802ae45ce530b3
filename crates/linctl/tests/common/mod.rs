//! Common test utilities shared across integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path to the snapshot fixture used by the CLI tests.
pub fn snapshot_fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/snapshot.json")
}

/// Run the linctl binary with a clean environment.
///
/// Colors are disabled, no API key is inherited, and `config` (if any) is
/// passed via `--config` so the user's own config file is never read.
pub fn run_linctl(config: Option<&Path>, args: &[&str]) -> Output {
    run_linctl_with_env(config, &[], args)
}

/// Like [`run_linctl`], with extra environment variables set after the scrub.
pub fn run_linctl_with_env(config: Option<&Path>, env: &[(&str, &str)], args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_linctl"));
    command
        .env("NO_COLOR", "1")
        .env_remove("LINEAR_API_KEY")
        .env_remove("LINCTL_CONFIG")
        .env_remove("LINCTL_ASCII")
        .env_remove("LINCTL_TITLE_WIDTH")
        .env_remove("RUST_LOG")
        .envs(env.iter().copied());

    if let Some(config) = config {
        command.arg("--config").arg(config);
    }

    command
        .args(args)
        .output()
        .expect("Failed to execute linctl binary")
}

/// Stdout of a finished command as a string.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a finished command as a string.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
