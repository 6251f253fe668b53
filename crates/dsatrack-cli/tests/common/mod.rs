use std::path::{Path, PathBuf};
use std::process::Output;

use tempfile::TempDir;
use tokio::process::Command;

/// Isolated token file location for one test.
pub struct Workspace {
    _dir: TempDir,
    pub session_file: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let session_file = dir.path().join("session.json");
        Self {
            _dir: dir,
            session_file,
        }
    }

    /// Seed the token file as a previous login would have left it.
    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        let workspace = Self::new();
        let json = serde_json::json!({"access": access, "refresh": refresh});
        std::fs::write(&workspace.session_file, json.to_string()).expect("Failed to seed tokens");
        workspace
    }

    /// Read the token file back, or `None` if it does not exist.
    pub fn tokens(&self) -> Option<serde_json::Value> {
        let json = std::fs::read_to_string(&self.session_file).ok()?;
        Some(serde_json::from_str(&json).expect("Token file is not JSON"))
    }
}

/// Run the CLI binary against `api_url` with an isolated token file.
pub async fn run_cli(args: &[&str], session_file: &Path, api_url: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dsatrack"))
        .args(args)
        .env("DSATRACK_API_URL", api_url)
        .env("DSATRACK_SESSION_FILE", session_file)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("DSATRACK_PASSWORD")
        .output()
        .await
        .expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], session_file: &Path, api_url: &str) -> String {
    let output = run_cli(args, session_file, api_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub async fn run_cli_failure(args: &[&str], session_file: &Path, api_url: &str) -> String {
    let output = run_cli(args, session_file, api_url).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}
