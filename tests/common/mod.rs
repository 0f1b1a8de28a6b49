//! Shared testing utilities for wfd CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(dead_code)]
pub const PROJECTS_YAML: &str = r#"
projects:
  shop:
    repo: acme/shop
    workflow: deploy.yaml
    branch: main
    defaults:
      stack: PHP8.4/MySQL8
  docs:
    repo: acme/docs
    workflow: pages.yml
"#;

/// Settings that never sleep for long.
#[allow(dead_code)]
pub const FAST_SETTINGS_YAML: &str = r#"
workflow:
  poll_interval: 1
  timeout: 5
  show_progress: false
  max_parallel: 2
  dispatch_settle: 0
  discovery_attempts: 2
"#;

/// Testing harness providing an isolated environment for CLI exercises.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
    api_url: Option<String>,
}

#[allow(dead_code)]
impl TestContext {
    /// Create a new isolated environment.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");

        Self { root, work_dir, api_url: None }
    }

    /// Isolated environment with projects and fast settings in the work directory.
    pub fn configured(api_url: &str) -> Self {
        let mut ctx = Self::new();
        ctx.write_projects(PROJECTS_YAML);
        ctx.write_settings(FAST_SETTINGS_YAML);
        ctx.api_url = Some(api_url.to_string());
        ctx
    }

    /// Absolute path to the emulated `$HOME` directory.
    pub fn home(&self) -> &Path {
        self.root.path()
    }

    /// Path to the workspace directory used for CLI invocations.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn write_projects(&self, content: &str) {
        fs::write(self.work_dir.join("projects.yaml"), content).expect("Failed to write projects");
    }

    pub fn write_settings(&self, content: &str) {
        fs::write(self.work_dir.join("config.yaml"), content).expect("Failed to write settings");
    }

    /// Build a command for the compiled `wfd` binary, authenticated.
    pub fn cli(&self) -> Command {
        let mut cmd = self.unauthenticated_cli();
        cmd.env("GITHUB_TOKEN", "test-token");
        cmd
    }

    /// Build a command for the compiled `wfd` binary with no token in its environment.
    pub fn unauthenticated_cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("wfd").expect("Failed to locate wfd binary");
        cmd.current_dir(&self.work_dir)
            .env("HOME", self.home())
            .env_remove("GITHUB_TOKEN")
            .env_remove("GH_TOKEN")
            .env_remove("WFD_PROJECTS")
            .env_remove("WFD_CONFIG")
            .env_remove("RUST_LOG");
        match &self.api_url {
            Some(url) => cmd.env("GITHUB_API_URL", url),
            None => cmd.env_remove("GITHUB_API_URL"),
        };
        cmd
    }
}
