//! Common test utilities for CLI testing.

use std::path::Path;
use std::process::Output;

use assert_cmd::Command;
use tempfile::TempDir;
use vitrine_test_utils::{temp_dir, write_tree};

/// A project directory with a `templates/` folder.
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp_dir: temp_dir(),
        }
    }

    /// Write `templates/<name>.hbs` for each pair.
    pub fn with_templates(self, templates: &[(&str, &str)]) -> Self {
        let files: Vec<(String, &str)> = templates
            .iter()
            .map(|(name, body)| (format!("templates/{}.hbs", name), *body))
            .collect();
        let files: Vec<(&str, &str)> = files.iter().map(|(p, b)| (p.as_str(), *b)).collect();
        write_tree(self.path(), &files);
        self
    }

    pub fn with_config(self, yaml: &str) -> Self {
        write_tree(self.path(), &[(".vitrine/config.yaml", yaml)]);
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Command running in the project directory with retries disabled.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("vitrine").expect("Binary not found");
        cmd.current_dir(self.path())
            .env_remove("VITRINE_CONFIG")
            .env_remove("VITRINE_TEMPLATE_PATH")
            .env_remove("VITRINE_TIMEOUT_MS")
            .env_remove("VITRINE_RETRY_ON_TIMEOUT")
            .env_remove("VITRINE_LOG_FILE")
            .env_remove("VITRINE_LOG_LEVEL")
            .env_remove("RUST_LOG")
            .env("VITRINE_MAX_RETRIES", "0")
            .env("VITRINE_RETRY_DELAY_MS", "1");
        cmd
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Assert helpers for CLI output
pub trait OutputAssertions {
    fn assert_success(&self);
    fn assert_stdout_contains(&self, text: &str);
    fn assert_stderr_contains(&self, text: &str);
    fn assert_exit_code(&self, code: i32);
}

impl OutputAssertions for Output {
    fn assert_success(&self) {
        assert!(
            self.status.success(),
            "Command failed with status: {}\nstderr: {}",
            self.status,
            String::from_utf8_lossy(&self.stderr)
        );
    }

    fn assert_stdout_contains(&self, text: &str) {
        let stdout = String::from_utf8_lossy(&self.stdout);
        assert!(
            stdout.contains(text),
            "stdout did not contain '{}'\nstdout: {}",
            text,
            stdout
        );
    }

    fn assert_stderr_contains(&self, text: &str) {
        let stderr = String::from_utf8_lossy(&self.stderr);
        assert!(
            stderr.contains(text),
            "stderr did not contain '{}'\nstderr: {}",
            text,
            stderr
        );
    }

    fn assert_exit_code(&self, code: i32) {
        assert_eq!(
            self.status.code(),
            Some(code),
            "Expected exit code {}, got {:?}\nstderr: {}",
            code,
            self.status.code(),
            String::from_utf8_lossy(&self.stderr)
        );
    }
}
