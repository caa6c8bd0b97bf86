//! Test helpers for behavioral specifications.
//!
//! These tests are black-box: they invoke the `cronplusd` binary and verify
//! on-disk effects, stdout, and exit codes. See spec.md S8 for the scenarios
//! these specs are named after.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use assert_cmd::cargo::cargo_bin;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::{Duration, Instant};

pub const POLL_INTERVAL_MS: u64 = 20;
pub const WAIT_MAX_MS: u64 = 5_000;

fn cronplusd_binary() -> PathBuf {
    cargo_bin("cronplusd")
}

/// Poll a condition until it returns true or the timeout elapses.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
    }
    false
}

/// A running `cronplusd run` process, killed on drop.
pub struct Daemon {
    child: Child,
}

impl Daemon {
    /// Spawns `cronplusd run --config <config_path>` in the background.
    pub fn spawn(config_path: &Path) -> Self {
        let child = Command::new(cronplusd_binary())
            .args(["run", "--config"])
            .arg(config_path)
            .env("RUST_LOG", "warn")
            .spawn()
            .expect("cronplusd should spawn");
        Self { child }
    }

    /// Sends SIGTERM and waits (bounded) for the process to exit.
    pub fn stop(mut self) {
        self.signal_term();
        let _ = self.child.wait();
    }

    /// Ungracefully terminates the process (SIGKILL), simulating a crash
    /// with no opportunity for in-flight cleanup (spec.md S8 scenario F).
    pub fn kill(mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }

    fn signal_term(&self) {
        let _ = Command::new("kill").args(["-TERM", &self.child.id().to_string()]).status();
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        self.signal_term();
        let _ = self.child.wait();
    }
}

/// Runs a `cronplusd` subcommand to completion and returns its output.
pub fn cronplusd(args: &[&str]) -> std::process::Output {
    Command::new(cronplusd_binary()).args(args).output().expect("cronplusd should run")
}

/// A scratch directory tree for one test: `in/`, `out/`, `arc/`, plus the
/// runtime's state-store and dead-letter directories.
pub struct Workspace {
    root: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        for dir in ["in", "out", "arc", "state", "dead-letter"] {
            std::fs::create_dir_all(root.path().join(dir)).expect("create scratch dir");
        }
        Self { root }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    /// Writes `tasks.toml`-shaped config with one task, returning its path.
    pub fn write_config(&self, task_toml: &str) -> PathBuf {
        let config_path = self.path("cronplus.toml");
        let contents = format!(
            "[runtime]\nstate_store_location = {:?}\ndead_letter_location = {:?}\n\n{}",
            self.path("state").to_string_lossy(),
            self.path("dead-letter").to_string_lossy(),
            task_toml,
        );
        std::fs::write(&config_path, contents).expect("write config");
        config_path
    }

    pub fn write_file(&self, rel: &str, contents: &str) {
        std::fs::write(self.path(rel), contents).expect("write scratch file");
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read scratch file")
    }
}
