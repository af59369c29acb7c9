// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers for behavioral specifications.
//!
//! Provides a small DSL for building a fleet of git repositories in a temp
//! directory and running the fleetguard binary against it.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub use assert_cmd::prelude::*;
pub use predicates;
pub use predicates::prelude::{Predicate, PredicateBooleanExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Trait for converting into a string predicate.
/// Allows passing `&str` (as contains) or any `Predicate<str>`.
pub trait IntoStrPredicate<P: Predicate<str>> {
    fn into_predicate(self) -> P;
}

impl IntoStrPredicate<predicates::str::ContainsPredicate> for &str {
    fn into_predicate(self) -> predicates::str::ContainsPredicate {
        predicates::str::contains(self)
    }
}

impl<P: Predicate<str>> IntoStrPredicate<P> for P {
    fn into_predicate(self) -> P {
        self
    }
}

/// Returns a Command configured to run the fleetguard binary, isolated from
/// the caller's environment.
pub fn fleetguard_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fleetguard"));
    cmd.env_remove("FLEETGUARD_REPOS_DIR")
        .env_remove("FLEETGUARD_CONFIG")
        .env_remove("FLEETGUARD_LOG")
        .env_remove("GH_TOKEN")
        .env_remove("GITHUB_TOKEN")
        .env("GH_CONFIG_DIR", std::env::temp_dir().join("fleetguard-specs-no-gh"))
        .env("NO_COLOR", "1");
    cmd
}

/// Run `args` against `fleet` and collect the output.
pub fn run(fleet: &Fleet, args: &[&str]) -> RunAssert {
    let mut cmd = fleetguard_cmd();
    cmd.args(args).arg(fleet.path());
    RunAssert {
        output: cmd.output().expect("command should run"),
    }
}

// =============================================================================
// RunAssert
// =============================================================================

pub struct RunAssert {
    output: std::process::Output,
}

#[allow(dead_code)]
impl RunAssert {
    /// Get stdout as string
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    /// Get stderr as string
    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Parse stdout as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.output.stdout).expect("stdout should be valid JSON")
    }

    /// Assert the process exited with `code`
    pub fn exits(self, code: i32) -> Self {
        assert_eq!(
            self.output.status.code(),
            Some(code),
            "expected exit code {}, got {:?}\nstdout: {}\nstderr: {}",
            code,
            self.output.status.code(),
            self.stdout(),
            self.stderr()
        );
        self
    }

    pub fn passes(self) -> Self {
        self.exits(0)
    }

    pub fn fails(self) -> Self {
        self.exits(1)
    }

    /// Assert stdout matches predicate.
    ///
    /// ```ignore
    /// .stdout_has("FAIL")  // contains
    /// .stdout_has(predicates::str::is_match(r"^\d+ repositories").unwrap())
    /// ```
    pub fn stdout_has<I, P>(self, predicate: I) -> Self
    where
        I: IntoStrPredicate<P>,
        P: Predicate<str>,
    {
        let stdout = self.stdout();
        assert!(
            predicate.into_predicate().eval(&stdout),
            "stdout predicate failed:\n{}",
            stdout
        );
        self
    }

    /// Assert stdout does not match predicate.
    pub fn stdout_lacks<I, P>(self, predicate: I) -> Self
    where
        I: IntoStrPredicate<P>,
        P: Predicate<str>,
    {
        let stdout = self.stdout();
        assert!(
            !predicate.into_predicate().eval(&stdout),
            "stdout should NOT match predicate:\n{}",
            stdout
        );
        self
    }

    /// Assert stderr matches predicate.
    pub fn stderr_has<I, P>(self, predicate: I) -> Self
    where
        I: IntoStrPredicate<P>,
        P: Predicate<str>,
    {
        let stderr = self.stderr();
        assert!(
            predicate.into_predicate().eval(&stderr),
            "stderr predicate failed:\n{}",
            stderr
        );
        self
    }
}

// =============================================================================
// Fleet
// =============================================================================

/// Temporary fleet directory holding git repositories.
///
/// ```ignore
/// let fleet = Fleet::new();
/// fleet.repo("widget").file("README.md", "# Widget\n").commit();
/// run(&fleet, &["audit"]).fails();
/// ```
pub struct Fleet {
    dir: tempfile::TempDir,
}

#[allow(dead_code)]
impl Fleet {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write fleetguard.toml (auto-prefixes with `version = 1` if not present)
    pub fn config(&self, content: &str) {
        let content = if content.contains("version") {
            content.to_string()
        } else {
            format!("version = 1\n{}", content)
        };
        std::fs::write(self.path().join("fleetguard.toml"), content).unwrap();
    }

    /// Initialize a git repository on `main` with a test identity.
    pub fn repo(&self, name: &str) -> RepoDir {
        let path = self.path().join(name);
        std::fs::create_dir_all(&path).unwrap();
        git(&path, &["init", "-q", "-b", "main"]);
        git(&path, &["config", "user.email", "test@example.com"]);
        git(&path, &["config", "user.name", "Test User"]);
        git(&path, &["config", "commit.gpgsign", "false"]);
        RepoDir { path }
    }
}

/// One repository inside a [`Fleet`].
pub struct RepoDir {
    path: PathBuf,
}

#[allow(dead_code)]
impl RepoDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a file (parent directories created automatically)
    pub fn file(&self, rel: &str, content: &str) -> &Self {
        let full = self.path.join(rel);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
        self
    }

    /// Stage everything and commit.
    pub fn commit(&self) -> &Self {
        git(&self.path, &["add", "-A"]);
        git(&self.path, &["commit", "-q", "--allow-empty", "-m", "initial"]);
        self
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path.join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path.join(rel).exists()
    }
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git should run");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A README with a tagline, install and usage sections, and enough text to
/// count as current.
pub const GOOD_README: &str = "# Widget\n\n\
A small tool that keeps widgets aligned across every project.\n\n\
## Installation\n\npip install widget\n\n\
## Usage\n\nwidget align --all\n";

/// Ignore file covering every default pattern, spread across the file.
pub const SCATTERED_GITIGNORE: &str = "# env\n.env\n\n# macOS\n.DS_Store\n\n\
# js\nnode_modules/\n\n# python\n__pycache__/\n*.pyc\n\nbuild/\n.venv/\n";
