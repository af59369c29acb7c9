// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared unit test utilities.
//!
//! Provides temp repositories, fakes for the version-control and platform
//! capabilities, and a [`TestEnv`] that hands out a [`RuleContext`].

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::{BranchTip, VersionControl};
use crate::platform::{RemotePlatform, WorkflowRun};
use crate::repo::Repo;
use crate::rule::RuleContext;

/// Creates a temp directory that looks like a repository (has `.git/`).
pub fn temp_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    dir
}

/// Creates a temp repository containing `files` and opens a handle on it.
pub fn repo_with(files: &[(&str, &str)]) -> (TempDir, Repo) {
    let dir = temp_repo();
    create_tree(dir.path(), files);
    let repo = Repo::resolve(dir.path()).unwrap();
    (dir, repo)
}

/// Creates a directory tree from a list of (path, content) pairs.
///
/// Parent directories are created automatically.
pub fn create_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }
}

/// Snapshot every file under `root` (excluding `.git`) for mutation checks.
pub fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files = Vec::new();
    for entry in ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .filter_entry(|e| e.file_name() != ".git")
        .build()
        .flatten()
    {
        if entry.file_type().is_some_and(|t| t.is_file()) {
            let rel = entry.path().strip_prefix(root).unwrap().to_path_buf();
            files.push((rel, fs::read(entry.path()).unwrap()));
        }
    }
    files.sort();
    files
}

// =============================================================================
// GIT REPOSITORIES
// =============================================================================

/// Initialize a real git repository with `main` as the initial branch.
pub fn git_init(root: &Path) -> git2::Repository {
    let mut opts = git2::RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = git2::Repository::init_opts(root, &opts).unwrap();
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();
    repo
}

/// Stage everything (respecting ignore rules) and commit on HEAD.
pub fn git_commit_all(root: &Path, message: &str) -> git2::Oid {
    git_commit_all_at(root, message, None)
}

/// Like [`git_commit_all`] with an explicit committer time.
pub fn git_commit_all_at(root: &Path, message: &str, when: Option<DateTime<Utc>>) -> git2::Oid {
    let repo = git2::Repository::open(root).unwrap();
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = match when {
        Some(t) => git2::Signature::new(
            "Test User",
            "test@example.com",
            &git2::Time::new(t.timestamp(), 0),
        )
        .unwrap(),
        None => git2::Signature::now("Test User", "test@example.com").unwrap(),
    };
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// Create a branch at HEAD without checking it out.
pub fn git_branch(root: &Path, name: &str) {
    let repo = git2::Repository::open(root).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch(name, &head, false).unwrap();
}

/// Point HEAD at `name` and update the working tree.
pub fn git_checkout(root: &Path, name: &str) {
    let repo = git2::Repository::open(root).unwrap();
    repo.set_head(&format!("refs/heads/{}", name)).unwrap();
    repo.checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
        .unwrap();
}

// =============================================================================
// FAKES
// =============================================================================

/// In-memory [`VersionControl`].
#[derive(Default)]
pub struct FakeVcs {
    pub branches: Vec<String>,
    pub remote: Option<String>,
    pub user: Option<String>,
    pub tracked_ignored: Mutex<Vec<String>>,
    pub uncommitted: usize,
    pub unpushed: usize,
    pub merged: Vec<String>,
    pub tips: Vec<BranchTip>,
    /// Every call fails, as if git were missing.
    pub unavailable: bool,
}

impl FakeVcs {
    fn available(&self) -> Result<()> {
        if self.unavailable {
            return Err(Error::Vcs("git not available".into()));
        }
        Ok(())
    }
}

impl VersionControl for FakeVcs {
    fn branch_exists(&self, _root: &Path, name: &str) -> Result<bool> {
        self.available()?;
        Ok(self.branches.iter().any(|b| b == name))
    }

    fn remote_url(&self, _root: &Path) -> Result<Option<String>> {
        self.available()?;
        Ok(self.remote.clone())
    }

    fn user_name(&self, _root: &Path) -> Result<Option<String>> {
        self.available()?;
        Ok(self.user.clone())
    }

    fn tracked_ignored(&self, _root: &Path) -> Result<Vec<String>> {
        self.available()?;
        Ok(self.tracked_ignored.lock().unwrap().clone())
    }

    fn untrack(&self, _root: &Path, paths: &[String]) -> Result<()> {
        self.available()?;
        self.tracked_ignored
            .lock()
            .unwrap()
            .retain(|p| !paths.contains(p));
        Ok(())
    }

    fn uncommitted_changes(&self, _root: &Path) -> Result<usize> {
        self.available()?;
        Ok(self.uncommitted)
    }

    fn unpushed_commits(&self, _root: &Path) -> Result<usize> {
        self.available()?;
        Ok(self.unpushed)
    }

    fn merged_branches(&self, _root: &Path, _base: &str) -> Result<Vec<String>> {
        self.available()?;
        Ok(self.merged.clone())
    }

    fn branch_tips(&self, _root: &Path) -> Result<Vec<BranchTip>> {
        self.available()?;
        Ok(self.tips.clone())
    }
}

/// In-memory [`RemotePlatform`].
#[derive(Default)]
pub struct FakePlatform {
    pub authenticated: bool,
    pub archived: Vec<String>,
    pub description: Mutex<String>,
    pub runs: Vec<WorkflowRun>,
    pub last_conclusion: Option<String>,
    /// `set_description` fails.
    pub read_only: bool,
}

impl RemotePlatform for FakePlatform {
    fn authenticated(&self) -> bool {
        self.authenticated
    }

    fn is_archived(&self, slug: &str) -> Result<bool> {
        Ok(self.archived.iter().any(|a| a == slug))
    }

    fn description(&self, _slug: &str) -> Result<String> {
        Ok(self.description.lock().unwrap().clone())
    }

    fn set_description(&self, _slug: &str, description: &str) -> Result<()> {
        if self.read_only {
            return Err(Error::Platform("permission denied".into()));
        }
        *self.description.lock().unwrap() = description.to_string();
        Ok(())
    }

    fn workflow_runs(&self, _slug: &str, _branch: &str) -> Result<Vec<WorkflowRun>> {
        Ok(self.runs.clone())
    }

    fn last_run_conclusion(&self, _slug: &str, _branch: &str) -> Result<Option<String>> {
        Ok(self.last_conclusion.clone())
    }
}

/// Fixed clock for reproducible age checks.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Fakes plus config, producing a [`RuleContext`] on demand.
pub struct TestEnv {
    pub vcs: FakeVcs,
    pub platform: FakePlatform,
    pub config: Config,
    pub now: DateTime<Utc>,
}

impl TestEnv {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.settings.global = Some(PathBuf::from("/nonexistent/fleetguard/settings.json"));
        Self {
            vcs: FakeVcs {
                branches: vec!["main".into()],
                user: Some("Test User".into()),
                ..FakeVcs::default()
            },
            platform: FakePlatform::default(),
            config,
            now: fixed_now(),
        }
    }

    pub fn ctx(&self) -> RuleContext<'_> {
        RuleContext {
            vcs: &self.vcs,
            platform: &self.platform,
            config: &self.config,
            now: self.now,
        }
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
