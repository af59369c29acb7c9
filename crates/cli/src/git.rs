// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Version-control capability.
//!
//! Rules never touch git directly. They ask a [`VersionControl`] for the
//! handful of facts they need, which keeps them testable against a fake.
//! The production implementation uses git2 (libgit2) to avoid subprocess
//! overhead.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use git2::{BranchType, ErrorCode, Repository, StatusOptions};
use regex::Regex;

use crate::error::Result;

/// A local branch and the committer time of its tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTip {
    pub name: String,
    pub committed_at: DateTime<Utc>,
}

/// Narrow view of the version-control operations rules rely on.
pub trait VersionControl: Send + Sync {
    /// Whether `name` resolves to a revision.
    fn branch_exists(&self, root: &Path, name: &str) -> Result<bool>;

    /// URL of the `origin` remote, if configured.
    fn remote_url(&self, root: &Path) -> Result<Option<String>>;

    /// Configured `user.name`.
    fn user_name(&self, root: &Path) -> Result<Option<String>>;

    /// Tracked files that the ignore rules would exclude.
    fn tracked_ignored(&self, root: &Path) -> Result<Vec<String>>;

    /// Remove paths from the index, leaving the working tree alone.
    fn untrack(&self, root: &Path, paths: &[String]) -> Result<()>;

    /// Number of modified, staged, or untracked entries.
    fn uncommitted_changes(&self, root: &Path) -> Result<usize>;

    /// Commits on the current branch not yet on its upstream.
    fn unpushed_commits(&self, root: &Path) -> Result<usize>;

    /// Local branches (other than `base`) fully merged into `base`, sorted.
    fn merged_branches(&self, root: &Path, base: &str) -> Result<Vec<String>>;

    /// Every local branch with its tip commit time.
    fn branch_tips(&self, root: &Path) -> Result<Vec<BranchTip>>;
}

/// libgit2-backed [`VersionControl`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Git;

impl Git {
    fn open(root: &Path) -> Result<Repository> {
        Ok(Repository::open(root)?)
    }
}

impl VersionControl for Git {
    fn branch_exists(&self, root: &Path, name: &str) -> Result<bool> {
        let repo = Self::open(root)?;
        Ok(repo.revparse_single(name).is_ok())
    }

    fn remote_url(&self, root: &Path) -> Result<Option<String>> {
        let repo = Self::open(root)?;
        match repo.find_remote("origin") {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn user_name(&self, root: &Path) -> Result<Option<String>> {
        let repo = Self::open(root)?;
        let config = repo.config()?;
        match config.get_string("user.name") {
            Ok(name) if !name.trim().is_empty() => Ok(Some(name)),
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn tracked_ignored(&self, root: &Path) -> Result<Vec<String>> {
        let repo = Self::open(root)?;
        let index = repo.index()?;
        let mut files = Vec::new();
        for entry in index.iter() {
            let path = String::from_utf8_lossy(&entry.path).into_owned();
            if repo.is_path_ignored(Path::new(&path))? {
                files.push(path);
            }
        }
        Ok(files)
    }

    fn untrack(&self, root: &Path, paths: &[String]) -> Result<()> {
        let repo = Self::open(root)?;
        let mut index = repo.index()?;
        for path in paths {
            index.remove_path(Path::new(path))?;
        }
        index.write()?;
        tracing::debug!(count = paths.len(), "removed paths from index");
        Ok(())
    }

    fn uncommitted_changes(&self, root: &Path) -> Result<usize> {
        let repo = Self::open(root)?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(false)
            .include_ignored(false);
        let statuses = repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .filter(|entry| entry.status() != git2::Status::CURRENT)
            .count())
    }

    fn unpushed_commits(&self, root: &Path) -> Result<usize> {
        let repo = Self::open(root)?;
        let head = match repo.head() {
            Ok(head) => head,
            // Unborn branch: nothing to push.
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };
        if !head.is_branch() {
            return Ok(0);
        }
        let Some(local) = head.target() else {
            return Ok(0);
        };
        let branch = git2::Branch::wrap(head);
        let Ok(upstream) = branch.upstream() else {
            return Ok(0);
        };
        let Some(remote) = upstream.get().target() else {
            return Ok(0);
        };
        let (ahead, _behind) = repo.graph_ahead_behind(local, remote)?;
        Ok(ahead)
    }

    fn merged_branches(&self, root: &Path, base: &str) -> Result<Vec<String>> {
        let repo = Self::open(root)?;
        let base_oid = match repo.find_branch(base, BranchType::Local) {
            Ok(branch) => match branch.get().target() {
                Some(oid) => oid,
                None => return Ok(Vec::new()),
            },
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut merged = Vec::new();
        for item in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = item?;
            let Some(name) = branch.name()?.map(String::from) else {
                continue;
            };
            if name == base {
                continue;
            }
            let Some(tip) = branch.get().target() else {
                continue;
            };
            if tip == base_oid || repo.graph_descendant_of(base_oid, tip)? {
                merged.push(name);
            }
        }
        merged.sort();
        Ok(merged)
    }

    fn branch_tips(&self, root: &Path) -> Result<Vec<BranchTip>> {
        let repo = Self::open(root)?;
        let mut tips = Vec::new();
        for item in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = item?;
            let Some(name) = branch.name()?.map(String::from) else {
                continue;
            };
            let commit = branch.get().peel_to_commit()?;
            let Some(committed_at) = DateTime::from_timestamp(commit.committer().when().seconds(), 0)
            else {
                continue;
            };
            tips.push(BranchTip { name, committed_at });
        }
        tips.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tips)
    }
}

#[allow(clippy::expect_used)]
static GITHUB_SSH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git@github\.com:([^/]+/[^/]+?)(?:\.git)?$").expect("valid regex")
});

#[allow(clippy::expect_used)]
static GITHUB_HTTPS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://github\.com/([^/]+/[^/]+?)(?:\.git)?/?$").expect("valid regex")
});

/// Extract `owner/name` from a GitHub remote URL.
pub fn github_slug(url: &str) -> Option<String> {
    let url = url.trim();
    GITHUB_SSH
        .captures(url)
        .or_else(|| GITHUB_HTTPS.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
