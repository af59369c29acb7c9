// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Git hygiene rules.
//!
//! All three degrade to Skip when git itself cannot answer.

use chrono::Duration;

use super::degraded;
use crate::error::Result;
use crate::repo::Repo;
use crate::rule::{Category, CheckResult, Rule, RuleContext};

/// Branch names never reported as merged or stale.
const PROTECTED: &[&str] = &["main", "master"];

/// The configured default branch exists locally.
pub struct DefaultBranch;

impl Rule for DefaultBranch {
    fn id(&self) -> &'static str {
        "DEFAULT_BRANCH"
    }

    fn name(&self) -> &'static str {
        "Default branch exists"
    }

    fn category(&self) -> Category {
        Category::GitHygiene
    }

    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult> {
        let branch = &ctx.config.branches.default;
        Ok(match ctx.vcs.branch_exists(repo.root(), branch) {
            Ok(true) => CheckResult::Pass,
            Ok(false) => CheckResult::fail(format!("No '{}' branch found", branch)),
            Err(e) => degraded("git", &e),
        })
    }
}

/// Nothing uncommitted, nothing unpushed.
pub struct PendingCommits;

impl Rule for PendingCommits {
    fn id(&self) -> &'static str {
        "PENDING_COMMITS"
    }

    fn name(&self) -> &'static str {
        "No pending commits"
    }

    fn category(&self) -> Category {
        Category::GitHygiene
    }

    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult> {
        let uncommitted = match ctx.vcs.uncommitted_changes(repo.root()) {
            Ok(n) => n,
            Err(e) => return Ok(degraded("git", &e)),
        };
        let unpushed = match ctx.vcs.unpushed_commits(repo.root()) {
            Ok(n) => n,
            Err(e) => return Ok(degraded("git", &e)),
        };

        let mut reasons = Vec::new();
        if uncommitted > 0 {
            reasons.push(format!("{} uncommitted change(s)", uncommitted));
        }
        if unpushed > 0 {
            reasons.push(format!("{} unpushed commit(s)", unpushed));
        }
        Ok(if reasons.is_empty() {
            CheckResult::Pass
        } else {
            CheckResult::fail(reasons.join("; "))
        })
    }
}

/// No merged or long-inactive local branches.
///
/// Merged and inactive branches are separate reasons in one failure.
pub struct StaleBranches;

impl Rule for StaleBranches {
    fn id(&self) -> &'static str {
        "STALE_BRANCHES"
    }

    fn name(&self) -> &'static str {
        "No stale branches"
    }

    fn category(&self) -> Category {
        Category::GitHygiene
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["DEFAULT_BRANCH"]
    }

    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult> {
        let default = ctx.config.branches.default.as_str();
        match ctx.vcs.branch_exists(repo.root(), default) {
            Ok(true) => {}
            Ok(false) => return Ok(CheckResult::skip(format!("no '{}' branch", default))),
            Err(e) => return Ok(degraded("git", &e)),
        }
        let reportable = |name: &str| name != default && !PROTECTED.contains(&name);

        let merged: Vec<String> = match ctx.vcs.merged_branches(repo.root(), default) {
            Ok(branches) => branches.into_iter().filter(|b| reportable(b)).collect(),
            Err(e) => return Ok(degraded("git", &e)),
        };
        let Some(cutoff) = Duration::try_days(ctx.config.branches.stale_days)
            .and_then(|age| ctx.now.checked_sub_signed(age))
        else {
            return Ok(CheckResult::fail(format!(
                "branches.stale_days out of range: {}",
                ctx.config.branches.stale_days
            )));
        };
        let stale: Vec<String> = match ctx.vcs.branch_tips(repo.root()) {
            Ok(tips) => tips
                .into_iter()
                .filter(|tip| reportable(&tip.name) && tip.committed_at < cutoff)
                .map(|tip| tip.name)
                .collect(),
            Err(e) => return Ok(degraded("git", &e)),
        };

        let mut reasons = Vec::new();
        if !merged.is_empty() {
            reasons.push(format!(
                "{} merged branch(es): {}",
                merged.len(),
                merged.join(", ")
            ));
        }
        if !stale.is_empty() {
            reasons.push(format!(
                "{} stale branch(es) (>{}d): {}",
                stale.len(),
                ctx.config.branches.stale_days,
                stale.join(", ")
            ));
        }
        Ok(if reasons.is_empty() {
            CheckResult::Pass
        } else {
            CheckResult::fail(reasons.join("; "))
        })
    }
}

#[cfg(test)]
#[path = "hygiene_tests.rs"]
mod tests;
