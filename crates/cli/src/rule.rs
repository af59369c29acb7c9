// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rule contract and result types.
//!
//! A rule is one compliance concern. Every rule can check; rules with a safe
//! automated remediation also expose a [`Fix`] through [`Remedy`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::VersionControl;
use crate::platform::RemotePlatform;
use crate::repo::Repo;

/// Rule grouping used for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    RepoStructure,
    Dependencies,
    Python,
    Ci,
    Claude,
    Security,
    GitHygiene,
}

impl Category {
    pub const ALL: &[Category] = &[
        Category::RepoStructure,
        Category::Dependencies,
        Category::Python,
        Category::Ci,
        Category::Claude,
        Category::Security,
        Category::GitHygiene,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::RepoStructure => "repo-structure",
            Category::Dependencies => "dependencies",
            Category::Python => "python",
            Category::Ci => "ci",
            Category::Claude => "claude",
            Category::Security => "security",
            Category::GitHygiene => "git-hygiene",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::RepoStructure => "Repository Structure",
            Category::Dependencies => "Dependency Management",
            Category::Python => "Python Projects",
            Category::Ci => "CI/CD",
            Category::Claude => "Claude Code Configuration",
            Category::Security => "Security",
            Category::GitHygiene => "Git Hygiene",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Accepts `git-hygiene`, `git_hygiene`, `GIT_HYGIENE` or the title.
    fn from_str(s: &str) -> Result<Self> {
        let normalize = |v: &str| {
            v.trim()
                .to_ascii_lowercase()
                .replace(['_', ' '], "-")
        };
        let wanted = normalize(s);
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted || normalize(c.title()) == wanted)
            .ok_or_else(|| {
                let names: Vec<_> = Category::ALL.iter().map(|c| c.as_str()).collect();
                Error::Argument(format!(
                    "unknown category '{}' (expected one of: {})",
                    s,
                    names.join(", ")
                ))
            })
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckResult {
    Pass,
    Fail {
        reason: String,
    },
    /// The rule does not apply. Never counts as a failure.
    Skip {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl CheckResult {
    pub fn fail(reason: impl Into<String>) -> Self {
        CheckResult::Fail {
            reason: reason.into(),
        }
    }

    pub fn skip(reason: impl Into<String>) -> Self {
        CheckResult::Skip {
            reason: Some(reason.into()),
        }
    }

    /// Skip without a reason: the rule plainly does not apply.
    pub fn not_applicable() -> Self {
        CheckResult::Skip { reason: None }
    }

    pub fn status(&self) -> Status {
        match self {
            CheckResult::Pass => Status::Pass,
            CheckResult::Fail { .. } => Status::Fail,
            CheckResult::Skip { .. } => Status::Skip,
        }
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, CheckResult::Fail { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            CheckResult::Pass => None,
            CheckResult::Fail { reason } => Some(reason),
            CheckResult::Skip { reason } => reason.as_deref(),
        }
    }
}

/// Terminal status without detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
    Skip,
}

/// What happened when remediation was considered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FixOutcome {
    /// Fix ran and the re-check passed.
    Applied { summary: String },
    /// Fix ran without error but the re-check still fails.
    AppliedButStillFailing { summary: String },
    /// Fix returned an error or panicked.
    FixError { detail: String },
    /// No fix exists, or preview mode. `planned` describes the preview.
    NotAttempted {
        #[serde(skip_serializing_if = "Option::is_none")]
        planned: Option<String>,
    },
}

/// Collaborators and settings shared by every rule during one run.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub vcs: &'a dyn VersionControl,
    pub platform: &'a dyn RemotePlatform,
    pub config: &'a Config,
    /// Wall clock for the run, injected so age checks are reproducible.
    pub now: DateTime<Utc>,
}

/// Remediation capability of a rule.
pub enum Remedy<'a> {
    CheckOnly,
    CheckAndFix(&'a dyn Fix),
}

/// One compliance concern.
pub trait Rule: Send + Sync {
    /// Stable identifier, unique across the catalogue.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    fn category(&self) -> Category;

    /// Rules that must reach a terminal state before this one runs.
    fn depends_on(&self) -> &'static [&'static str] {
        &[]
    }

    /// Evaluate the repository. Must not mutate anything.
    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult>;

    fn remedy(&self) -> Remedy<'_> {
        Remedy::CheckOnly
    }
}

/// Automated remediation for a failing rule.
pub trait Fix: Send + Sync {
    /// Describe what [`Fix::apply`] would do. Takes `&Repo`, so previews
    /// cannot mutate.
    fn plan(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<String>;

    /// Perform the remediation and return a one-line summary.
    ///
    /// Implementations must invalidate every repository fact they change.
    fn apply(&self, repo: &mut Repo, ctx: &RuleContext<'_>) -> Result<String>;
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
