// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Secret and PII scanning rules.

use std::sync::LazyLock;

use regex::Regex;

use super::append;
use crate::error::Result;
use crate::repo::{Fact, PRE_COMMIT, Repo};
use crate::rule::{Category, CheckResult, Fix, Remedy, Rule, RuleContext};
use crate::templates;

#[allow(clippy::expect_used)]
static PII_WORKFLOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"pii-scan\.yml|release\.yml|gitleaks-action").expect("valid regex")
});

/// The repository that defines the hook does not consume it.
const HOOK_HOME: &str = ".github";

/// A pre-commit config runs the organization's gitleaks hook.
pub struct PrecommitGitleaks;

impl Rule for PrecommitGitleaks {
    fn id(&self) -> &'static str {
        "PRECOMMIT_GITLEAKS"
    }

    fn name(&self) -> &'static str {
        "Gitleaks pre-commit hook"
    }

    fn category(&self) -> Category {
        Category::Security
    }

    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult> {
        if repo.name() == HOOK_HOME {
            return Ok(CheckResult::skip("repository hosts the shared hook"));
        }
        Ok(match repo.pre_commit()?.present() {
            None => CheckResult::fail(format!("{} not found", PRE_COMMIT)),
            Some(text) if text.contains(ctx.config.organization.shared_repo.as_str()) => {
                CheckResult::Pass
            }
            Some(_) => CheckResult::fail(format!("{} missing gitleaks hook", PRE_COMMIT)),
        })
    }

    fn remedy(&self) -> Remedy<'_> {
        Remedy::CheckAndFix(self)
    }
}

impl Fix for PrecommitGitleaks {
    fn plan(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<String> {
        Ok(if repo.pre_commit()?.is_absent() {
            format!("create {} with gitleaks hook", PRE_COMMIT)
        } else {
            format!("append gitleaks hook to {}", PRE_COMMIT)
        })
    }

    fn apply(&self, repo: &mut Repo, ctx: &RuleContext<'_>) -> Result<String> {
        let shared = &ctx.config.organization.shared_repo;
        let (contents, summary) = match repo.pre_commit()?.present() {
            Some(text) => (
                append(text, &format!("\n{}", templates::pre_commit_hook(shared))),
                format!("appended gitleaks hook to {}", PRE_COMMIT),
            ),
            None => (
                templates::pre_commit_config(shared),
                format!("created {}", PRE_COMMIT),
            ),
        };
        repo.write(PRE_COMMIT, &contents, &[Fact::PreCommit])?;
        Ok(summary)
    }
}

/// Some workflow scans for personal data or secrets.
pub struct PiiScan;

impl Rule for PiiScan {
    fn id(&self) -> &'static str {
        "PII_SCAN"
    }

    fn name(&self) -> &'static str {
        "PII scanning in CI"
    }

    fn category(&self) -> Category {
        Category::Security
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        if !repo.has_workflows()? {
            return Ok(CheckResult::not_applicable());
        }
        Ok(if repo.workflows_match(&PII_WORKFLOW)? {
            CheckResult::Pass
        } else {
            CheckResult::fail("No PII scanning in CI workflows")
        })
    }
}

#[cfg(test)]
#[path = "security_tests.rs"]
mod tests;
