// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in rule catalogue.
//!
//! All 30 rules are registered here, in canonical order:
//! - hygiene: default branch, pending commits, stale branches
//! - structure: license, logo, ignore file, README, tracked-but-ignored files,
//!   dependency-bot config
//! - readme: README content, license/logo/badge references, remote description
//! - claude: CLAUDE.md, sandbox, permission hygiene
//! - python: manifest, minimum version, CLI packaging metadata
//! - ci: workflow presence and remote run status
//! - security: secret-scanning hook, PII scanning in CI
//!
//! The order below is the tiebreak for dependency ordering in the registry.

pub mod ci;
pub mod claude;
pub mod hygiene;
pub mod python;
pub mod readme;
pub mod security;
pub mod structure;

use std::sync::Arc;

use crate::error::Error;
use crate::repo::Repo;
use crate::rule::{CheckResult, Rule, RuleContext};

/// Create all built-in rules in catalogue order.
pub fn all_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(hygiene::DefaultBranch),
        Arc::new(structure::LicenseExists),
        Arc::new(structure::LogoExists),
        Arc::new(structure::Gitignore),
        Arc::new(claude::ClaudeMdExists),
        Arc::new(python::PythonPyproject),
        Arc::new(structure::ReadmeExists),
        Arc::new(readme::ReadmeCurrent),
        Arc::new(readme::ReadmeLicense),
        Arc::new(readme::ReadmeLogo),
        Arc::new(readme::ReadmeCiBadge),
        Arc::new(structure::TrackedIgnored),
        Arc::new(claude::ClaudeSandbox),
        Arc::new(claude::SettingsDangerous),
        Arc::new(claude::SettingsClean),
        Arc::new(python::PythonMinVersion),
        Arc::new(python::CliBuildBackend),
        Arc::new(python::CliVersion),
        Arc::new(ci::CliReleaseWorkflow),
        Arc::new(python::CliPypiReady),
        Arc::new(structure::DependabotExists),
        Arc::new(security::PrecommitGitleaks),
        Arc::new(hygiene::PendingCommits),
        Arc::new(hygiene::StaleBranches),
        Arc::new(ci::CiWorkflow),
        Arc::new(ci::WorkflowsPassing),
        Arc::new(ci::CiPassing),
        Arc::new(ci::ReleaseWorkflow),
        Arc::new(security::PiiScan),
        Arc::new(readme::RepoDescription),
    ]
}

/// Skip carrying the collaborator failure as its reason.
fn degraded(collaborator: &str, e: &Error) -> CheckResult {
    tracing::warn!("{} unavailable: {}", collaborator, e);
    CheckResult::skip(format!("{} unavailable: {}", collaborator, e))
}

/// `owner/name` on the hosting platform, or the Skip to report when the
/// platform cannot be used for this repository.
fn remote_slug<'r>(
    repo: &'r Repo,
    ctx: &RuleContext<'_>,
) -> std::result::Result<&'r str, CheckResult> {
    if !ctx.platform.authenticated() {
        return Err(CheckResult::skip("gh not authenticated"));
    }
    match repo.remote(ctx.vcs) {
        Ok(Some(slug)) => Ok(slug),
        Ok(None) => Err(CheckResult::skip("no GitHub remote")),
        Err(e) => Err(degraded("git", &e)),
    }
}

/// `text` followed by `block`, inserting a newline first when `text` does
/// not end with one.
fn append(text: &str, block: &str) -> String {
    let mut out = String::with_capacity(text.len() + block.len() + 1);
    out.push_str(text);
    if !text.is_empty() && !text.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(block);
    out
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
