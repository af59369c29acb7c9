// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CI/CD rules.
//!
//! Presence rules scan `.github/workflows/*.{yml,yaml}` for references to
//! the organization's reusable workflows. Status rules ask the hosting
//! platform about runs on the default branch and skip when it is unusable.

use std::sync::LazyLock;

use regex::Regex;

use super::python::{has_version, is_cli};
use super::{degraded, remote_slug};
use crate::error::{Error, Result};
use crate::repo::{Fact, Repo, WORKFLOWS_DIR};
use crate::rule::{Category, CheckResult, Fix, Remedy, Rule, RuleContext};
use crate::templates;

/// Reusable test/release/ci workflow from the shared repository, or pytest.
const CI_PATTERN: &str = r"{shared}/.*/(test|release|ci)\.yml|pytest";
const RELEASE_PATTERN: &str = r"{shared}/.*/(release|publish-pypi)\.yml";

#[allow(clippy::expect_used)]
static PYPI_RELEASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"publish-pypi\.yml|release\.yml@main").expect("valid regex"));

/// Workflow pattern with `{shared}` bound to the configured shared repository.
fn shared_pattern(ctx: &RuleContext<'_>, template: &str) -> Result<Regex> {
    let source = template.replace(
        "{shared}",
        &regex::escape(&ctx.config.organization.shared_repo),
    );
    Regex::new(&source).map_err(|e| Error::Internal(format!("workflow pattern: {}", e)))
}

/// Whether a workflow runs the project's tests.
pub(super) fn has_ci_workflow(repo: &Repo, ctx: &RuleContext<'_>) -> Result<bool> {
    repo.workflows_match(&shared_pattern(ctx, CI_PATTERN)?)
}

/// Python repositories run tests in CI.
pub struct CiWorkflow;

impl Rule for CiWorkflow {
    fn id(&self) -> &'static str {
        "CI_WORKFLOW"
    }

    fn name(&self) -> &'static str {
        "CI workflow present"
    }

    fn category(&self) -> Category {
        Category::Ci
    }

    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult> {
        if !repo.is_python()? {
            return Ok(CheckResult::not_applicable());
        }
        Ok(if has_ci_workflow(repo, ctx)? {
            CheckResult::Pass
        } else {
            CheckResult::fail("No CI workflow referencing test.yml/release.yml/pytest")
        })
    }
}

/// Versioned projects have a release workflow.
pub struct ReleaseWorkflow;

impl Rule for ReleaseWorkflow {
    fn id(&self) -> &'static str {
        "RELEASE_WORKFLOW"
    }

    fn name(&self) -> &'static str {
        "Release workflow present"
    }

    fn category(&self) -> Category {
        Category::Ci
    }

    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult> {
        if !repo.manifest()?.present().is_some_and(has_version) {
            return Ok(CheckResult::not_applicable());
        }
        Ok(
            if repo.workflows_match(&shared_pattern(ctx, RELEASE_PATTERN)?)? {
                CheckResult::Pass
            } else {
                CheckResult::fail("Versioned project missing release workflow")
            },
        )
    }
}

/// Versioned CLI projects publish to PyPI.
pub struct CliReleaseWorkflow;

impl CliReleaseWorkflow {
    const TARGET: &'static str = ".github/workflows/release.yml";

    fn applies(repo: &Repo) -> Result<bool> {
        Ok(is_cli(repo)? && repo.manifest()?.present().is_some_and(has_version))
    }

    fn ensure_free(repo: &Repo) -> Result<()> {
        if repo.is_file(Self::TARGET) {
            return Err(Error::Remediation(format!(
                "{} exists but does not publish to PyPI",
                Self::TARGET
            )));
        }
        Ok(())
    }
}

impl Rule for CliReleaseWorkflow {
    fn id(&self) -> &'static str {
        "CLI_RELEASE_WORKFLOW"
    }

    fn name(&self) -> &'static str {
        "CLI release workflow"
    }

    fn category(&self) -> Category {
        Category::Ci
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["CLI_VERSION"]
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        if !Self::applies(repo)? {
            return Ok(CheckResult::not_applicable());
        }
        Ok(if repo.workflows_match(&PYPI_RELEASE)? {
            CheckResult::Pass
        } else {
            CheckResult::fail("No release workflow with PyPI publishing found")
        })
    }

    fn remedy(&self) -> Remedy<'_> {
        Remedy::CheckAndFix(self)
    }
}

impl Fix for CliReleaseWorkflow {
    fn plan(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<String> {
        Self::ensure_free(repo)?;
        Ok(format!(
            "create {} using {}",
            Self::TARGET,
            ctx.config.organization.shared_repo
        ))
    }

    fn apply(&self, repo: &mut Repo, ctx: &RuleContext<'_>) -> Result<String> {
        Self::ensure_free(repo)?;
        let contents = templates::release_workflow(&ctx.config.organization.shared_repo);
        repo.write(Self::TARGET, &contents, &[Fact::Workflows, Fact::Ecosystems])?;
        Ok(format!("created {}", Self::TARGET))
    }
}

/// Latest run of every workflow on the default branch succeeded.
pub struct WorkflowsPassing;

impl Rule for WorkflowsPassing {
    fn id(&self) -> &'static str {
        "WORKFLOWS_PASSING"
    }

    fn name(&self) -> &'static str {
        "Workflows passing"
    }

    fn category(&self) -> Category {
        Category::Ci
    }

    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult> {
        if !repo.has_workflows()? {
            return Ok(CheckResult::skip(format!("no {}", WORKFLOWS_DIR)));
        }
        let slug = match remote_slug(repo, ctx) {
            Ok(slug) => slug,
            Err(skip) => return Ok(skip),
        };
        let runs = match ctx
            .platform
            .workflow_runs(slug, &ctx.config.branches.default)
        {
            Ok(runs) => runs,
            Err(e) => return Ok(degraded("platform", &e)),
        };
        if runs.is_empty() {
            return Ok(CheckResult::skip("No completed workflow runs found"));
        }

        let failing: Vec<String> = runs
            .iter()
            .filter(|run| run.conclusion != "success")
            .map(|run| format!("{}: {}", run.name, run.conclusion))
            .collect();
        Ok(if failing.is_empty() {
            CheckResult::Pass
        } else {
            CheckResult::fail(failing.join(", "))
        })
    }
}

/// Latest CI run on the default branch succeeded.
pub struct CiPassing;

impl Rule for CiPassing {
    fn id(&self) -> &'static str {
        "CI_PASSING"
    }

    fn name(&self) -> &'static str {
        "CI passing"
    }

    fn category(&self) -> Category {
        Category::Ci
    }

    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult> {
        if !has_ci_workflow(repo, ctx)? {
            return Ok(CheckResult::not_applicable());
        }
        let slug = match remote_slug(repo, ctx) {
            Ok(slug) => slug,
            Err(skip) => return Ok(skip),
        };
        Ok(
            match ctx
                .platform
                .last_run_conclusion(slug, &ctx.config.branches.default)
            {
                Ok(None) => CheckResult::skip("No completed CI runs found"),
                Ok(Some(conclusion)) if conclusion == "success" => CheckResult::Pass,
                Ok(Some(conclusion)) => CheckResult::fail(format!("Last CI run: {}", conclusion)),
                Err(e) => degraded("platform", &e),
            },
        )
    }
}

#[cfg(test)]
#[path = "ci_tests.rs"]
mod tests;
