// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rule engine with error recovery.
//!
//! Every (repository, rule) pair goes through check, an optional fix with a
//! single re-check, and lands in a terminal record. Errors and panics are
//! isolated so one rule never prevents the others from running.
//! Repositories may be processed in parallel; rules within one repository
//! always run sequentially in canonical order.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::repo::Repo;
use crate::report::{RepoReport, Report, RuleRecord};
use crate::rule::{CheckResult, Fix, FixOutcome, Remedy, Rule, RuleContext};

/// What the engine does with failing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Check only.
    Audit,
    /// Apply available fixes, then re-check.
    Fix,
    /// Describe the fixes that would be applied.
    DryRun,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Audit => "audit",
            Mode::Fix => "fix",
            Mode::DryRun => "dry-run",
        }
    }
}

/// Configuration for the rule runner.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    pub mode: Mode,
    /// Repositories processed concurrently. `1` runs sequentially.
    pub jobs: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Audit,
            jobs: 1,
        }
    }
}

/// Runs a fixed, ordered rule set over repositories.
pub struct RuleRunner {
    config: RunnerConfig,
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleRunner {
    /// `rules` must already be in canonical order.
    pub fn new(config: RunnerConfig, rules: Vec<Arc<dyn Rule>>) -> Self {
        Self { config, rules }
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Run every rule on every repository. Report order matches `repos`.
    pub fn run(&self, repos: &[PathBuf], ctx: &RuleContext<'_>) -> Report {
        let sequential = || -> Vec<RepoReport> {
            repos.iter().map(|p| self.run_repo(p, ctx)).collect()
        };

        let reports: Vec<RepoReport> = if self.config.jobs > 1 && repos.len() > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.jobs)
                .build()
            {
                Ok(pool) => {
                    pool.install(|| repos.par_iter().map(|p| self.run_repo(p, ctx)).collect())
                }
                Err(e) => {
                    tracing::warn!("could not start worker pool, running sequentially: {}", e);
                    sequential()
                }
            }
        } else {
            sequential()
        };

        Report { repos: reports }
    }

    /// Run every rule on one repository.
    pub fn run_repo(&self, path: &Path, ctx: &RuleContext<'_>) -> RepoReport {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut repo = match Repo::resolve(path) {
            Ok(repo) => repo,
            Err(e) => {
                tracing::warn!(repo = %name, "cannot open: {}", e);
                return RepoReport {
                    name,
                    path: path.to_path_buf(),
                    records: Vec::new(),
                    error: Some(e.to_string()),
                };
            }
        };

        tracing::debug!(repo = %name, mode = self.config.mode.as_str(), "processing");
        let records = self
            .rules
            .iter()
            .map(|rule| self.run_rule(rule.as_ref(), &mut repo, ctx))
            .collect();

        RepoReport {
            name,
            path: path.to_path_buf(),
            records,
            error: None,
        }
    }

    /// Drive one rule to its terminal state.
    pub fn run_rule(&self, rule: &dyn Rule, repo: &mut Repo, ctx: &RuleContext<'_>) -> RuleRecord {
        let result = evaluate(rule, repo, ctx);
        tracing::debug!(repo = %repo.name(), rule = rule.id(), status = ?result.status(), "checked");

        let (result, fix) = if result.is_fail() {
            match (self.config.mode, rule.remedy()) {
                (Mode::Fix, Remedy::CheckAndFix(fix)) => remediate(rule, fix, repo, ctx),
                (Mode::DryRun, Remedy::CheckAndFix(fix)) => {
                    let planned = match catch_unwind(AssertUnwindSafe(|| fix.plan(repo, ctx))) {
                        Ok(Ok(plan)) => plan,
                        Ok(Err(e)) => format!("could not plan: {}", e),
                        Err(payload) => format!("could not plan: {}", panic_message(&*payload)),
                    };
                    (
                        result,
                        Some(FixOutcome::NotAttempted {
                            planned: Some(planned),
                        }),
                    )
                }
                _ => (result, Some(FixOutcome::NotAttempted { planned: None })),
            }
        } else {
            (result, None)
        };

        RuleRecord {
            rule: rule.id(),
            category: rule.category(),
            result,
            fix,
        }
    }
}

/// Apply `fix`, then re-check exactly once.
fn remediate(
    rule: &dyn Rule,
    fix: &dyn Fix,
    repo: &mut Repo,
    ctx: &RuleContext<'_>,
) -> (CheckResult, Option<FixOutcome>) {
    let applied = catch_unwind(AssertUnwindSafe(|| fix.apply(repo, ctx)));
    let applied = match applied {
        Ok(Ok(summary)) => Ok(summary),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_message(&*payload)),
    };

    let summary = match applied {
        Ok(summary) => summary,
        Err(detail) => {
            tracing::warn!(repo = %repo.name(), rule = rule.id(), "fix failed: {}", detail);
            // A failed fix may have written partially.
            repo.invalidate_all();
            let result = evaluate(rule, repo, ctx);
            return (result, Some(FixOutcome::FixError { detail }));
        }
    };

    let result = evaluate(rule, repo, ctx);
    tracing::debug!(repo = %repo.name(), rule = rule.id(), status = ?result.status(), "re-checked");
    let outcome = if result.is_fail() {
        FixOutcome::AppliedButStillFailing { summary }
    } else {
        FixOutcome::Applied { summary }
    };
    (result, Some(outcome))
}

/// Run a check, turning errors and panics into a failure.
fn evaluate(rule: &dyn Rule, repo: &Repo, ctx: &RuleContext<'_>) -> CheckResult {
    match catch_unwind(AssertUnwindSafe(|| rule.check(repo, ctx))) {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => CheckResult::fail(format!("could not evaluate: {}", e)),
        Err(payload) => {
            CheckResult::fail(format!("could not evaluate: {}", panic_message(&*payload)))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
