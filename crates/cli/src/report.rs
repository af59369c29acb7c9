// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run results.
//!
//! Records are ordered as the engine produced them. Rollups are always
//! computed from the records, never stored.

use std::path::PathBuf;

use serde::Serialize;

use crate::rule::{Category, CheckResult, FixOutcome, Status};

/// Terminal state of one rule on one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleRecord {
    pub rule: &'static str,
    pub category: Category,
    #[serde(flatten)]
    pub result: CheckResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixOutcome>,
}

/// Results for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoReport {
    pub name: String,
    pub path: PathBuf,
    pub records: Vec<RuleRecord>,
    /// Set when the repository could not be opened at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RepoReport {
    pub fn summary(&self) -> Summary {
        Summary::of(self.records.iter())
    }

    /// No terminal failure and the repository was opened.
    pub fn passed(&self) -> bool {
        self.error.is_none() && !self.records.iter().any(|r| r.result.is_fail())
    }

    pub fn failures(&self) -> impl Iterator<Item = &RuleRecord> {
        self.records.iter().filter(|r| r.result.is_fail())
    }
}

/// Pass/fail/skip counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    fn of<'a>(records: impl Iterator<Item = &'a RuleRecord>) -> Self {
        let mut summary = Summary::default();
        for record in records {
            match record.result.status() {
                Status::Pass => summary.passed += 1,
                Status::Fail => summary.failed += 1,
                Status::Skip => summary.skipped += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

/// Results for every repository, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub repos: Vec<RepoReport>,
}

impl Report {
    pub fn summary(&self) -> Summary {
        Summary::of(self.repos.iter().flat_map(|r| r.records.iter()))
    }

    /// True when every repository passed.
    pub fn passed(&self) -> bool {
        self.repos.iter().all(RepoReport::passed)
    }

    pub fn failed_repos(&self) -> usize {
        self.repos.iter().filter(|r| !r.passed()).count()
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
