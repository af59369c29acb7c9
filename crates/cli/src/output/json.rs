// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSON output formatter.
//!
//! JSON is buffered and written at the end (not streamed). Field names are
//! stable; rule records flatten their check result (`status`, `reason`) and
//! carry an optional `fix` object tagged by `outcome`.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::report::{RepoReport, Report, RuleRecord, Summary};

/// Counts over a whole run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub repositories: usize,
    pub failed_repositories: usize,
    #[serde(flatten)]
    pub rules: Summary,
}

impl From<&Report> for RunSummary {
    fn from(report: &Report) -> Self {
        Self {
            repositories: report.repos.len(),
            failed_repositories: report.failed_repos(),
            rules: report.summary(),
        }
    }
}

/// One repository in JSON output.
#[derive(Debug, Serialize)]
pub struct RepoOutput<'a> {
    pub name: &'a str,
    pub path: &'a Path,
    pub passed: bool,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    pub rules: &'a [RuleRecord],
}

impl<'a> From<&'a RepoReport> for RepoOutput<'a> {
    fn from(repo: &'a RepoReport) -> Self {
        Self {
            name: &repo.name,
            path: &repo.path,
            passed: repo.passed(),
            summary: repo.summary(),
            error: repo.error.as_deref(),
            rules: &repo.records,
        }
    }
}

/// Single-pass run document.
#[derive(Debug, Serialize)]
struct RunOutput<'a> {
    timestamp: String,
    mode: &'a str,
    repos_dir: &'a Path,
    passed: bool,
    summary: RunSummary,
    repositories: Vec<RepoOutput<'a>>,
}

/// One phase of a maintain run.
#[derive(Debug, Serialize)]
struct PhaseOutput<'a> {
    phase: &'a str,
    passed: bool,
    summary: RunSummary,
    repositories: Vec<RepoOutput<'a>>,
}

/// Maintain run document. `passed` reflects the final phase.
#[derive(Debug, Serialize)]
struct MaintainOutput<'a> {
    timestamp: String,
    mode: &'static str,
    repos_dir: &'a Path,
    passed: bool,
    phases: Vec<PhaseOutput<'a>>,
}

fn repositories(report: &Report) -> Vec<RepoOutput<'_>> {
    report.repos.iter().map(RepoOutput::from).collect()
}

/// RFC 3339 timestamp with second precision, e.g. `2026-03-01T12:00:00Z`.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// JSON output formatter.
pub struct JsonFormatter<W: Write> {
    writer: W,
    now: DateTime<Utc>,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a formatter stamping documents with `now`.
    pub fn new(writer: W, now: DateTime<Utc>) -> Self {
        Self { writer, now }
    }

    /// Write a single-pass run (`audit`, `fix`, `dry-run`).
    pub fn write(&mut self, mode: &str, repos_dir: &Path, report: &Report) -> std::io::Result<()> {
        let output = RunOutput {
            timestamp: timestamp(self.now),
            mode,
            repos_dir,
            passed: report.passed(),
            summary: RunSummary::from(report),
            repositories: repositories(report),
        };
        self.emit(&output)
    }

    /// Write a maintain run: each `(phase, report)` in order.
    pub fn write_phases(
        &mut self,
        repos_dir: &Path,
        phases: &[(&str, &Report)],
    ) -> std::io::Result<()> {
        let output = MaintainOutput {
            timestamp: timestamp(self.now),
            mode: "maintain",
            repos_dir,
            passed: phases.last().is_none_or(|(_, report)| report.passed()),
            phases: phases
                .iter()
                .map(|(phase, report)| PhaseOutput {
                    phase,
                    passed: report.passed(),
                    summary: RunSummary::from(*report),
                    repositories: repositories(report),
                })
                .collect(),
        };
        self.emit(&output)
    }

    fn emit(&mut self, output: &impl Serialize) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(output).map_err(std::io::Error::other)?;
        writeln!(self.writer, "{}", json)
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
