// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text output formatter.
//!
//! ```text
//! <repo>: FAIL (27 passed, 2 failed, 1 skipped)
//!   FAIL   <RULE_ID>  <reason>
//!          would fix: <plan>
//!   FIXED  <RULE_ID>  <summary>
//! ```
//!
//! Passing rules are silent. Passing repositories get a single line.

use std::io::Write;

use termcolor::{ColorSpec, WriteColor};

use super::FormatOptions;
use crate::color::scheme;
use crate::report::{RepoReport, Report, RuleRecord, Summary};
use crate::rule::{CheckResult, FixOutcome};

/// Width of the status label column.
const LABEL_WIDTH: usize = 6;

/// Text output formatter with color support.
pub struct TextFormatter<W: WriteColor> {
    out: W,
    options: FormatOptions,
}

impl<W: WriteColor> TextFormatter<W> {
    pub fn new(out: W, options: FormatOptions) -> Self {
        Self { out, options }
    }

    /// Consume the formatter, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn styled(&mut self, spec: &ColorSpec, text: &str) -> std::io::Result<()> {
        self.out.set_color(spec)?;
        write!(self.out, "{}", text)?;
        self.out.reset()
    }

    /// Section header for multi-phase runs.
    pub fn write_phase(&mut self, title: &str) -> std::io::Result<()> {
        self.styled(&scheme::repo_name(), &format!("== {} ==", title))?;
        writeln!(self.out)
    }

    /// Write every repository followed by the run summary.
    pub fn write_report(&mut self, report: &Report) -> std::io::Result<()> {
        for repo in &report.repos {
            self.write_repo(repo)?;
        }
        self.write_summary(report)
    }

    /// Write one repository: status line, then failing and fixed rules.
    pub fn write_repo(&mut self, repo: &RepoReport) -> std::io::Result<()> {
        self.styled(&scheme::repo_name(), &repo.name)?;
        write!(self.out, ": ")?;

        if let Some(error) = &repo.error {
            self.styled(&scheme::fail(), "ERROR")?;
            writeln!(self.out)?;
            writeln!(self.out, "  {}", error)?;
            return Ok(());
        }

        if repo.passed() {
            self.styled(&scheme::pass(), "PASS")?;
        } else {
            self.styled(&scheme::fail(), "FAIL")?;
        }
        writeln!(self.out, " ({})", counts(&repo.summary()))?;

        for record in &repo.records {
            self.write_record(record)?;
        }
        Ok(())
    }

    fn write_record(&mut self, record: &RuleRecord) -> std::io::Result<()> {
        match (&record.result, &record.fix) {
            (CheckResult::Fail { reason }, _) => {
                self.write_line(&scheme::fail(), "FAIL", record.rule, reason)?;
            }
            (_, Some(FixOutcome::Applied { summary })) => {
                self.write_line(&scheme::fixed(), "FIXED", record.rule, summary)?;
            }
            (CheckResult::Skip { reason }, _) if self.options.verbose => {
                let reason = reason.as_deref().unwrap_or("not applicable");
                self.write_line(&scheme::skip(), "SKIP", record.rule, reason)?;
            }
            _ => return Ok(()),
        }

        match &record.fix {
            Some(FixOutcome::AppliedButStillFailing { summary }) => {
                self.write_detail(&scheme::warn(), "fix applied, still failing", summary)
            }
            Some(FixOutcome::FixError { detail }) => {
                self.write_detail(&scheme::fail(), "fix failed", detail)
            }
            Some(FixOutcome::NotAttempted {
                planned: Some(plan),
            }) => self.write_detail(&scheme::skip(), "would fix", plan),
            _ => Ok(()),
        }
    }

    fn write_line(
        &mut self,
        spec: &ColorSpec,
        label: &str,
        rule: &str,
        text: &str,
    ) -> std::io::Result<()> {
        write!(self.out, "  ")?;
        self.styled(spec, &format!("{:<width$}", label, width = LABEL_WIDTH))?;
        write!(self.out, " ")?;
        self.styled(&scheme::rule_id(), rule)?;
        write!(self.out, "  ")?;
        self.styled(&scheme::reason(), text)?;
        writeln!(self.out)
    }

    fn write_detail(&mut self, spec: &ColorSpec, label: &str, text: &str) -> std::io::Result<()> {
        write!(self.out, "{:indent$}", "", indent = LABEL_WIDTH + 3)?;
        self.styled(spec, label)?;
        writeln!(self.out, ": {}", text)
    }

    /// Write the summary line.
    pub fn write_summary(&mut self, report: &Report) -> std::io::Result<()> {
        let total = report.repos.len();
        let failed = report.failed_repos();
        writeln!(
            self.out,
            "{} {} checked: {} passed, {} failed ({})",
            total,
            if total == 1 { "repository" } else { "repositories" },
            total - failed,
            failed,
            rule_counts(&report.summary())
        )
    }
}

fn counts(summary: &Summary) -> String {
    format!(
        "{} passed, {} failed, {} skipped",
        summary.passed, summary.failed, summary.skipped
    )
}

fn rule_counts(summary: &Summary) -> String {
    format!("rules: {}", counts(summary))
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
