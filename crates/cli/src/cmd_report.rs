// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Report command implementation.
//!
//! Reports are read-only summaries across the fleet and bypass the rule
//! engine entirely.

use std::io::Write;
use std::path::{Path, PathBuf};

use termcolor::{StandardStream, WriteColor};

use fleetguard::cli::{Cli, ReportArgs, ReportKind};
use fleetguard::color::{resolve_color, scheme};
use fleetguard::discovery;
use fleetguard::error::ExitCode;
use fleetguard::git::{Git, VersionControl};
use fleetguard::repo::README;
use fleetguard::tagline;

const NO_README: &str = "(no README)";
const NO_TAGLINE: &str = "(no tagline)";

/// Run the report command.
pub fn run(cli: &Cli, args: &ReportArgs) -> anyhow::Result<ExitCode> {
    let repos_dir = args.target.repos_dir()?;
    let repos = discovery::discover_repos(repos_dir, args.target.filter.as_deref())?;
    if repos.is_empty() {
        eprintln!("No git repositories found.");
        return Ok(ExitCode::Success);
    }

    let mut out = StandardStream::stdout(resolve_color(cli.color_mode()));
    match args.kind {
        ReportKind::Taglines => taglines(&mut out, &repos),
        ReportKind::TrackedIgnored => tracked_ignored(&mut out, &Git, repos_dir, &repos),
    }
}

fn name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn taglines(out: &mut impl WriteColor, repos: &[PathBuf]) -> anyhow::Result<ExitCode> {
    let rows: Vec<(String, Option<String>, &str)> = repos
        .iter()
        .map(|path| {
            let readme = path.join(README);
            match std::fs::read_to_string(&readme) {
                Ok(text) => (name(path), tagline::extract(&text), NO_TAGLINE),
                Err(e) => {
                    tracing::debug!("{}: {}", readme.display(), e);
                    (name(path), None, NO_README)
                }
            }
        })
        .collect();

    let width = rows.iter().map(|(n, _, _)| n.len()).max().unwrap_or(0).max(4);

    out.set_color(&scheme::repo_name())?;
    write!(out, "{:<width$}", "Repo", width = width)?;
    out.reset()?;
    writeln!(out, "   Tagline")?;
    writeln!(out, "{}", "\u{2500}".repeat(width + 3 + 60))?;

    let mut with = 0;
    for (repo, tagline, missing) in &rows {
        match tagline {
            Some(tagline) => {
                with += 1;
                out.set_color(&scheme::pass())?;
                write!(out, "{:<width$}", repo, width = width)?;
                out.reset()?;
                writeln!(out, "   {}", tagline)?;
            }
            None => {
                write!(out, "{:<width$}   ", repo, width = width)?;
                out.set_color(&scheme::skip())?;
                write!(out, "{}", missing)?;
                out.reset()?;
                writeln!(out)?;
            }
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Summary: {} with tagline, {} without",
        with,
        rows.len() - with
    )?;
    Ok(ExitCode::Success)
}

fn tracked_ignored(
    out: &mut impl WriteColor,
    vcs: &dyn VersionControl,
    repos_dir: &Path,
    repos: &[PathBuf],
) -> anyhow::Result<ExitCode> {
    writeln!(
        out,
        "Checking for tracked files that should be ignored in: {}",
        repos_dir.display()
    )?;
    writeln!(out)?;

    let mut clean = 0;
    let mut warnings = 0;
    for path in repos {
        let repo = name(path);
        match vcs.tracked_ignored(path) {
            Ok(files) if files.is_empty() => {
                clean += 1;
                out.set_color(&scheme::pass())?;
                write!(out, "{}", repo)?;
                out.reset()?;
                writeln!(out, " (clean)")?;
            }
            Ok(files) => {
                warnings += 1;
                out.set_color(&scheme::warn())?;
                write!(out, "{}", repo)?;
                out.reset()?;
                writeln!(out, ": {} tracked file(s) should be ignored", files.len())?;
                for file in &files {
                    writeln!(out, "    {}", file)?;
                }
            }
            Err(e) => {
                warnings += 1;
                out.set_color(&scheme::fail())?;
                write!(out, "{}", repo)?;
                out.reset()?;
                writeln!(out, ": {}", e)?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "Summary:")?;
    writeln!(out, "  Clean:    {}", clean)?;
    writeln!(out, "  Warnings: {}", warnings)?;

    if warnings > 0 {
        writeln!(out)?;
        writeln!(out, "Run `fleetguard fix --rule TRACKED_IGNORED` to untrack them.")?;
        return Ok(ExitCode::CheckFailed);
    }
    Ok(ExitCode::Success)
}
