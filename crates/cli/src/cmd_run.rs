// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Audit, fix, and maintain command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use termcolor::StandardStream;

use fleetguard::cli::{AuditArgs, Cli, FixArgs, SelectArgs, TargetArgs};
use fleetguard::color::resolve_color;
use fleetguard::config::Config;
use fleetguard::discovery;
use fleetguard::error::ExitCode;
use fleetguard::git::Git;
use fleetguard::output::FormatOptions;
use fleetguard::output::json::JsonFormatter;
use fleetguard::output::text::TextFormatter;
use fleetguard::platform::GhCli;
use fleetguard::registry::Registry;
use fleetguard::report::Report;
use fleetguard::rule::{Rule, RuleContext};
use fleetguard::runner::{Mode, RuleRunner, RunnerConfig};

/// Everything resolved before the first repository is touched.
struct Fleet {
    repos_dir: PathBuf,
    config: Config,
    rules: Vec<Arc<dyn Rule>>,
    repos: Vec<PathBuf>,
    platform: GhCli,
    now: DateTime<Utc>,
}

impl Fleet {
    /// Load config, select rules, and discover repositories. Every argument
    /// and config error surfaces here.
    fn prepare(cli: &Cli, target: &TargetArgs, select: &SelectArgs) -> anyhow::Result<Self> {
        let repos_dir = target.repos_dir()?.to_path_buf();
        let config = discovery::load_config(cli.config.as_deref(), &repos_dir)?;

        let registry = Registry::builtin()?;
        let rules = registry.select(&select.selection(&config.rules.disabled)?)?;
        tracing::debug!(rules = rules.len(), "selected rules");

        let repos = discovery::discover_repos(&repos_dir, target.filter.as_deref())?;
        let platform = GhCli::new(config.platform_timeout());
        let repos = discovery::skip_archived(repos, &config, &Git, &platform);

        Ok(Self {
            repos_dir,
            config,
            rules,
            repos,
            platform,
            now: Utc::now(),
        })
    }

    fn ctx(&self) -> RuleContext<'_> {
        RuleContext {
            vcs: &Git,
            platform: &self.platform,
            config: &self.config,
            now: self.now,
        }
    }

    fn run(&self, cli: &Cli, mode: Mode) -> Report {
        tracing::debug!(mode = mode.as_str(), repos = self.repos.len(), "running");
        let runner = RuleRunner::new(
            RunnerConfig {
                mode,
                jobs: cli.jobs as usize,
            },
            self.rules.clone(),
        );
        runner.run(&self.repos, &self.ctx())
    }
}

fn exit_code(report: &Report) -> ExitCode {
    if report.passed() {
        ExitCode::Success
    } else {
        ExitCode::CheckFailed
    }
}

fn no_repositories(repos_dir: &Path) {
    tracing::debug!("no repositories under {}", repos_dir.display());
    eprintln!("No git repositories found.");
}

fn write_single(
    cli: &Cli,
    fleet: &Fleet,
    mode: Mode,
    report: &Report,
    json: bool,
    options: FormatOptions,
) -> anyhow::Result<()> {
    if json {
        JsonFormatter::new(std::io::stdout(), fleet.now).write(
            mode.as_str(),
            &fleet.repos_dir,
            report,
        )?;
    } else {
        let stdout = StandardStream::stdout(resolve_color(cli.color_mode()));
        TextFormatter::new(stdout, options).write_report(report)?;
    }
    Ok(())
}

fn options(verbose: bool) -> FormatOptions {
    FormatOptions { verbose }
}

/// Run the audit command.
pub fn audit(cli: &Cli, args: &AuditArgs) -> anyhow::Result<ExitCode> {
    let fleet = Fleet::prepare(cli, &args.target, &args.select)?;
    if fleet.repos.is_empty() && !args.json {
        no_repositories(&fleet.repos_dir);
        return Ok(ExitCode::Success);
    }

    let report = fleet.run(cli, Mode::Audit);
    write_single(cli, &fleet, Mode::Audit, &report, args.json, options(args.verbose))?;
    Ok(exit_code(&report))
}

/// Run the fix command.
pub fn fix(cli: &Cli, args: &FixArgs) -> anyhow::Result<ExitCode> {
    let fleet = Fleet::prepare(cli, &args.target, &args.select)?;
    if fleet.repos.is_empty() && !args.json {
        no_repositories(&fleet.repos_dir);
        return Ok(ExitCode::Success);
    }

    let mode = if args.dry_run { Mode::DryRun } else { Mode::Fix };
    let report = fleet.run(cli, mode);
    write_single(cli, &fleet, mode, &report, args.json, options(args.verbose))?;
    Ok(exit_code(&report))
}

/// Run the maintain command: audit, fix, then a final audit that decides the
/// exit code.
pub fn maintain(cli: &Cli, args: &FixArgs) -> anyhow::Result<ExitCode> {
    let fleet = Fleet::prepare(cli, &args.target, &args.select)?;
    if fleet.repos.is_empty() && !args.json {
        no_repositories(&fleet.repos_dir);
        return Ok(ExitCode::Success);
    }

    let fix_mode = if args.dry_run { Mode::DryRun } else { Mode::Fix };
    let initial = fleet.run(cli, Mode::Audit);
    let fixed = fleet.run(cli, fix_mode);
    let last = fleet.run(cli, Mode::Audit);

    if args.json {
        JsonFormatter::new(std::io::stdout(), fleet.now).write_phases(
            &fleet.repos_dir,
            &[
                (Mode::Audit.as_str(), &initial),
                (fix_mode.as_str(), &fixed),
                ("final", &last),
            ],
        )?;
    } else {
        let stdout = StandardStream::stdout(resolve_color(cli.color_mode()));
        let mut formatter = TextFormatter::new(stdout, options(args.verbose));
        for (title, report) in [
            ("Audit", &initial),
            (if args.dry_run { "Dry run" } else { "Fix" }, &fixed),
            ("Final audit", &last),
        ] {
            formatter.write_phase(title)?;
            formatter.write_report(report)?;
        }
    }

    Ok(exit_code(&last))
}
