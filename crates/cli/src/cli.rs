// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing with clap derive.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::color::ColorMode;
use crate::error::{Error, Result};
use crate::registry::Selection;
use crate::rule::Category;

/// Environment variable naming the default fleet directory.
pub const REPOS_DIR_ENV: &str = "FLEETGUARD_REPOS_DIR";

/// Audit and remediate a fleet of git repositories against shared conventions
#[derive(Parser)]
#[command(name = "fleetguard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use specific config file
    #[arg(short = 'C', long = "config", global = true, env = "FLEETGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repositories processed in parallel
    #[arg(
        long,
        global = true,
        default_value_t = 1,
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub jobs: u32,

    /// Force color output
    #[arg(long, global = true)]
    pub color: bool,

    /// Disable color output
    #[arg(long, global = true, conflicts_with = "color")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn color_mode(&self) -> ColorMode {
        ColorMode::from_flags(self.color, self.no_color)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Check every repository without changing anything
    Audit(AuditArgs),
    /// Apply available fixes to failing rules
    Fix(FixArgs),
    /// Audit, fix, then audit again
    Maintain(FixArgs),
    /// Read-only fleet reports
    Report(ReportArgs),
    /// List the rule catalogue in execution order
    Rules(RulesArgs),
}

/// Which repositories to process.
#[derive(clap::Args, Default)]
pub struct TargetArgs {
    /// Directory containing git repositories
    #[arg(value_name = "DIR", env = REPOS_DIR_ENV)]
    pub repos_dir: Option<PathBuf>,

    /// Only process repositories whose name contains this text
    #[arg(short, long, value_name = "TEXT")]
    pub filter: Option<String>,
}

impl TargetArgs {
    /// The fleet directory, required from DIR or the environment.
    pub fn repos_dir(&self) -> Result<&Path> {
        self.repos_dir.as_deref().ok_or_else(|| {
            Error::Argument(format!(
                "no repository directory given (pass DIR or set {})",
                REPOS_DIR_ENV
            ))
        })
    }
}

/// Which rules to run.
#[derive(clap::Args, Default)]
pub struct SelectArgs {
    /// Run only this rule (repeatable)
    #[arg(long = "rule", value_name = "ID")]
    pub rules: Vec<String>,

    /// Run only rules in this category (repeatable)
    #[arg(long = "category", value_name = "NAME")]
    pub categories: Vec<String>,
}

impl SelectArgs {
    /// Combine with ids disabled by configuration.
    pub fn selection(&self, disabled: &[String]) -> Result<Selection> {
        let categories = self
            .categories
            .iter()
            .map(|c| c.parse::<Category>())
            .collect::<Result<Vec<_>>>()?;
        Ok(Selection {
            rules: self.rules.clone(),
            categories,
            disabled: disabled.to_vec(),
        })
    }
}

#[derive(clap::Args, Default)]
pub struct AuditArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub select: SelectArgs,

    /// Write a JSON report to stdout
    #[arg(short, long)]
    pub json: bool,

    /// Also list skipped rules
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(clap::Args, Default)]
pub struct FixArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub select: SelectArgs,

    /// Show what would be fixed without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Write a JSON report to stdout
    #[arg(short, long)]
    pub json: bool,

    /// Also list skipped rules
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(clap::Args)]
pub struct ReportArgs {
    /// Report to generate
    #[arg(value_enum)]
    pub kind: ReportKind,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKind {
    /// README tagline per repository
    Taglines,
    /// Tracked files that ignore rules say should be untracked
    TrackedIgnored,
}

#[derive(clap::Args, Default)]
pub struct RulesArgs {
    /// Write the catalogue as JSON
    #[arg(short, long)]
    pub json: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
