// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod cli;
pub mod color;
pub mod config;
pub mod discovery;
pub mod error;
pub mod git;
pub mod output;
pub mod platform;
pub mod registry;
pub mod repo;
pub mod report;
pub mod rule;
pub mod rules;
pub mod runner;
pub mod settings;
pub mod tagline;
pub mod templates;

pub use cli::{Cli, Command};
pub use color::ColorMode;
pub use config::Config;
pub use error::{Error, ExitCode, Result};
pub use registry::{Registry, Selection};
pub use report::{Report, RepoReport, RuleRecord};
pub use rule::{Category, CheckResult, Fix, FixOutcome, Remedy, Rule, RuleContext};
pub use runner::{Mode, RuleRunner, RunnerConfig};

#[cfg(test)]
pub mod test_utils;
