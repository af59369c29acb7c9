// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rules command implementation.

use std::io::Write;

use serde::Serialize;
use termcolor::{StandardStream, WriteColor};

use fleetguard::cli::{Cli, RulesArgs};
use fleetguard::color::{resolve_color, scheme};
use fleetguard::error::ExitCode;
use fleetguard::registry::Registry;
use fleetguard::rule::{Category, Remedy, Rule};

#[derive(Serialize)]
struct RuleEntry {
    id: &'static str,
    name: &'static str,
    category: Category,
    fixable: bool,
    depends_on: &'static [&'static str],
}

impl From<&dyn Rule> for RuleEntry {
    fn from(rule: &dyn Rule) -> Self {
        Self {
            id: rule.id(),
            name: rule.name(),
            category: rule.category(),
            fixable: matches!(rule.remedy(), Remedy::CheckAndFix(_)),
            depends_on: rule.depends_on(),
        }
    }
}

/// Run the rules command.
pub fn run(cli: &Cli, args: &RulesArgs) -> anyhow::Result<ExitCode> {
    let registry = Registry::builtin()?;
    let entries: Vec<RuleEntry> = registry
        .rules()
        .iter()
        .map(|rule| RuleEntry::from(rule.as_ref()))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(ExitCode::Success);
    }

    let mut out = StandardStream::stdout(resolve_color(cli.color_mode()));
    write_table(&mut out, &entries)?;
    Ok(ExitCode::Success)
}

fn write_table(out: &mut impl WriteColor, entries: &[RuleEntry]) -> std::io::Result<()> {
    let id_width = entries.iter().map(|e| e.id.len()).max().unwrap_or(0);
    let category_width = entries
        .iter()
        .map(|e| e.category.as_str().len())
        .max()
        .unwrap_or(0);

    for entry in entries {
        out.set_color(&scheme::rule_id())?;
        write!(out, "{:<width$}", entry.id, width = id_width)?;
        out.reset()?;
        write!(
            out,
            "  {:<width$}  {:<3}  {}",
            entry.category.as_str(),
            if entry.fixable { "fix" } else { "" },
            entry.name,
            width = category_width
        )?;
        if !entry.depends_on.is_empty() {
            write!(out, " (after {})", entry.depends_on.join(", "))?;
        }
        writeln!(out)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "{} rules, {} with automated fixes",
        entries.len(),
        entries.iter().filter(|e| e.fixable).count()
    )
}
