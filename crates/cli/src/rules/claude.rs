// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Agent configuration rules.
//!
//! Permission rules read `.claude/settings.local.json` and compare it with
//! the user-wide settings document named by `[settings] global`.

use std::collections::BTreeSet;
use std::fs;

use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::repo::{CLAUDE_MD, Document, Fact, LOCAL_SETTINGS, Repo, SHARED_SETTINGS};
use crate::rule::{Category, CheckResult, Fix, Remedy, Rule, RuleContext};
use crate::settings;
use crate::templates;

/// An agent instructions file exists.
pub struct ClaudeMdExists;

impl Rule for ClaudeMdExists {
    fn id(&self) -> &'static str {
        "CLAUDE_MD_EXISTS"
    }

    fn name(&self) -> &'static str {
        "CLAUDE.md exists"
    }

    fn category(&self) -> Category {
        Category::Claude
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        Ok(if repo.is_file(CLAUDE_MD) {
            CheckResult::Pass
        } else {
            CheckResult::fail("CLAUDE.md not found")
        })
    }

    fn remedy(&self) -> Remedy<'_> {
        Remedy::CheckAndFix(self)
    }
}

impl Fix for ClaudeMdExists {
    fn plan(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<String> {
        Ok(format!("create {} for {}", CLAUDE_MD, repo.name()))
    }

    fn apply(&self, repo: &mut Repo, _ctx: &RuleContext<'_>) -> Result<String> {
        let contents = templates::claude_md(repo.name());
        repo.write(CLAUDE_MD, &contents, &[])?;
        Ok(format!("created {}", CLAUDE_MD))
    }
}

/// Sandboxing is enabled in either settings document.
pub struct ClaudeSandbox;

impl Rule for ClaudeSandbox {
    fn id(&self) -> &'static str {
        "CLAUDE_SANDBOX"
    }

    fn name(&self) -> &'static str {
        "Sandbox enabled"
    }

    fn category(&self) -> Category {
        Category::Claude
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        let documents = [
            (SHARED_SETTINGS, repo.shared_settings()?),
            (LOCAL_SETTINGS, repo.local_settings()?),
        ];
        if documents
            .iter()
            .any(|(_, doc)| doc.present().is_some_and(settings::sandbox_enabled))
        {
            return Ok(CheckResult::Pass);
        }
        for (path, doc) in &documents {
            if let Document::Malformed(message) = doc {
                return Ok(CheckResult::fail(format!(
                    "{} is not valid JSON: {}",
                    path, message
                )));
            }
        }
        Ok(CheckResult::fail("Sandbox not enabled"))
    }

    fn remedy(&self) -> Remedy<'_> {
        Remedy::CheckAndFix(self)
    }
}

impl ClaudeSandbox {
    fn enabled_document(repo: &Repo) -> Result<Value> {
        match repo.shared_settings()? {
            Document::Absent => Ok(json!({"sandbox": {"enabled": true}})),
            Document::Present(doc) => settings::enable_sandbox(doc),
            Document::Malformed(message) => Err(Error::Remediation(format!(
                "{} is not valid JSON: {}",
                SHARED_SETTINGS, message
            ))),
        }
    }
}

impl Fix for ClaudeSandbox {
    fn plan(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<String> {
        Self::enabled_document(repo)?;
        Ok(format!("set sandbox.enabled = true in {}", SHARED_SETTINGS))
    }

    fn apply(&self, repo: &mut Repo, _ctx: &RuleContext<'_>) -> Result<String> {
        let doc = Self::enabled_document(repo)?;
        repo.write(SHARED_SETTINGS, &settings::render(&doc)?, &[Fact::SharedSettings])?;
        Ok(format!("enabled sandbox in {}", SHARED_SETTINGS))
    }
}

/// Local permissions document, or the result to report when there is
/// nothing to analyze.
fn local_permissions(repo: &Repo) -> Result<std::result::Result<&Value, CheckResult>> {
    let doc = match repo.local_settings()? {
        Document::Absent => return Ok(Err(CheckResult::not_applicable())),
        Document::Malformed(message) => {
            return Ok(Err(CheckResult::fail(format!(
                "{} is not valid JSON: {}",
                LOCAL_SETTINGS, message
            ))));
        }
        Document::Present(doc) => doc,
    };
    if settings::allowed(doc).is_empty() {
        return Ok(Err(CheckResult::skip("no permissions")));
    }
    Ok(Ok(doc))
}

/// The user-wide allow-list, or why it cannot be evaluated.
fn global_permissions(ctx: &RuleContext<'_>) -> Result<std::result::Result<BTreeSet<String>, String>> {
    let Some(path) = ctx.config.global_settings_path() else {
        return Ok(Ok(BTreeSet::new()));
    };
    Ok(match settings::load_global(&path)? {
        Document::Absent => Ok(BTreeSet::new()),
        Document::Present(allow) => Ok(allow),
        Document::Malformed(message) => Err(format!(
            "global settings {} is not valid JSON: {}",
            path.display(),
            message
        )),
    })
}

/// No project permission grants unrestricted access.
pub struct SettingsDangerous;

impl Rule for SettingsDangerous {
    fn id(&self) -> &'static str {
        "SETTINGS_DANGEROUS"
    }

    fn name(&self) -> &'static str {
        "No dangerous permissions"
    }

    fn category(&self) -> Category {
        Category::Claude
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        let doc = match local_permissions(repo)? {
            Ok(doc) => doc,
            Err(result) => return Ok(result),
        };
        let project = settings::allowed(doc);
        let dangerous = settings::dangerous(&project);
        Ok(if dangerous.is_empty() {
            CheckResult::Pass
        } else {
            CheckResult::fail(format!(
                "Dangerous permission patterns detected: {}",
                dangerous.join(", ")
            ))
        })
    }
}

/// Project permissions add nothing the global settings already grant.
pub struct SettingsClean;

impl SettingsClean {
    fn optimization(repo: &Repo, ctx: &RuleContext<'_>) -> Result<Option<(Value, settings::Optimization)>> {
        let Ok(doc) = local_permissions(repo)? else {
            return Ok(None);
        };
        let global = global_permissions(ctx)?.map_err(Error::Remediation)?;
        Ok(Some((doc.clone(), settings::analyze(doc, &global))))
    }
}

impl Rule for SettingsClean {
    fn id(&self) -> &'static str {
        "SETTINGS_CLEAN"
    }

    fn name(&self) -> &'static str {
        "No redundant permissions"
    }

    fn category(&self) -> Category {
        Category::Claude
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["SETTINGS_DANGEROUS"]
    }

    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult> {
        let doc = match local_permissions(repo)? {
            Ok(doc) => doc,
            Err(result) => return Ok(result),
        };
        let global = match global_permissions(ctx)? {
            Ok(global) => global,
            Err(reason) => return Ok(CheckResult::fail(reason)),
        };
        let optimization = settings::analyze(doc, &global);
        Ok(if optimization.is_clean() {
            CheckResult::Pass
        } else {
            CheckResult::fail(format!(
                "Redundant permissions or unmigrated WebFetch domains: {}",
                optimization.describe()
            ))
        })
    }

    fn remedy(&self) -> Remedy<'_> {
        Remedy::CheckAndFix(self)
    }
}

impl Fix for SettingsClean {
    fn plan(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<String> {
        Ok(match Self::optimization(repo, ctx)? {
            Some((_, optimization)) => format!(
                "{} (backup to {}.bak)",
                optimization.describe(),
                LOCAL_SETTINGS
            ),
            None => "nothing to optimize".to_string(),
        })
    }

    fn apply(&self, repo: &mut Repo, ctx: &RuleContext<'_>) -> Result<String> {
        let Some((doc, optimization)) = Self::optimization(repo, ctx)? else {
            return Err(Error::Remediation(format!(
                "{} has no permissions to optimize",
                LOCAL_SETTINGS
            )));
        };
        let cleaned = settings::apply(&doc, &optimization)?;

        let path = repo.join(LOCAL_SETTINGS);
        let backup = repo.join(&format!("{}.bak", LOCAL_SETTINGS));
        fs::copy(&path, &backup).map_err(|e| Error::io(&backup, e))?;
        repo.write(LOCAL_SETTINGS, &settings::render(&cleaned)?, &[Fact::LocalSettings])?;
        Ok(optimization.describe())
    }
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
