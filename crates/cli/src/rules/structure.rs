// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Repository structure rules: files every repository should carry.

use chrono::Datelike;

use super::{append, degraded};
use crate::error::{Error, Result};
use crate::repo::{DEPENDABOT_FILES, Document, Fact, GITIGNORE, README, Repo};
use crate::rule::{Category, CheckResult, Fix, Remedy, Rule, RuleContext};
use crate::templates;

/// Holder used when neither config nor git names one.
const FALLBACK_HOLDER: &str = "Author";

/// A license file exists.
pub struct LicenseExists;

impl LicenseExists {
    fn holder(repo: &Repo, ctx: &RuleContext<'_>) -> String {
        if let Some(holder) = &ctx.config.license.holder {
            return holder.clone();
        }
        match ctx.vcs.user_name(repo.root()) {
            Ok(Some(name)) if !name.trim().is_empty() => name.trim().to_string(),
            Ok(_) => FALLBACK_HOLDER.to_string(),
            Err(e) => {
                tracing::debug!("no git user name: {}", e);
                FALLBACK_HOLDER.to_string()
            }
        }
    }
}

impl Rule for LicenseExists {
    fn id(&self) -> &'static str {
        "LICENSE_EXISTS"
    }

    fn name(&self) -> &'static str {
        "License file exists"
    }

    fn category(&self) -> Category {
        Category::RepoStructure
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        Ok(match repo.license() {
            Some(_) => CheckResult::Pass,
            None => CheckResult::fail("No LICENSE file found"),
        })
    }

    fn remedy(&self) -> Remedy<'_> {
        Remedy::CheckAndFix(self)
    }
}

impl Fix for LicenseExists {
    fn plan(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<String> {
        Ok(format!(
            "create LICENSE (MIT, {}, {})",
            ctx.now.year(),
            Self::holder(repo, ctx)
        ))
    }

    fn apply(&self, repo: &mut Repo, ctx: &RuleContext<'_>) -> Result<String> {
        let year = ctx.now.year();
        let holder = Self::holder(repo, ctx);
        repo.write(
            "LICENSE",
            &templates::license(year, &holder),
            &[Fact::License],
        )?;
        Ok(format!("created LICENSE (MIT, {}, {})", year, holder))
    }
}

/// A logo exists at one of the standard locations.
pub struct LogoExists;

impl Rule for LogoExists {
    fn id(&self) -> &'static str {
        "LOGO_EXISTS"
    }

    fn name(&self) -> &'static str {
        "Logo exists"
    }

    fn category(&self) -> Category {
        Category::RepoStructure
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        Ok(match repo.logo() {
            Some(_) => CheckResult::Pass,
            None => CheckResult::fail("No logo found in standard locations"),
        })
    }
}

/// The ignore file mentions every required pattern.
pub struct Gitignore;

/// Required patterns the ignore file does not mention.
///
/// A pattern is satisfied when its trailing-slash-stripped form appears
/// anywhere in the file, ignoring case.
pub fn missing_patterns<'a>(text: &str, required: &'a [String]) -> Vec<&'a str> {
    let haystack = text.to_lowercase();
    required
        .iter()
        .map(String::as_str)
        .filter(|pattern| {
            let needle = pattern.trim_end_matches('/').to_lowercase();
            !haystack.contains(&needle)
        })
        .collect()
}

impl Rule for Gitignore {
    fn id(&self) -> &'static str {
        "GITIGNORE"
    }

    fn name(&self) -> &'static str {
        "Ignore file covers required patterns"
    }

    fn category(&self) -> Category {
        Category::RepoStructure
    }

    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult> {
        let Some(text) = repo.ignore_file()?.present() else {
            return Ok(CheckResult::fail("`.gitignore` not found"));
        };
        let missing = missing_patterns(text, &ctx.config.gitignore.required);
        Ok(if missing.is_empty() {
            CheckResult::Pass
        } else {
            CheckResult::fail(format!(
                "Missing {} patterns: {}",
                missing.len(),
                missing.join(" ")
            ))
        })
    }

    fn remedy(&self) -> Remedy<'_> {
        Remedy::CheckAndFix(self)
    }
}

impl Fix for Gitignore {
    fn plan(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<String> {
        let required = &ctx.config.gitignore.required;
        Ok(match repo.ignore_file()?.present() {
            Some(text) => format!(
                "append {} pattern(s) to .gitignore",
                missing_patterns(text, required).len()
            ),
            None => format!("create .gitignore with {} pattern(s)", required.len()),
        })
    }

    fn apply(&self, repo: &mut Repo, ctx: &RuleContext<'_>) -> Result<String> {
        let required = &ctx.config.gitignore.required;
        let header = templates::gitignore_header(&ctx.config.organization.shared_repo);
        let block = |patterns: &[&str]| {
            let mut block = header.clone();
            for pattern in patterns {
                block.push_str(pattern);
                block.push('\n');
            }
            block
        };

        let (contents, summary) = match repo.ignore_file()?.present() {
            Some(text) => {
                let missing = missing_patterns(text, required);
                let contents = append(text, &format!("\n{}", block(&missing)));
                (contents, format!("appended {} pattern(s)", missing.len()))
            }
            None => {
                let all: Vec<&str> = required.iter().map(String::as_str).collect();
                (
                    block(&all),
                    format!("created .gitignore with {} pattern(s)", all.len()),
                )
            }
        };
        repo.write(GITIGNORE, &contents, &[Fact::IgnoreFile])?;
        Ok(summary)
    }
}

/// A README exists.
pub struct ReadmeExists;

impl Rule for ReadmeExists {
    fn id(&self) -> &'static str {
        "README_EXISTS"
    }

    fn name(&self) -> &'static str {
        "README exists"
    }

    fn category(&self) -> Category {
        Category::RepoStructure
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        Ok(if repo.readme()?.is_absent() {
            CheckResult::fail(format!("{} not found", README))
        } else {
            CheckResult::Pass
        })
    }
}

/// No tracked file matches the ignore rules.
pub struct TrackedIgnored;

impl Rule for TrackedIgnored {
    fn id(&self) -> &'static str {
        "TRACKED_IGNORED"
    }

    fn name(&self) -> &'static str {
        "No tracked files match ignore rules"
    }

    fn category(&self) -> Category {
        Category::RepoStructure
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["GITIGNORE"]
    }

    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult> {
        if repo.ignore_file()?.is_absent() {
            return Ok(CheckResult::not_applicable());
        }
        Ok(match ctx.vcs.tracked_ignored(repo.root()) {
            Ok(files) if files.is_empty() => CheckResult::Pass,
            Ok(files) => {
                CheckResult::fail(format!("{} tracked file(s) match gitignore", files.len()))
            }
            Err(e) => degraded("git", &e),
        })
    }

    fn remedy(&self) -> Remedy<'_> {
        Remedy::CheckAndFix(self)
    }
}

impl Fix for TrackedIgnored {
    fn plan(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<String> {
        let files = ctx.vcs.tracked_ignored(repo.root())?;
        Ok(format!(
            "untrack {} file(s) (working tree untouched): {}",
            files.len(),
            files.join(", ")
        ))
    }

    fn apply(&self, repo: &mut Repo, ctx: &RuleContext<'_>) -> Result<String> {
        let files = ctx.vcs.tracked_ignored(repo.root())?;
        ctx.vcs.untrack(repo.root(), &files)?;
        Ok(format!("untracked {} file(s)", files.len()))
    }
}

/// A dependency-bot config exists and parses.
pub struct DependabotExists;

impl Rule for DependabotExists {
    fn id(&self) -> &'static str {
        "DEPENDABOT_EXISTS"
    }

    fn name(&self) -> &'static str {
        "Dependabot configured"
    }

    fn category(&self) -> Category {
        Category::Dependencies
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        Ok(match repo.dependabot()? {
            Document::Present(_) => CheckResult::Pass,
            Document::Malformed(message) => {
                CheckResult::fail(format!("Dependabot config is not valid YAML: {}", message))
            }
            Document::Absent => CheckResult::fail("No .github/dependabot.yml"),
        })
    }

    fn remedy(&self) -> Remedy<'_> {
        Remedy::CheckAndFix(self)
    }
}

impl DependabotExists {
    fn target(repo: &Repo) -> Result<&'static str> {
        if let Document::Malformed(_) = repo.dependabot()? {
            return Err(Error::Remediation(
                "refusing to overwrite malformed dependabot config".into(),
            ));
        }
        Ok(DEPENDABOT_FILES[0])
    }

    fn ecosystem_list(repo: &Repo) -> Result<String> {
        let names: Vec<_> = repo.ecosystems()?.iter().map(|e| e.as_str()).collect();
        Ok(if names.is_empty() {
            "github-actions".to_string()
        } else {
            names.join(", ")
        })
    }
}

impl Fix for DependabotExists {
    fn plan(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<String> {
        let target = Self::target(repo)?;
        Ok(format!("create {} ({})", target, Self::ecosystem_list(repo)?))
    }

    fn apply(&self, repo: &mut Repo, _ctx: &RuleContext<'_>) -> Result<String> {
        let target = Self::target(repo)?;
        let summary = format!("created {} ({})", target, Self::ecosystem_list(repo)?);
        let contents = templates::dependabot(repo.ecosystems()?);
        repo.write(target, &contents, &[Fact::Dependabot])?;
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "structure_tests.rs"]
mod tests;
