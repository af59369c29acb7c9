// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! README content rules.
//!
//! Every rule here needs a README and skips without one; README_EXISTS
//! reports the absence.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use aho_corasick::AhoCorasick;
use regex::Regex;

use super::ci::has_ci_workflow;
use super::{append, degraded, remote_slug};
use crate::error::{Error, Result};
use crate::repo::{Fact, README, Repo};
use crate::rule::{Category, CheckResult, Fix, Remedy, Rule, RuleContext};
use crate::tagline;
use crate::templates;

/// Text left behind by unfinished documentation.
const PLACEHOLDERS: &[&str] = &[
    "TODO",
    "FIXME",
    "Coming soon",
    "Work in progress",
    "Under construction",
    "[Insert",
    "Lorem ipsum",
];

/// READMEs shorter than this (in characters) are flagged.
const MIN_README_CHARS: usize = 100;

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(PLACEHOLDERS)
        .expect("valid patterns")
});

#[allow(clippy::expect_used)]
static INSTALL_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)install|setup|getting started").expect("valid regex"));

#[allow(clippy::expect_used)]
static USAGE_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)usage|example|how to").expect("valid regex"));

#[allow(clippy::expect_used)]
static LICENSE_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)## license|# license|mit license|\[mit\]").expect("valid regex")
});

#[allow(clippy::expect_used)]
static LOGO_MARKDOWN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)!\[.*\]\(\.?/?((assets|images|\.github)/)?logo\.").expect("valid regex")
});

#[allow(clippy::expect_used)]
static LOGO_HTML: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<img[^>]+src=.\.?/?((assets|images|\.github)/)?logo\.").expect("valid regex")
});

#[allow(clippy::expect_used)]
static CI_BADGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"actions/workflows/.*badge|shields\.io.*workflow|!\[.*\]\(.*actions/workflows")
        .expect("valid regex")
});

fn no_readme() -> CheckResult {
    CheckResult::skip(format!("no {}", README))
}

/// README content looks finished.
pub struct ReadmeCurrent;

/// Problems with README content, in reporting order.
pub fn staleness(text: &str) -> Vec<String> {
    let found: BTreeSet<usize> = PLACEHOLDER
        .find_overlapping_iter(text)
        .map(|m| m.pattern().as_usize())
        .collect();
    let mut issues: Vec<String> = found
        .into_iter()
        .map(|i| format!("Contains placeholder: '{}'", PLACEHOLDERS[i]))
        .collect();

    if text.chars().count() < MIN_README_CHARS {
        issues.push(format!(
            "README is very short (<{} chars)",
            MIN_README_CHARS
        ));
    }
    if !INSTALL_SECTION.is_match(text) && !USAGE_SECTION.is_match(text) {
        issues.push("Missing installation/usage sections".to_string());
    }
    issues
}

impl Rule for ReadmeCurrent {
    fn id(&self) -> &'static str {
        "README_CURRENT"
    }

    fn name(&self) -> &'static str {
        "README is current"
    }

    fn category(&self) -> Category {
        Category::RepoStructure
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["README_EXISTS"]
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        let Some(text) = repo.readme()?.present() else {
            return Ok(no_readme());
        };
        let issues = staleness(text);
        Ok(if issues.is_empty() {
            CheckResult::Pass
        } else {
            CheckResult::fail(issues.join("; "))
        })
    }
}

/// README mentions the license.
pub struct ReadmeLicense;

impl Rule for ReadmeLicense {
    fn id(&self) -> &'static str {
        "README_LICENSE"
    }

    fn name(&self) -> &'static str {
        "README references license"
    }

    fn category(&self) -> Category {
        Category::RepoStructure
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["README_EXISTS", "LICENSE_EXISTS"]
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        let Some(text) = repo.readme()?.present() else {
            return Ok(no_readme());
        };
        if repo.license().is_none() {
            return Ok(CheckResult::skip("no LICENSE file"));
        }
        Ok(if LICENSE_MENTION.is_match(text) {
            CheckResult::Pass
        } else {
            CheckResult::fail("README missing license reference")
        })
    }

    fn remedy(&self) -> Remedy<'_> {
        Remedy::CheckAndFix(self)
    }
}

impl Fix for ReadmeLicense {
    fn plan(&self, _repo: &Repo, _ctx: &RuleContext<'_>) -> Result<String> {
        Ok(format!("append License section to {}", README))
    }

    fn apply(&self, repo: &mut Repo, _ctx: &RuleContext<'_>) -> Result<String> {
        let text = repo.readme()?.present().map(String::as_str).unwrap_or("");
        let contents = append(text, templates::README_LICENSE_SECTION);
        repo.write(README, &contents, &[Fact::Readme])?;
        Ok(format!("added License section to {}", README))
    }
}

/// README displays the logo.
pub struct ReadmeLogo;

/// `text` with a centred logo block after the first `# ` heading, or at the
/// top when there is none.
pub fn insert_logo(text: &str, logo: &str, name: &str) -> String {
    let block = format!(
        "\n<p align=\"center\">\n  <img src=\"{}\" alt=\"{} logo\" width=\"200\">\n</p>\n",
        logo, name
    );
    let mut out = String::with_capacity(text.len() + block.len() + 1);
    let mut inserted = false;
    for line in text.split_inclusive('\n') {
        out.push_str(line);
        if !inserted && line.starts_with("# ") {
            if !line.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&block);
            inserted = true;
        }
    }
    if inserted {
        return out;
    }
    format!("{}\n{}", block, text)
}

impl Rule for ReadmeLogo {
    fn id(&self) -> &'static str {
        "README_LOGO"
    }

    fn name(&self) -> &'static str {
        "README displays logo"
    }

    fn category(&self) -> Category {
        Category::RepoStructure
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["README_EXISTS", "LOGO_EXISTS"]
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        let Some(text) = repo.readme()?.present() else {
            return Ok(no_readme());
        };
        if repo.logo().is_none() {
            return Ok(CheckResult::skip("no logo"));
        }
        Ok(if LOGO_MARKDOWN.is_match(text) || LOGO_HTML.is_match(text) {
            CheckResult::Pass
        } else {
            CheckResult::fail("README does not display the logo")
        })
    }

    fn remedy(&self) -> Remedy<'_> {
        Remedy::CheckAndFix(self)
    }
}

impl Fix for ReadmeLogo {
    fn plan(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<String> {
        Ok(format!(
            "insert {} into {}",
            repo.logo().unwrap_or("logo"),
            README
        ))
    }

    fn apply(&self, repo: &mut Repo, _ctx: &RuleContext<'_>) -> Result<String> {
        let Some(logo) = repo.logo() else {
            return Err(Error::Remediation("no logo to insert".into()));
        };
        let text = repo.readme()?.present().map(String::as_str).unwrap_or("");
        let contents = insert_logo(text, logo, repo.name());
        repo.write(README, &contents, &[Fact::Readme])?;
        Ok(format!("inserted {} into {}", logo, README))
    }
}

/// README shows a CI status badge when CI exists.
pub struct ReadmeCiBadge;

impl Rule for ReadmeCiBadge {
    fn id(&self) -> &'static str {
        "README_CI_BADGE"
    }

    fn name(&self) -> &'static str {
        "README has CI badge"
    }

    fn category(&self) -> Category {
        Category::RepoStructure
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["README_EXISTS"]
    }

    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult> {
        let Some(text) = repo.readme()?.present() else {
            return Ok(no_readme());
        };
        if !has_ci_workflow(repo, ctx)? {
            return Ok(CheckResult::not_applicable());
        }
        Ok(if CI_BADGE.is_match(text) {
            CheckResult::Pass
        } else {
            CheckResult::fail("README missing CI badge")
        })
    }
}

/// The hosting platform's description matches the README tagline.
pub struct RepoDescription;

impl RepoDescription {
    fn tagline(repo: &Repo) -> Result<Option<String>> {
        Ok(repo
            .readme()?
            .present()
            .map(String::as_str)
            .and_then(tagline::extract))
    }
}

impl Rule for RepoDescription {
    fn id(&self) -> &'static str {
        "REPO_DESCRIPTION"
    }

    fn name(&self) -> &'static str {
        "Description matches README"
    }

    fn category(&self) -> Category {
        Category::RepoStructure
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["README_EXISTS"]
    }

    fn check(&self, repo: &Repo, ctx: &RuleContext<'_>) -> Result<CheckResult> {
        if repo.readme()?.is_absent() {
            return Ok(no_readme());
        }
        let slug = match remote_slug(repo, ctx) {
            Ok(slug) => slug,
            Err(skip) => return Ok(skip),
        };
        let Some(tagline) = Self::tagline(repo)? else {
            return Ok(CheckResult::skip("no tagline in README"));
        };
        Ok(match ctx.platform.description(slug) {
            Ok(description) if description == tagline => CheckResult::Pass,
            Ok(_) => CheckResult::fail("Description mismatch (GitHub vs README tagline)"),
            Err(e) => degraded("platform", &e),
        })
    }

    fn remedy(&self) -> Remedy<'_> {
        Remedy::CheckAndFix(self)
    }
}

impl Fix for RepoDescription {
    fn plan(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<String> {
        Ok(match Self::tagline(repo)? {
            Some(tagline) => format!("set description to: {}", tagline),
            None => "no tagline to publish".to_string(),
        })
    }

    fn apply(&self, repo: &mut Repo, ctx: &RuleContext<'_>) -> Result<String> {
        let Some(tagline) = Self::tagline(repo)? else {
            return Err(Error::Remediation("README has no tagline".into()));
        };
        let Some(slug) = repo.remote(ctx.vcs)? else {
            return Err(Error::Remediation("no GitHub remote".into()));
        };
        ctx.platform.set_description(slug, &tagline)?;
        Ok(format!("set description to: {}", tagline))
    }
}

#[cfg(test)]
#[path = "readme_tests.rs"]
mod tests;
