// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! File templates written by fixes.
//!
//! Templates are embedded at build time; placeholders use `[name]` syntax.

use crate::repo::Ecosystem;

const LICENSE_MIT: &str = include_str!("../templates/LICENSE-MIT");
const CLAUDE_MD: &str = include_str!("../templates/CLAUDE.md");
const RELEASE_WORKFLOW: &str = include_str!("../templates/release.yml");
const PRE_COMMIT: &str = include_str!("../templates/pre-commit-config.yaml");

/// Section appended to a README that does not mention its license.
pub const README_LICENSE_SECTION: &str = "\n## License\n\nMIT\n";

/// MIT license text for `year` and `holder`.
pub fn license(year: i32, holder: &str) -> String {
    LICENSE_MIT
        .replace("[year]", &year.to_string())
        .replace("[fullname]", holder)
}

pub fn claude_md(project: &str) -> String {
    CLAUDE_MD.replace("[project-name]", project)
}

/// Release workflow delegating to the organization's reusable workflow.
pub fn release_workflow(shared_repo: &str) -> String {
    RELEASE_WORKFLOW.replace("[shared-repo]", shared_repo)
}

/// A fresh `.pre-commit-config.yaml` with the secret-scanning hook.
pub fn pre_commit_config(shared_repo: &str) -> String {
    PRE_COMMIT.replace("[shared-repo]", shared_repo)
}

/// The secret-scanning hook as a `repos:` list entry.
pub fn pre_commit_hook(shared_repo: &str) -> String {
    format!(
        "  - repo: https://github.com/{}\n    rev: main\n    hooks:\n      - id: gitleaks\n",
        shared_repo
    )
}

/// Header written above patterns the tool manages in an ignore file.
pub fn gitignore_header(shared_repo: &str) -> String {
    format!(
        "# Managed by {}\n# Do not remove - synced automatically\n",
        shared_repo
    )
}

/// Weekly dependency updates for each ecosystem; `github-actions` when none.
pub fn dependabot(ecosystems: &[Ecosystem]) -> String {
    let mut out = String::from(
        "# Dependabot configuration for automated dependency updates\n\
         # https://docs.github.com/en/code-security/dependabot/dependabot-version-updates\n\
         version: 2\n\
         updates:\n",
    );
    let fallback = [Ecosystem::GithubActions];
    let ecosystems = if ecosystems.is_empty() {
        &fallback[..]
    } else {
        ecosystems
    };
    for ecosystem in ecosystems {
        out.push_str(&format!(
            "  - package-ecosystem: \"{}\"\n    directory: \"/\"\n    schedule:\n      interval: \"weekly\"\n",
            ecosystem.as_str()
        ));
    }
    out
}

#[cfg(test)]
#[path = "templates_tests.rs"]
mod tests;
