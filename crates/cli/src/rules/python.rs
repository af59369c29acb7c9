// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Python packaging rules.
//!
//! A "CLI project" declares a non-empty `[project.scripts]` table. CLI rules
//! do not apply to anything else.

use toml::{Table, Value};

use crate::error::Result;
use crate::repo::{Document, MANIFEST, Repo};
use crate::rule::{Category, CheckResult, Rule, RuleContext};

const EXPECTED_BACKEND: &str = "hatchling.build";

/// Metadata PyPI needs for a useful project page.
const PYPI_FIELDS: &[&str] = &["description", "license", "requires-python"];

fn project(manifest: &Table) -> Option<&Table> {
    manifest.get("project")?.as_table()
}

/// Empty strings and empty collections count as unset.
fn is_set(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Table(table) => !table.is_empty(),
        _ => true,
    }
}

/// Whether the manifest declares console scripts.
pub(super) fn is_cli(repo: &Repo) -> Result<bool> {
    Ok(repo
        .manifest()?
        .present()
        .and_then(project)
        .and_then(|p| p.get("scripts"))
        .and_then(Value::as_table)
        .is_some_and(|scripts| !scripts.is_empty()))
}

/// Static `project.version` or `"version"` listed in `project.dynamic`.
pub(super) fn has_version(manifest: &Table) -> bool {
    let Some(project) = project(manifest) else {
        return false;
    };
    let is_static = project.get("version").is_some_and(is_set);
    let is_dynamic = project
        .get("dynamic")
        .and_then(Value::as_array)
        .is_some_and(|fields| fields.iter().any(|f| f.as_str() == Some("version")));
    is_static || is_dynamic
}

/// Python repositories carry a `pyproject.toml`.
pub struct PythonPyproject;

impl Rule for PythonPyproject {
    fn id(&self) -> &'static str {
        "PYTHON_PYPROJECT"
    }

    fn name(&self) -> &'static str {
        "Python project has pyproject.toml"
    }

    fn category(&self) -> Category {
        Category::Python
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        if !repo.is_python()? {
            return Ok(CheckResult::not_applicable());
        }
        Ok(if repo.manifest()?.is_absent() {
            CheckResult::fail("Python project missing pyproject.toml")
        } else {
            CheckResult::Pass
        })
    }
}

/// `[project] requires-python` is declared.
pub struct PythonMinVersion;

impl Rule for PythonMinVersion {
    fn id(&self) -> &'static str {
        "PYTHON_MIN_VERSION"
    }

    fn name(&self) -> &'static str {
        "Minimum Python version declared"
    }

    fn category(&self) -> Category {
        Category::Python
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["PYTHON_PYPROJECT"]
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        let manifest = match repo.manifest()? {
            Document::Absent => return Ok(CheckResult::not_applicable()),
            Document::Malformed(message) => {
                return Ok(CheckResult::fail(format!(
                    "{} is malformed: {}",
                    MANIFEST, message
                )));
            }
            Document::Present(manifest) => manifest,
        };
        let declared = project(manifest)
            .and_then(|p| p.get("requires-python"))
            .is_some_and(is_set);
        Ok(if declared {
            CheckResult::Pass
        } else {
            CheckResult::fail("pyproject.toml missing requires-python")
        })
    }
}

/// CLI projects build with hatchling.
pub struct CliBuildBackend;

impl Rule for CliBuildBackend {
    fn id(&self) -> &'static str {
        "CLI_BUILD_BACKEND"
    }

    fn name(&self) -> &'static str {
        "CLI uses hatchling"
    }

    fn category(&self) -> Category {
        Category::Python
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        if !is_cli(repo)? {
            return Ok(CheckResult::not_applicable());
        }
        let backend = repo
            .manifest()?
            .present()
            .and_then(|m| m.get("build-system"))
            .and_then(|b| b.get("build-backend"))
            .and_then(Value::as_str)
            .unwrap_or("");
        Ok(if backend == EXPECTED_BACKEND {
            CheckResult::Pass
        } else {
            CheckResult::fail(format!(
                "Build backend is '{}', expected '{}'",
                backend, EXPECTED_BACKEND
            ))
        })
    }
}

/// CLI projects declare a version.
pub struct CliVersion;

impl Rule for CliVersion {
    fn id(&self) -> &'static str {
        "CLI_VERSION"
    }

    fn name(&self) -> &'static str {
        "CLI declares version"
    }

    fn category(&self) -> Category {
        Category::Python
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        if !is_cli(repo)? {
            return Ok(CheckResult::not_applicable());
        }
        let versioned = repo.manifest()?.present().is_some_and(has_version);
        Ok(if versioned {
            CheckResult::Pass
        } else {
            CheckResult::fail("CLI project missing version (static or dynamic)")
        })
    }
}

/// CLI projects carry the metadata PyPI displays.
pub struct CliPypiReady;

impl Rule for CliPypiReady {
    fn id(&self) -> &'static str {
        "CLI_PYPI_READY"
    }

    fn name(&self) -> &'static str {
        "CLI ready for PyPI"
    }

    fn category(&self) -> Category {
        Category::Python
    }

    fn check(&self, repo: &Repo, _ctx: &RuleContext<'_>) -> Result<CheckResult> {
        if !is_cli(repo)? {
            return Ok(CheckResult::not_applicable());
        }
        let project = repo.manifest()?.present().and_then(project);
        let field_set = |key: &str| {
            project
                .and_then(|p| p.get(key))
                .is_some_and(is_set)
        };

        let mut missing: Vec<&str> = PYPI_FIELDS
            .iter()
            .copied()
            .filter(|key| !field_set(key))
            .collect();
        if !field_set("urls") {
            missing.push("[project.urls]");
        }
        Ok(if missing.is_empty() {
            CheckResult::Pass
        } else {
            CheckResult::fail(format!("Missing PyPI metadata: {}", missing.join(", ")))
        })
    }
}

#[cfg(test)]
#[path = "python_tests.rs"]
mod tests;
