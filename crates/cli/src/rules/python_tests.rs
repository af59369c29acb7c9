// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use yare::parameterized;

use super::*;
use crate::test_utils::{TestEnv, repo_with};

const CLI_READY: &str = r#"
[build-system]
requires = ["hatchling"]
build-backend = "hatchling.build"

[project]
name = "widget"
version = "1.2.0"
description = "Does widget things"
license = "MIT"
requires-python = ">=3.11"

[project.scripts]
widget = "widget.cli:main"

[project.urls]
Homepage = "https://example.com"
"#;

fn check(rule: &dyn Rule, files: &[(&str, &str)]) -> CheckResult {
    let env = TestEnv::new();
    let (_dir, repo) = repo_with(files);
    rule.check(&repo, &env.ctx()).unwrap()
}

// =============================================================================
// MANIFEST HELPERS
// =============================================================================

#[parameterized(
    static_version = { "[project]\nversion = \"1.0\"\n", true },
    dynamic_version = { "[project]\ndynamic = [\"version\", \"readme\"]\n", true },
    empty_version = { "[project]\nversion = \"\"\n", false },
    no_project = { "[tool.x]\ny = 1\n", false },
)]
fn version_detection(manifest: &str, expected: bool) {
    let table: Table = manifest.parse().unwrap();
    assert_eq!(has_version(&table), expected);
}

#[test]
fn non_python_repo_skips_every_python_rule() {
    let files = [("main.go", "package main")];
    for rule in [
        &PythonPyproject as &dyn Rule,
        &PythonMinVersion,
        &CliBuildBackend,
        &CliVersion,
        &CliPypiReady,
    ] {
        assert_eq!(check(rule, &files), CheckResult::not_applicable(), "{}", rule.id());
    }
}

// =============================================================================
// PYTHON_PYPROJECT / PYTHON_MIN_VERSION
// =============================================================================

#[test]
fn python_without_pyproject_fails() {
    assert_eq!(
        check(&PythonPyproject, &[("requirements.txt", "requests\n")]),
        CheckResult::fail("Python project missing pyproject.toml")
    );
}

#[test]
fn min_version_missing_fails() {
    assert_eq!(
        check(&PythonMinVersion, &[("pyproject.toml", "[project]\nname = \"x\"\n")]),
        CheckResult::fail("pyproject.toml missing requires-python")
    );
}

#[test]
fn min_version_malformed_manifest_fails() {
    let result = check(&PythonMinVersion, &[("pyproject.toml", "[project\n")]);
    assert!(result.reason().unwrap().starts_with("pyproject.toml is malformed"));
}

// =============================================================================
// CLI RULES
// =============================================================================

#[test]
fn complete_cli_project_passes() {
    let files = [("pyproject.toml", CLI_READY)];
    for rule in [&CliBuildBackend as &dyn Rule, &CliVersion, &CliPypiReady] {
        assert_eq!(check(rule, &files), CheckResult::Pass, "{}", rule.id());
    }
}

#[test]
fn library_without_scripts_skips_cli_rules() {
    let manifest = "[project]\nname = \"lib\"\n";
    assert_eq!(
        check(&CliVersion, &[("pyproject.toml", manifest)]),
        CheckResult::not_applicable()
    );
}

#[test]
fn wrong_backend_fails() {
    let manifest = CLI_READY.replace("hatchling.build", "setuptools.build_meta");
    assert_eq!(
        check(&CliBuildBackend, &[("pyproject.toml", &manifest)]),
        CheckResult::fail("Build backend is 'setuptools.build_meta', expected 'hatchling.build'")
    );
}

#[test]
fn unversioned_cli_fails() {
    let manifest = CLI_READY.replace("version = \"1.2.0\"\n", "");
    assert_eq!(
        check(&CliVersion, &[("pyproject.toml", &manifest)]),
        CheckResult::fail("CLI project missing version (static or dynamic)")
    );
}

#[test]
fn pypi_metadata_lists_missing_fields() {
    let manifest = "[project]\nname = \"w\"\ndescription = \"\"\n\n[project.scripts]\nw = \"w:main\"\n";
    assert_eq!(
        check(&CliPypiReady, &[("pyproject.toml", manifest)]),
        CheckResult::fail("Missing PyPI metadata: description, license, requires-python, [project.urls]")
    );
}
