// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashSet;
use std::fs;

use tempfile::TempDir;

use super::*;
use crate::rule::{FixOutcome, Remedy};
use crate::runner::{Mode, RuleRunner, RunnerConfig};
use crate::test_utils::{TestEnv, create_tree, snapshot, temp_repo};

/// A repository failing most of the catalogue.
const MESSY: &[(&str, &str)] = &[
    ("README.md", "# Widget\n\nTODO describe the widget properly.\n"),
    ("logo.png", "png"),
    (".gitignore", ".env\n"),
    (
        "pyproject.toml",
        "[project]\nname = \"widget\"\nversion = \"0.1.0\"\n\n[project.scripts]\nwidget = \"widget:main\"\n",
    ),
    (
        ".claude/settings.local.json",
        r#"{"permissions":{"allow":["Bash(git status)","WebFetch(domain:docs.rs)","Bash(ls)"]}}"#,
    ),
];

/// Online env whose global settings cover some of the project permissions.
fn messy_env() -> (TempDir, TestEnv) {
    let global = TempDir::new().unwrap();
    let path = global.path().join("settings.json");
    fs::write(
        &path,
        r#"{"permissions":{"allow":["Bash(git:*)","WebFetch(domain:*)"]}}"#,
    )
    .unwrap();

    let mut env = TestEnv::new();
    env.config.settings.global = Some(path);
    env.platform.authenticated = true;
    *env.platform.description.lock().unwrap() = "stale description".into();
    env.vcs.remote = Some("git@github.com:acme/widget.git".into());
    *env.vcs.tracked_ignored.lock().unwrap() = vec![".env".into()];
    (global, env)
}

fn messy_repo() -> TempDir {
    let dir = temp_repo();
    create_tree(dir.path(), MESSY);
    dir
}

// =============================================================================
// CATALOGUE
// =============================================================================

#[test]
fn catalogue_ids_are_unique_screaming_snake() {
    let rules = all_rules();
    assert_eq!(rules.len(), 30);
    let mut seen = HashSet::new();
    for rule in &rules {
        let id = rule.id();
        assert!(seen.insert(id), "duplicate id {}", id);
        assert!(
            id.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
            "{}",
            id
        );
        assert!(!rule.name().is_empty());
    }
}

#[test]
fn dependencies_name_catalogue_rules() {
    let rules = all_rules();
    let ids: HashSet<_> = rules.iter().map(|r| r.id()).collect();
    for rule in &rules {
        for dep in rule.depends_on() {
            assert!(ids.contains(dep), "{} depends on unknown {}", rule.id(), dep);
        }
    }
}

#[test]
fn fixable_rules_match_catalogue() {
    let fixable: Vec<_> = all_rules()
        .iter()
        .filter(|r| matches!(r.remedy(), Remedy::CheckAndFix(_)))
        .map(|r| r.id())
        .collect();
    assert_eq!(
        fixable,
        vec![
            "LICENSE_EXISTS",
            "GITIGNORE",
            "CLAUDE_MD_EXISTS",
            "README_LICENSE",
            "README_LOGO",
            "TRACKED_IGNORED",
            "CLAUDE_SANDBOX",
            "SETTINGS_CLEAN",
            "CLI_RELEASE_WORKFLOW",
            "DEPENDABOT_EXISTS",
            "PRECOMMIT_GITLEAKS",
            "REPO_DESCRIPTION",
        ]
    );
}

// =============================================================================
// HELPERS
// =============================================================================

#[test]
fn append_inserts_missing_newline() {
    assert_eq!(append("a", "b\n"), "a\nb\n");
    assert_eq!(append("a\n", "b\n"), "a\nb\n");
    assert_eq!(append("", "b\n"), "b\n");
}

// =============================================================================
// REMEDIATION PROPERTIES
// =============================================================================

#[test]
fn planning_never_mutates() {
    let (_global, env) = messy_env();
    let dir = messy_repo();
    let before = snapshot(dir.path());
    let ctx = env.ctx();
    let repo = Repo::resolve(dir.path()).unwrap();

    for rule in all_rules() {
        if let Remedy::CheckAndFix(fix) = rule.remedy() {
            let _ = fix.plan(&repo, &ctx);
        }
    }

    assert_eq!(snapshot(dir.path()), before);
    assert_eq!(*env.vcs.tracked_ignored.lock().unwrap(), vec![".env".to_string()]);
    assert_eq!(*env.platform.description.lock().unwrap(), "stale description");
}

#[test]
fn dry_run_matches_audit_and_leaves_tree_alone() {
    let (_global, env) = messy_env();
    let dir = messy_repo();
    let before = snapshot(dir.path());
    let repos = vec![dir.path().to_path_buf()];
    let run = |mode| {
        RuleRunner::new(RunnerConfig { mode, jobs: 1 }, all_rules()).run(&repos, &env.ctx())
    };

    let audit = run(Mode::Audit);
    let dry = run(Mode::DryRun);

    assert_eq!(snapshot(dir.path()), before);
    let results = |report: &crate::report::Report| -> Vec<CheckResult> {
        report.repos[0]
            .records
            .iter()
            .map(|r| r.result.clone())
            .collect()
    };
    assert_eq!(results(&audit), results(&dry));
    assert!(dry.repos[0].records.iter().any(|r| matches!(
        &r.fix,
        Some(FixOutcome::NotAttempted { planned: Some(_) })
    )));
}

#[test]
fn fixing_twice_changes_nothing_the_second_time() {
    let (_global, env) = messy_env();
    let dir = messy_repo();
    let repos = vec![dir.path().to_path_buf()];
    let runner = RuleRunner::new(
        RunnerConfig {
            mode: Mode::Fix,
            jobs: 1,
        },
        all_rules(),
    );

    let first = runner.run(&repos, &env.ctx());
    let after_first = snapshot(dir.path());
    let second = runner.run(&repos, &env.ctx());

    let applied: Vec<_> = first.repos[0]
        .records
        .iter()
        .filter(|r| matches!(r.fix, Some(FixOutcome::Applied { .. })))
        .map(|r| r.rule)
        .collect();
    assert!(applied.contains(&"LICENSE_EXISTS"), "{:?}", applied);
    assert!(applied.contains(&"GITIGNORE"), "{:?}", applied);
    assert!(applied.contains(&"SETTINGS_CLEAN"), "{:?}", applied);
    assert!(applied.contains(&"REPO_DESCRIPTION"), "{:?}", applied);

    assert_eq!(snapshot(dir.path()), after_first);
    assert!(second.repos[0].records.iter().all(|r| !matches!(
        r.fix,
        Some(FixOutcome::Applied { .. } | FixOutcome::AppliedButStillFailing { .. })
    )));
}

#[test]
fn check_only_failures_survive_fix_mode() {
    let (_global, env) = messy_env();
    let dir = messy_repo();
    let repos = vec![dir.path().to_path_buf()];
    let runner = RuleRunner::new(
        RunnerConfig {
            mode: Mode::Fix,
            jobs: 1,
        },
        all_rules(),
    );

    let report = runner.run(&repos, &env.ctx());

    let current = report.repos[0]
        .records
        .iter()
        .find(|r| r.rule == "README_CURRENT")
        .unwrap();
    assert!(current.result.is_fail());
    assert_eq!(current.fix, Some(FixOutcome::NotAttempted { planned: None }));
}
