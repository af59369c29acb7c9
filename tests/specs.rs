// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specifications for the fleetguard CLI.
//!
//! These tests are black-box: they build a fleet of git repositories in a
//! temp directory, invoke the binary, and verify stdout, stderr, exit codes
//! and the files left behind.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

use prelude::*;

/// Points the global settings file somewhere that never exists, so the
/// caller's own settings never leak into results.
const ISOLATED_CONFIG: &str = "[settings]\nglobal = \"/nonexistent/fleetguard/settings.json\"\n";

// =============================================================================
// COMMAND SPECS
// =============================================================================

#[test]
fn bare_invocation_shows_help() {
    fleetguard_cmd()
        .assert()
        .success()
        .stdout(predicates::str::contains("Usage:"));
}

#[test]
fn version_exits_successfully() {
    fleetguard_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_command_fails() {
    fleetguard_cmd()
        .arg("unknown")
        .assert()
        .code(2)
        .stderr(predicates::str::is_match(r"(?i)(unrecognized|unknown)").unwrap());
}

#[test]
fn rules_lists_catalogue_in_order() {
    let output = fleetguard_cmd().arg("rules").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.starts_with("DEFAULT_BRANCH"), "{}", stdout);
    assert!(stdout.contains("30 rules, 12 with automated fixes"), "{}", stdout);
    let readme_exists = stdout.find("README_EXISTS").unwrap();
    let readme_current = stdout.find("README_CURRENT").unwrap();
    assert!(readme_exists < readme_current);
}

#[test]
fn rules_json_reports_fixability() {
    let output = fleetguard_cmd().args(["rules", "--json"]).output().unwrap();
    assert!(output.status.success());
    let rules: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rules = rules.as_array().unwrap();

    assert_eq!(rules.len(), 30);
    assert_eq!(rules[0]["id"], "DEFAULT_BRANCH");
    let license = rules.iter().find(|r| r["id"] == "LICENSE_EXISTS").unwrap();
    assert_eq!(license["fixable"], true);
    assert_eq!(license["category"], "repo-structure");
    let stale = rules.iter().find(|r| r["id"] == "STALE_BRANCHES").unwrap();
    assert_eq!(stale["fixable"], false);
    assert_eq!(stale["depends_on"], serde_json::json!(["DEFAULT_BRANCH"]));
}

#[test]
fn no_color_env_disables_color() {
    let output = fleetguard_cmd().arg("rules").output().unwrap();
    assert!(!String::from_utf8_lossy(&output.stdout).contains("\x1b["));
}

#[test]
fn color_flag_overrides_no_color_env() {
    let output = fleetguard_cmd().args(["rules", "--color"]).output().unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("\x1b["));
}

// =============================================================================
// DISCOVERY SPECS
// =============================================================================

#[test]
fn empty_directory_audits_zero_repositories() {
    let fleet = Fleet::new();
    run(&fleet, &["audit"])
        .passes()
        .stderr_has("No git repositories found.");
}

#[test]
fn empty_directory_json_is_empty_report() {
    let fleet = Fleet::new();
    let result = run(&fleet, &["audit", "--json"]).passes();
    let doc = result.json();
    assert_eq!(doc["passed"], true);
    assert_eq!(doc["repositories"], serde_json::json!([]));
}

#[test]
fn plain_directories_are_not_repositories() {
    let fleet = Fleet::new();
    std::fs::create_dir(fleet.path().join("notes")).unwrap();
    run(&fleet, &["audit"])
        .passes()
        .stderr_has("No git repositories found.");
}

#[test]
fn missing_repos_dir_is_argument_error() {
    fleetguard_cmd()
        .arg("audit")
        .assert()
        .code(2)
        .stderr(predicates::str::contains("FLEETGUARD_REPOS_DIR"));
}

#[test]
fn nonexistent_repos_dir_is_argument_error() {
    let fleet = Fleet::new();
    fleetguard_cmd()
        .arg("audit")
        .arg(fleet.path().join("missing"))
        .assert()
        .code(2)
        .stderr(predicates::str::contains("directory does not exist"));
}

#[test]
fn repos_dir_from_environment() {
    let fleet = Fleet::new();
    fleetguard_cmd()
        .arg("audit")
        .env("FLEETGUARD_REPOS_DIR", fleet.path())
        .assert()
        .success()
        .stderr(predicates::str::contains("No git repositories found."));
}

#[test]
fn filter_selects_repositories_by_name() {
    let fleet = Fleet::new();
    fleet.repo("alpha").commit();
    fleet.repo("beta").commit();

    run(&fleet, &["audit", "--rule", "README_EXISTS", "-f", "alp"])
        .fails()
        .stdout_has("alpha: FAIL")
        .stdout_lacks("beta");
}

#[test]
fn parallel_jobs_keep_discovery_order() {
    let fleet = Fleet::new();
    for name in ["gamma", "alpha", "beta"] {
        fleet.repo(name).file("README.md", GOOD_README).commit();
    }

    let result = run(&fleet, &["audit", "--jobs", "3", "--rule", "README_EXISTS"]).passes();
    let stdout = result.stdout();
    let lines: Vec<&str> = stdout.lines().take(3).collect();
    assert_eq!(
        lines,
        [
            "alpha: PASS (1 passed, 0 failed, 0 skipped)",
            "beta: PASS (1 passed, 0 failed, 0 skipped)",
            "gamma: PASS (1 passed, 0 failed, 0 skipped)",
        ]
    );
}

// =============================================================================
// CONFIG SPECS
// =============================================================================

#[test]
fn unknown_config_key_warns() {
    let fleet = Fleet::new();
    fleet.config("mystery = true\n");
    run(&fleet, &["audit"])
        .passes()
        .stderr_has("unrecognized field `mystery`");
}

#[test]
fn unsupported_config_version_is_config_error() {
    let fleet = Fleet::new();
    fleet.config("version = 2\n");
    run(&fleet, &["audit"])
        .exits(2)
        .stderr_has("unsupported config version");
}

#[test]
fn explicit_config_must_exist() {
    let fleet = Fleet::new();
    let missing = fleet.path().join("custom.toml");
    fleetguard_cmd()
        .args(["-C", missing.to_str().unwrap(), "audit"])
        .arg(fleet.path())
        .assert()
        .code(2)
        .stderr(predicates::str::contains("config file not found"));
}

#[test]
fn disabled_rules_do_not_run() {
    let fleet = Fleet::new();
    fleet.config("[rules]\ndisabled = [\"README_EXISTS\"]\n");
    fleet.repo("widget").commit();

    run(&fleet, &["audit", "--category", "repo-structure", "--json"])
        .stdout_lacks("README_EXISTS");
}

#[test]
fn unknown_rule_is_argument_error() {
    let fleet = Fleet::new();
    run(&fleet, &["audit", "--rule", "NOPE"])
        .exits(2)
        .stderr_has("unknown rule: NOPE");
}

#[test]
fn unknown_category_is_argument_error() {
    let fleet = Fleet::new();
    run(&fleet, &["audit", "--category", "packaging"])
        .exits(2)
        .stderr_has("unknown category");
}

#[test]
fn log_env_enables_debug_output() {
    let fleet = Fleet::new();
    fleetguard_cmd()
        .arg("audit")
        .arg(fleet.path())
        .env("FLEETGUARD_LOG", "debug")
        .assert()
        .success()
        .stderr(predicates::str::contains("DEBUG"));
}

// =============================================================================
// REMEDIATION SPECS
// =============================================================================

#[test]
fn missing_license_and_gitignore_are_fixed() {
    let fleet = Fleet::new();
    fleet.config(ISOLATED_CONFIG);
    let repo = fleet.repo("widget");
    repo.file("README.md", GOOD_README).commit();

    run(&fleet, &["audit", "--rule", "LICENSE_EXISTS", "--rule", "GITIGNORE"])
        .fails()
        .stdout_has("FAIL   LICENSE_EXISTS")
        .stdout_has("FAIL   GITIGNORE  `.gitignore` not found");

    run(&fleet, &["fix", "--rule", "LICENSE_EXISTS", "--rule", "GITIGNORE"])
        .passes()
        .stdout_has("FIXED  LICENSE_EXISTS  created LICENSE (MIT, ")
        .stdout_has("Test User)")
        .stdout_has("FIXED  GITIGNORE  created .gitignore with 6 pattern(s)");

    assert!(repo.read("LICENSE").starts_with("MIT License"));
    assert!(repo.read(".gitignore").contains("node_modules/"));

    run(&fleet, &["audit", "--rule", "LICENSE_EXISTS", "--rule", "GITIGNORE"])
        .passes()
        .stdout_has("widget: PASS (2 passed, 0 failed, 0 skipped)");
}

#[test]
fn dry_run_plans_without_writing() {
    let fleet = Fleet::new();
    fleet.config(ISOLATED_CONFIG);
    let repo = fleet.repo("widget");
    repo.file("README.md", GOOD_README).commit();

    run(&fleet, &["fix", "--dry-run", "--rule", "LICENSE_EXISTS"])
        .fails()
        .stdout_has("FAIL   LICENSE_EXISTS")
        .stdout_has("would fix: create LICENSE (MIT, ");

    assert!(!repo.exists("LICENSE"));
}

#[test]
fn dangerous_permission_survives_maintain() {
    let fleet = Fleet::new();
    fleet.config(ISOLATED_CONFIG);
    fleet
        .repo("widget")
        .file(
            ".claude/settings.local.json",
            r#"{"permissions": {"allow": ["Bash(*:*)", "Bash(ls)"]}}"#,
        )
        .commit();

    run(&fleet, &["maintain", "--rule", "SETTINGS_DANGEROUS"])
        .fails()
        .stdout_has("== Final audit ==")
        .stdout_has("FAIL   SETTINGS_DANGEROUS  Dangerous permission patterns detected: Bash(*:*)")
        .stdout_lacks("FIXED");
}

#[test]
fn maintain_json_reports_each_phase() {
    let fleet = Fleet::new();
    fleet.config(ISOLATED_CONFIG);
    fleet
        .repo("widget")
        .file(
            ".claude/settings.local.json",
            r#"{"permissions": {"allow": ["Bash(*:*)"]}}"#,
        )
        .commit();

    let result = run(&fleet, &["maintain", "--json", "--rule", "SETTINGS_DANGEROUS"]).fails();
    let doc = result.json();
    assert_eq!(doc["mode"], "maintain");
    assert_eq!(doc["passed"], false);

    let phases = doc["phases"].as_array().unwrap();
    let names: Vec<&str> = phases.iter().map(|p| p["phase"].as_str().unwrap()).collect();
    assert_eq!(names, ["audit", "fix", "final"]);

    let fix_record = &phases[1]["repositories"][0]["rules"][0];
    assert_eq!(fix_record["status"], "fail");
    assert_eq!(fix_record["fix"]["outcome"], "not_attempted");
}

#[test]
fn scattered_gitignore_passes_untouched() {
    let fleet = Fleet::new();
    let repo = fleet.repo("widget");
    repo.file(".gitignore", SCATTERED_GITIGNORE).commit();

    run(&fleet, &["fix", "--rule", "GITIGNORE"])
        .passes()
        .stdout_lacks("FIXED");

    assert_eq!(repo.read(".gitignore"), SCATTERED_GITIGNORE);
}

#[test]
fn python_rules_skip_outside_python_projects() {
    let fleet = Fleet::new();
    fleet.repo("widget").file("README.md", GOOD_README).commit();

    run(&fleet, &["audit", "--category", "python", "--verbose"])
        .passes()
        .stdout_has("SKIP   PYTHON_PYPROJECT  not applicable")
        .stdout_has("widget: PASS (0 passed, 0 failed, 5 skipped)");
}

#[test]
fn json_audit_has_stable_fields() {
    let fleet = Fleet::new();
    fleet.repo("widget").commit();

    let result = run(&fleet, &["audit", "--json", "--rule", "README_EXISTS"]).fails();
    let doc = result.json();
    assert_eq!(doc["mode"], "audit");
    assert_eq!(doc["passed"], false);
    assert_eq!(doc["summary"]["repositories"], 1);
    assert_eq!(doc["summary"]["failed_repositories"], 1);

    let record = &doc["repositories"][0]["rules"][0];
    assert_eq!(record["rule"], "README_EXISTS");
    assert_eq!(record["status"], "fail");
    assert_eq!(record["reason"], "README.md not found");
}

// =============================================================================
// REPORT SPECS
// =============================================================================

#[test]
fn taglines_report_lists_each_repository() {
    let fleet = Fleet::new();
    fleet.repo("alpha").file("README.md", GOOD_README);
    fleet.repo("beta");

    run(&fleet, &["report", "taglines"])
        .passes()
        .stdout_has("A small tool that keeps widgets aligned across every project.")
        .stdout_has("(no README)")
        .stdout_has("Summary: 1 with tagline, 1 without");
}

#[test]
fn tracked_ignored_report_flags_repositories() {
    let fleet = Fleet::new();
    let dirty = fleet.repo("dirty");
    dirty.file(".env", "SECRET=1\n").commit();
    dirty.file(".gitignore", ".env\n").commit();
    fleet.repo("tidy").file(".gitignore", ".env\n").commit();

    run(&fleet, &["report", "tracked-ignored"])
        .fails()
        .stdout_has("dirty: 1 tracked file(s) should be ignored")
        .stdout_has("tidy (clean)")
        .stdout_has("  Warnings: 1");
}
