// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration parsing and validation.
//!
//! Handles fleetguard.toml parsing with version validation and unknown key
//! warnings. The loaded [`Config`] is built once at startup and passed by
//! reference to everything downstream.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Config file name looked up in the target directory.
pub const CONFIG_FILE: &str = "fleetguard.toml";

/// Currently supported config version.
pub const SUPPORTED_VERSION: i64 = 1;

/// Upper bound for `branches.stale_days` (one hundred years).
pub const MAX_STALE_DAYS: i64 = 36_500;

/// Patterns every ignore file must mention.
pub const DEFAULT_GITIGNORE_PATTERNS: &[&str] = &[
    ".env",
    ".DS_Store",
    "node_modules/",
    "__pycache__/",
    "*.pyc",
    ".venv/",
];

/// Known keys per section. An empty key list means the top level.
const KNOWN_KEYS: &[(&str, &[&str])] = &[
    (
        "",
        &[
            "version",
            "discovery",
            "rules",
            "gitignore",
            "license",
            "branches",
            "settings",
            "platform",
            "organization",
        ],
    ),
    ("discovery", &["skip_archived"]),
    ("rules", &["disabled"]),
    ("gitignore", &["required"]),
    ("license", &["holder"]),
    ("branches", &["default", "stale_days"]),
    ("settings", &["global"]),
    ("platform", &["timeout_secs"]),
    ("organization", &["shared_repo"]),
];

/// Full configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Config file version (must be 1).
    pub version: i64,
    pub discovery: DiscoveryConfig,
    pub rules: RulesConfig,
    pub gitignore: GitignoreConfig,
    pub license: LicenseConfig,
    pub branches: BranchesConfig,
    pub settings: SettingsConfig,
    pub platform: PlatformConfig,
    pub organization: OrganizationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: SUPPORTED_VERSION,
            discovery: DiscoveryConfig::default(),
            rules: RulesConfig::default(),
            gitignore: GitignoreConfig::default(),
            license: LicenseConfig::default(),
            branches: BranchesConfig::default(),
            settings: SettingsConfig::default(),
            platform: PlatformConfig::default(),
            organization: OrganizationConfig::default(),
        }
    }
}

impl Config {
    /// Path of the user-wide settings document that project settings are
    /// compared against.
    pub fn global_settings_path(&self) -> Option<PathBuf> {
        match &self.settings.global {
            Some(path) => Some(path.clone()),
            None => dirs_next::home_dir().map(|home| home.join(".claude").join("settings.json")),
        }
    }

    /// Per-call timeout for remote platform commands.
    pub fn platform_timeout(&self) -> Duration {
        Duration::from_secs(self.platform.timeout_secs)
    }
}

/// Repository discovery settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Skip repositories the remote platform reports as archived.
    pub skip_archived: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            skip_archived: true,
        }
    }
}

/// Rule selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule ids never run.
    pub disabled: Vec<String>,
}

/// Ignore-file requirements.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitignoreConfig {
    pub required: Vec<String>,
}

impl Default for GitignoreConfig {
    fn default() -> Self {
        Self {
            required: DEFAULT_GITIGNORE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// License generation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    /// Copyright holder. Falls back to git `user.name`.
    pub holder: Option<String>,
}

/// Branch hygiene.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BranchesConfig {
    /// Name of the branch every repository must have.
    pub default: String,
    /// Days without commits before a branch counts as stale.
    pub stale_days: i64,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        Self {
            default: "main".to_string(),
            stale_days: 90,
        }
    }
}

/// Agent settings analysis.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Global settings document (default: ~/.claude/settings.json).
    pub global: Option<PathBuf>,
}

/// Remote platform access.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub timeout_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

/// Organization-wide shared assets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrganizationConfig {
    /// `owner/name` of the repository hosting reusable workflows and hooks.
    pub shared_repo: String,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            shared_repo: "tsilva/.github".to_string(),
        }
    }
}

/// Load config from a file path, warning on unknown keys.
pub fn load(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_with_warnings(&content, path)
}

/// Parse config, warning on unknown keys.
pub fn parse_with_warnings(content: &str, path: &Path) -> Result<Config> {
    let config_error = |message: String| Error::Config {
        message,
        path: Some(path.to_path_buf()),
    };

    let table: toml::Table = content.parse().map_err(|e: toml::de::Error| config_error(e.to_string()))?;

    let version = table
        .get("version")
        .and_then(|v| v.as_integer())
        .ok_or_else(|| config_error("missing required field: version".to_string()))?;
    if version != SUPPORTED_VERSION {
        return Err(config_error(format!(
            "unsupported config version {} (supported: {})",
            version, SUPPORTED_VERSION
        )));
    }

    for key in unknown_keys(&table) {
        warn_unknown_key(path, &key);
    }

    let config: Config = toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| config_error(e.to_string()))?;

    if config.branches.stale_days <= 0 {
        return Err(config_error("branches.stale_days must be positive".to_string()));
    }
    if config.branches.stale_days > MAX_STALE_DAYS {
        return Err(config_error(format!(
            "branches.stale_days must be at most {}",
            MAX_STALE_DAYS
        )));
    }
    if config.platform.timeout_secs == 0 {
        return Err(config_error("platform.timeout_secs must be positive".to_string()));
    }
    Ok(config)
}

/// Dotted paths of keys not in [`KNOWN_KEYS`], in document order.
fn unknown_keys(table: &toml::Table) -> Vec<String> {
    let known = |section: &str| {
        KNOWN_KEYS
            .iter()
            .find(|(name, _)| *name == section)
            .map(|(_, keys)| *keys)
    };

    let mut unknown = Vec::new();
    let top = known("").unwrap_or_default();
    for (key, value) in table {
        if !top.contains(&key.as_str()) {
            unknown.push(key.clone());
            continue;
        }
        if let (Some(keys), toml::Value::Table(section)) = (known(key), value) {
            for sub in section.keys() {
                if !keys.contains(&sub.as_str()) {
                    unknown.push(format!("{}.{}", key, sub));
                }
            }
        }
    }
    unknown
}

fn warn_unknown_key(path: &Path, key: &str) {
    eprintln!(
        "fleetguard: warning: {}: unrecognized field `{}` (ignored)",
        path.display(),
        key
    );
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
