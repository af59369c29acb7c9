// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Config and repository discovery.
//!
//! A fleet directory holds one git working copy per immediate subdirectory.
//! `fleetguard.toml` is looked up in the fleet directory itself.

use std::path::{Path, PathBuf};

use crate::config::{self, CONFIG_FILE, Config};
use crate::error::{Error, Result};
use crate::git::{VersionControl, github_slug};
use crate::platform::RemotePlatform;

/// Find `fleetguard.toml` in `repos_dir`.
pub fn find_config(repos_dir: &Path) -> Option<PathBuf> {
    let path = repos_dir.join(CONFIG_FILE);
    path.is_file().then_some(path)
}

/// Resolve config path from CLI arg, env var, or discovery.
///
/// Priority:
/// 1. CLI flag `-C`/`--config` (handled by clap with env = "FLEETGUARD_CONFIG")
/// 2. `fleetguard.toml` in the fleet directory
/// 3. None (use defaults)
pub fn resolve_config(explicit: Option<&Path>, repos_dir: &Path) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) => {
            if path.is_file() {
                Ok(Some(path.to_path_buf()))
            } else {
                Err(Error::Config {
                    message: format!("config file not found: {}", path.display()),
                    path: Some(path.to_path_buf()),
                })
            }
        }
        None => Ok(find_config(repos_dir)),
    }
}

/// Load the effective config, falling back to defaults when none is found.
pub fn load_config(explicit: Option<&Path>, repos_dir: &Path) -> Result<Config> {
    match resolve_config(explicit, repos_dir)? {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            config::load(&path)
        }
        None => {
            tracing::debug!("no config found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Immediate subdirectories of `repos_dir` that contain `.git`, sorted by
/// name. `filter` keeps only names containing it.
pub fn discover_repos(repos_dir: &Path, filter: Option<&str>) -> Result<Vec<PathBuf>> {
    if !repos_dir.is_dir() {
        return Err(Error::Argument(format!(
            "directory does not exist: {}",
            repos_dir.display()
        )));
    }

    let entries = std::fs::read_dir(repos_dir).map_err(|e| Error::io(repos_dir, e))?;
    let mut repos: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && path.join(".git").exists())
        .filter(|path| {
            filter.is_none_or(|wanted| {
                path.file_name()
                    .is_some_and(|name| name.to_string_lossy().contains(wanted))
            })
        })
        .collect();
    repos.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    tracing::debug!(count = repos.len(), "discovered repositories");
    Ok(repos)
}

/// Drop repositories the platform reports as archived.
///
/// Does nothing unless `[discovery] skip_archived` is set and the platform is
/// authenticated. A repository whose status cannot be determined is kept.
pub fn skip_archived(
    repos: Vec<PathBuf>,
    config: &Config,
    vcs: &dyn VersionControl,
    platform: &dyn RemotePlatform,
) -> Vec<PathBuf> {
    if !config.discovery.skip_archived || !platform.authenticated() {
        return repos;
    }

    repos
        .into_iter()
        .filter(|path| {
            let slug = match vcs.remote_url(path) {
                Ok(Some(url)) => github_slug(&url),
                Ok(None) => None,
                Err(e) => {
                    tracing::debug!(repo = %path.display(), "no remote: {}", e);
                    None
                }
            };
            let Some(slug) = slug else {
                return true;
            };
            match platform.is_archived(&slug) {
                Ok(true) => {
                    tracing::debug!(repo = %path.display(), "skipping archived repository");
                    false
                }
                Ok(false) => true,
                Err(e) => {
                    tracing::warn!(repo = %path.display(), "archive status unknown: {}", e);
                    true
                }
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
