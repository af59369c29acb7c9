// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Repository handle.
//!
//! A [`Repo`] is a read-mostly view over one working copy. Every derived
//! fact is computed on first access and memoized for the life of the handle.
//! Nothing is refreshed implicitly: a fix that writes a file must invalidate
//! the [`Fact`]s it changed, which [`Repo::write`] does for its callers.
//!
//! Document accessors distinguish a missing file from one that exists but
//! does not parse, and surface other read failures as
//! [`Error::Unreadable`].

use std::cell::OnceCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::git::{VersionControl, github_slug};

pub const README: &str = "README.md";
pub const GITIGNORE: &str = ".gitignore";
pub const MANIFEST: &str = "pyproject.toml";
pub const CLAUDE_MD: &str = "CLAUDE.md";
pub const SHARED_SETTINGS: &str = ".claude/settings.json";
pub const LOCAL_SETTINGS: &str = ".claude/settings.local.json";
pub const PRE_COMMIT: &str = ".pre-commit-config.yaml";
pub const WORKFLOWS_DIR: &str = ".github/workflows";
pub const DEPENDABOT_FILES: &[&str] = &[".github/dependabot.yml", ".github/dependabot.yaml"];
pub const LICENSE_FILES: &[&str] = &["LICENSE", "LICENSE.md", "LICENSE.txt"];
pub const LOGO_LOCATIONS: &[&str] = &[
    "logo.png",
    "logo.svg",
    "logo.jpg",
    "assets/logo.png",
    "assets/logo.svg",
    "images/logo.png",
    "images/logo.svg",
    ".github/logo.png",
    ".github/logo.svg",
];

/// Files whose presence marks a Python project.
const PYTHON_MARKERS: &[&str] = &[
    "setup.py",
    "requirements.txt",
    "setup.cfg",
    "Pipfile",
    MANIFEST,
];

/// A parsed file that may be missing or malformed.
#[derive(Debug, Clone, PartialEq)]
pub enum Document<T> {
    Absent,
    /// The file exists but does not parse. Carries the parser message.
    Malformed(String),
    Present(T),
}

impl<T> Document<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Document::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Document::Absent)
    }
}

/// Cached facts that fixes may need to invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fact {
    Readme,
    IgnoreFile,
    Manifest,
    SharedSettings,
    LocalSettings,
    Dependabot,
    PreCommit,
    Workflows,
    Ecosystems,
    Python,
    Logo,
    License,
    Remote,
}

/// A workflow definition under `.github/workflows`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowFile {
    pub name: String,
    pub content: String,
}

/// Package ecosystems understood by the dependency update bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ecosystem {
    GithubActions,
    Npm,
    Pip,
    Cargo,
    Gomod,
    Bundler,
    Composer,
}

impl Ecosystem {
    pub fn as_str(self) -> &'static str {
        match self {
            Ecosystem::GithubActions => "github-actions",
            Ecosystem::Npm => "npm",
            Ecosystem::Pip => "pip",
            Ecosystem::Cargo => "cargo",
            Ecosystem::Gomod => "gomod",
            Ecosystem::Bundler => "bundler",
            Ecosystem::Composer => "composer",
        }
    }
}

#[derive(Debug, Clone)]
struct Unreadable {
    path: PathBuf,
    message: String,
}

impl From<&Unreadable> for Error {
    fn from(u: &Unreadable) -> Self {
        Error::Unreadable {
            path: u.path.clone(),
            message: u.message.clone(),
        }
    }
}

type Loaded<T> = std::result::Result<T, Unreadable>;
type Cached<T> = OnceCell<Loaded<T>>;

#[derive(Default)]
struct Facts {
    readme: Cached<Document<String>>,
    ignore_file: Cached<Document<String>>,
    manifest: Cached<Document<toml::Table>>,
    shared_settings: Cached<Document<serde_json::Value>>,
    local_settings: Cached<Document<serde_json::Value>>,
    dependabot: Cached<Document<serde_yaml::Value>>,
    pre_commit: Cached<Document<String>>,
    workflows: Cached<Vec<WorkflowFile>>,
    ecosystems: Cached<Vec<Ecosystem>>,
    python: Cached<bool>,
    logo: OnceCell<Option<&'static str>>,
    license: OnceCell<Option<&'static str>>,
    remote: OnceCell<Option<String>>,
}

/// View over one local working copy.
pub struct Repo {
    root: PathBuf,
    name: String,
    facts: Facts,
}

impl Repo {
    /// Open a handle on `path`, which must contain `.git`.
    pub fn resolve(path: &Path) -> Result<Repo> {
        if !path.join(".git").exists() {
            return Err(Error::NotAGitRepository {
                path: path.to_path_buf(),
            });
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Repo {
            root: path.to_path_buf(),
            name,
            facts: Facts::default(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory name of the repository.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn is_file(&self, rel: &str) -> bool {
        self.join(rel).is_file()
    }

    pub fn readme(&self) -> Result<&Document<String>> {
        cached(&self.facts.readme, Fact::Readme, || read_text(&self.join(README)))
    }

    pub fn ignore_file(&self) -> Result<&Document<String>> {
        cached(&self.facts.ignore_file, Fact::IgnoreFile, || {
            read_text(&self.join(GITIGNORE))
        })
    }

    /// Parsed `pyproject.toml`.
    pub fn manifest(&self) -> Result<&Document<toml::Table>> {
        cached(&self.facts.manifest, Fact::Manifest, || {
            read_parsed(&self.join(MANIFEST), |text| {
                text.parse::<toml::Table>().map_err(|e| e.to_string())
            })
        })
    }

    /// `.claude/settings.json`, the committed settings document.
    pub fn shared_settings(&self) -> Result<&Document<serde_json::Value>> {
        cached(&self.facts.shared_settings, Fact::SharedSettings, || {
            read_json(&self.join(SHARED_SETTINGS))
        })
    }

    /// `.claude/settings.local.json`, the per-checkout settings document.
    pub fn local_settings(&self) -> Result<&Document<serde_json::Value>> {
        cached(&self.facts.local_settings, Fact::LocalSettings, || {
            read_json(&self.join(LOCAL_SETTINGS))
        })
    }

    /// The first dependency-bot config found, `.yml` before `.yaml`.
    pub fn dependabot(&self) -> Result<&Document<serde_yaml::Value>> {
        cached(&self.facts.dependabot, Fact::Dependabot, || {
            for rel in DEPENDABOT_FILES {
                let doc = read_parsed(&self.join(rel), |text| {
                    serde_yaml::from_str::<serde_yaml::Value>(text).map_err(|e| e.to_string())
                })?;
                if !doc.is_absent() {
                    return Ok(doc);
                }
            }
            Ok(Document::Absent)
        })
    }

    pub fn pre_commit(&self) -> Result<&Document<String>> {
        cached(&self.facts.pre_commit, Fact::PreCommit, || {
            read_text(&self.join(PRE_COMMIT))
        })
    }

    /// Workflow files (`*.yml`, `*.yaml`), sorted by file name.
    pub fn workflows(&self) -> Result<&[WorkflowFile]> {
        cached(&self.facts.workflows, Fact::Workflows, || {
            read_workflows(&self.join(WORKFLOWS_DIR))
        })
        .map(Vec::as_slice)
    }

    pub fn has_workflows(&self) -> Result<bool> {
        Ok(!self.workflows()?.is_empty())
    }

    /// Whether any workflow file matches `pattern`.
    pub fn workflows_match(&self, pattern: &regex::Regex) -> Result<bool> {
        Ok(self
            .workflows()?
            .iter()
            .any(|wf| pattern.is_match(&wf.content)))
    }

    /// Package ecosystems detected from well-known files.
    pub fn ecosystems(&self) -> Result<&[Ecosystem]> {
        let has_workflows = self.has_workflows()?;
        cached(&self.facts.ecosystems, Fact::Ecosystems, || {
            let mut found = Vec::new();
            if has_workflows {
                found.push(Ecosystem::GithubActions);
            }
            let markers: &[(&[&str], Ecosystem)] = &[
                (&["package.json"], Ecosystem::Npm),
                (&[MANIFEST, "requirements.txt"], Ecosystem::Pip),
                (&["Cargo.toml"], Ecosystem::Cargo),
                (&["go.mod"], Ecosystem::Gomod),
                (&["Gemfile"], Ecosystem::Bundler),
                (&["composer.json"], Ecosystem::Composer),
            ];
            for (files, ecosystem) in markers {
                if files.iter().any(|f| self.is_file(f)) {
                    found.push(*ecosystem);
                }
            }
            Ok(found)
        })
        .map(Vec::as_slice)
    }

    /// Python marker files, or more than two non-test `.py` sources.
    pub fn is_python(&self) -> Result<bool> {
        cached(&self.facts.python, Fact::Python, || {
            if PYTHON_MARKERS.iter().any(|m| self.join(m).exists()) {
                return Ok(true);
            }
            Ok(count_python_sources(&self.root, 3) > 2)
        })
        .copied()
    }

    /// Relative path of the logo, if one exists at a standard location.
    pub fn logo(&self) -> Option<&'static str> {
        *self
            .facts
            .logo
            .get_or_init(|| LOGO_LOCATIONS.iter().copied().find(|l| self.is_file(l)))
    }

    /// Relative path of the license file, if any.
    pub fn license(&self) -> Option<&'static str> {
        *self
            .facts
            .license
            .get_or_init(|| LICENSE_FILES.iter().copied().find(|l| self.is_file(l)))
    }

    /// `owner/name` of the GitHub `origin` remote.
    pub fn remote(&self, vcs: &dyn VersionControl) -> Result<Option<&str>> {
        if self.facts.remote.get().is_none() {
            let slug = vcs.remote_url(&self.root)?.as_deref().and_then(github_slug);
            let _ = self.facts.remote.set(slug);
        }
        Ok(self.facts.remote.get().and_then(|s| s.as_deref()))
    }

    /// Drop one cached fact so the next access recomputes it.
    pub fn invalidate(&mut self, fact: Fact) {
        tracing::trace!(repo = %self.name, ?fact, "invalidate");
        let facts = &mut self.facts;
        match fact {
            Fact::Readme => drop(facts.readme.take()),
            Fact::IgnoreFile => drop(facts.ignore_file.take()),
            Fact::Manifest => drop(facts.manifest.take()),
            Fact::SharedSettings => drop(facts.shared_settings.take()),
            Fact::LocalSettings => drop(facts.local_settings.take()),
            Fact::Dependabot => drop(facts.dependabot.take()),
            Fact::PreCommit => drop(facts.pre_commit.take()),
            Fact::Workflows => drop(facts.workflows.take()),
            Fact::Ecosystems => drop(facts.ecosystems.take()),
            Fact::Python => drop(facts.python.take()),
            Fact::Logo => drop(facts.logo.take()),
            Fact::License => drop(facts.license.take()),
            Fact::Remote => drop(facts.remote.take()),
        }
    }

    /// Drop every cached fact.
    pub fn invalidate_all(&mut self) {
        self.facts = Facts::default();
    }

    /// Write `contents` to `rel`, creating parent directories, then
    /// invalidate `facts`.
    pub fn write(&mut self, rel: &str, contents: &str, facts: &[Fact]) -> Result<()> {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(&path, contents).map_err(|e| Error::io(&path, e))?;
        tracing::debug!(repo = %self.name, file = rel, "wrote");
        for fact in facts {
            self.invalidate(*fact);
        }
        Ok(())
    }
}

fn cached<'a, T>(
    cell: &'a Cached<T>,
    fact: Fact,
    load: impl FnOnce() -> Loaded<T>,
) -> Result<&'a T> {
    let loaded = cell.get_or_init(|| {
        tracing::trace!(?fact, "computing");
        load()
    });
    loaded.as_ref().map_err(Error::from)
}

fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

fn read_text(path: &Path) -> Loaded<Document<String>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Document::Present(
            String::from_utf8_lossy(&bytes).into_owned(),
        )),
        Err(e) if is_missing(&e) => Ok(Document::Absent),
        Err(e) => Err(Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

fn read_parsed<T>(
    path: &Path,
    parse: impl FnOnce(&str) -> std::result::Result<T, String>,
) -> Loaded<Document<T>> {
    Ok(match read_text(path)? {
        Document::Present(text) => match parse(&text) {
            Ok(value) => Document::Present(value),
            Err(message) => Document::Malformed(message),
        },
        Document::Absent => Document::Absent,
        Document::Malformed(message) => Document::Malformed(message),
    })
}

fn read_json(path: &Path) -> Loaded<Document<serde_json::Value>> {
    read_parsed(path, |text| {
        serde_json::from_str(text).map_err(|e| e.to_string())
    })
}

fn read_workflows(dir: &Path) -> Loaded<Vec<WorkflowFile>> {
    let unreadable = |path: &Path, e: io::Error| Unreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if is_missing(&e) => return Ok(Vec::new()),
        Err(e) => return Err(unreadable(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| unreadable(dir, e))?.path();
        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext == "yml" || ext == "yaml");
        if !is_yaml || !path.is_file() {
            continue;
        }
        let bytes = fs::read(&path).map_err(|e| unreadable(&path, e))?;
        files.push(WorkflowFile {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Count non-test `.py` files, stopping once `limit` is reached.
fn count_python_sources(root: &Path, limit: usize) -> usize {
    const SKIP_DIRS: &[&str] = &[".git", ".venv", "node_modules"];

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !(entry.file_type().is_some_and(|t| t.is_dir()) && SKIP_DIRS.contains(&&*name))
        })
        .build();

    let mut count = 0;
    for entry in walker.flatten() {
        let name = entry.file_name().to_string_lossy();
        let is_source = entry.file_type().is_some_and(|t| t.is_file())
            && name.ends_with(".py")
            && !name.starts_with("test_");
        if is_source {
            count += 1;
            if count >= limit {
                break;
            }
        }
    }
    count
}

#[cfg(test)]
#[path = "repo_tests.rs"]
mod tests;
