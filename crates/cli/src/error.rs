// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

/// Fleetguard error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found or invalid
    #[error("config error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid command-line arguments
    #[error("argument error: {0}")]
    Argument(String),

    /// File I/O error
    #[error("io error: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory has no version-control metadata.
    #[error("not a git repository: {}", .path.display())]
    NotAGitRepository { path: PathBuf },

    /// A repository file exists but could not be read.
    #[error("could not read {}: {message}", .path.display())]
    Unreadable { path: PathBuf, message: String },

    /// Version-control operation failed.
    #[error("git: {0}")]
    Vcs(String),

    /// Remote platform unavailable or returned an error.
    #[error("platform: {0}")]
    Platform(String),

    /// A fix could not complete.
    #[error("remediation failed: {0}")]
    Remediation(String),

    /// Two catalogue entries share an id.
    #[error("duplicate rule id: {0}")]
    DuplicateRule(String),

    /// A rule depends on an id that is not registered.
    #[error("rule {rule} depends on unknown rule {dependency}")]
    UnknownDependency { rule: String, dependency: String },

    /// Rule dependencies form a cycle.
    #[error("dependency cycle between rules: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    /// Internal error (bug)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<git2::Error> for Error {
    fn from(err: git2::Error) -> Self {
        Error::Vcs(err.message().to_string())
    }
}

/// Result type using fleetguard Error
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Every rule passed or was skipped
    Success = 0,
    /// At least one rule failed
    CheckFailed = 1,
    /// Configuration or argument error
    ConfigError = 2,
    /// Internal error
    InternalError = 3,
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config { .. }
            | Error::Argument(_)
            | Error::DuplicateRule(_)
            | Error::UnknownDependency { .. }
            | Error::DependencyCycle(_) => ExitCode::ConfigError,
            Error::NotAGitRepository { .. } | Error::Remediation(_) => ExitCode::CheckFailed,
            Error::Io { .. }
            | Error::Unreadable { .. }
            | Error::Vcs(_)
            | Error::Platform(_)
            | Error::Internal(_) => ExitCode::InternalError,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
