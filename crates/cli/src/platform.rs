// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote hosting platform capability.
//!
//! The production implementation shells out to the GitHub CLI (`gh`) with a
//! per-call timeout. A missing binary or failed `gh auth status` makes
//! [`RemotePlatform::authenticated`] return false, and rules that need the
//! platform skip instead of failing.

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::process::{Child, Command, Output, Stdio};
use std::sync::OnceLock;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Latest completed run of one workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRun {
    pub name: String,
    pub conclusion: String,
}

/// Narrow view of the hosting platform operations rules rely on.
///
/// Repositories are addressed by `owner/name` slug.
pub trait RemotePlatform: Send + Sync {
    /// Whether the platform can be queried at all.
    fn authenticated(&self) -> bool;

    fn is_archived(&self, slug: &str) -> Result<bool>;

    /// Repository description, empty when unset.
    fn description(&self, slug: &str) -> Result<String>;

    fn set_description(&self, slug: &str, description: &str) -> Result<()>;

    /// Latest completed run per workflow on `branch`, sorted by workflow name.
    fn workflow_runs(&self, slug: &str, branch: &str) -> Result<Vec<WorkflowRun>>;

    /// Conclusion of the most recent run on `branch`, if it has completed.
    fn last_run_conclusion(&self, slug: &str, branch: &str) -> Result<Option<String>>;
}

/// [`RemotePlatform`] backed by the `gh` command-line tool.
pub struct GhCli {
    program: String,
    timeout: Duration,
    authenticated: OnceLock<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunEntry {
    #[serde(default)]
    workflow_name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    conclusion: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepoView {
    #[serde(default)]
    is_archived: bool,
    #[serde(default)]
    description: Option<String>,
}

impl GhCli {
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("gh", timeout)
    }

    pub fn with_program(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
            authenticated: OnceLock::new(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!(program = %self.program, ?args, "spawning");
        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Platform(format!("{} unavailable: {}", self.program, e)))?;
        run_with_timeout(child, Some(self.timeout))
            .map_err(|e| Error::Platform(format!("{} {}: {}", self.program, args.join(" "), e)))
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Platform(format!(
                "{} {} failed: {}",
                self.program,
                args.first().copied().unwrap_or_default(),
                stderr.trim()
            )));
        }
        Ok(output)
    }

    fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let output = self.run_checked(args)?;
        serde_json::from_slice(&output.stdout)
            .map_err(|e| Error::Platform(format!("unexpected {} output: {}", self.program, e)))
    }
}

impl RemotePlatform for GhCli {
    fn authenticated(&self) -> bool {
        *self.authenticated.get_or_init(|| match self.run(&["auth", "status"]) {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::debug!("platform unavailable: {}", e);
                false
            }
        })
    }

    fn is_archived(&self, slug: &str) -> Result<bool> {
        let view: RepoView = self.run_json(&["repo", "view", slug, "--json", "isArchived"])?;
        Ok(view.is_archived)
    }

    fn description(&self, slug: &str) -> Result<String> {
        let view: RepoView = self.run_json(&["repo", "view", slug, "--json", "description"])?;
        Ok(view.description.unwrap_or_default().trim().to_string())
    }

    fn set_description(&self, slug: &str, description: &str) -> Result<()> {
        self.run_checked(&["repo", "edit", slug, "--description", description])?;
        Ok(())
    }

    fn workflow_runs(&self, slug: &str, branch: &str) -> Result<Vec<WorkflowRun>> {
        let runs: Vec<RunEntry> = self.run_json(&[
            "run",
            "list",
            "--repo",
            slug,
            "--branch",
            branch,
            "--limit",
            "50",
            "--json",
            "workflowName,status,conclusion",
        ])?;
        Ok(latest_per_workflow(runs))
    }

    fn last_run_conclusion(&self, slug: &str, branch: &str) -> Result<Option<String>> {
        let runs: Vec<RunEntry> = self.run_json(&[
            "run",
            "list",
            "--repo",
            slug,
            "--branch",
            branch,
            "--limit",
            "1",
            "--json",
            "conclusion,status",
        ])?;
        Ok(runs
            .into_iter()
            .next()
            .filter(|run| run.status == "completed")
            .and_then(|run| run.conclusion)
            .filter(|c| !c.is_empty()))
    }
}

/// Keep the first completed run per workflow. `gh` lists newest first.
fn latest_per_workflow(runs: Vec<RunEntry>) -> Vec<WorkflowRun> {
    let mut latest: BTreeMap<String, String> = BTreeMap::new();
    for run in runs {
        if run.status != "completed" || run.workflow_name.is_empty() {
            continue;
        }
        let Some(conclusion) = run.conclusion.filter(|c| !c.is_empty()) else {
            continue;
        };
        latest.entry(run.workflow_name).or_insert(conclusion);
    }
    latest
        .into_iter()
        .map(|(name, conclusion)| WorkflowRun { name, conclusion })
        .collect()
}

/// Wait for a child, killing it once `timeout` elapses.
///
/// Output pipes are drained on reader threads while waiting, so a child
/// writing more than the pipe buffer holds never stalls.
pub fn run_with_timeout(mut child: Child, timeout: Option<Duration>) -> io::Result<Output> {
    let Some(limit) = timeout else {
        return child.wait_with_output();
    };

    let stdout = spawn_drain(child.stdout.take());
    let stderr = spawn_drain(child.stderr.take());
    let start = Instant::now();
    let poll_interval = Duration::from_millis(50);
    loop {
        match child.try_wait()? {
            Some(status) => {
                return Ok(Output {
                    status,
                    stdout: join_drain(stdout),
                    stderr: join_drain(stderr),
                });
            }
            None if start.elapsed() > limit => {
                child.kill().ok();
                child.wait().ok();
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("timed out after {:?}", limit),
                ));
            }
            None => thread::sleep(poll_interval),
        }
    }
}

fn spawn_drain<R: Read + Send + 'static>(stream: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    stream.map(|mut s| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            s.read_to_end(&mut buf).ok();
            buf
        })
    })
}

fn join_drain(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;
