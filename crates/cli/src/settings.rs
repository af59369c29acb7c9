// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Agent permission analysis.
//!
//! Project permissions (`permissions.allow` in `.claude/settings.local.json`)
//! are compared against the user-wide settings document. An entry is
//! redundant when a global entry already covers it. `WebFetch(domain:…)`
//! entries that are covered globally but missing from the project sandbox
//! network allow-list are migrated there instead of being dropped.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::repo::Document;

/// Permission patterns that grant unrestricted access.
pub const DISALLOWED: &[&str] = &[
    "Bash(*:*)",
    "Read(/*)",
    "Write(/*)",
    "Edit(/*)",
    "Bash(rm:*)",
    "Bash(sudo:*)",
    "Skill(*)",
];

/// String entries of `permissions.allow`, deduplicated and sorted.
pub fn allowed(doc: &Value) -> BTreeSet<String> {
    strings_at(doc, &["permissions", "allow"])
}

/// String entries of `sandbox.permissions.network.allow`.
pub fn network_allowed(doc: &Value) -> BTreeSet<String> {
    strings_at(doc, &["sandbox", "permissions", "network", "allow"])
}

/// Whether `sandbox.enabled` is literally `true`.
pub fn sandbox_enabled(doc: &Value) -> bool {
    doc.pointer("/sandbox/enabled") == Some(&Value::Bool(true))
}

fn strings_at(doc: &Value, path: &[&str]) -> BTreeSet<String> {
    let mut node = doc;
    for key in path {
        match node.get(key) {
            Some(next) => node = next,
            None => return BTreeSet::new(),
        }
    }
    node.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Permissions from the user-wide settings file.
///
/// A missing file grants nothing. A malformed file is reported as such so
/// callers never mistake it for an empty allow-list.
pub fn load_global(path: &Path) -> Result<Document<BTreeSet<String>>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Document::Absent),
        Err(e) => return Err(Error::io(path, e)),
    };
    Ok(match serde_json::from_str::<Value>(&text) {
        Ok(doc) => Document::Present(allowed(&doc)),
        Err(e) => Document::Malformed(e.to_string()),
    })
}

/// Project entries matching a disallowed pattern, in sorted order.
pub fn dangerous(project: &BTreeSet<String>) -> Vec<&str> {
    project
        .iter()
        .map(String::as_str)
        .filter(|p| DISALLOWED.contains(p))
        .collect()
}

/// Domain of a `WebFetch(domain:NAME)` entry.
pub fn webfetch_domain(pattern: &str) -> Option<&str> {
    pattern
        .strip_prefix("WebFetch(domain:")?
        .strip_suffix(')')
        .filter(|d| !d.is_empty() && !d.contains(')'))
}

fn split_tool(pattern: &str) -> (&str, Option<&str>) {
    match pattern.find('(') {
        Some(open) => {
            let tool = &pattern[..open];
            let args = pattern[open + 1..].strip_suffix(')').unwrap_or("");
            (tool, Some(args))
        }
        None => (pattern, None),
    }
}

/// Whether `general` grants everything `specific` grants.
pub fn is_pattern_subset(specific: &str, general: &str) -> bool {
    let (spec_tool, spec_args) = split_tool(specific);
    let (gen_tool, gen_args) = split_tool(general);

    if spec_tool != gen_tool {
        return false;
    }
    let Some(gen_args) = gen_args else {
        return true;
    };
    let Some(spec_args) = spec_args else {
        return false;
    };

    if spec_args == gen_args || gen_args == "*:*" {
        return true;
    }
    if gen_args == "domain:*" && spec_args.starts_with("domain:") {
        return true;
    }
    if let Some(base) = gen_args.strip_suffix(":*")
        && (spec_args == base
            || spec_args.starts_with(&format!("{} ", base))
            || spec_args.starts_with(&format!("{}:", base)))
    {
        return true;
    }
    if matches!(spec_tool, "Read" | "Write" | "Edit") {
        if gen_args == "/*" {
            return true;
        }
        if let Some(prefix) = gen_args.strip_suffix('*')
            && spec_args.starts_with(prefix)
        {
            return true;
        }
    }
    false
}

/// A `WebFetch` entry to move into the sandbox network allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub pattern: String,
    pub domain: String,
}

/// What cleaning a project settings document would change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Optimization {
    /// Entries covered by a global permission.
    pub redundant: Vec<String>,
    pub migrate: Vec<Migration>,
}

impl Optimization {
    pub fn is_clean(&self) -> bool {
        self.redundant.is_empty() && self.migrate.is_empty()
    }

    /// One-line description, e.g. `remove 2 redundant permissions, migrate 1 domain`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.redundant.is_empty() {
            parts.push(format!(
                "remove {} redundant permission{}",
                self.redundant.len(),
                plural(self.redundant.len())
            ));
        }
        if !self.migrate.is_empty() {
            let domains: Vec<_> = self.migrate.iter().map(|m| m.domain.as_str()).collect();
            parts.push(format!(
                "migrate {} to sandbox network allow-list",
                domains.join(", ")
            ));
        }
        parts.join(", ")
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Compare a project settings document against global permissions.
///
/// Disallowed entries are left alone; they need a human.
pub fn analyze(project: &Value, global: &BTreeSet<String>) -> Optimization {
    let network = network_allowed(project);
    let covered = |pattern: &str| global.iter().any(|g| is_pattern_subset(pattern, g));

    let mut optimization = Optimization::default();
    for pattern in allowed(project) {
        if DISALLOWED.contains(&pattern.as_str()) || !covered(&pattern) {
            continue;
        }
        match webfetch_domain(&pattern) {
            Some(domain) if !network.contains(domain) => {
                let domain = domain.to_string();
                optimization.migrate.push(Migration { pattern, domain });
            }
            _ => optimization.redundant.push(pattern),
        }
    }
    optimization
}

/// The cleaned document. `permissions.allow` is rewritten sorted; the
/// network allow-list is only touched when something migrates.
pub fn apply(project: &Value, optimization: &Optimization) -> Result<Value> {
    let mut doc = project.clone();
    let remove: BTreeSet<&str> = optimization
        .redundant
        .iter()
        .map(String::as_str)
        .chain(optimization.migrate.iter().map(|m| m.pattern.as_str()))
        .collect();
    let kept: Vec<Value> = allowed(project)
        .into_iter()
        .filter(|p| !remove.contains(p.as_str()))
        .map(Value::String)
        .collect();

    let root = as_object(&mut doc)?;
    object_entry(root, "permissions")?.insert("allow".into(), Value::Array(kept));

    if !optimization.migrate.is_empty() {
        let mut network = network_allowed(project);
        network.extend(optimization.migrate.iter().map(|m| m.domain.clone()));
        let sandbox = object_entry(root, "sandbox")?;
        let permissions = object_entry(sandbox, "permissions")?;
        let target = object_entry(permissions, "network")?;
        target.insert(
            "allow".into(),
            Value::Array(network.into_iter().map(Value::String).collect()),
        );
    }
    Ok(doc)
}

/// Set `sandbox.enabled = true`, keeping every other key.
pub fn enable_sandbox(doc: &Value) -> Result<Value> {
    let mut doc = doc.clone();
    let root = as_object(&mut doc)?;
    object_entry(root, "sandbox")?.insert("enabled".into(), Value::Bool(true));
    Ok(doc)
}

/// Two-space indented JSON with a trailing newline.
pub fn render(doc: &Value) -> Result<String> {
    serde_json::to_string_pretty(doc)
        .map(|text| text + "\n")
        .map_err(|e| Error::Internal(format!("serializing settings: {}", e)))
}

fn as_object(doc: &mut Value) -> Result<&mut Map<String, Value>> {
    doc.as_object_mut()
        .ok_or_else(|| Error::Remediation("settings document is not a JSON object".into()))
}

/// The object under `key`, created when missing.
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> Result<&'a mut Map<String, Value>> {
    let entry = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    entry
        .as_object_mut()
        .ok_or_else(|| Error::Remediation(format!("`{}` is not a JSON object", key)))
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
