// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rule registry and canonical ordering.
//!
//! The registry takes the catalogue in registration order and produces one
//! total order: dependencies first, ties broken by registration position.
//! Duplicate ids, unknown dependencies, and cycles are rejected when the
//! registry is built, before any repository is touched.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{Error, Result};
use crate::rule::{Category, Rule};
use crate::rules;

/// Rules in canonical execution order.
pub struct Registry {
    rules: Vec<Arc<dyn Rule>>,
}

/// Which rules to run. Empty lists mean "no restriction".
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub rules: Vec<String>,
    pub categories: Vec<Category>,
    /// Ids excluded by configuration.
    pub disabled: Vec<String>,
}

impl Registry {
    /// The built-in catalogue.
    pub fn builtin() -> Result<Self> {
        Self::new(rules::all_rules())
    }

    /// Validate `catalogue` and compute its canonical order.
    pub fn new(catalogue: Vec<Arc<dyn Rule>>) -> Result<Self> {
        let mut graph: DiGraph<&'static str, ()> = DiGraph::with_capacity(catalogue.len(), 0);
        let mut index: HashMap<&'static str, NodeIndex> = HashMap::new();
        for rule in &catalogue {
            let node = graph.add_node(rule.id());
            if index.insert(rule.id(), node).is_some() {
                return Err(Error::DuplicateRule(rule.id().to_string()));
            }
        }

        // Edge dependency -> dependent.
        for rule in &catalogue {
            let dependent = index[rule.id()];
            for dep in rule.depends_on() {
                let Some(&dependency) = index.get(dep) else {
                    return Err(Error::UnknownDependency {
                        rule: rule.id().to_string(),
                        dependency: dep.to_string(),
                    });
                };
                graph.add_edge(dependency, dependent, ());
            }
        }

        if let Some(cycle) = find_cycle(&graph) {
            return Err(Error::DependencyCycle(cycle));
        }

        // Kahn's algorithm; the ready set is ordered by registration index.
        let mut indegree: Vec<usize> = graph
            .node_indices()
            .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();
        let mut ready: BTreeSet<usize> = (0..catalogue.len())
            .filter(|&i| indegree[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(catalogue.len());
        while let Some(next) = ready.pop_first() {
            order.push(next);
            for dependent in graph.neighbors_directed(NodeIndex::new(next), Direction::Outgoing) {
                let i = dependent.index();
                indegree[i] -= 1;
                if indegree[i] == 0 {
                    ready.insert(i);
                }
            }
        }
        if order.len() != catalogue.len() {
            return Err(Error::Internal("dependency ordering incomplete".to_string()));
        }

        let mut slots: Vec<Option<Arc<dyn Rule>>> = catalogue.into_iter().map(Some).collect();
        let rules = order.into_iter().filter_map(|i| slots[i].take()).collect();
        Ok(Self { rules })
    }

    /// Every registered rule, in canonical order.
    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.iter().find(|r| r.id().eq_ignore_ascii_case(id))
    }

    /// Rules matching `selection`, keeping canonical relative order.
    pub fn select(&self, selection: &Selection) -> Result<Vec<Arc<dyn Rule>>> {
        for id in &selection.rules {
            if self.get(id).is_none() {
                return Err(Error::Argument(format!("unknown rule: {}", id)));
            }
        }
        for id in &selection.disabled {
            if self.get(id).is_none() {
                return Err(Error::Config {
                    message: format!("unknown rule in rules.disabled: {}", id),
                    path: None,
                });
            }
        }

        Ok(self
            .rules
            .iter()
            .filter(|r| selection.rules.is_empty() || listed(&selection.rules, r.id()))
            .filter(|r| {
                selection.categories.is_empty() || selection.categories.contains(&r.category())
            })
            .filter(|r| !listed(&selection.disabled, r.id()))
            .cloned()
            .collect())
    }
}

fn listed(list: &[String], id: &str) -> bool {
    list.iter().any(|entry| entry.eq_ignore_ascii_case(id))
}

/// The first dependency cycle, as ids from the lowest-registered member back
/// to itself.
fn find_cycle(graph: &DiGraph<&'static str, ()>) -> Option<Vec<String>> {
    let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .collect();
    for scc in &mut components {
        scc.sort();
    }
    components.sort();
    let scc = components.into_iter().next()?;

    let start = scc[0];
    let mut path = vec![start];
    let mut visited = BTreeSet::from([start]);
    walk_cycle(graph, &scc, start, start, &mut visited, &mut path);
    path.push(start);
    Some(path.into_iter().map(|n| graph[n].to_string()).collect())
}

/// Depth-first search inside one component until an edge returns to `start`.
fn walk_cycle(
    graph: &DiGraph<&'static str, ()>,
    members: &[NodeIndex],
    node: NodeIndex,
    start: NodeIndex,
    visited: &mut BTreeSet<NodeIndex>,
    path: &mut Vec<NodeIndex>,
) -> bool {
    let mut next: Vec<NodeIndex> = graph
        .neighbors_directed(node, Direction::Outgoing)
        .filter(|n| members.contains(n))
        .collect();
    next.sort();
    if next.contains(&start) {
        return true;
    }
    for n in next {
        if visited.insert(n) {
            path.push(n);
            if walk_cycle(graph, members, n, start, visited, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
