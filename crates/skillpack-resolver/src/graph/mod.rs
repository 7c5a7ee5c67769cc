//! Catalog-wide dependency graph using petgraph
//!
//! Resolution itself never needs the whole graph; this view backs the
//! `check` diagnostics: cycles, dangling references and reverse lookups.

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use skillpack_core::Catalog;
use std::collections::HashMap;

/// A declared dependency on an id the catalog does not contain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingReference {
    /// Package declaring the dependency
    pub from: String,
    /// Referenced id
    pub missing: String,
}

/// Directed graph with one node per catalog package
#[derive(Debug)]
pub struct CatalogGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    missing: Vec<MissingReference>,
}

impl CatalogGraph {
    /// Build the graph for every package in `catalog`
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut graph = DiGraph::with_capacity(catalog.len(), 0);
        let mut node_map = HashMap::with_capacity(catalog.len());

        for id in catalog.ids() {
            let index = graph.add_node(id.to_string());
            node_map.insert(id.to_string(), index);
        }

        let mut missing = Vec::new();
        for package in catalog.packages() {
            let from = node_map[&package.id];
            for dep in &package.dependencies {
                match node_map.get(dep) {
                    Some(&to) => {
                        graph.add_edge(from, to, ());
                    },
                    None => missing.push(MissingReference {
                        from: package.id.clone(),
                        missing: dep.clone(),
                    }),
                }
            }
        }

        Self {
            graph,
            node_map,
            missing,
        }
    }

    /// Get number of packages in the graph
    pub fn package_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get number of resolvable dependency edges
    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Dependencies naming ids outside the catalog, in package id order
    pub fn missing_references(&self) -> &[MissingReference] {
        &self.missing
    }

    /// Every group of packages that depend on each other in a loop.
    ///
    /// Each group is sorted; a self-dependency forms a group of one.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || self.graph.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut ids: Vec<String> =
                    component.into_iter().map(|idx| self.graph[idx].clone()).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Packages that declare `id` as a direct dependency, sorted
    pub fn dependents(&self, id: &str) -> Vec<String> {
        let Some(&index) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut ids: Vec<String> = self
            .graph
            .neighbors_directed(index, Direction::Incoming)
            .map(|idx| self.graph[idx].clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Packages ordered so each comes after all of its dependencies.
    ///
    /// Fails with the id of a package on a cycle when no such order exists.
    pub fn install_order(&self) -> Result<Vec<String>, String> {
        match toposort(&self.graph, None) {
            // Edges point from dependent to dependency; reverse for install order
            Ok(sorted) => Ok(sorted
                .into_iter()
                .rev()
                .map(|idx| self.graph[idx].clone())
                .collect()),
            Err(cycle) => Err(self.graph[cycle.node_id()].clone()),
        }
    }

    /// Format a cycle group as "a -> b -> a"
    pub fn format_cycle(cycle: &[String]) -> String {
        match cycle.first() {
            None => "No cycle".to_string(),
            Some(first) => {
                let mut names: Vec<&str> = cycle.iter().map(String::as_str).collect();
                names.push(first);
                names.join(" -> ")
            },
        }
    }
}
