//! The module dependency graph produced by an analysis run.

use cow_utils::CowUtils;
use indexmap::{IndexMap, IndexSet};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use ruff_python_stdlib::sys;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::locator::ModuleId;
use crate::resolver::Dependency;

/// Mapping from every analyzed module to the dependencies it imports.
///
/// Modules and each dependency set are kept sorted by name, so graphs built from the
/// same files compare equal and serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    modules: IndexMap<ModuleId, IndexSet<Dependency>>,
}

impl DependencyGraph {
    pub fn from_modules<I>(modules: I) -> Self
    where
        I: IntoIterator<Item = (ModuleId, IndexSet<Dependency>)>,
    {
        let mut modules: IndexMap<ModuleId, IndexSet<Dependency>> = modules.into_iter().collect();
        modules.sort_keys();
        for dependencies in modules.values_mut() {
            dependencies.sort_by(|a, b| a.name().cmp(b.name()));
        }
        Self { modules }
    }

    /// Iterate modules and their dependencies in module name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<Dependency>)> {
        self.modules
            .iter()
            .map(|(module, dependencies)| (module.as_str(), dependencies))
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn dependencies(&self, module: &str) -> Option<&IndexSet<Dependency>> {
        self.modules.get(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// All external package names referenced anywhere in the tree, sorted
    pub fn external_packages(&self) -> Vec<&str> {
        let mut packages: Vec<&str> = self
            .modules
            .values()
            .flatten()
            .filter(|dependency| !dependency.is_internal())
            .map(Dependency::name)
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        packages.sort_unstable();
        packages
    }

    /// External packages that are not part of the standard library of Python 3.`python_minor`
    pub fn requirements(&self, python_minor: u8) -> Vec<&str> {
        self.external_packages()
            .into_iter()
            .filter(|package| {
                // Stdlib names never contain hyphens, undo the import name normalization
                let import_name = package.cow_replace('-', "_");
                !sys::is_known_standard_library(python_minor, &import_name)
            })
            .collect()
    }

    /// Groups of internal modules that import each other, directly or transitively.
    ///
    /// A module importing itself forms a group of one. Each group is sorted and the groups
    /// are ordered by their first module.
    pub fn cycles(&self) -> Vec<Vec<&str>> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut node_indices: FxHashMap<&str, NodeIndex> = FxHashMap::default();

        for (module, dependencies) in &self.modules {
            let from = node_index(&mut graph, &mut node_indices, module);
            for dependency in dependencies {
                if let Dependency::Internal(target) = dependency {
                    let to = node_index(&mut graph, &mut node_indices, target);
                    graph.update_edge(from, to, ());
                }
            }
        }

        let mut cycles: Vec<Vec<&str>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| match component.as_slice() {
                [single] => graph.contains_edge(*single, *single),
                _ => true,
            })
            .map(|component| {
                let mut names: Vec<&str> = component.into_iter().map(|index| graph[index]).collect();
                names.sort_unstable();
                names
            })
            .collect();
        cycles.sort();
        cycles
    }
}

fn node_index<'g>(
    graph: &mut DiGraph<&'g str, ()>,
    node_indices: &mut FxHashMap<&'g str, NodeIndex>,
    name: &'g str,
) -> NodeIndex {
    *node_indices
        .entry(name)
        .or_insert_with(|| graph.add_node(name))
}
