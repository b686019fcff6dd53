//! Dependency graph between variables
//!
//! Nodes are the keys of one [`VariableMap`]; an edge `A -> B` means the raw
//! value of `A` contains `${B}`. Edges to keys outside the map are kept so
//! callers can inspect them, but traversals treat them as dead ends.
//!
//! Traversals use an explicit stack, so arbitrarily long reference chains
//! cannot overflow the call stack.

use std::collections::{HashMap, HashSet, VecDeque};

use envshield_domain::environment::{ResolutionError, VariableMap};
use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::parser::extract_references;

/// Color states for depth-first traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is on the current DFS path.
    Gray,
    /// Node and everything reachable from it has been visited.
    Black,
}

/// Key -> referenced keys, built once per resolution call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyGraph {
    edges: IndexMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Builds the graph for `variables`.
    ///
    /// Each key's references are deduplicated, keeping first occurrence
    /// order. Node order follows the map's iteration order.
    #[must_use]
    pub fn build(variables: &VariableMap) -> Self {
        let edges = variables
            .iter()
            .map(|(key, value)| {
                let mut seen = HashSet::new();
                let references = extract_references(value)
                    .into_iter()
                    .filter(|r| seen.insert(r.clone()))
                    .collect();
                (key.clone(), references)
            })
            .collect();

        Self { edges }
    }

    /// Returns the keys referenced by `key`, including dangling ones.
    #[must_use]
    pub fn references(&self, key: &str) -> &[String] {
        self.edges
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns true if `key` is a node of the graph.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.edges.contains_key(key)
    }

    /// Iterates over the nodes in map order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Returns the number of edges, dangling ones included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Returns the keys whose values reference `key` directly, in map order.
    #[must_use]
    pub fn dependents_of(&self, key: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, refs)| refs.iter().any(|r| r == key))
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Returns every node reachable from `key`, in breadth-first order.
    ///
    /// Dangling references are not nodes and are left out. `key` itself is
    /// included only when it is part of a cycle.
    #[must_use]
    pub fn transitive_references(&self, key: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(key);

        while let Some(current) = queue.pop_front() {
            for dep in self.references(current) {
                if self.contains(dep) && seen.insert(dep.as_str()) {
                    found.push(dep.as_str());
                    queue.push_back(dep.as_str());
                }
            }
        }

        found
    }

    /// Reports every reference cycle.
    ///
    /// Each back edge found by the traversal yields one `Circular` error
    /// attributed to the key that closes the cycle, with the path from its
    /// first occurrence back to itself (`A -> B -> A`). Every node that is
    /// not yet visited serves as a root, so disconnected components are
    /// covered too. A self-reference is a cycle of length one.
    ///
    /// A key can sit on a cycle that the traversal only reaches through an
    /// already finished key, so it never closes a back edge itself. Such keys
    /// get their own error with the shortest cycle through them, which
    /// guarantees every member of a cyclic component is named.
    #[must_use]
    pub fn detect_cycles(&self) -> Vec<ResolutionError> {
        let mut errors = Vec::new();
        let mut named: HashSet<&str> = HashSet::new();

        self.depth_first(
            |path, repeated| {
                if let Some(start) = path.iter().position(|node| *node == repeated) {
                    named.extend(&path[start..]);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|node| (*node).to_string()).collect();
                    cycle.push(repeated.to_string());
                    errors.push(ResolutionError::circular(repeated, &cycle));
                }
            },
            |_| {},
        );

        if errors.is_empty() {
            return errors;
        }

        for component in self.cyclic_components() {
            let members: HashSet<&str> = component.iter().copied().collect();
            for key in component {
                if named.contains(key) {
                    continue;
                }
                let cycle = self.shortest_cycle_through(key, &members);
                named.extend(cycle.iter().copied());
                let cycle: Vec<String> = cycle.into_iter().map(str::to_string).collect();
                errors.push(ResolutionError::circular(key, &cycle));
            }
        }

        errors
    }

    /// Strongly connected components that contain a cycle: more than one
    /// key, or a single key referencing itself. Components and their
    /// members follow map order.
    fn cyclic_components(&self) -> Vec<Vec<&str>> {
        let mut graph: DiGraph<&str, ()> = DiGraph::with_capacity(self.len(), self.edge_count());
        let indices: HashMap<&str, NodeIndex> = self
            .edges
            .keys()
            .map(|key| (key.as_str(), graph.add_node(key.as_str())))
            .collect();

        for (key, references) in &self.edges {
            let Some(&from) = indices.get(key.as_str()) else {
                continue;
            };
            for dep in references {
                if let Some(&to) = indices.get(dep.as_str()) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|c| c.len() > 1 || graph.contains_edge(c[0], c[0]))
            .collect();
        for component in &mut components {
            component.sort_unstable();
        }
        components.sort_unstable_by_key(|c| c[0]);

        components
            .into_iter()
            .map(|c| c.into_iter().map(|index| graph[index]).collect())
            .collect()
    }

    /// Breadth-first search for the shortest path from `start` back to
    /// itself, staying inside `members`. Returns `[start, .., start]`.
    fn shortest_cycle_through<'a>(
        &'a self,
        start: &'a str,
        members: &HashSet<&str>,
    ) -> Vec<&'a str> {
        let mut parents: HashMap<&str, &str> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            for dep in self.references(node) {
                let dep = dep.as_str();
                if !members.contains(dep) {
                    continue;
                }
                if dep == start {
                    let mut cycle = vec![start];
                    let mut current = node;
                    while current != start {
                        cycle.push(current);
                        match parents.get(current) {
                            Some(&parent) => current = parent,
                            None => break,
                        }
                    }
                    cycle.push(start);
                    cycle.reverse();
                    return cycle;
                }
                if !parents.contains_key(dep) {
                    parents.insert(dep, node);
                    queue.push_back(dep);
                }
            }
        }

        vec![start, start]
    }

    /// Orders the nodes so that each key follows every key it references.
    ///
    /// Post-order DFS; roots and neighbours are visited in map order, which
    /// breaks ties between independent keys. Dangling edges are dropped.
    /// Only meaningful when [`Self::detect_cycles`] found nothing; on a cyclic
    /// graph back edges are ignored and every node is still returned once.
    #[must_use]
    pub fn topological_order(&self) -> Vec<&str> {
        let mut sorted = Vec::with_capacity(self.edges.len());
        self.depth_first(|_, _| {}, |node| sorted.push(node));
        sorted
    }

    /// Iterative depth-first traversal over every node.
    ///
    /// `on_back_edge(path, node)` fires when `node` is reached while already
    /// on the current `path`; `on_finish(node)` fires in post-order.
    fn depth_first<'a>(
        &'a self,
        mut on_back_edge: impl FnMut(&[&'a str], &'a str),
        mut on_finish: impl FnMut(&'a str),
    ) {
        let mut colors: HashMap<&str, Color> = self
            .edges
            .keys()
            .map(|key| (key.as_str(), Color::White))
            .collect();
        let mut path: Vec<&'a str> = Vec::new();
        let mut cursors: Vec<usize> = Vec::new();

        for root in self.edges.keys() {
            if colors.get(root.as_str()) != Some(&Color::White) {
                continue;
            }

            colors.insert(root.as_str(), Color::Gray);
            path.push(root.as_str());
            cursors.push(0);

            while let (Some(&node), Some(cursor)) = (path.last(), cursors.last_mut()) {
                let Some(dep) = self.references(node).get(*cursor) else {
                    colors.insert(node, Color::Black);
                    on_finish(node);
                    path.pop();
                    cursors.pop();
                    continue;
                };
                *cursor += 1;

                match colors.get(dep.as_str()).copied() {
                    Some(Color::White) => {
                        colors.insert(dep.as_str(), Color::Gray);
                        path.push(dep.as_str());
                        cursors.push(0);
                    }
                    Some(Color::Gray) => on_back_edge(&path, dep.as_str()),
                    // Finished, or dangling.
                    Some(Color::Black) | None => {}
                }
            }
        }
    }
}
