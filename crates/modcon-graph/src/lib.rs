//! ---
//! mc_section: "02-dependency-ordering"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Dependency graph and topological ordering."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
//! Directed graph over opaque node identifiers.
//!
//! An edge `from -> to` reads "`from` depends on `to`". [`Graph::topo_sort`]
//! returns every node once with prerequisites ahead of their dependents; ties
//! are broken by insertion order so the result is deterministic.
#![warn(missing_docs)]

use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::trace;

/// Errors raised by graph construction and ordering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError<N> {
    /// The node is already part of the graph.
    #[error("node {0:?} already present in graph")]
    DuplicateNode(N),
    /// An edge endpoint is not part of the graph.
    #[error("node {0:?} is not part of the graph")]
    UnknownNode(N),
    /// The graph contains a dependency cycle.
    #[error("dependency cycle detected at {node:?} (path {path:?})")]
    Cycle {
        /// Node that was reached again while still being visited.
        node: N,
        /// Nodes along the cycle, starting and ending with `node`.
        path: Vec<N>,
    },
    /// The traversal exceeded its step budget. Indicates a defect in the
    /// traversal itself rather than a property of the input.
    #[error("internal error: topological sort exceeded its budget of {budget} steps")]
    Internal {
        /// Maximum number of traversal steps allowed for this graph.
        budget: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Pending,
    OnStack,
    Done,
}

/// Directed graph keyed by node identifier, preserving insertion order.
#[derive(Debug, Clone)]
pub struct Graph<N> {
    nodes: IndexMap<N, Vec<N>>,
}

impl<N> Default for Graph<N> {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
        }
    }
}

impl<N> Graph<N>
where
    N: Clone + Eq + Hash + Debug,
{
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add nodes in order. Fails on the first identifier already present;
    /// nodes before it remain added.
    pub fn add_nodes<I>(&mut self, ids: I) -> Result<(), GraphError<N>>
    where
        I: IntoIterator<Item = N>,
    {
        for id in ids {
            if self.nodes.contains_key(&id) {
                return Err(GraphError::DuplicateNode(id));
            }
            self.nodes.insert(id, Vec::new());
        }
        Ok(())
    }

    /// Record that `from` depends on `to`.
    pub fn add_edge(&mut self, from: &N, to: &N) -> Result<(), GraphError<N>> {
        if !self.nodes.contains_key(to) {
            return Err(GraphError::UnknownNode(to.clone()));
        }
        match self.nodes.get_mut(from) {
            Some(edges) => {
                edges.push(to.clone());
                Ok(())
            }
            None => Err(GraphError::UnknownNode(from.clone())),
        }
    }

    /// Whether `id` is part of the graph.
    pub fn contains(&self, id: &N) -> bool {
        self.nodes.contains_key(id)
    }

    /// Direct dependencies of `id`, in the order their edges were added.
    pub fn dependencies(&self, id: &N) -> Option<&[N]> {
        self.nodes.get(id).map(Vec::as_slice)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.nodes.keys()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    /// Order nodes so that every node follows all of its dependencies.
    ///
    /// Depth-first postorder over nodes in insertion order. Visit marks are
    /// local to the call, so the graph can be sorted any number of times.
    pub fn topo_sort(&self) -> Result<Vec<N>, GraphError<N>> {
        let mut marks = vec![Mark::Pending; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        // Each step either follows one edge or finishes one node.
        let budget = 4 * (self.nodes.len() + self.edge_count()) + 16;
        let mut steps = 0usize;

        for root in 0..self.nodes.len() {
            if marks[root] != Mark::Pending {
                continue;
            }
            marks[root] = Mark::OnStack;
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

            while let Some(frame) = stack.last_mut() {
                steps += 1;
                if steps > budget {
                    return Err(GraphError::Internal { budget });
                }
                let (index, cursor) = *frame;
                let Some((_, edges)) = self.nodes.get_index(index) else {
                    return Err(GraphError::Internal { budget });
                };

                match edges.get(cursor) {
                    Some(dependency) => {
                        frame.1 += 1;
                        let Some(next) = self.nodes.get_index_of(dependency) else {
                            return Err(GraphError::UnknownNode(dependency.clone()));
                        };
                        match marks[next] {
                            Mark::Pending => {
                                marks[next] = Mark::OnStack;
                                stack.push((next, 0));
                            }
                            Mark::OnStack => return Err(self.cycle_error(&stack, next)),
                            Mark::Done => {}
                        }
                    }
                    None => {
                        stack.pop();
                        marks[index] = Mark::Done;
                        if let Some((id, _)) = self.nodes.get_index(index) {
                            order.push(id.clone());
                        }
                    }
                }
            }
        }

        trace!(nodes = order.len(), steps, "topological sort complete");
        Ok(order)
    }

    fn cycle_error(&self, stack: &[(usize, usize)], repeated: usize) -> GraphError<N> {
        let Some((node, _)) = self.nodes.get_index(repeated) else {
            return GraphError::Internal { budget: 0 };
        };
        let start = stack
            .iter()
            .position(|(index, _)| *index == repeated)
            .unwrap_or(0);
        let mut path: Vec<N> = stack[start..]
            .iter()
            .filter_map(|(index, _)| self.nodes.get_index(*index).map(|(id, _)| id.clone()))
            .collect();
        path.push(node.clone());
        GraphError::Cycle {
            node: node.clone(),
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: &[&'static str], edges: &[(&'static str, &'static str)]) -> Graph<&'static str> {
        let mut graph = Graph::new();
        graph.add_nodes(nodes.iter().copied()).unwrap();
        for (from, to) in edges {
            graph.add_edge(from, to).unwrap();
        }
        graph
    }

    fn position(order: &[&str], id: &str) -> usize {
        order.iter().position(|n| *n == id).unwrap()
    }

    #[test]
    fn prerequisites_come_first() {
        let g = graph(
            &["app", "db", "cache", "log"],
            &[("app", "db"), ("app", "cache"), ("db", "log"), ("cache", "log")],
        );
        let order = g.topo_sort().unwrap();
        assert_eq!(order.len(), 4);
        for (from, to) in [("app", "db"), ("app", "cache"), ("db", "log"), ("cache", "log")] {
            assert!(position(&order, to) < position(&order, from), "{to} before {from}");
        }
    }

    #[test]
    fn independent_nodes_keep_insertion_order() {
        let g = graph(&["c", "a", "b"], &[]);
        assert_eq!(g.topo_sort().unwrap(), vec!["c", "a", "b"]);

        let g = graph(&["a", "b", "c"], &[("a", "c")]);
        assert_eq!(g.topo_sort().unwrap(), vec!["c", "a", "b"]);
    }

    #[test]
    fn sorting_twice_gives_the_same_answer() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let first = g.topo_sort().unwrap();
        assert_eq!(first, vec!["c", "b", "a"]);
        assert_eq!(g.topo_sort().unwrap(), first);
    }

    #[test]
    fn cycle_names_a_node_on_the_cycle() {
        let g = graph(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "a"), ("d", "a")]);
        let err = g.topo_sort().unwrap_err();
        let GraphError::Cycle { node, path } = err else {
            panic!("expected cycle, got {err:?}");
        };
        assert!(["a", "b", "c"].contains(&node));
        assert_eq!(path.first(), Some(&node));
        assert_eq!(path.last(), Some(&node));
        assert_eq!(path, vec!["a", "b", "c", "a"]);
        // Repeated calls do not depend on marks left behind.
        assert!(matches!(g.topo_sort(), Err(GraphError::Cycle { .. })));
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let g = graph(&["solo"], &[("solo", "solo")]);
        assert_eq!(
            g.topo_sort().unwrap_err(),
            GraphError::Cycle {
                node: "solo",
                path: vec!["solo", "solo"]
            }
        );
    }

    #[test]
    fn construction_errors() {
        let mut g = Graph::new();
        g.add_nodes(["a", "b"]).unwrap();
        assert_eq!(g.add_nodes(["c", "a", "d"]), Err(GraphError::DuplicateNode("a")));
        assert!(g.contains(&"c"));
        assert!(!g.contains(&"d"));
        assert_eq!(g.add_edge(&"a", &"x"), Err(GraphError::UnknownNode("x")));
        assert_eq!(g.add_edge(&"x", &"a"), Err(GraphError::UnknownNode("x")));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn empty_graph_sorts_to_nothing() {
        let g: Graph<String> = Graph::new();
        assert!(g.topo_sort().unwrap().is_empty());
    }

    #[test]
    fn long_chains_do_not_recurse() {
        let ids: Vec<u32> = (0..10_000).collect();
        let mut g = Graph::new();
        g.add_nodes(ids.iter().copied()).unwrap();
        for pair in ids.windows(2) {
            g.add_edge(&pair[0], &pair[1]).unwrap();
        }
        let order = g.topo_sort().unwrap();
        assert_eq!(order.first(), Some(&9_999));
        assert_eq!(order.last(), Some(&0));
    }
}
