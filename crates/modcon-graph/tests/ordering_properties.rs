//! ---
//! mc_section: "02-dependency-ordering"
//! mc_subsection: "integration-tests"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Randomized ordering and cycle detection checks for the dependency graph."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use modcon_graph::{Graph, GraphError};
use proptest::prelude::*;

/// Node count, a shuffled insertion order, and raw index pairs.
fn layout() -> impl Strategy<Value = (usize, Vec<usize>, Vec<(usize, usize)>)> {
    (1usize..24).prop_flat_map(|n| {
        (
            Just(n),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
            prop::collection::vec((0..n, 0..n), 0..n * 3),
        )
    })
}

/// Edges that only point from a higher index to a lower one.
fn forward(pairs: &[(usize, usize)]) -> Vec<(usize, usize)> {
    pairs
        .iter()
        .filter(|(a, b)| a != b)
        .map(|&(a, b)| (a.max(b), a.min(b)))
        .collect()
}

fn build(order: &[usize], edges: &[(usize, usize)]) -> Graph<usize> {
    let mut graph = Graph::new();
    graph.add_nodes(order.iter().copied()).unwrap();
    for (from, to) in edges {
        graph.add_edge(from, to).unwrap();
    }
    graph
}

proptest! {
    #[test]
    fn acyclic_graphs_sort_every_node_once((n, order, pairs) in layout()) {
        let edges = forward(&pairs);
        let graph = build(&order, &edges);
        let sorted = graph.topo_sort().unwrap();

        prop_assert_eq!(sorted.len(), n);
        let mut position = vec![usize::MAX; n];
        for (index, node) in sorted.iter().enumerate() {
            prop_assert_eq!(position[*node], usize::MAX, "node {} listed twice", node);
            position[*node] = index;
        }
        for (from, to) in &edges {
            prop_assert!(position[*to] < position[*from], "{} must precede {}", to, from);
        }
        prop_assert_eq!(graph.topo_sort().unwrap(), sorted);
    }

    #[test]
    fn closing_a_chain_is_always_a_cycle(
        ((_, order, pairs), low, span) in layout()
            .prop_flat_map(|layout| {
                let n = layout.0;
                (Just(layout), 0..n, 0..n)
            })
    ) {
        let n = order.len();
        let high = (low + span).min(n - 1);
        let mut edges = forward(&pairs);
        edges.extend((low + 1..=high).map(|node| (node, node - 1)));
        edges.push((low, high));
        let graph = build(&order, &edges);

        let err = graph.topo_sort().unwrap_err();
        let GraphError::Cycle { node, path } = err else {
            return Err(TestCaseError::fail(format!("expected cycle, got {err:?}")));
        };
        prop_assert!(path.contains(&node));
        prop_assert_eq!(path.first(), Some(&node));
        prop_assert_eq!(path.last(), Some(&node));
        for step in path.windows(2) {
            let dependencies = graph.dependencies(&step[0]).unwrap();
            prop_assert!(dependencies.contains(&step[1]), "{} -> {} is not an edge", step[0], step[1]);
        }
    }
}
