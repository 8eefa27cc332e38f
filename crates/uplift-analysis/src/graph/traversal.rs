//! Forward/inverse BFS on petgraph.

use std::collections::VecDeque;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use uplift_core::FxHashSet;

/// All nodes reachable from `start` along `direction`, excluding `start`.
/// Nodes in `blocked` are neither visited nor expanded.
pub fn reachable(
    graph: &DiGraph<String, ()>,
    start: NodeIndex,
    direction: Direction,
    blocked: &FxHashSet<NodeIndex>,
) -> FxHashSet<NodeIndex> {
    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        for neighbor in graph.neighbors_directed(node, direction) {
            if blocked.contains(&neighbor) {
                continue;
            }
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    visited.remove(&start);
    visited
}

/// Shortest directed path `from -> ... -> to`, endpoints included.
pub fn shortest_path(graph: &DiGraph<String, ()>, from: NodeIndex, to: NodeIndex) -> Option<Vec<NodeIndex>> {
    let mut parent: Vec<Option<NodeIndex>> = vec![None; graph.node_count()];
    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::new();

    visited.insert(from);
    queue.push_back(from);

    while let Some(node) = queue.pop_front() {
        for neighbor in graph.neighbors_directed(node, Direction::Outgoing) {
            if neighbor == to {
                let mut path = vec![to, node];
                let mut cursor = node;
                while let Some(p) = parent[cursor.index()] {
                    path.push(p);
                    cursor = p;
                }
                path.reverse();
                return Some(path);
            }
            if visited.insert(neighbor) {
                parent[neighbor.index()] = Some(node);
                queue.push_back(neighbor);
            }
        }
    }

    None
}
