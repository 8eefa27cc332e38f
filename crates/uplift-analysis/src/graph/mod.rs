//! Causal DAG over named variables, backed by a petgraph `DiGraph`.
//!
//! Built once per analysis and immutable afterwards; every query is a pure
//! lookup. Set-valued queries return `BTreeSet` so callers get a
//! deterministic iteration order.

pub mod edge;
pub mod traversal;

use std::collections::BTreeSet;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use uplift_core::errors::GraphError;
use uplift_core::{FxHashMap, FxHashSet};

pub use self::edge::{parse_edges, Edge};

#[derive(Debug, Clone)]
pub struct CausalGraph {
    graph: DiGraph<String, ()>,
    index: FxHashMap<String, NodeIndex>,
}

impl CausalGraph {
    /// Build from an explicit node list and edge list.
    ///
    /// Fails with `UnknownNode` if an edge endpoint is not in `nodes`,
    /// `DuplicateNode` if a name repeats, and `Cyclic` if the edges close a
    /// loop. Repeated edges collapse into one.
    pub fn build<I, S>(nodes: I, edges: &[Edge]) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = DiGraph::new();
        let mut index = FxHashMap::default();

        for node in nodes {
            let name: String = node.into();
            if index.contains_key(&name) {
                return Err(GraphError::DuplicateNode { node: name });
            }
            let idx = graph.add_node(name.clone());
            index.insert(name, idx);
        }

        for edge in edges {
            let lookup = |name: &str| {
                index.get(name).copied().ok_or_else(|| GraphError::UnknownNode {
                    node: name.to_string(),
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                })
            };
            let (from, to) = (lookup(&edge.from)?, lookup(&edge.to)?);
            graph.update_edge(from, to, ());
        }

        let built = Self { graph, index };
        built.ensure_acyclic()?;
        tracing::debug!(
            nodes = built.node_count(),
            edges = built.edge_count(),
            "causal graph built"
        );
        Ok(built)
    }

    /// Build with the node set inferred from the edges, in first-seen order.
    pub fn from_edges(edges: &[Edge]) -> Result<Self, GraphError> {
        let mut seen = FxHashSet::default();
        let mut nodes = Vec::new();
        for edge in edges {
            for name in [&edge.from, &edge.to] {
                if seen.insert(name.as_str()) {
                    nodes.push(name.clone());
                }
            }
        }
        Self::build(nodes, edges)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.index.contains_key(node)
    }

    /// Node names in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.graph.node_indices().map(move |i| self.graph[i].as_str())
    }

    /// All edges, sorted.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| Edge::new(self.graph[a].clone(), self.graph[b].clone()))
            .collect();
        edges.sort();
        edges
    }

    pub fn parents(&self, node: &str) -> Result<BTreeSet<String>, GraphError> {
        let idx = self.node_index(node)?;
        Ok(self.names(self.graph.neighbors_directed(idx, Direction::Incoming)))
    }

    pub fn children(&self, node: &str) -> Result<BTreeSet<String>, GraphError> {
        let idx = self.node_index(node)?;
        Ok(self.names(self.graph.neighbors_directed(idx, Direction::Outgoing)))
    }

    /// Every node with a directed path into `node`.
    pub fn ancestors(&self, node: &str) -> Result<BTreeSet<String>, GraphError> {
        let idx = self.node_index(node)?;
        let reach = traversal::reachable(&self.graph, idx, Direction::Incoming, &FxHashSet::default());
        Ok(self.names(reach))
    }

    /// Every node reachable from `node` along a directed path.
    pub fn descendants(&self, node: &str) -> Result<BTreeSet<String>, GraphError> {
        let idx = self.node_index(node)?;
        let reach = traversal::reachable(&self.graph, idx, Direction::Outgoing, &FxHashSet::default());
        Ok(self.names(reach))
    }

    /// Ancestors of `node` reachable without passing through `avoid`.
    pub fn ancestors_avoiding(&self, node: &str, avoid: &str) -> Result<BTreeSet<String>, GraphError> {
        let idx = self.node_index(node)?;
        let blocked: FxHashSet<NodeIndex> = [self.node_index(avoid)?].into_iter().collect();
        let reach = traversal::reachable(&self.graph, idx, Direction::Incoming, &blocked);
        Ok(self.names(reach))
    }

    pub fn has_directed_path(&self, from: &str, to: &str) -> Result<bool, GraphError> {
        let (a, b) = (self.node_index(from)?, self.node_index(to)?);
        Ok(a != b && traversal::shortest_path(&self.graph, a, b).is_some())
    }

    /// Treatment and outcome must both be present and connected by a
    /// directed path.
    pub fn is_valid(&self, treatment: &str, outcome: &str) -> Result<(), GraphError> {
        if !self.has_directed_path(treatment, outcome)? {
            return Err(GraphError::Disconnected {
                treatment: treatment.to_string(),
                outcome: outcome.to_string(),
            });
        }
        Ok(())
    }

    /// Node names in a topological order.
    pub fn topological_order(&self) -> Vec<String> {
        // Acyclicity is checked at build time, so toposort cannot fail here.
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|i| self.graph[i].clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn inner(&self) -> &DiGraph<String, ()> {
        &self.graph
    }

    pub(crate) fn node_index(&self, node: &str) -> Result<NodeIndex, GraphError> {
        self.index.get(node).copied().ok_or_else(|| GraphError::MissingNode {
            node: node.to_string(),
        })
    }

    pub(crate) fn names<I: IntoIterator<Item = NodeIndex>>(&self, nodes: I) -> BTreeSet<String> {
        nodes.into_iter().map(|i| self.graph[i].clone()).collect()
    }

    fn ensure_acyclic(&self) -> Result<(), GraphError> {
        match toposort(&self.graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => {
                let start = cycle.node_id();
                let path = traversal::shortest_path(&self.graph, start, start)
                    .map(|p| {
                        p.into_iter()
                            .map(|i| self.graph[i].as_str())
                            .collect::<Vec<_>>()
                            .join(" -> ")
                    })
                    .unwrap_or_else(|| self.graph[start].clone());
                Err(GraphError::Cyclic { path })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn funnel() -> CausalGraph {
        let edges = parse_edges(&[
            "Seasonality -> CampaignSpend",
            "Seasonality -> Conversions",
            "CampaignSpend -> Impressions",
            "Impressions -> Clicks",
            "Clicks -> Conversions",
        ])
        .unwrap();
        CausalGraph::from_edges(&edges).unwrap()
    }

    #[test]
    fn lookups() {
        let g = funnel();
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.parents("Conversions").unwrap(), set(&["Clicks", "Seasonality"]));
        assert_eq!(
            g.descendants("CampaignSpend").unwrap(),
            set(&["Clicks", "Conversions", "Impressions"])
        );
        assert_eq!(g.ancestors("CampaignSpend").unwrap(), set(&["Seasonality"]));
    }

    #[test]
    fn ancestors_avoiding_skips_paths_through_blocked_node() {
        let g = funnel();
        let anc = g.ancestors_avoiding("Conversions", "CampaignSpend").unwrap();
        assert_eq!(anc, set(&["Clicks", "Impressions", "Seasonality"]));
    }

    #[test]
    fn cycle_is_reported_with_path() {
        let edges = parse_edges(&["A -> B", "B -> C", "C -> A"]).unwrap();
        let err = CausalGraph::from_edges(&edges).unwrap_err();
        match err {
            GraphError::Cyclic { path } => {
                assert_eq!(path.matches("->").count(), 3, "path was {path}");
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let err = CausalGraph::from_edges(&[Edge::new("A", "A")]).unwrap_err();
        assert_eq!(err, GraphError::Cyclic { path: "A -> A".into() });
    }

    #[test]
    fn unknown_node_names_the_edge() {
        let err = CausalGraph::build(["A"], &[Edge::new("A", "B")]).unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownNode {
                node: "B".into(),
                from: "A".into(),
                to: "B".into()
            }
        );
    }

    #[test]
    fn duplicate_edges_collapse() {
        let g = CausalGraph::from_edges(&[Edge::new("A", "B"), Edge::new("A", "B")]).unwrap();
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn disconnected_treatment_and_outcome() {
        let g = CausalGraph::build(["T", "Y", "Z"], &[Edge::new("Z", "T"), Edge::new("Z", "Y")]).unwrap();
        assert_eq!(
            g.is_valid("T", "Y").unwrap_err(),
            GraphError::Disconnected {
                treatment: "T".into(),
                outcome: "Y".into()
            }
        );
        // Reverse direction does not count.
        let g = CausalGraph::from_edges(&[Edge::new("Y", "T")]).unwrap();
        assert!(g.is_valid("T", "Y").is_err());
    }

    #[test]
    fn missing_treatment_node() {
        let g = funnel();
        assert_eq!(
            g.is_valid("Budget", "Conversions").unwrap_err(),
            GraphError::MissingNode { node: "Budget".into() }
        );
    }

    #[test]
    fn topological_order_respects_edges() {
        let g = funnel();
        let order = g.topological_order();
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        for edge in g.edges() {
            assert!(pos(&edge.from) < pos(&edge.to));
        }
    }
}
