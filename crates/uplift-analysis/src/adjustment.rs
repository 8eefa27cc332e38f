//! Backdoor adjustment-set resolution.
//!
//! The resolver returns the observed common causes of treatment and
//! outcome: ancestors of the treatment that also reach the outcome along a
//! directed path avoiding the treatment. Descendants of the treatment
//! (mediators such as impressions and clicks) are never admissible.
//!
//! Identification rests on the caller's graph containing every confounder.
//! A confounder missing from the graph cannot be detected here; the
//! returned set is then the best observed set, not a guarantee.

use std::collections::BTreeSet;
use std::fmt;

use petgraph::graph::NodeIndex;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use uplift_core::errors::{GraphError, IdentificationError, UpliftResult};
use uplift_core::{FxHashMap, FxHashSet};

use crate::graph::CausalGraph;

/// Covariates to condition on. Equality ignores insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdjustmentSet(BTreeSet<String>);

impl AdjustmentSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Names in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Copy without `name`; used when a partition fixes that attribute.
    pub fn without(&self, name: &str) -> Self {
        Self(self.0.iter().filter(|n| *n != name).cloned().collect())
    }
}

impl fmt::Display for AdjustmentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}")?;
        }
        write!(f, "}}")
    }
}

/// Find the common-cause adjustment set for `treatment -> outcome`.
///
/// Fails with `EmptyAdjustmentPath` when there is no directed path from
/// treatment to outcome, and with a graph error if either node is absent.
pub fn resolve(graph: &CausalGraph, treatment: &str, outcome: &str) -> UpliftResult<AdjustmentSet> {
    if !graph.has_directed_path(treatment, outcome)? {
        return Err(IdentificationError::EmptyAdjustmentPath {
            treatment: treatment.to_string(),
            outcome: outcome.to_string(),
        }
        .into());
    }

    let treatment_ancestors = graph.ancestors(treatment)?;
    let outcome_ancestors = graph.ancestors_avoiding(outcome, treatment)?;
    let treatment_descendants = graph.descendants(treatment)?;

    let set = AdjustmentSet::new(
        treatment_ancestors
            .intersection(&outcome_ancestors)
            .filter(|n| !treatment_descendants.contains(*n))
            .filter(|n| n.as_str() != treatment && n.as_str() != outcome)
            .cloned(),
    );

    let valid = satisfies_backdoor(graph, treatment, outcome, &set)?;
    tracing::debug!(
        %treatment,
        %outcome,
        adjustment = %set,
        backdoor_valid = valid,
        "adjustment set resolved"
    );
    if !valid {
        tracing::warn!(adjustment = %set, "resolved set does not d-separate the backdoor paths");
    }

    Ok(set)
}

/// Backdoor criterion check for an arbitrary candidate set.
///
/// `set` must contain no descendant of `treatment` and must d-separate
/// treatment from outcome in the graph with the treatment's outgoing edges
/// removed. d-separation is tested on the moralised ancestral graph.
pub fn satisfies_backdoor(
    graph: &CausalGraph,
    treatment: &str,
    outcome: &str,
    set: &AdjustmentSet,
) -> Result<bool, GraphError> {
    let t = graph.node_index(treatment)?;
    let y = graph.node_index(outcome)?;
    let mut conditioned: FxHashSet<NodeIndex> = FxHashSet::default();
    for name in set.iter() {
        conditioned.insert(graph.node_index(name)?);
    }
    if conditioned.contains(&t) || conditioned.contains(&y) {
        return Ok(false);
    }

    let descendants = graph.descendants(treatment)?;
    if set.iter().any(|n| descendants.contains(n)) {
        return Ok(false);
    }

    let inner = graph.inner();
    let parents_of = |node: NodeIndex| -> Vec<NodeIndex> {
        // Backdoor graph: edges leaving the treatment are dropped.
        inner
            .neighbors_directed(node, Direction::Incoming)
            .filter(|&p| p != t)
            .collect()
    };

    // Ancestral closure of {T, Y} ∪ Z in the backdoor graph.
    let mut relevant: FxHashSet<NodeIndex> = FxHashSet::default();
    let mut stack: Vec<NodeIndex> = vec![t, y];
    stack.extend(conditioned.iter().copied());
    while let Some(node) = stack.pop() {
        if relevant.insert(node) {
            stack.extend(parents_of(node));
        }
    }

    // Moralise: link each node to its parents and marry co-parents.
    let mut adjacency: FxHashMap<NodeIndex, FxHashSet<NodeIndex>> = FxHashMap::default();
    let mut link = |a: NodeIndex, b: NodeIndex| {
        adjacency.entry(a).or_default().insert(b);
        adjacency.entry(b).or_default().insert(a);
    };
    for &node in &relevant {
        let parents = parents_of(node);
        for (i, &p) in parents.iter().enumerate() {
            link(p, node);
            for &q in &parents[i + 1..] {
                link(p, q);
            }
        }
    }

    // Remove Z and look for any undirected T–Y connection.
    let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
    let mut frontier = vec![t];
    visited.insert(t);
    while let Some(node) = frontier.pop() {
        if node == y {
            return Ok(false);
        }
        if let Some(neighbors) = adjacency.get(&node) {
            for &next in neighbors {
                if !conditioned.contains(&next) && visited.insert(next) {
                    frontier.push(next);
                }
            }
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{parse_edges, Edge};

    fn graph(lines: &[&str]) -> CausalGraph {
        CausalGraph::from_edges(&parse_edges(lines).unwrap()).unwrap()
    }

    #[test]
    fn confounder_is_selected_and_mediators_are_not() {
        let g = graph(&[
            "Seasonality -> CampaignSpend",
            "Seasonality -> Conversions",
            "CampaignSpend -> Impressions",
            "Impressions -> Clicks",
            "Clicks -> Conversions",
        ]);
        let set = resolve(&g, "CampaignSpend", "Conversions").unwrap();
        assert_eq!(set, AdjustmentSet::new(["Seasonality"]));
    }

    #[test]
    fn instrument_is_excluded() {
        // Z affects Y only through T.
        let g = graph(&["Z -> T", "T -> Y", "C -> T", "C -> Y"]);
        let set = resolve(&g, "T", "Y").unwrap();
        assert_eq!(set, AdjustmentSet::new(["C"]));
        assert!(satisfies_backdoor(&g, "T", "Y", &AdjustmentSet::new(["C", "Z"])).unwrap());
    }

    #[test]
    fn indirect_confounding_through_a_chain() {
        // P reaches Y only through T, so C alone closes T <- P <- C -> Y.
        let g = graph(&["C -> P", "P -> T", "C -> Y", "T -> Y"]);
        let set = resolve(&g, "T", "Y").unwrap();
        assert_eq!(set, AdjustmentSet::new(["C"]));
        assert!(satisfies_backdoor(&g, "T", "Y", &set).unwrap());
    }

    #[test]
    fn no_confounding_yields_empty_set() {
        let g = graph(&["T -> M", "M -> Y"]);
        assert!(resolve(&g, "T", "Y").unwrap().is_empty());
        assert!(satisfies_backdoor(&g, "T", "Y", &AdjustmentSet::empty()).unwrap());
    }

    #[test]
    fn disconnected_pair_fails() {
        let g = CausalGraph::build(["T", "Y", "C"], &[Edge::new("C", "T"), Edge::new("C", "Y")]).unwrap();
        let err = resolve(&g, "T", "Y").unwrap_err();
        assert!(err.to_string().contains("not connected"), "{err}");
    }

    #[test]
    fn backdoor_check_rejects_open_paths_and_mediators() {
        let g = graph(&["C -> T", "C -> Y", "T -> M", "M -> Y"]);
        assert!(!satisfies_backdoor(&g, "T", "Y", &AdjustmentSet::empty()).unwrap());
        assert!(!satisfies_backdoor(&g, "T", "Y", &AdjustmentSet::new(["C", "M"])).unwrap());
        assert!(satisfies_backdoor(&g, "T", "Y", &AdjustmentSet::new(["C"])).unwrap());
    }

    #[test]
    fn conditioning_on_collider_opens_path() {
        // T <- A -> K <- B -> Y: K is a collider.
        let g = graph(&["A -> T", "A -> K", "B -> K", "B -> Y", "T -> Y"]);
        assert!(satisfies_backdoor(&g, "T", "Y", &AdjustmentSet::empty()).unwrap());
        assert!(!satisfies_backdoor(&g, "T", "Y", &AdjustmentSet::new(["K"])).unwrap());
        assert!(satisfies_backdoor(&g, "T", "Y", &AdjustmentSet::new(["K", "A"])).unwrap());
    }

    #[test]
    fn display_is_sorted() {
        let set = AdjustmentSet::new(["b", "a"]);
        assert_eq!(set.to_string(), "{a, b}");
    }
}
