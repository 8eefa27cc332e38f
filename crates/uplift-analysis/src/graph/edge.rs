//! Directed influence relation `from -> to`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uplift_core::errors::GraphError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

impl FromStr for Edge {
    type Err = GraphError;

    /// Parses a single `"A -> B"` pair. A trailing `;` is tolerated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GraphError::InvalidEdge { text: s.to_string() };
        let body = s.trim().trim_end_matches(';');
        let (from, to) = body.split_once("->").ok_or_else(invalid)?;
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() || to.contains("->") {
            return Err(invalid());
        }
        Ok(Edge::new(from, to))
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for Edge {
    fn from((from, to): (A, B)) -> Self {
        Edge::new(from, to)
    }
}

/// Parse a list of `"A -> B"` strings.
pub fn parse_edges<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Edge>, GraphError> {
    lines.iter().map(|l| l.as_ref().parse()).collect()
}
