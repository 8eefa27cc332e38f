//! Causal graph construction and validation errors.

use super::error_code::{self, UpliftErrorCode};

/// Errors raised while building or validating a causal graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("causal graph contains a cycle: {path}")]
    Cyclic { path: String },

    #[error("edge {from} -> {to} references unknown node '{node}'")]
    UnknownNode { node: String, from: String, to: String },

    #[error("node '{node}' declared more than once")]
    DuplicateNode { node: String },

    #[error("node '{node}' is not in the graph")]
    MissingNode { node: String },

    #[error("no directed path from '{treatment}' to '{outcome}'")]
    Disconnected { treatment: String, outcome: String },

    #[error("invalid edge '{text}': expected 'A -> B'")]
    InvalidEdge { text: String },
}

impl UpliftErrorCode for GraphError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cyclic { .. } => error_code::GRAPH_CYCLIC,
            Self::UnknownNode { .. } => error_code::GRAPH_UNKNOWN_NODE,
            Self::DuplicateNode { .. } => error_code::GRAPH_DUPLICATE_NODE,
            Self::MissingNode { .. } => error_code::GRAPH_MISSING_NODE,
            Self::Disconnected { .. } => error_code::GRAPH_DISCONNECTED,
            Self::InvalidEdge { .. } => error_code::GRAPH_INVALID_EDGE,
        }
    }
}
