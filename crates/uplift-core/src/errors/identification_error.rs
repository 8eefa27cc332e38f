//! Identification (adjustment-set) errors.

use super::error_code::{self, UpliftErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentificationError {
    #[error("cannot identify effect: '{treatment}' and '{outcome}' are not connected by a causal path")]
    EmptyAdjustmentPath { treatment: String, outcome: String },

    #[error("adjustment variable '{node}' is in the graph but has no column in the dataset")]
    UnobservedAdjustment { node: String },
}

impl UpliftErrorCode for IdentificationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyAdjustmentPath { .. } => error_code::IDENTIFICATION_EMPTY_PATH,
            Self::UnobservedAdjustment { .. } => error_code::IDENTIFICATION_UNOBSERVED,
        }
    }
}
