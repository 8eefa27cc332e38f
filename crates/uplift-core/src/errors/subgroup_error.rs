//! Per-partition subgroup errors.

use super::error_code::{self, UpliftErrorCode};
use super::EstimationError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubgroupError {
    #[error("group '{group}' has {rows} rows, needs at least {required}")]
    InsufficientGroupSample { group: String, rows: usize, required: usize },

    #[error("grouping attribute '{attribute}' is not a categorical column")]
    NotCategorical { attribute: String },

    #[error("group '{group}': {source}")]
    Estimation {
        group: String,
        #[source]
        source: EstimationError,
    },
}

impl UpliftErrorCode for SubgroupError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientGroupSample { .. } => error_code::SUBGROUP_INSUFFICIENT_SAMPLE,
            Self::NotCategorical { .. } => error_code::SUBGROUP_NOT_CATEGORICAL,
            Self::Estimation { source, .. } => source.error_code(),
        }
    }
}
