//! Refutation errors. Unstable estimates are results, not errors.

use super::error_code::{self, UpliftErrorCode};
use super::EstimationError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RefutationError {
    #[error("subset fraction must be in (0, 1], got {fraction}")]
    InvalidSubsetFraction { fraction: f64 },

    #[error("{check} refit failed: {source}")]
    Estimation {
        check: &'static str,
        #[source]
        source: EstimationError,
    },

    #[error("{check} could not build its sampler: {message}")]
    Sampler { check: &'static str, message: String },
}

impl UpliftErrorCode for RefutationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSubsetFraction { .. } => error_code::REFUTATION_INVALID_FRACTION,
            Self::Estimation { source, .. } => source.error_code(),
            Self::Sampler { .. } => error_code::REFUTATION_SAMPLER,
        }
    }
}
