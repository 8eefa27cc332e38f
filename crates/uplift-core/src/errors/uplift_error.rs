use super::error_code::{self, UpliftErrorCode};
use super::{
    ConfigError, DatasetError, EstimationError, GraphError, IdentificationError, RefutationError,
    SubgroupError,
};

/// Top-level error type for the Uplift engine.
/// All subsystem errors convert into this via `From` impls.
#[derive(Debug, thiserror::Error)]
pub enum UpliftError {
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("identification error: {0}")]
    Identification(#[from] IdentificationError),

    #[error("estimation error: {0}")]
    Estimation(#[from] EstimationError),

    #[error("subgroup error: {0}")]
    Subgroup(#[from] SubgroupError),

    #[error("refutation error: {0}")]
    Refutation(#[from] RefutationError),

    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl UpliftErrorCode for UpliftError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Graph(e) => e.error_code(),
            Self::Identification(e) => e.error_code(),
            Self::Estimation(e) => e.error_code(),
            Self::Subgroup(e) => e.error_code(),
            Self::Refutation(e) => e.error_code(),
            Self::Dataset(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Serialization(_) => error_code::SERIALIZATION_ERROR,
        }
    }
}

/// Convenience type alias.
pub type UpliftResult<T> = Result<T, UpliftError>;
