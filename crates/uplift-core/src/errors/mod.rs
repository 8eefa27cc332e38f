//! Error taxonomy for the Uplift engine.
//!
//! Each subsystem owns a `thiserror` enum; `UpliftError` aggregates them.

pub mod error_code;

mod config_error;
mod dataset_error;
mod estimation_error;
mod graph_error;
mod identification_error;
mod refutation_error;
mod subgroup_error;
mod uplift_error;

pub use config_error::ConfigError;
pub use dataset_error::DatasetError;
pub use error_code::UpliftErrorCode;
pub use estimation_error::{EstimationError, SingularCause};
pub use graph_error::GraphError;
pub use identification_error::IdentificationError;
pub use refutation_error::RefutationError;
pub use subgroup_error::SubgroupError;
pub use uplift_error::{UpliftError, UpliftResult};
