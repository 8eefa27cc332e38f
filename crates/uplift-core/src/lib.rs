//! # uplift-core
//!
//! Foundation crate for the Uplift causal-effect engine.
//! Defines the typed dataset, errors, config, and telemetry.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod telemetry;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::UpliftConfig;
pub use errors::{UpliftError, UpliftErrorCode, UpliftResult};
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::{Column, ColumnKind, ColumnRole, ColumnSpec, Dataset, Schema};
