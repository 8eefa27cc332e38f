//! Stable string codes for every error variant.

/// Implemented by every error type so a presentation layer can branch on a
/// code without matching on message text.
pub trait UpliftErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const GRAPH_CYCLIC: &str = "GRAPH_CYCLIC";
pub const GRAPH_UNKNOWN_NODE: &str = "GRAPH_UNKNOWN_NODE";
pub const GRAPH_DUPLICATE_NODE: &str = "GRAPH_DUPLICATE_NODE";
pub const GRAPH_MISSING_NODE: &str = "GRAPH_MISSING_NODE";
pub const GRAPH_DISCONNECTED: &str = "GRAPH_DISCONNECTED";
pub const GRAPH_INVALID_EDGE: &str = "GRAPH_INVALID_EDGE";

pub const IDENTIFICATION_EMPTY_PATH: &str = "IDENTIFICATION_EMPTY_ADJUSTMENT_PATH";
pub const IDENTIFICATION_UNOBSERVED: &str = "IDENTIFICATION_UNOBSERVED_ADJUSTMENT";

pub const ESTIMATION_SINGULAR: &str = "ESTIMATION_SINGULAR_DESIGN";
pub const ESTIMATION_MISSING_COLUMN: &str = "ESTIMATION_MISSING_COLUMN";
pub const ESTIMATION_NON_NUMERIC: &str = "ESTIMATION_NON_NUMERIC_COLUMN";
pub const ESTIMATION_EMPTY_DATASET: &str = "ESTIMATION_EMPTY_DATASET";

pub const SUBGROUP_INSUFFICIENT_SAMPLE: &str = "SUBGROUP_INSUFFICIENT_SAMPLE";
pub const SUBGROUP_NOT_CATEGORICAL: &str = "SUBGROUP_NOT_CATEGORICAL";

pub const REFUTATION_INVALID_FRACTION: &str = "REFUTATION_INVALID_SUBSET_FRACTION";
pub const REFUTATION_SAMPLER: &str = "REFUTATION_SAMPLER";

pub const DATASET_ERROR: &str = "DATASET_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
