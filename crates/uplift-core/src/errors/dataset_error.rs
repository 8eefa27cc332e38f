//! Dataset schema validation errors, raised once at load time.

use super::error_code::{self, UpliftErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("schema declares column '{column}' twice")]
    DuplicateColumn { column: String },

    #[error("schema must declare exactly one {role} column, found {found}")]
    RoleCardinality { role: &'static str, found: usize },

    #[error("column '{column}' with role {role} must be {expected}")]
    RoleKind { column: String, role: &'static str, expected: &'static str },

    #[error("column '{column}' is declared in the schema but missing from the data")]
    MissingColumn { column: String },

    #[error("column '{column}' is not declared in the schema")]
    UnknownColumn { column: String },

    #[error("column '{column}' expected {expected} values")]
    KindMismatch { column: String, expected: &'static str },

    #[error("column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch { column: String, expected: usize, found: usize },

    #[error("column '{column}' row {row} is not finite")]
    NonFiniteValue { column: String, row: usize },

    #[error("malformed dataset input: {message}")]
    Malformed { message: String },
}

impl UpliftErrorCode for DatasetError {
    fn error_code(&self) -> &'static str {
        error_code::DATASET_ERROR
    }
}
