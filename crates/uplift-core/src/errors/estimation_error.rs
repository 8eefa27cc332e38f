//! Regression (effect estimation) errors.

use std::fmt;

use super::error_code::{self, UpliftErrorCode};

/// Why a design matrix could not be inverted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingularCause {
    /// Fewer observations than regressors plus one.
    TooFewRows { rows: usize, regressors: usize },
    /// `column` is a linear combination of the columns before it.
    Collinear { column: String },
    /// Passed the rank check but the normal equations did not factorise.
    IllConditioned,
}

impl fmt::Display for SingularCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewRows { rows, regressors } => write!(
                f,
                "{rows} rows cannot identify {regressors} regressors (need at least {})",
                regressors + 1
            ),
            Self::Collinear { column } => write!(f, "column '{column}' is collinear with earlier columns"),
            Self::IllConditioned => f.write_str("normal equations are too ill-conditioned to factorise"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimationError {
    #[error("singular design matrix: {cause}")]
    SingularDesignMatrix { cause: SingularCause },

    #[error("column '{column}' is not in the dataset")]
    MissingColumn { column: String },

    #[error("column '{column}' must be numeric")]
    NonNumericColumn { column: String },

    #[error("cannot estimate on an empty dataset")]
    EmptyDataset,
}

impl EstimationError {
    /// True when the failure is caused by sample size alone.
    pub fn is_too_few_rows(&self) -> bool {
        matches!(
            self,
            Self::SingularDesignMatrix {
                cause: SingularCause::TooFewRows { .. }
            } | Self::EmptyDataset
        )
    }
}

impl UpliftErrorCode for EstimationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SingularDesignMatrix { .. } => error_code::ESTIMATION_SINGULAR,
            Self::MissingColumn { .. } => error_code::ESTIMATION_MISSING_COLUMN,
            Self::NonNumericColumn { .. } => error_code::ESTIMATION_NON_NUMERIC,
            Self::EmptyDataset => error_code::ESTIMATION_EMPTY_DATASET,
        }
    }
}
