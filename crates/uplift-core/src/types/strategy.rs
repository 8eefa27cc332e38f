//! Enumerated strategies. Adding an estimator or a check means adding a
//! variant here, not a new pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Regression backend used by the effect estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorStrategy {
    #[default]
    OrdinaryLeastSquares,
}

impl EstimatorStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrdinaryLeastSquares => "ordinary_least_squares",
        }
    }
}

/// The robustness checks a refutation suite can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefutationKind {
    RandomCommonCause,
    PlaceboTreatment,
    DataSubset,
}

impl RefutationKind {
    pub const ALL: [RefutationKind; 3] = [
        RefutationKind::RandomCommonCause,
        RefutationKind::PlaceboTreatment,
        RefutationKind::DataSubset,
    ];

    /// Position in `ALL`; used to derive a per-check seed.
    pub fn ordinal(&self) -> u64 {
        match self {
            Self::RandomCommonCause => 0,
            Self::PlaceboTreatment => 1,
            Self::DataSubset => 2,
        }
    }

    /// Human-readable label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RandomCommonCause => "Random Common Cause",
            Self::PlaceboTreatment => "Placebo Treatment",
            Self::DataSubset => "Data Subset Refuter",
        }
    }
}

impl fmt::Display for RefutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
