//! Refutation suite configuration.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::RefutationKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefutationConfig {
    /// Checks to run, in report order.
    pub checks: Vec<RefutationKind>,
    /// Base seed; check `k` uses `seed + k.ordinal()`.
    pub seed: u64,
    /// Fraction of rows kept by the data-subset check.
    pub subset_fraction: f64,
    /// Run checks and subgroup fits on the rayon pool.
    pub parallel: bool,
    /// Relative tolerance used for the informational stability verdicts.
    pub stability_tolerance: f64,
}

impl Default for RefutationConfig {
    fn default() -> Self {
        Self {
            checks: RefutationKind::ALL.to_vec(),
            seed: 0,
            subset_fraction: 0.7,
            parallel: true,
            stability_tolerance: 0.1,
        }
    }
}

impl RefutationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.subset_fraction > 0.0 && self.subset_fraction <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "refutation.subset_fraction",
                message: format!("must be in (0, 1], got {}", self.subset_fraction),
            });
        }
        if !(self.stability_tolerance >= 0.0 && self.stability_tolerance.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "refutation.stability_tolerance",
                message: format!("must be a non-negative number, got {}", self.stability_tolerance),
            });
        }
        Ok(())
    }
}
