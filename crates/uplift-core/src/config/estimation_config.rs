//! Estimator configuration.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::EstimatorStrategy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConfig {
    pub strategy: EstimatorStrategy,
    /// Smallest singular value, relative to the largest, of the
    /// column-normalised design before it is treated as rank-deficient.
    pub rank_tolerance: f64,
    /// Coverage of the reported confidence interval.
    pub confidence_level: f64,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            strategy: EstimatorStrategy::OrdinaryLeastSquares,
            rank_tolerance: 1e-10,
            confidence_level: 0.95,
        }
    }
}

impl EstimationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rank_tolerance > 0.0 && self.rank_tolerance < 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "estimation.rank_tolerance",
                message: format!("must be in (0, 1), got {}", self.rank_tolerance),
            });
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "estimation.confidence_level",
                message: format!("must be in (0, 1), got {}", self.confidence_level),
            });
        }
        Ok(())
    }
}
