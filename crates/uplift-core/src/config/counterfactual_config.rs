//! What-if projection defaults. The range is display metadata; the
//! projector itself accepts any multiplier.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterfactualConfig {
    pub multiplier: f64,
    pub min_multiplier: f64,
    pub max_multiplier: f64,
    pub step: f64,
}

impl Default for CounterfactualConfig {
    fn default() -> Self {
        Self {
            multiplier: 1.2,
            min_multiplier: 0.5,
            max_multiplier: 2.0,
            step: 0.05,
        }
    }
}

impl CounterfactualConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.multiplier.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "counterfactual.multiplier",
                message: "must be finite".into(),
            });
        }
        for (field, value) in [
            ("counterfactual.min_multiplier", self.min_multiplier),
            ("counterfactual.max_multiplier", self.max_multiplier),
            ("counterfactual.step", self.step),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: format!("must be finite, got {value}"),
                });
            }
        }
        if !(self.min_multiplier < self.max_multiplier) {
            return Err(ConfigError::InvalidValue {
                field: "counterfactual.max_multiplier",
                message: format!(
                    "must exceed min_multiplier ({} >= {})",
                    self.min_multiplier, self.max_multiplier
                ),
            });
        }
        if !(self.step > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "counterfactual.step",
                message: format!("must be positive, got {}", self.step),
            });
        }
        Ok(())
    }
}
