pub mod analysis_config;
pub mod counterfactual_config;
pub mod estimation_config;
pub mod observability_config;
pub mod refutation_config;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub use analysis_config::AnalysisConfig;
pub use counterfactual_config::CounterfactualConfig;
pub use estimation_config::EstimationConfig;
pub use observability_config::ObservabilityConfig;
pub use refutation_config::RefutationConfig;

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UpliftConfig {
    pub analysis: AnalysisConfig,
    pub estimation: EstimationConfig,
    pub refutation: RefutationConfig,
    pub counterfactual: CounterfactualConfig,
    pub observability: ObservabilityConfig,
}

impl UpliftConfig {
    /// Load config from a TOML string, falling back to defaults for missing
    /// fields, then validate it.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        self.estimation.validate()?;
        self.refutation.validate()?;
        self.counterfactual.validate()?;
        Ok(())
    }
}
