//! Which columns the analysis targets.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Treatment variable (graph node and dataset column).
    pub treatment: String,
    /// Outcome variable (graph node and dataset column).
    pub outcome: String,
    /// Categorical attribute for per-segment effects. `None` skips subgroups.
    pub group_by: Option<String>,
    /// Causal graph edges in `"A -> B"` form. Empty means the caller
    /// supplies the graph directly.
    pub edges: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            treatment: "CampaignSpend".to_string(),
            outcome: "Conversions".to_string(),
            group_by: Some("CustomerSegment".to_string()),
            edges: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.treatment.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "analysis.treatment",
                message: "must not be empty".into(),
            });
        }
        if self.outcome.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "analysis.outcome",
                message: "must not be empty".into(),
            });
        }
        if self.treatment == self.outcome {
            return Err(ConfigError::InvalidValue {
                field: "analysis.outcome",
                message: format!("must differ from treatment '{}'", self.treatment),
            });
        }
        if matches!(&self.group_by, Some(g) if *g == self.treatment || *g == self.outcome) {
            return Err(ConfigError::InvalidValue {
                field: "analysis.group_by",
                message: "cannot group by the treatment or outcome".into(),
            });
        }
        Ok(())
    }
}
