//! Conditional effects per value of a grouping attribute.
//!
//! Each partition reuses the adjustment-set names and refits on its own rows.
//! A partition that cannot be fitted is skipped with a warning; the rest of
//! the report is unaffected.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uplift_core::errors::{EstimationError, SingularCause, SubgroupError, UpliftErrorCode};
use uplift_core::types::{Dataset, Partition};

use crate::adjustment::AdjustmentSet;
use crate::estimator::{EffectEstimator, Estimate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEffect {
    pub group: String,
    pub n_obs: usize,
    pub estimate: Estimate,
}

impl GroupEffect {
    pub fn ate(&self) -> f64 {
        self.estimate.ate
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedGroup {
    pub group: String,
    pub n_obs: usize,
    pub code: String,
    pub message: String,
}

/// Group effects in ascending group-value order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgroupReport {
    pub attribute: String,
    pub effects: Vec<GroupEffect>,
    pub skipped: Vec<SkippedGroup>,
}

impl SubgroupReport {
    /// `(group, ate)` rows for display.
    pub fn rows(&self) -> Vec<(&str, f64)> {
        self.effects.iter().map(|e| (e.group.as_str(), e.ate())).collect()
    }

    pub fn get(&self, group: &str) -> Option<&GroupEffect> {
        self.effects.iter().find(|e| e.group == group)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubgroupAnalyzer {
    estimator: EffectEstimator,
    parallel: bool,
}

impl SubgroupAnalyzer {
    pub fn new(estimator: EffectEstimator, parallel: bool) -> Self {
        Self { estimator, parallel }
    }

    pub fn by_group(
        &self,
        dataset: &Dataset,
        treatment: &str,
        outcome: &str,
        set: &AdjustmentSet,
        attribute: &str,
    ) -> Result<SubgroupReport, SubgroupError> {
        let not_categorical = || SubgroupError::NotCategorical {
            attribute: attribute.to_string(),
        };
        if dataset.categorical(attribute).is_none() {
            return Err(not_categorical());
        }
        let partitions = dataset.partition_by(attribute).map_err(|_| not_categorical())?;

        // Constant within a partition, so it would only add a zero column.
        let covariates = set.without(attribute);
        let fit = |p: &Partition| self.fit_partition(p, treatment, outcome, &covariates);
        let outcomes: Vec<Result<GroupEffect, SubgroupError>> = if self.parallel {
            partitions.par_iter().map(fit).collect()
        } else {
            partitions.iter().map(fit).collect()
        };

        let mut report = SubgroupReport {
            attribute: attribute.to_string(),
            effects: Vec::new(),
            skipped: Vec::new(),
        };
        for (partition, outcome) in partitions.iter().zip(outcomes) {
            match outcome {
                Ok(effect) => report.effects.push(effect),
                Err(err) => {
                    tracing::warn!(
                        attribute,
                        group = %partition.group,
                        rows = partition.dataset.len(),
                        code = err.error_code(),
                        "skipping subgroup: {err}"
                    );
                    report.skipped.push(SkippedGroup {
                        group: partition.group.clone(),
                        n_obs: partition.dataset.len(),
                        code: err.error_code().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            attribute,
            fitted = report.effects.len(),
            skipped = report.skipped.len(),
            "subgroup analysis complete"
        );
        Ok(report)
    }

    fn fit_partition(
        &self,
        partition: &Partition,
        treatment: &str,
        outcome: &str,
        covariates: &AdjustmentSet,
    ) -> Result<GroupEffect, SubgroupError> {
        let rows = partition.dataset.len();
        match self.estimator.estimate(&partition.dataset, treatment, outcome, covariates) {
            Ok(estimate) => Ok(GroupEffect {
                group: partition.group.clone(),
                n_obs: rows,
                estimate,
            }),
            Err(EstimationError::SingularDesignMatrix {
                cause: SingularCause::TooFewRows { regressors, .. },
            }) => Err(SubgroupError::InsufficientGroupSample {
                group: partition.group.clone(),
                rows,
                required: regressors + 1,
            }),
            Err(source) => Err(SubgroupError::Estimation {
                group: partition.group.clone(),
                source,
            }),
        }
    }
}

/// Subgroup effects with the default estimator, fitted in parallel.
pub fn by_group(
    dataset: &Dataset,
    treatment: &str,
    outcome: &str,
    set: &AdjustmentSet,
    attribute: &str,
) -> Result<SubgroupReport, SubgroupError> {
    SubgroupAnalyzer::new(EffectEstimator::default(), true).by_group(dataset, treatment, outcome, set, attribute)
}
