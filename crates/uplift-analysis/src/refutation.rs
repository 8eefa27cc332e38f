//! Robustness checks that perturb the estimation inputs and refit.
//!
//! Every check works on a derived copy of the dataset and owns an RNG seeded
//! from `seed + kind.ordinal()`, so parallel and sequential runs produce the
//! same numbers. An unstable estimate is a result, never an error. A check
//! whose refit fails is skipped with a warning; the other checks still run.

use rand::distributions::Distribution;
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use uplift_core::config::RefutationConfig;
use uplift_core::errors::{EstimationError, RefutationError, UpliftErrorCode};
use uplift_core::types::{ColumnRole, Dataset, RefutationKind};

use crate::adjustment::AdjustmentSet;
use crate::estimator::EffectEstimator;

const RANDOM_COLUMN: &str = "random_common_cause";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefutationResult {
    pub kind: RefutationKind,
    pub original: f64,
    pub perturbed: f64,
    pub seed: u64,
}

impl RefutationResult {
    pub fn absolute_change(&self) -> f64 {
        (self.perturbed - self.original).abs()
    }

    /// Change relative to the original magnitude. Infinite when the original
    /// is zero and the perturbed value is not.
    pub fn relative_change(&self) -> f64 {
        let change = self.absolute_change();
        if change == 0.0 {
            0.0
        } else {
            change / self.original.abs()
        }
    }

    /// Placebo passes when the effect collapses toward zero; the other
    /// checks pass when the effect barely moves.
    pub fn is_stable(&self, tolerance: f64) -> bool {
        match self.kind {
            RefutationKind::PlaceboTreatment => self.perturbed.abs() <= tolerance * self.original.abs(),
            RefutationKind::RandomCommonCause | RefutationKind::DataSubset => self.relative_change() <= tolerance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCheck {
    pub kind: RefutationKind,
    pub seed: u64,
    pub code: String,
    pub message: String,
}

/// Completed checks in configured order, plus the checks that could not refit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RefutationReport {
    pub results: Vec<RefutationResult>,
    pub skipped: Vec<SkippedCheck>,
}

impl RefutationReport {
    pub fn get(&self, kind: RefutationKind) -> Option<&RefutationResult> {
        self.results.iter().find(|r| r.kind == kind)
    }
}

#[derive(Debug, Clone)]
pub struct RefutationSuite {
    checks: Vec<RefutationKind>,
    subset_fraction: f64,
    parallel: bool,
    estimator: EffectEstimator,
}

impl RefutationSuite {
    pub fn new(checks: Vec<RefutationKind>, subset_fraction: f64, parallel: bool) -> Result<Self, RefutationError> {
        if !(subset_fraction > 0.0 && subset_fraction <= 1.0) {
            return Err(RefutationError::InvalidSubsetFraction {
                fraction: subset_fraction,
            });
        }
        Ok(Self {
            checks,
            subset_fraction,
            parallel,
            estimator: EffectEstimator::default(),
        })
    }

    pub fn from_config(config: &RefutationConfig, estimator: EffectEstimator) -> Result<Self, RefutationError> {
        Ok(Self::new(config.checks.clone(), config.subset_fraction, config.parallel)?.with_estimator(estimator))
    }

    pub fn with_estimator(mut self, estimator: EffectEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn checks(&self) -> &[RefutationKind] {
        &self.checks
    }

    /// Run every configured check, in configured order. A failing check is
    /// recorded in `skipped` and never aborts the others.
    pub fn run(
        &self,
        dataset: &Dataset,
        treatment: &str,
        outcome: &str,
        set: &AdjustmentSet,
        original: f64,
        seed: u64,
    ) -> RefutationReport {
        let run_one = |kind: &RefutationKind| self.run_check(*kind, dataset, treatment, outcome, set, original, seed);
        let outcomes: Vec<Result<RefutationResult, RefutationError>> = if self.parallel {
            self.checks.par_iter().map(run_one).collect()
        } else {
            self.checks.iter().map(run_one).collect()
        };

        let mut report = RefutationReport::default();
        for (kind, outcome) in self.checks.iter().zip(outcomes) {
            match outcome {
                Ok(r) => {
                    tracing::info!(
                        check = %r.kind,
                        original = r.original,
                        perturbed = r.perturbed,
                        seed = r.seed,
                        "refutation complete"
                    );
                    report.results.push(r);
                }
                Err(err) => {
                    let check_seed = seed.wrapping_add(kind.ordinal());
                    tracing::warn!(
                        check = %kind,
                        seed = check_seed,
                        code = err.error_code(),
                        "skipping refutation: {err}"
                    );
                    report.skipped.push(SkippedCheck {
                        kind: *kind,
                        seed: check_seed,
                        code: err.error_code().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }
        report
    }

    /// Run one check. The check's seed is `seed + kind.ordinal()`.
    #[allow(clippy::too_many_arguments)]
    pub fn run_check(
        &self,
        kind: RefutationKind,
        dataset: &Dataset,
        treatment: &str,
        outcome: &str,
        set: &AdjustmentSet,
        original: f64,
        seed: u64,
    ) -> Result<RefutationResult, RefutationError> {
        let check_seed = seed.wrapping_add(kind.ordinal());
        let mut rng = ChaCha8Rng::seed_from_u64(check_seed);
        let refit = |data: &Dataset, covariates: &AdjustmentSet| {
            self.estimator
                .estimate(data, treatment, outcome, covariates)
                .map(|e| e.ate)
                .map_err(|source| estimation_failed(kind, source))
        };

        let perturbed = match kind {
            RefutationKind::RandomCommonCause => {
                let normal = Normal::new(0.0, 1.0).map_err(|e| RefutationError::Sampler {
                    check: kind.label(),
                    message: e.to_string(),
                })?;
                let values: Vec<f64> = (0..dataset.len())
                    .map(|_| normal.sample(&mut rng))
                    .collect();
                let name = unique_column_name(dataset, RANDOM_COLUMN);
                let augmented = dataset
                    .with_numeric_column(name.clone(), ColumnRole::Confounder, values)
                    .map_err(|e| RefutationError::Sampler {
                        check: kind.label(),
                        message: e.to_string(),
                    })?;
                let covariates = AdjustmentSet::new(set.iter().chain([name.as_str()]));
                refit(&augmented, &covariates)?
            }
            RefutationKind::PlaceboTreatment => {
                let mut shuffled = dataset
                    .numeric(treatment)
                    .ok_or_else(|| {
                        estimation_failed(
                            kind,
                            EstimationError::NonNumericColumn {
                                column: treatment.to_string(),
                            },
                        )
                    })?
                    .to_vec();
                shuffled.shuffle(&mut rng);
                let placebo = dataset
                    .replace_numeric(treatment, shuffled)
                    .map_err(|e| RefutationError::Sampler {
                        check: kind.label(),
                        message: e.to_string(),
                    })?;
                refit(&placebo, set)?
            }
            RefutationKind::DataSubset => {
                let n = dataset.len();
                let take = (self.subset_fraction * n as f64).floor() as usize;
                let mut rows = index::sample(&mut rng, n, take.min(n)).into_vec();
                rows.sort_unstable();
                refit(&dataset.select_rows(&rows), set)?
            }
        };

        Ok(RefutationResult {
            kind,
            original,
            perturbed,
            seed: check_seed,
        })
    }
}

impl Default for RefutationSuite {
    fn default() -> Self {
        Self {
            checks: RefutationKind::ALL.to_vec(),
            subset_fraction: 0.7,
            parallel: true,
            estimator: EffectEstimator::default(),
        }
    }
}

fn estimation_failed(kind: RefutationKind, source: EstimationError) -> RefutationError {
    RefutationError::Estimation {
        check: kind.label(),
        source,
    }
}

/// `base`, or `base_1`, `base_2`, ... until the name is free.
fn unique_column_name(dataset: &Dataset, base: &str) -> String {
    if !dataset.has_column(base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{base}_{i}"))
        .find(|candidate| !dataset.has_column(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uplift_core::types::{Column, Schema};

    fn linear(n: usize) -> Dataset {
        let schema = Schema::builder()
            .treatment("t")
            .outcome("y")
            .numeric_confounder("c")
            .build()
            .unwrap();
        let t: Vec<f64> = (0..n).map(|i| ((i * 37) % 101) as f64).collect();
        let c: Vec<f64> = (0..n).map(|i| ((i * 11) % 7) as f64).collect();
        let y: Vec<f64> = (0..n)
            .map(|i| 3.0 + 1.5 * t[i] + 2.0 * c[i] + ((i * 13) % 9) as f64 - 4.0)
            .collect();
        Dataset::new(
            schema,
            vec![
                ("t".into(), Column::Numeric(t)),
                ("y".into(), Column::Numeric(y)),
                ("c".into(), Column::Numeric(c)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn invalid_fraction_is_rejected() {
        for bad in [0.0, -0.1, 1.5, f64::NAN] {
            assert!(RefutationSuite::new(RefutationKind::ALL.to_vec(), bad, false).is_err());
        }
        assert!(RefutationSuite::new(vec![], 1.0, false).is_ok());
    }

    #[test]
    fn seeds_are_offset_per_check() {
        let ds = linear(200);
        let set = AdjustmentSet::new(["c"]);
        let suite = RefutationSuite::default();
        let results = suite.run(&ds, "t", "y", &set, 1.5, 40).results;
        let seeds: Vec<u64> = results.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![40, 41, 42]);
        let kinds: Vec<RefutationKind> = results.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, RefutationKind::ALL.to_vec());
    }

    #[test]
    fn strong_effect_survives_every_check() {
        let ds = linear(2000);
        let set = AdjustmentSet::new(["c"]);
        let report = RefutationSuite::default().run(&ds, "t", "y", &set, 1.5, 7);
        assert!(report.skipped.is_empty());
        for r in &report.results {
            assert!(r.is_stable(0.1), "{} unstable: {r:?}", r.kind);
        }
    }

    #[test]
    fn source_dataset_is_untouched() {
        let ds = linear(100);
        let before = ds.clone();
        RefutationSuite::default()
            .run(&ds, "t", "y", &AdjustmentSet::new(["c"]), 1.5, 3);
        assert_eq!(ds, before);
    }

    #[test]
    fn failed_refit_skips_only_that_check() {
        // Three regressors on four rows: the base fit works, the augmented
        // and subset refits do not.
        let ds = linear(4);
        let report = RefutationSuite::default().run(&ds, "t", "y", &AdjustmentSet::new(["c"]), 1.5, 5);
        let skipped: Vec<RefutationKind> = report.skipped.iter().map(|s| s.kind).collect();
        assert!(skipped.contains(&RefutationKind::RandomCommonCause));
        assert!(skipped.contains(&RefutationKind::DataSubset));
        assert_eq!(report.results.len() + report.skipped.len(), 3);
        let rcc = &report.skipped[0];
        assert_eq!(rcc.seed, 5 + RefutationKind::RandomCommonCause.ordinal());
        assert_eq!(rcc.code, "ESTIMATION_SINGULAR_DESIGN");
    }

    #[test]
    fn random_column_name_avoids_collisions() {
        let ds = linear(10)
            .with_numeric_column(RANDOM_COLUMN, ColumnRole::Other, vec![0.0; 10])
            .unwrap();
        assert_eq!(unique_column_name(&ds, RANDOM_COLUMN), "random_common_cause_1");
    }

    #[test]
    fn relative_change_handles_zero_original() {
        let r = RefutationResult {
            kind: RefutationKind::DataSubset,
            original: 0.0,
            perturbed: 0.0,
            seed: 0,
        };
        assert_eq!(r.relative_change(), 0.0);
        let r = RefutationResult { perturbed: 0.2, ..r };
        assert!(r.relative_change().is_infinite());
        assert!(!r.is_stable(0.1));
    }
}
