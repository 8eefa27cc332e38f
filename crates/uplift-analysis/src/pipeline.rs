//! AnalysisPipeline: end-to-end orchestrator.
//!
//! Chains the engine stages for one run:
//! (1) graph validation
//! (2) adjustment-set resolution and column check
//! (3) effect estimation
//! (4) subgroup effects, when a grouping attribute is configured
//! (5) refutation checks
//! (6) counterfactual projection at the configured multiplier
//!
//! The result is a plain value owned by the caller. Nothing is cached
//! between runs.

use std::fmt;

use serde::{Deserialize, Serialize};
use uplift_core::errors::{IdentificationError, UpliftResult};
use uplift_core::types::{Dataset, RefutationKind};
use uplift_core::UpliftConfig;

use crate::adjustment::{self, AdjustmentSet};
use crate::counterfactual::{self, CounterfactualProjection};
use crate::estimator::{EffectEstimator, Estimate};
use crate::graph::{parse_edges, CausalGraph};
use crate::refutation::{RefutationResult, RefutationSuite, SkippedCheck};
use crate::subgroup::{SubgroupAnalyzer, SubgroupReport};

/// Immutable output of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub treatment: String,
    pub outcome: String,
    pub adjustment_set: AdjustmentSet,
    pub estimate: Estimate,
    pub subgroups: Option<SubgroupReport>,
    pub refutations: Vec<RefutationResult>,
    /// Checks whose refit failed. The estimate above is unaffected.
    pub skipped_refutations: Vec<SkippedCheck>,
    /// Relative tolerance used for the stability verdicts in the report.
    pub stability_tolerance: f64,
    pub projection: CounterfactualProjection,
}

impl AnalysisResult {
    pub fn ate(&self) -> f64 {
        self.estimate.ate
    }

    /// Recompute the projection for another multiplier.
    pub fn project(&self, multiplier: f64) -> CounterfactualProjection {
        CounterfactualProjection::new(self.estimate.outcome_mean, self.estimate.ate, multiplier)
    }

    pub fn refutation(&self, kind: RefutationKind) -> Option<&RefutationResult> {
        self.refutations.iter().find(|r| r.kind == kind)
    }

    pub fn to_json(&self) -> UpliftResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &self.estimate;
        writeln!(f, "Causal effect of {} on {}", self.treatment, self.outcome)?;
        writeln!(f, "  adjustment set: {}", self.adjustment_set)?;
        writeln!(
            f,
            "  ATE: {:.4} (se {:.4}, {:.0}% CI [{:.4}, {:.4}], p = {:.4})",
            e.ate,
            e.std_error,
            e.confidence_level * 100.0,
            e.confidence_interval.0,
            e.confidence_interval.1,
            e.p_value
        )?;
        writeln!(f, "  n = {}, R^2 = {:.4}", e.n_obs, e.r_squared)?;

        if let Some(report) = &self.subgroups {
            writeln!(f, "Effects by {}", report.attribute)?;
            for effect in &report.effects {
                writeln!(f, "  {:<16} {:.4} (n = {})", effect.group, effect.ate(), effect.n_obs)?;
            }
            for skipped in &report.skipped {
                writeln!(f, "  {:<16} skipped: {}", skipped.group, skipped.message)?;
            }
        }

        if !self.refutations.is_empty() || !self.skipped_refutations.is_empty() {
            writeln!(f, "Refutations")?;
            for r in &self.refutations {
                let verdict = if r.is_stable(self.stability_tolerance) {
                    "stable"
                } else {
                    "unstable"
                };
                writeln!(
                    f,
                    "  {:<22} original {:.4} -> new {:.4} ({verdict})",
                    r.kind.label(),
                    r.original,
                    r.perturbed
                )?;
            }
            for skipped in &self.skipped_refutations {
                writeln!(f, "  {:<22} skipped: {}", skipped.kind.label(), skipped.message)?;
            }
        }

        let p = &self.projection;
        write!(
            f,
            "Counterfactual: treatment x{:.2} moves mean {} from {:.4} to {:.4}",
            p.multiplier, self.outcome, p.baseline_mean, p.projected_mean
        )
    }
}

/// One configurable pipeline. Estimator backend and refutation set are
/// chosen by configuration.
#[derive(Debug, Clone, Default)]
pub struct AnalysisPipeline {
    config: UpliftConfig,
}

impl AnalysisPipeline {
    pub fn new(config: UpliftConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UpliftConfig {
        &self.config
    }

    /// Build the causal graph from the configured `analysis.edges`.
    pub fn graph_from_config(&self) -> UpliftResult<CausalGraph> {
        let edges = parse_edges(&self.config.analysis.edges)?;
        Ok(CausalGraph::from_edges(&edges)?)
    }

    /// Run every stage against `dataset` and `graph`.
    ///
    /// The configuration is validated first since its fields are public and
    /// may have changed after loading.
    pub fn run_analysis(&self, dataset: &Dataset, graph: &CausalGraph) -> UpliftResult<AnalysisResult> {
        self.config.validate()?;
        let analysis = &self.config.analysis;
        let (treatment, outcome) = (analysis.treatment.as_str(), analysis.outcome.as_str());
        let span = tracing::info_span!("run_analysis", treatment, outcome, rows = dataset.len());
        let _guard = span.enter();

        graph.is_valid(treatment, outcome)?;
        let set = adjustment::resolve(graph, treatment, outcome)?;
        for node in [treatment, outcome].into_iter().chain(set.iter()) {
            if !dataset.has_column(node) {
                return Err(IdentificationError::UnobservedAdjustment {
                    node: node.to_string(),
                }
                .into());
            }
        }

        let estimator = EffectEstimator::from_config(&self.config.estimation)?;
        let estimate = {
            let _stage = tracing::info_span!("estimate").entered();
            estimator.estimate(dataset, treatment, outcome, &set)?
        };
        tracing::info!(
            ate = estimate.ate,
            std_error = estimate.std_error,
            adjustment = %set,
            "average treatment effect"
        );

        let subgroups = match &analysis.group_by {
            Some(attribute) => {
                let _stage = tracing::info_span!("subgroups", attribute = attribute.as_str()).entered();
                let analyzer = SubgroupAnalyzer::new(estimator.clone(), self.config.refutation.parallel);
                Some(analyzer.by_group(dataset, treatment, outcome, &set, attribute)?)
            }
            None => None,
        };

        let refutations = {
            let _stage = tracing::info_span!("refutations").entered();
            RefutationSuite::from_config(&self.config.refutation, estimator)?.run(
                dataset,
                treatment,
                outcome,
                &set,
                estimate.ate,
                self.config.refutation.seed,
            )
        };

        let projection = CounterfactualProjection::new(
            estimate.outcome_mean,
            estimate.ate,
            self.config.counterfactual.multiplier,
        );
        tracing::info!(
            multiplier = projection.multiplier,
            projected_mean = projection.projected_mean,
            "counterfactual projection"
        );

        Ok(AnalysisResult {
            treatment: treatment.to_string(),
            outcome: outcome.to_string(),
            adjustment_set: set,
            estimate,
            subgroups,
            refutations: refutations.results,
            skipped_refutations: refutations.skipped,
            stability_tolerance: self.config.refutation.stability_tolerance,
            projection,
        })
    }

    /// Projection curve over the configured display range.
    pub fn projection_curve(&self, result: &AnalysisResult) -> Vec<CounterfactualProjection> {
        let c = &self.config.counterfactual;
        counterfactual::sweep(
            result.estimate.outcome_mean,
            result.estimate.ate,
            c.min_multiplier,
            c.max_multiplier,
            c.step,
        )
    }
}

/// Run with the given configuration.
pub fn run_analysis(dataset: &Dataset, graph: &CausalGraph, config: &UpliftConfig) -> UpliftResult<AnalysisResult> {
    AnalysisPipeline::new(config.clone()).run_analysis(dataset, graph)
}
