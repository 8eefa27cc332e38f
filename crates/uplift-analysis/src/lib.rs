//! # uplift-analysis
//!
//! Causal-effect engine. Given a dataset and a causal graph it resolves a
//! backdoor adjustment set, estimates the average treatment effect by
//! covariate-adjusted OLS, breaks the effect down by subgroup, runs
//! refutation checks and projects a counterfactual outcome mean.

pub mod adjustment;
pub mod counterfactual;
pub mod design;
pub mod estimator;
pub mod graph;
pub mod pipeline;
pub mod refutation;
pub mod subgroup;

pub use adjustment::{resolve, satisfies_backdoor, AdjustmentSet};
pub use counterfactual::{project, CounterfactualProjection};
pub use estimator::{EffectEstimator, Estimate};
pub use graph::{CausalGraph, Edge};
pub use pipeline::{run_analysis, AnalysisPipeline, AnalysisResult};
pub use refutation::{RefutationReport, RefutationResult, RefutationSuite, SkippedCheck};
pub use subgroup::{GroupEffect, SubgroupAnalyzer, SubgroupReport};
