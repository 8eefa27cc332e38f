//! Covariate-adjusted effect estimation.
//!
//! Fits `outcome ~ 1 + treatment + covariates` and reports the treatment
//! coefficient as the ATE. This assumes a linear, additive, constant
//! marginal effect of treatment.

use nalgebra::{DMatrix, DVector, SVD};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use uplift_core::config::EstimationConfig;
use uplift_core::errors::{ConfigError, EstimationError, SingularCause};
use uplift_core::types::{Dataset, EstimatorStrategy};

use crate::adjustment::AdjustmentSet;
use crate::design::{DesignMatrix, TREATMENT_COLUMN};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub label: String,
    pub value: f64,
    pub std_error: f64,
}

/// Fitted effect plus residual diagnostics. Read-only downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub treatment: String,
    pub outcome: String,
    pub adjustment_set: AdjustmentSet,
    pub strategy: EstimatorStrategy,
    /// Coefficient on the treatment column.
    pub ate: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    /// Two-sided Student-t p-value for `ate == 0`.
    pub p_value: f64,
    pub confidence_level: f64,
    pub confidence_interval: (f64, f64),
    pub outcome_mean: f64,
    pub treatment_mean: f64,
    pub n_obs: usize,
    pub degrees_of_freedom: usize,
    pub r_squared: f64,
    pub residual_std_error: f64,
    pub coefficients: Vec<Coefficient>,
}

/// Estimator selected by an [`EstimatorStrategy`].
#[derive(Debug, Clone)]
pub struct EffectEstimator {
    strategy: EstimatorStrategy,
    rank_tolerance: f64,
    confidence_level: f64,
}

impl Default for EffectEstimator {
    fn default() -> Self {
        let config = EstimationConfig::default();
        Self {
            strategy: config.strategy,
            rank_tolerance: config.rank_tolerance,
            confidence_level: config.confidence_level,
        }
    }
}

impl EffectEstimator {
    pub fn new(strategy: EstimatorStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Rejects a tolerance or confidence level outside (0, 1).
    pub fn from_config(config: &EstimationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            strategy: config.strategy,
            rank_tolerance: config.rank_tolerance,
            confidence_level: config.confidence_level,
        })
    }

    pub fn strategy(&self) -> EstimatorStrategy {
        self.strategy
    }

    /// Estimate the effect of `treatment` on `outcome` adjusting for `set`.
    ///
    /// Pure function of its inputs. Fails with `SingularDesignMatrix` when
    /// rows do not exceed regressors or a design column is collinear.
    pub fn estimate(
        &self,
        dataset: &Dataset,
        treatment: &str,
        outcome: &str,
        set: &AdjustmentSet,
    ) -> Result<Estimate, EstimationError> {
        let design = DesignMatrix::build(dataset, treatment, outcome, set)?;
        let fit = match self.strategy {
            EstimatorStrategy::OrdinaryLeastSquares => self.fit_ols(&design)?,
        };

        let (rows, p) = (design.rows(), design.regressors());
        let df = rows - p;
        let ate = fit.beta[TREATMENT_COLUMN];
        let std_error = fit.std_errors[TREATMENT_COLUMN];
        let t_statistic = t_stat(ate, std_error);
        let dist = StudentsT::new(0.0, 1.0, df as f64).ok();
        let p_value = match &dist {
            Some(d) if t_statistic.is_finite() => 2.0 * (1.0 - d.cdf(t_statistic.abs())),
            Some(_) => 0.0,
            None => f64::NAN,
        };
        let half_width = dist
            .map(|d| d.inverse_cdf(1.0 - (1.0 - self.confidence_level) / 2.0) * std_error)
            .unwrap_or(f64::NAN);

        let outcome_mean = design.y.mean();
        let treatment_mean = design.x.column(TREATMENT_COLUMN).mean();
        let tss: f64 = design.y.iter().map(|v| (v - outcome_mean).powi(2)).sum();
        let r_squared = if tss > 0.0 { 1.0 - fit.rss / tss } else { 1.0 };

        let coefficients = design
            .labels
            .iter()
            .zip(fit.beta.iter().zip(fit.std_errors.iter()))
            .map(|(label, (&value, &std_error))| Coefficient {
                label: label.clone(),
                value,
                std_error,
            })
            .collect();

        tracing::debug!(
            %treatment,
            %outcome,
            rows,
            regressors = p,
            ate,
            std_error,
            "effect estimated"
        );

        Ok(Estimate {
            treatment: treatment.to_string(),
            outcome: outcome.to_string(),
            adjustment_set: set.clone(),
            strategy: self.strategy,
            ate,
            std_error,
            t_statistic,
            p_value,
            confidence_level: self.confidence_level,
            confidence_interval: (ate - half_width, ate + half_width),
            outcome_mean,
            treatment_mean,
            n_obs: rows,
            degrees_of_freedom: df,
            r_squared,
            residual_std_error: (fit.rss / df as f64).sqrt(),
            coefficients,
        })
    }

    /// Normal-equations OLS, solved by Cholesky after a rank check.
    fn fit_ols(&self, design: &DesignMatrix) -> Result<OlsFit, EstimationError> {
        let (rows, p) = (design.rows(), design.regressors());
        if rows <= p {
            return Err(EstimationError::SingularDesignMatrix {
                cause: SingularCause::TooFewRows { rows, regressors: p },
            });
        }
        if let Some(column) = first_collinear_column(&design.x, self.rank_tolerance) {
            return Err(EstimationError::SingularDesignMatrix {
                cause: SingularCause::Collinear {
                    column: design.labels[column].clone(),
                },
            });
        }

        let xt = design.x.transpose();
        let (beta, inverse) = solve_normal_equations(&xt * &design.x, &xt * &design.y)?;
        let residuals = &design.y - &design.x * &beta;
        let rss = residuals.norm_squared();
        let sigma2 = rss / (rows - p) as f64;
        let std_errors = (0..p).map(|j| (sigma2 * inverse[(j, j)]).max(0.0).sqrt()).collect();

        Ok(OlsFit {
            beta: beta.iter().copied().collect(),
            std_errors,
            rss,
        })
    }
}

/// Estimate with the default OLS estimator.
pub fn estimate(
    dataset: &Dataset,
    treatment: &str,
    outcome: &str,
    set: &AdjustmentSet,
) -> Result<Estimate, EstimationError> {
    EffectEstimator::default().estimate(dataset, treatment, outcome, set)
}

struct OlsFit {
    beta: Vec<f64>,
    std_errors: Vec<f64>,
    rss: f64,
}

/// Solve `xtx * beta = xty` by Cholesky and return `beta` with `xtx⁻¹`.
fn solve_normal_equations(
    xtx: DMatrix<f64>,
    xty: DVector<f64>,
) -> Result<(DVector<f64>, DMatrix<f64>), EstimationError> {
    let cholesky = xtx.cholesky().ok_or(EstimationError::SingularDesignMatrix {
        cause: SingularCause::IllConditioned,
    })?;
    Ok((cholesky.solve(&xty), cholesky.inverse()))
}

fn t_stat(value: f64, std_error: f64) -> f64 {
    if std_error > 0.0 {
        value / std_error
    } else if value == 0.0 {
        0.0
    } else {
        value.signum() * f64::INFINITY
    }
}

/// Index of the first column that does not raise the rank of the columns
/// before it. Columns are scaled to unit norm first so the tolerance does
/// not depend on units (spend in dollars next to 0/1 indicators).
fn first_collinear_column(x: &DMatrix<f64>, tolerance: f64) -> Option<usize> {
    let mut normalized = x.clone();
    for mut column in normalized.column_iter_mut() {
        let norm = column.norm();
        if norm == 0.0 {
            continue;
        }
        column /= norm;
    }

    if numerical_rank(&normalized, tolerance) == normalized.ncols() {
        return None;
    }
    (1..=normalized.ncols())
        .find(|&k| numerical_rank(&normalized.columns(0, k).into_owned(), tolerance) < k)
        .map(|k| k - 1)
}

fn numerical_rank(m: &DMatrix<f64>, tolerance: f64) -> usize {
    let singular = SVD::new(m.clone(), false, false).singular_values;
    let max = singular.max();
    if max <= 0.0 {
        return 0;
    }
    singular.iter().filter(|&&s| s > tolerance * max).count()
}
