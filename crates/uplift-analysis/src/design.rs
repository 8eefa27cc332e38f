//! Design-matrix construction.
//!
//! Column layout: intercept, treatment, then covariates in ascending name
//! order. A categorical covariate with k levels becomes k-1 indicator
//! columns; the lexically smallest level is the reference.

use nalgebra::{DMatrix, DVector};
use uplift_core::errors::EstimationError;
use uplift_core::types::{Column, Dataset};

use crate::adjustment::AdjustmentSet;

pub const INTERCEPT: &str = "(intercept)";

/// Column index of the treatment in every design matrix.
pub const TREATMENT_COLUMN: usize = 1;

#[derive(Debug, Clone)]
pub struct DesignMatrix {
    pub labels: Vec<String>,
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
}

impl DesignMatrix {
    pub fn build(
        dataset: &Dataset,
        treatment: &str,
        outcome: &str,
        covariates: &AdjustmentSet,
    ) -> Result<Self, EstimationError> {
        if dataset.is_empty() {
            return Err(EstimationError::EmptyDataset);
        }
        let n = dataset.len();
        let y = numeric_column(dataset, outcome)?;
        let t = numeric_column(dataset, treatment)?;

        let mut labels = vec![INTERCEPT.to_string(), treatment.to_string()];
        let mut columns: Vec<Vec<f64>> = vec![vec![1.0; n], t.to_vec()];

        for name in covariates.iter() {
            match dataset.column(name) {
                Some(Column::Numeric(values)) => {
                    labels.push(name.to_string());
                    columns.push(values.clone());
                }
                Some(Column::Categorical(values)) => {
                    let levels = dataset.levels(name).unwrap_or_default();
                    for level in levels.iter().skip(1) {
                        labels.push(format!("{name}[{level}]"));
                        columns.push(values.iter().map(|v| if v == level { 1.0 } else { 0.0 }).collect());
                    }
                }
                None => {
                    return Err(EstimationError::MissingColumn {
                        column: name.to_string(),
                    })
                }
            }
        }

        let p = columns.len();
        let x = DMatrix::from_iterator(n, p, columns.into_iter().flatten());
        Ok(Self {
            labels,
            x,
            y: DVector::from_column_slice(y),
        })
    }

    pub fn rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn regressors(&self) -> usize {
        self.x.ncols()
    }
}

fn numeric_column<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a [f64], EstimationError> {
    match dataset.column(name) {
        Some(Column::Numeric(values)) => Ok(values),
        Some(Column::Categorical(_)) => Err(EstimationError::NonNumericColumn {
            column: name.to_string(),
        }),
        None => Err(EstimationError::MissingColumn {
            column: name.to_string(),
        }),
    }
}
