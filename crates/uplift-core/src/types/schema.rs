//! Typed dataset schema: column names, semantic kinds, and analysis roles,
//! validated once when the schema is built.

use serde::{Deserialize, Serialize};

use crate::errors::DatasetError;

use super::collections::FxHashSet;

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
        }
    }
}

/// What a column is used for in the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Treatment,
    Outcome,
    Confounder,
    Group,
    /// Observed but not used by default (mediators, funnel metrics).
    Other,
}

impl ColumnRole {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Treatment => "treatment",
            Self::Outcome => "outcome",
            Self::Confounder => "confounder",
            Self::Group => "group",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
    pub role: ColumnRole,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ColumnKind, role: ColumnRole) -> Self {
        Self {
            name: name.into(),
            kind,
            role,
        }
    }
}

/// Validated schema. Exactly one numeric treatment and one numeric outcome;
/// group columns are categorical; names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
    treatment: usize,
    outcome: usize,
}

impl Schema {
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, DatasetError> {
        let mut seen = FxHashSet::default();
        for spec in &columns {
            if !seen.insert(spec.name.as_str()) {
                return Err(DatasetError::DuplicateColumn {
                    column: spec.name.clone(),
                });
            }
            if spec.role == ColumnRole::Group && spec.kind != ColumnKind::Categorical {
                return Err(DatasetError::RoleKind {
                    column: spec.name.clone(),
                    role: spec.role.name(),
                    expected: ColumnKind::Categorical.name(),
                });
            }
        }

        let treatment = single_role(&columns, ColumnRole::Treatment)?;
        let outcome = single_role(&columns, ColumnRole::Outcome)?;

        Ok(Self {
            columns,
            treatment,
            outcome,
        })
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn treatment(&self) -> &str {
        &self.columns[self.treatment].name
    }

    pub fn outcome(&self) -> &str {
        &self.columns[self.outcome].name
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of all columns with the given role, in declaration order.
    pub fn with_role(&self, role: ColumnRole) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.role == role)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Schema with one more column appended. Used for derived datasets.
    pub fn with_column(&self, spec: ColumnSpec) -> Result<Self, DatasetError> {
        let mut columns = self.columns.clone();
        columns.push(spec);
        Self::new(columns)
    }
}

fn single_role(columns: &[ColumnSpec], role: ColumnRole) -> Result<usize, DatasetError> {
    let matches: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.role == role)
        .map(|(i, _)| i)
        .collect();
    if matches.len() != 1 {
        return Err(DatasetError::RoleCardinality {
            role: role.name(),
            found: matches.len(),
        });
    }
    let idx = matches[0];
    if columns[idx].kind != ColumnKind::Numeric {
        return Err(DatasetError::RoleKind {
            column: columns[idx].name.clone(),
            role: role.name(),
            expected: ColumnKind::Numeric.name(),
        });
    }
    Ok(idx)
}

/// Fluent construction for schemas.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<ColumnSpec>,
}

impl SchemaBuilder {
    pub fn treatment(self, name: impl Into<String>) -> Self {
        self.column(name, ColumnKind::Numeric, ColumnRole::Treatment)
    }

    pub fn outcome(self, name: impl Into<String>) -> Self {
        self.column(name, ColumnKind::Numeric, ColumnRole::Outcome)
    }

    pub fn numeric_confounder(self, name: impl Into<String>) -> Self {
        self.column(name, ColumnKind::Numeric, ColumnRole::Confounder)
    }

    pub fn categorical_confounder(self, name: impl Into<String>) -> Self {
        self.column(name, ColumnKind::Categorical, ColumnRole::Confounder)
    }

    pub fn group(self, name: impl Into<String>) -> Self {
        self.column(name, ColumnKind::Categorical, ColumnRole::Group)
    }

    pub fn other(self, name: impl Into<String>, kind: ColumnKind) -> Self {
        self.column(name, kind, ColumnRole::Other)
    }

    pub fn column(mut self, name: impl Into<String>, kind: ColumnKind, role: ColumnRole) -> Self {
        self.columns.push(ColumnSpec::new(name, kind, role));
        self
    }

    pub fn build(self) -> Result<Schema, DatasetError> {
        Schema::new(self.columns)
    }
}
