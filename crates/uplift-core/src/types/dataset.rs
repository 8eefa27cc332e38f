//! Column-oriented, schema-validated dataset.
//!
//! A `Dataset` is immutable once built. Refutations and subgroup analysis
//! derive new datasets (`select_rows`, `replace_numeric`, ...) and never
//! touch the source.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::errors::DatasetError;

use super::collections::FxHashMap;
use super::schema::{ColumnKind, ColumnRole, ColumnSpec, Schema};
use super::value::{Record, Value};

/// Column storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric(_) => ColumnKind::Numeric,
            Self::Categorical(_) => ColumnKind::Categorical,
        }
    }

    fn select(&self, rows: &[usize]) -> Column {
        match self {
            Self::Numeric(v) => Self::Numeric(rows.iter().map(|&r| v[r]).collect()),
            Self::Categorical(v) => Self::Categorical(rows.iter().map(|&r| v[r].clone()).collect()),
        }
    }
}

/// One slice of a dataset sharing a single group value.
#[derive(Debug, Clone)]
pub struct Partition {
    pub group: String,
    pub dataset: Dataset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    schema: Schema,
    /// Parallel to `schema.columns()`.
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Build from named columns. Every schema column must be supplied, with
    /// the declared kind, equal lengths, and finite numeric values.
    pub fn new(schema: Schema, columns: Vec<(String, Column)>) -> Result<Self, DatasetError> {
        let mut by_name: FxHashMap<String, Column> = FxHashMap::default();
        for (name, column) in columns {
            if !schema.contains(&name) {
                return Err(DatasetError::UnknownColumn { column: name });
            }
            by_name.insert(name, column);
        }

        let mut ordered = Vec::with_capacity(schema.columns().len());
        let mut rows: Option<usize> = None;
        for spec in schema.columns() {
            let column = by_name
                .remove(&spec.name)
                .ok_or_else(|| DatasetError::MissingColumn {
                    column: spec.name.clone(),
                })?;
            validate_column(spec, &column)?;

            match rows {
                None => rows = Some(column.len()),
                Some(expected) if expected != column.len() => {
                    return Err(DatasetError::LengthMismatch {
                        column: spec.name.clone(),
                        expected,
                        found: column.len(),
                    });
                }
                Some(_) => {}
            }
            ordered.push(column);
        }

        Ok(Self {
            schema,
            columns: ordered,
            rows: rows.unwrap_or(0),
        })
    }

    /// Build from row records. Categorical cells may be numbers; they are
    /// rendered as text (`1.0` becomes `"1"`).
    pub fn from_records(schema: Schema, records: &[Record]) -> Result<Self, DatasetError> {
        for record in records {
            if let Some(name) = record.keys().find(|k| !schema.contains(k)) {
                return Err(DatasetError::UnknownColumn { column: name.clone() });
            }
        }

        let mut columns = Vec::with_capacity(schema.columns().len());
        for spec in schema.columns() {
            let column = match spec.kind {
                ColumnKind::Numeric => {
                    let mut values = Vec::with_capacity(records.len());
                    for record in records {
                        match record.get(&spec.name) {
                            Some(Value::Number(v)) => values.push(*v),
                            Some(Value::Text(_)) => {
                                return Err(DatasetError::KindMismatch {
                                    column: spec.name.clone(),
                                    expected: ColumnKind::Numeric.name(),
                                })
                            }
                            None => {
                                return Err(DatasetError::MissingColumn {
                                    column: spec.name.clone(),
                                })
                            }
                        }
                    }
                    Column::Numeric(values)
                }
                ColumnKind::Categorical => {
                    let mut values = Vec::with_capacity(records.len());
                    for record in records {
                        match record.get(&spec.name) {
                            Some(Value::Text(s)) => values.push(s.clone()),
                            Some(Value::Number(v)) => values.push(v.to_string()),
                            None => {
                                return Err(DatasetError::MissingColumn {
                                    column: spec.name.clone(),
                                })
                            }
                        }
                    }
                    Column::Categorical(values)
                }
            };
            columns.push((spec.name.clone(), column));
        }

        Self::new(schema, columns)
    }

    /// Parse a JSON array of row objects.
    pub fn from_json(schema: Schema, json: &str) -> Result<Self, DatasetError> {
        let records: Vec<Record> = serde_json::from_str(json).map_err(|e| DatasetError::Malformed {
            message: e.to_string(),
        })?;
        Self::from_records(schema, &records)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn treatment(&self) -> &str {
        self.schema.treatment()
    }

    pub fn outcome(&self) -> &str {
        self.schema.outcome()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema.contains(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index_of(name).map(|i| &self.columns[i])
    }

    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        match self.column(name)? {
            Column::Numeric(v) => Some(v),
            Column::Categorical(_) => None,
        }
    }

    pub fn categorical(&self, name: &str) -> Option<&[String]> {
        match self.column(name)? {
            Column::Categorical(v) => Some(v),
            Column::Numeric(_) => None,
        }
    }

    /// Sample mean of a numeric column; `None` for missing, categorical, or
    /// empty columns.
    pub fn mean(&self, name: &str) -> Option<f64> {
        let values = self.numeric(name)?;
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Distinct values of a categorical column in ascending order.
    pub fn levels(&self, name: &str) -> Option<Vec<String>> {
        let values = self.categorical(name)?;
        let set: BTreeSet<&String> = values.iter().collect();
        Some(set.into_iter().cloned().collect())
    }

    /// New dataset containing only `rows`, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            schema: self.schema.clone(),
            columns: self.columns.iter().map(|c| c.select(rows)).collect(),
            rows: rows.len(),
        }
    }

    /// New dataset with an extra numeric column.
    pub fn with_numeric_column(
        &self,
        name: impl Into<String>,
        role: ColumnRole,
        values: Vec<f64>,
    ) -> Result<Self, DatasetError> {
        let spec = ColumnSpec::new(name, ColumnKind::Numeric, role);
        let column = Column::Numeric(values);
        validate_column(&spec, &column)?;
        if column.len() != self.rows {
            return Err(DatasetError::LengthMismatch {
                column: spec.name,
                expected: self.rows,
                found: column.len(),
            });
        }

        let schema = self.schema.with_column(spec)?;
        let mut columns = self.columns.clone();
        columns.push(column);
        Ok(Self {
            schema,
            columns,
            rows: self.rows,
        })
    }

    /// New dataset with the values of numeric column `name` replaced.
    pub fn replace_numeric(&self, name: &str, values: Vec<f64>) -> Result<Self, DatasetError> {
        let idx = self.index_of(name).ok_or_else(|| DatasetError::MissingColumn {
            column: name.to_string(),
        })?;
        let spec = &self.schema.columns()[idx];
        let column = Column::Numeric(values);
        validate_column(spec, &column)?;
        if column.len() != self.rows {
            return Err(DatasetError::LengthMismatch {
                column: name.to_string(),
                expected: self.rows,
                found: column.len(),
            });
        }

        let mut columns = self.columns.clone();
        columns[idx] = column;
        Ok(Self {
            schema: self.schema.clone(),
            columns,
            rows: self.rows,
        })
    }

    /// Split by the values of a categorical column. Partitions come back in
    /// ascending group-value order (numeric when both values parse as
    /// numbers, lexical otherwise); row order inside each is preserved.
    pub fn partition_by(&self, name: &str) -> Result<Vec<Partition>, DatasetError> {
        let values = match self.column(name) {
            Some(Column::Categorical(v)) => v,
            Some(Column::Numeric(_)) => {
                return Err(DatasetError::KindMismatch {
                    column: name.to_string(),
                    expected: ColumnKind::Categorical.name(),
                })
            }
            None => {
                return Err(DatasetError::MissingColumn {
                    column: name.to_string(),
                })
            }
        };

        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (row, value) in values.iter().enumerate() {
            groups.entry(value.as_str()).or_default().push(row);
        }

        let mut groups: Vec<(&str, Vec<usize>)> = groups.into_iter().collect();
        groups.sort_by(|(a, _), (b, _)| group_order(a, b));

        Ok(groups
            .into_iter()
            .map(|(group, rows)| Partition {
                group: group.to_string(),
                dataset: self.select_rows(&rows),
            })
            .collect())
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.schema.columns().iter().position(|c| c.name == name)
    }
}

/// Numbers sort before text and by value; text sorts lexically.
fn group_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn validate_column(spec: &ColumnSpec, column: &Column) -> Result<(), DatasetError> {
    if column.kind() != spec.kind {
        return Err(DatasetError::KindMismatch {
            column: spec.name.clone(),
            expected: spec.kind.name(),
        });
    }
    if let Column::Numeric(values) = column {
        if let Some(row) = values.iter().position(|v| !v.is_finite()) {
            return Err(DatasetError::NonFiniteValue {
                column: spec.name.clone(),
                row,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::builder()
            .treatment("spend")
            .outcome("conversions")
            .group("segment")
            .build()
            .unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::new(
            schema(),
            vec![
                ("spend".into(), Column::Numeric(vec![1.0, 2.0, 3.0, 4.0])),
                ("conversions".into(), Column::Numeric(vec![2.0, 4.0, 6.0, 8.0])),
                (
                    "segment".into(),
                    Column::Categorical(vec!["B".into(), "A".into(), "B".into(), "A".into()]),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = Dataset::new(
            schema(),
            vec![
                ("spend".into(), Column::Numeric(vec![1.0, 2.0])),
                ("conversions".into(), Column::Numeric(vec![2.0])),
                ("segment".into(), Column::Categorical(vec!["A".into(), "B".into()])),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::LengthMismatch { .. }));
    }

    #[test]
    fn non_finite_is_rejected() {
        let err = Dataset::new(
            schema(),
            vec![
                ("spend".into(), Column::Numeric(vec![1.0, f64::NAN])),
                ("conversions".into(), Column::Numeric(vec![2.0, 1.0])),
                ("segment".into(), Column::Categorical(vec!["A".into(), "B".into()])),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DatasetError::NonFiniteValue {
                column: "spend".into(),
                row: 1
            }
        );
    }

    #[test]
    fn partitions_are_sorted_and_preserve_rows() {
        let parts = dataset().partition_by("segment").unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].group, "A");
        assert_eq!(parts[0].dataset.numeric("spend").unwrap(), &[2.0, 4.0]);
        assert_eq!(parts[1].group, "B");
        assert_eq!(parts[1].dataset.numeric("spend").unwrap(), &[1.0, 3.0]);
    }

    #[test]
    fn numeric_group_values_sort_by_value() {
        let json = r#"[
            {"spend": 1.0, "conversions": 1.0, "segment": 10},
            {"spend": 2.0, "conversions": 2.0, "segment": 2},
            {"spend": 3.0, "conversions": 3.0, "segment": "Churned"},
            {"spend": 4.0, "conversions": 4.0, "segment": 1},
            {"spend": 5.0, "conversions": 5.0, "segment": 2}
        ]"#;
        let parts = Dataset::from_json(schema(), json).unwrap().partition_by("segment").unwrap();
        let groups: Vec<&str> = parts.iter().map(|p| p.group.as_str()).collect();
        assert_eq!(groups, vec!["1", "2", "10", "Churned"]);
        assert_eq!(parts[1].dataset.numeric("spend").unwrap(), &[2.0, 5.0]);
    }

    #[test]
    fn derived_datasets_leave_source_untouched() {
        let source = dataset();
        let replaced = source.replace_numeric("spend", vec![0.0; 4]).unwrap();
        assert_eq!(source.numeric("spend").unwrap(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(replaced.numeric("spend").unwrap(), &[0.0; 4]);

        let extended = source
            .with_numeric_column("noise", ColumnRole::Confounder, vec![0.5; 4])
            .unwrap();
        assert!(extended.has_column("noise"));
        assert!(!source.has_column("noise"));
    }

    #[test]
    fn json_records_load() {
        let json = r#"[
            {"spend": 1.0, "conversions": 3.0, "segment": "A"},
            {"spend": 2.0, "conversions": 5.0, "segment": 2}
        ]"#;
        let ds = Dataset::from_json(schema(), json).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.levels("segment").unwrap(), vec!["2".to_string(), "A".to_string()]);
        assert_eq!(ds.mean("conversions"), Some(4.0));
    }

    #[test]
    fn text_in_numeric_column_is_rejected() {
        let json = r#"[{"spend": "lots", "conversions": 3.0, "segment": "A"}]"#;
        let err = Dataset::from_json(schema(), json).unwrap_err();
        assert!(matches!(err, DatasetError::KindMismatch { .. }));
    }
}
