//! Shared types: collection aliases, the typed dataset schema, and the
//! enumerated strategies selected by configuration.

pub mod collections;
pub mod dataset;
pub mod schema;
pub mod strategy;
pub mod value;

pub use dataset::{Column, Dataset, Partition};
pub use schema::{ColumnKind, ColumnRole, ColumnSpec, Schema, SchemaBuilder};
pub use strategy::{EstimatorStrategy, RefutationKind};
pub use value::{Record, Value};
