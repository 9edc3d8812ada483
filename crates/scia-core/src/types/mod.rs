//! Shared data contracts between the input resolver, differ, rule engine,
//! impact analyzer, and risk aggregator.

mod dialect;
mod diff;
mod finding;
mod schema;
mod sql_signal;

pub use dialect::Dialect;
pub use diff::{ChangeType, ObjectType, SchemaChange, SchemaDiff};
pub use finding::{
    DependencyObject, DependencyObjectType, Finding, FindingType, ImpactDetail,
    RiskAssessment, RiskClassification, Severity,
};
pub use schema::{Column, Table};
pub use sql_signal::{
    any_signal_has_column, any_signal_has_group_by, any_signal_has_join_key, SqlMetadata,
    SqlSignals,
};

use serde::{Deserialize, Serialize};

/// How a single side (before/after) of an analysis request was classified
/// by the input resolver (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Json,
    Ddl,
    DbRef,
}

/// Overall mode for an analysis run, derived from both sides' `InputKind`
/// per §4.1's precedence (JSON < DDL < DB_REF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Json,
    Ddl,
    DbRef,
}
