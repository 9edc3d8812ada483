//! Structural delta types produced by the hierarchical differ.

use super::schema::Column;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    Schema,
    Table,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Added,
    Removed,
    TypeChanged,
    NullabilityChanged,
}

/// One structural delta between a before- and after- schema.
///
/// Invariants (spec §3): every `COLUMN` change carries `schema`/`table`;
/// every `TABLE` change carries `schema`. `ADDED` carries `after` only,
/// `REMOVED` carries `before` only; `TYPE_CHANGED`/`NULLABILITY_CHANGED`
/// carry both.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct SchemaChange {
    pub object_type: ObjectType,
    pub change_type: ChangeType,
    pub schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Column>,
}

/// Ordered, deterministic sequence of structural changes.
///
/// Order carries no semantic meaning to the rule engine but MUST be
/// stable for a given input pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct SchemaDiff {
    pub changes: Vec<SchemaChange>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}
