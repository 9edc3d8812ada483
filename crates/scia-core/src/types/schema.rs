//! The normalized schema model: columns, tables, and their identity rules.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single column definition, dialect-neutral.
///
/// `data_type` is stored upper-cased; comparison and hashing are
/// case-insensitive over `(schema_name, table_name, column_name)`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct Column {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    pub schema_name: String,
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub ordinal_position: u32,
}

impl Column {
    pub fn new(
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
        column_name: impl Into<String>,
        data_type: impl Into<String>,
        is_nullable: bool,
        ordinal_position: u32,
    ) -> Self {
        Self {
            database_name: None,
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            column_name: column_name.into(),
            data_type: data_type.into().to_uppercase(),
            is_nullable,
            ordinal_position,
        }
    }

    /// Case-insensitive identity key: `(schema, table, column)`.
    pub fn identity_key(&self) -> (String, String, String) {
        (
            self.schema_name.to_uppercase(),
            self.table_name.to_uppercase(),
            self.column_name.to_uppercase(),
        )
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}
impl Eq for Column {}

impl std::hash::Hash for Column {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identity_key().hash(state);
    }
}

/// A table definition: an ordered sequence of columns, identity
/// `(schema_name, name)` upper-cased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct Table {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    pub schema_name: String,
    #[serde(rename = "table_name")]
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(schema_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database_name: None,
            schema_name: schema_name.into(),
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn identity_key(&self) -> (String, String) {
        (self.schema_name.to_uppercase(), self.name.to_uppercase())
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        let name = name.to_uppercase();
        self.columns
            .iter()
            .find(|c| c.column_name.to_uppercase() == name)
    }

    pub fn find_column_mut(&mut self, name: &str) -> Option<&mut Column> {
        let name = name.to_uppercase();
        self.columns
            .iter_mut()
            .find(|c| c.column_name.to_uppercase() == name)
    }
}
