//! Warehouse adapter interface (spec §4.6, interface only).
//!
//! `WarehouseAdapter` is grounded in
//! `original_source/scia/warehouse/base.py::WarehouseAdapter`'s six
//! operations, kept object-safe so the orchestrator can hold
//! `Box<dyn WarehouseAdapter>`. Every operation is total: adapters
//! return empty collections on failure rather than propagating an error
//! to callers, except `connect`, which may fail with `ScError::ConnectionError`.

mod mock;
pub mod registry;

pub use mock::InMemoryAdapter;

use crate::error::ScError;
use crate::types::Table;
use std::collections::BTreeMap;

/// One foreign key constraint, as reported by a warehouse's metadata
/// tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub constraint_name: String,
    pub table_name: String,
    pub column_name: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

/// Connection parameters handed to [`WarehouseAdapter::connect`]. Keys and
/// required sets are warehouse-specific (spec §6 "Connection config").
pub type ConnectionConfig = BTreeMap<String, String>;

/// A warehouse-specific metadata and SQL-parsing backend.
///
/// Implementations MUST NOT panic; failures are logged internally and
/// surfaced as empty results (or `ScError::ConnectionError` for `connect`
/// only).
pub trait WarehouseAdapter: Send {
    fn connect(&mut self, config: &ConnectionConfig) -> Result<(), ScError>;

    fn fetch_schema(&self, database: &str, schema: &str) -> Vec<Table>;

    fn fetch_views(&self, database: &str, schema: &str) -> BTreeMap<String, String>;

    fn fetch_foreign_keys(&self, database: &str, schema: &str) -> Vec<ForeignKey>;

    fn parse_table_references(&self, sql: &str) -> Vec<String>;

    /// Idempotent: safe to call more than once.
    fn close(&mut self);
}

/// Resolves `database`/`schema` against an adapter's session defaults
/// when either is empty, per spec §4.6.
pub fn resolve_context<'a>(
    database: &'a str,
    schema: &'a str,
    default_database: &'a str,
    default_schema: &'a str,
) -> (&'a str, &'a str) {
    let db = if database.is_empty() {
        default_database
    } else {
        database
    };
    let sch = if schema.is_empty() {
        default_schema
    } else {
        schema
    };
    (db, sch)
}
