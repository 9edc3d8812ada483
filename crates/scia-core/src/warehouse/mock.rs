//! A fully working, in-process [`WarehouseAdapter`] used by tests and as
//! a usage example — analogous to the teacher keeping fixture-backed
//! test doubles alongside its analyzer tests.

use super::{ConnectionConfig, ForeignKey, WarehouseAdapter};
use crate::error::ScError;
use crate::sql_signals;
use crate::types::{Dialect, Table};
use std::collections::BTreeMap;

/// An adapter backed entirely by in-memory fixtures: no network I/O.
/// `parse_table_references` uses the real SQL signal extractor.
#[derive(Debug, Default)]
pub struct InMemoryAdapter {
    connected: bool,
    default_database: String,
    default_schema: String,
    tables: BTreeMap<(String, String), Vec<Table>>,
    views: BTreeMap<(String, String), BTreeMap<String, String>>,
    foreign_keys: BTreeMap<(String, String), Vec<ForeignKey>>,
    dialect: Dialect,
}

impl InMemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_default_context(mut self, database: &str, schema: &str) -> Self {
        self.default_database = database.to_string();
        self.default_schema = schema.to_string();
        self
    }

    pub fn seed_tables(&mut self, database: &str, schema: &str, tables: Vec<Table>) {
        self.tables
            .insert((database.to_string(), schema.to_string()), tables);
    }

    pub fn seed_views(&mut self, database: &str, schema: &str, views: BTreeMap<String, String>) {
        self.views
            .insert((database.to_string(), schema.to_string()), views);
    }

    pub fn seed_foreign_keys(&mut self, database: &str, schema: &str, fks: Vec<ForeignKey>) {
        self.foreign_keys
            .insert((database.to_string(), schema.to_string()), fks);
    }

    fn context<'a>(&'a self, database: &'a str, schema: &'a str) -> (&'a str, &'a str) {
        super::resolve_context(database, schema, &self.default_database, &self.default_schema)
    }
}

impl WarehouseAdapter for InMemoryAdapter {
    fn connect(&mut self, _config: &ConnectionConfig) -> Result<(), ScError> {
        self.connected = true;
        Ok(())
    }

    fn fetch_schema(&self, database: &str, schema: &str) -> Vec<Table> {
        let (db, sch) = self.context(database, schema);
        self.tables
            .get(&(db.to_string(), sch.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn fetch_views(&self, database: &str, schema: &str) -> BTreeMap<String, String> {
        let (db, sch) = self.context(database, schema);
        self.views
            .get(&(db.to_string(), sch.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn fetch_foreign_keys(&self, database: &str, schema: &str) -> Vec<ForeignKey> {
        let (db, sch) = self.context(database, schema);
        self.foreign_keys
            .get(&(db.to_string(), sch.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn parse_table_references(&self, sql: &str) -> Vec<String> {
        sql_signals::extract_one(sql, self.dialect)
            .map(|meta| meta.tables.into_iter().collect())
            .unwrap_or_default()
    }

    fn close(&mut self) {
        self.connected = false;
    }
}
