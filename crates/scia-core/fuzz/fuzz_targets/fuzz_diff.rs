//! Fuzz target for the hierarchical differ: `diff_schemas` must never
//! panic regardless of how degenerate the table lists are (duplicate
//! names, empty identifiers, mismatched column sets).

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scia_core::diff::diff_schemas;
use scia_core::types::{Column, Table};

#[derive(Debug, Arbitrary)]
struct FuzzColumn {
    schema: String,
    table: String,
    name: String,
    data_type: String,
    is_nullable: bool,
    ordinal: u32,
}

impl From<FuzzColumn> for Column {
    fn from(c: FuzzColumn) -> Self {
        Column::new(c.schema, c.table, c.name, c.data_type, c.is_nullable, c.ordinal)
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzTable {
    schema: String,
    name: String,
    columns: Vec<FuzzColumn>,
}

impl From<FuzzTable> for Table {
    fn from(t: FuzzTable) -> Self {
        let mut table = Table::new(t.schema, t.name);
        table.columns = t.columns.into_iter().map(Column::from).collect();
        table
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    before: Vec<FuzzTable>,
    after: Vec<FuzzTable>,
}

fuzz_target!(|input: FuzzInput| {
    let before: Vec<Table> = input.before.into_iter().map(Table::from).collect();
    let after: Vec<Table> = input.after.into_iter().map(Table::from).collect();
    let _ = diff_schemas(&before, &after);
});
