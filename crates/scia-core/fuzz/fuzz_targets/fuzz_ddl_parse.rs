//! Fuzz target for the DDL parser: `parse_ddl` must never panic on
//! arbitrary text, regardless of dialect.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scia_core::ddl::parse_ddl;
use scia_core::types::Dialect;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sql: String,
    dialect_idx: u8,
}

impl FuzzInput {
    fn dialect(&self) -> Dialect {
        match self.dialect_idx % 6 {
            0 => Dialect::Snowflake,
            1 => Dialect::Postgres,
            2 => Dialect::Mysql,
            3 => Dialect::Bigquery,
            4 => Dialect::Databricks,
            _ => Dialect::Redshift,
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let dialect = input.dialect();
    let _ = parse_ddl(&input.sql, &[], dialect);
});
