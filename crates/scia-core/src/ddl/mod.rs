//! DDL parser: turns `CREATE TABLE`/`ALTER TABLE` text into [`Table`]s
//! (spec §4.2).
//!
//! Grounded in `original_source/scia/sql/ddl_parser.py`, ported from a
//! `sqlglot` AST walk to a `sqlparser::ast::Statement` walk in the idiom
//! of `flowscope-core::analyzer::ddl` and `flowscope-core::extractors`
//! (which likewise convert `ObjectName`/`Ident` via `.to_string()` rather
//! than matching internal identifier variants, keeping this module
//! resilient to `sqlparser` AST churn across versions).

mod preprocess;

pub use preprocess::register_dialect_preprocessor;

use crate::error::log_recoverable;
use crate::types::{Column, Dialect, Table};
use sqlparser::ast::{
    AlterColumnOperation, AlterTableOperation, ColumnOption, Statement,
};
use sqlparser::parser::Parser;
use std::collections::BTreeMap;

const DEFAULT_SCHEMA: &str = "PUBLIC";
const DEFAULT_DATA_TYPE: &str = "VARCHAR";

/// Parses `ddl_sql` into a list of [`Table`]s, seeding from `base_tables`
/// (for pure-`ALTER` scripts) and applying dialect preprocessors first.
///
/// Never aborts: unsupported statements and per-statement failures are
/// logged and skipped, returning whatever was successfully accumulated
/// (spec §4.2's "any exception during parsing MUST be caught").
pub fn parse_ddl(
    ddl_sql: &str,
    base_tables: &[Table],
    dialect: Dialect,
) -> (Vec<Table>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut tables: BTreeMap<(String, String), Table> = BTreeMap::new();
    for table in base_tables {
        tables.insert(table.identity_key(), clone_table(table));
    }

    let processed = preprocess::preprocess(ddl_sql, dialect);
    let statements = match Parser::parse_sql(dialect.to_sqlparser_dialect().as_ref(), &processed) {
        Ok(statements) => statements,
        Err(err) => {
            let message = format!("DDL parsing failed: {err}");
            log_recoverable("ddl_parse", &message);
            warnings.push(message);
            return (tables.into_values().collect(), warnings);
        }
    };

    for statement in statements {
        match statement {
            Statement::CreateTable(create) => {
                let name = create.name.to_string();
                let (schema_name, table_name) = split_schema_table(&name);
                let mut table = Table::new(schema_name, table_name.to_uppercase());
                for (ordinal, col) in create.columns.iter().enumerate() {
                    table
                        .columns
                        .push(column_from_def(&table, col, ordinal as u32 + 1));
                }
                tables.insert(table.identity_key(), table);
            }
            Statement::AlterTable {
                name, operations, ..
            } => {
                let full_name = name.to_string();
                let (schema_name, table_name) = split_schema_table(&full_name);
                let key = (schema_name.to_uppercase(), table_name.to_uppercase());
                let Some(table) = tables.get_mut(&key) else {
                    let message = format!(
                        "ALTER TABLE {full_name} skipped: base table not found"
                    );
                    log_recoverable("ddl_alter", &message);
                    warnings.push(message);
                    continue;
                };
                for op in operations {
                    apply_alter_operation(table, op, &mut warnings);
                }
            }
            other => {
                log_recoverable("ddl_skip", &format!("unsupported statement: {other}"));
            }
        }
    }

    (tables.into_values().collect(), warnings)
}

fn clone_table(table: &Table) -> Table {
    Table {
        database_name: table.database_name.clone(),
        schema_name: table.schema_name.clone(),
        name: table.name.clone(),
        columns: table.columns.clone(),
    }
}

/// Splits `[db.]schema.table` (or `schema.table`, or bare `table`) into
/// `(schema, table)`, defaulting schema to `PUBLIC` when absent.
fn split_schema_table(qualified: &str) -> (String, String) {
    let parts: Vec<&str> = qualified.split('.').collect();
    match parts.as_slice() {
        [table] => (DEFAULT_SCHEMA.to_string(), table.to_string()),
        [schema, table] => (schema.to_uppercase(), table.to_string()),
        [_db, schema, table] => (schema.to_uppercase(), table.to_string()),
        _ => (DEFAULT_SCHEMA.to_string(), qualified.to_string()),
    }
}

fn column_from_def(
    table: &Table,
    col: &sqlparser::ast::ColumnDef,
    ordinal: u32,
) -> Column {
    let is_nullable = !col
        .options
        .iter()
        .any(|opt| matches!(opt.option, ColumnOption::NotNull));
    let data_type = col.data_type.to_string();
    let data_type = if data_type.trim().is_empty() {
        DEFAULT_DATA_TYPE.to_string()
    } else {
        data_type
    };
    Column::new(
        table.schema_name.clone(),
        table.name.clone(),
        col.name.to_string().to_uppercase(),
        data_type,
        is_nullable,
        ordinal,
    )
}

fn apply_alter_operation(table: &mut Table, op: AlterTableOperation, warnings: &mut Vec<String>) {
    match op {
        AlterTableOperation::AddColumn { column_def, .. } => {
            let ordinal = table.columns.len() as u32 + 1;
            let column = column_from_def(table, &column_def, ordinal);
            table.columns.push(column);
        }
        AlterTableOperation::DropColumn { column_names, .. } => {
            let targets: Vec<String> = column_names
                .iter()
                .map(|n| n.to_string().to_uppercase())
                .collect();
            table
                .columns
                .retain(|c| !targets.contains(&c.column_name.to_uppercase()));
        }
        AlterTableOperation::RenameColumn {
            old_column_name,
            new_column_name,
        } => {
            let old_name = old_column_name.to_string().to_uppercase();
            if let Some(col) = table.find_column_mut(&old_name) {
                col.column_name = new_column_name.to_string().to_uppercase();
            } else {
                warnings.push(format!(
                    "RENAME COLUMN {old_name} skipped: column not found on {}",
                    table.name
                ));
            }
        }
        AlterTableOperation::AlterColumn { column_name, op } => {
            let target = column_name.to_string().to_uppercase();
            let Some(col) = table.find_column_mut(&target) else {
                warnings.push(format!(
                    "ALTER COLUMN {target} skipped: column not found on {}",
                    table.name
                ));
                return;
            };
            match op {
                AlterColumnOperation::SetDataType { data_type, .. } => {
                    col.data_type = data_type.to_string().to_uppercase();
                }
                AlterColumnOperation::SetNotNull => {
                    col.is_nullable = false;
                }
                AlterColumnOperation::DropNotNull => {
                    col.is_nullable = true;
                }
                _ => {
                    log_recoverable("ddl_alter_column", "unsupported ALTER COLUMN operation");
                }
            }
        }
        _ => {
            log_recoverable("ddl_alter", "unsupported ALTER TABLE operation");
        }
    }
}
