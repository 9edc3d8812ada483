//! Hierarchical differ: SCHEMA -> TABLE -> COLUMN (spec §4.4).
//!
//! Grounded in `original_source/scia/core/diff.py`'s three nested loops;
//! the `elif` chain there already checks `data_type` before
//! `is_nullable`, which this keeps as the tie-break when a column's type
//! and nullability both changed.

use crate::types::{ChangeType, ObjectType, SchemaChange, SchemaDiff, Table};
use std::collections::BTreeMap;

/// Diffs `before` against `after`, grouping tables by schema first.
/// Output is stable: ordered by schema, then table, then column, then
/// change type.
pub fn diff_schemas(before: &[Table], after: &[Table]) -> SchemaDiff {
    let before_by_schema = group_by_schema(before);
    let after_by_schema = group_by_schema(after);

    let mut changes = Vec::new();
    let mut schemas: Vec<String> = before_by_schema
        .keys()
        .chain(after_by_schema.keys())
        .cloned()
        .collect();
    schemas.sort();
    schemas.dedup();

    for schema in schemas {
        let before_tables = before_by_schema.get(&schema);
        let after_tables = after_by_schema.get(&schema);
        match (before_tables, after_tables) {
            (Some(_), None) => {
                changes.push(SchemaChange {
                    object_type: ObjectType::Schema,
                    change_type: ChangeType::Removed,
                    schema: display_schema_name(before, &schema),
                    table: None,
                    column: None,
                    before: None,
                    after: None,
                });
            }
            (None, Some(_)) => {
                changes.push(SchemaChange {
                    object_type: ObjectType::Schema,
                    change_type: ChangeType::Added,
                    schema: display_schema_name(after, &schema),
                    table: None,
                    column: None,
                    before: None,
                    after: None,
                });
            }
            (Some(before_tables), Some(after_tables)) => {
                diff_tables_in_schema(&schema, before_tables, after_tables, &mut changes);
            }
            (None, None) => {}
        }
    }

    SchemaDiff { changes }
}

fn diff_tables_in_schema(
    schema_key: &str,
    before_tables: &BTreeMap<String, &Table>,
    after_tables: &BTreeMap<String, &Table>,
    changes: &mut Vec<SchemaChange>,
) {
    let mut table_names: Vec<String> = before_tables
        .keys()
        .chain(after_tables.keys())
        .cloned()
        .collect();
    table_names.sort();
    table_names.dedup();

    for table_name in table_names {
        let before_table = before_tables.get(&table_name);
        let after_table = after_tables.get(&table_name);
        match (before_table, after_table) {
            (Some(table), None) => {
                changes.push(SchemaChange {
                    object_type: ObjectType::Table,
                    change_type: ChangeType::Removed,
                    schema: schema_key.to_string(),
                    table: Some(table.name.clone()),
                    column: None,
                    before: None,
                    after: None,
                });
            }
            (None, Some(table)) => {
                changes.push(SchemaChange {
                    object_type: ObjectType::Table,
                    change_type: ChangeType::Added,
                    schema: schema_key.to_string(),
                    table: Some(table.name.clone()),
                    column: None,
                    before: None,
                    after: None,
                });
            }
            (Some(before_table), Some(after_table)) => {
                diff_columns(schema_key, before_table, after_table, changes);
            }
            (None, None) => {}
        }
    }
}

fn diff_columns(
    schema_key: &str,
    before_table: &Table,
    after_table: &Table,
    changes: &mut Vec<SchemaChange>,
) {
    let before_cols: BTreeMap<String, &crate::types::Column> = before_table
        .columns
        .iter()
        .map(|c| (c.column_name.to_uppercase(), c))
        .collect();
    let after_cols: BTreeMap<String, &crate::types::Column> = after_table
        .columns
        .iter()
        .map(|c| (c.column_name.to_uppercase(), c))
        .collect();

    let mut column_names: Vec<String> = before_cols
        .keys()
        .chain(after_cols.keys())
        .cloned()
        .collect();
    column_names.sort();
    column_names.dedup();

    for column_name in column_names {
        let before_col = before_cols.get(&column_name);
        let after_col = after_cols.get(&column_name);
        match (before_col, after_col) {
            (Some(col), None) => changes.push(SchemaChange {
                object_type: ObjectType::Column,
                change_type: ChangeType::Removed,
                schema: schema_key.to_string(),
                table: Some(before_table.name.clone()),
                column: Some((*col).column_name.clone()),
                before: Some((*col).clone()),
                after: None,
            }),
            (None, Some(col)) => changes.push(SchemaChange {
                object_type: ObjectType::Column,
                change_type: ChangeType::Added,
                schema: schema_key.to_string(),
                table: Some(after_table.name.clone()),
                column: Some((*col).column_name.clone()),
                before: None,
                after: Some((*col).clone()),
            }),
            (Some(before_col), Some(after_col)) => {
                if before_col.data_type.to_uppercase() != after_col.data_type.to_uppercase() {
                    changes.push(SchemaChange {
                        object_type: ObjectType::Column,
                        change_type: ChangeType::TypeChanged,
                        schema: schema_key.to_string(),
                        table: Some(after_table.name.clone()),
                        column: Some(after_col.column_name.clone()),
                        before: Some((*before_col).clone()),
                        after: Some((*after_col).clone()),
                    });
                } else if before_col.is_nullable != after_col.is_nullable {
                    changes.push(SchemaChange {
                        object_type: ObjectType::Column,
                        change_type: ChangeType::NullabilityChanged,
                        schema: schema_key.to_string(),
                        table: Some(after_table.name.clone()),
                        column: Some(after_col.column_name.clone()),
                        before: Some((*before_col).clone()),
                        after: Some((*after_col).clone()),
                    });
                }
            }
            (None, None) => {}
        }
    }
}

fn group_by_schema(tables: &[Table]) -> BTreeMap<String, BTreeMap<String, &Table>> {
    let mut grouped: BTreeMap<String, BTreeMap<String, &Table>> = BTreeMap::new();
    for table in tables {
        grouped
            .entry(table.schema_name.to_uppercase())
            .or_default()
            .insert(table.name.to_uppercase(), table);
    }
    grouped
}

fn display_schema_name(tables: &[Table], schema_upper: &str) -> String {
    tables
        .iter()
        .find(|t| t.schema_name.to_uppercase() == schema_upper)
        .map(|t| t.schema_name.clone())
        .unwrap_or_else(|| schema_upper.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;
    use rstest::rstest;

    fn table(schema: &str, name: &str, cols: Vec<Column>) -> Table {
        Table {
            database_name: None,
            schema_name: schema.to_string(),
            name: name.to_string(),
            columns: cols,
        }
    }

    #[test]
    fn identical_schemas_diff_empty() {
        let t = table("s", "t", vec![Column::new("s", "t", "id", "INT", false, 1)]);
        let diff = diff_schemas(&[t.clone()], &[t]);
        assert!(diff.is_empty());
    }

    #[test]
    fn schema_present_only_before_is_removed() {
        let before = table("s", "t", vec![]);
        let diff = diff_schemas(&[before], &[]);
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].object_type, ObjectType::Schema);
        assert_eq!(diff.changes[0].change_type, ChangeType::Removed);
    }

    #[test]
    fn table_removed_emits_no_column_changes() {
        let before = table(
            "s",
            "t",
            vec![Column::new("s", "t", "id", "INT", false, 1)],
        );
        let after = table("s", "other", vec![]);
        let diff = diff_schemas(&[before], &[after]);
        assert_eq!(diff.changes.len(), 2);
        assert!(diff
            .changes
            .iter()
            .all(|c| c.object_type != ObjectType::Column));
    }

    #[test]
    fn column_removed_is_detected() {
        let before = table(
            "s",
            "t",
            vec![
                Column::new("s", "t", "id", "INT", false, 1),
                Column::new("s", "t", "dropped", "INT", true, 2),
            ],
        );
        let after = table("s", "t", vec![Column::new("s", "t", "id", "INT", false, 1)]);
        let diff = diff_schemas(&[before], &[after]);
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].change_type, ChangeType::Removed);
        assert_eq!(diff.changes[0].column.as_deref(), Some("DROPPED"));
    }

    #[test]
    fn type_change_wins_over_nullability_tie_break() {
        let before = table(
            "s",
            "t",
            vec![Column::new("s", "t", "c", "INT", true, 1)],
        );
        let after = table(
            "s",
            "t",
            vec![Column::new("s", "t", "c", "STRING", false, 1)],
        );
        let diff = diff_schemas(&[before], &[after]);
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].change_type, ChangeType::TypeChanged);
    }

    #[test]
    fn diff_is_case_insensitive_and_symmetric_in_cardinality() {
        let before = table("s", "t", vec![Column::new("s", "t", "ID", "INT", false, 1)]);
        let after = table("S", "T", vec![Column::new("S", "T", "id", "INT", false, 1)]);
        let diff = diff_schemas(&[before], &[after]);
        assert!(diff.is_empty());
    }

    #[test]
    fn forward_and_backward_diff_have_equal_cardinality() {
        let before = table(
            "s",
            "t",
            vec![
                Column::new("s", "t", "id", "INT", false, 1),
                Column::new("s", "t", "gone", "INT", true, 2),
            ],
        );
        let after = table(
            "s",
            "t",
            vec![
                Column::new("s", "t", "id", "INT", false, 1),
                Column::new("s", "t", "new", "INT", true, 2),
            ],
        );
        let forward = diff_schemas(&[before.clone()], &[after.clone()]);
        let backward = diff_schemas(&[after], &[before]);
        assert_eq!(forward.changes.len(), backward.changes.len());
    }

    #[rstest]
    #[case(false, true, 1)] // not-null -> nullable: loosened, still a change
    #[case(true, false, 1)] // nullable -> not-null: tightened
    #[case(false, false, 0)] // unchanged
    #[case(true, true, 0)] // unchanged
    fn nullability_transitions(
        #[case] before_nullable: bool,
        #[case] after_nullable: bool,
        #[case] expected_changes: usize,
    ) {
        let before = table(
            "s",
            "t",
            vec![Column::new("s", "t", "c", "INT", before_nullable, 1)],
        );
        let after = table(
            "s",
            "t",
            vec![Column::new("s", "t", "c", "INT", after_nullable, 1)],
        );
        let diff = diff_schemas(&[before], &[after]);
        assert_eq!(diff.changes.len(), expected_changes);
    }

    #[test]
    fn changes_are_stably_ordered() {
        let before = table(
            "s",
            "t",
            vec![
                Column::new("s", "t", "b_col", "INT", false, 1),
                Column::new("s", "t", "a_col", "INT", false, 2),
            ],
        );
        let after = table("s", "t", vec![]);
        let diff = diff_schemas(&[before], &[after]);
        let columns: Vec<&str> = diff
            .changes
            .iter()
            .filter_map(|c| c.column.as_deref())
            .collect();
        assert_eq!(columns, vec!["A_COL", "B_COL"]);
    }
}
