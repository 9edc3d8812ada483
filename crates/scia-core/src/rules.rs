//! Rule engine: a fixed ordered list of pure functions `(SchemaDiff,
//! Option<&SqlSignals>) -> Vec<Finding>` (spec §4.5).
//!
//! A superset of `original_source/scia/core/rules.py`'s three rules
//! (`rule_column_removed`, `rule_column_type_changed`,
//! `rule_nullability_changed`), extended with schema/table-level and
//! signal-aware rules per spec.md §4.5's ten-rule table.
//! `rule_potential_breakage` (`FindingType::POTENTIAL_BREAKAGE` in
//! `original_source/scia/models/finding.py`) is intentionally not
//! ported — spec.md §9 drops it to avoid double-counting with
//! `JoinKeyChanged`.
//!
//! Rules are plain functions collected into a `const` ordered slice, the
//! way `flowscope-core::linter::rules` registers lint rules as free
//! functions rather than `dyn Rule` trait objects.

use crate::types::{
    any_signal_has_column, any_signal_has_group_by, any_signal_has_join_key, ChangeType, Finding,
    FindingType, ObjectType, SchemaChange, SchemaDiff, Severity, SqlSignals,
};

pub type Rule = fn(&SchemaDiff, Option<&SqlSignals>) -> Vec<Finding>;

/// Fixed, ordered rule set. The engine never deduplicates across rules —
/// a single column change may legitimately trigger more than one
/// (e.g. a removed join-key column triggers both `ColumnRemoved` and
/// `JoinKeyChanged`).
pub const RULES: &[Rule] = &[
    rule_schema_removed,
    rule_schema_added,
    rule_table_removed,
    rule_table_added,
    rule_column_removed,
    rule_column_added,
    rule_column_type_changed,
    rule_nullability_tightened,
    rule_join_key_changed,
    rule_grain_change,
];

/// Applies every rule in [`RULES`] in order and concatenates their
/// findings, preserving rule order first and stable diff order within
/// each rule (spec §5 "ordering").
pub fn apply_rules(diff: &SchemaDiff, signals: Option<&SqlSignals>) -> Vec<Finding> {
    RULES.iter().flat_map(|rule| rule(diff, signals)).collect()
}

fn base_evidence(change: &SchemaChange) -> Finding {
    let mut evidence = vec![("schema".to_string(), change.schema.clone().into())];
    if let Some(table) = &change.table {
        evidence.push(("table".to_string(), table.clone().into()));
    }
    if let Some(column) = &change.column {
        evidence.push(("column".to_string(), column.clone().into()));
    }
    if let Some(before) = &change.before {
        evidence.push((
            "before".to_string(),
            serde_json::to_value(before).unwrap_or(serde_json::Value::Null),
        ));
    }
    if let Some(after) = &change.after {
        evidence.push((
            "after".to_string(),
            serde_json::to_value(after).unwrap_or(serde_json::Value::Null),
        ));
    }
    let mut finding = Finding::new(FindingType::SchemaRemoved, Severity::Low, 0, "");
    finding.evidence.extend(evidence);
    finding
}

fn with_evidence_from(
    change: &SchemaChange,
    finding_type: FindingType,
    severity: Severity,
    base_risk: u32,
    description: impl Into<String>,
) -> Finding {
    let template = base_evidence(change);
    let mut finding = Finding::new(finding_type, severity, base_risk, description);
    finding.evidence = template.evidence;
    finding
}

fn rule_schema_removed(diff: &SchemaDiff, _signals: Option<&SqlSignals>) -> Vec<Finding> {
    diff.changes
        .iter()
        .filter(|c| c.object_type == ObjectType::Schema && c.change_type == ChangeType::Removed)
        .map(|c| {
            with_evidence_from(
                c,
                FindingType::SchemaRemoved,
                Severity::High,
                100,
                format!("Schema {} was removed", c.schema),
            )
        })
        .collect()
}

fn rule_schema_added(diff: &SchemaDiff, _signals: Option<&SqlSignals>) -> Vec<Finding> {
    diff.changes
        .iter()
        .filter(|c| c.object_type == ObjectType::Schema && c.change_type == ChangeType::Added)
        .map(|c| {
            with_evidence_from(
                c,
                FindingType::SchemaAdded,
                Severity::Low,
                0,
                format!("Schema {} was added", c.schema),
            )
        })
        .collect()
}

fn rule_table_removed(diff: &SchemaDiff, _signals: Option<&SqlSignals>) -> Vec<Finding> {
    diff.changes
        .iter()
        .filter(|c| c.object_type == ObjectType::Table && c.change_type == ChangeType::Removed)
        .map(|c| {
            let table = c.table.as_deref().unwrap_or_default();
            with_evidence_from(
                c,
                FindingType::TableRemoved,
                Severity::High,
                90,
                format!("Table {}.{table} was removed", c.schema),
            )
        })
        .collect()
}

fn rule_table_added(diff: &SchemaDiff, _signals: Option<&SqlSignals>) -> Vec<Finding> {
    diff.changes
        .iter()
        .filter(|c| c.object_type == ObjectType::Table && c.change_type == ChangeType::Added)
        .map(|c| {
            let table = c.table.as_deref().unwrap_or_default();
            with_evidence_from(
                c,
                FindingType::TableAdded,
                Severity::Low,
                0,
                format!("Table {}.{table} was added", c.schema),
            )
        })
        .collect()
}

fn rule_column_removed(diff: &SchemaDiff, _signals: Option<&SqlSignals>) -> Vec<Finding> {
    diff.changes
        .iter()
        .filter(|c| c.object_type == ObjectType::Column && c.change_type == ChangeType::Removed)
        .map(|c| {
            let table = c.table.as_deref().unwrap_or_default();
            let column = c.column.as_deref().unwrap_or_default();
            with_evidence_from(
                c,
                FindingType::ColumnRemoved,
                Severity::High,
                80,
                format!("Column {table}.{column} was removed"),
            )
        })
        .collect()
}

fn rule_column_added(diff: &SchemaDiff, _signals: Option<&SqlSignals>) -> Vec<Finding> {
    diff.changes
        .iter()
        .filter(|c| c.object_type == ObjectType::Column && c.change_type == ChangeType::Added)
        .map(|c| {
            let table = c.table.as_deref().unwrap_or_default();
            let column = c.column.as_deref().unwrap_or_default();
            with_evidence_from(
                c,
                FindingType::ColumnAdded,
                Severity::Low,
                0,
                format!("Column {table}.{column} was added"),
            )
        })
        .collect()
}

fn rule_column_type_changed(diff: &SchemaDiff, signals: Option<&SqlSignals>) -> Vec<Finding> {
    diff.changes
        .iter()
        .filter(
            |c| c.object_type == ObjectType::Column && c.change_type == ChangeType::TypeChanged,
        )
        .map(|c| {
            let table = c.table.as_deref().unwrap_or_default();
            let column = c.column.as_deref().unwrap_or_default();
            let base_risk = match signals {
                Some(signals) if any_signal_has_column(signals, column) => 50,
                _ => 40,
            };
            with_evidence_from(
                c,
                FindingType::ColumnTypeChanged,
                Severity::Medium,
                base_risk,
                format!("Column {table}.{column} changed type"),
            )
        })
        .collect()
}

fn rule_nullability_tightened(diff: &SchemaDiff, _signals: Option<&SqlSignals>) -> Vec<Finding> {
    diff.changes
        .iter()
        .filter(|c| {
            c.object_type == ObjectType::Column
                && c.change_type == ChangeType::NullabilityChanged
                && c.before.as_ref().is_some_and(|b| b.is_nullable)
                && c.after.as_ref().is_some_and(|a| !a.is_nullable)
        })
        .map(|c| {
            let table = c.table.as_deref().unwrap_or_default();
            let column = c.column.as_deref().unwrap_or_default();
            with_evidence_from(
                c,
                FindingType::NullabilityTightened,
                Severity::Medium,
                50,
                format!("Column {table}.{column} was tightened to NOT NULL"),
            )
        })
        .collect()
}

fn rule_join_key_changed(diff: &SchemaDiff, signals: Option<&SqlSignals>) -> Vec<Finding> {
    let Some(signals) = signals else {
        return Vec::new();
    };
    diff.changes
        .iter()
        .filter(|c| {
            c.object_type == ObjectType::Column
                && matches!(c.change_type, ChangeType::Removed | ChangeType::TypeChanged)
        })
        .filter(|c| {
            c.column
                .as_deref()
                .is_some_and(|col| any_signal_has_join_key(signals, col))
        })
        .map(|c| {
            let table = c.table.as_deref().unwrap_or_default();
            let column = c.column.as_deref().unwrap_or_default();
            with_evidence_from(
                c,
                FindingType::JoinKeyChanged,
                Severity::High,
                90,
                format!("Column {table}.{column} is used as a join key"),
            )
        })
        .collect()
}

fn rule_grain_change(diff: &SchemaDiff, signals: Option<&SqlSignals>) -> Vec<Finding> {
    let Some(signals) = signals else {
        return Vec::new();
    };
    diff.changes
        .iter()
        .filter(|c| c.object_type == ObjectType::Column && c.change_type == ChangeType::Removed)
        .filter(|c| {
            c.column
                .as_deref()
                .is_some_and(|col| any_signal_has_group_by(signals, col))
        })
        .map(|c| {
            let table = c.table.as_deref().unwrap_or_default();
            let column = c.column.as_deref().unwrap_or_default();
            with_evidence_from(
                c,
                FindingType::GrainChange,
                Severity::Medium,
                60,
                format!("Column {table}.{column} was used to define query grain"),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, SqlMetadata};
    use std::collections::BTreeMap;

    fn column_removed(table: &str, column: &str) -> SchemaChange {
        SchemaChange {
            object_type: ObjectType::Column,
            change_type: ChangeType::Removed,
            schema: "S".to_string(),
            table: Some(table.to_string()),
            column: Some(column.to_string()),
            before: Some(Column::new("S", table, column, "INT", true, 1)),
            after: None,
        }
    }

    #[test]
    fn column_removed_never_fires_for_added() {
        let diff = SchemaDiff {
            changes: vec![SchemaChange {
                object_type: ObjectType::Column,
                change_type: ChangeType::Added,
                schema: "S".to_string(),
                table: Some("T".to_string()),
                column: Some("C".to_string()),
                before: None,
                after: Some(Column::new("S", "T", "C", "INT", true, 1)),
            }],
        };
        let findings = rule_column_removed(&diff, None);
        assert!(findings.is_empty());
    }

    #[test]
    fn column_removed_fires_exactly_once_per_removal() {
        let diff = SchemaDiff {
            changes: vec![column_removed("T", "C1"), column_removed("T", "C2")],
        };
        let findings = rule_column_removed(&diff, None);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].base_risk, 80);
    }

    #[test]
    fn join_key_rule_is_skipped_without_signals() {
        let diff = SchemaDiff {
            changes: vec![column_removed("T", "USER_ID")],
        };
        assert!(rule_join_key_changed(&diff, None).is_empty());
    }

    #[test]
    fn removed_join_key_column_triggers_both_rules() {
        let diff = SchemaDiff {
            changes: vec![column_removed("T", "USER_ID")],
        };
        let mut meta = SqlMetadata::default();
        meta.join_keys.push(("ORDER_ID".to_string(), "USER_ID".to_string()));
        let mut signals = BTreeMap::new();
        signals.insert("v1".to_string(), meta);

        let findings = apply_rules(&diff, Some(&signals));
        let types: Vec<FindingType> = findings.iter().map(|f| f.finding_type).collect();
        assert!(types.contains(&FindingType::ColumnRemoved));
        assert!(types.contains(&FindingType::JoinKeyChanged));
    }

    #[test]
    fn type_change_base_risk_bumps_when_column_is_referenced() {
        let change = SchemaChange {
            object_type: ObjectType::Column,
            change_type: ChangeType::TypeChanged,
            schema: "S".to_string(),
            table: Some("T".to_string()),
            column: Some("C".to_string()),
            before: Some(Column::new("S", "T", "C", "INT", true, 1)),
            after: Some(Column::new("S", "T", "C", "STRING", true, 1)),
        };
        let diff = SchemaDiff {
            changes: vec![change],
        };

        let without_signals = rule_column_type_changed(&diff, None);
        assert_eq!(without_signals[0].base_risk, 40);

        let mut meta = SqlMetadata::default();
        meta.columns.insert("C".to_string());
        let mut signals = BTreeMap::new();
        signals.insert("v1".to_string(), meta);
        let with_signals = rule_column_type_changed(&diff, Some(&signals));
        assert_eq!(with_signals[0].base_risk, 50);
    }

    #[test]
    fn nullability_tightened_requires_nullable_to_not_null_direction() {
        let tightened = SchemaChange {
            object_type: ObjectType::Column,
            change_type: ChangeType::NullabilityChanged,
            schema: "S".to_string(),
            table: Some("T".to_string()),
            column: Some("C".to_string()),
            before: Some(Column::new("S", "T", "C", "INT", true, 1)),
            after: Some(Column::new("S", "T", "C", "INT", false, 1)),
        };
        let loosened = SchemaChange {
            before: Some(Column::new("S", "T", "C", "INT", false, 1)),
            after: Some(Column::new("S", "T", "C", "INT", true, 1)),
            ..tightened.clone()
        };
        let diff = SchemaDiff {
            changes: vec![tightened, loosened],
        };
        let findings = rule_nullability_tightened(&diff, None);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn rule_engine_never_deduplicates() {
        let diff = SchemaDiff {
            changes: vec![column_removed("T", "GROUP_COL")],
        };
        let mut meta = SqlMetadata::default();
        meta.group_by_cols.insert("GROUP_COL".to_string());
        meta.join_keys
            .push(("GROUP_COL".to_string(), "OTHER".to_string()));
        let mut signals = BTreeMap::new();
        signals.insert("v1".to_string(), meta);

        let findings = apply_rules(&diff, Some(&signals));
        // ColumnRemoved + JoinKeyChanged + GrainChange, no collapsing.
        assert_eq!(findings.len(), 3);
    }
}
