//! The six literal scenarios from spec §8, run end-to-end through the
//! individual C4-C9 components (no file I/O — these build `Table`/
//! `SchemaDiff`/`SqlSignals` values directly and drive `diff` ->
//! `rules` -> `impact` -> `risk`).

use scia_core::diff::diff_schemas;
use scia_core::impact::enrich_findings;
use scia_core::rules::apply_rules;
use scia_core::risk::aggregate;
use scia_core::types::{Column, RiskClassification, SqlMetadata, Table};
use scia_core::warehouse::InMemoryAdapter;
use std::collections::BTreeMap;

fn table(schema: &str, name: &str, cols: Vec<Column>) -> Table {
    Table {
        database_name: None,
        schema_name: schema.to_string(),
        name: name.to_string(),
        columns: cols,
    }
}

#[test]
fn scenario_1_removed_column() {
    let before = table(
        "S",
        "T",
        vec![
            Column::new("S", "T", "C1", "INT", false, 1),
            Column::new("S", "T", "C2", "INT", true, 2),
        ],
    );
    let after = table("S", "T", vec![Column::new("S", "T", "C1", "INT", false, 1)]);

    let diff = diff_schemas(&[before], &[after]);
    let findings = apply_rules(&diff, None);
    assert_eq!(findings.len(), 1);

    let assessment = aggregate(findings, vec![]);
    assert_eq!(assessment.risk_score, 44);
    assert_eq!(assessment.classification, RiskClassification::High);
}

#[test]
fn scenario_2_nullability_tightened() {
    let before = table("S", "T", vec![Column::new("S", "T", "C1", "INT", true, 1)]);
    let after = table("S", "T", vec![Column::new("S", "T", "C1", "INT", false, 1)]);

    let diff = diff_schemas(&[before], &[after]);
    let findings = apply_rules(&diff, None);
    assert_eq!(findings.len(), 1);

    let assessment = aggregate(findings, vec![]);
    assert_eq!(assessment.risk_score, 33);
    assert_eq!(assessment.classification, RiskClassification::Medium);
}

#[test]
fn scenario_3_type_change_referenced_by_query() {
    let before = table("S", "T", vec![Column::new("S", "T", "C", "INT", true, 1)]);
    let after = table("S", "T", vec![Column::new("S", "T", "C", "STRING", true, 1)]);

    let diff = diff_schemas(&[before], &[after]);
    let mut meta = SqlMetadata::default();
    meta.columns.insert("C".to_string());
    let mut signals = BTreeMap::new();
    signals.insert("v1".to_string(), meta);

    let findings = apply_rules(&diff, Some(&signals));
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].base_risk, 50);

    let assessment = aggregate(findings, vec![]);
    assert_eq!(assessment.risk_score, 33);
    assert_eq!(assessment.classification, RiskClassification::Medium);
}

#[test]
fn scenario_4_join_key_removed() {
    let before = table(
        "S",
        "T",
        vec![Column::new("S", "T", "USER_ID", "INT", true, 1)],
    );
    let after = table("S", "T", vec![]);

    let diff = diff_schemas(&[before], &[after]);
    let mut meta = SqlMetadata::default();
    meta.join_keys
        .push(("ORDER_ID".to_string(), "USER_ID".to_string()));
    let mut signals = BTreeMap::new();
    signals.insert("v1".to_string(), meta);

    let findings = apply_rules(&diff, Some(&signals));
    assert_eq!(findings.len(), 2);

    let assessment = aggregate(findings, vec![]);
    assert_eq!(assessment.risk_score, 62);
    assert_eq!(assessment.classification, RiskClassification::High);
}

#[test]
fn scenario_5_blast_radius_discount() {
    let before = table(
        "SALES",
        "ORDERS",
        vec![Column::new("SALES", "ORDERS", "C", "INT", true, 1)],
    );
    let after = table("SALES", "ORDERS", vec![]);

    let diff = diff_schemas(&[before], &[after]);
    let findings = apply_rules(&diff, None);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].base_risk, 80);

    let adapter = InMemoryAdapter::new();
    let enriched = enrich_findings(findings, &adapter, "", 3, false, true);
    assert_eq!(enriched[0].risk_score, Some(60));

    let assessment = aggregate(enriched, vec![]);
    assert_eq!(assessment.risk_score, 37);
    assert_eq!(assessment.classification, RiskClassification::Medium);
}

#[test]
fn scenario_6_cyclic_views_terminate_without_crash() {
    let mut adapter = InMemoryAdapter::new();
    let mut views = BTreeMap::new();
    views.insert("VA".to_string(), "SELECT * FROM vb".to_string());
    views.insert("VB".to_string(), "SELECT * FROM va".to_string());
    adapter.seed_views("", "SALES", views);

    let before = table(
        "SALES",
        "T",
        vec![Column::new("SALES", "T", "C", "INT", true, 1)],
    );
    let after = table("SALES", "T", vec![]);
    let diff = diff_schemas(&[before], &[after]);
    let findings = apply_rules(&diff, None);

    let enriched = enrich_findings(findings, &adapter, "", 5, false, true);
    assert_eq!(enriched.len(), 1);
    assert!(enriched[0]
        .impact
        .as_ref()
        .unwrap()
        .direct_dependents
        .is_empty());
}
