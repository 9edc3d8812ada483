//! Impact analyzer: downstream view BFS, FK-based up/downstream lookup,
//! and finding enrichment with the blast-radius discount (spec §4.7).
//!
//! Grounded in `original_source/scia/core/impact.py::analyze_downstream`
//! / `analyze_upstream` / `analyze_downstream_fks`, generalized from
//! `async def` to synchronous `Result`-returning calls (core is
//! single-threaded cooperative per spec.md §5).

use crate::types::{DependencyObject, DependencyObjectType, Finding, ImpactDetail};
use crate::warehouse::WarehouseAdapter;

/// Splits `database.schema.table` / `schema.table` / `table` into
/// `(database, schema, table)`, mirroring
/// `original_source/scia/core/utils.py::parse_identifier`.
pub fn parse_identifier(identifier: &str) -> (String, String, String) {
    let parts: Vec<&str> = identifier.split('.').collect();
    match parts.as_slice() {
        [table] => (String::new(), String::new(), table.to_string()),
        [schema, table] => (String::new(), schema.to_string(), table.to_string()),
        [db, schema, table] => (db.to_string(), schema.to_string(), table.to_string()),
        _ => (String::new(), String::new(), identifier.to_string()),
    }
}

/// BFS over views in `(database, schema)` for transitive dependents of
/// `changed_table`, bounded by `max_depth`. `seen` is monotonic, so
/// cyclic view graphs terminate in finite adapter calls (one
/// `fetch_views` call regardless of graph shape, since it is fetched
/// once up front).
pub fn analyze_downstream_views(
    changed_table: &str,
    adapter: &dyn WarehouseAdapter,
    max_depth: u32,
) -> Vec<DependencyObject> {
    let (database, schema, _) = parse_identifier(changed_table);
    let changed_upper = changed_table.to_uppercase();

    let views = adapter.fetch_views(&database, &schema);
    if views.is_empty() {
        return Vec::new();
    }

    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
    seen.insert(changed_upper.clone());
    let mut queue: std::collections::VecDeque<(String, u32)> =
        std::collections::VecDeque::new();
    queue.push_back((changed_upper, 0));

    let mut dependents = Vec::new();
    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        let mut targets = vec![current.clone()];
        if let Some(last) = current.rsplit('.').next() {
            targets.push(last.to_uppercase());
        }

        for (view_name, sql) in &views {
            let full_view_name = qualify(&database, &schema, view_name).to_uppercase();
            if seen.contains(&full_view_name) {
                continue;
            }
            let refs: Vec<String> = adapter
                .parse_table_references(sql)
                .into_iter()
                .map(|r| r.to_uppercase())
                .collect();
            if refs.iter().any(|r| targets.contains(r)) {
                dependents.push(DependencyObject {
                    object_type: DependencyObjectType::View,
                    name: view_name.clone(),
                    schema: schema.clone(),
                    is_critical: false,
                });
                seen.insert(full_view_name.clone());
                queue.push_back((full_view_name, depth + 1));
            }
        }
    }

    dependents
}

fn qualify(database: &str, schema: &str, name: &str) -> String {
    match (database.is_empty(), schema.is_empty()) {
        (false, false) => format!("{database}.{schema}.{name}"),
        (_, false) => format!("{schema}.{name}"),
        _ => name.to_string(),
    }
}

/// Tables whose FK references `changed_table`, deduplicated by
/// `(name, schema)`.
pub fn analyze_downstream_fks(
    changed_table: &str,
    adapter: &dyn WarehouseAdapter,
) -> Vec<DependencyObject> {
    let (database, schema, table_name) = parse_identifier(changed_table);
    if table_name.is_empty() {
        return Vec::new();
    }
    let table_upper = table_name.to_uppercase();

    let mut dependents: Vec<DependencyObject> = Vec::new();
    for fk in adapter.fetch_foreign_keys(&database, &schema) {
        if fk.referenced_table.to_uppercase() == table_upper
            && !dependents
                .iter()
                .any(|d| d.name == fk.table_name && d.schema == schema)
        {
            dependents.push(DependencyObject {
                object_type: DependencyObjectType::Table,
                name: fk.table_name,
                schema: schema.clone(),
                is_critical: true,
            });
        }
    }
    dependents
}

/// Tables that `changed_table` depends on via outgoing FKs.
pub fn analyze_upstream(changed_table: &str, adapter: &dyn WarehouseAdapter) -> Vec<DependencyObject> {
    let (database, schema, table_name) = parse_identifier(changed_table);
    if table_name.is_empty() {
        return Vec::new();
    }
    let table_upper = table_name.to_uppercase();

    adapter
        .fetch_foreign_keys(&database, &schema)
        .into_iter()
        .filter(|fk| fk.table_name.to_uppercase() == table_upper)
        .map(|fk| DependencyObject {
            object_type: DependencyObjectType::Table,
            name: fk.referenced_table,
            schema: schema.clone(),
            is_critical: true,
        })
        .collect()
}

/// Enriches findings whose evidence carries a table name with
/// [`ImpactDetail`], applying the blast-radius discount: when the
/// estimated blast radius is zero and `base_risk` is positive, the
/// effective `risk_score` is `⌊base_risk * 0.75⌋`. Findings without a
/// table-bound evidence entry pass through unchanged. Order is
/// preserved.
pub fn enrich_findings(
    findings: Vec<Finding>,
    adapter: &dyn WarehouseAdapter,
    database: &str,
    max_depth: u32,
    include_upstream: bool,
    include_downstream: bool,
) -> Vec<Finding> {
    findings
        .into_iter()
        .map(|finding| {
            let Some((schema, table)) = evidence_schema_table(&finding) else {
                return finding;
            };
            let fqn = qualify(database, &schema, &table);

            let mut detail = ImpactDetail::default();
            if include_downstream {
                detail.direct_dependents = analyze_downstream_views(&fqn, adapter, max_depth);
                detail.downstream_tables = analyze_downstream_fks(&fqn, adapter);
                detail.transitive_dependents = detail
                    .direct_dependents
                    .iter()
                    .filter(|d| d.object_type == DependencyObjectType::View)
                    .cloned()
                    .collect();
            }
            if include_upstream {
                detail.upstream_dependencies = analyze_upstream(&fqn, adapter);
            }
            detail.estimated_blast_radius = (detail.direct_dependents.len()
                + detail.downstream_tables.len()) as u32;

            let mut finding = finding;
            if detail.estimated_blast_radius == 0 && finding.base_risk > 0 {
                finding.risk_score = Some((finding.base_risk as f64 * 0.75) as u32);
            }
            finding.impact = Some(detail);
            finding
        })
        .collect()
}

fn evidence_schema_table(finding: &Finding) -> Option<(String, String)> {
    let schema = finding
        .evidence
        .get("schema")
        .and_then(|v| v.as_str())
        .map(str::to_string)?;
    let table = finding.table_name()?.to_string();
    Some((schema, table))
}
