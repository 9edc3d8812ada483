//! The top-level pipeline: resolve -> materialize -> diff -> extract
//! signals -> apply rules -> enrich -> aggregate (spec §4.9, the
//! eight-step sequence).

use crate::cancel::CancellationToken;
use crate::diff::diff_schemas;
use crate::error::{log_recoverable, ScError};
use crate::impact::enrich_findings;
use crate::input::{resolve_input, WarehouseHint};
use crate::rules::apply_rules;
use crate::snapshot::load_json_tables;
use crate::types::{AnalysisMode, Dialect, RiskAssessment, SqlSignals, Table};
use crate::warehouse::WarehouseAdapter;
use crate::{ddl, risk};
use std::path::Path;

/// A fully-specified analysis request.
///
/// `adapter`, when present, is used both for DB_REF-mode schema
/// materialization and for impact enrichment; callers are responsible
/// for constructing and connecting it (e.g. via
/// `warehouse::registry::construct` + `WarehouseAdapter::connect`) since
/// the core never picks a warehouse implementation on its own (spec §9
/// "pluggable warehouse adapters").
pub struct AnalysisRequest<'a> {
    pub before: String,
    pub after: String,
    pub warehouse: Option<String>,
    pub dialect: Dialect,
    pub max_dependency_depth: u32,
    pub include_upstream: bool,
    pub include_downstream: bool,
    pub adapter: Option<&'a mut dyn WarehouseAdapter>,
    pub cancellation: Option<&'a CancellationToken>,
}

impl<'a> AnalysisRequest<'a> {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
            warehouse: None,
            dialect: Dialect::default(),
            max_dependency_depth: 3,
            include_upstream: false,
            include_downstream: false,
            adapter: None,
            cancellation: None,
        }
    }
}

/// Runs the full eight-step analysis pipeline.
pub fn run_analysis(request: AnalysisRequest<'_>) -> Result<RiskAssessment, ScError> {
    let AnalysisRequest {
        before,
        after,
        warehouse,
        dialect,
        max_dependency_depth,
        include_upstream,
        include_downstream,
        adapter,
        cancellation,
    } = request;

    let check_cancelled = || -> Result<(), ScError> {
        cancellation.map(CancellationToken::check).transpose()?;
        Ok(())
    };

    // Step 1: resolve inputs.
    let resolved = resolve_input(&before, &after, warehouse.as_deref().map(WarehouseHint))?;
    check_cancelled()?;

    if resolved.mode == AnalysisMode::DbRef && adapter.is_none() {
        return Err(ScError::ConnectionError(
            "database-reference mode requires a connected warehouse adapter".to_string(),
        ));
    }

    let mut warnings = Vec::new();
    let mut migration_sql: Option<String> = None;

    // Step 2: materialize before/after schemas.
    let before_schema = materialize_side(
        &before,
        resolved.before_kind,
        dialect,
        None,
        adapter.as_deref(),
        &mut warnings,
    )?;
    check_cancelled()?;

    let after_schema = materialize_side(
        &after,
        resolved.after_kind,
        dialect,
        Some(&before_schema),
        adapter.as_deref(),
        &mut warnings,
    )?;
    check_cancelled()?;

    if resolved.after_kind == crate::types::InputKind::Ddl && Path::new(&after).exists() {
        if let Ok(text) = std::fs::read_to_string(&after) {
            migration_sql = Some(text);
        }
    }

    // Step 3: database-name mismatch warning.
    if let (Some(before_db), Some(after_db)) = (
        before_schema.iter().find_map(|t| t.database_name.clone()),
        after_schema.iter().find_map(|t| t.database_name.clone()),
    ) {
        if before_db.to_uppercase() != after_db.to_uppercase() {
            warnings.push(format!(
                "database name mismatch: before={before_db} after={after_db}"
            ));
        }
    }

    // Step 4: diff.
    let diff = diff_schemas(&before_schema, &after_schema);
    check_cancelled()?;

    // Step 5: SQL signal extraction, only when the after side supplied
    // raw migration SQL.
    let signals: Option<SqlSignals> = migration_sql.as_ref().map(|sql| {
        let mut statements = std::collections::BTreeMap::new();
        statements.insert("migration".to_string(), sql.clone());
        crate::sql_signals::extract_signals(&statements, dialect)
    });

    // Step 6: rules.
    let findings = apply_rules(&diff, signals.as_ref());
    check_cancelled()?;

    // Step 7: enrichment.
    let findings = match adapter {
        Some(adapter) if include_upstream || include_downstream => {
            let database = before_schema
                .iter()
                .find_map(|t| t.database_name.clone())
                .unwrap_or_default();
            enrich_findings(
                findings,
                adapter,
                &database,
                max_dependency_depth,
                include_upstream,
                include_downstream,
            )
        }
        _ => findings,
    };
    check_cancelled()?;

    // Step 8: aggregate.
    Ok(risk::aggregate(findings, warnings))
}

fn materialize_side(
    descriptor: &str,
    kind: crate::types::InputKind,
    dialect: Dialect,
    base_tables: Option<&[Table]>,
    adapter: Option<&dyn WarehouseAdapter>,
    warnings: &mut Vec<String>,
) -> Result<Vec<Table>, ScError> {
    use crate::types::InputKind;
    match kind {
        InputKind::Json => load_json_tables(Path::new(descriptor)),
        InputKind::Ddl => {
            let text = std::fs::read_to_string(descriptor)
                .map_err(|e| ScError::InputNotFound(format!("{descriptor}: {e}")))?;
            let (tables, ddl_warnings) =
                ddl::parse_ddl(&text, base_tables.unwrap_or(&[]), dialect);
            warnings.extend(ddl_warnings);
            Ok(tables)
        }
        InputKind::DbRef => {
            let Some(adapter) = adapter else {
                return Err(ScError::ConnectionError(
                    "database-reference mode requires a connected warehouse adapter".to_string(),
                ));
            };
            let (database, schema, table) = crate::impact::parse_identifier(descriptor);
            let all_tables = adapter.fetch_schema(&database, &schema);
            if table.is_empty() {
                Ok(all_tables)
            } else {
                let table_upper = table.to_uppercase();
                let filtered: Vec<Table> = all_tables
                    .into_iter()
                    .filter(|t| t.name.to_uppercase() == table_upper)
                    .collect();
                if filtered.is_empty() {
                    log_recoverable(
                        "orchestrator_materialize",
                        format!("no table matched db-ref {descriptor}"),
                    );
                }
                Ok(filtered)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskClassification;
    use crate::warehouse::InMemoryAdapter;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "scia-orchestrator-{}-{name}",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn json_json_mode_runs_end_to_end() {
        let before = write_temp(
            "before.json",
            r#"{"schema_name":"S","table_name":"T","columns":[
                {"schema_name":"S","table_name":"T","column_name":"C1","data_type":"INT","is_nullable":false,"ordinal_position":1},
                {"schema_name":"S","table_name":"T","column_name":"C2","data_type":"INT","is_nullable":true,"ordinal_position":2}
            ]}"#,
        );
        let after = write_temp(
            "after.json",
            r#"{"schema_name":"S","table_name":"T","columns":[
                {"schema_name":"S","table_name":"T","column_name":"C1","data_type":"INT","is_nullable":false,"ordinal_position":1}
            ]}"#,
        );

        let request = AnalysisRequest::new(
            before.to_str().unwrap().to_string(),
            after.to_str().unwrap().to_string(),
        );
        let assessment = run_analysis(request).unwrap();
        assert_eq!(assessment.risk_score, 44);
        assert_eq!(assessment.classification, RiskClassification::High);

        let _ = std::fs::remove_file(before);
        let _ = std::fs::remove_file(after);
    }

    #[test]
    fn db_ref_mode_without_adapter_is_fatal() {
        let request = AnalysisRequest::new("PROD.ANALYTICS.ORDERS", "DEV.ANALYTICS.ORDERS");
        let result = run_analysis(request);
        assert!(matches!(result, Err(ScError::ConnectionError(_))));
    }

    #[test]
    fn cancellation_aborts_before_completion() {
        let before = write_temp("cbefore.json", r#"{"schema_name":"S","table_name":"T","columns":[]}"#);
        let after = write_temp("cafter.json", r#"{"schema_name":"S","table_name":"T","columns":[]}"#);
        let token = CancellationToken::new();
        token.cancel();
        let mut request = AnalysisRequest::new(
            before.to_str().unwrap().to_string(),
            after.to_str().unwrap().to_string(),
        );
        request.cancellation = Some(&token);
        let result = run_analysis(request);
        assert!(matches!(result, Err(ScError::Cancelled)));

        let _ = std::fs::remove_file(before);
        let _ = std::fs::remove_file(after);
    }

    #[test]
    fn db_ref_mode_with_adapter_enriches_when_requested() {
        let mut adapter = InMemoryAdapter::new();
        adapter.seed_tables(
            "",
            "ANALYTICS",
            vec![{
                let mut t = Table::new("ANALYTICS", "ORDERS");
                t.columns.push(crate::types::Column::new(
                    "ANALYTICS", "ORDERS", "ID", "INT", false, 1,
                ));
                t
            }],
        );
        let mut after_adapter = InMemoryAdapter::new();
        after_adapter.seed_tables("", "ANALYTICS", vec![]);

        let mut request = AnalysisRequest::new("ANALYTICS.ORDERS", "ANALYTICS.GONE");
        request.warehouse = Some("snowflake".to_string());
        request.adapter = Some(&mut adapter);
        let result = run_analysis(request);
        assert!(result.is_ok());
    }
}
