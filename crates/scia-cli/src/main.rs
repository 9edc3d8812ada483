//! SCIA CLI - SQL Change Impact Analyzer

mod cli;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use scia_core::types::RiskClassification;
use scia_core::warehouse::{registry, WarehouseAdapter};
use scia_core::{run_analysis, AnalysisRequest, ScError};
use std::process::ExitCode;

use cli::{AnalyzeArgs, Args, Command, DiffArgs, FailOn, OutputFormat};

fn main() -> ExitCode {
    match run() {
        Ok(should_fail) => {
            if should_fail {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("scia: error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<bool> {
    let args = Args::parse();
    match args.command {
        Command::Analyze(analyze_args) => run_analyze(analyze_args),
        Command::Diff(diff_args) => run_diff(diff_args),
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<bool> {
    let warehouse_name = args.warehouse.map(|w| w.as_str().to_string());
    let mut adapter_box: Option<Box<dyn WarehouseAdapter>> = None;

    if let Some(name) = &warehouse_name {
        match connect_adapter(name, args.conn_file.as_deref()) {
            Ok(adapter) => adapter_box = Some(adapter),
            Err(err) => {
                // Adapter construction/connection failures are only
                // fatal if we actually need the adapter to materialize a
                // schema side; DDL/JSON analyses continue without
                // enrichment (spec §7: ConnectionError / AdapterError).
                eprintln!("scia: warning: warehouse adapter unavailable: {err:#}");
            }
        }
    }

    let mut request = AnalysisRequest::new(args.before.clone(), args.after.clone());
    request.warehouse = warehouse_name;
    request.dialect = args.dialect.into();
    request.max_dependency_depth = args.dependency_depth;
    request.include_downstream = args.resolved_include_downstream();
    request.include_upstream = args.resolved_include_upstream();
    request.adapter = match &mut adapter_box {
        Some(adapter) => Some(adapter.as_mut()),
        None => None,
    };

    let assessment = run_analysis(request).context("analysis failed")?;

    let rendered = match args.format {
        OutputFormat::Json => output::render_json(&assessment)?,
        OutputFormat::Markdown => output::render_markdown(&assessment),
    };
    println!("{rendered}");

    let classification_rank: FailOn = assessment.classification.into();
    Ok(classification_rank >= args.fail_on)
}

fn run_diff(args: DiffArgs) -> Result<bool> {
    let request = AnalysisRequest::new(args.before, args.after);
    let assessment = run_analysis(request).context("diff failed")?;
    println!("{}", output::render_json(&assessment)?);
    Ok(assessment.classification == RiskClassification::High)
}

/// Constructs and connects a warehouse adapter by name, using the
/// connection-config lookup order from spec §6.
fn connect_adapter(
    warehouse: &str,
    conn_file: Option<&std::path::Path>,
) -> Result<Box<dyn WarehouseAdapter>> {
    let mut adapter = registry::construct(warehouse).map_err(anyhow_from_sc_error)?;
    let connection_config = config::load_connection_config(conn_file, warehouse)?;
    config::validate_connection_config(warehouse, &connection_config)?;
    adapter
        .connect(&connection_config)
        .map_err(anyhow_from_sc_error)?;
    Ok(adapter)
}

fn anyhow_from_sc_error(err: ScError) -> anyhow::Error {
    anyhow::anyhow!(err.to_string())
}
