//! CLI argument parsing using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// SCIA - SQL Change Impact Analyzer
#[derive(Parser, Debug)]
#[command(name = "scia")]
#[command(about = "Classify schema-change risk between two snapshots", long_about = None)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Full analysis: risk findings, optional warehouse-backed impact enrichment.
    Analyze(AnalyzeArgs),
    /// Legacy subcommand: structural diff only, JSON output at default thresholds.
    Diff(DiffArgs),
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Before snapshot: a JSON file, a DDL file, or a `[database.]schema[.table]` reference
    #[arg(long, value_name = "SOURCE")]
    pub before: String,

    /// After snapshot, same format as --before
    #[arg(long, value_name = "SOURCE")]
    pub after: String,

    /// Warehouse backing a DB reference or used for impact enrichment
    #[arg(long, value_enum)]
    pub warehouse: Option<WarehouseArg>,

    /// SQL dialect for DDL parsing and signal extraction
    #[arg(long, value_enum, default_value = "snowflake")]
    pub dialect: DialectArg,

    /// Explicit connection config file (overrides the default lookup order)
    #[arg(long, value_name = "FILE")]
    pub conn_file: Option<PathBuf>,

    /// Maximum BFS depth when walking view/FK dependencies
    #[arg(long, value_name = "N", default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub dependency_depth: u32,

    /// Enrich findings with downstream dependents (default: on)
    #[arg(long, overrides_with = "no_downstream")]
    pub include_downstream: bool,
    /// Disable downstream enrichment
    #[arg(long)]
    pub no_downstream: bool,

    /// Enrich findings with upstream dependencies (default: off)
    #[arg(long, overrides_with = "no_upstream")]
    pub include_upstream: bool,
    /// Disable upstream enrichment
    #[arg(long)]
    pub no_upstream: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Exit with code 1 when the final classification is at or above this level
    #[arg(long, value_enum, default_value = "high")]
    pub fail_on: FailOn,
}

impl AnalyzeArgs {
    pub fn resolved_include_downstream(&self) -> bool {
        !self.no_downstream
    }

    pub fn resolved_include_upstream(&self) -> bool {
        self.include_upstream && !self.no_upstream
    }
}

#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Before snapshot (JSON or DDL)
    #[arg(long, value_name = "SOURCE")]
    pub before: String,

    /// After snapshot (JSON or DDL)
    #[arg(long, value_name = "SOURCE")]
    pub after: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum WarehouseArg {
    Snowflake,
    Databricks,
    Postgres,
    Redshift,
}

impl WarehouseArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Snowflake => "snowflake",
            Self::Databricks => "databricks",
            Self::Postgres => "postgres",
            Self::Redshift => "redshift",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum DialectArg {
    Snowflake,
    Postgres,
    Mysql,
    Bigquery,
    Databricks,
    Redshift,
}

impl From<DialectArg> for scia_core::types::Dialect {
    fn from(d: DialectArg) -> Self {
        use scia_core::types::Dialect;
        match d {
            DialectArg::Snowflake => Dialect::Snowflake,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::Mysql,
            DialectArg::Bigquery => Dialect::Bigquery,
            DialectArg::Databricks => Dialect::Databricks,
            DialectArg::Redshift => Dialect::Redshift,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum FailOn {
    Low,
    Medium,
    High,
}

impl From<scia_core::types::RiskClassification> for FailOn {
    fn from(c: scia_core::types::RiskClassification) -> Self {
        use scia_core::types::RiskClassification;
        match c {
            RiskClassification::Low => Self::Low,
            RiskClassification::Medium => Self::Medium,
            RiskClassification::High => Self::High,
        }
    }
}
