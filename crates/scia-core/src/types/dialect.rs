//! SQL dialect tag shared by the DDL parser, the SQL signal extractor,
//! and warehouse adapter selection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// SQL dialect for DDL parsing and signal extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Snowflake,
    Postgres,
    Mysql,
    Bigquery,
    Databricks,
    Redshift,
}

impl Dialect {
    /// Maps this dialect tag onto the closest `sqlparser` dialect.
    pub fn to_sqlparser_dialect(self) -> Box<dyn sqlparser::dialect::Dialect> {
        use sqlparser::dialect::{
            BigQueryDialect, DatabricksDialect, MySqlDialect, PostgreSqlDialect,
            RedshiftSqlDialect, SnowflakeDialect,
        };
        match self {
            Self::Snowflake => Box::new(SnowflakeDialect {}),
            Self::Postgres => Box::new(PostgreSqlDialect {}),
            Self::Mysql => Box::new(MySqlDialect {}),
            Self::Bigquery => Box::new(BigQueryDialect {}),
            Self::Databricks => Box::new(DatabricksDialect {}),
            Self::Redshift => Box::new(RedshiftSqlDialect {}),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Snowflake => "snowflake",
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Bigquery => "bigquery",
            Self::Databricks => "databricks",
            Self::Redshift => "redshift",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "snowflake" => Ok(Self::Snowflake),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "mysql" => Ok(Self::Mysql),
            "bigquery" => Ok(Self::Bigquery),
            "databricks" => Ok(Self::Databricks),
            "redshift" => Ok(Self::Redshift),
            other => Err(format!("unknown dialect: {other}")),
        }
    }
}
