//! Warehouse connection configuration loading (spec §6 "Connection config").
//!
//! Lookup order: explicit `--conn-file` -> `$HOME/.scia/<warehouse>.yaml`
//! -> `<WAREHOUSE>_{ACCOUNT,USER,PASSWORD,HOST,PORT,DATABASE}` env vars ->
//! built-in defaults (possibly incomplete; connection then fails at the
//! adapter boundary, per spec §7's `ConnectionError` policy).
//!
//! Grounded in `original_source/scia/config/connection.py`.

use scia_core::warehouse::ConnectionConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ENV_PARAMS: &[&str] = &["ACCOUNT", "USER", "PASSWORD", "HOST", "PORT", "DATABASE"];

/// Connection-config errors, surfaced with a path hint per spec §7's
/// `ConfigError` policy ("surface to caller with path hint").
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read connection config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid connection config YAML at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(
        "missing required connection parameters for {warehouse}: {fields}. \
         Provide via --conn-file or ~/.scia/{warehouse_lower}.yaml"
    )]
    MissingFields {
        warehouse: String,
        warehouse_lower: String,
        fields: String,
    },
}

type Result<T> = std::result::Result<T, ConfigError>;

/// Loads connection configuration for `warehouse`, trying each source in
/// priority order and returning the first that yields anything.
pub fn load_connection_config(
    conn_file: Option<&Path>,
    warehouse: &str,
) -> Result<ConnectionConfig> {
    if let Some(path) = conn_file {
        return load_yaml_config(path);
    }

    let default_path = default_config_path(warehouse);
    if default_path.exists() {
        return load_yaml_config(&default_path);
    }

    if let Some(config) = load_from_env(warehouse) {
        return Ok(config);
    }

    Ok(default_config(warehouse))
}

fn default_config_path(warehouse: &str) -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".scia")
        .join(format!("{}.yaml", warehouse.to_ascii_lowercase()))
}

fn load_yaml_config(path: &Path) -> Result<ConnectionConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: ConnectionConfig = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    Ok(config)
}

fn load_from_env(warehouse: &str) -> Option<ConnectionConfig> {
    let prefix = warehouse.to_ascii_uppercase();
    let mut config = ConnectionConfig::new();
    for param in ENV_PARAMS {
        let key = format!("{prefix}_{param}");
        if let Ok(value) = std::env::var(&key) {
            config.insert(param.to_ascii_lowercase(), value);
        }
    }
    if config.is_empty() {
        None
    } else {
        Some(config)
    }
}

fn default_config(warehouse: &str) -> ConnectionConfig {
    let mut config = ConnectionConfig::new();
    match warehouse.to_ascii_lowercase().as_str() {
        "snowflake" => {
            config.insert("warehouse".to_string(), "COMPUTE_WH".to_string());
            config.insert("schema".to_string(), "PUBLIC".to_string());
        }
        "postgres" | "redshift" => {
            config.insert("host".to_string(), "localhost".to_string());
        }
        "databricks" => {
            config.insert("catalog".to_string(), "hive_metastore".to_string());
        }
        _ => {}
    }
    config
}

/// Required keys per warehouse (spec §6 "Connection config").
pub fn required_fields(warehouse: &str) -> &'static [&'static str] {
    match warehouse.to_ascii_lowercase().as_str() {
        "snowflake" => &["account", "user", "password"],
        "postgres" | "redshift" => &["host", "user", "password", "database"],
        "databricks" => &["host", "token"],
        _ => &[],
    }
}

/// Validates that `config` has every required field for `warehouse`
/// populated with a non-empty value.
pub fn validate_connection_config(warehouse: &str, config: &ConnectionConfig) -> Result<()> {
    let missing: Vec<&str> = required_fields(warehouse)
        .iter()
        .filter(|field| config.get(**field).map(|v| v.is_empty()).unwrap_or(true))
        .copied()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingFields {
            warehouse: warehouse.to_string(),
            warehouse_lower: warehouse.to_ascii_lowercase(),
            fields: missing.join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_fallback_picks_up_prefixed_vars() {
        std::env::set_var("SNOWFLAKE_ACCOUNT", "acme");
        std::env::set_var("SNOWFLAKE_USER", "bob");
        let config = load_from_env("snowflake").unwrap();
        assert_eq!(config.get("account"), Some(&"acme".to_string()));
        assert_eq!(config.get("user"), Some(&"bob".to_string()));
        std::env::remove_var("SNOWFLAKE_ACCOUNT");
        std::env::remove_var("SNOWFLAKE_USER");
    }

    #[test]
    fn env_fallback_is_none_when_nothing_set() {
        std::env::remove_var("DATABRICKS_ACCOUNT");
        std::env::remove_var("DATABRICKS_USER");
        std::env::remove_var("DATABRICKS_PASSWORD");
        std::env::remove_var("DATABRICKS_HOST");
        std::env::remove_var("DATABRICKS_PORT");
        std::env::remove_var("DATABRICKS_DATABASE");
        assert!(load_from_env("databricks").is_none());
    }

    #[test]
    fn defaults_are_incomplete_but_present() {
        let config = default_config("postgres");
        assert_eq!(config.get("host"), Some(&"localhost".to_string()));
        assert!(validate_connection_config("postgres", &config).is_err());
    }

    #[test]
    fn validate_passes_when_all_required_fields_present() {
        let mut config = ConnectionConfig::new();
        config.insert("host".to_string(), "db.internal".to_string());
        config.insert("user".to_string(), "bob".to_string());
        config.insert("password".to_string(), "secret".to_string());
        config.insert("database".to_string(), "analytics".to_string());
        assert!(validate_connection_config("postgres", &config).is_ok());
    }

    #[test]
    fn validate_fails_listing_missing_fields() {
        let config = ConnectionConfig::new();
        let err = validate_connection_config("databricks", &config).unwrap_err();
        assert!(err.to_string().contains("host"));
        assert!(err.to_string().contains("token"));
    }

    #[test]
    fn explicit_conn_file_loads_yaml() {
        let dir = std::env::temp_dir().join(format!(
            "scia-test-conn-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("snowflake.yaml");
        std::fs::write(&path, "account: acme\nuser: bob\npassword: secret\n").unwrap();

        let config = load_connection_config(Some(&path), "snowflake").unwrap();
        assert_eq!(config.get("account"), Some(&"acme".to_string()));

        std::fs::remove_dir_all(&dir).ok();
    }
}
