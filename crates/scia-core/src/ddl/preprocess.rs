//! Registry of dialect-specific text preprocessors that run before
//! `sqlparser` ever sees the DDL text (spec §4.2, design note §9).

use crate::types::Dialect;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

pub type Preprocessor = fn(&str) -> String;

fn registry() -> &'static RwLock<HashMap<Dialect, Vec<Preprocessor>>> {
    static REGISTRY: OnceLock<RwLock<HashMap<Dialect, Vec<Preprocessor>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map: HashMap<Dialect, Vec<Preprocessor>> = HashMap::new();
        map.insert(Dialect::Snowflake, vec![rewrite_snowflake_modify_column]);
        RwLock::new(map)
    })
}

/// Registers an additional text rewriter for `dialect`, appended after any
/// already-registered preprocessors for that dialect. New dialects may
/// register at process start without recompiling callers.
pub fn register_dialect_preprocessor(dialect: Dialect, func: Preprocessor) {
    registry()
        .write()
        .expect("preprocessor registry poisoned")
        .entry(dialect)
        .or_default()
        .push(func);
}

/// Applies every preprocessor registered for `dialect`, in registration
/// order.
pub fn preprocess(sql: &str, dialect: Dialect) -> String {
    let guard = registry().read().expect("preprocessor registry poisoned");
    let Some(funcs) = guard.get(&dialect) else {
        return sql.to_string();
    };
    let mut text = sql.to_string();
    for func in funcs {
        text = func(&text);
    }
    text
}

/// Rewrites Snowflake's `ALTER TABLE t MODIFY [COLUMN] c type` into the
/// standard `ALTER TABLE t ALTER COLUMN c TYPE type` that `sqlparser`
/// understands, mirroring
/// `original_source/scia/sql/ddl_parser.py::_preprocess_snowflake_modify_column`.
fn rewrite_snowflake_modify_column(sql: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)ALTER\s+TABLE\s+(\S+)\s+MODIFY(?:\s+COLUMN)?\s+(\S+)\s+(\S+(?:\([^)]*\))?)")
            .expect("invalid snowflake MODIFY COLUMN regex")
    });
    re.replace_all(sql, "ALTER TABLE $1 ALTER COLUMN $2 TYPE $3")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_modify_column_with_keyword() {
        let sql = "ALTER TABLE t MODIFY COLUMN c VARCHAR(255)";
        assert_eq!(
            rewrite_snowflake_modify_column(sql),
            "ALTER TABLE t ALTER COLUMN c TYPE VARCHAR(255)"
        );
    }

    #[test]
    fn rewrites_modify_column_without_keyword() {
        let sql = "ALTER TABLE t MODIFY c INT";
        assert_eq!(
            rewrite_snowflake_modify_column(sql),
            "ALTER TABLE t ALTER COLUMN c TYPE INT"
        );
    }

    #[test]
    fn preprocess_is_noop_for_unregistered_dialect() {
        let sql = "ALTER TABLE t MODIFY COLUMN c INT";
        assert_eq!(preprocess(sql, Dialect::Postgres), sql);
    }

    #[test]
    fn preprocess_applies_snowflake_rewrite() {
        let sql = "ALTER TABLE t MODIFY COLUMN c INT";
        assert_ne!(preprocess(sql, Dialect::Snowflake), sql);
    }

    #[test]
    fn custom_preprocessor_can_be_registered() {
        fn noop(s: &str) -> String {
            s.to_string()
        }
        register_dialect_preprocessor(Dialect::Mysql, noop);
        assert_eq!(preprocess("SELECT 1", Dialect::Mysql), "SELECT 1");
    }
}
