//! JSON schema snapshot loading and rendering (spec §6).
//!
//! A snapshot is either a single table object or an array of table
//! objects; both forms round-trip through [`Table`]'s `serde` impl.

use crate::error::ScError;
use crate::types::Table;
use std::path::Path;

/// Loads a JSON schema snapshot from `path`, accepting either a single
/// table object or an array of table objects.
pub fn load_json_tables(path: &Path) -> Result<Vec<Table>, ScError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ScError::InputNotFound(format!("{}: {e}", path.display())))?;
    parse_json_tables(&text)
}

/// Parses a JSON schema snapshot string directly (single object or array).
pub fn parse_json_tables(text: &str) -> Result<Vec<Table>, ScError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ScError::ParseError(e.to_string()))?;
    match value {
        serde_json::Value::Array(_) => {
            serde_json::from_value(value).map_err(|e| ScError::ParseError(e.to_string()))
        }
        serde_json::Value::Object(_) => {
            let table: Table =
                serde_json::from_value(value).map_err(|e| ScError::ParseError(e.to_string()))?;
            Ok(vec![table])
        }
        other => Err(ScError::ParseError(format!(
            "expected a table object or array of tables, got {other}"
        ))),
    }
}

/// Renders `tables` back into the JSON array form used on the wire.
pub fn render_json_tables(tables: &[Table]) -> serde_json::Value {
    serde_json::to_value(tables).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;

    fn sample() -> Table {
        let mut t = Table::new("sales", "orders");
        t.columns.push(Column::new("sales", "orders", "id", "INT", false, 1));
        t
    }

    #[test]
    fn single_object_parses_to_one_table() {
        let json = serde_json::to_string(&sample()).unwrap();
        let tables = parse_json_tables(&json).unwrap();
        assert_eq!(tables.len(), 1);
    }

    #[test]
    fn array_form_parses_to_many_tables() {
        let json = serde_json::to_string(&vec![sample(), sample()]).unwrap();
        let tables = parse_json_tables(&json).unwrap();
        assert_eq!(tables.len(), 2);
    }

    #[test]
    fn render_then_parse_round_trips() {
        let original = vec![sample()];
        let rendered = render_json_tables(&original);
        let text = serde_json::to_string(&rendered).unwrap();
        let parsed = parse_json_tables(&text).unwrap();
        assert_eq!(parsed[0].identity_key(), original[0].identity_key());
        assert_eq!(parsed[0].columns.len(), original[0].columns.len());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = parse_json_tables("not json");
        assert!(matches!(result, Err(ScError::ParseError(_))));
    }
}
