//! Structural signals pulled from a SQL statement (§4.3).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structural signals extracted from a single SQL statement.
///
/// All identifiers are upper-cased at extraction time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct SqlMetadata {
    pub tables: BTreeSet<String>,
    pub columns: BTreeSet<String>,
    pub group_by_cols: BTreeSet<String>,
    pub join_keys: Vec<(String, String)>,
}

impl SqlMetadata {
    /// True when `column` appears as either side of any recorded join key.
    pub fn has_join_key_column(&self, column: &str) -> bool {
        let column = column.to_uppercase();
        self.join_keys
            .iter()
            .any(|(a, b)| *a == column || *b == column)
    }
}

/// Map of statement name (e.g. a view or migration step name) to its
/// extracted signals. Entries whose parse failed are simply absent.
pub type SqlSignals = std::collections::BTreeMap<String, SqlMetadata>;

/// True if `column` appears in any signal's `columns` set.
pub fn any_signal_has_column(signals: &SqlSignals, column: &str) -> bool {
    let column = column.to_uppercase();
    signals.values().any(|m| m.columns.contains(&column))
}

/// True if `column` appears in any signal's `join_keys`.
pub fn any_signal_has_join_key(signals: &SqlSignals, column: &str) -> bool {
    signals.values().any(|m| m.has_join_key_column(column))
}

/// True if `column` appears in any signal's `group_by_cols`.
pub fn any_signal_has_group_by(signals: &SqlSignals, column: &str) -> bool {
    let column = column.to_uppercase();
    signals.values().any(|m| m.group_by_cols.contains(&column))
}
