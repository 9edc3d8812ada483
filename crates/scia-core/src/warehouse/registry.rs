//! Named warehouse adapter constructors (spec §4.6 expansion, design
//! note §9 "pluggable warehouse adapters").
//!
//! Grounded in `original_source/scia/warehouse/__init__.py`'s
//! `WAREHOUSE_ADAPTERS` map: stub warehouses surface
//! `ScError::AdapterError` at lookup time, not at call time. Network
//! clients for snowflake/postgres/redshift/databricks are out of scope
//! (spec.md §1); this registry exists to prove the plug point, not to
//! connect anywhere.

use super::WarehouseAdapter;
use crate::error::ScError;

/// Looks up a warehouse adapter constructor by name (case-insensitive).
///
/// Every name in spec §6's `--warehouse` set is recognized; all of them
/// currently resolve to `ScError::AdapterError` describing the missing
/// network client, since only [`super::InMemoryAdapter`] (not
/// name-addressable here; constructed directly by callers/tests) is
/// functional.
pub fn construct(name: &str) -> Result<Box<dyn WarehouseAdapter>, ScError> {
    match name.to_ascii_lowercase().as_str() {
        "snowflake" | "postgres" | "redshift" | "databricks" => Err(ScError::AdapterError(
            format!("warehouse '{name}' has no network client in this build"),
        )),
        other => Err(ScError::AdapterError(format!(
            "unsupported warehouse: '{other}'"
        ))),
    }
}

/// Warehouse names recognized by [`construct`] — all currently stubs.
pub const KNOWN_WAREHOUSES: &[&str] = &["snowflake", "postgres", "redshift", "databricks"];
