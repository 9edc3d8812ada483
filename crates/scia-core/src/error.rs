//! Error taxonomy for the analysis pipeline (spec §7).
//!
//! The core never uses exceptions for control flow across components:
//! [`ScError`] carries only the kinds that are fatal to a run
//! (`InputNotFound`, `MissingWarehouse` in DB mode, `ConnectionError` in
//! DB mode, `Cancelled`, `ConfigError`). Recoverable conditions —
//! `ParseError`, `AdapterError`, degraded connections in JSON/DDL mode,
//! unknown DDL statements, partial SQL parses — are logged and folded
//! into [`crate::types::RiskAssessment::warnings`] instead of being
//! propagated as errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScError {
    #[error("input not found: {0}")]
    InputNotFound(String),

    #[error("database mode requires a --warehouse hint")]
    MissingWarehouse,

    #[error("input could not be classified: {0}")]
    AmbiguousInput(String),

    #[error("failed to parse DDL: {0}")]
    ParseError(String),

    #[error("warehouse adapter error: {0}")]
    AdapterError(String),

    #[error("failed to connect to warehouse: {0}")]
    ConnectionError(String),

    #[error("configuration error ({path}): {message}")]
    ConfigError { path: String, message: String },

    #[error("analysis cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

pub type ScResult<T> = Result<T, ScError>;

pub(crate) fn log_recoverable(context: &str, message: impl std::fmt::Display) {
    #[cfg(feature = "tracing")]
    tracing::warn!(context, %message, "recoverable error");
    #[cfg(not(feature = "tracing"))]
    let _ = (context, message);
}
