//! Core SQL schema change impact analysis engine: given before/after
//! schema snapshots, classifies structural differences into
//! severity-weighted findings, optionally enriches them with
//! warehouse-sourced impact data, and aggregates an overall risk score.
//!
//! The pipeline is a straight line of pure, independently-testable
//! stages — [`input`] resolves what kind of source each side is,
//! [`ddl`] and [`snapshot`] materialize table lists from it,
//! [`sql_signals`] pulls structural hints out of migration SQL,
//! [`diff`] compares two schemas, [`rules`] turns the diff into
//! findings, [`impact`] enriches findings with warehouse dependency
//! data, and [`risk`] folds everything into a single assessment.
//! [`orchestrator::run_analysis`] drives the whole sequence.

pub mod cancel;
pub mod ddl;
pub mod diff;
pub mod error;
pub mod impact;
pub mod input;
pub mod orchestrator;
pub mod risk;
pub mod rules;
pub mod snapshot;
pub mod sql_signals;
pub mod types;
pub mod warehouse;

pub use error::{ScError, ScResult};
pub use orchestrator::{run_analysis, AnalysisRequest};
