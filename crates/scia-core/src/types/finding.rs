//! Findings, impact details, and the final risk assessment.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingType {
    SchemaRemoved,
    SchemaAdded,
    TableRemoved,
    TableAdded,
    ColumnRemoved,
    ColumnAdded,
    ColumnTypeChanged,
    NullabilityTightened,
    JoinKeyChanged,
    GrainChange,
}

/// One classified risk observation tied to a specific structural change.
///
/// `base_risk` MUST fall in the band implied by `severity` (spec §3):
/// HIGH ≥ 80, MEDIUM ∈ [40,79], LOW ∈ [0,39].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct Finding {
    pub finding_type: FindingType,
    pub severity: Severity,
    pub base_risk: u32,
    pub evidence: BTreeMap<String, Value>,
    pub confidence: f64,
    pub description: String,
    /// Present once impact enrichment has run for this finding.
    #[serde(
        rename = "impact_detail",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub impact: Option<ImpactDetail>,
    /// Risk contribution used by the aggregator; defaults to `base_risk`
    /// but may be discounted by impact enrichment (spec §4.7).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u32>,
}

impl Finding {
    pub fn new(
        finding_type: FindingType,
        severity: Severity,
        base_risk: u32,
        description: impl Into<String>,
    ) -> Self {
        debug_assert!(severity_band_holds(severity, base_risk));
        Self {
            finding_type,
            severity,
            base_risk,
            evidence: BTreeMap::new(),
            confidence: 1.0,
            description: description.into(),
            impact: None,
            risk_score: None,
        }
    }

    pub fn with_evidence(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.evidence.insert(key.to_string(), value.into());
        self
    }

    /// Effective risk contribution for aggregation: `risk_score` if set
    /// (e.g. after a blast-radius discount), otherwise `base_risk`.
    pub fn effective_risk(&self) -> u32 {
        self.risk_score.unwrap_or(self.base_risk)
    }

    pub fn table_name(&self) -> Option<&str> {
        self.evidence.get("table").and_then(Value::as_str)
    }
}

fn severity_band_holds(severity: Severity, base_risk: u32) -> bool {
    match severity {
        Severity::High => base_risk >= 80,
        Severity::Medium => (40..=79).contains(&base_risk),
        Severity::Low => base_risk <= 39,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyObjectType {
    Table,
    View,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct DependencyObject {
    pub object_type: DependencyObjectType,
    pub name: String,
    pub schema: String,
    pub is_critical: bool,
}

/// Detail attached to a finding once impact analysis has run against it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ImpactDetail {
    pub direct_dependents: Vec<DependencyObject>,
    pub transitive_dependents: Vec<DependencyObject>,
    pub upstream_dependencies: Vec<DependencyObject>,
    pub downstream_tables: Vec<DependencyObject>,
    pub affected_applications: Vec<String>,
    pub estimated_blast_radius: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskClassification {
    Low,
    Medium,
    High,
}

/// The final output of an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct RiskAssessment {
    pub risk_score: u32,
    pub classification: RiskClassification,
    pub warnings: Vec<String>,
    pub findings: Vec<Finding>,
}
