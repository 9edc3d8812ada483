//! Risk aggregator: saturating normalization curve and three-way
//! classification (spec §4.8).

use crate::types::{Finding, RiskAssessment, RiskClassification, Severity};

/// Sensitivity constant: raw risk of 100 normalizes to score 50, raw 400
/// to score 80.
const SATURATION_K: u32 = 100;

/// Aggregates `findings` and any accumulated `warnings` into a final
/// [`RiskAssessment`].
pub fn aggregate(findings: Vec<Finding>, warnings: Vec<String>) -> RiskAssessment {
    let raw: u32 = findings.iter().map(Finding::effective_risk).sum();
    let score = normalize(raw);
    let classification = classify(score, &findings);

    RiskAssessment {
        risk_score: score,
        classification,
        warnings,
        findings,
    }
}

/// `score = floor(100 * raw / (raw + K))`. Monotonic in `raw`; `raw = 0`
/// gives `0`; `raw -> infinity` approaches `100`.
fn normalize(raw: u32) -> u32 {
    if raw == 0 {
        return 0;
    }
    (100u64 * raw as u64 / (raw as u64 + SATURATION_K as u64)) as u32
}

fn classify(score: u32, findings: &[Finding]) -> RiskClassification {
    if score < 15 {
        RiskClassification::Low
    } else if score < 40 {
        RiskClassification::Medium
    } else if findings.iter().any(|f| f.severity == Severity::High) {
        RiskClassification::High
    } else {
        RiskClassification::Medium
    }
}
