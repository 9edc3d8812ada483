//! Rendering a [`RiskAssessment`] as JSON or Markdown (spec §6).

use anyhow::{Context, Result};
use scia_core::types::{RiskAssessment, RiskClassification, Severity};

pub fn render_json(assessment: &RiskAssessment) -> Result<String> {
    serde_json::to_string_pretty(assessment).context("failed to serialize assessment as JSON")
}

/// Markdown report: title, risk summary, one section per finding.
///
/// Grounded in `original_source/scia/output/markdown.py::render_markdown`.
pub fn render_markdown(assessment: &RiskAssessment) -> String {
    let mut lines = vec![
        "# SCIA Impact Report".to_string(),
        format!("**Risk Score:** {}", assessment.risk_score),
        format!("**Classification:** {}", classification_label(assessment.classification)),
        String::new(),
        "## Findings".to_string(),
        String::new(),
    ];

    if assessment.findings.is_empty() {
        lines.push("No impactful changes detected.".to_string());
    } else {
        for finding in &assessment.findings {
            let marker = severity_marker(finding.severity);
            lines.push(format!("### {marker} {:?}", finding.finding_type));
            lines.push(format!("- **Severity:** {}", severity_label(finding.severity)));
            lines.push(format!("- **Risk contribution:** {}", finding.effective_risk()));
            lines.push(format!("- **Description:** {}", finding.description));
            if !finding.evidence.is_empty() {
                let evidence = serde_json::to_string(&finding.evidence).unwrap_or_default();
                lines.push(format!("- **Evidence:** `{evidence}`"));
            }
            if let Some(impact) = &finding.impact {
                lines.push(format!(
                    "- **Blast radius:** {} direct, {} transitive",
                    impact.direct_dependents.len(),
                    impact.transitive_dependents.len()
                ));
            }
            lines.push(String::new());
        }
    }

    if !assessment.warnings.is_empty() {
        lines.push("## Warnings".to_string());
        lines.push(String::new());
        for warning in &assessment.warnings {
            lines.push(format!("- {warning}"));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn severity_marker(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "[HIGH]",
        Severity::Medium => "[MEDIUM]",
        Severity::Low => "[LOW]",
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "HIGH",
        Severity::Medium => "MEDIUM",
        Severity::Low => "LOW",
    }
}

fn classification_label(classification: RiskClassification) -> &'static str {
    match classification {
        RiskClassification::Low => "LOW",
        RiskClassification::Medium => "MEDIUM",
        RiskClassification::High => "HIGH",
    }
}
