use crate::assessment::AssessmentStatus;
use crate::control::Control;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// The merged risk report (`report.json`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    pub registry_hash: String,
    #[schemars(with = "Option<String>")]
    #[serde(default, with = "crate::timefmt::utc_seconds::option")]
    pub assessed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub scope: BTreeMap<String, JsonValue>,
    pub summary: ReportSummary,
    /// Sorted by domain id.
    pub domains: Vec<DomainReport>,
    /// Sorted by control id.
    pub controls: Vec<ReportControl>,
    /// At most five entries, highest risk first.
    pub top_risks: Vec<RiskEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportSummary {
    /// `None` when nothing was assessed.
    pub overall_score: Option<f64>,
    pub controls_assessed: u32,
    pub controls_total: u32,
    pub controls_not_assessed: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DomainReport {
    pub id: String,
    pub name: String,
    pub description: String,
    pub score: Option<f64>,
    pub controls_assessed: u32,
    pub controls_total: u32,
    /// Sum of the weights of every control in the domain, assessed or not.
    pub weight: i64,
}

/// A registry control decorated with its outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportControl {
    #[serde(flatten)]
    pub control: Control,
    pub finding: ControlOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ControlOutcome {
    pub status: AssessmentStatus,
    pub score: Option<i64>,
    pub text: String,
    pub evidence_refs: Vec<String>,
}

impl ControlOutcome {
    /// Placeholder for a control nobody assessed.
    pub fn not_assessed() -> Self {
        Self {
            status: AssessmentStatus::NotAssessed,
            score: None,
            text: String::new(),
            evidence_refs: Vec::new(),
        }
    }

    /// The score that counts toward weighted scores and risk, if any.
    pub fn scored(&self) -> Option<i64> {
        match self.status {
            AssessmentStatus::Assessed => self.score,
            AssessmentStatus::NotAssessed => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RiskEntry {
    pub control_id: String,
    pub domain: String,
    pub weight: i64,
    pub score: i64,
    pub risk_score: i64,
    pub title: String,
    pub finding: String,
}
