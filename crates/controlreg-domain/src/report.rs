//! Report assembly: merge a registry with per-control outcomes.

use crate::error::ReportError;
use crate::findings::validate_findings;
use crate::scoring::{rank_risks, risk_score, weighted_score};
use controlreg_types::{
    AssessmentStatus, ControlOutcome, DomainReport, FindingsDocument, Registry, Report,
    ReportControl, ReportSummary, RiskEntry,
};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Report header fields copied from the input document.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportHeader {
    pub registry_hash: String,
    pub assessed_at: Option<OffsetDateTime>,
    pub scope: BTreeMap<String, JsonValue>,
}

/// Validate a findings document and score it against `registry`.
pub fn generate_report(
    registry: &Registry,
    doc: &FindingsDocument,
) -> Result<Report, ReportError> {
    let findings = validate_findings(registry, doc)?;

    let outcomes: BTreeMap<String, ControlOutcome> = findings
        .into_iter()
        .map(|f| {
            let outcome = ControlOutcome {
                status: AssessmentStatus::Assessed,
                score: Some(f.score),
                text: f.finding,
                evidence_refs: f.evidence_refs,
            };
            (f.control_id, outcome)
        })
        .collect();

    let header = ReportHeader {
        registry_hash: doc.registry_hash.clone(),
        assessed_at: doc.assessed_at,
        scope: doc.scope.clone(),
    };
    Ok(assemble_report(registry, &outcomes, header))
}

/// Build the report from already validated outcomes keyed by control id.
///
/// Controls without an outcome get the not-assessed placeholder. Every list is sorted so
/// identical inputs serialize to identical bytes.
pub fn assemble_report(
    registry: &Registry,
    outcomes: &BTreeMap<String, ControlOutcome>,
    header: ReportHeader,
) -> Report {
    let scale_max = registry.scoring.scale.max;

    let mut controls: Vec<ReportControl> = registry
        .controls
        .iter()
        .map(|control| ReportControl {
            control: control.clone(),
            finding: outcomes
                .get(&control.id)
                .cloned()
                .unwrap_or_else(ControlOutcome::not_assessed),
        })
        .collect();
    controls.sort_by(|a, b| a.control.id.cmp(&b.control.id));

    let scored: Vec<(&ReportControl, i64)> = controls
        .iter()
        .filter_map(|c| c.finding.scored().map(|s| (c, s)))
        .collect();

    let overall_pairs: Vec<(i64, i64)> =
        scored.iter().map(|(c, s)| (c.control.weight, *s)).collect();
    let controls_total = controls.len() as u32;
    let controls_assessed = scored.len() as u32;
    let summary = ReportSummary {
        overall_score: weighted_score(&overall_pairs, scale_max),
        controls_assessed,
        controls_total,
        controls_not_assessed: controls_total - controls_assessed,
    };

    let domains = domain_rows(registry, &controls, scale_max);

    let risks: Vec<RiskEntry> = scored
        .iter()
        .map(|(c, score)| RiskEntry {
            control_id: c.control.id.clone(),
            domain: c.control.domain.clone(),
            weight: c.control.weight,
            score: *score,
            risk_score: risk_score(scale_max, *score, c.control.weight),
            title: c.control.title.clone(),
            finding: c.finding.text.clone(),
        })
        .collect();

    Report {
        registry_hash: header.registry_hash,
        assessed_at: header.assessed_at,
        scope: header.scope,
        summary,
        domains,
        controls,
        top_risks: rank_risks(risks),
    }
}

/// One row per domain that has at least one control, sorted by id. Name and description come
/// from the declared domain when there is one.
fn domain_rows(
    registry: &Registry,
    controls: &[ReportControl],
    scale_max: i64,
) -> Vec<DomainReport> {
    let mut rows: BTreeMap<&str, DomainReport> = BTreeMap::new();
    let mut pairs: BTreeMap<&str, Vec<(i64, i64)>> = BTreeMap::new();
    for c in controls {
        let id = c.control.domain.as_str();
        let declared = registry.domains.iter().find(|d| d.id == id);
        let row = rows.entry(id).or_insert_with(|| DomainReport {
            id: id.to_string(),
            name: declared.map(|d| d.name.clone()).unwrap_or_default(),
            description: declared.map(|d| d.description.clone()).unwrap_or_default(),
            score: None,
            controls_assessed: 0,
            controls_total: 0,
            weight: 0,
        });
        row.controls_total += 1;
        row.weight = row.weight.saturating_add(c.control.weight);
        if let Some(score) = c.finding.scored() {
            row.controls_assessed += 1;
            pairs.entry(id).or_default().push((c.control.weight, score));
        }
    }

    rows.into_iter()
        .map(|(id, mut row)| {
            row.score = pairs.get(id).and_then(|p| weighted_score(p, scale_max));
            row
        })
        .collect()
}
