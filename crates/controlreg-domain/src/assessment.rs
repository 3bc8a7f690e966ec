//! Assessment items: the incremental alternative to a one-shot findings document.
//!
//! An assessment is seeded from a registry with one `not_assessed` item per control, patched
//! item by item, and finally scored through the same report path as findings.

use crate::error::{PatchError, ReportError};
use crate::findings::check_registry_hash;
use crate::report::{ReportHeader, assemble_report};
use controlreg_types::{
    Assessment, AssessmentItem, AssessmentItemPatch, AssessmentStatus, ControlOutcome, Registry,
    Report, Violation, ViolationKind, ids,
};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};
use time::OffsetDateTime;

/// One `not_assessed` item per registry control, sorted by control id.
pub fn seed_items(registry: &Registry) -> Vec<AssessmentItem> {
    let mut items: Vec<AssessmentItem> = registry
        .controls
        .iter()
        .map(|control| AssessmentItem {
            control_id: control.id.clone(),
            domain: control.domain.clone(),
            weight: control.weight,
            status: AssessmentStatus::NotAssessed,
            score: None,
            finding_text: String::new(),
            evidence_refs: Vec::new(),
            assessor_notes: String::new(),
            control: serde_json::to_value(control).unwrap_or(JsonValue::Null),
        })
        .collect();
    items.sort_by(|a, b| a.control_id.cmp(&b.control_id));
    items
}

pub fn seed_assessment(
    id: impl Into<String>,
    name: impl Into<String>,
    registry: &Registry,
    scope: BTreeMap<String, JsonValue>,
    created_at: OffsetDateTime,
) -> Assessment {
    Assessment {
        id: id.into(),
        name: name.into(),
        created_at: controlreg_types::timefmt::truncate(created_at),
        assessed_at: None,
        registry_hash: registry.registry_hash().to_string(),
        scope,
        items: seed_items(registry),
    }
}

/// Apply a partial update to the item for `control_id`.
///
/// Only fields present in the patch change. When the item ends up `assessed`, the
/// assessment's `assessed_at` is stamped with `now`.
pub fn apply_patch<'a>(
    assessment: &'a mut Assessment,
    control_id: &str,
    patch: &AssessmentItemPatch,
    now: OffsetDateTime,
) -> Result<&'a AssessmentItem, PatchError> {
    let idx = assessment
        .items
        .iter()
        .position(|item| item.control_id == control_id)
        .ok_or_else(|| PatchError::ItemNotFound {
            control_id: control_id.to_string(),
        })?;

    patch.apply(&mut assessment.items[idx]);
    if assessment.items[idx].status == AssessmentStatus::Assessed {
        assessment.assessed_at = Some(controlreg_types::timefmt::truncate(now));
    }
    Ok(&assessment.items[idx])
}

/// Score an assessment with the same rules as a findings document.
pub fn build_report_from_assessment(
    registry: &Registry,
    assessment: &Assessment,
) -> Result<Report, ReportError> {
    check_registry_hash(registry, &assessment.registry_hash)?;

    let scale = &registry.scoring.scale;
    let mut violations = Vec::new();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut unknown: BTreeSet<&str> = BTreeSet::new();
    let mut outcomes: BTreeMap<String, ControlOutcome> = BTreeMap::new();

    for (idx, item) in assessment.items.iter().enumerate() {
        let source = format!("items[{idx}]");
        let id = item.control_id.as_str();
        if !seen.insert(id) {
            violations.push(
                Violation::new(
                    ViolationKind::DuplicateFinding,
                    ids::CODE_DUPLICATE_FINDING,
                    &source,
                    format!("duplicate item for control_id '{id}'"),
                )
                .at("control_id"),
            );
            continue;
        }
        if registry.control(id).is_none() {
            unknown.insert(id);
            continue;
        }
        if let Some(score) = item.score.filter(|s| !scale.contains(*s)) {
            violations.push(
                Violation::new(
                    ViolationKind::Range,
                    ids::CODE_FINDING_SCORE_OUT_OF_RANGE,
                    &source,
                    format!("score {score} outside scale {}-{}", scale.min, scale.max),
                )
                .at("score"),
            );
            continue;
        }
        outcomes.insert(
            id.to_string(),
            ControlOutcome {
                status: item.status,
                score: item.score,
                text: item.finding_text.clone(),
                evidence_refs: item.evidence_refs.clone(),
            },
        );
    }

    if !unknown.is_empty() {
        let listed: Vec<&str> = unknown.into_iter().collect();
        violations.push(Violation::new(
            ViolationKind::UnknownControl,
            ids::CODE_UNKNOWN_CONTROL,
            "items",
            format!("unknown control_id(s) in assessment: {}", listed.join(", ")),
        ));
    }
    if !violations.is_empty() {
        return Err(ReportError::Invalid(violations));
    }

    let header = ReportHeader {
        registry_hash: assessment.registry_hash.clone(),
        assessed_at: assessment.assessed_at,
        scope: assessment.scope.clone(),
    };
    Ok(assemble_report(registry, &outcomes, header))
}
