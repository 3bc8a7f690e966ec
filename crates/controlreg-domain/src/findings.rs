//! Findings validation against one compiled registry.

use crate::error::ReportError;
use crate::normalize::json_type_name;
use controlreg_types::{
    Finding, FindingsDocument, Registry, ScoreScale, Violation, ViolationKind, ids,
};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

/// Decode the document envelope. Entries stay raw for [`validate_findings`].
pub fn parse_findings_document(value: &JsonValue) -> Result<FindingsDocument, ReportError> {
    serde_json::from_value(value.clone()).map_err(|e| {
        ReportError::Invalid(vec![
            Violation::new(
                ViolationKind::StructuralError,
                ids::CODE_FINDINGS_MALFORMED,
                "findings",
                format!("findings document is malformed: {e}"),
            )
            .at("(root)"),
        ])
    })
}

/// Fatal, checked before anything else: findings must target this exact control set.
pub fn check_registry_hash(registry: &Registry, declared: &str) -> Result<(), ReportError> {
    if declared != registry.registry_hash() {
        return Err(ReportError::HashMismatch {
            declared: declared.to_string(),
            actual: registry.registry_hash().to_string(),
        });
    }
    Ok(())
}

/// Validate every entry and return them typed, in document order.
///
/// All per-entry problems are collected. Control ids missing from the registry are then
/// reported as one violation listing every offender, sorted.
pub fn validate_findings(
    registry: &Registry,
    doc: &FindingsDocument,
) -> Result<Vec<Finding>, ReportError> {
    check_registry_hash(registry, &doc.registry_hash)?;

    let mut violations = Vec::new();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut unknown: BTreeSet<&str> = BTreeSet::new();
    let mut findings = Vec::with_capacity(doc.findings.len());

    for (idx, entry) in doc.findings.iter().enumerate() {
        let source = format!("findings[{idx}]");
        let before = violations.len();

        let Some(obj) = entry.as_object() else {
            violations.push(
                Violation::new(
                    ViolationKind::StructuralError,
                    ids::CODE_FINDING_NOT_AN_OBJECT,
                    &source,
                    format!("finding must be an object (got {})", json_type_name(entry)),
                )
                .at("(root)"),
            );
            continue;
        };

        let control_id = match obj.get("control_id") {
            Some(JsonValue::String(id)) if !id.is_empty() => Some(id.as_str()),
            _ => {
                violations.push(
                    Violation::new(
                        ViolationKind::StructuralError,
                        ids::CODE_FINDING_MISSING_CONTROL_ID,
                        &source,
                        "control_id must be a non-empty string",
                    )
                    .at("control_id"),
                );
                None
            }
        };
        if let Some(id) = control_id {
            if !seen.insert(id) {
                violations.push(
                    Violation::new(
                        ViolationKind::DuplicateFinding,
                        ids::CODE_DUPLICATE_FINDING,
                        &source,
                        format!("duplicate finding for control_id '{id}'"),
                    )
                    .at("control_id"),
                );
            }
            if registry.control(id).is_none() {
                unknown.insert(id);
            }
        }

        let scale = &registry.scoring.scale;
        let score = check_score(obj.get("score"), scale, &source, &mut violations);
        let text = check_text(obj.get("finding"), &source, &mut violations);
        let evidence_refs = check_refs(obj.get("evidence_refs"), &source, &mut violations);

        if violations.len() == before {
            if let (Some(id), Some(score)) = (control_id, score) {
                findings.push(Finding {
                    control_id: id.to_string(),
                    score,
                    finding: text,
                    evidence_refs,
                });
            }
        }
    }

    if !unknown.is_empty() {
        let listed: Vec<&str> = unknown.into_iter().collect();
        violations.push(Violation::new(
            ViolationKind::UnknownControl,
            ids::CODE_UNKNOWN_CONTROL,
            "findings",
            format!("unknown control_id(s) in findings: {}", listed.join(", ")),
        ));
    }

    if violations.is_empty() {
        Ok(findings)
    } else {
        Err(ReportError::Invalid(violations))
    }
}

fn check_score(
    raw: Option<&JsonValue>,
    scale: &ScoreScale,
    source: &str,
    out: &mut Vec<Violation>,
) -> Option<i64> {
    let raw = raw.unwrap_or(&JsonValue::Null);
    let Some(score) = raw.as_i64() else {
        out.push(
            Violation::new(
                ViolationKind::Range,
                ids::CODE_FINDING_SCORE_NOT_INTEGER,
                source,
                format!("score must be an integer (got {})", json_type_name(raw)),
            )
            .at("score"),
        );
        return None;
    };
    if !scale.contains(score) {
        out.push(
            Violation::new(
                ViolationKind::Range,
                ids::CODE_FINDING_SCORE_OUT_OF_RANGE,
                source,
                format!("score {score} outside scale {}-{}", scale.min, scale.max),
            )
            .at("score"),
        );
        return None;
    }
    Some(score)
}

fn check_text(raw: Option<&JsonValue>, source: &str, out: &mut Vec<Violation>) -> String {
    match raw {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => {
            out.push(
                Violation::new(
                    ViolationKind::StructuralError,
                    ids::CODE_FINDING_FIELD_TYPE,
                    source,
                    format!("finding must be a string (got {})", json_type_name(other)),
                )
                .at("finding"),
            );
            String::new()
        }
    }
}

fn check_refs(raw: Option<&JsonValue>, source: &str, out: &mut Vec<Violation>) -> Vec<String> {
    let invalid = |out: &mut Vec<Violation>| {
        out.push(
            Violation::new(
                ViolationKind::StructuralError,
                ids::CODE_FINDING_FIELD_TYPE,
                source,
                "evidence_refs must be a list of strings",
            )
            .at("evidence_refs"),
        );
    };
    match raw {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(items)) => {
            let refs: Option<Vec<String>> = items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect();
            refs.unwrap_or_else(|| {
                invalid(out);
                Vec::new()
            })
        }
        Some(_) => {
            invalid(out);
            Vec::new()
        }
    }
}
