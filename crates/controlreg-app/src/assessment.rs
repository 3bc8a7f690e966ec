//! Assessment document maintenance: seed from a registry, then patch item by item.

use anyhow::Context;
use camino::Utf8Path;
use controlreg_domain::assessment::{apply_patch, seed_assessment};
use controlreg_types::{Assessment, AssessmentItemPatch, Registry};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use time::OffsetDateTime;

#[derive(Clone, Debug)]
pub struct AssessmentInitInput<'a> {
    pub registry_path: &'a Utf8Path,
    pub out_path: &'a Utf8Path,
    pub id: String,
    pub name: String,
    pub scope: BTreeMap<String, JsonValue>,
    pub now: OffsetDateTime,
}

/// Write a fresh assessment with one `not_assessed` item per registry control.
pub fn run_assessment_init(input: AssessmentInitInput<'_>) -> anyhow::Result<Assessment> {
    let registry: Registry =
        controlreg_repo::read_json(input.registry_path).context("load registry")?;
    let assessment = seed_assessment(input.id, input.name, &registry, input.scope, input.now);
    controlreg_repo::write_json_pretty(input.out_path, &assessment)?;
    tracing::info!(
        assessment = %assessment.id,
        items = assessment.items.len(),
        path = %input.out_path,
        "seeded assessment"
    );
    Ok(assessment)
}

#[derive(Clone, Debug)]
pub struct AssessmentSetInput<'a> {
    pub assessment_path: &'a Utf8Path,
    pub control_id: &'a str,
    pub patch: AssessmentItemPatch,
    pub now: OffsetDateTime,
}

/// Apply one patch to an assessment document in place.
pub fn run_assessment_set(input: AssessmentSetInput<'_>) -> anyhow::Result<Assessment> {
    let mut assessment: Assessment =
        controlreg_repo::read_json(input.assessment_path).context("load assessment")?;
    let item = apply_patch(&mut assessment, input.control_id, &input.patch, input.now)?;
    tracing::debug!(
        control_id = %item.control_id,
        status = ?item.status,
        score = ?item.score,
        "patched assessment item"
    );
    controlreg_repo::write_json_pretty(input.assessment_path, &assessment)?;
    Ok(assessment)
}
