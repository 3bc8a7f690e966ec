use crate::normalize::{NormalizedDomains, normalize_domains};
use crate::registry::{RegistrySources, SourceDocument, compile};
use crate::schema::ControlSchema;
use controlreg_types::{FindingsDocument, Registry, SourcePath};
use serde_json::{Value as JsonValue, json};
use std::collections::BTreeMap;
use time::macros::datetime;

pub fn control_schema() -> ControlSchema {
    ControlSchema::compile(&json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["id", "domain", "weight", "title", "scoring"],
        "properties": {
            "id": { "type": "string", "minLength": 1 },
            "domain": { "type": "string" },
            "weight": { "type": "integer" },
            "title": { "type": "string" },
            "scoring": {
                "type": "object",
                "required": ["levels"],
                "properties": {
                    "levels": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["score"],
                            "properties": { "description": { "type": "string" } }
                        }
                    }
                }
            }
        }
    }))
    .expect("test schema compiles")
}

pub fn control_doc(id: &str, domain: &str, weight: i64) -> JsonValue {
    json!({
        "id": id,
        "domain": domain,
        "weight": weight,
        "title": format!("Control {id}"),
        "scoring": { "levels": [
            { "score": 0, "description": "absent" },
            { "score": 1, "description": "partial" },
            { "score": 2, "description": "complete" }
        ]}
    })
}

pub fn domains(ids: &[&str]) -> NormalizedDomains {
    let list: Vec<JsonValue> = ids.iter().map(|id| json!({ "id": id })).collect();
    let mut out = Vec::new();
    let normalized = normalize_domains(
        &JsonValue::Array(list),
        &SourcePath::new("domains.yml"),
        &mut out,
    );
    assert!(out.is_empty(), "{out:?}");
    normalized
}

/// Sources for the given `(id, domain, weight)` controls with `identity` and `network`
/// domains and default scoring.
pub fn sources(controls: &[(&str, &str, i64)]) -> RegistrySources {
    RegistrySources {
        meta: json!({ "name": "test-controls", "version": "1" }),
        domains: SourceDocument::new(
            "controls/domains.yml",
            json!({ "domains": [
                { "id": "identity", "name": "Identity" },
                { "id": "network", "name": "Network" }
            ]}),
        ),
        scoring: SourceDocument::new("controls/scoring.yml", json!({})),
        controls: controls
            .iter()
            .map(|(id, domain, weight)| {
                SourceDocument::new(
                    format!("controls/{id}.yml"),
                    control_doc(id, domain, *weight),
                )
            })
            .collect(),
    }
}

pub fn registry(controls: &[(&str, &str, i64)]) -> Registry {
    compile(&sources(controls), &control_schema())
        .expect("fixture compiles")
        .into_registry(datetime!(2024-01-01 00:00:00 UTC), "controlreg test")
}

pub fn findings_doc(registry: &Registry, findings: Vec<JsonValue>) -> FindingsDocument {
    FindingsDocument {
        registry_hash: registry.registry_hash().to_string(),
        assessed_at: Some(datetime!(2024-02-01 09:30:00 UTC)),
        scope: BTreeMap::from([("system".to_string(), json!("payments"))]),
        findings,
    }
}

pub fn finding(control_id: &str, score: i64) -> JsonValue {
    json!({ "control_id": control_id, "score": score })
}
