//! Domain list normalization.
//!
//! Three legacy encodings are accepted:
//! - `{ "domains": [ {...}, ... ] }`
//! - `[ {...}, ... ]`
//! - `{ "<id>": {...}, ... }` (keyed by domain id)
//!
//! All of them resolve to one ordered `Vec<Domain>` plus an id lookup. Structural problems are
//! pushed to the caller's collector; normalization never stops at the first one.

use controlreg_types::{Domain, SourcePath, Violation, ViolationKind, ids};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// Recognized shape of a domain config document.
#[derive(Clone, Debug, PartialEq)]
pub enum DomainSource<'a> {
    Wrapped(&'a [JsonValue]),
    List(&'a [JsonValue]),
    Keyed(&'a Map<String, JsonValue>),
}

impl<'a> DomainSource<'a> {
    pub fn classify(value: &'a JsonValue) -> Result<Self, (&'static str, String)> {
        match value {
            JsonValue::Object(map) if map.contains_key("domains") => match &map["domains"] {
                JsonValue::Array(items) => Ok(DomainSource::Wrapped(items)),
                _ => Err((ids::CODE_DOMAINS_NOT_A_LIST, "'domains' must be a list".to_string())),
            },
            JsonValue::Array(items) => Ok(DomainSource::List(items)),
            JsonValue::Object(map) => Ok(DomainSource::Keyed(map)),
            other => Err((
                ids::CODE_DOMAINS_UNSUPPORTED,
                format!(
                    "unsupported structure for domains (got {})",
                    json_type_name(other)
                ),
            )),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedDomains {
    pub domains: Vec<Domain>,
    pub by_id: BTreeMap<String, Domain>,
}

impl NormalizedDomains {
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }
}

pub fn normalize_domains(
    value: &JsonValue,
    source: &SourcePath,
    out: &mut Vec<Violation>,
) -> NormalizedDomains {
    let structural = |code: &str, message: String| {
        Violation::new(ViolationKind::StructuralError, code, source.as_str(), message)
    };

    // (path label, entry) pairs in canonical order.
    let entries: Vec<(String, JsonValue)> = match DomainSource::classify(value) {
        Ok(DomainSource::Wrapped(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, v)| (format!("domains.{idx}"), v.clone()))
            .collect(),
        Ok(DomainSource::List(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, v)| (idx.to_string(), v.clone()))
            .collect(),
        Ok(DomainSource::Keyed(map)) => {
            let mut entries = Vec::new();
            for (key, info) in map {
                let Some(obj) = info.as_object() else {
                    out.push(
                        structural(
                            ids::CODE_DOMAIN_NOT_AN_OBJECT,
                            format!("domain '{key}' must be an object"),
                        )
                        .at(key.clone()),
                    );
                    continue;
                };
                let mut entry = obj.clone();
                match entry.get("id") {
                    Some(JsonValue::String(id)) if id == key => {}
                    Some(other) => out.push(
                        structural(
                            ids::CODE_DOMAIN_KEY_MISMATCH,
                            format!(
                                "domain key '{key}' does not match entry id {}",
                                display_scalar(other)
                            ),
                        )
                        .at(key.clone()),
                    ),
                    None => {
                        entry.insert("id".to_string(), JsonValue::String(key.clone()));
                    }
                }
                entries.push((key.clone(), JsonValue::Object(entry)));
            }
            entries
        }
        Err((code, message)) => {
            out.push(structural(code, message).at("(root)"));
            Vec::new()
        }
    };

    let mut normalized = NormalizedDomains::default();
    for (path, entry) in entries {
        if !entry.is_object() {
            out.push(
                structural(
                    ids::CODE_DOMAIN_NOT_AN_OBJECT,
                    "each domain must be an object".to_string(),
                )
                .at(path),
            );
            continue;
        }
        let id = match entry.get("id") {
            Some(JsonValue::String(id)) if !id.is_empty() => id.clone(),
            _ => {
                out.push(
                    structural(
                        ids::CODE_DOMAIN_MISSING_ID,
                        "each domain must have a non-empty string 'id'".to_string(),
                    )
                    .at(path),
                );
                continue;
            }
        };
        if normalized.by_id.contains_key(&id) {
            out.push(
                structural(
                    ids::CODE_DOMAIN_DUPLICATE_ID,
                    format!("duplicate domain id '{id}'"),
                )
                .at(path),
            );
            continue;
        }
        match serde_json::from_value::<Domain>(entry) {
            Ok(domain) => {
                normalized.by_id.insert(id, domain.clone());
                normalized.domains.push(domain);
            }
            Err(e) => out.push(
                structural(
                    ids::CODE_DOMAIN_MALFORMED,
                    format!("domain '{id}' is malformed: {e}"),
                )
                .at(path),
            ),
        }
    }

    normalized
}

pub(crate) fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => "integer",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

pub(crate) fn display_scalar(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}
