//! Registry-wide rules that run once every control document passed the schema.
//!
//! Rules run per document in a fixed order, so the collected list is grouped by document.

use crate::normalize::{NormalizedDomains, json_type_name};
use crate::registry::SourceDocument;
use controlreg_types::{ScoringConfig, Violation, ViolationKind, ids};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};

pub fn run_all(
    docs: &[SourceDocument],
    domains: &NormalizedDomains,
    scoring: &ScoringConfig,
    out: &mut Vec<Violation>,
) {
    let mut first_seen: BTreeMap<&str, &str> = BTreeMap::new();

    for doc in docs {
        let source = doc.source.as_str();
        let control = &doc.value;

        unique_id(control, source, &mut first_seen, out);
        domain_exists(control, source, domains, out);
        let scores = level_scores(control, source, scoring, out);
        required_levels(&scores, source, scoring, out);
        no_duplicate_levels(&scores, source, out);
        weight_in_bounds(control, source, scoring, out);
    }
}

fn unique_id<'a>(
    control: &'a JsonValue,
    source: &'a str,
    first_seen: &mut BTreeMap<&'a str, &'a str>,
    out: &mut Vec<Violation>,
) {
    let Some(id) = control.get("id").and_then(JsonValue::as_str) else {
        return;
    };
    if let Some(first) = first_seen.get(id) {
        out.push(
            Violation::new(
                ViolationKind::CrossReference,
                ids::CODE_DUPLICATE_CONTROL_ID,
                source,
                format!("duplicate control id '{id}' (first defined in {first})"),
            )
            .at("id"),
        );
    } else {
        first_seen.insert(id, source);
    }
}

fn domain_exists(
    control: &JsonValue,
    source: &str,
    domains: &NormalizedDomains,
    out: &mut Vec<Violation>,
) {
    let Some(domain) = control.get("domain").and_then(JsonValue::as_str) else {
        return;
    };
    if !domains.contains(domain) {
        out.push(
            Violation::new(
                ViolationKind::CrossReference,
                ids::CODE_UNKNOWN_DOMAIN,
                source,
                format!("domain '{domain}' is not declared in the domain config"),
            )
            .at("domain"),
        );
    }
}

/// Integer level scores in level order. Non-integer and out-of-scale scores are reported here
/// and only integers are returned for the completeness rules.
fn level_scores(
    control: &JsonValue,
    source: &str,
    scoring: &ScoringConfig,
    out: &mut Vec<Violation>,
) -> Vec<i64> {
    let levels = control
        .pointer("/scoring/levels")
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut scores = Vec::with_capacity(levels.len());
    for (idx, level) in levels.iter().enumerate() {
        let path = format!("scoring.levels.{idx}.score");
        let raw = level.get("score").unwrap_or(&JsonValue::Null);
        let Some(score) = raw.as_i64() else {
            out.push(
                Violation::new(
                    ViolationKind::Range,
                    ids::CODE_SCORE_NOT_INTEGER,
                    source,
                    format!("level score must be an integer (got {})", json_type_name(raw)),
                )
                .at(path),
            );
            continue;
        };
        if !scoring.scale.contains(score) {
            out.push(
                Violation::new(
                    ViolationKind::Range,
                    ids::CODE_SCORE_OUT_OF_SCALE,
                    source,
                    format!(
                        "score {score} outside scale {}-{}",
                        scoring.scale.min, scoring.scale.max
                    ),
                )
                .at(path),
            );
        }
        scores.push(score);
    }
    scores
}

fn required_levels(
    scores: &[i64],
    source: &str,
    scoring: &ScoringConfig,
    out: &mut Vec<Violation>,
) {
    let found: BTreeSet<i64> = scores.iter().copied().collect();
    let missing: Vec<i64> = scoring.required_scores().difference(&found).copied().collect();
    if missing.is_empty() {
        return;
    }
    let found: Vec<i64> = found.into_iter().collect();
    out.push(
        Violation::new(
            ViolationKind::Completeness,
            ids::CODE_MISSING_REQUIRED_LEVELS,
            source,
            format!("scoring.levels missing required scores {missing:?} (found {found:?})"),
        )
        .at("scoring.levels"),
    );
}

fn no_duplicate_levels(scores: &[i64], source: &str, out: &mut Vec<Violation>) {
    let mut seen = BTreeSet::new();
    let duplicates: BTreeSet<i64> = scores.iter().copied().filter(|s| !seen.insert(*s)).collect();
    if duplicates.is_empty() {
        return;
    }
    let duplicates: Vec<i64> = duplicates.into_iter().collect();
    out.push(
        Violation::new(
            ViolationKind::Completeness,
            ids::CODE_DUPLICATE_LEVEL_SCORE,
            source,
            format!("scoring.levels contain duplicate scores {duplicates:?}"),
        )
        .at("scoring.levels"),
    );
}

fn weight_in_bounds(
    control: &JsonValue,
    source: &str,
    scoring: &ScoringConfig,
    out: &mut Vec<Violation>,
) {
    let raw = control.get("weight").unwrap_or(&JsonValue::Null);
    let bounds = &scoring.weight;
    let message = match raw.as_i64() {
        Some(weight) if bounds.contains(weight) => return,
        Some(weight) => format!(
            "weight {weight} outside configured bounds {}-{}",
            bounds.min, bounds.max
        ),
        None => format!("weight must be an integer (got {})", json_type_name(raw)),
    };
    out.push(
        Violation::new(
            ViolationKind::Range,
            ids::CODE_WEIGHT_OUT_OF_BOUNDS,
            source,
            message,
        )
        .at("weight"),
    );
}
