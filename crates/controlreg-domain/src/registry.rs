//! Registry assembly: validate every source document, then hash and assemble.

use crate::canonical;
use crate::error::CompileError;
use crate::normalize::normalize_domains;
use crate::rules;
use crate::schema::ControlSchema;
use controlreg_types::{
    BuildInfo, Control, Counts, Registry, RegistryContent, ScoringConfig, SourcePath, Violation,
    ViolationKind, ids,
};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

/// A parsed document plus the label it is reported under.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceDocument {
    pub source: SourcePath,
    pub value: JsonValue,
}

impl SourceDocument {
    pub fn new(source: impl AsRef<str>, value: JsonValue) -> Self {
        Self {
            source: SourcePath::new(source),
            value,
        }
    }
}

/// Everything one compilation reads, already loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct RegistrySources {
    pub meta: JsonValue,
    pub domains: SourceDocument,
    pub scoring: SourceDocument,
    /// Control documents in discovery order.
    pub controls: Vec<SourceDocument>,
}

/// Validated, hashed registry content that has not been stamped with build metadata yet.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledRegistry {
    pub content: RegistryContent,
    pub registry_hash: String,
}

impl CompiledRegistry {
    pub fn into_registry(
        self,
        compiled_at: OffsetDateTime,
        compiler: impl Into<String>,
    ) -> Registry {
        let build = BuildInfo {
            compiled_at: controlreg_types::timefmt::truncate(compiled_at),
            registry_hash: self.registry_hash,
            compiler: compiler.into(),
        };
        Registry::from_parts(self.content, build)
    }
}

/// Validate and assemble a registry.
///
/// Stages run in order and each stage reports everything it finds:
/// 1. domain normalization, scoring config, and per-document schema checks;
/// 2. registry-wide rules (only when stage 1 is clean);
/// 3. typed decoding of the controls.
///
/// Any violation means no registry is produced.
pub fn compile(
    sources: &RegistrySources,
    schema: &ControlSchema,
) -> Result<CompiledRegistry, CompileError> {
    let mut violations: Vec<Violation> = Vec::new();

    let domains = normalize_domains(
        &sources.domains.value,
        &sources.domains.source,
        &mut violations,
    );
    let scoring = parse_scoring(&sources.scoring, &mut violations);
    violations.extend(schema.check_all(&sources.controls));
    if !violations.is_empty() {
        return Err(CompileError::Invalid(violations));
    }

    rules::run_all(&sources.controls, &domains, &scoring, &mut violations);
    if !violations.is_empty() {
        return Err(CompileError::Invalid(violations));
    }

    let mut controls: Vec<Control> = Vec::with_capacity(sources.controls.len());
    for doc in &sources.controls {
        match serde_json::from_value::<Control>(doc.value.clone()) {
            Ok(control) => controls.push(control),
            Err(e) => violations.push(
                Violation::new(
                    ViolationKind::StructuralError,
                    ids::CODE_CONTROL_MALFORMED,
                    doc.source.as_str(),
                    format!("control cannot be decoded: {e}"),
                )
                .at("(root)"),
            ),
        }
    }
    if !violations.is_empty() {
        return Err(CompileError::Invalid(violations));
    }

    controls.sort_by(|a, b| a.id.cmp(&b.id));

    let content = RegistryContent {
        meta: sources.meta.clone(),
        scoring,
        counts: Counts {
            controls: controls.len() as u32,
            domains: domains.domains.len() as u32,
        },
        domains: domains.domains,
        controls,
    };
    let registry_hash = canonical::content_hash(&content)?;

    Ok(CompiledRegistry {
        content,
        registry_hash,
    })
}

/// Parse the scoring config, filling defaults for absent keys.
pub fn parse_scoring(doc: &SourceDocument, out: &mut Vec<Violation>) -> ScoringConfig {
    let source = doc.source.as_str();
    if !doc.value.is_object() {
        out.push(
            Violation::new(
                ViolationKind::StructuralError,
                ids::CODE_SCORING_MALFORMED,
                source,
                "scoring config must be a mapping",
            )
            .at("(root)"),
        );
        return ScoringConfig::default();
    }

    let scoring: ScoringConfig = match serde_json::from_value(doc.value.clone()) {
        Ok(s) => s,
        Err(e) => {
            out.push(
                Violation::new(
                    ViolationKind::StructuralError,
                    ids::CODE_SCORING_MALFORMED,
                    source,
                    format!("scoring config is malformed: {e}"),
                )
                .at("(root)"),
            );
            return ScoringConfig::default();
        }
    };

    let inverted = [
        ("scale", scoring.scale.min, scoring.scale.max),
        ("weight", scoring.weight.min, scoring.weight.max),
    ];
    for (field, min, max) in inverted {
        if min > max {
            out.push(
                Violation::new(
                    ViolationKind::StructuralError,
                    ids::CODE_SCORING_BOUNDS_INVERTED,
                    source,
                    format!("{field}.min ({min}) is greater than {field}.max ({max})"),
                )
                .at(field),
            );
        }
    }
    if !crate::scoring::bounds_fit(&scoring.scale, &scoring.weight) {
        out.push(
            Violation::new(
                ViolationKind::StructuralError,
                ids::CODE_SCORING_BOUNDS_OVERFLOW,
                source,
                format!(
                    "scale {}..{} with weight {}..{} overflows risk scores",
                    scoring.scale.min, scoring.scale.max, scoring.weight.min, scoring.weight.max
                ),
            )
            .at("(root)"),
        );
    }

    scoring
}

/// Recompute the content hash of an already compiled registry.
pub fn recompute_hash(registry: &Registry) -> Result<String, serde_json::Error> {
    canonical::content_hash(&registry.content())
}

/// `"<hex-hash>  <artifact-filename>\n"`, the `sha256sum` layout.
pub fn checksum_line(registry_hash: &str, file_name: &str) -> String {
    format!("{registry_hash}  {file_name}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{control_doc, control_schema, sources};
    use serde_json::json;
    use time::macros::datetime;

    fn compile_ok(sources: &RegistrySources) -> CompiledRegistry {
        compile(sources, &control_schema()).expect("compile")
    }

    #[test]
    fn controls_are_sorted_and_counted() {
        let src = sources(&[("NET-002", "network", 2), ("IAM-001", "identity", 3)]);
        let compiled = compile_ok(&src);
        let ids: Vec<&str> = compiled.content.controls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["IAM-001", "NET-002"]);
        assert_eq!(compiled.content.counts, Counts { controls: 2, domains: 2 });
        assert_eq!(compiled.registry_hash.len(), 64);
    }

    #[test]
    fn hash_ignores_build_metadata() {
        let src = sources(&[("IAM-001", "identity", 3)]);
        let first = compile_ok(&src).into_registry(datetime!(2024-01-01 00:00:00 UTC), "a");
        let second = compile_ok(&src).into_registry(datetime!(2025-06-30 08:15:00 UTC), "b");
        assert_eq!(first.registry_hash(), second.registry_hash());
        assert_eq!(recompute_hash(&first).unwrap(), first.registry_hash());
    }

    #[test]
    fn hash_follows_weight_changes() {
        let original = compile_ok(&sources(&[("IAM-001", "identity", 3)])).registry_hash;
        let changed = compile_ok(&sources(&[("IAM-001", "identity", 4)])).registry_hash;
        let reverted = compile_ok(&sources(&[("IAM-001", "identity", 3)])).registry_hash;
        assert_ne!(original, changed);
        assert_eq!(original, reverted);
    }

    #[test]
    fn reordered_domain_list_changes_hash() {
        let src = sources(&[("IAM-001", "identity", 3)]);
        let mut reordered = src.clone();
        reordered.domains.value = json!({ "domains": [
            { "id": "network", "name": "Network" },
            { "id": "identity", "name": "Identity" }
        ]});
        assert_ne!(compile_ok(&src).registry_hash, compile_ok(&reordered).registry_hash);
    }

    #[test]
    fn discovery_order_does_not_change_hash() {
        let a = sources(&[("A", "identity", 1), ("B", "network", 2)]);
        let b = sources(&[("B", "network", 2), ("A", "identity", 1)]);
        assert_eq!(compile_ok(&a).registry_hash, compile_ok(&b).registry_hash);
    }

    #[test]
    fn schema_failures_stop_before_cross_rules() {
        let mut src = sources(&[("A", "identity", 1), ("A", "nowhere", 9)]);
        src.controls[0].value = json!({ "id": "A" });
        let err = compile(&src, &control_schema()).unwrap_err();
        assert!(
            err.violations()
                .iter()
                .all(|v| v.kind == ViolationKind::SchemaViolation)
        );
    }

    #[test]
    fn every_cross_rule_violation_is_reported_together() {
        let src = sources(&[("A", "identity", 1), ("A", "nowhere", 9)]);
        let err = compile(&src, &control_schema()).unwrap_err();
        let codes: Vec<&str> = err.violations().iter().map(|v| v.code.as_str()).collect();
        assert_eq!(
            codes,
            vec![
                ids::CODE_DUPLICATE_CONTROL_ID,
                ids::CODE_UNKNOWN_DOMAIN,
                ids::CODE_WEIGHT_OUT_OF_BOUNDS,
            ]
        );
        assert!(err.to_string().contains("3 violation(s)"));
    }

    #[test]
    fn structural_errors_in_domains_and_scoring_are_collected() {
        let mut src = sources(&[("A", "identity", 1)]);
        src.domains.value = json!("identity");
        src.scoring.value = json!({ "scale": { "min": 3, "max": 1 } });
        let err = compile(&src, &control_schema()).unwrap_err();
        let codes: Vec<&str> = err.violations().iter().map(|v| v.code.as_str()).collect();
        assert_eq!(
            codes,
            vec![ids::CODE_DOMAINS_UNSUPPORTED, ids::CODE_SCORING_BOUNDS_INVERTED]
        );
    }

    #[test]
    fn scoring_defaults_apply_to_empty_config() {
        let mut out = Vec::new();
        let cfg = parse_scoring(&SourceDocument::new("scoring.yml", json!({})), &mut out);
        assert!(out.is_empty());
        assert_eq!(cfg, ScoringConfig::default());
    }

    #[test]
    fn scoring_bounds_that_overflow_are_rejected() {
        let doc = SourceDocument::new(
            "scoring.yml",
            json!({ "scale": { "max": 4_000_000_000_000_000_000_i64 }, "levels_required": [0] }),
        );
        let mut out = Vec::new();
        parse_scoring(&doc, &mut out);
        let codes: Vec<&str> = out.iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, vec![ids::CODE_SCORING_BOUNDS_OVERFLOW]);
    }

    #[test]
    fn unknown_scale_and_weight_keys_are_hashed() {
        let plain = sources(&[("IAM-001", "identity", 3)]);
        let mut noted = plain.clone();
        noted.scoring.value = json!({
            "scale": { "min": 0, "max": 2, "note": "maturity" },
            "weight": { "min": 1, "max": 5, "unit": "relative" }
        });
        let compiled = compile_ok(&noted);
        assert_eq!(compiled.content.scoring.scale.extra["note"], "maturity");
        assert_eq!(compiled.content.scoring.weight.extra["unit"], "relative");
        assert_ne!(compile_ok(&plain).registry_hash, compiled.registry_hash);
    }

    #[test]
    fn extra_control_fields_survive_compilation() {
        let mut src = sources(&[("IAM-001", "identity", 3)]);
        src.controls[0].value["references"] = json!(["NIST AC-2"]);
        let compiled = compile_ok(&src);
        assert_eq!(compiled.content.controls[0].extra["references"], json!(["NIST AC-2"]));
    }

    #[test]
    fn into_registry_truncates_timestamp() {
        let registry = compile_ok(&sources(&[("A", "identity", 1)]))
            .into_registry(datetime!(2024-03-04 05:06:07.89 +01:00), "controlreg 0.1.0");
        let value = serde_json::to_value(&registry).unwrap();
        assert_eq!(value["build"]["compiled_at"], "2024-03-04T04:06:07Z");
        assert_eq!(value["build"]["compiler"], "controlreg 0.1.0");
    }

    #[test]
    fn checksum_line_uses_two_spaces() {
        assert_eq!(checksum_line("abc", "controls.json"), "abc  controls.json\n");
    }

    #[test]
    fn control_doc_helper_is_schema_valid() {
        let schema = control_schema();
        let doc = control_doc("Z", "identity", 1);
        assert!(schema.check(&SourcePath::new("z.yml"), &doc).is_empty());
    }
}
