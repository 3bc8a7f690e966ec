//! Control document validation against the externally supplied JSON Schema.

use crate::error::SchemaError;
use crate::registry::SourceDocument;
use controlreg_types::{SourcePath, Violation, ViolationKind, ids};
use jsonschema::{Draft, Validator};
use rayon::prelude::*;
use serde_json::Value as JsonValue;

/// Compiled control schema (draft 2020-12).
pub struct ControlSchema {
    validator: Validator,
}

impl std::fmt::Debug for ControlSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlSchema").finish_non_exhaustive()
    }
}

/// One JSON pointer segment. Array indices order before object keys and numerically among
/// themselves, so `levels.2` sorts before `levels.10`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    Index(u64),
    Key(String),
}

impl ControlSchema {
    pub fn compile(schema: &JsonValue) -> Result<Self, SchemaError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(schema)
            .map_err(|e| SchemaError::Invalid {
                message: e.to_string(),
            })?;
        Ok(Self { validator })
    }

    /// Every violation in one document, ordered by field path.
    pub fn check(&self, source: &SourcePath, doc: &JsonValue) -> Vec<Violation> {
        if !doc.is_object() {
            return vec![
                Violation::new(
                    ViolationKind::SchemaViolation,
                    ids::CODE_NOT_AN_OBJECT,
                    source.as_str(),
                    "control document must be a mapping",
                )
                .at("(root)"),
            ];
        }

        let mut errors: Vec<(Vec<Segment>, String)> = self
            .validator
            .iter_errors(doc)
            .map(|err| (parse_pointer(&err.instance_path().to_string()), err.to_string()))
            .collect();
        // Stable: errors at the same path keep the validator's order.
        errors.sort_by(|a, b| a.0.cmp(&b.0));

        errors
            .into_iter()
            .map(|(segments, message)| {
                Violation::new(
                    ViolationKind::SchemaViolation,
                    ids::CODE_SCHEMA_VIOLATION,
                    source.as_str(),
                    message,
                )
                .at(dotted(&segments))
            })
            .collect()
    }

    /// Checks independent documents in parallel; the result is grouped by document in input
    /// order.
    pub fn check_all(&self, docs: &[SourceDocument]) -> Vec<Violation> {
        let per_doc: Vec<Vec<Violation>> = docs
            .par_iter()
            .map(|doc| self.check(&doc.source, &doc.value))
            .collect();
        per_doc.into_iter().flatten().collect()
    }
}

fn parse_pointer(pointer: &str) -> Vec<Segment> {
    pointer
        .split('/')
        .skip(1)
        .map(|raw| {
            let seg = raw.replace("~1", "/").replace("~0", "~");
            match seg.parse::<u64>() {
                Ok(idx) => Segment::Index(idx),
                Err(_) => Segment::Key(seg),
            }
        })
        .collect()
}

fn dotted(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return "(root)".to_string();
    }
    segments
        .iter()
        .map(|s| match s {
            Segment::Index(i) => i.to_string(),
            Segment::Key(k) => k.clone(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{control_doc, control_schema};
    use serde_json::json;

    #[test]
    fn valid_control_has_no_violations() {
        let schema = control_schema();
        let doc = control_doc("IAM-001", "identity", 3);
        assert!(schema.check(&SourcePath::new("controls/iam.yml"), &doc).is_empty());
    }

    #[test]
    fn collects_every_violation_ordered_by_path() {
        let schema = control_schema();
        let doc = json!({
            "id": 7,
            "domain": "identity",
            "weight": "heavy",
            "scoring": { "levels": [
                { "score": 0, "description": "none" },
                { "score": 1, "description": 5 },
                { "score": 2, "description": "full" }
            ]}
        });
        let errors = schema.check(&SourcePath::new("controls/bad.yml"), &doc);
        let paths: Vec<&str> = errors.iter().filter_map(|e| e.path.as_deref()).collect();
        assert_eq!(
            paths,
            vec!["(root)", "id", "scoring.levels.1.description", "weight"]
        );
        assert!(errors.iter().all(|e| e.kind == ViolationKind::SchemaViolation));
        assert!(errors[0].message.contains("title"));
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        let schema = control_schema();
        let errors = schema.check(&SourcePath::new("controls/list.yml"), &json!([1, 2]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ids::CODE_NOT_AN_OBJECT);
    }

    #[test]
    fn check_all_keeps_document_order() {
        let schema = control_schema();
        let bad = json!({ "id": "X" });
        let docs = vec![
            SourceDocument::new("a.yml", bad.clone()),
            SourceDocument::new("b.yml", control_doc("IAM-001", "identity", 3)),
            SourceDocument::new("c.yml", bad),
        ];
        let errors = schema.check_all(&docs);
        let sources: Vec<&str> = errors.iter().map(|e| e.source.as_str()).collect();
        assert!(sources.iter().take_while(|s| **s == "a.yml").count() > 0);
        assert!(!sources.contains(&"b.yml"));
        assert_eq!(sources.last(), Some(&"c.yml"));
    }

    #[test]
    fn numeric_segments_sort_numerically() {
        let mut paths = vec![parse_pointer("/levels/10"), parse_pointer("/levels/2")];
        paths.sort();
        assert_eq!(dotted(&paths[0]), "levels.2");
    }

    #[test]
    fn invalid_schema_is_an_error() {
        let err = ControlSchema::compile(&json!({ "type": 12 })).unwrap_err();
        assert!(err.to_string().contains("not a valid JSON Schema"));
    }
}
