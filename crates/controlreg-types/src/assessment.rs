//! Assessment records kept by an external persistence layer.
//!
//! An assessment is seeded with one item per registry control and filled in item by item.
//! The report engine accepts it as an alternative to a findings document.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    #[default]
    NotAssessed,
    Assessed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentItem {
    pub control_id: String,
    pub domain: String,
    pub weight: i64,
    #[serde(default)]
    pub status: AssessmentStatus,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub finding_text: String,
    #[serde(default)]
    pub evidence_refs: Vec<String>,
    #[serde(default)]
    pub assessor_notes: String,
    /// Snapshot of the registry control the item was seeded from.
    #[serde(default)]
    pub control: JsonValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Assessment {
    pub id: String,
    pub name: String,
    #[schemars(with = "String")]
    #[serde(with = "crate::timefmt::utc_seconds")]
    pub created_at: OffsetDateTime,
    #[schemars(with = "Option<String>")]
    #[serde(default, with = "crate::timefmt::utc_seconds::option")]
    pub assessed_at: Option<OffsetDateTime>,
    pub registry_hash: String,
    #[serde(default)]
    pub scope: BTreeMap<String, JsonValue>,
    #[serde(default)]
    pub items: Vec<AssessmentItem>,
}

/// Partial update for one assessment item.
///
/// Only fields present in the patch are applied. `score` distinguishes "absent" (`None`)
/// from an explicit `null` (`Some(None)`), which clears the score.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AssessmentStatus>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub score: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finding_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_refs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessor_notes: Option<String>,
}

impl AssessmentItemPatch {
    pub fn apply(&self, item: &mut AssessmentItem) {
        if let Some(status) = self.status {
            item.status = status;
        }
        if let Some(score) = self.score {
            item.score = score;
        }
        if let Some(text) = &self.finding_text {
            item.finding_text = text.clone();
        }
        if let Some(refs) = &self.evidence_refs {
            item.evidence_refs = refs.clone();
        }
        if let Some(notes) = &self.assessor_notes {
            item.assessor_notes = notes.clone();
        }
    }
}

// A key that is present always lands here, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item() -> AssessmentItem {
        AssessmentItem {
            control_id: "IAM-001".to_string(),
            domain: "identity".to_string(),
            weight: 3,
            status: AssessmentStatus::Assessed,
            score: Some(1),
            finding_text: "partial".to_string(),
            evidence_refs: vec!["ev-1".to_string()],
            assessor_notes: String::new(),
            control: json!({}),
        }
    }

    #[test]
    fn absent_fields_are_left_alone() {
        let patch: AssessmentItemPatch =
            serde_json::from_value(json!({ "assessor_notes": "checked" })).unwrap();
        let mut it = item();
        patch.apply(&mut it);
        assert_eq!(it.score, Some(1));
        assert_eq!(it.finding_text, "partial");
        assert_eq!(it.assessor_notes, "checked");
    }

    #[test]
    fn explicit_null_clears_score() {
        let patch: AssessmentItemPatch = serde_json::from_value(json!({ "score": null })).unwrap();
        assert_eq!(patch.score, Some(None));
        let mut it = item();
        patch.apply(&mut it);
        assert_eq!(it.score, None);
        assert_eq!(it.status, AssessmentStatus::Assessed);
    }

    #[test]
    fn status_parses_snake_case() {
        let patch: AssessmentItemPatch =
            serde_json::from_value(json!({ "status": "not_assessed", "score": 2 })).unwrap();
        assert_eq!(patch.status, Some(AssessmentStatus::NotAssessed));
        assert_eq!(patch.score, Some(Some(2)));
    }
}
