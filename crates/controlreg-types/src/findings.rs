use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// A findings document as submitted (`findings.json`).
///
/// Entries are kept as raw JSON so the findings validator can report every malformed entry
/// instead of stopping at the first one serde rejects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FindingsDocument {
    pub registry_hash: String,

    #[schemars(with = "Option<String>")]
    #[serde(default, with = "crate::timefmt::utc_seconds::option")]
    pub assessed_at: Option<OffsetDateTime>,

    #[serde(default)]
    pub scope: BTreeMap<String, JsonValue>,

    #[serde(default)]
    pub findings: Vec<JsonValue>,
}

/// A validated finding for one control.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub control_id: String,
    pub score: i64,
    #[serde(default)]
    pub finding: String,
    #[serde(default)]
    pub evidence_refs: Vec<String>,
}
