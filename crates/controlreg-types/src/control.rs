use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};

/// One compiled compliance control.
///
/// Only the fields the compiler and the scoring engine reason about are modeled. Everything
/// else a control document carries (rationale, references, tags, ...) has already passed the
/// external schema and is kept verbatim in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Control {
    pub id: String,
    pub domain: String,
    pub weight: i64,
    pub title: String,
    pub scoring: ControlScoring,

    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ControlScoring {
    pub levels: Vec<ScoringLevel>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringLevel {
    pub score: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

/// A named grouping of controls, normalized from one of the legacy source shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Domain {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

/// Scoring rules every control is checked against.
///
/// Absent keys fall back to the conventional 0..=2 maturity scale with weights 1..=5.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringConfig {
    #[serde(default)]
    pub scale: ScoreScale,

    #[serde(default = "default_levels_required")]
    pub levels_required: Vec<i64>,

    #[serde(default)]
    pub weight: WeightBounds,

    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            scale: ScoreScale::default(),
            levels_required: default_levels_required(),
            weight: WeightBounds::default(),
            extra: BTreeMap::new(),
        }
    }
}

impl ScoringConfig {
    pub fn required_scores(&self) -> BTreeSet<i64> {
        self.levels_required.iter().copied().collect()
    }
}

fn default_levels_required() -> Vec<i64> {
    vec![0, 1, 2]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreScale {
    #[serde(default)]
    pub min: i64,
    #[serde(default = "default_scale_max")]
    pub max: i64,

    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

impl Default for ScoreScale {
    fn default() -> Self {
        Self {
            min: 0,
            max: default_scale_max(),
            extra: BTreeMap::new(),
        }
    }
}

impl ScoreScale {
    pub fn contains(&self, score: i64) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

fn default_scale_max() -> i64 {
    2
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeightBounds {
    #[serde(default = "default_weight_min")]
    pub min: i64,
    #[serde(default = "default_weight_max")]
    pub max: i64,

    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self {
            min: default_weight_min(),
            max: default_weight_max(),
            extra: BTreeMap::new(),
        }
    }
}

impl WeightBounds {
    pub fn contains(&self, weight: i64) -> bool {
        (self.min..=self.max).contains(&weight)
    }
}

fn default_weight_min() -> i64 {
    1
}

fn default_weight_max() -> i64 {
    5
}
