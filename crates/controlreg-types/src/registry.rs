use crate::control::{Control, Domain, ScoringConfig};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

/// Everything in a registry that the content hash covers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RegistryContent {
    pub meta: JsonValue,
    pub scoring: ScoringConfig,
    pub domains: Vec<Domain>,
    /// Sorted ascending by id.
    pub controls: Vec<Control>,
    pub counts: Counts,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Counts {
    pub controls: u32,
    pub domains: u32,
}

/// Build metadata attached after hashing; never part of the hashed content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BuildInfo {
    #[schemars(with = "String")]
    #[serde(with = "crate::timefmt::utc_seconds")]
    pub compiled_at: OffsetDateTime,
    pub registry_hash: String,
    pub compiler: String,
}

/// The compiled registry artifact (`controls.json`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Registry {
    pub meta: JsonValue,
    pub scoring: ScoringConfig,
    pub domains: Vec<Domain>,
    pub controls: Vec<Control>,
    pub counts: Counts,
    pub build: BuildInfo,
}

impl Registry {
    pub fn from_parts(content: RegistryContent, build: BuildInfo) -> Self {
        Self {
            meta: content.meta,
            scoring: content.scoring,
            domains: content.domains,
            controls: content.controls,
            counts: content.counts,
            build,
        }
    }

    /// Hashable content of this registry (a copy without `build`).
    pub fn content(&self) -> RegistryContent {
        RegistryContent {
            meta: self.meta.clone(),
            scoring: self.scoring.clone(),
            domains: self.domains.clone(),
            controls: self.controls.clone(),
            counts: self.counts,
        }
    }

    pub fn registry_hash(&self) -> &str {
        &self.build.registry_hash
    }

    pub fn control(&self, id: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.id == id)
    }
}
