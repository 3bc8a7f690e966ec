use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `controlreg.toml` schema v1.
///
/// Every key is optional; missing keys fall back to the conventional layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ControlregConfigV1 {
    /// Directory holding control documents and the meta/domains/scoring files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls_dir: Option<String>,

    /// JSON Schema every control document is validated against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Where compiled artifacts are written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_name: Option<String>,

    /// Compiler identity recorded in `build.compiler`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    #[serde(default)]
    pub files: FilesConfig,
}

/// File names inside `controls_dir` and the control discovery globs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<String>,

    /// Replaces the default include globs when non-empty.
    #[serde(default)]
    pub include: Vec<String>,

    /// Added to the built-in skips.
    #[serde(default)]
    pub exclude: Vec<String>,
}
