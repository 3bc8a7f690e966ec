//! Conventional project layout.

pub const CONFIG_FILE_NAME: &str = "controlreg.toml";

pub const CONTROLS_DIR: &str = "controls";
pub const SCHEMA_PATH: &str = "schemas/control.schema.json";
pub const OUT_DIR: &str = "dist";
pub const REGISTRY_NAME: &str = "controls.json";
pub const CHECKSUM_NAME: &str = "controls.sha256";
pub const REPORT_NAME: &str = "report.json";

pub const META_FILE: &str = "_meta.yml";
pub const DOMAINS_FILE: &str = "domains.yml";
pub const SCORING_FILE: &str = "scoring.yml";

pub const INCLUDE: &[&str] = &["**/*.yml", "**/*.yaml", "**/*.json"];

pub fn compiler_identity() -> String {
    format!("controlreg {}", env!("CARGO_PKG_VERSION"))
}
