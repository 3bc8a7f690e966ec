//! Config parsing and resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod defaults;
mod model;
mod resolve;

pub use defaults::CONFIG_FILE_NAME;
pub use model::{ControlregConfigV1, FilesConfig};
pub use resolve::{Overrides, ResolvedConfig, ResolvedFiles};

/// Parse `controlreg.toml` into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<ControlregConfigV1> {
    let cfg: ControlregConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config (defaults, then file values, then CLI overrides).
pub fn resolve_config(
    cfg: ControlregConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
