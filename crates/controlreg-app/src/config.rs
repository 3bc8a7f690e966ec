use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use controlreg_settings::{
    CONFIG_FILE_NAME, ControlregConfigV1, Overrides, ResolvedConfig, parse_config_toml,
    resolve_config,
};

/// Read and resolve the project config.
///
/// An explicit `config_path` must exist. Without one, `<root>/controlreg.toml` is used when
/// present and the built-in defaults otherwise.
pub fn load_config(
    root: &Utf8Path,
    config_path: Option<&Utf8Path>,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let (path, required): (Utf8PathBuf, bool) = match config_path {
        Some(p) => (p.to_path_buf(), true),
        None => (root.join(CONFIG_FILE_NAME), false),
    };

    let cfg = if path.exists() {
        let text =
            std::fs::read_to_string(&path).with_context(|| format!("read config {}", path))?;
        tracing::debug!(config = %path, "loaded config file");
        parse_config_toml(&text).with_context(|| format!("parse config {}", path))?
    } else if required {
        anyhow::bail!("config file not found: {}", path);
    } else {
        ControlregConfigV1::default()
    };

    resolve_config(cfg, overrides).context("resolve config")
}
