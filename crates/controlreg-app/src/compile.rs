//! The `compile` use case: control documents in, hashed registry and checksum out.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use controlreg_domain::{ControlSchema, checksum_line};
use controlreg_settings::ResolvedConfig;
use controlreg_types::Registry;
use time::OffsetDateTime;

/// Input for the compile use case.
#[derive(Clone, Debug)]
pub struct CompileInput<'a> {
    /// Project root; relative config paths resolve against it.
    pub root: &'a Utf8Path,
    pub config: &'a ResolvedConfig,
    /// Compilation timestamp; truncated to whole seconds in the artifact.
    pub compiled_at: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub struct CompileOutput {
    pub registry: Registry,
    pub registry_path: Utf8PathBuf,
    pub checksum_path: Utf8PathBuf,
}

/// Compile the control set and write the registry plus its checksum line.
///
/// Nothing is written unless every document passes validation. On a validation failure the
/// returned error wraps [`controlreg_domain::CompileError`].
pub fn run_compile(input: CompileInput<'_>) -> anyhow::Result<CompileOutput> {
    let cfg = input.config;

    let schema_value = controlreg_repo::read_schema(input.root, cfg)?;
    let schema = ControlSchema::compile(&schema_value)
        .with_context(|| format!("compile control schema {}", cfg.schema))?;

    let sources = controlreg_repo::load_sources(input.root, cfg)?;
    tracing::info!(
        controls = sources.controls.len(),
        controls_dir = %cfg.controls_dir,
        "loaded control documents"
    );

    let compiled = controlreg_domain::compile(&sources, &schema)?;
    let registry = compiled.into_registry(input.compiled_at, &cfg.compiler);

    let registry_path = input.root.join(cfg.registry_path());
    let checksum_path = input.root.join(cfg.checksum_path());
    controlreg_repo::write_json_pretty(&registry_path, &registry)?;
    controlreg_repo::write_atomic(
        &checksum_path,
        checksum_line(registry.registry_hash(), &cfg.registry_name).as_bytes(),
    )?;

    tracing::info!(
        registry_hash = registry.registry_hash(),
        controls = registry.counts.controls,
        domains = registry.counts.domains,
        path = %registry_path,
        "wrote registry"
    );

    Ok(CompileOutput {
        registry,
        registry_path,
        checksum_path,
    })
}
