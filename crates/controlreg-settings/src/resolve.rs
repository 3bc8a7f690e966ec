use crate::defaults;
use crate::model::ControlregConfigV1;
use anyhow::Context;
use camino::Utf8PathBuf;
use globset::Glob;

/// Values supplied on the command line; each one wins over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub controls_dir: Option<Utf8PathBuf>,
    pub schema: Option<Utf8PathBuf>,
    pub out_dir: Option<Utf8PathBuf>,
    pub compiler: Option<String>,
}

/// Fully resolved settings. Paths are relative to the project root unless given absolute.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConfig {
    pub controls_dir: Utf8PathBuf,
    pub schema: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,
    pub registry_name: String,
    pub checksum_name: String,
    pub report_name: String,
    pub compiler: String,
    pub files: ResolvedFiles,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedFiles {
    /// Relative to `controls_dir`.
    pub meta: String,
    pub domains: String,
    pub scoring: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl ResolvedConfig {
    pub fn registry_path(&self) -> Utf8PathBuf {
        self.out_dir.join(&self.registry_name)
    }

    pub fn checksum_path(&self) -> Utf8PathBuf {
        self.out_dir.join(&self.checksum_name)
    }

    pub fn report_path(&self) -> Utf8PathBuf {
        self.out_dir.join(&self.report_name)
    }

    pub fn meta_path(&self) -> Utf8PathBuf {
        self.controls_dir.join(&self.files.meta)
    }

    pub fn domains_path(&self) -> Utf8PathBuf {
        self.controls_dir.join(&self.files.domains)
    }

    pub fn scoring_path(&self) -> Utf8PathBuf {
        self.controls_dir.join(&self.files.scoring)
    }
}

pub fn resolve_config(
    cfg: ControlregConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let controls_dir = overrides
        .controls_dir
        .or(cfg.controls_dir.map(Utf8PathBuf::from))
        .unwrap_or_else(|| Utf8PathBuf::from(defaults::CONTROLS_DIR));
    let schema = overrides
        .schema
        .or(cfg.schema.map(Utf8PathBuf::from))
        .unwrap_or_else(|| Utf8PathBuf::from(defaults::SCHEMA_PATH));
    let out_dir = overrides
        .out_dir
        .or(cfg.out_dir.map(Utf8PathBuf::from))
        .unwrap_or_else(|| Utf8PathBuf::from(defaults::OUT_DIR));
    let compiler = overrides
        .compiler
        .or(cfg.compiler)
        .unwrap_or_else(defaults::compiler_identity);

    let registry_name = file_name("registry_name", cfg.registry_name, defaults::REGISTRY_NAME)?;
    let checksum_name = file_name("checksum_name", cfg.checksum_name, defaults::CHECKSUM_NAME)?;
    let report_name = file_name("report_name", cfg.report_name, defaults::REPORT_NAME)?;

    let include = if cfg.files.include.is_empty() {
        defaults::INCLUDE.iter().map(|s| s.to_string()).collect()
    } else {
        cfg.files.include
    };
    validate_globs("files.include", &include)?;
    validate_globs("files.exclude", &cfg.files.exclude)?;

    let files = ResolvedFiles {
        meta: cfg.files.meta.unwrap_or_else(|| defaults::META_FILE.to_string()),
        domains: cfg
            .files
            .domains
            .unwrap_or_else(|| defaults::DOMAINS_FILE.to_string()),
        scoring: cfg
            .files
            .scoring
            .unwrap_or_else(|| defaults::SCORING_FILE.to_string()),
        include,
        exclude: cfg.files.exclude,
    };

    Ok(ResolvedConfig {
        controls_dir,
        schema,
        out_dir,
        registry_name,
        checksum_name,
        report_name,
        compiler,
        files,
    })
}

fn file_name(key: &str, value: Option<String>, default: &str) -> anyhow::Result<String> {
    let name = value.unwrap_or_else(|| default.to_string());
    if name.is_empty() || name.contains('/') || name.contains('\\') {
        anyhow::bail!("{key} must be a bare file name, got '{name}'");
    }
    Ok(name)
}

fn validate_globs(key: &str, patterns: &[String]) -> anyhow::Result<()> {
    for pattern in patterns {
        Glob::new(pattern).with_context(|| format!("invalid glob in {key}: {pattern}"))?;
    }
    Ok(())
}
