//! CLI entry point for controlreg.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `controlreg-app` crate.
//!
//! Exit codes: 0 success, 1 validation failure or runtime error, 2 registry hash mismatch or
//! failed verification.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand, ValueEnum};
use controlreg_app::{
    AssessmentInitInput, AssessmentSetInput, ChecksumCheck, CompileInput, ReportInput,
    ReportSource, VerifyInput, load_config, render_annotations, run_assessment_init,
    run_assessment_set, run_compile, run_markdown, run_report, run_verify,
};
use controlreg_domain::{CompileError, ReportError};
use controlreg_settings::{Overrides, ResolvedConfig};
use controlreg_types::{AssessmentItemPatch, AssessmentStatus, Violation};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tracing::debug;

const EXIT_OK: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_MISMATCH: i32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "controlreg",
    version,
    about = "Compile compliance control registries and score findings into risk reports"
)]
struct Cli {
    /// Project root; relative paths in the config resolve against it.
    #[arg(long, global = true, default_value = ".")]
    root: Utf8PathBuf,

    /// Path to the config TOML (default: <root>/controlreg.toml when present).
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Override the controls directory.
    #[arg(long, global = true)]
    controls_dir: Option<Utf8PathBuf>,

    /// Override the control JSON Schema path.
    #[arg(long, global = true)]
    schema: Option<Utf8PathBuf>,

    /// Override the output directory for generated artifacts.
    #[arg(long, global = true)]
    out_dir: Option<Utf8PathBuf>,

    /// Override the compiler identity recorded in the registry build block.
    #[arg(long, global = true)]
    compiler: Option<String>,

    /// Enable verbose logging (info level).
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate control documents and write the registry and its checksum.
    Compile {
        /// Print validation failures as GitHub Actions annotations on stdout.
        #[arg(long)]
        annotations: bool,

        /// Maximum number of annotations to emit.
        #[arg(long, default_value = "10")]
        max_annotations: usize,
    },

    /// Score findings (or an assessment) against a compiled registry.
    Report(ReportArgs),

    /// Recompute the registry hash and compare it with the recorded one.
    Verify {
        /// Registry artifact (default: configured registry path).
        #[arg(long)]
        registry: Option<Utf8PathBuf>,

        /// Checksum file (default: configured checksum path; skipped when missing).
        #[arg(long)]
        checksum: Option<Utf8PathBuf>,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report (default: configured report path).
        #[arg(long)]
        report: Option<Utf8PathBuf>,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Maintain an assessment document item by item.
    #[command(subcommand)]
    Assessment(AssessmentCommands),
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Registry artifact (default: configured registry path).
    #[arg(long)]
    registry: Option<Utf8PathBuf>,

    /// Findings document to score.
    #[arg(long, conflicts_with = "assessment", required_unless_present = "assessment")]
    findings: Option<Utf8PathBuf>,

    /// Assessment document to score.
    #[arg(long)]
    assessment: Option<Utf8PathBuf>,

    /// Where to write the JSON report (default: configured report path).
    #[arg(long)]
    out: Option<Utf8PathBuf>,

    /// Also write a Markdown rendering of the report.
    #[arg(long)]
    markdown_out: Option<Utf8PathBuf>,
}

#[derive(Subcommand, Debug)]
enum AssessmentCommands {
    /// Seed a new assessment with one pending item per registry control.
    Init {
        /// Registry artifact (default: configured registry path).
        #[arg(long)]
        registry: Option<Utf8PathBuf>,

        /// Where to write the assessment document.
        #[arg(long)]
        out: Utf8PathBuf,

        #[arg(long)]
        id: String,

        #[arg(long)]
        name: String,

        /// Scope entry as key=value; repeatable. JSON values are parsed, others kept as text.
        #[arg(long = "scope", value_name = "KEY=VALUE")]
        scope: Vec<String>,
    },

    /// Update one item of an assessment document in place.
    Set {
        /// Assessment document to update.
        #[arg(long)]
        assessment: Utf8PathBuf,

        /// Control whose item is updated.
        control_id: String,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Integer score, or `null` to clear it.
        #[arg(long)]
        score: Option<String>,

        #[arg(long)]
        finding: Option<String>,

        /// Evidence reference; repeatable. Replaces the item's list when given.
        #[arg(long = "evidence")]
        evidence: Vec<String>,

        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StatusArg {
    NotAssessed,
    Assessed,
}

impl From<StatusArg> for AssessmentStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::NotAssessed => AssessmentStatus::NotAssessed,
            StatusArg::Assessed => AssessmentStatus::Assessed,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => report_error(&err),
    };
    std::process::exit(code);
}

/// Initialize tracing/logging based on CLI flags. `RUST_LOG` wins when set.
fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    debug!("logging initialized at level: {}", level);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let root = cli.root.canonicalize_utf8().unwrap_or_else(|_| cli.root.clone());
    if !root.is_dir() {
        anyhow::bail!("project root does not exist: {}", root);
    }
    let overrides = Overrides {
        controls_dir: cli.controls_dir.clone(),
        schema: cli.schema.clone(),
        out_dir: cli.out_dir.clone(),
        compiler: cli.compiler.clone(),
    };
    let cfg = load_config(&root, cli.config.as_deref(), overrides)?;

    match cli.cmd {
        Commands::Compile {
            annotations,
            max_annotations,
        } => cmd_compile(&root, &cfg, annotations, max_annotations),
        Commands::Report(args) => cmd_report(&root, &cfg, args),
        Commands::Verify { registry, checksum } => cmd_verify(&root, &cfg, registry, checksum),
        Commands::Md { report, output } => cmd_md(&root, &cfg, report, output),
        Commands::Assessment(cmd) => cmd_assessment(&root, &cfg, cmd),
    }
}

fn cmd_compile(
    root: &Utf8Path,
    cfg: &ResolvedConfig,
    annotations: bool,
    max_annotations: usize,
) -> anyhow::Result<i32> {
    let result = run_compile(CompileInput {
        root,
        config: cfg,
        compiled_at: OffsetDateTime::now_utc(),
    });

    match result {
        Ok(out) => {
            println!("{}  {}", out.registry.registry_hash(), out.registry_path);
            Ok(EXIT_OK)
        }
        Err(err) => {
            let compile_err = err.downcast_ref::<CompileError>().filter(|_| annotations);
            if let Some(compile_err) = compile_err {
                for line in render_annotations(compile_err.violations(), max_annotations) {
                    println!("{}", line);
                }
            }
            Err(err)
        }
    }
}

fn cmd_report(root: &Utf8Path, cfg: &ResolvedConfig, args: ReportArgs) -> anyhow::Result<i32> {
    let registry_path = args.registry.unwrap_or_else(|| root.join(cfg.registry_path()));
    let out_path = args.out.unwrap_or_else(|| root.join(cfg.report_path()));
    let source = match (args.findings, args.assessment) {
        (Some(path), _) => ReportSource::Findings(path),
        (None, Some(path)) => ReportSource::Assessment(path),
        (None, None) => anyhow::bail!("either --findings or --assessment is required"),
    };

    let report = run_report(ReportInput {
        registry_path: &registry_path,
        source,
        out_path: Some(&out_path),
    })?;

    if let Some(md_path) = args.markdown_out {
        let md = run_markdown(&out_path)?;
        write_text_file(&md_path, &md).context("write markdown output")?;
    }

    let overall = report
        .summary
        .overall_score
        .map(|s| format!("{s:.2}"))
        .unwrap_or_else(|| "n/a".to_string());
    println!(
        "overall {} ({} of {} controls assessed) -> {}",
        overall, report.summary.controls_assessed, report.summary.controls_total, out_path
    );
    Ok(EXIT_OK)
}

fn cmd_verify(
    root: &Utf8Path,
    cfg: &ResolvedConfig,
    registry: Option<Utf8PathBuf>,
    checksum: Option<Utf8PathBuf>,
) -> anyhow::Result<i32> {
    let registry_path = registry.unwrap_or_else(|| root.join(cfg.registry_path()));
    let checksum_path = checksum.unwrap_or_else(|| root.join(cfg.checksum_path()));

    let out = run_verify(VerifyInput {
        registry_path: &registry_path,
        checksum_path: Some(&checksum_path),
    })?;

    if out.is_ok() {
        println!("ok  {}  {}", out.recomputed, registry_path);
        return Ok(EXIT_OK);
    }

    if out.declared != out.recomputed {
        eprintln!(
            "controlreg: registry_hash mismatch: artifact declares {}, content hashes to {}",
            out.declared, out.recomputed
        );
    }
    match &out.checksum {
        ChecksumCheck::Differs { line } => {
            eprintln!("controlreg: checksum file does not match: {}", line)
        }
        ChecksumCheck::Malformed { line } => {
            eprintln!("controlreg: malformed checksum line: {:?}", line)
        }
        ChecksumCheck::Skipped | ChecksumCheck::Matches => {}
    }
    Ok(EXIT_MISMATCH)
}

fn cmd_md(
    root: &Utf8Path,
    cfg: &ResolvedConfig,
    report: Option<Utf8PathBuf>,
    output: Option<Utf8PathBuf>,
) -> anyhow::Result<i32> {
    let report_path = report.unwrap_or_else(|| root.join(cfg.report_path()));
    let md = run_markdown(&report_path)?;

    if let Some(out_path) = output {
        write_text_file(&out_path, &md).context("write markdown output")?;
    } else {
        print!("{}", md);
    }
    Ok(EXIT_OK)
}

fn cmd_assessment(
    root: &Utf8Path,
    cfg: &ResolvedConfig,
    cmd: AssessmentCommands,
) -> anyhow::Result<i32> {
    match cmd {
        AssessmentCommands::Init {
            registry,
            out,
            id,
            name,
            scope,
        } => {
            let registry_path = registry.unwrap_or_else(|| root.join(cfg.registry_path()));
            let assessment = run_assessment_init(AssessmentInitInput {
                registry_path: &registry_path,
                out_path: &out,
                id,
                name,
                scope: parse_scope(&scope)?,
                now: OffsetDateTime::now_utc(),
            })?;
            println!("{} items -> {}", assessment.items.len(), out);
        }
        AssessmentCommands::Set {
            assessment,
            control_id,
            status,
            score,
            finding,
            evidence,
            notes,
        } => {
            let patch = AssessmentItemPatch {
                status: status.map(AssessmentStatus::from),
                score: score.as_deref().map(parse_score).transpose()?,
                finding_text: finding,
                evidence_refs: (!evidence.is_empty()).then_some(evidence),
                assessor_notes: notes,
            };
            run_assessment_set(AssessmentSetInput {
                assessment_path: &assessment,
                control_id: &control_id,
                patch,
                now: OffsetDateTime::now_utc(),
            })?;
            println!("updated {} in {}", control_id, assessment);
        }
    }
    Ok(EXIT_OK)
}

fn parse_score(raw: &str) -> anyhow::Result<Option<i64>> {
    if raw == "null" {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .with_context(|| format!("--score must be an integer or null, got '{raw}'"))
}

fn parse_scope(entries: &[String]) -> anyhow::Result<BTreeMap<String, JsonValue>> {
    let mut scope = BTreeMap::new();
    for entry in entries {
        let (key, raw) = entry
            .split_once('=')
            .with_context(|| format!("--scope expects KEY=VALUE, got '{entry}'"))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::from(raw));
        scope.insert(key.to_string(), value);
    }
    Ok(scope)
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    std::fs::write(path, text).with_context(|| format!("write text: {}", path))?;
    Ok(())
}

/// Print an error (and any violations it carries) to stderr and pick the exit code.
fn report_error(err: &anyhow::Error) -> i32 {
    let violations: &[Violation] = if let Some(e) = err.downcast_ref::<CompileError>() {
        e.violations()
    } else if let Some(e) = err.downcast_ref::<ReportError>() {
        e.violations()
    } else {
        &[]
    };

    eprintln!("controlreg error: {err:#}");
    for v in violations {
        eprintln!("  {}", v);
    }

    let mismatch = matches!(
        err.downcast_ref::<ReportError>(),
        Some(ReportError::HashMismatch { .. })
    );
    if mismatch { EXIT_MISMATCH } else { EXIT_ERROR }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scope_values_parse_as_json_or_text() {
        let scope = parse_scope(&[
            "system=payments".to_string(),
            "tier=1".to_string(),
            "pci=true".to_string(),
        ])
        .unwrap();
        assert_eq!(scope["system"], json!("payments"));
        assert_eq!(scope["tier"], json!(1));
        assert_eq!(scope["pci"], json!(true));
        assert!(parse_scope(&["novalue".to_string()]).is_err());
    }

    #[test]
    fn score_flag_accepts_null() {
        assert_eq!(parse_score("null").unwrap(), None);
        assert_eq!(parse_score("2").unwrap(), Some(2));
        assert!(parse_score("two").is_err());
    }

    #[test]
    fn hash_mismatch_exits_with_two() {
        let err = anyhow::Error::new(ReportError::HashMismatch {
            declared: "a".repeat(64),
            actual: "b".repeat(64),
        });
        assert_eq!(report_error(&err), EXIT_MISMATCH);
        assert_eq!(report_error(&anyhow::anyhow!("io")), EXIT_ERROR);
    }
}
