use anyhow::Context;
use camino::Utf8Path;
use controlreg_settings::ResolvedConfig;
use controlreg_types::SourcePath;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use walkdir::WalkDir;

/// Discover control documents under `cfg.controls_dir`.
///
/// Behavior:
/// - walk recursively, keep files matching `files.include` (relative to `controls_dir`)
/// - drop files matching `files.exclude`
/// - drop the meta, domains and scoring files, in any of their YAML/JSON spellings
/// - labels are relative to `root`, sorted
///
/// Finding no control documents is an error.
pub fn discover_controls(
    root: &Utf8Path,
    cfg: &ResolvedConfig,
) -> anyhow::Result<Vec<SourcePath>> {
    let controls_dir = root.join(&cfg.controls_dir);
    if !controls_dir.is_dir() {
        anyhow::bail!("controls directory not found: {}", controls_dir);
    }

    let include = build_globset(&cfg.files.include).context("compile include globset")?;
    let exclude = build_globset(&cfg.files.exclude).context("compile exclude globset")?;
    let reserved: BTreeSet<&str> = [&cfg.files.meta, &cfg.files.domains, &cfg.files.scoring]
        .into_iter()
        .map(|name| file_stem(name))
        .collect();

    let mut out: Vec<SourcePath> = Vec::new();
    for entry in WalkDir::new(&controls_dir).follow_links(false) {
        let entry = entry.with_context(|| format!("walk {}", controls_dir))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(abs) = Utf8Path::from_path(entry.path()) else {
            continue;
        };
        let rel = abs
            .strip_prefix(&controls_dir)
            .unwrap_or(abs)
            .as_str()
            .replace('\\', "/");

        if !include.is_match(&rel) || exclude.is_match(&rel) {
            continue;
        }
        if abs.file_name().is_some_and(|name| is_reserved(name, &reserved)) {
            continue;
        }

        out.push(label(root, abs));
    }

    // Stable order.
    out.sort();
    out.dedup();

    if out.is_empty() {
        anyhow::bail!(
            "no control files found under {} (include: {})",
            controls_dir,
            cfg.files.include.join(", ")
        );
    }
    Ok(out)
}

/// Label for `path`: relative to `root` when inside it, otherwise the path as given.
pub fn label(root: &Utf8Path, path: &Utf8Path) -> SourcePath {
    SourcePath::new(path.strip_prefix(root).unwrap_or(path).as_str())
}

fn is_reserved(file_name: &str, reserved: &BTreeSet<&str>) -> bool {
    let ext = Utf8Path::new(file_name).extension().unwrap_or("");
    matches!(ext, "yml" | "yaml" | "json") && reserved.contains(file_stem(file_name))
}

fn file_stem(name: &str) -> &str {
    Utf8Path::new(name).file_stem().unwrap_or(name)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut b = GlobSetBuilder::new();
    for p in patterns {
        // Patterns are relative to the controls dir; `**/` also matches its top level.
        b.add(Glob::new(p)?);
    }
    Ok(b.build()?)
}
