//! Render use cases: markdown and GitHub annotations.

use anyhow::Context;
use camino::Utf8Path;
use controlreg_types::{Report, Violation};

/// Load a `report.json` and render it as Markdown.
pub fn run_markdown(report_path: &Utf8Path) -> anyhow::Result<String> {
    let report: Report = controlreg_repo::read_json(report_path).context("load report")?;
    Ok(controlreg_render::render_markdown(&report))
}

pub fn render_annotations(violations: &[Violation], max: usize) -> Vec<String> {
    controlreg_render::render_github_annotations(violations)
        .into_iter()
        .take(max)
        .collect()
}
