//! The `report` use cases: score findings (or an assessment) against a compiled registry.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use controlreg_domain::assessment::build_report_from_assessment;
use controlreg_domain::findings::parse_findings_document;
use controlreg_types::{Assessment, Registry, Report};

/// Where assessment results come from.
#[derive(Clone, Debug)]
pub enum ReportSource {
    /// A one-shot findings document.
    Findings(Utf8PathBuf),
    /// An assessment document maintained item by item.
    Assessment(Utf8PathBuf),
}

#[derive(Clone, Debug)]
pub struct ReportInput<'a> {
    pub registry_path: &'a Utf8Path,
    pub source: ReportSource,
    /// Where to write `report.json`; `None` skips writing.
    pub out_path: Option<&'a Utf8Path>,
}

/// Build a report from either source and optionally write it.
///
/// A registry hash mismatch or invalid findings surface as a wrapped
/// [`controlreg_domain::ReportError`].
pub fn run_report(input: ReportInput<'_>) -> anyhow::Result<Report> {
    let registry: Registry =
        controlreg_repo::read_json(input.registry_path).context("load registry")?;

    let report = match &input.source {
        ReportSource::Findings(path) => {
            let value = controlreg_repo::read_json_value(path).context("load findings")?;
            let doc = parse_findings_document(&value)?;
            tracing::info!(findings = doc.findings.len(), path = %path, "loaded findings");
            controlreg_domain::generate_report(&registry, &doc)?
        }
        ReportSource::Assessment(path) => run_report_from_assessment(&registry, path)?,
    };

    tracing::info!(
        overall_score = ?report.summary.overall_score,
        assessed = report.summary.controls_assessed,
        total = report.summary.controls_total,
        "scored report"
    );

    if let Some(out) = input.out_path {
        controlreg_repo::write_json_pretty(out, &report)?;
        tracing::info!(path = %out, "wrote report");
    }
    Ok(report)
}

/// Score the assessment document at `path` against `registry`.
pub fn run_report_from_assessment(
    registry: &Registry,
    path: &Utf8Path,
) -> anyhow::Result<Report> {
    let assessment: Assessment = controlreg_repo::read_json(path).context("load assessment")?;
    tracing::info!(
        assessment = %assessment.id,
        items = assessment.items.len(),
        "loaded assessment"
    );
    Ok(build_report_from_assessment(registry, &assessment)?)
}
