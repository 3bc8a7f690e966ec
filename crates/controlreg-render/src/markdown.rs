use controlreg_types::{Report, timefmt};
use serde_json::Value as JsonValue;

/// Render a report as a Markdown summary: header, per-domain table, top risks.
///
/// Output depends only on the report, so identical reports render to identical text.
pub fn render_markdown(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("# Control risk report\n\n");
    out.push_str(&format!("- Registry: `{}`\n", report.registry_hash));
    if let Some(at) = report.assessed_at.and_then(|ts| timefmt::format(ts).ok()) {
        out.push_str(&format!("- Assessed at: {}\n", at));
    }
    if !report.scope.is_empty() {
        let scope: Vec<String> = report
            .scope
            .iter()
            .map(|(k, v)| format!("{}={}", k, scalar(v)))
            .collect();
        out.push_str(&format!("- Scope: {}\n", scope.join(", ")));
    }
    let s = &report.summary;
    out.push_str(&format!(
        "- Overall score: **{}**\n- Controls: {} assessed / {} total ({} not assessed)\n\n",
        percent(s.overall_score),
        s.controls_assessed,
        s.controls_total,
        s.controls_not_assessed
    ));

    out.push_str("## Domains\n\n");
    if report.domains.is_empty() {
        out.push_str("No domains.\n\n");
    } else {
        out.push_str("| Domain | Name | Score | Assessed | Weight |\n");
        out.push_str("|---|---|---:|---:|---:|\n");
        for d in &report.domains {
            out.push_str(&format!(
                "| `{}` | {} | {} | {}/{} | {} |\n",
                d.id,
                cell(&d.name),
                percent(d.score),
                d.controls_assessed,
                d.controls_total,
                d.weight
            ));
        }
        out.push('\n');
    }

    out.push_str("## Top risks\n\n");
    if report.top_risks.is_empty() {
        out.push_str("No assessed controls.\n");
        return out;
    }
    for (rank, r) in report.top_risks.iter().enumerate() {
        out.push_str(&format!(
            "{}. `{}` {} (domain `{}`): risk {} (weight {}, score {})\n",
            rank + 1,
            r.control_id,
            r.title,
            r.domain,
            r.risk_score,
            r.weight,
            r.score
        ));
        if !r.finding.is_empty() {
            out.push_str(&format!("   - finding: {}\n", r.finding));
        }
    }

    out
}

fn percent(score: Option<f64>) -> String {
    match score {
        Some(v) => format!("{:.2}%", v),
        None => "n/a".to_string(),
    }
}

fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

fn scalar(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
