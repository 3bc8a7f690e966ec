//! End-to-end use case tests against the fixture projects in `tests/fixtures/projects`.
//!
//! Each test copies a fixture into a temp dir so artifacts never land in the source tree.

use camino::{Utf8Path, Utf8PathBuf};
use controlreg_app::{
    AssessmentInitInput, AssessmentSetInput, ChecksumCheck, CompileInput, ReportInput,
    ReportSource, VerifyInput, load_config, run_assessment_init, run_assessment_set,
    run_compile, run_markdown, run_report, run_verify,
};
use controlreg_domain::{CompileError, ReportError};
use controlreg_settings::Overrides;
use controlreg_types::{AssessmentItemPatch, AssessmentStatus, ViolationKind};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tempfile::TempDir;
use time::macros::datetime;

fn fixture(name: &str) -> Utf8PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // crates/controlreg-app -> crates -> repo root
    let repo_root = manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root above crates/controlreg-app");
    Utf8PathBuf::from_path_buf(repo_root.join("tests/fixtures/projects").join(name))
        .expect("fixture path should be valid UTF-8")
}

fn copy_tree(from: &Utf8Path, to: &Utf8Path) {
    std::fs::create_dir_all(to).expect("create dir");
    for entry in std::fs::read_dir(from).expect("read fixture dir") {
        let entry = entry.expect("dir entry");
        let name = entry.file_name().into_string().expect("utf8 name");
        let src = from.join(&name);
        let dst = to.join(&name);
        if src.is_dir() {
            copy_tree(&src, &dst);
        } else {
            std::fs::copy(&src, &dst).expect("copy fixture file");
        }
    }
}

fn project(name: &str) -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 temp dir");
    copy_tree(&fixture(name), &root);
    (tmp, root)
}

fn compile_project(root: &Utf8Path) -> anyhow::Result<controlreg_app::CompileOutput> {
    let cfg = load_config(root, None, Overrides::default())?;
    run_compile(CompileInput {
        root,
        config: &cfg,
        compiled_at: datetime!(2024-06-01 12:00:00.75 UTC),
    })
}

#[test]
fn valid_project_compiles_and_writes_checksum() {
    let (_tmp, root) = project("valid");
    let out = compile_project(&root).expect("compile");

    let ids: Vec<&str> = out.registry.controls.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["IAM-001", "IAM-002", "NET-001"]);
    assert_eq!(out.registry.counts.domains, 2);
    assert_eq!(out.registry.meta["name"], "baseline-identity-controls");
    assert_eq!(out.registry.scoring.weight.max, 5);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out.registry_path).unwrap()).unwrap();
    assert_eq!(written["build"]["compiled_at"], "2024-06-01T12:00:00Z");
    assert_eq!(written["controls"][0]["references"][0], "NIST SP 800-63B");

    let checksum = std::fs::read_to_string(&out.checksum_path).unwrap();
    assert_eq!(checksum, format!("{}  controls.json\n", out.registry.registry_hash()));
}

#[test]
fn recompiling_at_another_time_keeps_the_hash() {
    let (_tmp, root) = project("valid");
    let first = compile_project(&root).unwrap();
    let cfg = load_config(&root, None, Overrides::default()).unwrap();
    let second = run_compile(CompileInput {
        root: &root,
        config: &cfg,
        compiled_at: datetime!(2030-01-01 00:00:00 UTC),
    })
    .unwrap();
    assert_eq!(first.registry.registry_hash(), second.registry.registry_hash());
    assert_ne!(first.registry.build.compiled_at, second.registry.build.compiled_at);
}

#[test]
fn keyed_domain_config_is_normalized() {
    let (_tmp, root) = project("keyed-domains");
    let out = compile_project(&root).expect("compile");
    let ids: Vec<&str> = out.registry.domains.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["identity", "network"]);
    assert_eq!(out.registry.domains[1].name, "Network Security");
}

#[test]
fn invalid_project_reports_every_violation_and_writes_nothing() {
    let (_tmp, root) = project("invalid");
    let err = compile_project(&root).unwrap_err();
    let compile_err = err.downcast_ref::<CompileError>().expect("compile error");
    let violations = compile_err.violations();

    let mut kinds: Vec<ViolationKind> = violations.iter().map(|v| v.kind).collect();
    kinds.sort();
    kinds.dedup();
    assert_eq!(
        kinds,
        vec![ViolationKind::CrossReference, ViolationKind::Range, ViolationKind::Completeness]
    );
    assert!(violations.iter().any(|v| {
        v.source == "controls/iam-002.yml"
            && v.message.contains("duplicate control id 'IAM-001'")
    }));
    assert!(violations.iter().any(|v| v.message.contains("domain 'physical'")));
    assert!(!root.join("dist").exists());
}

#[test]
fn findings_report_verify_and_markdown() {
    let (_tmp, root) = project("valid");
    let compiled = compile_project(&root).unwrap();
    let hash = compiled.registry.registry_hash().to_string();

    let findings_path = root.join("findings.json");
    let findings = json!({
        "registry_hash": hash,
        "assessed_at": "2024-06-02T08:00:00Z",
        "scope": { "system": "payments" },
        "findings": [
            { "control_id": "IAM-001", "score": 2 },
            { "control_id": "IAM-002", "score": 0, "finding": "No leaver SLA" },
            { "control_id": "NET-001", "score": 1, "evidence_refs": ["EV-7"] }
        ]
    });
    std::fs::write(&findings_path, findings.to_string()).unwrap();

    let report_path = root.join("dist/report.json");
    let report = run_report(ReportInput {
        registry_path: &compiled.registry_path,
        source: ReportSource::Findings(findings_path),
        out_path: Some(&report_path),
    })
    .unwrap();

    // (2*2 + 3*0 + 4*1) / (2*2 + 3*2 + 4*2) = 8/18
    assert_eq!(report.summary.overall_score, Some(44.44));
    assert_eq!(report.top_risks[0].control_id, "IAM-002");
    assert_eq!(report.top_risks[0].risk_score, 6);
    assert_eq!(report.top_risks[1].control_id, "NET-001");
    assert_eq!(report.top_risks[1].risk_score, 4);

    let md = run_markdown(&report_path).unwrap();
    assert!(md.contains("**44.44%**"));
    assert!(md.contains("- finding: No leaver SLA"));

    let verified = run_verify(VerifyInput {
        registry_path: &compiled.registry_path,
        checksum_path: Some(&compiled.checksum_path),
    })
    .unwrap();
    assert!(verified.is_ok());
    assert_eq!(verified.checksum, ChecksumCheck::Matches);
}

#[test]
fn findings_for_another_registry_are_rejected() {
    let (_tmp, root) = project("valid");
    let compiled = compile_project(&root).unwrap();
    let findings_path = root.join("findings.json");
    let stale = json!({ "registry_hash": "0".repeat(64), "findings": [] });
    std::fs::write(&findings_path, stale.to_string()).unwrap();

    let err = run_report(ReportInput {
        registry_path: &compiled.registry_path,
        source: ReportSource::Findings(findings_path),
        out_path: None,
    })
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReportError>(),
        Some(ReportError::HashMismatch { .. })
    ));
}

#[test]
fn tampered_registry_fails_verification() {
    let (_tmp, root) = project("valid");
    let compiled = compile_project(&root).unwrap();

    let mut value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&compiled.registry_path).unwrap()).unwrap();
    value["controls"][0]["weight"] = json!(5);
    std::fs::write(&compiled.registry_path, value.to_string()).unwrap();

    let verified = run_verify(VerifyInput {
        registry_path: &compiled.registry_path,
        checksum_path: Some(&compiled.checksum_path),
    })
    .unwrap();
    assert!(!verified.is_ok());
    assert_ne!(verified.declared, verified.recomputed);
    assert!(matches!(verified.checksum, ChecksumCheck::Differs { .. }));
}

#[test]
fn assessment_workflow_produces_a_report() {
    let (_tmp, root) = project("valid");
    let compiled = compile_project(&root).unwrap();
    let assessment_path = root.join("assessment.json");

    let seeded = run_assessment_init(AssessmentInitInput {
        registry_path: &compiled.registry_path,
        out_path: &assessment_path,
        id: "asmt-2024-q2".to_string(),
        name: "Q2 baseline".to_string(),
        scope: BTreeMap::from([("system".to_string(), json!("payments"))]),
        now: datetime!(2024-06-03 09:00:00 UTC),
    })
    .unwrap();
    assert_eq!(seeded.items.len(), 3);

    let patch = AssessmentItemPatch {
        status: Some(AssessmentStatus::Assessed),
        score: Some(Some(1)),
        finding_text: Some("Push MFA still allowed".to_string()),
        ..AssessmentItemPatch::default()
    };
    let updated = run_assessment_set(AssessmentSetInput {
        assessment_path: &assessment_path,
        control_id: "IAM-001",
        patch,
        now: datetime!(2024-06-04 10:00:00 UTC),
    })
    .unwrap();
    assert_eq!(updated.assessed_at, Some(datetime!(2024-06-04 10:00:00 UTC)));

    let report = run_report(ReportInput {
        registry_path: &compiled.registry_path,
        source: ReportSource::Assessment(assessment_path),
        out_path: None,
    })
    .unwrap();
    assert_eq!(report.summary.controls_assessed, 1);
    assert_eq!(report.summary.overall_score, Some(50.0));
    assert_eq!(report.top_risks[0].control_id, "IAM-001");
    assert_eq!(report.top_risks[0].finding, "Push MFA still allowed");
}
