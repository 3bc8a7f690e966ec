//! Fuzz target for findings validation and scoring.
//!
//! Goal: an arbitrary findings document must either be rejected with violations or produce
//! a report; it must **never panic**. Accepted reports keep scores within 0..=100 and at
//! most five top risks.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_findings_validation
//! ```

#![no_main]

use controlreg_domain::findings::parse_findings_document;
use controlreg_domain::{ControlSchema, RegistrySources, SourceDocument, compile, generate_report};
use controlreg_types::Registry;
use libfuzzer_sys::fuzz_target;
use serde_json::{Value, json};
use std::sync::OnceLock;

fn control(id: &str, domain: &str, weight: i64) -> Value {
    json!({
        "id": id,
        "domain": domain,
        "weight": weight,
        "title": id,
        "scoring": { "levels": [{ "score": 0 }, { "score": 1 }, { "score": 2 }] }
    })
}

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let sources = RegistrySources {
            meta: json!({}),
            domains: SourceDocument::new("domains.yml", json!([{ "id": "a" }, { "id": "b" }])),
            scoring: SourceDocument::new("scoring.yml", json!({})),
            controls: vec![
                SourceDocument::new("controls/A.yml", control("A", "a", 2)),
                SourceDocument::new("controls/B.yml", control("B", "a", 3)),
                SourceDocument::new("controls/C.yml", control("C", "b", 5)),
            ],
        };
        let schema = ControlSchema::compile(&json!({})).expect("empty schema compiles");
        compile(&sources, &schema)
            .expect("fuzz registry is valid")
            .into_registry(std::time::UNIX_EPOCH.into(), "fuzz")
    })
}

fuzz_target!(|data: &[u8]| {
    let Ok(mut value) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    // Most inputs should get past the hash check to reach the per-entry validation.
    if let Some(obj) = value.as_object_mut() {
        if !obj.contains_key("registry_hash") {
            obj.insert("registry_hash".into(), json!(registry().registry_hash()));
        }
    }

    let Ok(doc) = parse_findings_document(&value) else {
        return;
    };
    if let Ok(report) = generate_report(registry(), &doc) {
        assert!(report.top_risks.len() <= 5);
        if let Some(score) = report.summary.overall_score {
            assert!((0.0..=100.0).contains(&score));
        }
    }
});
