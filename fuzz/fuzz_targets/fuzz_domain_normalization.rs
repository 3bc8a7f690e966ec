//! Fuzz target for domain config normalization.
//!
//! Goal: normalization must **never panic**, whatever shape the document has.
//! Every accepted domain must come out with a non-empty id and ids must be unique.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_domain_normalization
//! ```

#![no_main]

use controlreg_domain::normalize::normalize_domains;
use controlreg_types::SourcePath;
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeSet;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    let mut violations = Vec::new();
    let normalized = normalize_domains(&value, &SourcePath::new("domains.yml"), &mut violations);

    let mut seen = BTreeSet::new();
    for domain in &normalized.domains {
        assert!(!domain.id.is_empty());
        assert!(seen.insert(domain.id.as_str()), "duplicate domain id survived");
    }
});
