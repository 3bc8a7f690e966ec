//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - registry hash stability across compile times and discovery order
//! - risk ranking determinism under findings reordering
//! - weighted score bounds

use crate::registry::{RegistrySources, compile};
use crate::report::generate_report;
use crate::scoring::{TOP_RISKS, weighted_score};
use crate::test_support::{control_schema, findings_doc, sources};
use controlreg_types::Registry;
use proptest::prelude::*;
use serde_json::json;
use time::OffsetDateTime;

// ============================================================================
// Strategies
// ============================================================================

/// Between one and eight controls with unique ids, random domains and weights in bounds.
fn arb_controls() -> impl Strategy<Value = Vec<(String, &'static str, i64)>> {
    prop::collection::btree_set("[A-Z]{3}-[0-9]{3}", 1..8).prop_flat_map(|ids| {
        let n = ids.len();
        (
            Just(ids.into_iter().collect::<Vec<_>>()),
            prop::collection::vec(prop::sample::select(vec!["identity", "network"]), n),
            prop::collection::vec(1i64..=5, n),
        )
            .prop_map(|(ids, domains, weights)| {
                ids.into_iter()
                    .zip(domains)
                    .zip(weights)
                    .map(|((id, domain), weight)| (id, domain, weight))
                    .collect()
            })
    })
}

fn build_sources(controls: &[(String, &'static str, i64)]) -> RegistrySources {
    let borrowed: Vec<(&str, &str, i64)> = controls
        .iter()
        .map(|(id, domain, weight)| (id.as_str(), *domain, *weight))
        .collect();
    sources(&borrowed)
}

fn build_registry(controls: &[(String, &'static str, i64)], at: OffsetDateTime) -> Registry {
    compile(&build_sources(controls), &control_schema())
        .expect("generated controls are valid")
        .into_registry(at, "controlreg proptest")
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn hash_is_independent_of_compile_time_and_order(
        controls in arb_controls(),
        t1 in 0i64..2_000_000_000,
        t2 in 0i64..2_000_000_000,
    ) {
        let at1 = OffsetDateTime::from_unix_timestamp(t1).unwrap();
        let at2 = OffsetDateTime::from_unix_timestamp(t2).unwrap();
        let mut reversed = controls.clone();
        reversed.reverse();

        let a = build_registry(&controls, at1);
        let b = build_registry(&reversed, at2);
        prop_assert_eq!(a.registry_hash(), b.registry_hash());
    }

    #[test]
    fn any_weight_change_changes_hash(
        controls in arb_controls(),
        pick in any::<prop::sample::Index>(),
    ) {
        let at = OffsetDateTime::UNIX_EPOCH;
        let mut changed = controls.clone();
        let idx = pick.index(changed.len());
        changed[idx].2 = if changed[idx].2 == 5 { 1 } else { changed[idx].2 + 1 };

        let a = build_registry(&controls, at);
        let b = build_registry(&changed, at);
        prop_assert_ne!(a.registry_hash(), b.registry_hash());
    }

    #[test]
    fn ranking_is_invariant_under_findings_order(
        controls in arb_controls(),
        scores in prop::collection::vec(0i64..=2, 8),
        seed in any::<u64>(),
    ) {
        let registry = build_registry(&controls, OffsetDateTime::UNIX_EPOCH);
        let findings: Vec<_> = controls
            .iter()
            .zip(&scores)
            .map(|((id, _, _), score)| json!({ "control_id": id, "score": score }))
            .collect();

        let mut shuffled = findings.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        shuffled.reverse();

        let a = generate_report(&registry, &findings_doc(&registry, findings)).unwrap();
        let b = generate_report(&registry, &findings_doc(&registry, shuffled)).unwrap();
        prop_assert_eq!(&a.top_risks, &b.top_risks);
        prop_assert!(a.top_risks.len() <= TOP_RISKS);
        prop_assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }

    #[test]
    fn weighted_score_stays_within_percent_bounds(
        pairs in prop::collection::vec((0i64..=5, 0i64..=4), 0..12),
    ) {
        match weighted_score(&pairs, 4) {
            None => prop_assert!(pairs.iter().all(|(w, _)| *w == 0)),
            Some(pct) => prop_assert!((0.0..=100.0).contains(&pct)),
        }
    }
}
