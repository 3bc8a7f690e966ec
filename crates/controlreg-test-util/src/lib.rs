//! Shared test utilities for the controlreg workspace.
//!
//! Artifacts carry a few values that change from run to run (compile and seeding
//! timestamps, the compiler identity that embeds the crate version). Golden comparisons go
//! through [`normalize_nondeterministic`] first.

use serde_json::Value;

pub const TIMESTAMP: &str = "__TIMESTAMP__";
pub const COMPILER: &str = "__COMPILER__";

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// - Root-only: when the root looks like a registry (`build` next to `controls`), its
///   `build.compiled_at` and `build.compiler` are replaced.
/// - Recursive: `created_at` is replaced at any depth, so seeded assessments compare equal.
///
/// `assessed_at` is left alone: it is copied from inputs, never generated.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    let is_registry = value
        .as_object()
        .is_some_and(|obj| obj.contains_key("build") && obj.contains_key("controls"));
    if is_registry {
        if let Some(build) = value.get_mut("build").and_then(Value::as_object_mut) {
            if build.contains_key("compiled_at") {
                build.insert("compiled_at".to_string(), Value::String(TIMESTAMP.to_string()));
            }
            if build.contains_key("compiler") {
                build.insert("compiler".to_string(), Value::String(COMPILER.to_string()));
            }
        }
    }
    normalize_created_at(&mut value);
    value
}

fn normalize_created_at(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.contains_key("created_at") {
                map.insert("created_at".to_string(), Value::String(TIMESTAMP.to_string()));
            }
            for val in map.values_mut() {
                normalize_created_at(val);
            }
        }
        Value::Array(arr) => {
            for val in arr.iter_mut() {
                normalize_created_at(val);
            }
        }
        _ => {}
    }
}
