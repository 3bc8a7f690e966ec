//! Canonical encoding and content hashing.
//!
//! Keys are sorted at every nesting level regardless of how the map type orders them, the
//! output carries no insignificant whitespace, and non-ASCII text is written as raw UTF-8.
//! Source documents hand date-times over as plain strings in whatever form the author wrote
//! them; any string that is a full date-time is rewritten as `YYYY-MM-DDTHH:MM:SSZ` (see
//! `controlreg_types::timefmt::parse_text`), so one instant always hashes the same way.

use controlreg_types::{RegistryContent, timefmt};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use sha2::{Digest, Sha256};

/// Rebuild `value` with every object's keys in lexicographic order and date-times in UTC.
pub fn canonicalize(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            JsonValue::Object(sorted)
        }
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(canonicalize).collect()),
        JsonValue::String(text) => match timefmt::parse_text(text).map(timefmt::format) {
            Some(Ok(utc)) => JsonValue::String(utc),
            _ => value.clone(),
        },
        other => other.clone(),
    }
}

/// Compact canonical bytes, used only for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    serde_json::to_vec(&canonicalize(&value))
}

/// Human-facing artifact bytes: sorted keys, two-space indent, trailing newline.
pub fn to_pretty_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    let mut out = serde_json::to_vec_pretty(&canonicalize(&value))?;
    out.push(b'\n');
    Ok(out)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// The registry hash: SHA-256 over the canonical encoding of everything except `build`.
pub fn content_hash(content: &RegistryContent) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(&to_canonical_bytes(content)?))
}
