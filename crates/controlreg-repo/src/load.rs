use anyhow::Context;
use camino::Utf8Path;
use controlreg_domain::SourceDocument;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// Parse document text by extension: `.json` as JSON, everything else as YAML.
///
/// YAML mappings land in a sorted map, so key order in the source never matters.
pub fn parse_document(label: &str, text: &str) -> anyhow::Result<JsonValue> {
    let is_json = Utf8Path::new(label)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(text).with_context(|| format!("parse {label} as JSON"))
    } else {
        serde_yaml::from_str(text).with_context(|| format!("parse {label} as YAML"))
    }
}

/// Read and parse one document, labelled relative to `root`.
pub fn read_document(root: &Utf8Path, path: &Utf8Path) -> anyhow::Result<SourceDocument> {
    let abs = root.join(path);
    let label = crate::discover::label(root, &abs);
    let text = std::fs::read_to_string(&abs).with_context(|| format!("read {}", abs))?;
    let value = parse_document(label.as_str(), &text)?;
    Ok(SourceDocument {
        source: label,
        value,
    })
}

/// Like [`read_document`], but a missing file yields `fallback` instead of an error.
pub fn read_document_or(
    root: &Utf8Path,
    path: &Utf8Path,
    fallback: JsonValue,
) -> anyhow::Result<SourceDocument> {
    let abs = root.join(path);
    if !abs.exists() {
        return Ok(SourceDocument {
            source: crate::discover::label(root, &abs),
            value: fallback,
        });
    }
    read_document(root, path)
}

pub fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("parse {}", path))
}

pub fn read_json_value(path: &Utf8Path) -> anyhow::Result<JsonValue> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn yaml_and_json_parse_to_the_same_value() {
        let yaml = "id: IAM-001\nweight: 3\nscoring:\n  levels:\n    - score: 0\n";
        let json_text = r#"{"id":"IAM-001","weight":3,"scoring":{"levels":[{"score":0}]}}"#;
        let a = parse_document("controls/iam.yml", yaml).unwrap();
        let b = parse_document("controls/iam.json", json_text).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn yaml_dates_stay_strings() {
        let value = parse_document("controls/_meta.yml", "updated: 2024-05-01\n").unwrap();
        assert_eq!(value, json!({ "updated": "2024-05-01" }));
    }

    #[test]
    fn yaml_timestamps_encode_as_utc_seconds() {
        let text = "updated: 2024-05-01T10:30:45.5+02:00\n";
        let value = parse_document("controls/_meta.yml", text).unwrap();
        let bytes = controlreg_domain::canonical::to_canonical_bytes(&value).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"updated":"2024-05-01T08:30:45Z"}"#
        );
    }

    #[test]
    fn keyed_yaml_maps_come_back_sorted() {
        let value = parse_document("domains.yml", "zeta:\n  name: Z\nalpha:\n  name: A\n").unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let err = parse_document("controls/bad.yml", "id: [unclosed").unwrap_err();
        assert!(err.to_string().contains("controls/bad.yml"));
    }
}
