use controlreg_types::Violation;

/// Render validation failures as GitHub Actions workflow command annotations.
///
/// Format:
/// `::error file={source},title={kind}::[{code}] {path}: {message}`
///
/// Sources that are not files (`findings[3]`, `items`) get no `file=` property.
pub fn render_github_annotations(violations: &[Violation]) -> Vec<String> {
    violations
        .iter()
        .map(|v| {
            let mut props = Vec::new();
            if looks_like_file(&v.source) {
                props.push(format!("file={}", escape_property(&v.source)));
            }
            props.push(format!("title={}", v.kind.as_str()));

            let located = match &v.path {
                Some(path) => format!("[{}] {}: {}", v.code, path, v.message),
                None => format!("[{}] {}", v.code, v.message),
            };
            format!("::error {}::{}", props.join(","), escape_data(&located))
        })
        .collect()
}

fn looks_like_file(source: &str) -> bool {
    [".yml", ".yaml", ".json"].iter().any(|ext| source.ends_with(ext))
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}
