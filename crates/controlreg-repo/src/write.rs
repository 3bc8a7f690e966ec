use anyhow::Context;
use camino::Utf8Path;
use controlreg_domain::canonical;
use serde::Serialize;
use std::io::Write;

/// Write `bytes` to `path` through a temp file in the same directory, then rename.
///
/// Readers see either the previous file or the complete new one.
pub fn write_atomic(path: &Utf8Path, bytes: &[u8]) -> anyhow::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_str().is_empty() => p,
        _ => Utf8Path::new("."),
    };
    std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent))?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {}", parent))?;
    temp_file
        .write_all(bytes)
        .with_context(|| format!("write temp file for {}", path))?;
    temp_file
        .as_file()
        .sync_all()
        .with_context(|| format!("sync temp file for {}", path))?;
    temp_file
        .persist(path)
        .with_context(|| format!("persist {}", path))?;
    Ok(())
}

/// Pretty JSON with sorted keys and a trailing newline.
pub fn write_json_pretty<T: Serialize>(path: &Utf8Path, value: &T) -> anyhow::Result<()> {
    let bytes = canonical::to_pretty_bytes(value).with_context(|| format!("encode {}", path))?;
    write_atomic(path, &bytes)
}
