//! Filesystem adapters: discover control documents, load them, write artifacts.
//!
//! This crate does IO and nothing else; every decision about validity lives in
//! `controlreg-domain`.

#![forbid(unsafe_code)]

mod discover;
mod load;
mod write;

use anyhow::Context;
use camino::Utf8Path;
use controlreg_domain::{RegistrySources, SourceDocument};
use controlreg_settings::ResolvedConfig;
use rayon::prelude::*;
use serde_json::{Value as JsonValue, json};

pub use discover::{discover_controls, label};
pub use load::{parse_document, read_document, read_document_or, read_json, read_json_value};
pub use write::{write_atomic, write_json_pretty};

/// Load every document one compilation needs.
///
/// The domains file is required. A missing meta file becomes `{}` and a missing scoring file
/// falls back to the default scale and weight bounds. Control documents are parsed in
/// parallel and returned in discovery order.
pub fn load_sources(root: &Utf8Path, cfg: &ResolvedConfig) -> anyhow::Result<RegistrySources> {
    let meta = read_document_or(root, &cfg.meta_path(), json!({}))?;
    let domains = read_document(root, &cfg.domains_path()).context("load domain config")?;
    let scoring = read_document_or(root, &cfg.scoring_path(), json!({}))?;

    let paths = discover_controls(root, cfg)?;
    let controls = paths
        .par_iter()
        .map(|label| read_document(root, Utf8Path::new(label.as_str())))
        .collect::<anyhow::Result<Vec<SourceDocument>>>()?;

    Ok(RegistrySources {
        meta: meta.value,
        domains,
        scoring,
        controls,
    })
}

pub fn read_schema(root: &Utf8Path, cfg: &ResolvedConfig) -> anyhow::Result<JsonValue> {
    read_json_value(&root.join(&cfg.schema)).context("load control schema")
}

/// Parse a `sha256sum`-style line into `(hash, file_name)`.
pub fn parse_checksum_line(line: &str) -> Option<(&str, &str)> {
    let (hash, name) = line.trim_end().split_once("  ")?;
    if hash.len() != 64 || !hash.bytes().all(|b| b.is_ascii_hexdigit()) || name.is_empty() {
        return None;
    }
    Some((hash, name))
}
