//! The `verify` use case: prove a registry artifact still matches its recorded hash.

use anyhow::Context;
use camino::Utf8Path;
use controlreg_domain::registry::recompute_hash;
use controlreg_types::Registry;

#[derive(Clone, Debug)]
pub struct VerifyInput<'a> {
    pub registry_path: &'a Utf8Path,
    /// Checksum file to compare as well; a missing file is skipped.
    pub checksum_path: Option<&'a Utf8Path>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChecksumCheck {
    Skipped,
    Matches,
    /// The checksum file records a different hash or names a different artifact.
    Differs { line: String },
    Malformed { line: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyOutput {
    /// `build.registry_hash` as stored in the artifact.
    pub declared: String,
    /// Hash recomputed from the artifact's content.
    pub recomputed: String,
    pub checksum: ChecksumCheck,
}

impl VerifyOutput {
    pub fn is_ok(&self) -> bool {
        self.declared == self.recomputed
            && matches!(self.checksum, ChecksumCheck::Skipped | ChecksumCheck::Matches)
    }
}

/// Recompute the registry content hash and compare it with the recorded ones.
///
/// Mismatches are reported in the output, not as errors; IO and parse failures are errors.
pub fn run_verify(input: VerifyInput<'_>) -> anyhow::Result<VerifyOutput> {
    let registry: Registry =
        controlreg_repo::read_json(input.registry_path).context("load registry")?;
    let recomputed = recompute_hash(&registry).context("hash registry content")?;
    let declared = registry.registry_hash().to_string();

    let checksum = match input.checksum_path {
        Some(path) if path.exists() => {
            let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path))?;
            let line = text.lines().next().unwrap_or("").to_string();
            let artifact = input.registry_path.file_name().unwrap_or("");
            match controlreg_repo::parse_checksum_line(&line) {
                Some((hash, name)) if hash == recomputed && name == artifact => {
                    ChecksumCheck::Matches
                }
                Some(_) => ChecksumCheck::Differs { line },
                None => ChecksumCheck::Malformed { line },
            }
        }
        Some(path) => {
            tracing::warn!(path = %path, "checksum file not found; skipping");
            ChecksumCheck::Skipped
        }
        None => ChecksumCheck::Skipped,
    };

    let out = VerifyOutput {
        declared,
        recomputed,
        checksum,
    };
    if out.is_ok() {
        tracing::info!(registry_hash = %out.recomputed, "registry verified");
    } else {
        tracing::warn!(
            declared = %out.declared,
            recomputed = %out.recomputed,
            checksum = ?out.checksum,
            "registry verification failed"
        );
    }
    Ok(out)
}
