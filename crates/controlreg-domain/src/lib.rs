//! Pure registry compilation and report scoring (no IO).
//!
//! Input: control, domain, scoring and findings documents already loaded into memory.
//! Output: a content-hashed registry, or a deterministic weighted risk report.

#![forbid(unsafe_code)]

pub mod assessment;
pub mod canonical;
pub mod error;
pub mod findings;
pub mod normalize;
pub mod registry;
pub mod report;
pub mod schema;
pub mod scoring;

mod rules;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use error::{CompileError, PatchError, ReportError, SchemaError};
pub use findings::validate_findings;
pub use registry::{CompiledRegistry, RegistrySources, SourceDocument, checksum_line, compile};
pub use report::generate_report;
pub use schema::ControlSchema;
