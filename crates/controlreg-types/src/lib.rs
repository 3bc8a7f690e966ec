//! Stable DTOs and IDs used across the controlreg workspace.
//!
//! This crate is intentionally boring:
//! - document types for controls, domains, scoring, registries, findings and reports
//! - stable violation codes
//! - canonical source-path handling
//! - UTC timestamp encoding shared by every artifact

#![forbid(unsafe_code)]

pub mod assessment;
pub mod control;
pub mod findings;
pub mod ids;
pub mod path;
pub mod registry;
pub mod report;
pub mod timefmt;
pub mod violation;

pub use assessment::{Assessment, AssessmentItem, AssessmentItemPatch, AssessmentStatus};
pub use control::{
    Control, ControlScoring, Domain, ScoreScale, ScoringConfig, ScoringLevel, WeightBounds,
};
pub use findings::{Finding, FindingsDocument};
pub use path::SourcePath;
pub use registry::{BuildInfo, Counts, Registry, RegistryContent};
pub use report::{ControlOutcome, DomainReport, Report, ReportControl, ReportSummary, RiskEntry};
pub use violation::{Violation, ViolationKind};
