//! Use case orchestration for controlreg.
//!
//! This crate provides the application layer: use cases that coordinate the domain, repo, and
//! render layers. Domain failures surface as `anyhow::Error` wrapping the typed domain error,
//! so callers can downcast to `CompileError` / `ReportError` to reach the violation list.
//!
//! The CLI crate depends on this; it only handles argument parsing and process exit codes.

#![forbid(unsafe_code)]

mod assessment;
mod compile;
mod config;
mod render;
mod report;
mod verify;

pub use assessment::{
    AssessmentInitInput, AssessmentSetInput, run_assessment_init, run_assessment_set,
};
pub use compile::{CompileInput, CompileOutput, run_compile};
pub use config::load_config;
pub use render::{render_annotations, run_markdown};
pub use report::{ReportInput, ReportSource, run_report, run_report_from_assessment};
pub use verify::{ChecksumCheck, VerifyInput, VerifyOutput, run_verify};
