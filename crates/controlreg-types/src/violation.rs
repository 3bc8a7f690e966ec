use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a validation failure.
///
/// Every category is batch-reported: validation collects all of them before deciding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    SchemaViolation,
    StructuralError,
    CrossReference,
    Range,
    Completeness,
    UnknownControl,
    DuplicateFinding,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::SchemaViolation => "schema_violation",
            ViolationKind::StructuralError => "structural_error",
            ViolationKind::CrossReference => "cross_reference",
            ViolationKind::Range => "range",
            ViolationKind::Completeness => "completeness",
            ViolationKind::UnknownControl => "unknown_control",
            ViolationKind::DuplicateFinding => "duplicate_finding",
        }
    }
}

/// One validation failure, located by source document and (optionally) field path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Stable discriminator from [`crate::ids`].
    pub code: String,
    /// Document label, e.g. `controls/iam/mfa.yml` or `findings[3]`.
    pub source: String,
    /// Dotted field path inside the document, `(root)` for the document itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

impl Violation {
    pub fn new(
        kind: ViolationKind,
        code: &str,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            code: code.to_string(),
            source: source.into(),
            path: None,
            message: message.into(),
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(
                f,
                "{}: {} at {}: {}",
                self.source,
                self.kind.as_str(),
                path,
                self.message
            ),
            None => write!(f, "{}: {}", self.source, self.message),
        }
    }
}
