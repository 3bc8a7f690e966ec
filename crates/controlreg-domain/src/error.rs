use controlreg_types::Violation;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("control schema is not a valid JSON Schema: {message}")]
    Invalid { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("control registry validation failed with {} violation(s)", .0.len())]
    Invalid(Vec<Violation>),

    #[error("encode registry content: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Fatal: the findings were recorded against a different control set.
    #[error("registry_hash mismatch: findings declare {declared}, registry has {actual}")]
    HashMismatch { declared: String, actual: String },

    #[error("invalid findings: {} violation(s)", .0.len())]
    Invalid(Vec<Violation>),
}

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("assessment item not found for control_id '{control_id}'")]
    ItemNotFound { control_id: String },
}

impl CompileError {
    pub fn violations(&self) -> &[Violation] {
        match self {
            CompileError::Invalid(v) => v,
            CompileError::Encode(_) => &[],
        }
    }
}

impl ReportError {
    pub fn violations(&self) -> &[Violation] {
        match self {
            ReportError::Invalid(v) => v,
            ReportError::HashMismatch { .. } => &[],
        }
    }
}
