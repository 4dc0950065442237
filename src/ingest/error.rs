use std::path::PathBuf;
use thiserror::Error;

/// Claims loading failure
///
/// Any schema violation halts the whole load; rows are never silently
/// dropped or coerced.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("claims file not found at {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("schema violation on line {line}: `{field}` {reason}")]
    SchemaViolation {
        line: u64,
        field: &'static str,
        reason: String,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read claims: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    pub(crate) fn schema(line: u64, field: &'static str, reason: impl Into<String>) -> Self {
        LoadError::SchemaViolation {
            line,
            field,
            reason: reason.into(),
        }
    }
}
