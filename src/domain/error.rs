use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendFailureKind {
    /// Store unreachable or the request never completed.
    Transport,
    /// Store rejected the privileged key.
    Auth,
    /// Unique or foreign-key constraint rejected a row.
    ConstraintViolation,
    /// Any other non-success answer from the store.
    Rejected,
}

impl fmt::Display for BackendFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Auth => write!(f, "auth"),
            Self::ConstraintViolation => write!(f, "constraint violation"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Typed failure of a single backend write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendFailure {
    pub table: String,
    pub kind: BackendFailureKind,
    pub record_index: Option<usize>,
    pub message: String,
}

impl BackendFailure {
    pub fn new(table: impl Into<String>, kind: BackendFailureKind, message: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            kind,
            record_index: None,
            message: message.into(),
        }
    }

    pub fn at_record(mut self, index: usize) -> Self {
        self.record_index = Some(index);
        self
    }

    /// Shift a chunk-relative index into a stage-relative one.
    pub fn offset_by(mut self, chunk_start: usize) -> Self {
        self.record_index = Some(chunk_start + self.record_index.unwrap_or(0));
        self
    }
}

impl fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record_index {
            Some(index) => write!(
                f,
                "{} on table '{}' at record {}: {}",
                self.kind, self.table, index, self.message
            ),
            None => write!(f, "{} on table '{}': {}", self.kind, self.table, self.message),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    ConfigError(String),
    ValidationError(String),
    LLMError(String),
    EmailError(String),
    Backend(BackendFailure),
    IoError(String),
}

impl AppError {
    pub fn is_config(&self) -> bool {
        matches!(self, AppError::ConfigError(_) | AppError::ValidationError(_))
    }

    pub fn backend_failure(&self) -> Option<&BackendFailure> {
        match self {
            AppError::Backend(failure) => Some(failure),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::LLMError(msg) => write!(f, "LLM error: {}", msg),
            AppError::EmailError(msg) => write!(f, "Email error: {}", msg),
            AppError::Backend(failure) => write!(f, "Backend error: {}", failure),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<BackendFailure> for AppError {
    fn from(failure: BackendFailure) -> Self {
        AppError::Backend(failure)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_failure_display_with_index() {
        let failure = BackendFailure::new("leads", BackendFailureKind::ConstraintViolation, "duplicate key")
            .at_record(3)
            .offset_by(500);
        assert_eq!(failure.record_index, Some(503));
        assert_eq!(
            failure.to_string(),
            "constraint violation on table 'leads' at record 503: duplicate key"
        );
    }

    #[test]
    fn test_config_classification() {
        assert!(AppError::ConfigError("missing".into()).is_config());
        assert!(AppError::ValidationError("negative".into()).is_config());
        assert!(!AppError::Internal("boom".into()).is_config());
    }
}
