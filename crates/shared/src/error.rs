use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    UnknownCombination,
    NoContext,
    UnsupportedContext,
    InvalidDirection,
    InvalidStepSize,
    UnknownAction,
    UnknownScript,
    AlreadyRunning,
    NotRunning,
    NotPaused,
    ForcedTermination,
    NotFound,
    Internal,
}

impl ErrorCode {
    /// Request-scoped validation and state-machine failures, reported as 400.
    pub fn is_client_error(self) -> bool {
        !matches!(
            self,
            ErrorCode::NotFound | ErrorCode::UnknownAction | ErrorCode::Internal
        )
    }
}

/// Error body returned by every failing route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {detail}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl ApiError {
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
            field: None,
            allowed: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_allowed(mut self, allowed: Vec<String>) -> Self {
        self.allowed = Some(allowed);
        self
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, detail)
    }
}
