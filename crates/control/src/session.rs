use std::sync::Arc;

use catalog::CombinationCatalog;
use chrono::Utc;
use shared::{
    domain::{step_size_in_range, CombinationId, SessionState},
    error::{ApiError, ErrorCode},
    protocol::{Patch, SessionStateRequest},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("step_size must be between 0.1 and 3.0, got {0}")]
    StepSize(f64),
    #[error("unknown combination '{0}'")]
    UnknownCombination(CombinationId),
}

impl SessionError {
    pub fn field(&self) -> &'static str {
        match self {
            SessionError::StepSize(_) => "step_size",
            SessionError::UnknownCombination(_) => "combination_id",
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(value: SessionError) -> Self {
        let code = match value {
            SessionError::StepSize(_) => ErrorCode::Validation,
            SessionError::UnknownCombination(_) => ErrorCode::UnknownCombination,
        };
        ApiError::new(code, value.to_string()).with_field(value.field())
    }
}

/// The one operator session shared by every client.
pub struct SessionStore {
    catalog: Arc<CombinationCatalog>,
    state: Mutex<SessionState>,
}

impl SessionStore {
    pub fn new(catalog: Arc<CombinationCatalog>) -> Self {
        Self {
            catalog,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub async fn get(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Applies a partial update. Both fields are validated before anything is
    /// written, so a rejected update leaves the session untouched.
    pub async fn update(&self, request: SessionStateRequest) -> Result<SessionState, SessionError> {
        if let Some(step_size) = request.step_size {
            if !step_size_in_range(step_size) {
                return Err(SessionError::StepSize(step_size));
            }
        }
        if let Patch::Set(Some(id)) = &request.combination_id {
            if !self.catalog.contains(id) {
                return Err(SessionError::UnknownCombination(id.clone()));
            }
        }

        let mut state = self.state.lock().await;
        let mut changed = false;
        if let Patch::Set(selection) = request.combination_id {
            if state.selected_combination_id != selection {
                state.selected_combination_id = selection;
                changed = true;
            }
        }
        if let Some(step_size) = request.step_size {
            if state.step_size != step_size {
                state.step_size = step_size;
                changed = true;
            }
        }
        if changed {
            state.last_updated = Utc::now();
            info!(
                combination = ?state.selected_combination_id,
                step_size = state.step_size,
                "session updated"
            );
        }
        Ok(state.clone())
    }

    pub async fn clear(&self) -> SessionState {
        let mut state = self.state.lock().await;
        *state = SessionState::default();
        info!("session cleared");
        state.clone()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
