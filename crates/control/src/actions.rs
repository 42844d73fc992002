use std::{borrow::Cow, sync::Arc};

use catalog::{CatalogEntry, CombinationCatalog};
use input::{play, InputDriver, InputStep};
use shared::{
    domain::{step_size_in_range, Action, ActionParseError, Direction},
    error::{ApiError, ErrorCode},
    protocol::ActionOutcome,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{sequences, session::SessionStore};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("no class+map combination selected")]
    NoContext,
    #[error("{0}")]
    UnsupportedContext(String),
    #[error("invalid direction '{given}', must be one of: up, down, left, right")]
    InvalidDirection { given: String },
    #[error("session step size {0} is outside 0.1..=3.0")]
    InvalidStepSize(f64),
    #[error("unknown action {family}/{name}")]
    UnknownAction { family: String, name: String },
    #[error("{action} failed: {source:#}")]
    Dispatch {
        action: Action,
        #[source]
        source: anyhow::Error,
    },
}

impl From<ActionParseError> for ActionError {
    fn from(value: ActionParseError) -> Self {
        match value {
            ActionParseError::UnknownAction { family, name } => {
                ActionError::UnknownAction { family, name }
            }
            ActionParseError::InvalidDirection { given } => ActionError::InvalidDirection { given },
        }
    }
}

impl From<ActionError> for ApiError {
    fn from(value: ActionError) -> Self {
        let detail = value.to_string();
        match value {
            ActionError::NoContext => ApiError::new(ErrorCode::NoContext, detail),
            ActionError::UnsupportedContext(_) => {
                ApiError::new(ErrorCode::UnsupportedContext, detail)
            }
            ActionError::InvalidDirection { .. } => {
                ApiError::new(ErrorCode::InvalidDirection, detail)
                    .with_field("direction")
                    .with_allowed(Direction::valid_names())
            }
            ActionError::InvalidStepSize(_) => {
                ApiError::new(ErrorCode::InvalidStepSize, detail).with_field("step_size")
            }
            ActionError::UnknownAction { .. } => ApiError::new(ErrorCode::UnknownAction, detail),
            ActionError::Dispatch { .. } => ApiError::internal(detail),
        }
    }
}

struct Plan {
    steps: Cow<'static, [InputStep]>,
    message: String,
    duration_ms: Option<u64>,
}

impl Plan {
    fn fixed(steps: &'static [InputStep], message: impl Into<String>) -> Self {
        Self {
            steps: Cow::Borrowed(steps),
            message: message.into(),
            duration_ms: None,
        }
    }
}

/// Resolves actions against the current session and plays the matching input.
pub struct ActionRouter {
    session: Arc<SessionStore>,
    catalog: Arc<CombinationCatalog>,
    driver: Arc<dyn InputDriver>,
}

impl ActionRouter {
    pub fn new(
        session: Arc<SessionStore>,
        catalog: Arc<CombinationCatalog>,
        driver: Arc<dyn InputDriver>,
    ) -> Self {
        Self {
            session,
            catalog,
            driver,
        }
    }

    /// Entry point for `/action/{family}/{name}`.
    pub async fn dispatch(&self, family: &str, name: &str) -> Result<ActionOutcome, ActionError> {
        let action = Action::parse(family, name)?;
        self.perform(action).await
    }

    pub async fn perform(&self, action: Action) -> Result<ActionOutcome, ActionError> {
        let plan = self.plan(action).await?;
        play(self.driver.as_ref(), &plan.steps)
            .await
            .map_err(|source| {
                warn!(%action, error = %format!("{source:#}"), "input dispatch failed");
                ActionError::Dispatch { action, source }
            })?;
        info!(%action, "action executed");

        let outcome = ActionOutcome::done(plan.message);
        Ok(match plan.duration_ms {
            Some(ms) => outcome.with_duration(ms),
            None => outcome,
        })
    }

    async fn plan(&self, action: Action) -> Result<Plan, ActionError> {
        let plan = match action {
            Action::ClassInit => {
                let entry = self.context().await?;
                Plan::fixed(
                    sequences::class_init(entry.class),
                    format!("{} class initialized", entry.class.display_name()),
                )
            }
            Action::MapNavigate => {
                let entry = self.context().await?;
                let map = known_map(&entry)?;
                let steps = sequences::map_navigation(map);
                if steps.is_empty() {
                    return Err(ActionError::UnsupportedContext(format!(
                        "no navigation route recorded for {}",
                        map.display_name()
                    )));
                }
                Plan::fixed(steps, format!("Navigated to {}", map.display_name()))
            }
            Action::MapPosition => {
                let entry = self.context().await?;
                let map = known_map(&entry)?;
                let steps = sequences::map_position(map);
                if steps.is_empty() {
                    return Err(ActionError::UnsupportedContext(format!(
                        "no farming position recorded for {}",
                        map.display_name()
                    )));
                }
                Plan::fixed(
                    steps,
                    format!("Positioned for {} farming", map.display_name()),
                )
            }
            Action::Move(direction) => self.movement(direction).await?,
            Action::DoubleJump => Plan::fixed(sequences::DOUBLE_JUMP, "Double jump executed"),
            Action::JumpDown => Plan::fixed(sequences::JUMP_DOWN, "Jump down executed"),
            Action::RopeUp => Plan::fixed(sequences::ROPE_UP, "Rope up executed"),
            Action::Interact => Plan::fixed(sequences::INTERACT, "Interact executed"),
            Action::GoToTown => Plan::fixed(sequences::GO_TO_TOWN, "Go to town executed"),
            Action::UseConsumables => {
                Plan::fixed(sequences::USE_CONSUMABLES, "Use consumables executed")
            }
            Action::ChangeChannel => {
                Plan::fixed(sequences::CHANGE_CHANNEL, "Channel changed successfully")
            }
            Action::QuickTravelSetup => Plan::fixed(
                sequences::QUICK_TRAVEL_SETUP,
                "Quick travel menu opened - manual selection ready",
            ),
            Action::InventoryManagement => Plan::fixed(
                sequences::INVENTORY_MANAGEMENT,
                "Inventory management completed",
            ),
        };
        Ok(plan)
    }

    async fn context(&self) -> Result<CatalogEntry, ActionError> {
        let Some(id) = self.session.get().await.selected_combination_id else {
            return Err(ActionError::NoContext);
        };
        self.catalog
            .resolve(&id)
            .cloned()
            .map_err(|_| {
                ActionError::UnsupportedContext(format!(
                    "combination '{id}' is not in the catalog"
                ))
            })
    }

    async fn movement(&self, direction: Direction) -> Result<Plan, ActionError> {
        let step_size = self.session.get().await.step_size;
        if !step_size_in_range(step_size) {
            return Err(ActionError::InvalidStepSize(step_size));
        }
        let duration_ms = sequences::movement_duration_ms(direction, step_size);
        let steps = vec![
            InputStep::tap(sequences::direction_key(direction), duration_ms),
            InputStep::wait(sequences::MOVEMENT_SETTLE_MS),
        ];
        Ok(Plan {
            steps: Cow::Owned(steps),
            message: format!(
                "{} {direction} movement executed ({duration_ms}ms)",
                sequences::step_label(step_size)
            ),
            duration_ms: Some(duration_ms),
        })
    }
}

fn known_map(entry: &CatalogEntry) -> Result<catalog::KnownMap, ActionError> {
    entry.map.ok_or_else(|| {
        ActionError::UnsupportedContext(format!(
            "no recorded routes for map {}",
            entry.combination.map_name
        ))
    })
}

#[cfg(test)]
#[path = "tests/actions_tests.rs"]
mod tests;
