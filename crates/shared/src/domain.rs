use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_STEP_SIZE: f64 = 0.1;
pub const MAX_STEP_SIZE: f64 = 3.0;
pub const DEFAULT_STEP_SIZE: f64 = 1.0;

pub fn step_size_in_range(step_size: f64) -> bool {
    (MIN_STEP_SIZE..=MAX_STEP_SIZE).contains(&step_size)
}

/// Key of a class+map combination, equal to the stem of the script it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombinationId(pub String);

impl CombinationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMapCombination {
    pub id: CombinationId,
    pub class_name: String,
    pub map_name: String,
    pub script_name: String,
    pub has_image: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub selected_combination_id: Option<CombinationId>,
    pub step_size: f64,
    pub last_updated: DateTime<Utc>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            selected_combination_id: None,
            step_size: DEFAULT_STEP_SIZE,
            last_updated: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Stopped,
}

impl fmt::Display for MacroStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MacroStatus::Idle => "idle",
            MacroStatus::Running => "running",
            MacroStatus::Paused => "paused",
            MacroStatus::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MacroProcessHandle {
    pub status: MacroStatus,
    pub current_script: Option<String>,
    pub pid: Option<u32>,
}

impl MacroProcessHandle {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, MacroStatus::Running | MacroStatus::Paused)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == raw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn valid_names() -> Vec<String> {
        Self::ALL.iter().map(|d| d.as_str().to_string()).collect()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every action the router knows, addressed over HTTP as `{family}/{name}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ClassInit,
    MapNavigate,
    MapPosition,
    Move(Direction),
    DoubleJump,
    JumpDown,
    RopeUp,
    Interact,
    GoToTown,
    UseConsumables,
    ChangeChannel,
    QuickTravelSetup,
    InventoryManagement,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionParseError {
    #[error("unknown action {family}/{name}")]
    UnknownAction { family: String, name: String },
    #[error("invalid direction '{given}', must be one of: up, down, left, right")]
    InvalidDirection { given: String },
}

impl Action {
    pub fn parse(family: &str, name: &str) -> Result<Self, ActionParseError> {
        let action = match (family, name) {
            ("class", "init") => Action::ClassInit,
            ("map", "navigate") => Action::MapNavigate,
            ("map", "position") => Action::MapPosition,
            ("movement", "double_jump") => Action::DoubleJump,
            ("movement", "jump_down") => Action::JumpDown,
            ("movement", "rope_up") => Action::RopeUp,
            ("movement", "interact") => Action::Interact,
            ("movement", other) => {
                return Direction::parse(other).map(Action::Move).ok_or_else(|| {
                    ActionParseError::InvalidDirection {
                        given: other.to_string(),
                    }
                })
            }
            ("utility", "go_to_town") => Action::GoToTown,
            ("utility", "use_consumables") => Action::UseConsumables,
            ("utility", "change_channel") => Action::ChangeChannel,
            ("utility", "quick_travel_setup") => Action::QuickTravelSetup,
            ("utility", "inventory_management") => Action::InventoryManagement,
            _ => {
                return Err(ActionParseError::UnknownAction {
                    family: family.to_string(),
                    name: name.to_string(),
                })
            }
        };
        Ok(action)
    }

    pub fn path(self) -> String {
        let (family, name) = match self {
            Action::ClassInit => ("class", "init"),
            Action::MapNavigate => ("map", "navigate"),
            Action::MapPosition => ("map", "position"),
            Action::Move(direction) => ("movement", direction.as_str()),
            Action::DoubleJump => ("movement", "double_jump"),
            Action::JumpDown => ("movement", "jump_down"),
            Action::RopeUp => ("movement", "rope_up"),
            Action::Interact => ("movement", "interact"),
            Action::GoToTown => ("utility", "go_to_town"),
            Action::UseConsumables => ("utility", "use_consumables"),
            Action::ChangeChannel => ("utility", "change_channel"),
            Action::QuickTravelSetup => ("utility", "quick_travel_setup"),
            Action::InventoryManagement => ("utility", "inventory_management"),
        };
        format!("{family}/{name}")
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
