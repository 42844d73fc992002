//! Recorded input routes. Timings come from captures of the game client and
//! are not meant to be tuned per request.

use catalog::{GameClass, KnownMap};
use input::InputStep;
use shared::domain::Direction;

const TAP_MS: u64 = 100;
pub const MOVEMENT_SETTLE_MS: u64 = 100;

pub const DOUBLE_JUMP: &[InputStep] = &[
    InputStep::tap("Space", 50),
    InputStep::wait(100),
    InputStep::tap("Space", 50),
    InputStep::wait(300),
];

pub const JUMP_DOWN: &[InputStep] = &[InputStep::chord("Down", "Space", 50), InputStep::wait(1000)];

pub const ROPE_UP: &[InputStep] = &[InputStep::tap("End", 200), InputStep::wait(2000)];

pub const INTERACT: &[InputStep] = &[InputStep::tap("y", TAP_MS), InputStep::wait(100)];

pub const GO_TO_TOWN: &[InputStep] = &[
    InputStep::tap("=", TAP_MS),
    InputStep::wait(500),
    InputStep::click(1150, 642),
    InputStep::wait(5000),
    InputStep::tap("Escape", TAP_MS),
];

pub const USE_CONSUMABLES: &[InputStep] = &[
    InputStep::tap("f7", TAP_MS),
    InputStep::wait(300),
    InputStep::tap("f8", TAP_MS),
    InputStep::wait(300),
    InputStep::tap("f9", TAP_MS),
    InputStep::wait(300),
    InputStep::tap("f10", TAP_MS),
    InputStep::wait(300),
    InputStep::tap("f11", TAP_MS),
    InputStep::wait(300),
    InputStep::tap("f12", TAP_MS),
    InputStep::wait(300),
];

pub const CHANGE_CHANNEL: &[InputStep] = &[
    InputStep::tap("Escape", TAP_MS),
    InputStep::wait(200),
    InputStep::tap("Enter", TAP_MS),
    InputStep::wait(200),
    InputStep::tap("Right", TAP_MS),
    InputStep::wait(200),
    InputStep::tap("Enter", TAP_MS),
    InputStep::wait(5000),
];

/// Opens the travel menu and leaves it up for a manual pick.
pub const QUICK_TRAVEL_SETUP: &[InputStep] = &[InputStep::tap("=", TAP_MS), InputStep::wait(500)];

/// Double-clicks each consumable slot of the 2x3 inventory grid.
pub const INVENTORY_MANAGEMENT: &[InputStep] = &[
    InputStep::tap("i", TAP_MS),
    InputStep::wait(500),
    InputStep::click(1538, 600),
    InputStep::wait(100),
    InputStep::click(1538, 600),
    InputStep::wait(200),
    InputStep::click(1435, 600),
    InputStep::wait(100),
    InputStep::click(1435, 600),
    InputStep::wait(200),
    InputStep::click(1360, 600),
    InputStep::wait(100),
    InputStep::click(1360, 600),
    InputStep::wait(200),
    InputStep::click(1360, 525),
    InputStep::wait(100),
    InputStep::click(1360, 525),
    InputStep::wait(200),
    InputStep::click(1435, 525),
    InputStep::wait(100),
    InputStep::click(1435, 525),
    InputStep::wait(200),
    InputStep::click(1538, 525),
    InputStep::wait(100),
    InputStep::click(1538, 525),
    InputStep::wait(200),
    InputStep::tap("i", TAP_MS),
];

const DARK_KNIGHT_INIT: &[InputStep] = &[
    InputStep::tap("0", TAP_MS),
    InputStep::wait(1000),
    InputStep::tap("g", TAP_MS),
    InputStep::wait(1000),
    InputStep::tap("pgdn", TAP_MS),
    InputStep::wait(500),
    InputStep::tap("right", TAP_MS),
    InputStep::wait(500),
];

const NIGHT_WALKER_INIT: &[InputStep] = &[
    InputStep::tap("0", TAP_MS),
    InputStep::wait(500),
    InputStep::tap("9", TAP_MS),
    InputStep::wait(500),
    InputStep::tap("g", TAP_MS),
    InputStep::wait(500),
];

const BOTTOM_DECK_PASSAGE_3_NAV: &[InputStep] = &[
    InputStep::tap("=", TAP_MS),
    InputStep::wait(200),
    InputStep::tap("=", TAP_MS),
    InputStep::wait(500),
    InputStep::click(725, 1075),
    InputStep::wait(1000),
    InputStep::click(1180, 986),
    InputStep::wait(5000),
    InputStep::tap("Escape", TAP_MS),
];

const BOTTOM_DECK_PASSAGE_3_POSITION: &[InputStep] =
    &[InputStep::tap("left", 1200), InputStep::wait(500)];

pub fn class_init(class: GameClass) -> &'static [InputStep] {
    match class {
        GameClass::DarkKnight => DARK_KNIGHT_INIT,
        GameClass::NightWalker => NIGHT_WALKER_INIT,
    }
}

/// Empty when no route has been recorded for the map yet.
pub fn map_navigation(map: KnownMap) -> &'static [InputStep] {
    match map {
        KnownMap::BottomDeckPassage3 => BOTTOM_DECK_PASSAGE_3_NAV,
        // TODO: record the Laboratory Behind Closed Door 3 travel-menu coordinates.
        KnownMap::LaboratoryBehindClosedDoor3 => &[],
    }
}

pub fn map_position(map: KnownMap) -> &'static [InputStep] {
    match map {
        KnownMap::BottomDeckPassage3 => BOTTOM_DECK_PASSAGE_3_POSITION,
        KnownMap::LaboratoryBehindClosedDoor3 => &[],
    }
}

pub fn base_duration_ms(direction: Direction) -> u64 {
    match direction {
        Direction::Up | Direction::Down => 300,
        Direction::Left | Direction::Right => 1200,
    }
}

/// Truncates toward zero, so `0.41 * 300` is 122ms, not 123ms.
pub fn movement_duration_ms(direction: Direction, step_size: f64) -> u64 {
    (base_duration_ms(direction) as f64 * step_size) as u64
}

pub fn direction_key(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "Up",
        Direction::Down => "Down",
        Direction::Left => "Left",
        Direction::Right => "Right",
    }
}

pub fn step_label(step_size: f64) -> &'static str {
    if step_size < 0.5 {
        "Tiny"
    } else if step_size < 1.0 {
        "Small"
    } else if step_size == 1.0 {
        "Medium"
    } else if step_size < 2.0 {
        "Large"
    } else {
        "Huge"
    }
}
