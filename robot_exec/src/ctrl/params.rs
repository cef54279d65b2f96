//! Parameters structure for RobotCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::{mode::ModeId, movement::MovementKind};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the robot controller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CtrlParams {
    // ---- REMOTE ----

    /// Remote events arriving within this time of the last accepted event are dropped.
    ///
    /// Units: milliseconds
    pub debounce_ms: u64,

    /// Length of the indicator flash acknowledging an accepted event.
    ///
    /// Units: milliseconds
    pub ack_blink_ms: u64,

    // ---- SPEED ----

    /// Speed scale at startup, in [0, 1]
    pub initial_speed: f64,

    /// Change in speed scale per `PLUS`/`MINUS` press
    pub speed_step: f64,

    // ---- STARTUP ----

    pub initial_power_on: bool,

    pub initial_movement: MovementKind,

    pub initial_mode: ModeId,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CtrlParams {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            ack_blink_ms: 300,
            initial_speed: 0.7,
            speed_step: 0.1,
            initial_power_on: true,
            initial_movement: MovementKind::DirectDrive,
            initial_mode: ModeId::Manual,
        }
    }
}

impl CtrlParams {
    pub fn are_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.initial_speed)
            && self.speed_step > 0.0
            && self.speed_step <= 1.0
    }
}
