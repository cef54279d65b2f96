//! Global robot state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State shared by every mode.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct RobotState {
    /// If false the drive keys and Auto sampling do nothing
    pub power_on: bool,

    /// Scale applied to all drive demands, in [0, 1]
    pub speed: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotState {
    /// Change the speed scale by `delta`, saturating at the ends of [0, 1].
    ///
    /// Returns the new speed.
    pub fn adjust_speed(&mut self, delta: f64) -> f64 {
        let speed = util::maths::clamp(&(self.speed + delta), &0.0, &1.0);

        // Keep repeated steps from drifting off the 0.1 grid
        self.speed = util::maths::round_to(speed, 6);
        self.speed
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
