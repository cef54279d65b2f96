//! Open loop movement strategy

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use robot_if::eqpt::{EqptProvider, TwoWheelDrive};

use super::MovementCmd;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Passes wheel demands straight through to the two wheel drive.
pub struct DirectDrive {
    drive: Box<dyn TwoWheelDrive>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DirectDrive {
    /// Acquire the two wheel drive. Nothing is actuated until the first command.
    pub fn connect(eqpt: &mut dyn EqptProvider) -> Self {
        Self {
            drive: eqpt.two_wheel_drive(),
        }
    }

    pub fn set(&mut self, cmd: MovementCmd) {
        trace!("DirectDrive go ({:.3}, {:.3})", cmd.left, cmd.right);
        self.drive.go(cmd.left, cmd.right);
    }

    pub fn stop(&mut self) {
        self.drive.stop();
    }

    /// Release the drive.
    pub fn teardown(self) {
        drop(self.drive);
    }
}
