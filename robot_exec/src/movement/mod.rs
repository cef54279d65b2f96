//! # Movement module
//!
//! The movement strategy converts normalised wheel demands into actuation. Two strategies exist:
//!
//! - [`DirectDrive`] - open loop, demands are passed straight to the two wheel drive.
//! - [`CruiseCtrl`] - closed loop, each wheel's duty is regulated from encoder feedback.
//!
//! Exactly one strategy is active at any time. Swapping strategies consumes the old one through
//! [`Movement::teardown`], so a strategy can't be commanded once its equipment has been released.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cruise_ctrl;
mod direct_drive;
mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use cruise_ctrl::{ChannelState, CruiseCtrl};
pub use direct_drive::DirectDrive;
pub use params::CruiseParams;

use log::info;
use robot_if::eqpt::{EqptProvider, Wheel};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A pair of wheel demands.
///
/// Each demand is a signed fraction of full speed, the sign giving the direction. Values are
/// clamped into [-1, 1] on construction.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct MovementCmd {
    pub left: f64,
    pub right: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Identifies a movement strategy.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    DirectDrive,
    CruiseCtrl,
}

/// The active movement strategy.
pub enum Movement {
    DirectDrive(DirectDrive),
    CruiseCtrl(CruiseCtrl),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MovementCmd {
    pub fn new(left: f64, right: f64) -> Self {
        Self {
            left: util::maths::clamp(&left, &-1.0, &1.0),
            right: util::maths::clamp(&right, &-1.0, &1.0),
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

impl MovementKind {
    /// The strategy a swap moves to.
    pub fn other(&self) -> Self {
        match self {
            MovementKind::DirectDrive => MovementKind::CruiseCtrl,
            MovementKind::CruiseCtrl => MovementKind::DirectDrive,
        }
    }
}

impl Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementKind::DirectDrive => write!(f, "DirectDrive"),
            MovementKind::CruiseCtrl => write!(f, "CruiseCtrl"),
        }
    }
}

impl Movement {
    /// Acquire the equipment for a strategy of the given kind.
    ///
    /// The strategy is not started, and nothing is actuated.
    pub fn connect(kind: MovementKind, params: &CruiseParams, eqpt: &mut dyn EqptProvider) -> Self {
        info!("Connecting {} movement", kind);

        match kind {
            MovementKind::DirectDrive => Movement::DirectDrive(DirectDrive::connect(eqpt)),
            MovementKind::CruiseCtrl => Movement::CruiseCtrl(CruiseCtrl::connect(params, eqpt)),
        }
    }

    pub fn kind(&self) -> MovementKind {
        match self {
            Movement::DirectDrive(_) => MovementKind::DirectDrive,
            Movement::CruiseCtrl(_) => MovementKind::CruiseCtrl,
        }
    }

    pub fn start(&mut self, now: Duration) {
        match self {
            Movement::DirectDrive(_) => (),
            Movement::CruiseCtrl(c) => c.start(now),
        }
    }

    /// Command the wheels, demands outside [-1, 1] are clamped.
    pub fn set(&mut self, left: f64, right: f64) {
        let cmd = MovementCmd::new(left, right);

        match self {
            Movement::DirectDrive(d) => d.set(cmd),
            Movement::CruiseCtrl(c) => c.set(cmd),
        }
    }

    pub fn stop(&mut self) {
        match self {
            Movement::DirectDrive(d) => d.stop(),
            Movement::CruiseCtrl(c) => c.stop(),
        }
    }

    /// Release the strategy's equipment.
    pub fn teardown(self) {
        info!("Tearing down {} movement", self.kind());

        match self {
            Movement::DirectDrive(d) => d.teardown(),
            Movement::CruiseCtrl(c) => c.teardown(),
        }
    }

    /// Feed an encoder pulse to the strategy, only cruise control uses them.
    pub fn on_pulse(&mut self, wheel: Wheel, now: Duration) {
        if let Movement::CruiseCtrl(c) = self {
            c.on_pulse(wheel, now);
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
