//! # Operating modes
//!
//! The robot always runs exactly one of four modes:
//!
//! - `Manual` - the directional keys drive the robot for as long as the last command stands.
//! - `Hold` - as manual, but the robot stops if no drive key is pressed for a short while.
//! - `Auto` - the robot keeps its distance from whatever is in front of the ranging sensor.
//! - `Line` - the robot follows a line using a pair of line sensors and a PID controller.
//!
//! Modes are switched by the [`RobotCtrl`](crate::ctrl::RobotCtrl), which always fully stops the
//! outgoing mode before starting the incoming one. A mode only touches the robot through the
//! [`ModeCtx`] it is lent for the duration of a call.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod auto;
mod hold;
mod line;
mod manual;
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use self::{
    auto::Auto,
    hold::Hold,
    line::Line,
    manual::Manual,
    params::{AutoParams, HoldParams, LineParams},
};

use robot_if::{eqpt::{EqptProvider, Indicator}, rc::RcKey};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr, time::Duration};

use crate::{
    ctrl::RobotState,
    movement::Movement,
    params::ExecParams,
    sched::{Scheduler, TimerHandle},
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// An operating mode.
pub trait Mode {
    fn id(&self) -> ModeId;

    /// Acquire the mode's equipment and arm its timers.
    fn start(&mut self, ctx: &mut ModeCtx);

    /// Cancel the mode's timers, release its equipment and halt the robot.
    fn stop(&mut self, ctx: &mut ModeCtx);

    /// Handle a remote key that wasn't consumed by the controller.
    fn handle_key(&mut self, key: RcKey, ctx: &mut ModeCtx);

    /// Handle one of the mode's timers firing.
    fn on_timer(&mut self, handle: TimerHandle, ctx: &mut ModeCtx);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Everything a mode may touch during one call.
pub struct ModeCtx<'a> {
    pub state: &'a RobotState,

    /// Whether the head is taking the directional keys
    pub head_enabled: bool,

    pub movement: &'a mut Movement,

    pub indicator: &'a mut dyn Indicator,

    pub sched: &'a mut Scheduler<ModeId>,

    pub eqpt: &'a mut dyn EqptProvider,

    /// Time the triggering event happened at
    pub now: Duration,
}

/// The fixed set of modes.
pub struct ModeRegistry {
    manual: Manual,
    hold: Hold,
    auto: Auto,
    line: Line,
}

/// A drive demand for a directional key.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DriveDemand {
    pub left: f64,
    pub right: f64,

    /// The demand moves the robot backwards
    pub reversing: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Identifies an operating mode.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeId {
    Manual,
    Hold,
    Auto,
    Line,
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[error("\"{0}\" is not a mode, expected one of manual, hold, auto or line")]
pub struct ModeIdParseError(pub String);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<'a> ModeCtx<'a> {
    /// Whether the directional keys should drive the robot.
    pub fn drive_keys_enabled(&self) -> bool {
        self.state.power_on && !self.head_enabled
    }
}

impl ModeRegistry {
    pub fn new(params: &ExecParams) -> Self {
        Self {
            manual: Manual::new(),
            hold: Hold::new(params.hold.clone()),
            auto: Auto::new(params.auto.clone()),
            line: Line::new(params.line.clone()),
        }
    }

    pub fn get_mut(&mut self, id: ModeId) -> &mut dyn Mode {
        match id {
            ModeId::Manual => &mut self.manual,
            ModeId::Hold => &mut self.hold,
            ModeId::Auto => &mut self.auto,
            ModeId::Line => &mut self.line,
        }
    }
}

impl ModeId {
    /// The mode selected by a key, if any.
    pub fn from_key(key: RcKey) -> Option<Self> {
        match key {
            RcKey::Red => Some(ModeId::Manual),
            RcKey::Green => Some(ModeId::Auto),
            RcKey::Blue => Some(ModeId::Line),
            RcKey::Triangle => Some(ModeId::Hold),
            _ => None,
        }
    }
}

impl Display for ModeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ModeId::Manual => "Manual",
            ModeId::Hold => "Hold",
            ModeId::Auto => "Auto",
            ModeId::Line => "Line",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ModeId {
    type Err = ModeIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(ModeId::Manual),
            "hold" => Ok(ModeId::Hold),
            "auto" => Ok(ModeId::Auto),
            "line" => Ok(ModeId::Line),
            _ => Err(ModeIdParseError(s.to_string())),
        }
    }
}

impl DriveDemand {
    /// The demand for a directional key at speed scale `s`, or `None` if the key doesn't drive.
    ///
    /// Diagonal keys spin the robot on the spot, the bottom diagonals spin it the opposite way
    /// to the top ones.
    pub fn for_key(key: RcKey, s: f64) -> Option<Self> {
        let (left, right, reversing) = match key {
            RcKey::Left => (0.0, s, false),
            RcKey::Right => (s, 0.0, false),
            RcKey::Top => (s, s, false),
            RcKey::Bottom => (-s, -s, true),
            RcKey::TopLeft => (-s, s, false),
            RcKey::TopRight => (s, -s, false),
            RcKey::BottomLeft => (s, -s, true),
            RcKey::BottomRight => (-s, s, true),
            _ => return None,
        };

        Some(Self {
            left,
            right,
            reversing,
        })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

/// Owned pieces a [`ModeCtx`] can be lent from, for testing modes on their own.
#[cfg(test)]
pub(crate) struct CtxFixture {
    pub eqpt: crate::sim::SimEqpt,
    pub state: RobotState,
    pub head_enabled: bool,
    pub movement: Movement,
    pub indicator: Box<dyn Indicator>,
    pub sched: Scheduler<ModeId>,
}

#[cfg(test)]
impl CtxFixture {
    pub fn new() -> Self {
        use crate::movement::{CruiseParams, MovementKind};

        let mut eqpt = crate::sim::SimEqpt::new(crate::sim::SimParams::default());
        let movement = Movement::connect(MovementKind::DirectDrive, &CruiseParams::default(), &mut eqpt);
        let indicator = eqpt.indicator();

        Self {
            eqpt,
            state: RobotState {
                power_on: true,
                speed: 0.5,
            },
            head_enabled: false,
            movement,
            indicator,
            sched: Scheduler::new(),
        }
    }

    pub fn ctx(&mut self, now: Duration) -> ModeCtx<'_> {
        ModeCtx {
            state: &self.state,
            head_enabled: self.head_enabled,
            movement: &mut self.movement,
            indicator: self.indicator.as_mut(),
            sched: &mut self.sched,
            eqpt: &mut self.eqpt,
            now,
        }
    }

    /// Drain the actuations made so far.
    pub fn take_actuations(&self) -> Vec<crate::sim::Actuation> {
        self.eqpt.world().borrow_mut().take_actuations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_if::rc::ALL_KEYS;

    #[test]
    fn test_mode_keys() {
        let modes: Vec<_> = ALL_KEYS.iter().filter_map(|k| ModeId::from_key(*k)).collect();
        assert_eq!(
            modes,
            vec![ModeId::Manual, ModeId::Auto, ModeId::Line, ModeId::Hold]
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!("Line".parse::<ModeId>(), Ok(ModeId::Line));
        assert_eq!(" hold ".parse::<ModeId>(), Ok(ModeId::Hold));
        assert!("cruise".parse::<ModeId>().is_err());
    }

    #[test]
    fn test_only_direction_keys_drive() {
        for key in ALL_KEYS.iter() {
            assert_eq!(DriveDemand::for_key(*key, 0.5).is_some(), key.is_direction());
        }

        let d = DriveDemand::for_key(RcKey::BottomLeft, 0.5).unwrap();
        assert_eq!((d.left, d.right, d.reversing), (0.5, -0.5, true));
    }
}
