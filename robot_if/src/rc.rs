//! # Remote control keys
//!
//! The handheld IR transmitter emits one code per button press. The receiver driver decodes these
//! into the fixed [`RcKey`] symbol set below, which is all the control core ever sees.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Every key on the transmitter, in pad order.
pub const ALL_KEYS: [RcKey; 21] = [
    RcKey::Power,
    RcKey::Red,
    RcKey::Green,
    RcKey::Blue,
    RcKey::Cross,
    RcKey::Square,
    RcKey::Triangle,
    RcKey::TopLeft,
    RcKey::Top,
    RcKey::TopRight,
    RcKey::Left,
    RcKey::Play,
    RcKey::Right,
    RcKey::BottomLeft,
    RcKey::Bottom,
    RcKey::BottomRight,
    RcKey::Plus,
    RcKey::Minus,
    RcKey::X,
    RcKey::Y,
    RcKey::Z,
];

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A key on the remote control transmitter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RcKey {
    Power,
    Red,
    Green,
    Blue,
    Cross,
    Square,
    Triangle,
    TopLeft,
    Top,
    TopRight,
    Left,
    Play,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
    Plus,
    Minus,
    X,
    Y,
    Z,
}

/// Error returned when a string does not name a remote control key.
#[derive(Debug, Error, Eq, PartialEq)]
#[error("\"{0}\" is not a recognised remote control key")]
pub struct RcKeyParseError(pub String);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RcKey {
    /// The name of the key as printed on the transmitter pad, as used in scripts.
    pub fn name(&self) -> &'static str {
        match self {
            RcKey::Power => "POWER",
            RcKey::Red => "RED",
            RcKey::Green => "GREEN",
            RcKey::Blue => "BLUE",
            RcKey::Cross => "CROSS",
            RcKey::Square => "SQUARE",
            RcKey::Triangle => "TRIANGLE",
            RcKey::TopLeft => "TOP_LEFT",
            RcKey::Top => "TOP",
            RcKey::TopRight => "TOP_RIGHT",
            RcKey::Left => "LEFT",
            RcKey::Play => "PLAY",
            RcKey::Right => "RIGHT",
            RcKey::BottomLeft => "BOTTOM_LEFT",
            RcKey::Bottom => "BOTTOM",
            RcKey::BottomRight => "BOTTOM_RIGHT",
            RcKey::Plus => "PLUS",
            RcKey::Minus => "MINUS",
            RcKey::X => "X",
            RcKey::Y => "Y",
            RcKey::Z => "Z",
        }
    }

    /// Returns true if the key is one of the eight direction keys of the pad.
    pub fn is_direction(&self) -> bool {
        matches!(
            self,
            RcKey::TopLeft
                | RcKey::Top
                | RcKey::TopRight
                | RcKey::Left
                | RcKey::Right
                | RcKey::BottomLeft
                | RcKey::Bottom
                | RcKey::BottomRight
        )
    }
}

impl FromStr for RcKey {
    type Err = RcKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();

        ALL_KEYS
            .iter()
            .find(|k| k.name() == upper)
            .copied()
            .ok_or_else(|| RcKeyParseError(s.to_string()))
    }
}

impl Display for RcKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
