//! # Equipment Interface
//!
//! This module defines the interfaces through which the control core talks to the robot's
//! equipment. The drivers behind these traits (PWM, IR decoding, echo timing and so on) live outside
//! the core, the core only ever holds boxed trait objects handed out by an [`EqptProvider`].
//!
//! Handles are acquired when a component starts and dropped when it stops, so that a component
//! which is not active holds no equipment at all.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Identifies one of the two driven wheels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Wheel {
    Left,
    Right,
}

/// Errors reported by equipment.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EqptError {
    #[error("No echo was received within the ranging window")]
    RangeTimeout,

    #[error("Ranging sensor returned an out of range reading ({0} cm)")]
    RangeInvalid(f64),

    #[error("Equipment is not connected: {0}")]
    NotConnected(&'static str),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Two wheel drive actuator which drives both wheels from a single demand.
pub trait TwoWheelDrive {
    /// Drive both wheels, each demand is a signed fraction of full speed in [-1, 1].
    fn go(&mut self, left: f64, right: f64);

    /// Bring both wheels to a full halt.
    fn stop(&mut self);
}

/// A single motor channel.
pub trait Motor {
    /// Write a signed duty fraction in [-1, 1] to the motor.
    fn write(&mut self, duty: f64);
}

/// Wheel encoder subscription.
///
/// Pulses themselves are delivered as events by the event loop, this handle only controls the
/// subscription.
pub trait Encoder {
    /// Stop delivering pulses from this encoder.
    fn detach(&mut self);
}

/// Ultrasonic ranging sensor.
pub trait RangeSensor {
    /// Perform one range measurement.
    ///
    /// Units: centimeters
    fn ping(&mut self) -> Result<f64, EqptError>;
}

/// Analog line sensor.
pub trait LineSensor {
    /// Read the normalised reflectance, in [0, 1].
    fn read(&mut self) -> f64;
}

/// Indicator light.
pub trait Indicator {
    fn turn_on(&mut self);

    fn turn_off(&mut self);

    /// Blink the indicator. With no `off` duration this is a single flash of length `on`.
    fn blink(&mut self, on: Duration, off: Option<Duration>);
}

/// Positional servo.
pub trait Servo {
    /// Write an absolute angle.
    ///
    /// Units: degrees
    fn write(&mut self, angle_deg: f64);
}

/// Source of equipment handles.
///
/// Every call hands out a freshly connected handle. Dropping the handle releases the equipment.
pub trait EqptProvider {
    fn two_wheel_drive(&mut self) -> Box<dyn TwoWheelDrive>;

    /// Independent motors for the `(left, right)` wheels.
    fn wheel_motors(&mut self) -> (Box<dyn Motor>, Box<dyn Motor>);

    /// Encoders for the `(left, right)` wheels.
    fn wheel_encoders(&mut self) -> (Box<dyn Encoder>, Box<dyn Encoder>);

    fn range_sensor(&mut self) -> Box<dyn RangeSensor>;

    /// Line sensors on the `(left, right)` of the chassis.
    fn line_sensors(&mut self) -> (Box<dyn LineSensor>, Box<dyn LineSensor>);

    fn head_servo(&mut self) -> Box<dyn Servo>;

    fn indicator(&mut self) -> Box<dyn Indicator>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Wheel {
    /// Index of the wheel in per-wheel arrays, left first.
    pub fn index(&self) -> usize {
        match self {
            Wheel::Left => 0,
            Wheel::Right => 1,
        }
    }
}
