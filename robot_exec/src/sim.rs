//! # Simulated equipment
//!
//! [`SimEqpt`] hands out equipment handles which all act on one shared [`SimWorld`]. The world
//! records every actuation made through the handles, lets the caller set what the sensors read
//! (including injecting ranging failures), keeps count of which handles are currently held, and
//! generates encoder pulses from the demands last written to the wheels.
//!
//! The executable runs the control core against this world, and the tests use the actuation log
//! to check what the core did.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use robot_if::eqpt::{
    Encoder, EqptError, EqptProvider, Indicator, LineSensor, Motor, RangeSensor, Servo,
    TwoWheelDrive, Wheel,
};
use serde::Deserialize;
use std::{cell::RefCell, rc::Rc, time::Duration};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated world.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Range reading at the start of the simulation.
    ///
    /// Units: centimeters
    pub initial_distance_cm: f64,

    /// Closest the obstacle can get, the range reading never drops below this.
    ///
    /// Units: centimeters
    pub min_distance_cm: f64,

    /// Initial `(left, right)` line sensor readings.
    pub initial_line: (f64, f64),

    /// Wheel ground speed at full duty.
    ///
    /// Units: meters/second
    pub max_wheel_speed_ms: f64,

    /// Distance covered by one wheel revolution.
    ///
    /// Units: meters
    pub circumference_m: f64,

    /// Encoder pulses per wheel revolution.
    pub pulses_per_rev: u64,

    /// Which wheel motors are mounted mirrored, left then right.
    pub inverted: [bool; 2],
}

/// Number of handles of each kind currently held.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct AttachCounts {
    pub drive: usize,
    pub motors: usize,
    pub encoders: usize,
    pub range: usize,
    pub line: usize,
    pub servo: usize,
    pub indicator: usize,
}

/// State of the simulated world.
#[derive(Debug)]
pub struct SimWorld {
    params: SimParams,

    actuations: Vec<Actuation>,

    /// Actuations recorded over the world's lifetime, including any drained from the log
    num_recorded: u64,

    attached: AttachCounts,

    /// Result returned by the next ranging
    distance: Result<f64, EqptError>,

    line: (f64, f64),

    /// Forward positive demand on each wheel
    wheel_demand: [f64; 2],

    /// Which wheels have a live encoder subscription
    encoder_subscribed: [bool; 2],

    /// Fractional pulses carried over between calls to `advance`
    pulse_accum: [f64; 2],
}

/// Provider of simulated equipment.
#[derive(Debug, Clone)]
pub struct SimEqpt {
    world: Rc<RefCell<SimWorld>>,
}

struct SimDrive(Rc<RefCell<SimWorld>>);

struct SimMotor {
    world: Rc<RefCell<SimWorld>>,
    wheel: Wheel,
}

struct SimEncoder {
    world: Rc<RefCell<SimWorld>>,
    wheel: Wheel,
    detached: bool,
}

struct SimRange(Rc<RefCell<SimWorld>>);

struct SimLine {
    world: Rc<RefCell<SimWorld>>,
    wheel: Wheel,
}

struct SimServo(Rc<RefCell<SimWorld>>);

struct SimIndicator(Rc<RefCell<SimWorld>>);

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An actuation made through a simulated handle.
#[derive(Debug, Clone, PartialEq)]
pub enum Actuation {
    DriveGo { left: f64, right: f64 },
    DriveStop,
    Motor { wheel: Wheel, duty: f64 },
    EncoderDetach(Wheel),
    Servo(f64),
    IndicatorOn,
    IndicatorOff,
    IndicatorBlink { on: Duration, off: Option<Duration> },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            initial_distance_cm: 50.0,
            min_distance_cm: 2.0,
            initial_line: (0.5, 0.5),
            max_wheel_speed_ms: 0.5,
            circumference_m: 0.195,
            pulses_per_rev: 12,
            inverted: [false, true],
        }
    }
}

impl SimWorld {
    fn new(params: SimParams) -> Self {
        Self {
            distance: Ok(params.initial_distance_cm),
            line: params.initial_line,
            params,
            actuations: Vec::new(),
            num_recorded: 0,
            attached: AttachCounts::default(),
            wheel_demand: [0.0; 2],
            encoder_subscribed: [false; 2],
            pulse_accum: [0.0; 2],
        }
    }

    /// Every actuation since the log was last cleared, oldest first.
    pub fn actuations(&self) -> &[Actuation] {
        &self.actuations
    }

    /// Remove and return the actuation log.
    pub fn take_actuations(&mut self) -> Vec<Actuation> {
        std::mem::take(&mut self.actuations)
    }

    pub fn clear_actuations(&mut self) {
        self.actuations.clear();
    }

    /// Total number of actuations ever recorded, unaffected by draining the log.
    pub fn num_recorded(&self) -> u64 {
        self.num_recorded
    }

    pub fn attached(&self) -> AttachCounts {
        self.attached
    }

    /// Set the result of subsequent rangings, use an error to inject a ranging failure.
    pub fn set_distance(&mut self, distance: Result<f64, EqptError>) {
        self.distance = distance;
    }

    pub fn set_line(&mut self, left: f64, right: f64) {
        self.line = (left, right);
    }

    /// Forward positive demand last written to `wheel`.
    pub fn wheel_demand(&self, wheel: Wheel) -> f64 {
        self.wheel_demand[wheel.index()]
    }

    /// Step the world forward by `dt` from time `from`.
    ///
    /// Moves the obstacle according to the wheel demands and returns the encoder pulses
    /// generated over the step, in time order. Only wheels with a live encoder subscription
    /// produce pulses.
    pub fn advance(&mut self, from: Duration, dt: Duration) -> Vec<(Duration, Wheel)> {
        let dt_s = dt.as_secs_f64();

        // Obstacle gets closer as the robot drives forward
        if let Ok(d) = self.distance {
            let fwd_ms = util::maths::lin_map(
                (-1.0, 1.0),
                (-self.params.max_wheel_speed_ms, self.params.max_wheel_speed_ms),
                0.5 * (self.wheel_demand[0] + self.wheel_demand[1]),
            );
            let new_d = d - fwd_ms * 100.0 * dt_s;
            self.distance = Ok(new_d.max(self.params.min_distance_cm));
        }

        let mut pulses = vec![];
        let pulses_per_m = self.params.pulses_per_rev as f64 / self.params.circumference_m;

        for &wheel in [Wheel::Left, Wheel::Right].iter() {
            let i = wheel.index();
            if !self.encoder_subscribed[i] {
                self.pulse_accum[i] = 0.0;
                continue;
            }

            self.pulse_accum[i] +=
                self.wheel_demand[i].abs() * self.params.max_wheel_speed_ms * pulses_per_m * dt_s;

            let n = self.pulse_accum[i].floor();
            self.pulse_accum[i] -= n;

            let n = n as u64;
            for k in 0..n {
                pulses.push((from + dt.mul_f64((k + 1) as f64 / n as f64), wheel));
            }
        }

        pulses.sort_by_key(|(t, _)| *t);
        pulses
    }

    fn record(&mut self, actuation: Actuation) {
        trace!("Sim actuation: {:?}", actuation);
        self.actuations.push(actuation);
        self.num_recorded += 1;
    }
}

impl SimEqpt {
    pub fn new(params: SimParams) -> Self {
        Self {
            world: Rc::new(RefCell::new(SimWorld::new(params))),
        }
    }

    /// Shared handle to the world behind this provider.
    pub fn world(&self) -> Rc<RefCell<SimWorld>> {
        self.world.clone()
    }
}

impl EqptProvider for SimEqpt {
    fn two_wheel_drive(&mut self) -> Box<dyn TwoWheelDrive> {
        self.world.borrow_mut().attached.drive += 1;
        Box::new(SimDrive(self.world.clone()))
    }

    fn wheel_motors(&mut self) -> (Box<dyn Motor>, Box<dyn Motor>) {
        self.world.borrow_mut().attached.motors += 2;
        (
            Box::new(SimMotor {
                world: self.world.clone(),
                wheel: Wheel::Left,
            }),
            Box::new(SimMotor {
                world: self.world.clone(),
                wheel: Wheel::Right,
            }),
        )
    }

    fn wheel_encoders(&mut self) -> (Box<dyn Encoder>, Box<dyn Encoder>) {
        {
            let mut world = self.world.borrow_mut();
            world.attached.encoders += 2;
            world.encoder_subscribed = [true; 2];
        }
        (
            Box::new(SimEncoder {
                world: self.world.clone(),
                wheel: Wheel::Left,
                detached: false,
            }),
            Box::new(SimEncoder {
                world: self.world.clone(),
                wheel: Wheel::Right,
                detached: false,
            }),
        )
    }

    fn range_sensor(&mut self) -> Box<dyn RangeSensor> {
        self.world.borrow_mut().attached.range += 1;
        Box::new(SimRange(self.world.clone()))
    }

    fn line_sensors(&mut self) -> (Box<dyn LineSensor>, Box<dyn LineSensor>) {
        self.world.borrow_mut().attached.line += 2;
        (
            Box::new(SimLine {
                world: self.world.clone(),
                wheel: Wheel::Left,
            }),
            Box::new(SimLine {
                world: self.world.clone(),
                wheel: Wheel::Right,
            }),
        )
    }

    fn head_servo(&mut self) -> Box<dyn Servo> {
        self.world.borrow_mut().attached.servo += 1;
        Box::new(SimServo(self.world.clone()))
    }

    fn indicator(&mut self) -> Box<dyn Indicator> {
        self.world.borrow_mut().attached.indicator += 1;
        Box::new(SimIndicator(self.world.clone()))
    }
}

impl TwoWheelDrive for SimDrive {
    fn go(&mut self, left: f64, right: f64) {
        let mut world = self.0.borrow_mut();
        world.wheel_demand = [left, right];
        world.record(Actuation::DriveGo { left, right });
    }

    fn stop(&mut self) {
        let mut world = self.0.borrow_mut();
        world.wheel_demand = [0.0; 2];
        world.record(Actuation::DriveStop);
    }
}

impl Drop for SimDrive {
    fn drop(&mut self) {
        self.0.borrow_mut().attached.drive -= 1;
    }
}

impl Motor for SimMotor {
    fn write(&mut self, duty: f64) {
        let mut world = self.world.borrow_mut();
        let i = self.wheel.index();
        world.wheel_demand[i] = if world.params.inverted[i] { -duty } else { duty };
        world.record(Actuation::Motor {
            wheel: self.wheel,
            duty,
        });
    }
}

impl Drop for SimMotor {
    fn drop(&mut self) {
        self.world.borrow_mut().attached.motors -= 1;
    }
}

impl Encoder for SimEncoder {
    fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;

        let mut world = self.world.borrow_mut();
        world.encoder_subscribed[self.wheel.index()] = false;
        world.record(Actuation::EncoderDetach(self.wheel));
    }
}

impl Drop for SimEncoder {
    fn drop(&mut self) {
        let mut world = self.world.borrow_mut();
        world.attached.encoders -= 1;
        world.encoder_subscribed[self.wheel.index()] = false;
    }
}

impl RangeSensor for SimRange {
    fn ping(&mut self) -> Result<f64, EqptError> {
        self.0.borrow().distance.clone()
    }
}

impl Drop for SimRange {
    fn drop(&mut self) {
        self.0.borrow_mut().attached.range -= 1;
    }
}

impl LineSensor for SimLine {
    fn read(&mut self) -> f64 {
        let world = self.world.borrow();
        match self.wheel {
            Wheel::Left => world.line.0,
            Wheel::Right => world.line.1,
        }
    }
}

impl Drop for SimLine {
    fn drop(&mut self) {
        self.world.borrow_mut().attached.line -= 1;
    }
}

impl Servo for SimServo {
    fn write(&mut self, angle_deg: f64) {
        self.0.borrow_mut().record(Actuation::Servo(angle_deg));
    }
}

impl Drop for SimServo {
    fn drop(&mut self) {
        self.0.borrow_mut().attached.servo -= 1;
    }
}

impl Indicator for SimIndicator {
    fn turn_on(&mut self) {
        self.0.borrow_mut().record(Actuation::IndicatorOn);
    }

    fn turn_off(&mut self) {
        self.0.borrow_mut().record(Actuation::IndicatorOff);
    }

    fn blink(&mut self, on: Duration, off: Option<Duration>) {
        self.0
            .borrow_mut()
            .record(Actuation::IndicatorBlink { on, off });
    }
}

impl Drop for SimIndicator {
    fn drop(&mut self) {
        self.0.borrow_mut().attached.indicator -= 1;
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
