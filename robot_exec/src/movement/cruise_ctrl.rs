//! # Cruise control strategy
//!
//! Drives each wheel through its own motor and nudges the motor duty so that the wheel speed,
//! measured from encoder pulse timing, tracks the demand.
//!
//! The regulator is a fixed step integrator rather than a PID loop. Every `pulses_per_sample`
//! pulses the wheel speed is estimated from the time taken for the sample, then:
//!
//! - if the wheel is slower than its target and the duty isn't saturated, the duty is stepped
//!   away from zero,
//! - if the wheel is faster than its target and the duty isn't zero, the duty is stepped back
//!   towards zero.
//!
//! A step never carries the duty through zero, so the regulator can slow a wheel to a halt but
//! never reverse it. Any new demand resets the channel's duty to the demand itself.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};
use robot_if::eqpt::{Encoder, EqptProvider, Motor, Wheel};
use serde::Serialize;
use std::time::Duration;

use super::{CruiseParams, MovementCmd};
use util::maths::{clamp, round_to};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of decimals duties are rounded to after each step, so that repeated steps do not drift.
const DUTY_DECIMALS: i32 = 6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Regulator state of one wheel.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChannelState {
    /// Pulses counted since the channel was created
    pub pulse_count: u64,

    /// Time of the last speed sample
    pub last_sample_time: Duration,

    /// Duty currently written to the motor, before sign correction
    pub current_output: f64,

    /// Speed the regulator is aiming for, the magnitude of the demand
    pub target_speed: f64,

    /// Signed duty step, positive for forward demands
    pub ramp_step: f64,

    /// Whether the wheel is mounted mirrored
    pub inverted: bool,
}

/// Per-wheel closed loop speed regulation.
pub struct CruiseCtrl {
    params: CruiseParams,

    /// Motors indexed by [`Wheel::index`]
    motors: [Box<dyn Motor>; 2],

    /// Encoder subscriptions indexed by [`Wheel::index`]
    encoders: [Box<dyn Encoder>; 2],

    channels: [ChannelState; 2],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChannelState {
    fn new(inverted: bool, ramp_step: f64) -> Self {
        Self {
            inverted,
            ramp_step,
            ..Default::default()
        }
    }

    /// Reset the channel to a new demand.
    fn demand(&mut self, cmd: f64, step: f64) {
        self.target_speed = cmd.abs();
        self.ramp_step = if cmd >= 0.0 { step } else { -step };
        self.current_output = cmd;
    }

    /// Adjust the output for a measured speed, returning true if the output changed.
    fn regulate(&mut self, speed: f64) -> bool {
        let out = self.current_output;

        let new_out = if speed < self.target_speed && out.abs() < 1.0 {
            clamp(&(out + self.ramp_step), &-1.0, &1.0)
        }
        else if speed > self.target_speed && out.abs() > 0.0 {
            let stepped = out - self.ramp_step;

            // Stepping down stops at zero
            if stepped * out < 0.0 {
                0.0
            }
            else {
                stepped
            }
        }
        else {
            out
        };

        self.current_output = round_to(new_out, DUTY_DECIMALS);
        self.current_output != out
    }

    /// Duty to write to the motor for the current output.
    fn duty(&self) -> f64 {
        if self.inverted {
            -self.current_output
        }
        else {
            self.current_output
        }
    }
}

impl CruiseCtrl {
    /// Acquire the wheel motors and encoders. Nothing is actuated until the first command.
    pub fn connect(params: &CruiseParams, eqpt: &mut dyn EqptProvider) -> Self {
        let (motor_l, motor_r) = eqpt.wheel_motors();
        let (enc_l, enc_r) = eqpt.wheel_encoders();

        Self {
            motors: [motor_l, motor_r],
            encoders: [enc_l, enc_r],
            channels: [
                ChannelState::new(params.inverted[0], params.ramp_step),
                ChannelState::new(params.inverted[1], params.ramp_step),
            ],
            params: params.clone(),
        }
    }

    /// Begin speed sampling from `now`.
    pub fn start(&mut self, now: Duration) {
        for ch in self.channels.iter_mut() {
            ch.last_sample_time = now;
        }
    }

    /// Set new wheel demands, writing them to the motors straight away.
    pub fn set(&mut self, cmd: MovementCmd) {
        self.set_wheel(Wheel::Left, cmd.left);
        self.set_wheel(Wheel::Right, cmd.right);
    }

    pub fn stop(&mut self) {
        self.set(MovementCmd::zero());
    }

    /// Handle one encoder pulse from `wheel` at `now`.
    pub fn on_pulse(&mut self, wheel: Wheel, now: Duration) {
        let i = wheel.index();
        let ch = &mut self.channels[i];

        ch.pulse_count += 1;
        if ch.pulse_count % self.params.pulses_per_sample != 0 {
            return;
        }

        let dt = now.checked_sub(ch.last_sample_time).unwrap_or_default();
        ch.last_sample_time = now;

        let dt_s = dt.as_secs_f64();
        if dt_s <= 0.0 {
            trace!("{:?} wheel sample with no elapsed time, skipping", wheel);
            return;
        }

        let speed = self.params.circumference_m / dt_s;
        ch.regulate(speed);

        debug!(
            "{:?} wheel speed {:.3} m/s (target {:.3}), duty {:.3}",
            wheel, speed, ch.target_speed, ch.current_output
        );

        let duty = ch.duty();
        self.motors[i].write(duty);
    }

    /// Detach the encoders and release every handle.
    pub fn teardown(self) {
        let Self {
            motors, encoders, ..
        } = self;

        let [mut enc_l, mut enc_r] = encoders;
        enc_l.detach();
        enc_r.detach();

        drop(motors);
    }

    pub fn channel(&self, wheel: Wheel) -> &ChannelState {
        &self.channels[wheel.index()]
    }

    fn set_wheel(&mut self, wheel: Wheel, cmd: f64) {
        let i = wheel.index();
        self.channels[i].demand(cmd, self.params.ramp_step);

        let duty = self.channels[i].duty();
        self.motors[i].write(duty);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Actuation, SimEqpt, SimParams};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn pulses(cruise: &mut CruiseCtrl, wheel: Wheel, n: u64, from: Duration, spacing: Duration) -> Duration {
        let mut t = from;
        for _ in 0..n {
            t += spacing;
            cruise.on_pulse(wheel, t);
        }
        t
    }

    fn motor_writes(eqpt: &SimEqpt, wheel: Wheel) -> Vec<f64> {
        eqpt.world()
            .borrow()
            .actuations()
            .iter()
            .filter_map(|a| match a {
                Actuation::Motor { wheel: w, duty } if *w == wheel => Some(*duty),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_set_writes_sign_corrected() {
        let mut eqpt = SimEqpt::new(SimParams::default());
        let mut cruise = CruiseCtrl::connect(&CruiseParams::default(), &mut eqpt);

        cruise.set(MovementCmd::new(0.5, -0.25));

        assert_eq!(motor_writes(&eqpt, Wheel::Left), vec![0.5]);
        assert_eq!(motor_writes(&eqpt, Wheel::Right), vec![0.25]);

        let r = cruise.channel(Wheel::Right);
        assert_eq!(r.target_speed, 0.25);
        assert_eq!(r.ramp_step, -0.01);
        assert_eq!(r.current_output, -0.25);
    }

    #[test]
    fn test_slow_wheel_ramps_up_monotonically() {
        let mut eqpt = SimEqpt::new(SimParams::default());
        let mut cruise = CruiseCtrl::connect(&CruiseParams::default(), &mut eqpt);
        cruise.start(ms(0));
        cruise.set(MovementCmd::new(0.5, 0.0));

        // 11 pulses is not yet a sample
        let t = pulses(&mut cruise, Wheel::Left, 11, ms(0), ms(100));
        assert_eq!(motor_writes(&eqpt, Wheel::Left), vec![0.5]);

        // One sample per 1.2 s is 0.1625 m/s, slower than 0.5
        let mut t = pulses(&mut cruise, Wheel::Left, 1, t, ms(100));
        for _ in 0..5 {
            t = pulses(&mut cruise, Wheel::Left, 12, t, ms(100));
        }

        let writes = motor_writes(&eqpt, Wheel::Left);
        assert_eq!(writes, vec![0.5, 0.51, 0.52, 0.53, 0.54, 0.55, 0.56]);
    }

    #[test]
    fn test_fast_wheel_ramps_down_and_stops_at_zero() {
        let mut eqpt = SimEqpt::new(SimParams::default());
        let mut cruise = CruiseCtrl::connect(&CruiseParams::default(), &mut eqpt);
        cruise.start(ms(0));
        cruise.set(MovementCmd::new(0.0, -0.03));

        // 12 pulses over 120 ms is 1.625 m/s, faster than 0.03
        let mut t = ms(0);
        for _ in 0..6 {
            t = pulses(&mut cruise, Wheel::Right, 12, t, ms(10));
        }

        // Right wheel is inverted so duties are negated
        let writes = motor_writes(&eqpt, Wheel::Right);
        assert_eq!(writes, vec![0.03, 0.02, 0.01, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(cruise.channel(Wheel::Right).current_output, 0.0);
    }

    #[test]
    fn test_output_saturates() {
        let mut eqpt = SimEqpt::new(SimParams::default());
        let mut cruise = CruiseCtrl::connect(&CruiseParams::default(), &mut eqpt);
        cruise.start(ms(0));
        cruise.set(MovementCmd::new(1.0, 0.0));

        let mut t = ms(0);
        for _ in 0..3 {
            t = pulses(&mut cruise, Wheel::Left, 12, t, ms(1000));
        }

        assert!(motor_writes(&eqpt, Wheel::Left).iter().all(|d| *d == 1.0));
    }

    #[test]
    fn test_new_demand_resets_output() {
        let mut eqpt = SimEqpt::new(SimParams::default());
        let mut cruise = CruiseCtrl::connect(&CruiseParams::default(), &mut eqpt);
        cruise.start(ms(0));
        cruise.set(MovementCmd::new(0.5, 0.5));
        pulses(&mut cruise, Wheel::Left, 12, ms(0), ms(100));
        assert_eq!(cruise.channel(Wheel::Left).current_output, 0.51);

        cruise.stop();
        assert_eq!(cruise.channel(Wheel::Left).current_output, 0.0);
        assert_eq!(cruise.channel(Wheel::Left).target_speed, 0.0);
    }

    #[test]
    fn test_teardown_detaches_encoders() {
        let mut eqpt = SimEqpt::new(SimParams::default());
        let cruise = CruiseCtrl::connect(&CruiseParams::default(), &mut eqpt);

        {
            let world = eqpt.world();
            let world = world.borrow();
            assert_eq!(world.attached().motors, 2);
            assert_eq!(world.attached().encoders, 2);
        }

        cruise.teardown();

        let world = eqpt.world();
        let world = world.borrow();
        assert_eq!(world.attached().motors, 0);
        assert_eq!(world.attached().encoders, 0);
        assert_eq!(
            world
                .actuations()
                .iter()
                .filter(|a| matches!(a, Actuation::EncoderDetach(_)))
                .count(),
            2
        );
    }
}
