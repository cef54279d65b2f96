//! # Head pan controller
//!
//! The head carries the ranging sensor on a pan servo. While head control is enabled the
//! directional keys pan the head instead of driving the robot.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info, trace};
use robot_if::{
    eqpt::{EqptProvider, Indicator, Servo},
    rc::RcKey,
};
use serde::Deserialize;
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the head pan controller.
///
/// Units: degrees, unless stated otherwise
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeadParams {
    /// Angle at startup, also the angle `TOP` recentres to
    pub centre_deg: f64,

    /// Change in angle per `LEFT`/`RIGHT` press
    pub step_deg: f64,

    /// `LEFT` only pans while the angle is at least this
    pub left_limit_deg: f64,

    /// `RIGHT` only pans while the angle is at most this
    pub right_limit_deg: f64,

    /// Angle `TOP_LEFT` snaps to
    pub top_left_deg: f64,

    /// Angle `TOP_RIGHT` snaps to
    pub top_right_deg: f64,

    /// On and off time of the indicator blink while head control is enabled.
    ///
    /// Units: milliseconds
    pub blink_ms: u64,
}

/// Head pan controller.
pub struct HeadCtrl {
    params: HeadParams,

    servo: Box<dyn Servo>,

    enabled: bool,

    angle_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for HeadParams {
    fn default() -> Self {
        Self {
            centre_deg: 90.0,
            step_deg: 10.0,
            left_limit_deg: 30.0,
            right_limit_deg: 150.0,
            top_left_deg: 60.0,
            top_right_deg: 120.0,
            blink_ms: 500,
        }
    }
}

impl HeadParams {
    pub fn are_valid(&self) -> bool {
        self.step_deg > 0.0 && self.left_limit_deg <= self.right_limit_deg && self.blink_ms > 0
    }
}

impl HeadCtrl {
    /// Acquire the pan servo. Head control starts disabled at the centre angle, the servo is not
    /// written until the first pan.
    pub fn new(params: &HeadParams, eqpt: &mut dyn EqptProvider) -> Self {
        Self {
            servo: eqpt.head_servo(),
            enabled: false,
            angle_deg: params.centre_deg,
            params: params.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    /// Toggle head control, blinking the indicator while it is enabled.
    pub fn toggle(&mut self, indicator: &mut dyn Indicator) {
        self.enabled = !self.enabled;

        if self.enabled {
            let period = Duration::from_millis(self.params.blink_ms);
            indicator.blink(period, Some(period));
        }
        else {
            indicator.turn_off();
        }

        info!(
            "Head control {}",
            if self.enabled { "enabled" } else { "disabled" }
        );
    }

    /// Pan the head for a key press.
    ///
    /// Returns the angle written to the servo, or `None` if head control is disabled or the key
    /// doesn't pan the head.
    pub fn move_key(&mut self, key: RcKey) -> Option<f64> {
        if !self.enabled {
            return None;
        }

        let p = &self.params;
        match key {
            RcKey::Left => {
                if self.angle_deg >= p.left_limit_deg {
                    self.angle_deg -= p.step_deg;
                }
            }
            RcKey::Right => {
                if self.angle_deg <= p.right_limit_deg {
                    self.angle_deg += p.step_deg;
                }
            }
            RcKey::Top => self.angle_deg = p.centre_deg,
            RcKey::TopLeft => self.angle_deg = p.top_left_deg,
            RcKey::TopRight => self.angle_deg = p.top_right_deg,
            _ => {
                trace!("{} does not pan the head", key);
                return None;
            }
        }

        debug!("Head angle {:.1} deg", self.angle_deg);
        self.servo.write(self.angle_deg);

        Some(self.angle_deg)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Actuation, SimEqpt, SimParams};

    fn head() -> (HeadCtrl, SimEqpt, Box<dyn Indicator>) {
        let mut eqpt = SimEqpt::new(SimParams::default());
        let head = HeadCtrl::new(&HeadParams::default(), &mut eqpt);
        let indicator = eqpt.indicator();
        (head, eqpt, indicator)
    }

    #[test]
    fn test_disabled_ignores_keys() {
        let (mut head, eqpt, _) = head();

        assert_eq!(head.move_key(RcKey::Left), None);
        assert!(eqpt.world().borrow().actuations().is_empty());
    }

    #[test]
    fn test_toggle_indicator() {
        let (mut head, eqpt, mut ind) = head();

        head.toggle(ind.as_mut());
        assert!(head.is_enabled());
        head.toggle(ind.as_mut());
        assert!(!head.is_enabled());

        assert_eq!(
            eqpt.world().borrow().actuations(),
            &[
                Actuation::IndicatorBlink {
                    on: Duration::from_millis(500),
                    off: Some(Duration::from_millis(500))
                },
                Actuation::IndicatorOff
            ]
        );
    }

    #[test]
    fn test_pan_limits_are_asymmetric() {
        let (mut head, _eqpt, mut ind) = head();
        head.toggle(ind.as_mut());

        // Left stops once below 30, so the lowest angle reached is 20
        let lefts: Vec<_> = (0..10).filter_map(|_| head.move_key(RcKey::Left)).collect();
        assert_eq!(*lefts.last().unwrap(), 20.0);

        // Right stops once above 150, so the highest angle reached is 160
        let rights: Vec<_> = (0..20).filter_map(|_| head.move_key(RcKey::Right)).collect();
        assert_eq!(*rights.last().unwrap(), 160.0);
    }

    #[test]
    fn test_presets() {
        let (mut head, eqpt, mut ind) = head();
        head.toggle(ind.as_mut());
        eqpt.world().borrow_mut().clear_actuations();

        assert_eq!(head.move_key(RcKey::TopLeft), Some(60.0));
        assert_eq!(head.move_key(RcKey::TopRight), Some(120.0));
        assert_eq!(head.move_key(RcKey::Top), Some(90.0));
        assert_eq!(head.move_key(RcKey::Play), None);

        assert_eq!(
            eqpt.world().borrow().actuations(),
            &[
                Actuation::Servo(60.0),
                Actuation::Servo(120.0),
                Actuation::Servo(90.0)
            ]
        );
    }
}
