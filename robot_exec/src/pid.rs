//! # PID controller module
//!
//! A single loop PID controller with output clamping, stepped once per sample. The controller
//! has no notion of time: integral and derivative terms are per-sample sums and differences, so
//! the gains are tuned for the sampling period of the loop that owns the controller.
//!
//! The integral term is not clamped. Only the output is limited, so a long lasting error can
//! wind the integral up well past the point where the output saturates.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Gains and limits of a [`PidCtrl`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidParams {
    /// Target value of the controlled error
    pub target: f64,

    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Minimum output
    pub output_min: f64,

    /// Maximum output
    pub output_max: f64,
}

/// A PID controller
#[derive(Debug, Clone, Serialize)]
pub struct PidCtrl {
    params: PidParams,

    /// The integral accumulation
    integral: f64,

    /// Error passed in on the previous update
    last_error: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PidCtrl {
    /// Create a new controller with zeroed integral and error history.
    pub fn new(params: PidParams) -> Self {
        Self {
            params,
            integral: 0.0,
            last_error: 0.0,
        }
    }

    /// Step the controller with the error for this sample, returning the clamped output.
    pub fn update(&mut self, error: f64) -> f64 {
        self.integral += error;
        let derivative = error - self.last_error;
        self.last_error = error;

        let out = self.params.k_p * error
            + self.params.k_i * self.integral
            + self.params.k_d * derivative;

        util::maths::clamp(&out, &self.params.output_min, &self.params.output_max)
    }

    /// Clear the integral and error history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
    }

    pub fn params(&self) -> &PidParams {
        &self.params
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn params(k_p: f64, k_i: f64, k_d: f64) -> PidParams {
        PidParams {
            target: 0.0,
            k_p,
            k_i,
            k_d,
            output_min: -1.5,
            output_max: 1.5,
        }
    }

    #[test]
    fn test_proportional_only_is_clamped_error() {
        let mut pid = PidCtrl::new(params(1.0, 0.0, 0.0));

        for e in [-3.0, -1.5, -0.2, 0.0, 0.7, 1.5, 2.0].iter() {
            assert_eq!(pid.update(*e), e.max(-1.5).min(1.5));
        }
    }

    #[test]
    fn test_integral_grows_until_clamped() {
        let mut pid = PidCtrl::new(params(0.0, 0.1, 0.0));

        let mut last = 0.0;
        let mut saturated = false;
        for _ in 0..30 {
            let out = pid.update(0.5);
            if saturated {
                assert_eq!(out, 1.5);
            }
            else if out == 1.5 {
                saturated = true;
            }
            else {
                assert!(out > last);
            }
            last = out;
        }
        assert!(saturated);

        // The integral keeps winding up behind the clamped output
        assert!(pid.integral() * 0.1 > 1.5);
    }

    #[test]
    fn test_negative_integral_grows_in_magnitude() {
        let mut pid = PidCtrl::new(params(0.0, 0.05, 0.0));

        let outs: Vec<f64> = (0..5).map(|_| pid.update(-1.0)).collect();
        for w in outs.windows(2) {
            assert!(w[1] < w[0]);
        }
    }

    #[test]
    fn test_derivative_uses_last_error() {
        let mut pid = PidCtrl::new(params(0.0, 0.0, 1.0));

        // First sample differentiates against a zero history
        assert_eq!(pid.update(0.5), 0.5);
        assert_eq!(pid.update(0.5), 0.0);
        assert_eq!(pid.update(0.25), -0.25);

        pid.reset();
        assert_eq!(pid.update(0.25), 0.25);
    }

    #[test]
    fn test_line_gains() {
        let mut pid = PidCtrl::new(PidParams {
            target: 0.0,
            k_p: 0.35,
            k_i: 0.05,
            k_d: 1.5,
            output_min: -1.5,
            output_max: 1.5,
        });

        // 0.35 * 0.2 + 0.05 * 0.2 + 1.5 * 0.2
        let out = pid.update(0.2);
        assert!((out - 0.38).abs() < 1e-12);
    }
}
