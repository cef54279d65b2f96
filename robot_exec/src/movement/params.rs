//! Parameters structure for the cruise control strategy

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for CruiseCtrl.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CruiseParams {
    /// Number of encoder pulses between two speed samples. With the stock encoder discs this is
    /// one full wheel revolution.
    pub pulses_per_sample: u64,

    /// Distance travelled by the wheel over one sample.
    ///
    /// Units: meters
    pub circumference_m: f64,

    /// Magnitude of the duty change applied on each sample.
    pub ramp_step: f64,

    /// Which wheels are mounted mirrored, indexed left then right. Demands to an inverted wheel
    /// are negated before being written to its motor.
    pub inverted: [bool; 2],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CruiseParams {
    fn default() -> Self {
        Self {
            pulses_per_sample: 12,
            circumference_m: 0.195,
            ramp_step: 0.01,
            inverted: [false, true],
        }
    }
}

impl CruiseParams {
    /// Check the parameters are usable.
    pub fn are_valid(&self) -> bool {
        self.pulses_per_sample > 0
            && self.circumference_m > 0.0
            && self.ramp_step > 0.0
            && self.ramp_step <= 1.0
    }
}
