//! Parameters structures for the operating modes

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::pid::PidParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the Hold mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HoldParams {
    /// How long a drive key keeps the robot moving.
    ///
    /// Units: milliseconds
    pub timeout_ms: u64,
}

/// Parameters for the Auto mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutoParams {
    /// Ranging period.
    ///
    /// Units: milliseconds
    pub sample_period_ms: u64,

    /// Beyond this range the robot drives forward.
    ///
    /// Units: centimeters
    pub far_cm: f64,

    /// Within this range the robot reverses.
    ///
    /// Units: centimeters
    pub near_cm: f64,
}

/// Parameters for the Line mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LineParams {
    /// Line sensor sampling period.
    ///
    /// Units: milliseconds
    pub sample_period_ms: u64,

    /// Steering controller gains
    pub pid: PidParams,

    /// If true no steering is done while the power is off. The line follower has historically
    /// kept steering regardless of power, so this defaults to false.
    pub respect_power_off: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for HoldParams {
    fn default() -> Self {
        Self { timeout_ms: 500 }
    }
}

impl HoldParams {
    pub fn are_valid(&self) -> bool {
        self.timeout_ms > 0
    }
}

impl Default for AutoParams {
    fn default() -> Self {
        Self {
            sample_period_ms: 100,
            far_cm: 14.0,
            near_cm: 10.0,
        }
    }
}

impl AutoParams {
    pub fn are_valid(&self) -> bool {
        self.sample_period_ms > 0 && self.near_cm >= 0.0 && self.near_cm <= self.far_cm
    }
}

impl Default for LineParams {
    fn default() -> Self {
        Self {
            sample_period_ms: 20,
            pid: PidParams {
                target: 0.0,
                k_p: 0.35,
                k_i: 0.05,
                k_d: 1.5,
                output_min: -1.5,
                output_max: 1.5,
            },
            respect_power_off: false,
        }
    }
}

impl LineParams {
    pub fn are_valid(&self) -> bool {
        self.sample_period_ms > 0 && self.pid.output_min <= self.pid.output_max
    }
}
