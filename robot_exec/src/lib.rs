//! # Robot library.
//!
//! The control core of the robot, usable by the executable, the integration tests and the
//! benchmarks alike.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Robot controller - dispatches remote events and owns the global state
pub mod ctrl;

/// Head pan controller - points the ranging sensor
pub mod head;

/// Operating modes - Manual, Hold, Auto and Line
pub mod mode;

/// Movement strategies - direct drive and cruise control
pub mod movement;

/// Executable parameters
pub mod params;

/// PID controller
pub mod pid;

/// Cooperative timer scheduler
pub mod sched;

/// Simulated equipment for running the core off the robot
pub mod sim;
