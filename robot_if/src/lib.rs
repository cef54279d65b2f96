//! # Robot interface crate.
//!
//! Provides the interfaces shared between the robot control core and the world around it: the
//! remote control key set and the equipment (actuator and sensor) traits.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Remote control key definitions
pub mod rc;

/// Equipment interfaces (actuators, sensors and indicators)
pub mod eqpt;
