//! # Executable parameters
//!
//! All tunable values of the control core are gathered in [`ExecParams`], which is loaded from
//! `robot_exec.toml` in the parameters directory. Every section may be left out of the file, in
//! which case its defaults are used.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::{
    ctrl::CtrlParams,
    head::HeadParams,
    mode::{AutoParams, HoldParams, LineParams},
    movement::CruiseParams,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the whole control core.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExecParams {
    pub ctrl: CtrlParams,
    pub cruise: CruiseParams,
    pub hold: HoldParams,
    pub auto: AutoParams,
    pub line: LineParams,
    pub head: HeadParams,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Failed to load the exec parameters: {0}")]
    LoadError(util::params::LoadError),

    #[error("The [{0}] section of the exec parameters is invalid")]
    InvalidSection(&'static str),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ExecParams {
    /// Load and validate the parameters from the given file in the parameters directory.
    pub fn load(file: &str) -> Result<Self, ParamsError> {
        let params: Self = util::params::load(file).map_err(ParamsError::LoadError)?;
        params.validate()?;
        Ok(params)
    }

    /// Check every section, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let sections = [
            ("ctrl", self.ctrl.are_valid()),
            ("cruise", self.cruise.are_valid()),
            ("hold", self.hold.are_valid()),
            ("auto", self.auto.are_valid()),
            ("line", self.line.are_valid()),
            ("head", self.head.are_valid()),
        ];

        match sections.iter().find(|(_, valid)| !*valid) {
            Some((name, _)) => Err(ParamsError::InvalidSection(*name)),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mode::ModeId, movement::MovementKind};

    #[test]
    fn test_defaults_are_valid() {
        assert!(ExecParams::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let params: ExecParams = util::params::from_str(
            r#"
            [ctrl]
            initial_speed = 0.5
            initial_movement = "cruise_ctrl"
            initial_mode = "auto"

            [line]
            respect_power_off = true

            [line.pid]
            target = 0.0
            k_p = 0.5
            k_i = 0.0
            k_d = 1.0
            output_min = -1.0
            output_max = 1.0
            "#,
        )
        .unwrap();

        assert_eq!(params.ctrl.initial_speed, 0.5);
        assert_eq!(params.ctrl.debounce_ms, 250);
        assert_eq!(params.ctrl.initial_movement, MovementKind::CruiseCtrl);
        assert_eq!(params.ctrl.initial_mode, ModeId::Auto);
        assert!(params.line.respect_power_off);
        assert_eq!(params.line.pid.k_p, 0.5);
        assert_eq!(params.line.sample_period_ms, 20);
        assert_eq!(params.auto.far_cm, 14.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_invalid_section_named() {
        let mut params = ExecParams::default();
        params.auto.near_cm = 20.0;

        assert!(matches!(
            params.validate(),
            Err(ParamsError::InvalidSection("auto"))
        ));
    }
}
