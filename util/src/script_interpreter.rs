//! # Remote control script interpreter module
//!
//! This module provides an interpreter for remote control scripts, allowing
//! a session to be driven by timed key presses instead of a handheld
//! transmitter.
//!
//! A script is a list of `<time_s>: <KEY>;` entries, for example:
//!
//! ```text
//! 0.5: GREEN;
//! 5.0: RED;
//! 5.5: TOP;
//! ```
//!
//! Anything which does not match this form (such as `#` comments) is
//! ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use robot_if::rc::{RcKey, RcKeyParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A key press which is scripted to occur at a specific time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    /// The time the key is pressed at
    pub exec_time_s: f64,

    /// The key to press
    pub key: RcKey
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_keys` to acquire the keys that need pressing.
pub struct ScriptInterpreter {
    _script_path: PathBuf,
    cmds: VecDeque<Command>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid key at {0} s: {1}")]
    InvalidKey(f64, RcKeyParseError),

    #[error("Script entries must be in time order, {0} s follows {1} s")]
    OutOfOrder(f64, f64),

    #[error("Could not build the script parser: {0}")]
    ParserError(regex::Error)
}

#[derive(Debug, PartialEq)]
pub enum PendingKeys {
    None,
    Some(Vec<RcKey>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(
                ScriptError::ScriptNotFound(path.display().to_string()));
        }

        // Load the script into a string
        let script = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => return Err(ScriptError::ScriptLoadError(e))
        };

        let cmds = Self::parse(&script)?;

        Ok(ScriptInterpreter {
            _script_path: path,
            cmds
        })
    }

    /// Create a new interpreter directly from the script's text.
    pub fn from_str(script: &str) -> Result<Self, ScriptError> {
        Ok(ScriptInterpreter {
            _script_path: PathBuf::new(),
            cmds: Self::parse(script)?
        })
    }

    /// Return the keys whose press time has passed at `current_time_s`.
    pub fn get_pending_keys(&mut self, current_time_s: f64) -> PendingKeys {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingKeys::EndOfScript
        }

        let mut key_vec: Vec<RcKey> = vec![];

        // Pop keys from the queue while the head's exec time has passed
        while let Some(cmd) = self.cmds.front() {
            if cmd.exec_time_s > current_time_s {
                break;
            }
            key_vec.push(cmd.key);
            self.cmds.pop_front();
        }

        if key_vec.is_empty() {
            PendingKeys::None
        }
        else {
            PendingKeys::Some(key_vec)
        }
    }

    /// Get the number of key presses left in the script
    pub fn get_num_keys(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }

    fn parse(script: &str) -> Result<VecDeque<Command>, ScriptError> {
        // Empty queue of commands
        let mut queue: VecDeque<Command> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(ScriptError::ParserError)?;

        for cap in re.captures_iter(script) {
            // Parse the exec time
            let exec_time_s: f64 = match cap[1].parse() {
                Ok(t) => t,
                Err(e) => return Err(
                    ScriptError::InvalidTimestamp(format!("{}", e)))
            };

            // Parse the key
            let key: RcKey = match cap[3].parse() {
                Ok(k) => k,
                Err(e) => return Err(ScriptError::InvalidKey(exec_time_s, e))
            };

            if let Some(last) = queue.back() {
                if exec_time_s < last.exec_time_s {
                    return Err(ScriptError::OutOfOrder(exec_time_s, last.exec_time_s))
                }
            }

            queue.push_back(Command {
                exec_time_s,
                key
            });
        }

        if queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(queue)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "\
# Drive out and back
0.5: GREEN;
1.0: TOP;
1.0: PLUS;
4.25: PLAY;
";

    #[test]
    fn test_pending_keys() {
        let mut si = ScriptInterpreter::from_str(SCRIPT).unwrap();

        assert_eq!(si.get_num_keys(), 4);
        assert_eq!(si.get_duration(), 4.25);

        assert_eq!(si.get_pending_keys(0.1), PendingKeys::None);
        assert_eq!(si.get_pending_keys(0.5), PendingKeys::Some(vec![RcKey::Green]));
        assert_eq!(
            si.get_pending_keys(2.0),
            PendingKeys::Some(vec![RcKey::Top, RcKey::Plus])
        );
        assert_eq!(si.get_pending_keys(3.0), PendingKeys::None);
        assert_eq!(si.get_pending_keys(5.0), PendingKeys::Some(vec![RcKey::Play]));
        assert_eq!(si.get_pending_keys(6.0), PendingKeys::EndOfScript);
    }

    #[test]
    fn test_invalid_scripts() {
        assert!(matches!(
            ScriptInterpreter::from_str("# nothing here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::from_str("1.0: SELECT;"),
            Err(ScriptError::InvalidKey(t, _)) if t == 1.0
        ));
        assert!(matches!(
            ScriptInterpreter::from_str("2.0: TOP;\n1.0: PLAY;"),
            Err(ScriptError::OutOfOrder(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::new("/definitely/not/a/script.rcs"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
