//! Main robot executable entry point.
//!
//! # Architecture
//!
//! The executable runs the control core against simulated equipment, with remote key presses
//! coming from a script. After initialisation a fixed rate loop runs which:
//!
//!     - Passes the scripted keys that have come due to the controller
//!     - Steps the simulated world, feeding the encoder pulses it generates to the controller
//!     - Fires the controller's due timers
//!
//! The loop ends with the script, or after `--duration` seconds if no script is given.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use robot_lib::{
    ctrl::RobotCtrl,
    mode::ModeId,
    params::ExecParams,
    sim::{SimEqpt, SimParams},
};
use util::{
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingKeys, ScriptInterpreter},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.01;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "robot_exec", about = "Runs the robot control core on simulated equipment")]
struct Opts {
    /// Mode to start in, one of manual, hold, auto or line. Overrides the parameter file.
    #[structopt(long)]
    mode: Option<ModeId>,

    /// Remote control script to run.
    #[structopt(long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// How long to run for when no script is given.
    ///
    /// Units: seconds
    #[structopt(long, default_value = "10")]
    duration: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("robot_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger, the per-pulse cruise control output is only wanted when debugging it
    logger_init(
        LevelFilter::Trace,
        &[
            ("robot_lib::movement::cruise_ctrl", LevelFilter::Info),
            ("robot_lib::sim", LevelFilter::Info),
        ],
        &session,
    )
    .wrap_err("Failed to initialise logging")?;

    info!("Robot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let mut params = ExecParams::load("robot_exec.toml")
        .wrap_err("Could not load exec params")?;

    let sim_params: SimParams = util::params::load("sim.toml")
        .wrap_err("Could not load sim params")?;

    if let Some(mode) = opts.mode {
        params.ctrl.initial_mode = mode;
    }

    info!("Exec parameters loaded");

    // ---- INITIALISE REMOTE SOURCE ----

    let mut script = match opts.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasting {:.02} s containing {} key presses",
                si.get_duration(),
                si.get_num_keys()
            );

            Some(si)
        }
        None => {
            info!("No script given, running for {:.02} s", opts.duration);
            None
        }
    };

    // ---- INITIALISE CONTROL CORE ----

    let eqpt = SimEqpt::new(sim_params);
    let world = eqpt.world();

    let mut ctrl = RobotCtrl::new(params, Box::new(eqpt), session::get_elapsed())
        .wrap_err("Failed to initialise the robot controller")?;

    info!("Initialisation complete, entering main loop\n");

    // ---- MAIN LOOP ----

    let cycle_period = Duration::from_secs_f64(CYCLE_PERIOD_S);
    let mut last_now = session::get_elapsed();

    loop {
        let cycle_start = Instant::now();
        let now = session::get_elapsed();

        // ---- REMOTE ----

        match script.as_mut() {
            Some(si) => match si.get_pending_keys(now.as_secs_f64()) {
                PendingKeys::None => (),
                PendingKeys::Some(keys) => {
                    for key in keys {
                        let dispatch = ctrl.handle_remote(key, now);
                        debug!("{} handled as {:?}", key, dispatch);
                    }
                }
                PendingKeys::EndOfScript => {
                    info!("End of script reached, stopping");
                    break;
                }
            },
            None => {
                if now.as_secs_f64() >= opts.duration {
                    info!("Run duration reached, stopping");
                    break;
                }
            }
        }

        // ---- SIMULATION ----

        let pulses = world
            .borrow_mut()
            .advance(last_now, now.checked_sub(last_now).unwrap_or_default());

        for (t, wheel) in pulses {
            ctrl.tick(t);
            ctrl.handle_encoder_pulse(wheel, t);
        }

        // ---- TIMERS ----

        ctrl.tick(now);
        last_now = now;

        // Actuations are traced as they happen, the log itself isn't needed
        world.borrow_mut().clear_actuations();

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = cycle_start.elapsed();

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                (cycle_dur - cycle_period).as_secs_f64()
            ),
        }
    }

    // ---- SHUTDOWN ----

    let status = ctrl.status();
    let status_json =
        serde_json::to_string_pretty(&status).wrap_err("Failed to serialise final status")?;
    info!("Final status: {}", status_json);

    let mut status_path = session.session_root.clone();
    status_path.push("status.json");
    std::fs::write(&status_path, status_json).wrap_err("Failed to save final status")?;

    ctrl.shutdown(session::get_elapsed());

    info!(
        "Session complete, {} actuations made",
        world.borrow().num_recorded()
    );

    Ok(())
}
