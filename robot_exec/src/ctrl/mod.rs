//! # Robot controller
//!
//! [`RobotCtrl`] owns the whole control core: the global state, the modes, the active movement
//! strategy, the head, the indicator and the timer scheduler. It is driven from outside by three
//! kinds of event, each stamped with the time it happened:
//!
//! - remote key presses, through [`RobotCtrl::handle_remote`],
//! - timers coming due, through [`RobotCtrl::tick`],
//! - encoder pulses, through [`RobotCtrl::handle_encoder_pulse`].
//!
//! Every event is handled to completion before the next one is looked at.
//!
//! ## Remote key handling
//!
//! A key press is first debounced: presses within `debounce_ms` of the last accepted press are
//! dropped without any effect. Accepted presses flash the indicator, then:
//!
//! 1. `CROSS` toggles head control and nothing else happens.
//! 2. While head control is enabled the key pans the head, and handling continues.
//! 3. Global keys (power, speed, mode selection, strategy swap, full stop, indicator latch) are
//!    handled by the controller.
//! 4. Any other key goes to the active mode.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::CtrlParams;
pub use state::RobotState;

use log::{debug, info, warn};
use serde::Serialize;
use robot_if::{
    eqpt::{EqptProvider, Indicator, Wheel},
    rc::RcKey,
};
use std::time::Duration;

use crate::{
    head::HeadCtrl,
    mode::{ModeCtx, ModeId, ModeRegistry},
    movement::{Movement, MovementKind},
    params::{ExecParams, ParamsError},
    sched::Scheduler,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The robot controller.
pub struct RobotCtrl {
    params: ExecParams,

    state: RobotState,

    modes: ModeRegistry,

    active: ModeId,

    /// Only empty while the strategy is being swapped
    movement: Option<Movement>,

    head: HeadCtrl,

    indicator: Box<dyn Indicator>,

    /// Whether the indicator has been latched on with `SQUARE`
    indicator_latched: bool,

    sched: Scheduler<ModeId>,

    eqpt: Box<dyn EqptProvider>,

    /// Time of the last accepted remote event
    last_event: Option<Duration>,
}

/// Snapshot of the controller for telemetry.
#[derive(Debug, Clone, Serialize)]
pub struct CtrlStatus {
    pub state: RobotState,
    pub mode: ModeId,
    pub movement: MovementKind,
    pub head_enabled: bool,
    pub head_angle_deg: f64,
    pub indicator_latched: bool,
    pub num_timers_armed: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How a remote key press was handled.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Dispatch {
    /// Dropped by the debounce filter
    Debounced,

    /// Head control was toggled
    HeadToggled,

    /// Handled by the controller
    Global,

    /// Passed to the given mode
    Mode(ModeId),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotCtrl {
    /// Create the controller, connecting the initial movement strategy and starting the initial
    /// mode at `now`.
    pub fn new(
        params: ExecParams,
        mut eqpt: Box<dyn EqptProvider>,
        now: Duration,
    ) -> Result<Self, ParamsError> {
        params.validate()?;

        let indicator = eqpt.indicator();
        let head = HeadCtrl::new(&params.head, eqpt.as_mut());
        let mut movement =
            Movement::connect(params.ctrl.initial_movement, &params.cruise, eqpt.as_mut());
        movement.start(now);

        let mut ctrl = Self {
            state: RobotState {
                power_on: params.ctrl.initial_power_on,
                speed: params.ctrl.initial_speed,
            },
            modes: ModeRegistry::new(&params),
            active: params.ctrl.initial_mode,
            movement: Some(movement),
            head,
            indicator,
            indicator_latched: false,
            sched: Scheduler::new(),
            eqpt,
            last_event: None,
            params,
        };

        let active = ctrl.active;
        let (modes, mut ctx) = ctrl.split(now);
        modes.get_mut(active).start(&mut ctx);

        info!(
            "RobotCtrl initialised in {} mode with {} movement",
            ctrl.active,
            ctrl.movement_kind()
        );

        Ok(ctrl)
    }

    /// Handle a key press from the remote.
    pub fn handle_remote(&mut self, key: RcKey, now: Duration) -> Dispatch {
        // ---- DEBOUNCE ----

        let debounce = Duration::from_millis(self.params.ctrl.debounce_ms);
        if let Some(last) = self.last_event {
            // An event stamped before the last one is treated as a bounce too
            let bounced = now.checked_sub(last).map_or(true, |dt| dt <= debounce);
            if bounced {
                debug!("Debounced {}", key);
                return Dispatch::Debounced;
            }
        }

        self.last_event = Some(now);
        self.indicator
            .blink(Duration::from_millis(self.params.ctrl.ack_blink_ms), None);

        debug!("Remote key {}", key);

        // ---- HEAD ----

        if key == RcKey::Cross {
            self.head.toggle(self.indicator.as_mut());
            return Dispatch::HeadToggled;
        }

        if self.head.is_enabled() {
            self.head.move_key(key);
        }

        // ---- GLOBAL KEYS ----

        match key {
            RcKey::Power => self.toggle_power(),
            RcKey::Plus => self.adjust_speed(self.params.ctrl.speed_step),
            RcKey::Minus => self.adjust_speed(-self.params.ctrl.speed_step),
            RcKey::X => self.full_stop(),
            RcKey::Y => self.swap_movement(now),
            RcKey::Square => self.toggle_indicator_latch(),
            k => match ModeId::from_key(k) {
                Some(id) => self.switch_mode(id, now),
                None => {
                    let active = self.active;
                    let (modes, mut ctx) = self.split(now);
                    modes.get_mut(active).handle_key(k, &mut ctx);
                    return Dispatch::Mode(active);
                }
            },
        }

        Dispatch::Global
    }

    /// Fire every timer due at or before `now`, returning how many fired.
    ///
    /// Timers are handled one at a time at their due time, so anything a handler cancels never
    /// fires afterwards.
    pub fn tick(&mut self, now: Duration) -> usize {
        let mut num_fired = 0;

        while let Some(fired) = self.sched.pop_due(now) {
            if fired.owner != self.active {
                warn!(
                    "Timer owned by {} fired while {} is active",
                    fired.owner, self.active
                );
            }

            let owner = fired.owner;
            let (modes, mut ctx) = self.split(fired.due);
            modes.get_mut(owner).on_timer(fired.handle, &mut ctx);

            num_fired += 1;
        }

        num_fired
    }

    /// Handle a pulse from a wheel encoder. Pulses only matter under cruise control.
    pub fn handle_encoder_pulse(&mut self, wheel: Wheel, now: Duration) {
        self.movement().on_pulse(wheel, now);
    }

    /// Switch to the given mode, stopping the active one first.
    ///
    /// Selecting the active mode restarts it.
    pub fn switch_mode(&mut self, id: ModeId, now: Duration) {
        let old = self.active;

        {
            let (modes, mut ctx) = self.split(now);
            modes.get_mut(old).stop(&mut ctx);
        }

        let num_leftover = self.sched.cancel_owner(old);
        if num_leftover > 0 {
            warn!(
                "{} left {} timer(s) armed when stopped, cancelled",
                old, num_leftover
            );
        }

        self.active = id;

        {
            let (modes, mut ctx) = self.split(now);
            modes.get_mut(id).start(&mut ctx);
        }

        info!("Mode changed from {} to {}", old, id);
    }

    /// Swap between direct drive and cruise control.
    pub fn swap_movement(&mut self, now: Duration) {
        let kind = match self.movement.take() {
            Some(mut old) => {
                old.stop();
                let kind = old.kind().other();
                old.teardown();
                kind
            }
            None => util::raise_error!("No movement strategy connected during swap"),
        };

        let mut new = Movement::connect(kind, &self.params.cruise, self.eqpt.as_mut());
        new.start(now);
        self.movement = Some(new);

        info!("Movement strategy swapped to {}", kind);
    }

    /// Stop the active mode and release the movement strategy.
    pub fn shutdown(mut self, now: Duration) {
        let active = self.active;

        {
            let (modes, mut ctx) = self.split(now);
            modes.get_mut(active).stop(&mut ctx);
        }
        self.sched.cancel_owner(active);

        if let Some(m) = self.movement.take() {
            m.teardown();
        }
        self.indicator.turn_off();

        info!("RobotCtrl shut down");
    }

    // ---- ACCESSORS ----

    pub fn status(&self) -> CtrlStatus {
        CtrlStatus {
            state: self.state,
            mode: self.active,
            movement: self.movement_kind(),
            head_enabled: self.head.is_enabled(),
            head_angle_deg: self.head.angle_deg(),
            indicator_latched: self.indicator_latched,
            num_timers_armed: self.sched.num_armed(),
        }
    }

    pub fn state(&self) -> &RobotState {
        &self.state
    }

    pub fn active_mode(&self) -> ModeId {
        self.active
    }

    pub fn movement_kind(&self) -> MovementKind {
        match self.movement.as_ref() {
            Some(m) => m.kind(),
            None => util::raise_error!("No movement strategy connected"),
        }
    }

    pub fn head(&self) -> &HeadCtrl {
        &self.head
    }

    pub fn indicator_latched(&self) -> bool {
        self.indicator_latched
    }

    pub fn sched(&self) -> &Scheduler<ModeId> {
        &self.sched
    }

    /// The earliest time a timer is due, if any are armed.
    pub fn next_due(&self) -> Option<Duration> {
        self.sched.next_due()
    }

    // ---- PRIVATE ----

    fn toggle_power(&mut self) {
        self.state.power_on = !self.state.power_on;

        if !self.state.power_on {
            self.movement().stop();
            self.indicator.turn_off();
        }

        info!("Power {}", if self.state.power_on { "on" } else { "off" });
    }

    fn adjust_speed(&mut self, delta: f64) {
        let speed = self.state.adjust_speed(delta);
        info!("Speed set to {:.1}", speed);
    }

    fn full_stop(&mut self) {
        self.movement().stop();
        self.indicator.turn_off();
        info!("Full stop");
    }

    fn toggle_indicator_latch(&mut self) {
        self.indicator_latched = !self.indicator_latched;

        if self.indicator_latched {
            self.indicator.turn_on();
        }
        else {
            self.indicator.turn_off();
        }
    }

    fn movement(&mut self) -> &mut Movement {
        match self.movement.as_mut() {
            Some(m) => m,
            None => util::raise_error!("No movement strategy connected"),
        }
    }

    /// Split the controller into the mode registry and a context lent to the modes.
    fn split(&mut self, now: Duration) -> (&mut ModeRegistry, ModeCtx<'_>) {
        let movement = match self.movement.as_mut() {
            Some(m) => m,
            None => util::raise_error!("No movement strategy connected"),
        };

        (
            &mut self.modes,
            ModeCtx {
                state: &self.state,
                head_enabled: self.head.is_enabled(),
                movement,
                indicator: self.indicator.as_mut(),
                sched: &mut self.sched,
                eqpt: self.eqpt.as_mut(),
                now,
            },
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
