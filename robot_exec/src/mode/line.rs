//! # Line mode
//!
//! Follows a dark line using two line sensors either side of it. The difference between the
//! sensor readings is fed to a PID controller each sample, and the controller output is split
//! across the wheels to steer the robot back over the line.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, trace};
use robot_if::{eqpt::LineSensor, rc::RcKey};
use std::time::Duration;

use super::{LineParams, Mode, ModeCtx, ModeId};
use crate::{pid::PidCtrl, sched::TimerHandle};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct Line {
    params: LineParams,

    /// Present while the mode is started
    run: Option<LineRun>,
}

struct LineRun {
    left: Box<dyn LineSensor>,
    right: Box<dyn LineSensor>,
    pid: PidCtrl,
    timer: TimerHandle,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Line {
    pub fn new(params: LineParams) -> Self {
        Self { params, run: None }
    }

    /// The steering controller, while the mode is started.
    pub fn pid(&self) -> Option<&PidCtrl> {
        self.run.as_ref().map(|r| &r.pid)
    }
}

impl Mode for Line {
    fn id(&self) -> ModeId {
        ModeId::Line
    }

    fn start(&mut self, ctx: &mut ModeCtx) {
        let (left, right) = ctx.eqpt.line_sensors();
        let timer = ctx.sched.every(
            ModeId::Line,
            ctx.now,
            Duration::from_millis(self.params.sample_period_ms),
        );

        self.run = Some(LineRun {
            left,
            right,
            pid: PidCtrl::new(self.params.pid),
            timer,
        });
        info!("Line mode started");
    }

    fn stop(&mut self, ctx: &mut ModeCtx) {
        if let Some(run) = self.run.take() {
            ctx.sched.cancel(run.timer);
        }
        ctx.movement.stop();
        info!("Line mode stopped");
    }

    fn handle_key(&mut self, key: RcKey, _ctx: &mut ModeCtx) {
        trace!("Line ignoring {}", key);
    }

    fn on_timer(&mut self, handle: TimerHandle, ctx: &mut ModeCtx) {
        let run = match self.run.as_mut() {
            Some(r) if r.timer == handle => r,
            _ => {
                trace!("Line ignoring stale timer");
                return;
            }
        };

        if self.params.respect_power_off && !ctx.state.power_on {
            trace!("Line sample skipped, power is off");
            return;
        }

        let l = run.left.read();
        let r = run.right.read();
        let output = run.pid.update(l - r);

        trace!("Line ({:.3}, {:.3}) -> {:.3}", l, r, output);

        let s = ctx.state.speed;
        ctx.movement.set(s + output, s - output);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
