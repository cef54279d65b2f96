//! Hold mode, the robot only keeps moving while drive keys keep coming

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info, trace};
use robot_if::rc::RcKey;
use std::time::Duration;

use super::{DriveDemand, HoldParams, Mode, ModeCtx, ModeId};
use crate::sched::TimerHandle;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct Hold {
    params: HoldParams,

    /// Pending timeout, if the robot is moving
    timer: Option<TimerHandle>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Hold {
    pub fn new(params: HoldParams) -> Self {
        Self {
            params,
            timer: None,
        }
    }

    fn cancel_timer(&mut self, ctx: &mut ModeCtx) {
        if let Some(h) = self.timer.take() {
            ctx.sched.cancel(h);
        }
    }
}

impl Mode for Hold {
    fn id(&self) -> ModeId {
        ModeId::Hold
    }

    fn start(&mut self, _ctx: &mut ModeCtx) {
        info!("Hold mode started");
    }

    fn stop(&mut self, ctx: &mut ModeCtx) {
        self.cancel_timer(ctx);
        ctx.movement.stop();
        info!("Hold mode stopped");
    }

    fn handle_key(&mut self, key: RcKey, ctx: &mut ModeCtx) {
        if !ctx.drive_keys_enabled() {
            trace!("Hold ignoring {}, drive keys disabled", key);
            return;
        }

        if key == RcKey::Play {
            self.cancel_timer(ctx);
            ctx.movement.stop();
            return;
        }

        let d = match DriveDemand::for_key(key, ctx.state.speed) {
            Some(d) => d,
            None => {
                trace!("Hold ignoring {}", key);
                return;
            }
        };

        ctx.movement.set(d.left, d.right);

        self.cancel_timer(ctx);
        self.timer = Some(ctx.sched.once(
            ModeId::Hold,
            ctx.now,
            Duration::from_millis(self.params.timeout_ms),
        ));
    }

    fn on_timer(&mut self, handle: TimerHandle, ctx: &mut ModeCtx) {
        if self.timer != Some(handle) {
            trace!("Hold ignoring stale timer");
            return;
        }

        debug!("Hold timed out, stopping");
        self.timer = None;
        ctx.movement.stop();
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mode::CtxFixture, sim::Actuation};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn fire(hold: &mut Hold, fix: &mut CtxFixture, now: Duration) -> usize {
        let mut n = 0;
        while let Some(f) = fix.sched.pop_due(now) {
            hold.on_timer(f.handle, &mut fix.ctx(f.due));
            n += 1;
        }
        n
    }

    #[test]
    fn test_drive_times_out() {
        let mut fix = CtxFixture::new();
        let mut hold = Hold::new(HoldParams::default());

        hold.handle_key(RcKey::Top, &mut fix.ctx(ms(0)));
        assert_eq!(
            fix.take_actuations(),
            vec![Actuation::DriveGo { left: 0.5, right: 0.5 }]
        );

        assert_eq!(fire(&mut hold, &mut fix, ms(499)), 0);
        assert_eq!(fire(&mut hold, &mut fix, ms(500)), 1);
        assert_eq!(fix.take_actuations(), vec![Actuation::DriveStop]);
    }

    #[test]
    fn test_new_key_rearms_timeout() {
        let mut fix = CtxFixture::new();
        let mut hold = Hold::new(HoldParams::default());

        hold.handle_key(RcKey::Top, &mut fix.ctx(ms(0)));
        hold.handle_key(RcKey::Left, &mut fix.ctx(ms(400)));
        assert_eq!(fix.sched.num_armed(), 1);

        // The first timeout was cancelled
        assert_eq!(fire(&mut hold, &mut fix, ms(899)), 0);
        assert_eq!(fire(&mut hold, &mut fix, ms(900)), 1);
    }

    #[test]
    fn test_play_cancels() {
        let mut fix = CtxFixture::new();
        let mut hold = Hold::new(HoldParams::default());

        hold.handle_key(RcKey::Bottom, &mut fix.ctx(ms(0)));
        hold.handle_key(RcKey::Play, &mut fix.ctx(ms(100)));

        assert_eq!(fix.sched.num_armed(), 0);
        assert_eq!(
            fix.take_actuations(),
            vec![
                Actuation::DriveGo { left: -0.5, right: -0.5 },
                Actuation::DriveStop
            ]
        );
    }
}
