//! # Auto mode
//!
//! Keeps the robot at a distance from the obstacle in front of it. The range is sampled
//! periodically and each sample picks one of three actions:
//!
//! - further than `far_cm`: drive forward,
//! - closer than `near_cm`: reverse with the indicator lit,
//! - in between: stop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info, trace, warn};
use robot_if::{eqpt::RangeSensor, rc::RcKey};
use std::time::Duration;

use super::{AutoParams, Mode, ModeCtx, ModeId};
use crate::sched::TimerHandle;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct Auto {
    params: AutoParams,

    /// Present while the mode is started
    run: Option<AutoRun>,
}

struct AutoRun {
    sensor: Box<dyn RangeSensor>,
    timer: TimerHandle,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Auto {
    pub fn new(params: AutoParams) -> Self {
        Self { params, run: None }
    }
}

impl Mode for Auto {
    fn id(&self) -> ModeId {
        ModeId::Auto
    }

    fn start(&mut self, ctx: &mut ModeCtx) {
        let sensor = ctx.eqpt.range_sensor();
        let timer = ctx.sched.every(
            ModeId::Auto,
            ctx.now,
            Duration::from_millis(self.params.sample_period_ms),
        );

        self.run = Some(AutoRun { sensor, timer });
        info!("Auto mode started");
    }

    fn stop(&mut self, ctx: &mut ModeCtx) {
        if let Some(run) = self.run.take() {
            ctx.sched.cancel(run.timer);
        }
        ctx.indicator.turn_off();
        ctx.movement.stop();
        info!("Auto mode stopped");
    }

    fn handle_key(&mut self, key: RcKey, _ctx: &mut ModeCtx) {
        trace!("Auto ignoring {}", key);
    }

    fn on_timer(&mut self, handle: TimerHandle, ctx: &mut ModeCtx) {
        let run = match self.run.as_mut() {
            Some(r) if r.timer == handle => r,
            _ => {
                trace!("Auto ignoring stale timer");
                return;
            }
        };

        if !ctx.state.power_on {
            trace!("Auto sample skipped, power is off");
            return;
        }

        let distance_cm = match run.sensor.ping() {
            Ok(d) => d,
            Err(e) => {
                warn!("Auto sample skipped, ranging failed: {}", e);
                return;
            }
        };

        debug!("Auto range {:.1} cm", distance_cm);

        let s = ctx.state.speed;
        if distance_cm > self.params.far_cm {
            ctx.movement.set(s, s);
            ctx.indicator.turn_off();
        }
        else if distance_cm < self.params.near_cm {
            ctx.movement.set(-s, -s);
            ctx.indicator.turn_on();
        }
        else {
            ctx.movement.stop();
            ctx.indicator.turn_off();
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mode::CtxFixture, sim::Actuation};
    use robot_if::eqpt::EqptError;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn sample(auto: &mut Auto, fix: &mut CtxFixture, now: Duration) {
        while let Some(f) = fix.sched.pop_due(now) {
            auto.on_timer(f.handle, &mut fix.ctx(f.due));
        }
    }

    #[test]
    fn test_samples_every_period() {
        let mut fix = CtxFixture::new();
        let mut auto = Auto::new(AutoParams::default());
        auto.start(&mut fix.ctx(ms(0)));
        assert_eq!(fix.eqpt.world().borrow().attached().range, 1);

        sample(&mut auto, &mut fix, ms(350));

        // Default range of 50 cm is far, three forward samples
        let acts = fix.take_actuations();
        assert_eq!(
            acts.iter()
                .filter(|a| **a == Actuation::DriveGo { left: 0.5, right: 0.5 })
                .count(),
            3
        );
    }

    #[test]
    fn test_ranging_failure_skips_cycle() {
        let mut fix = CtxFixture::new();
        let mut auto = Auto::new(AutoParams::default());
        auto.start(&mut fix.ctx(ms(0)));

        fix.eqpt
            .world()
            .borrow_mut()
            .set_distance(Err(EqptError::RangeTimeout));
        sample(&mut auto, &mut fix, ms(100));
        assert!(fix.take_actuations().is_empty());
    }

    #[test]
    fn test_stop_releases_sensor() {
        let mut fix = CtxFixture::new();
        let mut auto = Auto::new(AutoParams::default());
        auto.start(&mut fix.ctx(ms(0)));
        auto.stop(&mut fix.ctx(ms(50)));

        assert_eq!(fix.eqpt.world().borrow().attached().range, 0);
        assert_eq!(fix.sched.num_armed(), 0);
        assert_eq!(
            fix.take_actuations(),
            vec![Actuation::IndicatorOff, Actuation::DriveStop]
        );
    }

    #[test]
    fn test_stop_while_reversing_clears_indicator() {
        let mut fix = CtxFixture::new();
        let mut auto = Auto::new(AutoParams::default());
        auto.start(&mut fix.ctx(ms(0)));

        fix.eqpt.world().borrow_mut().set_distance(Ok(5.0));
        sample(&mut auto, &mut fix, ms(100));
        assert_eq!(
            fix.take_actuations(),
            vec![
                Actuation::DriveGo { left: -0.5, right: -0.5 },
                Actuation::IndicatorOn
            ]
        );

        auto.stop(&mut fix.ctx(ms(150)));
        assert_eq!(
            fix.take_actuations(),
            vec![Actuation::IndicatorOff, Actuation::DriveStop]
        );
    }
}
