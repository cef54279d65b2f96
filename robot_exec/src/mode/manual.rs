//! Manual mode, the directional keys drive the robot until told otherwise

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, trace};
use robot_if::rc::RcKey;

use super::{DriveDemand, Mode, ModeCtx, ModeId};
use crate::sched::TimerHandle;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Manual;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Manual {
    pub fn new() -> Self {
        Self
    }
}

impl Mode for Manual {
    fn id(&self) -> ModeId {
        ModeId::Manual
    }

    fn start(&mut self, _ctx: &mut ModeCtx) {
        info!("Manual mode started");
    }

    fn stop(&mut self, ctx: &mut ModeCtx) {
        ctx.movement.stop();
        info!("Manual mode stopped");
    }

    fn handle_key(&mut self, key: RcKey, ctx: &mut ModeCtx) {
        if !ctx.drive_keys_enabled() {
            trace!("Manual ignoring {}, drive keys disabled", key);
            return;
        }

        if key == RcKey::Play {
            ctx.movement.stop();
            ctx.indicator.turn_off();
            return;
        }

        match DriveDemand::for_key(key, ctx.state.speed) {
            Some(d) => {
                ctx.movement.set(d.left, d.right);

                // The indicator is lit while reversing
                if d.reversing {
                    ctx.indicator.turn_on();
                }
                else {
                    ctx.indicator.turn_off();
                }
            }
            None => trace!("Manual ignoring {}", key),
        }
    }

    fn on_timer(&mut self, _handle: TimerHandle, _ctx: &mut ModeCtx) {
        trace!("Manual has no timers");
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mode::CtxFixture, sim::Actuation};
    use std::time::Duration;

    #[test]
    fn test_key_table() {
        let mut fix = CtxFixture::new();
        let mut manual = Manual::new();

        let table = [
            (RcKey::Left, 0.0, 0.5, false),
            (RcKey::Right, 0.5, 0.0, false),
            (RcKey::Top, 0.5, 0.5, false),
            (RcKey::Bottom, -0.5, -0.5, true),
            (RcKey::TopLeft, -0.5, 0.5, false),
            (RcKey::TopRight, 0.5, -0.5, false),
            (RcKey::BottomLeft, 0.5, -0.5, true),
            (RcKey::BottomRight, -0.5, 0.5, true),
        ];

        for (key, left, right, lit) in table.iter() {
            manual.handle_key(*key, &mut fix.ctx(Duration::ZERO));

            let ind = if *lit {
                Actuation::IndicatorOn
            }
            else {
                Actuation::IndicatorOff
            };
            assert_eq!(
                fix.take_actuations(),
                vec![
                    Actuation::DriveGo {
                        left: *left,
                        right: *right
                    },
                    ind
                ],
                "{}",
                key
            );
        }

        manual.handle_key(RcKey::Play, &mut fix.ctx(Duration::ZERO));
        assert_eq!(
            fix.take_actuations(),
            vec![Actuation::DriveStop, Actuation::IndicatorOff]
        );
    }

    #[test]
    fn test_guards() {
        let mut fix = CtxFixture::new();
        let mut manual = Manual::new();

        // Unmapped
        manual.handle_key(RcKey::Z, &mut fix.ctx(Duration::ZERO));
        assert!(fix.take_actuations().is_empty());

        fix.state.power_on = false;
        manual.handle_key(RcKey::Top, &mut fix.ctx(Duration::ZERO));
        assert!(fix.take_actuations().is_empty());

        fix.state.power_on = true;
        fix.head_enabled = true;
        manual.handle_key(RcKey::Top, &mut fix.ctx(Duration::ZERO));
        assert!(fix.take_actuations().is_empty());
    }
}
