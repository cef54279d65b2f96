//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc, time::Duration};

use robot_lib::{
    ctrl::RobotCtrl,
    params::ExecParams,
    sim::{Actuation, SimEqpt, SimParams, SimWorld},
};

/// Length of the acknowledgement flash on every accepted key.
pub const ACK: Actuation = Actuation::IndicatorBlink {
    on: Duration::from_millis(300),
    off: None,
};

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// A controller with default parameters running on simulated equipment.
pub fn rig() -> (RobotCtrl, Rc<RefCell<SimWorld>>) {
    rig_with(ExecParams::default())
}

pub fn rig_with(params: ExecParams) -> (RobotCtrl, Rc<RefCell<SimWorld>>) {
    let eqpt = SimEqpt::new(SimParams::default());
    let world = eqpt.world();
    let ctrl = RobotCtrl::new(params, Box::new(eqpt), Duration::ZERO).unwrap();
    (ctrl, world)
}

/// Drain the actuations made so far.
pub fn take(world: &Rc<RefCell<SimWorld>>) -> Vec<Actuation> {
    world.borrow_mut().take_actuations()
}

/// The actuations made so far without the acknowledgement flashes.
pub fn take_no_ack(world: &Rc<RefCell<SimWorld>>) -> Vec<Actuation> {
    take(world).into_iter().filter(|a| *a != ACK).collect()
}

/// Run the world and controller together from `from` to `to` in `step` increments, feeding the
/// generated encoder pulses to the controller.
pub fn run(
    ctrl: &mut RobotCtrl,
    world: &Rc<RefCell<SimWorld>>,
    from: Duration,
    to: Duration,
    step: Duration,
) {
    let mut t = from;
    while t < to {
        let pulses = world.borrow_mut().advance(t, step);
        for (pt, wheel) in pulses {
            ctrl.tick(pt);
            ctrl.handle_encoder_pulse(wheel, pt);
        }

        t += step;
        ctrl.tick(t);
    }
}
