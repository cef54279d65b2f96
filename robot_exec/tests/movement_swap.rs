//! Movement strategy swapping and cruise control in the loop

mod common;

use common::*;
use robot_if::{eqpt::Wheel, rc::RcKey};
use robot_lib::{movement::MovementKind, sim::Actuation};

fn motor_duties(acts: &[Actuation], wheel: Wheel) -> Vec<f64> {
    acts.iter()
        .filter_map(|a| match a {
            Actuation::Motor { wheel: w, duty } if *w == wheel => Some(*duty),
            _ => None,
        })
        .collect()
}

#[test]
fn swap_tears_down_old_strategy() {
    let (mut ctrl, world) = rig();

    ctrl.handle_remote(RcKey::Y, ms(1000));
    assert_eq!(ctrl.movement_kind(), MovementKind::CruiseCtrl);

    let attached = world.borrow().attached();
    assert_eq!(attached.drive, 0);
    assert_eq!(attached.motors, 2);
    assert_eq!(attached.encoders, 2);

    // Old strategy stopped, new one silent until commanded
    assert_eq!(take_no_ack(&world), vec![Actuation::DriveStop]);

    ctrl.handle_remote(RcKey::Y, ms(1300));
    assert_eq!(ctrl.movement_kind(), MovementKind::DirectDrive);

    let attached = world.borrow().attached();
    assert_eq!(attached.drive, 1);
    assert_eq!(attached.motors, 0);
    assert_eq!(attached.encoders, 0);

    // Cruise stop zeroes both motors, then the encoders are detached
    assert_eq!(
        take_no_ack(&world),
        vec![
            Actuation::Motor { wheel: Wheel::Left, duty: 0.0 },
            Actuation::Motor { wheel: Wheel::Right, duty: 0.0 },
            Actuation::EncoderDetach(Wheel::Left),
            Actuation::EncoderDetach(Wheel::Right),
        ]
    );
}

#[test]
fn mode_survives_swap() {
    let (mut ctrl, world) = rig();

    ctrl.handle_remote(RcKey::Y, ms(1000));
    ctrl.handle_remote(RcKey::Top, ms(1300));

    // Manual drives through cruise control, the right wheel is mirrored
    assert_eq!(
        take_no_ack(&world),
        vec![
            Actuation::DriveStop,
            Actuation::Motor { wheel: Wheel::Left, duty: 0.7 },
            Actuation::Motor { wheel: Wheel::Right, duty: -0.7 },
            Actuation::IndicatorOff,
        ]
    );
}

#[test]
fn pulses_ignored_under_direct_drive() {
    let (mut ctrl, world) = rig();

    ctrl.handle_remote(RcKey::Top, ms(1000));
    take(&world);

    for i in 0..48 {
        ctrl.handle_encoder_pulse(Wheel::Left, ms(1000 + 10 * i));
    }
    assert!(take(&world).is_empty());
}

#[test]
fn cruise_ramps_slow_wheels_up() {
    let (mut ctrl, world) = rig();

    ctrl.handle_remote(RcKey::Y, ms(1000));
    ctrl.handle_remote(RcKey::Top, ms(1300));
    take(&world);

    // At full duty the simulated wheels only reach 0.5 m/s, so the 0.7 demand is never met
    run(&mut ctrl, &world, ms(1300), ms(21_300), ms(10));

    let acts = take(&world);
    let left = motor_duties(&acts, Wheel::Left);
    let right = motor_duties(&acts, Wheel::Right);

    assert!(left.len() > 10);
    assert!(left.windows(2).all(|w| w[1] >= w[0]));
    assert!(left.iter().all(|d| *d <= 1.0));
    assert_eq!(*left.last().unwrap(), 1.0);

    // Mirrored wheel ramps the same way with the sign flipped
    assert!(right.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(*right.last().unwrap(), -1.0);
}

#[test]
fn cruise_eases_off_fast_wheels() {
    let mut params = robot_lib::params::ExecParams::default();

    // Overstating the circumference makes every sample look four times as fast
    params.cruise.circumference_m = 0.195 * 4.0;
    let (mut ctrl, world) = rig_with(params);

    ctrl.handle_remote(RcKey::Y, ms(1000));
    ctrl.handle_remote(RcKey::Top, ms(1300));
    take(&world);

    run(&mut ctrl, &world, ms(1300), ms(11_300), ms(10));

    let left = motor_duties(&take(&world), Wheel::Left);

    assert!(left.len() > 5);
    assert!(left.windows(2).all(|w| w[1] <= w[0]));
    assert!(left.iter().all(|d| *d >= 0.0));
    assert!(*left.last().unwrap() < 0.7);
}
