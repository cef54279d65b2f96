//! # Robot Controller Benchmark

use criterion::{criterion_group, criterion_main, Criterion};
use std::time::Duration;

use robot_if::{eqpt::Wheel, rc::RcKey};
use robot_lib::{
    ctrl::RobotCtrl,
    movement::{CruiseCtrl, CruiseParams, MovementCmd},
    params::ExecParams,
    sim::{SimEqpt, SimParams},
};

fn cruise_pulse_benchmark(c: &mut Criterion) {
    let mut eqpt = SimEqpt::new(SimParams::default());
    let world = eqpt.world();

    let mut cruise = CruiseCtrl::connect(&CruiseParams::default(), &mut eqpt);
    cruise.start(Duration::ZERO);
    cruise.set(MovementCmd::new(0.5, 0.5));

    let mut t = Duration::ZERO;

    // Pulses spaced so that the wheel looks slow, every 12th ramps the duty
    c.bench_function("CruiseCtrl::on_pulse", |b| {
        b.iter(|| {
            t += Duration::from_millis(50);
            cruise.on_pulse(Wheel::Left, t);
            world.borrow_mut().clear_actuations();
        })
    });
}

fn dispatch_benchmark(c: &mut Criterion) {
    let eqpt = SimEqpt::new(SimParams::default());
    let world = eqpt.world();

    let mut ctrl = RobotCtrl::new(ExecParams::default(), Box::new(eqpt), Duration::ZERO).unwrap();

    let keys = [RcKey::Top, RcKey::Left, RcKey::Plus, RcKey::Minus, RcKey::Bottom];
    let mut t = Duration::ZERO;
    let mut i = 0;

    // Events spaced past the debounce window so every one is handled
    c.bench_function("RobotCtrl::handle_remote", |b| {
        b.iter(|| {
            t += Duration::from_millis(300);
            i = (i + 1) % keys.len();
            ctrl.handle_remote(keys[i], t);
            world.borrow_mut().clear_actuations();
        })
    });

    ctrl.handle_remote(RcKey::Blue, t + Duration::from_secs(1));
    let mut t = t + Duration::from_secs(1);

    // Line following sample, one timer per 20 ms
    c.bench_function("RobotCtrl::tick::line", |b| {
        b.iter(|| {
            t += Duration::from_millis(20);
            ctrl.tick(t);
            world.borrow_mut().clear_actuations();
        })
    });
}

criterion_group!(benches, cruise_pulse_benchmark, dispatch_benchmark);
criterion_main!(benches);
