//! Integration test: checkpoint and restore fidelity.
//!
//! A simulation restored from a mid-run checkpoint must continue
//! bit-for-bit like the run it was taken from, including sub-stepping
//! history, stimulus progress and detector records.

mod common;

use excite_core::StepId;
use excite_engine::{CancelToken, NoopObserver, RestoreError, Simulation};
use excite_test_utils::fixtures::uniform_sheet;

use common::corner_config;

fn assert_bitwise_equal(a: &Simulation, b: &Simulation) {
    assert_eq!(a.step_id(), b.step_id());
    for (i, (x, y)) in a.states().iter().zip(b.states()).enumerate() {
        for (c, (p, q)) in x.as_array().iter().zip(y.as_array()).enumerate() {
            assert_eq!(p.to_bits(), q.to_bits(), "node {i} component {c}: {p} vs {q}");
        }
    }
    assert_eq!(a.stimulus_state(), b.stimulus_state());
    assert_eq!(a.detector().snapshot(), b.detector().snapshot());
}

#[test]
fn restored_run_matches_uninterrupted_run() {
    let cancel = CancelToken::new();
    let mut original = Simulation::new(corner_config(3.0), uniform_sheet(9, 9)).unwrap();
    // Stop inside the stimulus pulse, while nodes are mid-upstroke.
    original.run(15, &cancel, &mut NoopObserver).unwrap();
    let cp = original.checkpoint();
    assert_eq!(cp.step, StepId(15));
    assert!(cp.bootstrapped);
    assert!(cp.previous_dv.iter().any(|&dv| dv != 0.0));

    let mut resumed = Simulation::new(corner_config(3.0), uniform_sheet(9, 9)).unwrap();
    resumed.restore(cp).unwrap();
    assert_bitwise_equal(&original, &resumed);

    original.run(200, &cancel, &mut NoopObserver).unwrap();
    resumed.run(200, &cancel, &mut NoopObserver).unwrap();
    assert_bitwise_equal(&original, &resumed);
}

#[test]
fn restore_before_first_step_keeps_bootstrap_pending() {
    let fresh = Simulation::new(corner_config(3.0), uniform_sheet(6, 6)).unwrap();
    let cp = fresh.checkpoint();
    assert!(!cp.bootstrapped);

    let mut a = Simulation::new(corner_config(3.0), uniform_sheet(6, 6)).unwrap();
    let mut b = Simulation::new(corner_config(3.0), uniform_sheet(6, 6)).unwrap();
    b.restore(cp).unwrap();
    a.run(30, &CancelToken::new(), &mut NoopObserver).unwrap();
    b.run(30, &CancelToken::new(), &mut NoopObserver).unwrap();
    assert_bitwise_equal(&a, &b);
}

#[test]
fn restore_rejects_mismatched_beat_records() {
    let sim = Simulation::new(corner_config(3.0), uniform_sheet(6, 6)).unwrap();
    let cp = sim.checkpoint();
    let mut cfg = corner_config(3.0);
    cfg.stimulus.s1_beats = 3;
    let mut other = Simulation::new(cfg, uniform_sheet(6, 6)).unwrap();
    assert!(matches!(
        other.restore(cp),
        Err(RestoreError::BeatRecords { .. })
    ));
}

#[test]
fn restore_rejects_non_finite_state() {
    let mut sim = Simulation::new(corner_config(3.0), uniform_sheet(4, 4)).unwrap();
    let mut cp = sim.checkpoint();
    cp.states[5].0[3] = f64::NAN;
    assert_eq!(sim.restore(cp), Err(RestoreError::NonFiniteState { node: 5 }));
}
