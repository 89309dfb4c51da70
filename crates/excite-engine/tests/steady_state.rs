//! Integration test: unstimulated tissue.
//!
//! Without a stimulus every node of a uniform sheet sees the same
//! inputs, so states must stay bit-identical across the sheet, and no
//! activation may be recorded. Passive columns must never excite.

mod common;

use excite_core::CellType;
use excite_engine::{CancelToken, NoopObserver, Simulation};
use excite_test_utils::assert_all_identical;
use excite_test_utils::fixtures::{fibrotic_sheet, uniform_sheet};

use common::{corner_config, quiet_config};

#[test]
fn uniform_sheet_stays_homogeneous() {
    let mut sim = Simulation::new(quiet_config(), uniform_sheet(8, 8)).unwrap();
    for _ in 0..200 {
        let m = sim.step().unwrap();
        assert_eq!(m.stimulated_nodes, 0);
        assert_all_identical(sim.states());
    }
    let v = sim.voltages()[0];
    assert!((v + 85.23).abs() < 1.0, "resting voltage drifted to {v}");
    for node in sim.lattice().nodes() {
        assert_eq!(sim.detector().timing(node.index(), 1).unwrap().upstroke, None);
    }
}

#[test]
fn quiet_runs_are_reproducible() {
    let run = || {
        let mut sim = Simulation::new(quiet_config(), uniform_sheet(5, 7)).unwrap();
        sim.run(50, &CancelToken::new(), &mut NoopObserver).unwrap();
        sim.states().to_vec()
    };
    assert_eq!(run(), run());
}

#[test]
fn passive_column_never_excites() {
    // Column 6 conducts below the excitability threshold.
    let lattice = fibrotic_sheet(10, 10, 6, 0.02);
    let mut sim = Simulation::new(corner_config(4.0), lattice).unwrap();
    let passive: Vec<_> = sim
        .lattice()
        .nodes()
        .filter(|&n| sim.cell_types()[n.index()] == CellType::Passive)
        .collect();
    assert_eq!(passive.len(), 10);

    let initial: Vec<_> = passive.iter().map(|&n| sim.states()[n.index()]).collect();
    sim.run(300, &CancelToken::new(), &mut NoopObserver).unwrap();
    for (&node, before) in passive.iter().zip(&initial) {
        let after = sim.states()[node.index()];
        // Only the voltage moves, and only through diffusion.
        assert_eq!(&after.as_array()[1..], &before.as_array()[1..]);
        let timing = sim.detector().timing(node.index(), 1).unwrap();
        assert_eq!(timing.upstroke, None, "passive node {node} recorded an upstroke");
    }
}
