//! Integration test: sinks attached to a running simulation.

use std::fs;

use excite_core::StepId;
use excite_engine::{CancelToken, Simulation, SimulationConfig};
use excite_io::{OutputConfig, OutputSinks};
use excite_test_utils::fixtures::uniform_sheet;

fn corner_config() -> SimulationConfig {
    let mut cfg = SimulationConfig::default();
    cfg.stimulus.electrode = (0, 0);
    cfg.stimulus.electrode_radius = 3.0;
    // The second primary pulse falls well after every test run ends.
    cfg.stimulus.s1_beats = 2;
    cfg.stimulus.s2_beats = 0;
    cfg.detection.start_time = 0.0;
    cfg
}

#[test]
fn run_writes_snapshots_electrogram_and_maps() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = Simulation::new(corner_config(), uniform_sheet(8, 10)).unwrap();
    let out = OutputConfig {
        dir: dir.path().join("out"),
        snapshot_interval: Some(5.0),
        electrogram_sites: vec![(0, 0), (7, 9)],
        ..OutputConfig::default()
    };
    let mut sinks = OutputSinks::create(out, &sim).unwrap();
    sim.run(200, &CancelToken::new(), &mut sinks).unwrap();
    assert_eq!(sim.step_id(), StepId(200));
    assert_eq!(sinks.failures(), 0);
    assert_eq!(sinks.snapshots_written(), 4);

    let out = dir.path().join("out");
    for ms in [5, 10, 15, 20] {
        let text = fs::read_to_string(out.join(format!("Vm{ms:04}.stf"))).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "DIMENSIONS 10 8");
        assert_eq!(lines.len(), 6 + 8);
        assert_eq!(lines[6].split_whitespace().count(), 10);
    }

    let eg = fs::read_to_string(out.join("electrograms.dat")).unwrap();
    let rows: Vec<Vec<f64>> = eg
        .lines()
        .map(|l| l.split(' ').map(|x| x.parse().unwrap()).collect())
        .collect();
    assert_eq!(rows.len(), 20);
    assert!(rows.iter().all(|r| r.len() == 2));
    // The stimulated corner is depolarised after 1 ms; the far corner
    // has not been reached.
    assert!(rows[0][0] > -40.0);
    assert!(rows[0][1] < -80.0);

    for beat in 1..=2 {
        assert!(out.join(format!("upStrokeTimeS{beat}.stf")).exists());
        assert!(out.join(format!("downStrokeTimeS{beat}.stf")).exists());
    }
    let up = fs::read_to_string(out.join("upStrokeTimeS1.stf")).unwrap();
    let first_row: Vec<f64> = up
        .lines()
        .nth(6)
        .unwrap()
        .split_whitespace()
        .map(|x| x.parse().unwrap())
        .collect();
    assert!(first_row[0] > 0.0 && first_row[0] < 3.0);
    let second = fs::read_to_string(out.join("upStrokeTimeS2.stf")).unwrap();
    assert!(second.lines().nth(6).unwrap().starts_with("-1.0000 "));
    let diffusion = fs::read_to_string(out.join("diffusion.stf")).unwrap();
    assert!(diffusion.lines().nth(6).unwrap().starts_with("0.2000 "));
}

#[test]
fn write_failures_do_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = Simulation::new(corner_config(), uniform_sheet(4, 4)).unwrap();
    let out_dir = dir.path().join("out");
    let out = OutputConfig {
        dir: out_dir.clone(),
        snapshot_interval: Some(1.0),
        electrogram_interval: None,
        activation_maps: false,
        ..OutputConfig::default()
    };
    let mut sinks = OutputSinks::create(out, &sim).unwrap();
    // Pull the directory out from under the sinks.
    fs::remove_dir_all(&out_dir).unwrap();
    let summary = sim.run(30, &CancelToken::new(), &mut sinks).unwrap();
    assert_eq!(summary.steps, 30);
    assert_eq!(sinks.snapshots_written(), 0);
    assert_eq!(sinks.failures(), 3);
}

#[test]
fn electrogram_site_must_be_a_node() {
    let dir = tempfile::tempdir().unwrap();
    let sim = Simulation::new(corner_config(), uniform_sheet(4, 4)).unwrap();
    let out = OutputConfig {
        dir: dir.path().to_path_buf(),
        electrogram_sites: vec![(9, 9)],
        ..OutputConfig::default()
    };
    assert!(OutputSinks::create(out, &sim).is_err());
}
