//! Integration test: checkpoints through the file system.
//!
//! A run checkpointed to disk, read back and restored into a fresh
//! simulation must continue exactly like the uninterrupted run.

use excite_core::{StateVector, StepId, NUM_STATES};
use excite_engine::{
    BeatSnapshot, BeatTiming, CancelToken, Checkpoint, NoopObserver, ProtocolSnapshot,
    Simulation, SimulationConfig, StimulusState,
};
use excite_io::{decode_checkpoint, encode_checkpoint, read_checkpoint, write_checkpoint};
use excite_test_utils::fixtures::uniform_sheet;
use proptest::prelude::*;

fn config() -> SimulationConfig {
    let mut cfg = SimulationConfig::default();
    cfg.stimulus.electrode = (3, 3);
    cfg.stimulus.electrode_radius = 2.5;
    cfg.stimulus.s1_beats = 1;
    cfg.stimulus.s2_beats = 0;
    cfg.detection.start_time = 0.0;
    cfg
}

#[test]
fn resume_from_file_matches_uninterrupted_run() {
    let dir = tempfile::tempdir().unwrap();
    let cancel = CancelToken::new();

    let mut original = Simulation::new(config(), uniform_sheet(7, 7)).unwrap();
    original.run(40, &cancel, &mut NoopObserver).unwrap();
    let path = write_checkpoint(dir.path(), &original.checkpoint()).unwrap();
    assert_eq!(path.file_name().unwrap(), "checkpoint000040.out");

    let mut resumed = Simulation::new(config(), uniform_sheet(7, 7)).unwrap();
    resumed.restore(read_checkpoint(&path).unwrap()).unwrap();
    assert_eq!(resumed.step_id(), StepId(40));

    original.run(100, &cancel, &mut NoopObserver).unwrap();
    resumed.run(100, &cancel, &mut NoopObserver).unwrap();
    for (a, b) in original.states().iter().zip(resumed.states()) {
        for (x, y) in a.as_array().iter().zip(b.as_array()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }
    assert_eq!(original.detector().snapshot(), resumed.detector().snapshot());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_checkpoint(&dir.path().join("nope.out")).unwrap_err();
    assert!(matches!(err, excite_io::CheckpointError::Io(_)));
}

fn arb_state() -> impl Strategy<Value = StateVector> {
    proptest::collection::vec(-1e3f64..1e3, NUM_STATES).prop_map(|v| {
        let mut s = StateVector::resting();
        s.0.copy_from_slice(&v);
        s
    })
}

fn arb_timing() -> impl Strategy<Value = BeatTiming> {
    (
        proptest::option::of(0.0f64..5000.0),
        proptest::option::of(0.0f64..5000.0),
    )
        .prop_map(|(upstroke, downstroke)| BeatTiming {
            upstroke,
            downstroke,
        })
}

proptest! {
    #[test]
    fn arbitrary_checkpoints_round_trip(
        states in proptest::collection::vec(arb_state(), 1..20),
        step in 0u64..1_000_000,
        bootstrapped in any::<bool>(),
        timing in arb_timing(),
    ) {
        let n = states.len();
        let cp = Checkpoint {
            step: StepId(step),
            time: step as f64 * 0.1,
            previous_dv: states.iter().map(|s| s.voltage() * 0.01).collect(),
            states,
            bootstrapped,
            protocol: ProtocolSnapshot {
                state: StimulusState::S1Active { beat: 2, until: 402.0 },
                s1_delivered: 2,
                s2_delivered: 0,
            },
            beats: BeatSnapshot {
                max_beats: 2,
                beat: vec![1; n],
                timings: vec![timing; 2 * n],
            },
        };
        let mut buf = Vec::new();
        encode_checkpoint(&mut buf, &cp).unwrap();
        let back = decode_checkpoint(&mut buf.as_slice()).unwrap();
        prop_assert_eq!(back, cp);
    }
}
