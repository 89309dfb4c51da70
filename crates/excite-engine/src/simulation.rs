//! The operator-splitting scheduler.
//!
//! [`Simulation`] owns every piece of mutable run state (node states,
//! clock, protocol, detector) so independent instances never interact.
//! Each [`step()`](Simulation::step) performs:
//!
//! 1. on the very first step, a bootstrap half-step of diffusion;
//! 2. the stimulus protocol transition, from the clock and the
//!    reference node's voltage;
//! 3. the reaction stage on every node, adaptively sub-stepped;
//! 4. a finiteness and range check on every voltage;
//! 5. two diffusion half-steps, each double-buffered and committed;
//! 6. activation/recovery detection on the step's start and end voltages,
//!    stamped with the step's start time.
//!
//! Stages 3, 5 and 6 run on the rayon pool. Every node reads only the
//! previous buffer and writes only its own slot, so results do not
//! depend on the number of threads.

use std::time::Instant;

use excite_core::{CellType, NodeId, StateVector, StepError, StepId};
use excite_ionic::{LookupTable, ReactionInput, ReactionIntegrator};
use excite_propagators::{diffuse, DiffusionStencil};
use excite_space::Lattice;
use rayon::prelude::*;

use crate::cancel::CancelToken;
use crate::checkpoint::{Checkpoint, RestoreError};
use crate::clock::Clock;
use crate::config::{ConfigError, SimulationConfig};
use crate::detector::Detector;
use crate::metrics::StepMetrics;
use crate::observer::StepObserver;
use crate::stimulus::{StimulusProtocol, StimulusState};

/// Outcome of [`Simulation::run`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    /// Steps executed by this call.
    pub steps: u64,
    /// Whether the run stopped early because of cancellation.
    pub cancelled: bool,
    /// Simulated time when the run stopped (ms).
    pub final_time: f64,
}

/// A 2D reaction-diffusion simulation.
pub struct Simulation {
    config: SimulationConfig,
    lattice: Lattice,
    integrator: ReactionIntegrator,
    stencil: Box<dyn DiffusionStencil>,
    cell_types: Vec<CellType>,
    excitable: Vec<bool>,
    electrode: Vec<bool>,
    reference: NodeId,

    states: Vec<StateVector>,
    previous_dv: Vec<f64>,
    start_voltage: Vec<f64>,
    field: Vec<f64>,
    scratch: Vec<f64>,
    clock: Clock,
    bootstrapped: bool,
    protocol: StimulusProtocol,
    detector: Detector,
    diverged: Option<StepError>,
}

// Compile-time assertion: Simulation can be moved to a worker thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Simulation>();
    }
};

impl Simulation {
    /// Validate `config` against `lattice`, build the lookup table and
    /// place every node in the initial state.
    pub fn new(config: SimulationConfig, lattice: Lattice) -> Result<Self, ConfigError> {
        config.validate(&lattice)?;
        let stencil = config
            .diffusion
            .build(config.dx)
            .map_err(|reason| ConfigError::InvalidDiffusion { reason })?;

        let started = Instant::now();
        let table = LookupTable::build();
        tracing::debug!(
            elapsed_us = started.elapsed().as_micros() as u64,
            "lookup table built"
        );
        let integrator =
            ReactionIntegrator::new(table, config.substeps, config.conduction_threshold);

        let n = lattice.node_count();
        let cell_types: Vec<CellType> = lattice
            .nodes()
            .map(|node| integrator.classify(lattice.diffusion(node), lattice.region(node)))
            .collect();
        let excitable = cell_types.iter().map(|c| c.is_excitable()).collect();

        let (er, ec) = config.stimulus.electrode;
        let mut electrode = vec![false; n];
        for node in lattice.nodes_within(er, ec, config.stimulus.electrode_radius) {
            electrode[node.index()] = true;
        }
        let (rr, rc) = config.stimulus.reference_position();
        let reference = lattice
            .node_at(rr, rc)
            .ok_or(ConfigError::ReferenceNotNode { row: rr, col: rc })?;

        tracing::info!(
            nodes = n,
            rows = lattice.rows(),
            cols = lattice.cols(),
            stencil = stencil.name(),
            electrode_nodes = electrode.iter().filter(|&&e| e).count(),
            passive_nodes = cell_types.iter().filter(|c| !c.is_excitable()).count(),
            "simulation initialised"
        );

        Ok(Self {
            clock: Clock::new(config.dt),
            protocol: StimulusProtocol::new(config.stimulus.clone()),
            detector: Detector::new(config.detection.clone(), config.stimulus.s1_beats, n),
            states: vec![config.initial_state; n],
            previous_dv: vec![0.0; n],
            start_voltage: vec![0.0; n],
            field: vec![0.0; n],
            scratch: vec![0.0; n],
            bootstrapped: false,
            diverged: None,
            config,
            lattice,
            integrator,
            stencil,
            cell_types,
            excitable,
            electrode,
            reference,
        })
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// Configuration in use.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The lattice.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Steps completed so far.
    pub fn step_id(&self) -> StepId {
        self.clock.step()
    }

    /// Simulated time (ms).
    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    /// Per-node states in node order.
    pub fn states(&self) -> &[StateVector] {
        &self.states
    }

    /// Voltage of `node` (mV).
    pub fn voltage(&self, node: NodeId) -> f64 {
        self.states[node.index()].voltage()
    }

    /// Per-node voltages in node order.
    pub fn voltages(&self) -> Vec<f64> {
        self.states.iter().map(StateVector::voltage).collect()
    }

    /// Per-node cell types.
    pub fn cell_types(&self) -> &[CellType] {
        &self.cell_types
    }

    /// Whether `node` lies under the electrode.
    pub fn is_electrode(&self, node: NodeId) -> bool {
        self.electrode[node.index()]
    }

    /// Node whose voltage arms extra stimuli.
    pub fn reference_node(&self) -> NodeId {
        self.reference
    }

    /// Current stimulus protocol state.
    pub fn stimulus_state(&self) -> StimulusState {
        self.protocol.state()
    }

    /// Activation/recovery records.
    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    // ── Stepping ────────────────────────────────────────────────────

    fn diffuse_half(&mut self) {
        let half = 0.5 * self.clock.dt();
        for (v, s) in self.field.iter_mut().zip(&self.states) {
            *v = s.voltage();
        }
        diffuse(
            self.stencil.as_ref(),
            &self.lattice,
            &self.field,
            &mut self.scratch,
            half,
        );
        self.states
            .par_iter_mut()
            .zip(self.scratch.par_iter())
            .for_each(|(s, &v)| s.set_voltage(v));
    }

    fn bootstrap(&mut self) {
        self.diffuse_half();
        // field still holds the voltages diffusion started from.
        for ((dv, s), &before) in self
            .previous_dv
            .iter_mut()
            .zip(&self.states)
            .zip(&self.field)
        {
            *dv = s.voltage() - before;
        }
        self.bootstrapped = true;
    }

    fn check_divergence(&self, step: StepId) -> Result<(), StepError> {
        let (low, high) = self.config.voltage_bounds;
        let bad = self.states.par_iter().position_first(|s| {
            let v = s.voltage();
            !(v.is_finite() && (low..=high).contains(&v))
        });
        match bad {
            Some(i) => Err(StepError::NumericalDivergence {
                node: NodeId(i as u32),
                step,
                voltage: self.states[i].voltage(),
            }),
            None => Ok(()),
        }
    }

    /// Advance the simulation by one global step.
    ///
    /// On [`StepError::NumericalDivergence`] node states are left as the
    /// reaction stage produced them and every later call returns the
    /// same error.
    pub fn step(&mut self) -> Result<StepMetrics, StepError> {
        if let Some(err) = &self.diverged {
            return Err(err.clone());
        }
        let step_start = Instant::now();
        let step = self.clock.step();
        let time = self.clock.time();
        let dt = self.clock.dt();
        let mut metrics = StepMetrics::default();

        let mut diffusion_us = 0;
        if !self.bootstrapped {
            let t = Instant::now();
            self.bootstrap();
            diffusion_us += t.elapsed().as_micros() as u64;
        }

        // Stimulus.
        let before = self.protocol.state();
        let reference_v = self.states[self.reference.index()].voltage();
        let phase = self.protocol.advance(time, reference_v);
        if phase.is_delivering() && !before.is_delivering() {
            tracing::info!(%phase, time, step = step.0, "stimulus on");
        }
        let current = self.protocol.current();

        // Reaction.
        let t = Instant::now();
        for (v, s) in self.start_voltage.iter_mut().zip(&self.states) {
            *v = s.voltage();
        }
        let integrator = &self.integrator;
        let (substeps_total, substeps_max) = self
            .states
            .par_iter_mut()
            .zip(self.cell_types.par_iter())
            .zip(self.previous_dv.par_iter())
            .zip(self.electrode.par_iter())
            .map(|(((state, &cell), &previous_dv), &under_electrode)| {
                let input = ReactionInput {
                    interval: dt,
                    previous_dv,
                    stimulus: if under_electrode { current } else { 0.0 },
                };
                integrator
                    .advance(state, cell, input)
                    .map_or(0, |plan| plan.count)
            })
            .fold(
                || (0u64, 0u32),
                |(sum, max), k| (sum + k as u64, max.max(k)),
            )
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1.max(b.1)));
        if let Err(err) = self.check_divergence(step) {
            tracing::error!(%err, "aborting run");
            self.diverged = Some(err.clone());
            return Err(err);
        }
        metrics.reaction_us = t.elapsed().as_micros() as u64;

        // Diffusion: two committed half-steps.
        let t = Instant::now();
        self.diffuse_half();
        self.diffuse_half();
        diffusion_us += t.elapsed().as_micros() as u64;
        metrics.diffusion_us = diffusion_us;

        // Detection and the rate driving next step's sub-stepping.
        let t = Instant::now();
        for (v, s) in self.field.iter_mut().zip(&self.states) {
            *v = s.voltage();
        }
        self.clock.tick();
        self.detector.observe(
            time,
            &self.start_voltage,
            &self.field,
            &self.excitable,
        );
        for ((dv, &end), &start) in self
            .previous_dv
            .iter_mut()
            .zip(&self.field)
            .zip(&self.start_voltage)
        {
            *dv = end - start;
        }
        metrics.detection_us = t.elapsed().as_micros() as u64;

        metrics.substeps_total = substeps_total;
        metrics.substeps_max = substeps_max;
        metrics.stimulus = phase;
        metrics.stimulated_nodes = if phase.is_delivering() {
            self.electrode.iter().filter(|&&e| e).count()
        } else {
            0
        };
        metrics.total_us = step_start.elapsed().as_micros() as u64;
        tracing::debug!(
            step = step.0,
            substeps_total,
            substeps_max,
            total_us = metrics.total_us,
            "step complete"
        );
        Ok(metrics)
    }

    /// Run up to `steps` steps, checking `cancel` before each one and
    /// calling `observer` after each.
    pub fn run(
        &mut self,
        steps: u64,
        cancel: &CancelToken,
        observer: &mut dyn StepObserver,
    ) -> Result<RunSummary, StepError> {
        tracing::info!(steps, from = self.clock.step().0, "run started");
        let mut executed = 0;
        let mut cancelled = false;
        while executed < steps {
            if cancel.is_cancelled() {
                cancelled = true;
                tracing::info!(step = self.clock.step().0, "run cancelled");
                break;
            }
            let metrics = self.step()?;
            executed += 1;
            observer.on_step(self, &metrics);
        }
        observer.on_finish(self);
        let summary = RunSummary {
            steps: executed,
            cancelled,
            final_time: self.clock.time(),
        };
        tracing::info!(
            steps = summary.steps,
            final_time = summary.final_time,
            "run finished"
        );
        Ok(summary)
    }

    // ── Checkpoints ─────────────────────────────────────────────────

    /// Capture everything needed to resume from the current step.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            step: self.clock.step(),
            time: self.clock.time(),
            states: self.states.clone(),
            previous_dv: self.previous_dv.clone(),
            bootstrapped: self.bootstrapped,
            protocol: self.protocol.snapshot(),
            beats: self.detector.snapshot(),
        }
    }

    /// Replace the run state with `checkpoint`.
    ///
    /// The lattice and configuration are kept; the checkpoint must have
    /// been taken from a simulation with the same node count, time step
    /// and beat count.
    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<(), RestoreError> {
        let n = self.states.len();
        for found in [checkpoint.states.len(), checkpoint.previous_dv.len()] {
            if found != n {
                return Err(RestoreError::NodeCountMismatch { expected: n, found });
            }
        }
        let expected = self.clock.time_at(checkpoint.step);
        if (expected - checkpoint.time).abs() > 1e-6 * expected.abs().max(1.0) {
            return Err(RestoreError::ClockMismatch {
                expected,
                found: checkpoint.time,
            });
        }
        if let Some(node) = checkpoint.states.iter().position(|s| !s.is_finite()) {
            return Err(RestoreError::NonFiniteState { node });
        }
        self.detector
            .restore(checkpoint.beats)
            .map_err(|reason| RestoreError::BeatRecords { reason })?;

        self.clock.set(checkpoint.step);
        self.states = checkpoint.states;
        self.previous_dv = checkpoint.previous_dv;
        self.bootstrapped = checkpoint.bootstrapped;
        self.protocol.restore(checkpoint.protocol);
        self.diverged = None;
        tracing::info!(
            step = checkpoint.step.0,
            time = expected,
            "restored from checkpoint"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;

    fn quiet_config() -> SimulationConfig {
        let mut cfg = SimulationConfig::default();
        cfg.stimulus.electrode = (0, 0);
        cfg.stimulus.s1_beats = 0;
        cfg.stimulus.s2_beats = 0;
        cfg.detection.start_time = 0.0;
        cfg
    }

    #[test]
    fn first_step_bootstraps_once() {
        let lattice = Lattice::uniform(4, 4, 0.2).unwrap();
        let mut sim = Simulation::new(quiet_config(), lattice).unwrap();
        assert!(!sim.bootstrapped);
        sim.step().unwrap();
        assert!(sim.bootstrapped);
        assert_eq!(sim.step_id(), StepId(1));
        assert!((sim.time() - 0.1).abs() < 1e-15);
    }

    #[test]
    fn divergence_is_reported_and_sticky() {
        let lattice = Lattice::uniform(3, 3, 0.2).unwrap();
        let mut cfg = quiet_config();
        cfg.voltage_bounds = (-86.0, -84.0);
        cfg.stimulus.s1_beats = 1;
        let mut sim = Simulation::new(cfg, lattice).unwrap();
        let err = sim.step().unwrap_err();
        match &err {
            StepError::NumericalDivergence { node, step, voltage } => {
                assert_eq!(*node, NodeId(0));
                assert_eq!(*step, StepId(0));
                assert!(*voltage > -84.0);
            }
        }
        assert_eq!(sim.step().unwrap_err(), err);
        assert_eq!(sim.step_id(), StepId(0));
    }

    #[test]
    fn beat_records_follow_primary_pulse_count() {
        let lattice = Lattice::uniform(3, 3, 0.2).unwrap();
        let mut cfg = quiet_config();
        cfg.stimulus.s1_beats = SimulationConfig::default().stimulus.s1_beats;
        let sim = Simulation::new(cfg, lattice.clone()).unwrap();
        assert_eq!(sim.detector().max_beats(), 3);

        let mut cfg = quiet_config();
        cfg.stimulus.s1_beats = 5;
        let sim = Simulation::new(cfg, lattice).unwrap();
        assert_eq!(sim.detector().max_beats(), 5);
    }

    #[test]
    fn crossings_are_stamped_with_step_start() {
        let lattice = Lattice::uniform(3, 3, 0.2).unwrap();
        let mut cfg = quiet_config();
        cfg.stimulus.s1_beats = 1;
        let mut sim = Simulation::new(cfg, lattice).unwrap();
        let mut previous = sim.voltage(NodeId(0));
        while sim.detector().timing(0, 1).and_then(|t| t.upstroke).is_none() {
            assert!(sim.step_id() < StepId(100), "node 0 never activated");
            previous = sim.voltage(NodeId(0));
            sim.step().unwrap();
        }
        let up = sim.detector().timing(0, 1).and_then(|t| t.upstroke).unwrap();
        let started = sim.time() - sim.config().dt;
        assert!((up - started).abs() < 1e-12);
        assert!(previous <= -70.0 && sim.voltage(NodeId(0)) > -70.0);
    }

    #[test]
    fn cancelled_run_stops_between_steps() {
        let lattice = Lattice::uniform(3, 3, 0.2).unwrap();
        let mut sim = Simulation::new(quiet_config(), lattice).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let summary = sim.run(10, &cancel, &mut NoopObserver).unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.steps, 0);
        assert_eq!(sim.step_id(), StepId(0));
    }

    #[test]
    fn restore_rejects_foreign_checkpoint() {
        let small = Simulation::new(quiet_config(), Lattice::uniform(3, 3, 0.2).unwrap()).unwrap();
        let mut large =
            Simulation::new(quiet_config(), Lattice::uniform(4, 4, 0.2).unwrap()).unwrap();
        assert_eq!(
            large.restore(small.checkpoint()),
            Err(RestoreError::NodeCountMismatch {
                expected: 16,
                found: 9
            })
        );
        let mut cp = large.checkpoint();
        cp.time = 5.0;
        assert!(matches!(
            large.restore(cp),
            Err(RestoreError::ClockMismatch { .. })
        ));
    }
}
