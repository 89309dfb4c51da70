//! Shared configuration and observers for engine integration tests.

#![allow(dead_code)]

use excite_engine::{CancelToken, Simulation, SimulationConfig, StepMetrics, StepObserver};

/// Configuration for small sheets: one primary pulse at the corner,
/// no extra pulses, and detection from time zero.
pub fn corner_config(radius: f64) -> SimulationConfig {
    let mut cfg = SimulationConfig::default();
    cfg.stimulus.electrode = (0, 0);
    cfg.stimulus.electrode_radius = radius;
    cfg.stimulus.s1_beats = 1;
    cfg.stimulus.s2_beats = 0;
    cfg.detection.start_time = 0.0;
    cfg
}

/// Configuration with no stimulus at all.
pub fn quiet_config() -> SimulationConfig {
    let mut cfg = corner_config(1.0);
    cfg.stimulus.s1_beats = 0;
    cfg
}

/// Records the metrics of every step it sees.
#[derive(Default)]
pub struct Recorder {
    pub metrics: Vec<StepMetrics>,
    pub finished: usize,
}

impl StepObserver for Recorder {
    fn on_step(&mut self, _sim: &Simulation, metrics: &StepMetrics) {
        self.metrics.push(metrics.clone());
    }

    fn on_finish(&mut self, _sim: &Simulation) {
        self.finished += 1;
    }
}

/// Cancels `token` once `after` steps have been observed.
pub struct CancelAfter {
    pub token: CancelToken,
    pub after: usize,
    pub seen: usize,
}

impl StepObserver for CancelAfter {
    fn on_step(&mut self, _sim: &Simulation, _metrics: &StepMetrics) {
        self.seen += 1;
        if self.seen == self.after {
            self.token.cancel();
        }
    }
}
