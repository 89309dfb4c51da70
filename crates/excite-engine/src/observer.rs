//! Hooks invoked after each successful step.

use crate::metrics::StepMetrics;
use crate::simulation::Simulation;

/// Receives the simulation after every completed step of
/// [`Simulation::run`], and once more when the run ends.
///
/// Observers run on the driving thread between steps. Failures they
/// encounter are theirs to report; they cannot abort the run.
pub trait StepObserver {
    /// Called after each step with that step's metrics.
    fn on_step(&mut self, sim: &Simulation, metrics: &StepMetrics);

    /// Called once after the last step, including after cancellation.
    fn on_finish(&mut self, _sim: &Simulation) {}
}

/// Observer that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&mut self, _sim: &Simulation, _metrics: &StepMetrics) {}
}

impl<A: StepObserver, B: StepObserver> StepObserver for (A, B) {
    fn on_step(&mut self, sim: &Simulation, metrics: &StepMetrics) {
        self.0.on_step(sim, metrics);
        self.1.on_step(sim, metrics);
    }

    fn on_finish(&mut self, sim: &Simulation) {
        self.0.on_finish(sim);
        self.1.on_finish(sim);
    }
}
