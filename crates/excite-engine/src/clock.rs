//! Simulation clock.

use excite_core::StepId;

/// Discrete step counter with derived continuous time.
///
/// Time is always recomputed as `step * dt` rather than accumulated, so
/// it carries no drift however long the run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clock {
    step: StepId,
    dt: f64,
}

impl Clock {
    /// A clock at step zero.
    pub fn new(dt: f64) -> Self {
        Self {
            step: StepId(0),
            dt,
        }
    }

    /// Steps completed so far; also the id of the next step.
    pub fn step(&self) -> StepId {
        self.step
    }

    /// Global time increment (ms).
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Simulated time at the start of the next step (ms).
    pub fn time(&self) -> f64 {
        self.time_at(self.step)
    }

    /// Simulated time at the start of `step` (ms).
    pub fn time_at(&self, step: StepId) -> f64 {
        step.0 as f64 * self.dt
    }

    pub(crate) fn tick(&mut self) {
        self.step = self.step.next();
    }

    pub(crate) fn set(&mut self, step: StepId) {
        self.step = step;
    }
}
