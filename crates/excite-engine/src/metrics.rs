//! Per-step performance metrics.
//!
//! [`StepMetrics`] captures timing and sub-stepping data for a single
//! global step. All durations are in microseconds.

use crate::stimulus::StimulusState;

/// Timing and workload metrics collected during a single step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step.
    pub total_us: u64,
    /// Time spent in the reaction stage, including the divergence check.
    pub reaction_us: u64,
    /// Time spent in the diffusion half-steps (and the bootstrap).
    pub diffusion_us: u64,
    /// Time spent in activation/recovery detection.
    pub detection_us: u64,
    /// Reaction sub-steps summed over all excitable nodes.
    pub substeps_total: u64,
    /// Largest sub-step count taken by any node.
    pub substeps_max: u32,
    /// Nodes that received stimulus current.
    pub stimulated_nodes: usize,
    /// Protocol state during the step.
    pub stimulus: StimulusState,
}

impl Default for StepMetrics {
    fn default() -> Self {
        Self {
            total_us: 0,
            reaction_us: 0,
            diffusion_us: 0,
            detection_us: 0,
            substeps_total: 0,
            substeps_max: 0,
            stimulated_nodes: 0,
            stimulus: StimulusState::Idle,
        }
    }
}
