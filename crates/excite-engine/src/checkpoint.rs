//! In-memory checkpoints and restore errors.
//!
//! A [`Checkpoint`] holds everything that influences future steps, so a
//! restored simulation continues bit-for-bit as the original would have.
//! Encoding it to bytes is left to the I/O layer.

use std::error::Error;
use std::fmt;

use excite_core::{StateVector, StepId};

use crate::detector::BeatSnapshot;
use crate::stimulus::ProtocolSnapshot;

/// Complete resumable state of a simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    /// Steps completed.
    pub step: StepId,
    /// Simulated time at `step` (ms).
    pub time: f64,
    /// Per-node state in node order.
    pub states: Vec<StateVector>,
    /// Per-node voltage change over the last step, driving sub-stepping.
    pub previous_dv: Vec<f64>,
    /// Whether the bootstrap half-step has run.
    pub bootstrapped: bool,
    /// Stimulus protocol state.
    pub protocol: ProtocolSnapshot,
    /// Detector records.
    pub beats: BeatSnapshot,
}

/// Errors from [`Simulation::restore`](crate::Simulation::restore).
#[derive(Clone, Debug, PartialEq)]
pub enum RestoreError {
    /// The checkpoint covers a different number of nodes.
    NodeCountMismatch {
        /// Nodes in the simulation.
        expected: usize,
        /// Nodes in the checkpoint.
        found: usize,
    },
    /// Stored time disagrees with `step * dt`.
    ClockMismatch {
        /// Time implied by the step count (ms).
        expected: f64,
        /// Time stored in the checkpoint (ms).
        found: f64,
    },
    /// The detector records do not fit this simulation.
    BeatRecords {
        /// What did not fit.
        reason: String,
    },
    /// A stored state is not finite.
    NonFiniteState {
        /// Index of the offending node.
        node: usize,
    },
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeCountMismatch { expected, found } => {
                write!(f, "checkpoint has {found} nodes, simulation has {expected}")
            }
            Self::ClockMismatch { expected, found } => {
                write!(f, "checkpoint time {found} ms does not match step time {expected} ms")
            }
            Self::BeatRecords { reason } => write!(f, "incompatible beat records: {reason}"),
            Self::NonFiniteState { node } => write!(f, "non-finite state at node {node}"),
        }
    }
}

impl Error for RestoreError {}
