//! Fatal errors raised while stepping a simulation.

use std::error::Error;
use std::fmt;

use crate::id::{NodeId, StepId};

/// Errors that abort a global step.
///
/// A failed step is never replayed; the run stops and may only be
/// resumed from the last checkpoint.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A node's voltage left the finite, physiological range after the
    /// reaction stage. Detected before diffusion can spread it to
    /// neighbours.
    NumericalDivergence {
        /// The offending node.
        node: NodeId,
        /// The step during which it diverged.
        step: StepId,
        /// The voltage observed (may be NaN or infinite).
        voltage: f64,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NumericalDivergence {
                node,
                step,
                voltage,
            } => write!(
                f,
                "numerical divergence at node {node} during step {step}: V = {voltage}"
            ),
        }
    }
}

impl Error for StepError {}
