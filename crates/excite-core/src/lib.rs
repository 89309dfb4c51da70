//! Core types for the Excite cardiac tissue simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared across the workspace: node and step
//! identifiers, the per-node ionic state vector, cell-type variants,
//! and the fatal step error.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod error;
pub mod id;
pub mod state;

pub use cell::{CellRegion, CellType};
pub use error::StepError;
pub use id::{NodeId, StepId};
pub use state::{Component, StateVector, NUM_STATES};
