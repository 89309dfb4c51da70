//! Ionic model and reaction integrator for the Excite simulator.
//!
//! - [`lookup`]: voltage-binned gate steady states and time constants,
//!   precomputed once and shared read-only.
//! - [`tp06`]: membrane currents, calcium handling and concentration
//!   updates of the ten Tusscher–Panfilov 2006 ventricular model.
//! - [`integrator`]: the adaptive sub-stepping policy and the per-node
//!   Rush-Larsen reaction update.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod integrator;
pub mod lookup;
pub mod tp06;

pub use integrator::{ReactionInput, ReactionIntegrator, SubstepPlan, SubstepPolicy};
pub use lookup::{Gate, GateKinetics, LookupTable};
pub use tp06::IonicCurrents;
