//! Diffusion stencils for the Excite simulator.
//!
//! Each stencil evaluates the diffusive contribution to `dV/dt` at one
//! node from the voltages of its cardinal neighbours. Missing neighbours
//! (grid edges, voids) take the node's own voltage and coefficient, which
//! gives a no-flux boundary.
//!
//! # Strategies
//!
//! | Stencil | Coefficient | Use |
//! |---------|-------------|-----|
//! | [`UniformDiffusion`] | one scalar | homogeneous tissue |
//! | [`WeightedDiffusion`] | per node, pairwise mean | heterogeneous tissue, flux conservative |
//! | [`SmoothedDiffusion`] | per node, plus gradient term | smoothly varying coefficient fields |
//!
//! [`diffuse`] applies a stencil to every node with a double-buffered
//! explicit Euler update.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod neighbourhood;
pub mod smoothed;
pub mod stencil;
pub mod strategy;
pub mod sweep;
pub mod uniform;
pub mod weighted;

pub use smoothed::SmoothedDiffusion;
pub use stencil::DiffusionStencil;
pub use strategy::DiffusionStrategy;
pub use sweep::diffuse;
pub use uniform::UniformDiffusion;
pub use weighted::WeightedDiffusion;
