//! Tissue lattice for the Excite simulator.
//!
//! A [`Lattice`] is the arena of conducting nodes laid over a
//! rectangular grid: the grid-to-node map, each node's coordinates and
//! compass-indexed neighbours, and the per-node diffusion coefficient.
//! It is built once before stepping and is immutable afterwards apart
//! from region assignment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod compass;
pub mod error;
pub mod geometry;
pub mod lattice;

pub use compass::Compass;
pub use error::SpaceError;
pub use geometry::{load_lattice, parse_coefficients, DEFAULT_VOID_THRESHOLD};
pub use lattice::Lattice;
