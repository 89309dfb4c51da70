//! Excite: a two-dimensional cardiac excitation simulator.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Excite sub-crates. For most users, adding `excite` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use excite::prelude::*;
//!
//! // A 20×20 sheet paced once from its corner.
//! let lattice = Lattice::uniform(20, 20, 0.2).unwrap();
//! let mut config = SimulationConfig::default();
//! config.stimulus.electrode = (0, 0);
//! config.stimulus.s1_beats = 1;
//! config.stimulus.s2_beats = 0;
//!
//! let mut sim = Simulation::new(config, lattice).unwrap();
//! let summary = sim.run(50, &CancelToken::new(), &mut NoopObserver).unwrap();
//! assert_eq!(summary.steps, 50);
//! assert!(sim.voltage(NodeId(0)) > -40.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `excite-core` | IDs, state vector, cell types, `StepError` |
//! | [`space`] | `excite-space` | Lattice, compass neighbours, coefficient maps |
//! | [`ionic`] | `excite-ionic` | Lookup table, TP06 currents, reaction integrator |
//! | [`propagators`] | `excite-propagators` | Diffusion stencils and the half-step sweep |
//! | [`engine`] | `excite-engine` | Scheduler, stimulus protocol, detector, checkpoints |
//! | [`io`] | `excite-io` | Checkpoint files, STF grids, electrograms, sinks |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Identifiers, node state and cell types (`excite-core`).
pub use excite_core as types;

/// Tissue lattice and geometry loading (`excite-space`).
pub use excite_space as space;

/// Ionic model and reaction integrator (`excite-ionic`).
///
/// [`ionic::LookupTable`] holds the tabulated gate kinetics;
/// [`ionic::ReactionIntegrator`] advances one node across a global step.
pub use excite_ionic as ionic;

/// Diffusion stencils (`excite-propagators`).
pub use excite_propagators as propagators;

/// Operator-splitting scheduler (`excite-engine`).
///
/// [`engine::Simulation`] owns all run state; [`engine::StimulusProtocol`]
/// and [`engine::Detector`] are usable on their own.
pub use excite_engine as engine;

/// File formats and output sinks (`excite-io`).
pub use excite_io as io;

/// Common imports for typical Excite usage.
///
/// ```rust
/// use excite::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use excite_core::{CellRegion, CellType, NodeId, StateVector, StepId};

    // Errors
    pub use excite_core::StepError;
    pub use excite_engine::{ConfigError, RestoreError};
    pub use excite_io::{CheckpointError, OutputError};
    pub use excite_space::SpaceError;

    // Space
    pub use excite_space::{load_lattice, Lattice};

    // Diffusion
    pub use excite_propagators::{DiffusionStencil, DiffusionStrategy};

    // Engine
    pub use excite_engine::{
        CancelToken, Checkpoint, NoopObserver, RunSummary, Simulation, SimulationConfig,
        StepMetrics, StepObserver,
    };

    // Output
    pub use excite_io::{read_checkpoint, write_checkpoint, OutputConfig, OutputSinks};
}
