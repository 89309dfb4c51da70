//! File formats and output sinks for Excite simulations.
//!
//! # Architecture
//!
//! - [`checkpoint`] encodes a [`Checkpoint`](excite_engine::Checkpoint)
//!   to a little-endian binary stream and back
//! - [`grid`] writes per-node scalars as STF grid files
//! - [`electrogram`] appends voltages at monitored sites
//! - [`maps`] writes end-of-run activation and recovery maps
//! - [`OutputSinks`] bundles the writers as a
//!   [`StepObserver`](excite_engine::StepObserver)
//!
//! # Checkpoint format
//!
//! ```text
//! [MAGIC "EXCK"] [VERSION u8] [node_count u32] [state_count u32]
//! [time f64] [step u64] [states] [previous dV] [bootstrapped u8]
//! [protocol] [beat records]
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod checkpoint;
pub mod codec;
pub mod electrogram;
pub mod error;
pub mod grid;
pub mod maps;
pub mod sinks;

pub use checkpoint::{
    checkpoint_file_name, decode_checkpoint, encode_checkpoint, read_checkpoint, write_checkpoint,
};
pub use electrogram::ElectrogramWriter;
pub use error::{CheckpointError, OutputError};
pub use grid::{write_grid, write_grid_file, GridFormat};
pub use maps::write_activation_maps;
pub use sinks::{OutputConfig, OutputSinks, DEFAULT_ELECTROGRAM_SITES};

/// Magic bytes at the start of every checkpoint file.
pub const MAGIC: [u8; 4] = *b"EXCK";

/// Current checkpoint format version.
pub const FORMAT_VERSION: u8 = 1;
