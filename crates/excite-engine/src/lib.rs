//! Simulation engine for the Excite cardiac tissue simulator.
//!
//! Provides [`Simulation`], which advances a lattice of TP06 myocytes by
//! Strang-split reaction and diffusion, drives the S1/S2 stimulus
//! protocol and records per-node activation and recovery times.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cancel;
pub mod checkpoint;
pub mod clock;
pub mod config;
pub mod detector;
pub mod metrics;
pub mod observer;
pub mod simulation;
pub mod stimulus;

pub use cancel::CancelToken;
pub use checkpoint::{Checkpoint, RestoreError};
pub use clock::Clock;
pub use config::{ConfigError, SimulationConfig};
pub use detector::{BeatSnapshot, BeatTiming, Detector, DetectorConfig};
pub use metrics::StepMetrics;
pub use observer::{NoopObserver, StepObserver};
pub use simulation::{RunSummary, Simulation};
pub use stimulus::{ProtocolSnapshot, StimulusConfig, StimulusProtocol, StimulusState, TIME_EPS};
