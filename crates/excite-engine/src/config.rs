//! Simulation configuration, validation, and error types.
//!
//! [`SimulationConfig`] is the input for constructing a
//! [`Simulation`](crate::Simulation). [`validate()`](SimulationConfig::validate)
//! checks it against the lattice it will run on; the constructor calls
//! it, so a bad configuration is rejected before any step runs.

use std::error::Error;
use std::fmt;

use excite_core::StateVector;
use excite_ionic::SubstepPolicy;
use excite_propagators::DiffusionStrategy;
use excite_space::Lattice;

use crate::detector::DetectorConfig;
use crate::stimulus::StimulusConfig;

// ── SimulationConfig ───────────────────────────────────────────────

/// Everything that parameterises a run, apart from the lattice.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Global time increment (ms). Default: 0.1.
    pub dt: f64,
    /// Grid spacing (mm). Default: 0.25.
    pub dx: f64,
    /// Diffusion stencil. Default: uniform, D = 0.2.
    pub diffusion: DiffusionStrategy,
    /// Coefficient below which a node does not excite. Default: 0.025.
    pub conduction_threshold: f64,
    /// Reaction sub-stepping rule.
    pub substeps: SubstepPolicy,
    /// Stimulus protocol.
    pub stimulus: StimulusConfig,
    /// Activation/recovery detection.
    pub detection: DetectorConfig,
    /// Voltages outside `[low, high]` after the reaction stage abort the
    /// run (mV). Default: (-200, 200).
    pub voltage_bounds: (f64, f64),
    /// State every node starts in. Default: resting myocyte.
    pub initial_state: StateVector,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            dx: 0.25,
            diffusion: DiffusionStrategy::default(),
            conduction_threshold: 0.025,
            substeps: SubstepPolicy::default(),
            stimulus: StimulusConfig::default(),
            detection: DetectorConfig::default(),
            voltage_bounds: (-200.0, 200.0),
            initial_state: StateVector::resting(),
        }
    }
}

impl SimulationConfig {
    /// Check the configuration against `lattice`.
    pub fn validate(&self, lattice: &Lattice) -> Result<(), ConfigError> {
        // 1. Time step and spacing.
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::InvalidTimeStep { value: self.dt });
        }
        if !(self.dx.is_finite() && self.dx > 0.0) {
            return Err(ConfigError::InvalidSpacing { value: self.dx });
        }
        // 2. Sub-stepping must be able to honour its own minimum.
        self.substeps
            .validate(self.dt)
            .map_err(|reason| ConfigError::InvalidSubsteps { reason })?;
        // 3. Stencil parameters and explicit stability of a half-step.
        let stencil = self
            .diffusion
            .build(self.dx)
            .map_err(|reason| ConfigError::InvalidDiffusion { reason })?;
        let half_dt = 0.5 * self.dt;
        let max_dt = stencil.max_dt(lattice);
        if half_dt > max_dt {
            return Err(ConfigError::UnstableDiffusion { half_dt, max_dt });
        }
        if !(self.conduction_threshold.is_finite() && self.conduction_threshold >= 0.0) {
            return Err(ConfigError::InvalidConductionThreshold {
                value: self.conduction_threshold,
            });
        }
        // 4. Protocol timing and electrode placement.
        self.stimulus
            .validate()
            .map_err(|reason| ConfigError::InvalidStimulus { reason })?;
        let (er, ec) = self.stimulus.electrode;
        if er >= lattice.rows() || ec >= lattice.cols() {
            return Err(ConfigError::ElectrodeOutOfBounds { row: er, col: ec });
        }
        let (rr, rc) = self.stimulus.reference_position();
        if lattice.node_at(rr, rc).is_none() {
            return Err(ConfigError::ReferenceNotNode { row: rr, col: rc });
        }
        // 5. Detection.
        self.detection
            .validate()
            .map_err(|reason| ConfigError::InvalidDetection { reason })?;
        // 6. Divergence bounds and initial state.
        let (low, high) = self.voltage_bounds;
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(ConfigError::InvalidVoltageBounds { low, high });
        }
        if !self.initial_state.is_finite() {
            return Err(ConfigError::NonFiniteInitialState);
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimulationConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `dt` is NaN, infinite, zero, or negative.
    InvalidTimeStep {
        /// The invalid value.
        value: f64,
    },
    /// `dx` is NaN, infinite, zero, or negative.
    InvalidSpacing {
        /// The invalid value.
        value: f64,
    },
    /// Sub-stepping policy invariant violated.
    InvalidSubsteps {
        /// Which invariant was violated.
        reason: String,
    },
    /// Diffusion stencil could not be built.
    InvalidDiffusion {
        /// Why the stencil was rejected.
        reason: String,
    },
    /// A half-step exceeds the stencil's explicit stability limit.
    UnstableDiffusion {
        /// `dt / 2` (ms).
        half_dt: f64,
        /// Largest stable step (ms).
        max_dt: f64,
    },
    /// The conduction threshold is negative or not finite.
    InvalidConductionThreshold {
        /// The invalid value.
        value: f64,
    },
    /// Stimulus protocol invariant violated.
    InvalidStimulus {
        /// Which invariant was violated.
        reason: String,
    },
    /// The electrode centre lies outside the grid.
    ElectrodeOutOfBounds {
        /// Electrode row.
        row: u32,
        /// Electrode column.
        col: u32,
    },
    /// The S2 reference position is a void cell or outside the grid.
    ReferenceNotNode {
        /// Reference row.
        row: u32,
        /// Reference column.
        col: u32,
    },
    /// Detector invariant violated.
    InvalidDetection {
        /// Which invariant was violated.
        reason: String,
    },
    /// Divergence bounds are empty or not finite.
    InvalidVoltageBounds {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
    },
    /// The initial state has a NaN or infinite component.
    NonFiniteInitialState,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimeStep { value } => write!(f, "invalid dt: {value}"),
            Self::InvalidSpacing { value } => write!(f, "invalid dx: {value}"),
            Self::InvalidSubsteps { reason } => write!(f, "invalid sub-step policy: {reason}"),
            Self::InvalidDiffusion { reason } => write!(f, "invalid diffusion: {reason}"),
            Self::UnstableDiffusion { half_dt, max_dt } => write!(
                f,
                "diffusion half-step {half_dt} ms exceeds stability limit {max_dt} ms"
            ),
            Self::InvalidConductionThreshold { value } => {
                write!(f, "invalid conduction threshold: {value}")
            }
            Self::InvalidStimulus { reason } => write!(f, "invalid stimulus: {reason}"),
            Self::ElectrodeOutOfBounds { row, col } => {
                write!(f, "electrode ({row}, {col}) is outside the grid")
            }
            Self::ReferenceNotNode { row, col } => {
                write!(f, "reference position ({row}, {col}) is not a tissue node")
            }
            Self::InvalidDetection { reason } => write!(f, "invalid detection: {reason}"),
            Self::InvalidVoltageBounds { low, high } => {
                write!(f, "invalid voltage bounds [{low}, {high}]")
            }
            Self::NonFiniteInitialState => write!(f, "initial state is not finite"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Lattice {
        Lattice::uniform(10, 10, 0.2).unwrap()
    }

    fn valid_config() -> SimulationConfig {
        let mut cfg = SimulationConfig::default();
        cfg.stimulus.electrode = (0, 0);
        cfg
    }

    #[test]
    fn validate_valid_config_succeeds() {
        assert!(valid_config().validate(&sheet()).is_ok());
    }

    #[test]
    fn default_electrode_needs_a_large_sheet() {
        let cfg = SimulationConfig::default();
        assert_eq!(
            cfg.validate(&sheet()),
            Err(ConfigError::ElectrodeOutOfBounds { row: 74, col: 74 })
        );
        assert!(cfg.validate(&Lattice::uniform(100, 100, 0.2).unwrap()).is_ok());
    }

    #[test]
    fn default_electrode_is_node_29675_of_full_sheet() {
        // 1-based row-major numbering of a 400×400 sheet puts (75, 75) at
        // node 29675; that is (74, 74) here.
        let cfg = SimulationConfig::default();
        let lattice = Lattice::uniform(400, 400, 0.2).unwrap();
        let (r, c) = cfg.stimulus.electrode;
        assert_eq!((r, c), (74, 74));
        assert_eq!(lattice.node_at(r, c).unwrap().index() + 1, 29_675);
        assert_eq!(cfg.stimulus.reference_position(), (74, 74));
    }

    #[test]
    fn validate_invalid_dt_fails() {
        for dt in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let cfg = SimulationConfig {
                dt,
                ..valid_config()
            };
            assert!(matches!(
                cfg.validate(&sheet()),
                Err(ConfigError::InvalidTimeStep { .. })
            ));
        }
    }

    #[test]
    fn validate_unstable_diffusion_fails() {
        let cfg = SimulationConfig {
            dx: 0.05,
            ..valid_config()
        };
        match cfg.validate(&sheet()) {
            Err(ConfigError::UnstableDiffusion { half_dt, max_dt }) => {
                assert_eq!(half_dt, 0.05);
                assert!(max_dt < half_dt);
            }
            other => panic!("expected UnstableDiffusion, got {other:?}"),
        }
    }

    #[test]
    fn validate_substep_cap_below_minimum_fails() {
        let cfg = SimulationConfig {
            dt: 0.03,
            ..valid_config()
        };
        assert!(matches!(
            cfg.validate(&sheet()),
            Err(ConfigError::InvalidSubsteps { .. })
        ));
    }

    #[test]
    fn validate_reference_in_void_fails() {
        let mut map = vec![0.2; 100];
        map[55] = 0.0;
        let lattice = Lattice::from_coefficients(10, 10, &map, 0.025).unwrap();
        let mut cfg = valid_config();
        cfg.stimulus.reference = Some((5, 5));
        assert_eq!(
            cfg.validate(&lattice),
            Err(ConfigError::ReferenceNotNode { row: 5, col: 5 })
        );
    }

    #[test]
    fn validate_bad_bounds_fails() {
        let cfg = SimulationConfig {
            voltage_bounds: (100.0, -100.0),
            ..valid_config()
        };
        assert!(matches!(
            cfg.validate(&sheet()),
            Err(ConfigError::InvalidVoltageBounds { .. })
        ));
    }

    #[test]
    fn validate_non_finite_initial_state_fails() {
        let mut cfg = valid_config();
        cfg.initial_state.0[5] = f64::NAN;
        assert_eq!(
            cfg.validate(&sheet()),
            Err(ConfigError::NonFiniteInitialState)
        );
    }
}
