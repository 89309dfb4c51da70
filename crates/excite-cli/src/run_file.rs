//! JSON run files.
//!
//! Every field is optional; missing fields take the library defaults.
//!
//! ```json
//! {
//!   "dt": 0.1,
//!   "diffusion": { "kind": "smoothed" },
//!   "region": "endocardial",
//!   "stimulus": { "electrode": [200, 200], "s2_beats": 2 },
//!   "output": { "electrogram_sites": [[100, 100], [300, 300]] }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use excite_core::CellRegion;
use excite_engine::{DetectorConfig, SimulationConfig, StimulusConfig};
use excite_io::OutputConfig;
use excite_ionic::SubstepPolicy;
use excite_propagators::DiffusionStrategy;
use excite_space::DEFAULT_VOID_THRESHOLD;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunFile {
    pub dt: f64,
    pub dx: f64,
    pub diffusion: DiffusionSpec,
    pub conduction_threshold: f64,
    /// Coefficient at or below which a grid cell is not tissue.
    pub void_threshold: f64,
    pub region: RegionSpec,
    pub substeps: SubstepSpec,
    pub stimulus: StimulusSpec,
    pub detection: DetectionSpec,
    pub voltage_bounds: [f64; 2],
    /// Step at which the run ends, unless given on the command line.
    pub steps: u64,
    pub output: OutputSpec,
}

impl Default for RunFile {
    fn default() -> Self {
        let sim = SimulationConfig::default();
        Self {
            dt: sim.dt,
            dx: sim.dx,
            diffusion: DiffusionSpec::from(sim.diffusion),
            conduction_threshold: sim.conduction_threshold,
            void_threshold: DEFAULT_VOID_THRESHOLD,
            region: RegionSpec::Epicardial,
            substeps: SubstepSpec::from(sim.substeps),
            stimulus: StimulusSpec::from(&sim.stimulus),
            detection: DetectionSpec::from(&sim.detection),
            voltage_bounds: [sim.voltage_bounds.0, sim.voltage_bounds.1],
            steps: 30_000,
            output: OutputSpec::default(),
        }
    }
}

impl RunFile {
    /// Parse the run file at `path`.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("reading {}: {e}", path.display()))?;
        let file = serde_json::from_str(&text)
            .map_err(|e| format!("parsing {}: {e}", path.display()))?;
        Ok(file)
    }

    /// Library configuration described by this file.
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            dt: self.dt,
            dx: self.dx,
            diffusion: self.diffusion.into(),
            conduction_threshold: self.conduction_threshold,
            substeps: self.substeps.into(),
            stimulus: self.stimulus.clone().into(),
            detection: self.detection.into(),
            voltage_bounds: (self.voltage_bounds[0], self.voltage_bounds[1]),
            ..SimulationConfig::default()
        }
    }

    /// Output configuration writing into `dir`.
    pub fn output_config(&self, dir: PathBuf) -> OutputConfig {
        let o = &self.output;
        OutputConfig {
            dir,
            snapshot_root: o.snapshot_root.clone(),
            snapshot_interval: o.snapshot_interval,
            electrogram_interval: o.electrogram_interval,
            electrogram_sites: o.electrogram_sites.iter().map(|&[r, c]| (r, c)).collect(),
            electrogram_file: o.electrogram_file.clone(),
            map_root: o.map_root.clone(),
            activation_maps: o.activation_maps,
        }
    }
}

// ── Sections ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum DiffusionSpec {
    Uniform { coefficient: f64 },
    Weighted,
    Smoothed,
}

impl Default for DiffusionSpec {
    fn default() -> Self {
        DiffusionStrategy::default().into()
    }
}

impl From<DiffusionStrategy> for DiffusionSpec {
    fn from(s: DiffusionStrategy) -> Self {
        match s {
            DiffusionStrategy::Uniform { coefficient } => Self::Uniform { coefficient },
            DiffusionStrategy::Weighted => Self::Weighted,
            DiffusionStrategy::Smoothed => Self::Smoothed,
        }
    }
}

impl From<DiffusionSpec> for DiffusionStrategy {
    fn from(s: DiffusionSpec) -> Self {
        match s {
            DiffusionSpec::Uniform { coefficient } => Self::Uniform { coefficient },
            DiffusionSpec::Weighted => Self::Weighted,
            DiffusionSpec::Smoothed => Self::Smoothed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionSpec {
    #[default]
    Epicardial,
    Endocardial,
    MidMyocardial,
}

impl From<RegionSpec> for CellRegion {
    fn from(r: RegionSpec) -> Self {
        match r {
            RegionSpec::Epicardial => Self::Epicardial,
            RegionSpec::Endocardial => Self::Endocardial,
            RegionSpec::MidMyocardial => Self::MidMyocardial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubstepSpec {
    pub fast_threshold: f64,
    pub fast_min_substeps: u32,
    pub slow_min_substeps: u32,
    pub gain: f64,
    pub min_substep: f64,
}

impl Default for SubstepSpec {
    fn default() -> Self {
        SubstepPolicy::default().into()
    }
}

impl From<SubstepPolicy> for SubstepSpec {
    fn from(p: SubstepPolicy) -> Self {
        Self {
            fast_threshold: p.fast_threshold,
            fast_min_substeps: p.fast_min_substeps,
            slow_min_substeps: p.slow_min_substeps,
            gain: p.gain,
            min_substep: p.min_substep,
        }
    }
}

impl From<SubstepSpec> for SubstepPolicy {
    fn from(s: SubstepSpec) -> Self {
        Self {
            fast_threshold: s.fast_threshold,
            fast_min_substeps: s.fast_min_substeps,
            slow_min_substeps: s.slow_min_substeps,
            gain: s.gain,
            min_substep: s.min_substep,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StimulusSpec {
    pub cycle_length: f64,
    pub s1_beats: u32,
    pub s2_beats: u32,
    pub pulse_duration: f64,
    pub amplitude: f64,
    pub s2_window_start: f64,
    pub s2_window_end: f64,
    pub s2_threshold: f64,
    pub electrode: [u32; 2],
    pub electrode_radius: f64,
    pub reference: Option<[u32; 2]>,
}

impl Default for StimulusSpec {
    fn default() -> Self {
        Self::from(&StimulusConfig::default())
    }
}

impl From<&StimulusConfig> for StimulusSpec {
    fn from(c: &StimulusConfig) -> Self {
        Self {
            cycle_length: c.cycle_length,
            s1_beats: c.s1_beats,
            s2_beats: c.s2_beats,
            pulse_duration: c.pulse_duration,
            amplitude: c.amplitude,
            s2_window_start: c.s2_window_start,
            s2_window_end: c.s2_window_end,
            s2_threshold: c.s2_threshold,
            electrode: [c.electrode.0, c.electrode.1],
            electrode_radius: c.electrode_radius,
            reference: c.reference.map(|(r, col)| [r, col]),
        }
    }
}

impl From<StimulusSpec> for StimulusConfig {
    fn from(s: StimulusSpec) -> Self {
        Self {
            cycle_length: s.cycle_length,
            s1_beats: s.s1_beats,
            s2_beats: s.s2_beats,
            pulse_duration: s.pulse_duration,
            amplitude: s.amplitude,
            s2_window_start: s.s2_window_start,
            s2_window_end: s.s2_window_end,
            s2_threshold: s.s2_threshold,
            electrode: (s.electrode[0], s.electrode[1]),
            electrode_radius: s.electrode_radius,
            reference: s.reference.map(|[r, c]| (r, c)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionSpec {
    pub threshold: f64,
    pub start_time: f64,
}

impl Default for DetectionSpec {
    fn default() -> Self {
        Self::from(&DetectorConfig::default())
    }
}

impl From<&DetectorConfig> for DetectionSpec {
    fn from(c: &DetectorConfig) -> Self {
        Self {
            threshold: c.threshold,
            start_time: c.start_time,
        }
    }
}

impl From<DetectionSpec> for DetectorConfig {
    fn from(s: DetectionSpec) -> Self {
        Self {
            threshold: s.threshold,
            start_time: s.start_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSpec {
    pub snapshot_root: String,
    pub snapshot_interval: Option<f64>,
    pub electrogram_interval: Option<f64>,
    pub electrogram_sites: Vec<[u32; 2]>,
    pub electrogram_file: String,
    pub map_root: String,
    pub activation_maps: bool,
}

impl Default for OutputSpec {
    fn default() -> Self {
        let o = OutputConfig::default();
        Self {
            snapshot_root: o.snapshot_root,
            snapshot_interval: o.snapshot_interval,
            electrogram_interval: o.electrogram_interval,
            electrogram_sites: o.electrogram_sites.iter().map(|&(r, c)| [r, c]).collect(),
            electrogram_file: o.electrogram_file,
            map_root: o.map_root,
            activation_maps: o.activation_maps,
        }
    }
}
