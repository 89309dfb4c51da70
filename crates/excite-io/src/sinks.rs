//! Output sinks driven by the step loop.
//!
//! [`OutputSinks`] writes voltage snapshots and electrogram lines on
//! fixed simulated-time intervals and, when the run finishes, the
//! activation maps. Write failures are logged and counted; they never
//! stop the simulation.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use excite_engine::{Simulation, StepMetrics, StepObserver, TIME_EPS};

use crate::electrogram::ElectrogramWriter;
use crate::error::OutputError;
use crate::grid::{write_grid_file, GridFormat};
use crate::maps::write_activation_maps;

/// Electrogram sites monitored unless configured otherwise, as 0-based
/// `(row, col)` positions on the default 400×400 sheet.
pub const DEFAULT_ELECTROGRAM_SITES: [(u32, u32); 6] = [
    (1, 1),
    (75, 99),
    (75, 199),
    (112, 349),
    (150, 99),
    (1, 199),
];

/// What to write and where.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputConfig {
    /// Directory receiving every output file. Created if missing.
    pub dir: PathBuf,
    /// Prefix of voltage snapshot files. Default: `"Vm"`.
    pub snapshot_root: String,
    /// Simulated time between voltage snapshots (ms); `None` disables
    /// them. Default: 10.
    pub snapshot_interval: Option<f64>,
    /// Simulated time between electrogram lines (ms); `None` disables
    /// the electrogram. Default: 1.
    pub electrogram_interval: Option<f64>,
    /// Monitored grid positions `(row, col)`, in output column order.
    /// Default: [`DEFAULT_ELECTROGRAM_SITES`]. Every site must be a node.
    pub electrogram_sites: Vec<(u32, u32)>,
    /// Electrogram file name inside `dir`. Default: `"electrograms.dat"`.
    pub electrogram_file: String,
    /// Prefix of the end-of-run map files. Default: empty.
    pub map_root: String,
    /// Whether to write activation maps when the run finishes.
    pub activation_maps: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            snapshot_root: "Vm".to_string(),
            snapshot_interval: Some(10.0),
            electrogram_interval: Some(1.0),
            electrogram_sites: DEFAULT_ELECTROGRAM_SITES.to_vec(),
            electrogram_file: "electrograms.dat".to_string(),
            map_root: String::new(),
            activation_maps: true,
        }
    }
}

impl OutputConfig {
    /// Check the intervals.
    pub fn validate(&self) -> Result<(), OutputError> {
        for (name, interval) in [
            ("snapshot_interval", self.snapshot_interval),
            ("electrogram_interval", self.electrogram_interval),
        ] {
            if let Some(value) = interval {
                if !(value.is_finite() && value > 0.0) {
                    return Err(OutputError::InvalidInterval { name, value });
                }
            }
        }
        Ok(())
    }
}

/// Fires once each time simulated time passes a multiple of `interval`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Schedule {
    interval: f64,
    next: f64,
}

impl Schedule {
    /// First firing at the first multiple of `interval` after `time`.
    fn after(interval: f64, time: f64) -> Self {
        let k = (time / interval + TIME_EPS).floor() + 1.0;
        Self {
            interval,
            next: k * interval,
        }
    }

    fn due(&mut self, time: f64) -> bool {
        if time + TIME_EPS < self.next {
            return false;
        }
        while self.next <= time + TIME_EPS {
            self.next += self.interval;
        }
        true
    }
}

/// Snapshot, electrogram and map writers as a [`StepObserver`].
pub struct OutputSinks {
    config: OutputConfig,
    snapshots: Option<Schedule>,
    electrogram: Option<(Schedule, ElectrogramWriter<BufWriter<File>>, PathBuf)>,
    snapshots_written: u64,
    failures: u64,
}

impl OutputSinks {
    /// Create the output directory and electrogram file for `sim`.
    ///
    /// Schedules start after the simulation's current time, so sinks
    /// attached to a restored run continue the original cadence.
    pub fn create(config: OutputConfig, sim: &Simulation) -> Result<Self, OutputError> {
        config.validate()?;
        fs::create_dir_all(&config.dir).map_err(OutputError::io(&config.dir))?;
        let time = sim.time();

        let electrogram = match config.electrogram_interval {
            Some(interval) if !config.electrogram_sites.is_empty() => {
                let path = config.dir.join(&config.electrogram_file);
                let file = File::create(&path).map_err(OutputError::io(&path))?;
                let writer = ElectrogramWriter::new(
                    BufWriter::new(file),
                    sim.lattice(),
                    &config.electrogram_sites,
                )?;
                Some((Schedule::after(interval, time), writer, path))
            }
            _ => None,
        };
        let snapshots = config
            .snapshot_interval
            .map(|interval| Schedule::after(interval, time));

        tracing::info!(
            dir = %config.dir.display(),
            snapshots = snapshots.is_some(),
            electrogram_sites = config.electrogram_sites.len(),
            "output sinks ready"
        );
        Ok(Self {
            config,
            snapshots,
            electrogram,
            snapshots_written: 0,
            failures: 0,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Voltage snapshots written so far.
    pub fn snapshots_written(&self) -> u64 {
        self.snapshots_written
    }

    /// Writes that failed and were skipped.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Snapshot path for simulated `time`, numbered by the nearest
    /// whole millisecond.
    pub fn snapshot_path(&self, time: f64) -> PathBuf {
        let ms = time.round().max(0.0) as u64;
        self.config
            .dir
            .join(format!("{}{ms:04}.stf", self.config.snapshot_root))
    }

    fn report(&mut self, step: u64, path: &Path, err: &dyn std::fmt::Display) {
        self.failures += 1;
        tracing::warn!(step, path = %path.display(), error = %err, "output write failed");
    }
}

impl StepObserver for OutputSinks {
    fn on_step(&mut self, sim: &Simulation, _metrics: &StepMetrics) {
        let time = sim.time();
        let step = sim.step_id().0;

        if let Some((schedule, writer, path)) = &mut self.electrogram {
            if schedule.due(time) {
                if let Err(err) = writer.record(sim.states()) {
                    let path = path.clone();
                    self.report(step, &path, &err);
                }
            }
        }

        let snapshot_due = self.snapshots.as_mut().is_some_and(|s| s.due(time));
        if snapshot_due {
            let path = self.snapshot_path(time);
            match write_grid_file(&path, sim.lattice(), &GridFormat::voltage(), &sim.voltages()) {
                Ok(()) => {
                    self.snapshots_written += 1;
                    tracing::debug!(step, time, path = %path.display(), "snapshot written");
                }
                Err(err) => self.report(step, &path, &err),
            }
        }
    }

    fn on_finish(&mut self, sim: &Simulation) {
        let step = sim.step_id().0;
        if let Some((_, writer, path)) = &mut self.electrogram {
            if let Err(err) = writer.flush() {
                let path = path.clone();
                self.report(step, &path, &err);
            }
        }
        if self.config.activation_maps {
            let dir = self.config.dir.clone();
            if let Err(err) = write_activation_maps(&dir, &self.config.map_root, sim) {
                self.report(step, &dir, &err);
            }
        }
    }
}
