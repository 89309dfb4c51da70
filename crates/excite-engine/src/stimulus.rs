//! S1/S2 stimulus protocol.
//!
//! A train of `s1_beats` primary pulses at a fixed cycle length is
//! followed by up to `s2_beats` extra pulses, each armed when the
//! reference node has recovered below a hyperpolarisation threshold
//! inside a window after the last primary pulse. Pulses are delivered
//! only to nodes inside the electrode disc.
//!
//! ```text
//!            onset reached                 time >= until
//!   Idle ────────────────────▶ S1Active ──────────────────▶ Idle
//!    │  primaries done, in window,
//!    │  V_ref <= threshold
//!    ▼
//!  S2Armed ──next step──▶ S2Active ──time >= until──▶ Idle
//! ```

use std::fmt;

/// Slack for comparing step times against pulse boundaries, so that
/// accumulated rounding in `step * dt` does not shift a pulse by a step.
pub const TIME_EPS: f64 = 1e-9;

/// Protocol parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct StimulusConfig {
    /// Interval between primary pulse onsets (ms).
    pub cycle_length: f64,
    /// Number of primary (S1) pulses, the first at time zero.
    pub s1_beats: u32,
    /// Number of extra (S2) pulses.
    pub s2_beats: u32,
    /// Duration of every pulse (ms).
    pub pulse_duration: f64,
    /// Injected current while a pulse is active (pA/pF, negative
    /// depolarises).
    pub amplitude: f64,
    /// Start of the S2 arming window, relative to the last S1 onset (ms).
    pub s2_window_start: f64,
    /// End of the S2 arming window, relative to the last S1 onset (ms).
    pub s2_window_end: f64,
    /// Reference voltage at or below which an S2 pulse arms (mV).
    pub s2_threshold: f64,
    /// Electrode centre `(row, col)`, 0-based.
    pub electrode: (u32, u32),
    /// Electrode radius in grid cells.
    pub electrode_radius: f64,
    /// Node whose voltage arms S2 pulses; the electrode centre if `None`.
    pub reference: Option<(u32, u32)>,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            cycle_length: 400.0,
            s1_beats: 3,
            s2_beats: 4,
            pulse_duration: 2.0,
            amplitude: -52.0,
            s2_window_start: 100.0,
            s2_window_end: 1300.0,
            s2_threshold: -84.5,
            electrode: (74, 74),
            electrode_radius: 5.0,
            reference: None,
        }
    }
}

impl StimulusConfig {
    /// Onset of primary pulse `k` (zero-based).
    pub fn s1_onset(&self, k: u32) -> f64 {
        k as f64 * self.cycle_length
    }

    /// Onset of the last primary pulse, or zero if there are none.
    pub fn last_s1_onset(&self) -> f64 {
        self.s1_onset(self.s1_beats.saturating_sub(1))
    }

    /// Grid position of the reference node.
    pub fn reference_position(&self) -> (u32, u32) {
        self.reference.unwrap_or(self.electrode)
    }

    /// Check timing and geometry parameters.
    pub fn validate(&self) -> Result<(), String> {
        for (name, v) in [
            ("cycle_length", self.cycle_length),
            ("pulse_duration", self.pulse_duration),
            ("electrode_radius", self.electrode_radius),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(format!("{name} must be positive, got {v}"));
            }
        }
        if !self.amplitude.is_finite() {
            return Err(format!("amplitude must be finite, got {}", self.amplitude));
        }
        if self.s1_beats > 1 && self.pulse_duration >= self.cycle_length {
            return Err(format!(
                "pulse_duration ({}) must be shorter than cycle_length ({})",
                self.pulse_duration, self.cycle_length
            ));
        }
        if !(self.s2_window_start.is_finite()
            && self.s2_window_end.is_finite()
            && self.s2_window_start < self.s2_window_end)
        {
            return Err(format!(
                "S2 window [{}, {}] is empty",
                self.s2_window_start, self.s2_window_end
            ));
        }
        if !self.s2_threshold.is_finite() {
            return Err("s2_threshold must be finite".to_string());
        }
        Ok(())
    }
}

/// Protocol state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StimulusState {
    /// No pulse is being delivered.
    Idle,
    /// Primary pulse `beat` (1-based) is active until `until`.
    S1Active {
        /// 1-based primary pulse number.
        beat: u32,
        /// End of the pulse (ms).
        until: f64,
    },
    /// Extra pulse `beat` will start at the next step.
    S2Armed {
        /// 1-based extra pulse number.
        beat: u32,
    },
    /// Extra pulse `beat` is active until `until`.
    S2Active {
        /// 1-based extra pulse number.
        beat: u32,
        /// End of the pulse (ms).
        until: f64,
    },
}

impl StimulusState {
    /// Whether electrode nodes receive current in this state.
    pub fn is_delivering(self) -> bool {
        matches!(self, Self::S1Active { .. } | Self::S2Active { .. })
    }
}

impl fmt::Display for StimulusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::S1Active { beat, .. } => write!(f, "S1 #{beat}"),
            Self::S2Armed { beat } => write!(f, "S2 #{beat} armed"),
            Self::S2Active { beat, .. } => write!(f, "S2 #{beat}"),
        }
    }
}

/// Everything needed to resume a protocol mid-run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProtocolSnapshot {
    /// Current state.
    pub state: StimulusState,
    /// Primary pulses started so far.
    pub s1_delivered: u32,
    /// Extra pulses started so far.
    pub s2_delivered: u32,
}

/// The protocol state machine.
#[derive(Clone, Debug)]
pub struct StimulusProtocol {
    config: StimulusConfig,
    state: StimulusState,
    s1_delivered: u32,
    s2_delivered: u32,
}

impl StimulusProtocol {
    /// A protocol in the idle state with nothing delivered.
    pub fn new(config: StimulusConfig) -> Self {
        Self {
            config,
            state: StimulusState::Idle,
            s1_delivered: 0,
            s2_delivered: 0,
        }
    }

    /// Parameters in use.
    pub fn config(&self) -> &StimulusConfig {
        &self.config
    }

    /// Current state.
    pub fn state(&self) -> StimulusState {
        self.state
    }

    /// Current injected at electrode nodes this step.
    pub fn current(&self) -> f64 {
        if self.state.is_delivering() {
            self.config.amplitude
        } else {
            0.0
        }
    }

    /// Evaluate the transitions for the step starting at `time`, given
    /// the reference node's voltage at that time. Returns the new state.
    pub fn advance(&mut self, time: f64, reference_voltage: f64) -> StimulusState {
        self.state = match self.state {
            StimulusState::S1Active { until, .. } | StimulusState::S2Active { until, .. }
                if time + TIME_EPS < until =>
            {
                self.state
            }
            StimulusState::S2Armed { beat } => {
                self.s2_delivered += 1;
                StimulusState::S2Active {
                    beat,
                    until: time + self.config.pulse_duration,
                }
            }
            _ => self.from_idle(time, reference_voltage),
        };
        self.state
    }

    fn from_idle(&mut self, time: f64, reference_voltage: f64) -> StimulusState {
        let c = &self.config;
        if self.s1_delivered < c.s1_beats {
            let onset = c.s1_onset(self.s1_delivered);
            if time + TIME_EPS >= onset {
                self.s1_delivered += 1;
                return StimulusState::S1Active {
                    beat: self.s1_delivered,
                    until: onset + c.pulse_duration,
                };
            }
            return StimulusState::Idle;
        }
        let since_last = time - c.last_s1_onset();
        let in_window = since_last > c.s2_window_start && since_last < c.s2_window_end;
        if self.s2_delivered < c.s2_beats && in_window && reference_voltage <= c.s2_threshold {
            return StimulusState::S2Armed {
                beat: self.s2_delivered + 1,
            };
        }
        StimulusState::Idle
    }

    /// Capture the protocol for a checkpoint.
    pub fn snapshot(&self) -> ProtocolSnapshot {
        ProtocolSnapshot {
            state: self.state,
            s1_delivered: self.s1_delivered,
            s2_delivered: self.s2_delivered,
        }
    }

    /// Resume from a checkpoint.
    pub fn restore(&mut self, snapshot: ProtocolSnapshot) {
        self.state = snapshot.state;
        self.s1_delivered = snapshot.s1_delivered;
        self.s2_delivered = snapshot.s2_delivered;
    }
}
