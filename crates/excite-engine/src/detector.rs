//! Per-node activation and recovery times.
//!
//! Each excitable node walks through beats `1..=max_beats`, where
//! `max_beats` is the number of primary (S1) pulses. Within a beat the
//! first upward threshold crossing records the upstroke and the first
//! downward crossing after it records the downstroke and moves on to the
//! next beat. At the last beat further crossings are ignored.
//!
//! Crossings are stamped with the time at which the step started.

use rayon::prelude::*;

use crate::stimulus::TIME_EPS;

/// Detection parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Crossing threshold (mV).
    pub threshold: f64,
    /// Simulated time from which crossings are recorded (ms).
    pub start_time: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: -70.0,
            start_time: 800.0,
        }
    }
}

impl DetectorConfig {
    /// Check the parameters.
    pub fn validate(&self) -> Result<(), String> {
        if !self.threshold.is_finite() {
            return Err(format!("threshold must be finite, got {}", self.threshold));
        }
        if !(self.start_time.is_finite() && self.start_time >= 0.0) {
            return Err(format!(
                "start_time must be non-negative, got {}",
                self.start_time
            ));
        }
        Ok(())
    }
}

/// Upstroke and downstroke of one node in one beat.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BeatTiming {
    /// Activation time (ms), if detected.
    pub upstroke: Option<f64>,
    /// Recovery time (ms), if detected.
    pub downstroke: Option<f64>,
}

/// Detector state in flat arrays, for checkpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct BeatSnapshot {
    /// Beats per node.
    pub max_beats: u32,
    /// Current 1-based beat of each node.
    pub beat: Vec<u32>,
    /// `node * max_beats + (beat - 1)` indexed timings.
    pub timings: Vec<BeatTiming>,
}

/// Records crossings for every node.
#[derive(Clone, Debug)]
pub struct Detector {
    config: DetectorConfig,
    max_beats: u32,
    beat: Vec<u32>,
    timings: Vec<BeatTiming>,
}

impl Detector {
    /// A detector for `nodes` nodes recording up to `max_beats` beats
    /// each (at least one), with nothing recorded yet.
    pub fn new(config: DetectorConfig, max_beats: u32, nodes: usize) -> Self {
        let max_beats = max_beats.max(1);
        Self {
            beat: vec![1; nodes],
            timings: vec![BeatTiming::default(); nodes * max_beats as usize],
            max_beats,
            config,
        }
    }

    /// Parameters in use.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Beats recorded per node.
    pub fn max_beats(&self) -> u32 {
        self.max_beats
    }

    fn per_node(&self) -> usize {
        self.max_beats as usize
    }

    /// Number of nodes tracked.
    pub fn node_count(&self) -> usize {
        self.beat.len()
    }

    /// Current 1-based beat of `node`.
    pub fn beat(&self, node: usize) -> u32 {
        self.beat[node]
    }

    /// Timings of `node` for every beat, in beat order.
    pub fn timings(&self, node: usize) -> &[BeatTiming] {
        let m = self.per_node();
        &self.timings[node * m..(node + 1) * m]
    }

    /// Timing of `node` in 1-based `beat`.
    pub fn timing(&self, node: usize, beat: u32) -> Option<BeatTiming> {
        let b = beat.checked_sub(1)? as usize;
        self.timings(node).get(b).copied()
    }

    /// Process one step that started at `time` and moved voltages from
    /// `previous` to `current`. Nodes with `excitable[i] == false` are skipped.
    ///
    /// # Panics
    ///
    /// Panics if a slice's length differs from the node count.
    pub fn observe(&mut self, time: f64, previous: &[f64], current: &[f64], excitable: &[bool]) {
        if time + TIME_EPS < self.config.start_time {
            return;
        }
        let n = self.beat.len();
        assert_eq!(previous.len(), n, "previous voltage length");
        assert_eq!(current.len(), n, "current voltage length");
        assert_eq!(excitable.len(), n, "excitable mask length");

        let threshold = self.config.threshold;
        let max_beats = self.max_beats;
        let m = self.per_node();
        self.beat
            .par_iter_mut()
            .zip(self.timings.par_chunks_mut(m))
            .enumerate()
            .for_each(|(i, (beat, timings))| {
                if !excitable[i] {
                    return;
                }
                let (old, new) = (previous[i], current[i]);
                let slot = &mut timings[(*beat - 1) as usize];
                if new > threshold && old <= threshold && slot.upstroke.is_none() {
                    slot.upstroke = Some(time);
                } else if new < threshold
                    && old >= threshold
                    && slot.upstroke.is_some()
                    && slot.downstroke.is_none()
                {
                    slot.downstroke = Some(time);
                    if *beat < max_beats {
                        *beat += 1;
                    }
                }
            });
    }

    /// Capture the detector for a checkpoint.
    pub fn snapshot(&self) -> BeatSnapshot {
        BeatSnapshot {
            max_beats: self.max_beats,
            beat: self.beat.clone(),
            timings: self.timings.clone(),
        }
    }

    /// Resume from a checkpoint. Returns `Err` if the snapshot's shape
    /// does not match this detector.
    pub fn restore(&mut self, snapshot: BeatSnapshot) -> Result<(), String> {
        if snapshot.max_beats != self.max_beats {
            return Err(format!(
                "snapshot records {} beats per node, detector {}",
                snapshot.max_beats, self.max_beats
            ));
        }
        if snapshot.beat.len() != self.beat.len()
            || snapshot.timings.len() != self.timings.len()
        {
            return Err(format!(
                "snapshot covers {} nodes, detector {}",
                snapshot.beat.len(),
                self.beat.len()
            ));
        }
        if let Some(b) = snapshot
            .beat
            .iter()
            .find(|&&b| b == 0 || b > self.max_beats)
        {
            return Err(format!("beat counter {b} out of range"));
        }
        self.beat = snapshot.beat;
        self.timings = snapshot.timings;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn detector(start_time: f64, max_beats: u32, nodes: usize) -> Detector {
        let config = DetectorConfig {
            threshold: -70.0,
            start_time,
        };
        Detector::new(config, max_beats, nodes)
    }

    /// Feeds a single-node voltage trace sampled every `dt`, the first
    /// step starting at zero.
    fn feed(det: &mut Detector, trace: &[f64], dt: f64) {
        for (k, w) in trace.windows(2).enumerate() {
            det.observe(k as f64 * dt, &w[..1], &w[1..], &[true]);
        }
    }

    #[test]
    fn records_one_beat() {
        let mut det = detector(0.0, 2, 1);
        feed(&mut det, &[-85.0, -80.0, -20.0, 10.0, -60.0, -75.0, -85.0], 1.0);
        assert_eq!(
            det.timing(0, 1),
            Some(BeatTiming {
                upstroke: Some(1.0),
                downstroke: Some(4.0)
            })
        );
        assert_eq!(det.beat(0), 2);
        assert_eq!(det.timing(0, 2), Some(BeatTiming::default()));
    }

    #[test]
    fn threshold_touch_counts_as_below() {
        let mut det = detector(0.0, 1, 1);
        feed(&mut det, &[-80.0, -70.0, -80.0], 1.0);
        assert_eq!(det.timing(0, 1).unwrap().upstroke, None);
        feed(&mut det, &[-70.0, -69.0], 1.0);
        assert_eq!(det.timing(0, 1).unwrap().upstroke, Some(0.0));
    }

    #[test]
    fn ignores_crossings_before_start() {
        let mut det = detector(10.0, 1, 1);
        feed(&mut det, &[-85.0, 0.0, -85.0, 0.0], 5.0);
        let t = det.timing(0, 1).unwrap();
        assert_eq!(t.upstroke, Some(10.0));
        assert_eq!(t.downstroke, None);
    }

    #[test]
    fn caps_beat_counter() {
        let mut det = detector(0.0, 2, 1);
        let trace: Vec<f64> = (0..20).map(|k| if k % 2 == 1 { 0.0 } else { -85.0 }).collect();
        feed(&mut det, &trace, 1.0);
        assert_eq!(det.beat(0), 2);
        let last = det.timing(0, 2).unwrap();
        assert_eq!(last.upstroke, Some(2.0));
        assert_eq!(last.downstroke, Some(3.0));
    }

    #[test]
    fn three_beat_cap_keeps_third_record() {
        let mut det = detector(0.0, 3, 1);
        let trace: Vec<f64> = (0..12).map(|k| if k % 2 == 1 { 0.0 } else { -85.0 }).collect();
        feed(&mut det, &trace, 1.0);
        assert_eq!(det.max_beats(), 3);
        assert_eq!(det.beat(0), 3);
        assert_eq!(det.timings(0).len(), 3);
        assert_eq!(
            det.timing(0, 3),
            Some(BeatTiming {
                upstroke: Some(4.0),
                downstroke: Some(5.0)
            })
        );
        assert_eq!(det.timing(0, 4), None);
    }

    #[test]
    fn zero_beats_still_records_one() {
        let det = detector(0.0, 0, 2);
        assert_eq!(det.max_beats(), 1);
        assert_eq!(det.timings(1).len(), 1);
    }

    #[test]
    fn skips_non_excitable_nodes() {
        let mut det = detector(0.0, 1, 2);
        det.observe(1.0, &[-85.0, -85.0], &[0.0, 0.0], &[true, false]);
        assert!(det.timing(0, 1).unwrap().upstroke.is_some());
        assert!(det.timing(1, 1).unwrap().upstroke.is_none());
    }

    #[test]
    fn restore_rejects_mismatched_shape() {
        let det = detector(0.0, 3, 4);
        let mut other = detector(0.0, 2, 4);
        assert!(other.restore(det.snapshot()).is_err());
        let mut same = detector(0.0, 3, 4);
        assert!(same.restore(det.snapshot()).is_ok());
        let mut small = detector(0.0, 3, 3);
        assert!(small.restore(det.snapshot()).is_err());
    }

    proptest! {
        #[test]
        fn timings_are_ordered(trace in proptest::collection::vec(-90.0f64..40.0, 2..200)) {
            let mut det = detector(0.0, 4, 1);
            feed(&mut det, &trace, 0.5);
            let timings = det.timings(0);
            let mut last_down = f64::NEG_INFINITY;
            for t in timings {
                if let Some(up) = t.upstroke {
                    prop_assert!(up > last_down);
                    if let Some(down) = t.downstroke {
                        prop_assert!(down > up);
                        last_down = down;
                    }
                } else {
                    prop_assert!(t.downstroke.is_none());
                }
            }
        }
    }
}
