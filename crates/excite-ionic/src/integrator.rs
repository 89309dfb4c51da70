//! Per-node reaction stage with adaptive sub-stepping.
//!
//! During one global interval the spatial coupling is frozen and each
//! node's state is advanced on its own. The number of sub-steps grows
//! with how fast the voltage moved over the previous global step, so
//! the upstroke is resolved finely while slow recovery takes few steps.

use excite_core::{CellRegion, CellType, StateVector};

use crate::lookup::LookupTable;
use crate::tp06;

/// Slack when dividing the interval by the minimum sub-step, so that
/// `0.1 / 0.01` counts as 10 rather than 9.
const COUNT_EPS: f64 = 1e-9;

/// Rule for choosing the number of reaction sub-steps.
///
/// `k = min(base + floor(gain * |dv|), max_substeps(interval))` where
/// `base` is `fast_min_substeps` if `|dv| > fast_threshold` and
/// `slow_min_substeps` otherwise, and `dv` is the voltage change over
/// the previous global step (mV).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubstepPolicy {
    /// `|dv|` above which the fast minimum applies (mV).
    pub fast_threshold: f64,
    /// Minimum sub-steps while the voltage is moving.
    pub fast_min_substeps: u32,
    /// Minimum sub-steps at rest.
    pub slow_min_substeps: u32,
    /// Extra sub-steps per mV of `|dv|`.
    pub gain: f64,
    /// Smallest permitted sub-step (ms).
    pub min_substep: f64,
}

impl Default for SubstepPolicy {
    fn default() -> Self {
        Self {
            fast_threshold: 0.01,
            fast_min_substeps: 5,
            slow_min_substeps: 1,
            gain: 20.0,
            min_substep: 0.01,
        }
    }
}

impl SubstepPolicy {
    /// Upper bound on sub-steps for `interval`.
    pub fn max_substeps(&self, interval: f64) -> u32 {
        let n = (interval / self.min_substep + COUNT_EPS).floor();
        if n >= u32::MAX as f64 {
            u32::MAX
        } else {
            (n as u32).max(1)
        }
    }

    /// Check the policy against a global interval.
    ///
    /// The cap must admit the fast minimum, otherwise the lower bound
    /// could not be honoured.
    pub fn validate(&self, interval: f64) -> Result<(), String> {
        if !(self.min_substep.is_finite() && self.min_substep > 0.0) {
            return Err(format!("min_substep must be positive, got {}", self.min_substep));
        }
        if !(self.gain.is_finite() && self.gain >= 0.0) {
            return Err(format!("gain must be non-negative, got {}", self.gain));
        }
        if !(self.fast_threshold.is_finite() && self.fast_threshold >= 0.0) {
            return Err(format!(
                "fast_threshold must be non-negative, got {}",
                self.fast_threshold
            ));
        }
        if self.slow_min_substeps == 0 {
            return Err("slow_min_substeps must be at least 1".to_string());
        }
        if self.fast_min_substeps < self.slow_min_substeps {
            return Err(format!(
                "fast_min_substeps ({}) is below slow_min_substeps ({})",
                self.fast_min_substeps, self.slow_min_substeps
            ));
        }
        let cap = self.max_substeps(interval);
        if cap < self.fast_min_substeps {
            return Err(format!(
                "interval {interval} ms admits at most {cap} sub-steps of {} ms, \
                 fewer than fast_min_substeps ({})",
                self.min_substep, self.fast_min_substeps
            ));
        }
        Ok(())
    }

    /// Choose the sub-steps for `interval` given the previous step's
    /// voltage change. A non-finite `previous_dv` takes the cap.
    pub fn plan(&self, interval: f64, previous_dv: f64) -> SubstepPlan {
        let cap = self.max_substeps(interval);
        let magnitude = previous_dv.abs();
        let count = if magnitude.is_finite() {
            let base = if magnitude > self.fast_threshold {
                self.fast_min_substeps
            } else {
                self.slow_min_substeps
            };
            let extra = (self.gain * magnitude).floor();
            let wanted = base as f64 + extra;
            if wanted >= cap as f64 {
                cap
            } else {
                wanted as u32
            }
        } else {
            cap
        };
        SubstepPlan::split(interval, count.max(1))
    }
}

/// How one global interval is divided.
///
/// All sub-steps but the last have length `size`; the last takes the
/// remainder so that `size * (count - 1) + last == interval` exactly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubstepPlan {
    /// Number of sub-steps.
    pub count: u32,
    /// Length of every sub-step but the last (ms).
    pub size: f64,
    /// Length of the last sub-step (ms).
    pub last: f64,
}

impl SubstepPlan {
    /// Divide `interval` into `count` sub-steps.
    pub fn split(interval: f64, count: u32) -> Self {
        let size = interval / count as f64;
        let last = interval - size * (count - 1) as f64;
        Self { count, size, last }
    }

    /// Sub-step lengths in order.
    pub fn steps(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(move |i| if i + 1 == self.count { self.last } else { self.size })
    }
}

/// Inputs to one node's reaction stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReactionInput {
    /// Global interval to cover (ms).
    pub interval: f64,
    /// Voltage change over the previous global step (mV).
    pub previous_dv: f64,
    /// Applied current for the whole interval (pA/pF).
    pub stimulus: f64,
}

/// Advances node states through the reaction stage.
///
/// Holds the shared lookup table; `advance` takes `&self` and touches
/// only the state passed in, so nodes may be processed in parallel.
#[derive(Clone, Debug)]
pub struct ReactionIntegrator {
    table: LookupTable,
    policy: SubstepPolicy,
    conduction_threshold: f64,
}

impl ReactionIntegrator {
    /// Create an integrator. Nodes with a diffusion coefficient below
    /// `conduction_threshold` are classified passive.
    pub fn new(table: LookupTable, policy: SubstepPolicy, conduction_threshold: f64) -> Self {
        Self {
            table,
            policy,
            conduction_threshold,
        }
    }

    /// The lookup table in use.
    pub fn table(&self) -> &LookupTable {
        &self.table
    }

    /// The sub-stepping policy.
    pub fn policy(&self) -> &SubstepPolicy {
        &self.policy
    }

    /// Coefficient below which tissue does not excite.
    pub fn conduction_threshold(&self) -> f64 {
        self.conduction_threshold
    }

    /// Cell type of a node from its coefficient and region.
    pub fn classify(&self, diffusion: f64, region: CellRegion) -> CellType {
        if diffusion < self.conduction_threshold {
            CellType::Passive
        } else {
            CellType::Myocyte(region)
        }
    }

    /// Advance `state` across `input.interval`.
    ///
    /// Passive nodes are left untouched and `None` is returned; otherwise
    /// the plan that was executed.
    pub fn advance(
        &self,
        state: &mut StateVector,
        cell: CellType,
        input: ReactionInput,
    ) -> Option<SubstepPlan> {
        let region = cell.region()?;
        let plan = self.policy.plan(input.interval, input.previous_dv);
        for h in plan.steps() {
            tp06::step(state, &self.table, region, input.stimulus, h);
        }
        Some(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn integrator() -> ReactionIntegrator {
        ReactionIntegrator::new(LookupTable::build(), SubstepPolicy::default(), 0.025)
    }

    #[test]
    fn default_policy_caps_at_ten() {
        let p = SubstepPolicy::default();
        assert_eq!(p.max_substeps(0.1), 10);
        assert!(p.validate(0.1).is_ok());
    }

    #[test]
    fn resting_node_takes_one_step() {
        let p = SubstepPolicy::default();
        assert_eq!(p.plan(0.1, 0.0).count, 1);
        assert_eq!(p.plan(0.1, 0.01).count, 1);
    }

    #[test]
    fn moving_node_takes_fast_minimum() {
        let p = SubstepPolicy::default();
        assert_eq!(p.plan(0.1, 0.02).count, 5);
        assert_eq!(p.plan(0.1, -0.02).count, 5);
        assert_eq!(p.plan(0.1, 0.1).count, 7);
        assert_eq!(p.plan(0.1, 5.0).count, 10);
        assert_eq!(p.plan(0.1, f64::NAN).count, 10);
    }

    #[test]
    fn validate_rejects_unreachable_minimum() {
        let p = SubstepPolicy {
            min_substep: 0.05,
            ..SubstepPolicy::default()
        };
        let err = p.validate(0.1).unwrap_err();
        assert!(err.contains("fast_min_substeps"));
        let p = SubstepPolicy {
            slow_min_substeps: 0,
            ..SubstepPolicy::default()
        };
        assert!(p.validate(0.1).is_err());
    }

    #[test]
    fn passive_nodes_are_untouched() {
        let integ = integrator();
        let mut s = StateVector::resting();
        let before = s;
        let cell = integ.classify(0.01, CellRegion::Epicardial);
        assert_eq!(cell, CellType::Passive);
        let input = ReactionInput {
            interval: 0.1,
            previous_dv: 3.0,
            stimulus: -52.0,
        };
        assert_eq!(integ.advance(&mut s, cell, input), None);
        assert_eq!(s, before);
    }

    #[test]
    fn stimulus_depolarises_excitable_node() {
        let integ = integrator();
        let mut s = StateVector::resting();
        let cell = integ.classify(0.2, CellRegion::Epicardial);
        let input = ReactionInput {
            interval: 0.1,
            previous_dv: 0.0,
            stimulus: -52.0,
        };
        let plan = integ.advance(&mut s, cell, input).unwrap();
        assert_eq!(plan.count, 1);
        assert!(s.voltage() > -85.23 + 4.0);
    }

    #[test]
    fn resting_node_stays_close_to_rest() {
        let integ = integrator();
        let mut s = StateVector::resting();
        let cell = CellType::Myocyte(CellRegion::Epicardial);
        let input = ReactionInput {
            interval: 0.1,
            previous_dv: 0.0,
            stimulus: 0.0,
        };
        for _ in 0..1000 {
            integ.advance(&mut s, cell, input);
        }
        assert!((s.voltage() + 85.23).abs() < 2.0, "drifted to {}", s.voltage());
    }

    proptest! {
        #[test]
        fn substep_count_within_bounds(dv in -200.0f64..200.0, interval in 0.05f64..0.5) {
            let p = SubstepPolicy::default();
            let plan = p.plan(interval, dv);
            let base = if dv.abs() > p.fast_threshold {
                p.fast_min_substeps
            } else {
                p.slow_min_substeps
            };
            prop_assert!(plan.count >= base);
            prop_assert!(plan.count <= p.max_substeps(interval));
        }

        #[test]
        fn substeps_cover_interval_exactly(interval in 1e-3f64..10.0, count in 1u32..200) {
            let plan = SubstepPlan::split(interval, count);
            prop_assert_eq!(plan.size * (count - 1) as f64 + plan.last, interval);
            prop_assert_eq!(plan.steps().count(), count as usize);
            prop_assert!(plan.last > 0.0);
        }
    }
}
