//! Voltage-binned gating kinetics.
//!
//! Every gate of the model relaxes towards a voltage-dependent steady
//! state with a voltage-dependent time constant. Both are evaluated once
//! per integer millivolt over [`V_MIN`, `V_MAX`] and stored in a
//! [`LookupTable`], so the reaction stage never evaluates the rate
//! expressions on the hot path.
//!
//! The voltage-to-bin mapping truncates towards zero before scaling:
//! `bin = trunc(V) * GAIN + OFFSET`. Each bin holds the kinetics evaluated
//! exactly at its integer voltage.

use excite_core::CellRegion;
use rayon::prelude::*;

/// Lowest tabulated voltage (mV).
pub const V_MIN: f64 = -100.0;
/// Highest tabulated voltage (mV).
pub const V_MAX: f64 = 100.0;
/// Bins per millivolt after truncation.
pub const GAIN: i64 = 1;
/// Bin index of 0 mV.
pub const OFFSET: i64 = 100;
/// Number of voltage bins.
pub const BINS: usize = ((V_MAX - V_MIN) as i64 * GAIN + 1) as usize;
/// Stored quantities per bin: a steady state and a time constant per gate.
pub const QUANTITIES: usize = 2 * Gate::COUNT;

/// A voltage-gated channel gate with tabulated kinetics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Fast sodium activation.
    M,
    /// Fast sodium inactivation.
    H,
    /// Slow sodium inactivation.
    J,
    /// L-type calcium activation.
    D,
    /// L-type calcium slow inactivation.
    F,
    /// L-type calcium fast inactivation.
    F2,
    /// Rapid delayed rectifier activation.
    Xr1,
    /// Rapid delayed rectifier inactivation.
    Xr2,
    /// Slow delayed rectifier activation.
    Xs,
    /// Transient outward activation, epicardial.
    REpi,
    /// Transient outward inactivation, epicardial.
    SEpi,
    /// Transient outward activation, endocardial.
    REndo,
    /// Transient outward inactivation, endocardial.
    SEndo,
    /// Transient outward activation, mid-myocardial.
    RMid,
    /// Transient outward inactivation, mid-myocardial.
    SMid,
}

impl Gate {
    /// Number of tabulated gates.
    pub const COUNT: usize = 15;

    /// Every gate in table order.
    pub const ALL: [Gate; Gate::COUNT] = [
        Gate::M,
        Gate::H,
        Gate::J,
        Gate::D,
        Gate::F,
        Gate::F2,
        Gate::Xr1,
        Gate::Xr2,
        Gate::Xs,
        Gate::REpi,
        Gate::SEpi,
        Gate::REndo,
        Gate::SEndo,
        Gate::RMid,
        Gate::SMid,
    ];

    /// The transient outward `(r, s)` gates for a cell region.
    pub fn transient_outward(region: CellRegion) -> (Gate, Gate) {
        match region {
            CellRegion::Epicardial => (Gate::REpi, Gate::SEpi),
            CellRegion::Endocardial => (Gate::REndo, Gate::SEndo),
            CellRegion::MidMyocardial => (Gate::RMid, Gate::SMid),
        }
    }
}

/// Steady state and time constant of one gate at one voltage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GateKinetics {
    /// Steady-state open probability.
    pub steady: f64,
    /// Relaxation time constant (ms).
    pub tau: f64,
}

impl GateKinetics {
    /// Advance a gate value by `dt` with the Rush-Larsen exponential update.
    #[inline]
    pub fn relax(self, x: f64, dt: f64) -> f64 {
        self.steady - (self.steady - x) * (-dt / self.tau).exp()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + x.exp())
}

/// Evaluate every gate's kinetics at voltage `v` (mV).
///
/// A pure function of `v`; the table is just this evaluated per bin.
pub fn gate_kinetics(v: f64) -> [GateKinetics; Gate::COUNT] {
    let mut out = [GateKinetics::default(); Gate::COUNT];
    let mut put = |g: Gate, steady: f64, tau: f64| out[g as usize] = GateKinetics { steady, tau };

    // Fast sodium.
    let alpha_m = sigmoid((-60.0 - v) / 5.0);
    let beta_m = 0.1 * sigmoid((v + 35.0) / 5.0) + 0.1 * sigmoid((v - 50.0) / 200.0);
    let m_root = sigmoid((-56.86 - v) / 9.03);
    put(Gate::M, m_root * m_root, alpha_m * beta_m);

    let (alpha_h, beta_h, alpha_j, beta_j) = if v >= -40.0 {
        (
            0.0,
            0.77 / (0.13 * (1.0 + (-(v + 10.66) / 11.1).exp())),
            0.0,
            0.6 * (0.057 * v).exp() / (1.0 + (-0.1 * (v + 32.0)).exp()),
        )
    } else {
        (
            0.057 * (-(v + 80.0) / 6.8).exp(),
            2.7 * (0.079 * v).exp() + 3.1e5 * (0.3485 * v).exp(),
            (-2.5428e4 * (0.2444 * v).exp() - 6.948e-6 * (-0.04391 * v).exp()) * (v + 37.78)
                / (1.0 + (0.311 * (v + 79.23)).exp()),
            0.02424 * (-0.01052 * v).exp() / (1.0 + (-0.1378 * (v + 40.14)).exp()),
        )
    };
    let h_root = sigmoid((v + 71.55) / 7.43);
    let hj_inf = h_root * h_root;
    put(Gate::H, hj_inf, 1.0 / (alpha_h + beta_h));
    put(Gate::J, hj_inf, 1.0 / (alpha_j + beta_j));

    // L-type calcium.
    let ad = 1.4 * sigmoid((-35.0 - v) / 13.0) + 0.25;
    let bd = 1.4 * sigmoid((v + 5.0) / 5.0);
    let cd = sigmoid((50.0 - v) / 20.0);
    put(Gate::D, sigmoid((-8.0 - v) / 7.5), ad * bd + cd);

    let af = 1102.5 * (-(v + 27.0) * (v + 27.0) / 225.0).exp();
    let bf = 200.0 * sigmoid((13.0 - v) / 10.0);
    let cf = 180.0 * sigmoid((v + 30.0) / 10.0) + 20.0;
    put(Gate::F, sigmoid((v + 20.0) / 7.0), af + bf + cf);

    let af2 = 562.0 * (-(v + 27.0) * (v + 27.0) / 240.0).exp();
    let bf2 = 31.0 * sigmoid((25.0 - v) / 10.0);
    let cf2 = 80.0 * sigmoid((v + 30.0) / 10.0);
    put(Gate::F2, 0.67 * sigmoid((v + 35.0) / 7.0) + 0.33, af2 + bf2 + cf2);

    // Rapid delayed rectifier.
    let axr1 = 450.0 * sigmoid((-45.0 - v) / 10.0);
    let bxr1 = 6.0 * sigmoid((v + 30.0) / 11.5);
    put(Gate::Xr1, sigmoid((-26.0 - v) / 7.0), axr1 * bxr1);

    let axr2 = 3.0 * sigmoid((-60.0 - v) / 20.0);
    let bxr2 = 1.12 * sigmoid((v - 60.0) / 20.0);
    put(Gate::Xr2, sigmoid((v + 88.0) / 24.0), axr2 * bxr2);

    // Slow delayed rectifier.
    let axs = 1400.0 / (1.0 + ((5.0 - v) / 6.0).exp()).sqrt();
    let bxs = sigmoid((v - 35.0) / 15.0);
    put(Gate::Xs, sigmoid((-5.0 - v) / 14.0), axs * bxs + 80.0);

    // Transient outward. Activation is shared by all regions.
    let r_inf = sigmoid((20.0 - v) / 6.0);
    let tau_r = 9.5 * (-(v + 40.0) * (v + 40.0) / 1800.0).exp() + 0.8;
    let s_inf = sigmoid((v + 20.0) / 5.0);
    let tau_s = 85.0 * (-(v + 45.0) * (v + 45.0) / 320.0).exp()
        + 5.0 * sigmoid((v - 20.0) / 5.0)
        + 3.0;
    put(Gate::REpi, r_inf, tau_r);
    put(Gate::SEpi, s_inf, tau_s);
    put(Gate::REndo, r_inf, tau_r);
    put(
        Gate::SEndo,
        sigmoid((v + 28.0) / 5.0),
        1000.0 * (-(v + 67.0) * (v + 67.0) / 1000.0).exp() + 8.0,
    );
    put(Gate::RMid, r_inf, tau_r);
    put(Gate::SMid, s_inf, tau_s);

    out
}

/// Precomputed gate kinetics indexed by `[quantity][voltage bin]`.
///
/// Quantity `2g` is the steady state of gate `g` and `2g + 1` its time
/// constant. Immutable once built and safe to share across threads.
#[derive(Clone, Debug, PartialEq)]
pub struct LookupTable {
    values: Vec<f64>,
}

impl LookupTable {
    /// Evaluate the kinetics for every bin.
    ///
    /// Bins are independent, so they are evaluated in parallel; the
    /// result does not depend on the number of worker threads.
    pub fn build() -> Self {
        let rows: Vec<[GateKinetics; Gate::COUNT]> = (0..BINS)
            .into_par_iter()
            .map(|bin| gate_kinetics(Self::bin_voltage(bin)))
            .collect();

        let mut values = vec![0.0; QUANTITIES * BINS];
        for (bin, row) in rows.iter().enumerate() {
            for (g, k) in row.iter().enumerate() {
                values[(2 * g) * BINS + bin] = k.steady;
                values[(2 * g + 1) * BINS + bin] = k.tau;
            }
        }
        Self { values }
    }

    /// The voltage a bin was evaluated at.
    pub fn bin_voltage(bin: usize) -> f64 {
        (bin as i64 - OFFSET) as f64 / GAIN as f64
    }

    /// Raw bin index for `voltage`, possibly out of range.
    #[inline]
    pub fn raw_bin(voltage: f64) -> i64 {
        (voltage.trunc() as i64) * GAIN + OFFSET
    }

    /// Bin for `voltage`, or `None` outside the tabulated domain.
    #[inline]
    pub fn try_bin(voltage: f64) -> Option<usize> {
        if !voltage.is_finite() {
            return None;
        }
        let b = Self::raw_bin(voltage);
        (0..BINS as i64).contains(&b).then_some(b as usize)
    }

    /// Bin for `voltage`, saturating at the edges of the domain.
    #[inline]
    pub fn clamped_bin(voltage: f64) -> usize {
        Self::raw_bin(voltage).clamp(0, BINS as i64 - 1) as usize
    }

    /// Kinetics of `gate` in `bin`.
    #[inline]
    pub fn kinetics(&self, gate: Gate, bin: usize) -> GateKinetics {
        let g = gate as usize;
        GateKinetics {
            steady: self.values[(2 * g) * BINS + bin],
            tau: self.values[(2 * g + 1) * BINS + bin],
        }
    }

    /// One stored quantity across all bins.
    pub fn quantity(&self, q: usize) -> &[f64] {
        &self.values[q * BINS..(q + 1) * BINS]
    }
}
