//! ten Tusscher–Panfilov 2006 human ventricular myocyte.
//!
//! Currents are in pA/pF, concentrations in mM, time in ms and voltage
//! in mV. [`step`] advances one node by one reaction sub-step: currents
//! are evaluated from the state at the start of the sub-step, then the
//! concentrations, gates and finally the voltage are updated.

use excite_core::{CellRegion, Component, StateVector};

use crate::lookup::{Gate, GateKinetics, LookupTable};

// ── Physical constants ──────────────────────────────────────────

const R_GAS: f64 = 8314.472;
const FARADAY: f64 = 96485.3415;
const TEMPERATURE: f64 = 310.0;
const RT_ON_F: f64 = R_GAS * TEMPERATURE / FARADAY;
const F_ON_RT: f64 = 1.0 / RT_ON_F;
/// Membrane capacitance (µF).
const CAPACITANCE: f64 = 0.185;

// ── Extracellular concentrations ────────────────────────────────

const K_O: f64 = 5.4;
const CA_O: f64 = 2.0;
const NA_O: f64 = 140.0;

// ── Compartment volumes (µL) ────────────────────────────────────

const V_C: f64 = 0.016404;
const V_SR: f64 = 0.001094;
const V_SS: f64 = 0.00005468;

// ── Calcium buffering and SR handling ───────────────────────────

const BUF_C: f64 = 0.2;
const K_BUF_C: f64 = 0.001;
const BUF_SR: f64 = 10.0;
const K_BUF_SR: f64 = 0.3;
const BUF_SS: f64 = 0.4;
const K_BUF_SS: f64 = 0.00025;
const V_MAX_UP: f64 = 0.006375;
const K_UP: f64 = 0.00025;
const V_REL: f64 = 0.102;
const K1_PRIME: f64 = 0.15;
const K2_PRIME: f64 = 0.045;
const K3: f64 = 0.060;
const K4: f64 = 0.005;
const EC: f64 = 1.5;
const MAX_SR: f64 = 2.5;
const MIN_SR: f64 = 1.0;
const V_LEAK: f64 = 0.00036;
const V_XFER: f64 = 0.0038;

// ── Conductances ────────────────────────────────────────────────

const G_KR: f64 = 0.153;
const P_KNA: f64 = 0.03;
const G_K1: f64 = 5.405;
const G_NA: f64 = 14.838;
const G_BNA: f64 = 0.00029;
const K_MK: f64 = 1.0;
const K_MNA: f64 = 40.0;
const K_NAK: f64 = 2.724;
const G_CAL: f64 = 3.980e-5;
const G_BCA: f64 = 0.000592;
const K_NACA: f64 = 1000.0;
const KM_NAI: f64 = 87.5;
const KM_CA: f64 = 1.38;
const K_SAT: f64 = 0.1;
const N_NACA: f64 = 0.35;
const G_PCA: f64 = 0.1238;
const K_PCA: f64 = 0.0005;
const G_PK: f64 = 0.0146;

/// Region-specific transient outward and slow rectifier conductances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionConductances {
    /// Transient outward conductance (nS/pF).
    pub g_to: f64,
    /// Slow delayed rectifier conductance (nS/pF).
    pub g_ks: f64,
}

impl RegionConductances {
    /// Conductances for a cell region.
    pub fn for_region(region: CellRegion) -> Self {
        match region {
            CellRegion::Epicardial => Self {
                g_to: 0.294,
                g_ks: 0.392,
            },
            CellRegion::Endocardial => Self {
                g_to: 0.073,
                g_ks: 0.392,
            },
            CellRegion::MidMyocardial => Self {
                g_to: 0.294,
                g_ks: 0.098,
            },
        }
    }
}

/// Every membrane current of one cell at one instant (pA/pF).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IonicCurrents {
    /// Fast sodium.
    pub i_na: f64,
    /// L-type calcium.
    pub i_cal: f64,
    /// Transient outward potassium.
    pub i_to: f64,
    /// Rapid delayed rectifier.
    pub i_kr: f64,
    /// Slow delayed rectifier.
    pub i_ks: f64,
    /// Inward rectifier.
    pub i_k1: f64,
    /// Sodium-calcium exchanger.
    pub i_naca: f64,
    /// Sodium-potassium pump.
    pub i_nak: f64,
    /// Sarcolemmal calcium pump.
    pub i_pca: f64,
    /// Plateau potassium.
    pub i_pk: f64,
    /// Background sodium.
    pub i_bna: f64,
    /// Background calcium.
    pub i_bca: f64,
    /// Applied stimulus.
    pub i_stim: f64,
}

impl IonicCurrents {
    /// Evaluate the currents of `state` with applied current `stimulus`.
    pub fn evaluate(state: &StateVector, region: CellRegion, stimulus: f64) -> Self {
        let v = state[Component::Voltage];
        let ki = state[Component::KIntra];
        let nai = state[Component::NaIntra];
        let cai = state[Component::CaCytosol];
        let cass = state[Component::CaSubspace];
        let g = RegionConductances::for_region(region);

        let e_k = RT_ON_F * (K_O / ki).ln();
        let e_na = RT_ON_F * (NA_O / nai).ln();
        let e_ks = RT_ON_F * ((K_O + P_KNA * NA_O) / (ki + P_KNA * nai)).ln();
        let e_ca = 0.5 * RT_ON_F * (CA_O / cai).ln();

        let a_k1 = 0.1 / (1.0 + (0.06 * (v - e_k - 200.0)).exp());
        let b_k1 = (3.0 * (0.0002 * (v - e_k + 100.0)).exp() + (0.1 * (v - e_k - 10.0)).exp())
            / (1.0 + (-0.5 * (v - e_k)).exp());
        let rec_k1 = a_k1 / (a_k1 + b_k1);
        let rec_nak =
            1.0 / (1.0 + 0.1245 * (-0.1 * v * F_ON_RT).exp() + 0.0353 * (-v * F_ON_RT).exp());
        let rec_pk = 1.0 / (1.0 + ((25.0 - v) / 5.98).exp());

        let m = state[Component::M];
        let i_na = G_NA * m * m * m * state[Component::H] * state[Component::J] * (v - e_na);

        let cal_gates = state[Component::D]
            * state[Component::F]
            * state[Component::F2]
            * state[Component::FCass];
        let i_cal = G_CAL * cal_gates * cal_driving_force(v, cass);

        let i_to = g.g_to * state[Component::R] * state[Component::S] * (v - e_k);
        let i_kr =
            G_KR * (K_O / 5.4).sqrt() * state[Component::Xr1] * state[Component::Xr2] * (v - e_k);
        let xs = state[Component::Xs];
        let i_ks = g.g_ks * xs * xs * (v - e_ks);
        let i_k1 = G_K1 * rec_k1 * (v - e_k);

        let e_n = (N_NACA * v * F_ON_RT).exp();
        let e_n1 = ((N_NACA - 1.0) * v * F_ON_RT).exp();
        let i_naca = K_NACA
            * (1.0 / (KM_NAI.powi(3) + NA_O.powi(3)))
            * (1.0 / (KM_CA + CA_O))
            * (1.0 / (1.0 + K_SAT * e_n1))
            * (e_n * nai.powi(3) * CA_O - e_n1 * NA_O.powi(3) * cai * 2.5);
        let i_nak = K_NAK * (K_O / (K_O + K_MK)) * (nai / (nai + K_MNA)) * rec_nak;
        let i_pca = G_PCA * cai / (K_PCA + cai);
        let i_pk = G_PK * rec_pk * (v - e_k);
        let i_bna = G_BNA * (v - e_na);
        let i_bca = G_BCA * (v - e_ca);

        Self {
            i_na,
            i_cal,
            i_to,
            i_kr,
            i_ks,
            i_k1,
            i_naca,
            i_nak,
            i_pca,
            i_pk,
            i_bna,
            i_bca,
            i_stim: stimulus,
        }
    }

    /// Net transmembrane current, stimulus included.
    pub fn total(&self) -> f64 {
        self.i_na
            + self.i_cal
            + self.i_to
            + self.i_kr
            + self.i_ks
            + self.i_k1
            + self.i_naca
            + self.i_nak
            + self.i_pca
            + self.i_pk
            + self.i_bna
            + self.i_bca
            + self.i_stim
    }
}

/// Goldman-Hodgkin-Katz driving term of the L-type current, without the
/// gates and conductance. The removable singularity at 15 mV is replaced
/// by its limit.
fn cal_driving_force(v: f64, cass: f64) -> f64 {
    let x = 2.0 * (v - 15.0) * F_ON_RT;
    if x.abs() < 1e-9 {
        return 2.0 * FARADAY * (0.25 * cass - CA_O);
    }
    2.0 * FARADAY * x * (0.25 * x.exp() * cass - CA_O) / x.exp_m1()
}

/// Buffered concentration update: solves the rapid-buffer quadratic for
/// the new free concentration after adding `delta` to the total.
fn buffered(free: f64, delta: f64, total_buffer: f64, k_buffer: f64) -> f64 {
    let bound = total_buffer * free / (free + k_buffer);
    let b = total_buffer - bound - delta - free + k_buffer;
    let c = k_buffer * (bound + delta + free);
    ((b * b + 4.0 * c).sqrt() - b) / 2.0
}

fn update_concentrations(state: &mut StateVector, i: &IonicCurrents, dt: f64) {
    let ca_sr = state[Component::CaSr];
    let ca_ss = state[Component::CaSubspace];
    let ca_i = state[Component::CaCytosol];

    let k_casr = MAX_SR - (MAX_SR - MIN_SR) / (1.0 + (EC / ca_sr) * (EC / ca_sr));
    let k1 = K1_PRIME / k_casr;
    let k2 = K2_PRIME * k_casr;
    let rr0 = state[Component::RyrRecovery];
    let rr = rr0 + dt * (K4 * (1.0 - rr0) - k2 * ca_ss * rr0);
    let oo = k1 * ca_ss * ca_ss * rr / (K3 + k1 * ca_ss * ca_ss);
    state[Component::RyrRecovery] = rr;
    state[Component::RyrOpen] = oo;

    let i_rel = V_REL * oo * (ca_sr - ca_ss);
    let i_leak = V_LEAK * (ca_sr - ca_i);
    let i_up = V_MAX_UP / (1.0 + (K_UP * K_UP) / (ca_i * ca_i));
    let i_xfer = V_XFER * (ca_ss - ca_i);

    let d_casr = dt * (i_up - i_rel - i_leak);
    state[Component::CaSr] = buffered(ca_sr, d_casr, BUF_SR, K_BUF_SR);

    let d_cass = dt
        * (-i_xfer * (V_C / V_SS) + i_rel * (V_SR / V_SS)
            - i.i_cal * CAPACITANCE / (2.0 * V_SS * FARADAY));
    state[Component::CaSubspace] = buffered(ca_ss, d_cass, BUF_SS, K_BUF_SS);

    let d_cai = dt
        * (-(i.i_bca + i.i_pca - 2.0 * i.i_naca) * CAPACITANCE / (2.0 * V_C * FARADAY)
            - (i_up - i_leak) * (V_SR / V_C)
            + i_xfer);
    state[Component::CaCytosol] = buffered(ca_i, d_cai, BUF_C, K_BUF_C);

    let to_conc = CAPACITANCE / (V_C * FARADAY);
    state[Component::NaIntra] +=
        dt * (-(i.i_na + i.i_bna + 3.0 * i.i_nak + 3.0 * i.i_naca) * to_conc);
    state[Component::KIntra] += dt
        * (-(i.i_stim + i.i_k1 + i.i_to + i.i_kr + i.i_ks - 2.0 * i.i_nak + i.i_pk) * to_conc);
}

fn update_gates(
    state: &mut StateVector,
    table: &LookupTable,
    bin: usize,
    region: CellRegion,
    ca_ss: f64,
    dt: f64,
) {
    let (r_gate, s_gate) = Gate::transient_outward(region);
    let tabulated = [
        (Component::M, Gate::M),
        (Component::H, Gate::H),
        (Component::J, Gate::J),
        (Component::D, Gate::D),
        (Component::F, Gate::F),
        (Component::F2, Gate::F2),
        (Component::Xr1, Gate::Xr1),
        (Component::Xr2, Gate::Xr2),
        (Component::Xs, Gate::Xs),
        (Component::R, r_gate),
        (Component::S, s_gate),
    ];
    for (c, g) in tabulated {
        state[c] = table.kinetics(g, bin).relax(state[c], dt);
    }

    let q = (ca_ss / 0.05) * (ca_ss / 0.05);
    let fcass = GateKinetics {
        steady: 0.6 / (1.0 + q) + 0.4,
        tau: 80.0 / (1.0 + q) + 2.0,
    };
    state[Component::FCass] = fcass.relax(state[Component::FCass], dt);
}

/// Advance `state` by one sub-step of length `dt`.
///
/// Returns the currents evaluated at the start of the sub-step.
pub fn step(
    state: &mut StateVector,
    table: &LookupTable,
    region: CellRegion,
    stimulus: f64,
    dt: f64,
) -> IonicCurrents {
    let currents = IonicCurrents::evaluate(state, region, stimulus);
    let bin = LookupTable::clamped_bin(state[Component::Voltage]);
    let ca_ss = state[Component::CaSubspace];

    update_concentrations(state, &currents, dt);
    update_gates(state, table, bin, region, ca_ss, dt);
    state[Component::Voltage] -= dt * currents.total();
    currents
}
