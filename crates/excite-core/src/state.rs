//! The per-node ionic state vector.
//!
//! Every lattice node owns one [`StateVector`]: membrane voltage followed
//! by the gating variables and ion concentrations of the ventricular
//! myocyte model, in the fixed order given by [`Component`]. The order is
//! part of the checkpoint layout and must not change.

use std::ops::{Index, IndexMut};

/// Number of components in a [`StateVector`].
pub const NUM_STATES: usize = 20;

/// One component of the ionic state, in storage order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Component {
    /// Transmembrane voltage (mV).
    Voltage = 0,
    /// Fast sodium activation gate.
    M,
    /// Fast sodium inactivation gate.
    H,
    /// Slow sodium inactivation gate.
    J,
    /// Transient outward activation gate.
    R,
    /// Transient outward inactivation gate.
    S,
    /// L-type calcium activation gate.
    D,
    /// L-type calcium slow voltage inactivation gate.
    F,
    /// L-type calcium fast voltage inactivation gate.
    F2,
    /// L-type calcium subspace-calcium inactivation gate.
    FCass,
    /// Rapid delayed rectifier activation gate.
    Xr1,
    /// Rapid delayed rectifier inactivation gate.
    Xr2,
    /// Slow delayed rectifier activation gate.
    Xs,
    /// Ryanodine receptor recovery fraction.
    RyrRecovery,
    /// Ryanodine receptor open fraction.
    RyrOpen,
    /// Subspace free calcium (mM).
    CaSubspace,
    /// Sarcoplasmic reticulum free calcium (mM).
    CaSr,
    /// Cytosolic free calcium (mM).
    CaCytosol,
    /// Intracellular sodium (mM).
    NaIntra,
    /// Intracellular potassium (mM).
    KIntra,
}

impl Component {
    /// Every component in storage order.
    pub const ALL: [Component; NUM_STATES] = [
        Component::Voltage,
        Component::M,
        Component::H,
        Component::J,
        Component::R,
        Component::S,
        Component::D,
        Component::F,
        Component::F2,
        Component::FCass,
        Component::Xr1,
        Component::Xr2,
        Component::Xs,
        Component::RyrRecovery,
        Component::RyrOpen,
        Component::CaSubspace,
        Component::CaSr,
        Component::CaCytosol,
        Component::NaIntra,
        Component::KIntra,
    ];

    /// Position of this component within a [`StateVector`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short name used in logs and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Voltage => "V",
            Self::M => "m",
            Self::H => "h",
            Self::J => "j",
            Self::R => "r",
            Self::S => "s",
            Self::D => "d",
            Self::F => "f",
            Self::F2 => "f2",
            Self::FCass => "fCass",
            Self::Xr1 => "Xr1",
            Self::Xr2 => "Xr2",
            Self::Xs => "Xs",
            Self::RyrRecovery => "RR",
            Self::RyrOpen => "OO",
            Self::CaSubspace => "CaSS",
            Self::CaSr => "CaSR",
            Self::CaCytosol => "Cai",
            Self::NaIntra => "Nai",
            Self::KIntra => "Ki",
        }
    }
}

/// Full ionic state of one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateVector(pub [f64; NUM_STATES]);

impl StateVector {
    /// Quiescent state of an isolated ventricular myocyte.
    pub fn resting() -> Self {
        let mut s = Self([0.0; NUM_STATES]);
        s[Component::Voltage] = -85.23;
        s[Component::M] = 0.00172;
        s[Component::H] = 0.7444;
        s[Component::J] = 0.7045;
        s[Component::R] = 2.42e-8;
        s[Component::S] = 0.999998;
        s[Component::D] = 3.373e-5;
        s[Component::F] = 0.7888;
        s[Component::F2] = 0.9755;
        s[Component::FCass] = 0.9953;
        s[Component::Xr1] = 0.000621;
        s[Component::Xr2] = 0.4712;
        s[Component::Xs] = 0.0095;
        s[Component::RyrRecovery] = 0.9073;
        s[Component::RyrOpen] = 0.0;
        s[Component::CaSubspace] = 0.00036;
        s[Component::CaSr] = 3.64;
        s[Component::CaCytosol] = 0.000126;
        s[Component::NaIntra] = 8.604;
        s[Component::KIntra] = 136.89;
        s
    }

    /// Membrane voltage (mV).
    #[inline]
    pub fn voltage(&self) -> f64 {
        self.0[0]
    }

    /// Overwrite the membrane voltage.
    #[inline]
    pub fn set_voltage(&mut self, v: f64) {
        self.0[0] = v;
    }

    /// Raw component values in storage order.
    #[inline]
    pub fn as_array(&self) -> &[f64; NUM_STATES] {
        &self.0
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|x| x.is_finite())
    }
}

impl Default for StateVector {
    fn default() -> Self {
        Self::resting()
    }
}

impl Index<Component> for StateVector {
    type Output = f64;

    #[inline]
    fn index(&self, c: Component) -> &f64 {
        &self.0[c.index()]
    }
}

impl IndexMut<Component> for StateVector {
    #[inline]
    fn index_mut(&mut self, c: Component) -> &mut f64 {
        &mut self.0[c.index()]
    }
}
