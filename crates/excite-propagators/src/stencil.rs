//! The stencil trait.

use excite_core::NodeId;
use excite_space::Lattice;

/// Spatial operator evaluated one node at a time.
///
/// Implementations read only `voltage` and the lattice, so a sweep may
/// evaluate nodes in any order and on any number of threads.
pub trait DiffusionStencil: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Diffusive contribution to `dV/dt` at `node` (mV/ms).
    ///
    /// `voltage` is indexed by node. The caller scales by the step size.
    fn evaluate(&self, lattice: &Lattice, voltage: &[f64], node: NodeId) -> f64;

    /// Largest explicit step for which the update stays stable on
    /// `lattice`. Infinite when nothing diffuses.
    fn max_dt(&self, lattice: &Lattice) -> f64;
}

/// Explicit-Euler stability bound `dx² / (4 D)` of the 5-point stencil.
pub(crate) fn explicit_bound(dx: f64, coefficient: f64) -> f64 {
    if coefficient > 0.0 {
        dx * dx / (4.0 * coefficient)
    } else {
        f64::INFINITY
    }
}
