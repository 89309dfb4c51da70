//! Single-coefficient diffusion.

use excite_core::NodeId;
use excite_space::Lattice;

use crate::neighbourhood::Cross;
use crate::stencil::{explicit_bound, DiffusionStencil};

/// 5-point Laplacian scaled by one coefficient:
///
/// ```text
/// D * ((vS + vN - 2v) + (vE + vW - 2v)) / dx²
/// ```
///
/// The lattice's per-node coefficients are ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformDiffusion {
    coefficient: f64,
    dx: f64,
}

impl UniformDiffusion {
    /// Create a stencil. Returns `Err` unless `coefficient >= 0` and
    /// `dx > 0`, both finite.
    pub fn new(coefficient: f64, dx: f64) -> Result<Self, String> {
        if !(coefficient.is_finite() && coefficient >= 0.0) {
            return Err(format!("coefficient must be non-negative, got {coefficient}"));
        }
        if !(dx.is_finite() && dx > 0.0) {
            return Err(format!("dx must be positive, got {dx}"));
        }
        Ok(Self { coefficient, dx })
    }

    /// The diffusion coefficient.
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }
}

impl DiffusionStencil for UniformDiffusion {
    fn name(&self) -> &str {
        "uniform"
    }

    fn evaluate(&self, lattice: &Lattice, voltage: &[f64], node: NodeId) -> f64 {
        let x = Cross::gather(lattice, voltage, node);
        self.coefficient * x.laplacian_sum() / (self.dx * self.dx)
    }

    fn max_dt(&self, _lattice: &Lattice) -> f64 {
        explicit_bound(self.dx, self.coefficient)
    }
}
