//! Diffusion with an explicit coefficient-gradient term.

use excite_core::NodeId;
use excite_space::Lattice;

use crate::neighbourhood::Cross;
use crate::stencil::{explicit_bound, DiffusionStencil};

/// Expands `div(D grad v)` as `D lap(v) + grad(v) . grad(D)`, with
/// central differences for both gradients:
///
/// ```text
/// D ((vS + vN - 2v) + (vE + vW - 2v)) / dx²
///   + (vS - vN)/(2dx) * (D_S - D_N)/(2dx)
///   + (vW - vE)/(2dx) * (D_W - D_E)/(2dx)
/// ```
///
/// A coefficient gradient is dropped along an axis when either of its
/// coefficients or the node's own is not positive.
#[derive(Clone, Debug, PartialEq)]
pub struct SmoothedDiffusion {
    dx: f64,
}

impl SmoothedDiffusion {
    /// Create a stencil for grid spacing `dx`.
    pub fn new(dx: f64) -> Result<Self, String> {
        if !(dx.is_finite() && dx > 0.0) {
            return Err(format!("dx must be positive, got {dx}"));
        }
        Ok(Self { dx })
    }

    fn coefficient_gradient(&self, d: f64, plus: f64, minus: f64) -> f64 {
        if d > 0.0 && plus > 0.0 && minus > 0.0 {
            (plus - minus) / (2.0 * self.dx)
        } else {
            0.0
        }
    }
}

impl DiffusionStencil for SmoothedDiffusion {
    fn name(&self) -> &str {
        "smoothed"
    }

    fn evaluate(&self, lattice: &Lattice, voltage: &[f64], node: NodeId) -> f64 {
        let x = Cross::gather(lattice, voltage, node);
        let two_dx = 2.0 * self.dx;
        let lap = x.laplacian_sum() / (self.dx * self.dx);
        let dv_row = (x.south.0 - x.north.0) / two_dx;
        let dv_col = (x.west.0 - x.east.0) / two_dx;
        let dd_row = self.coefficient_gradient(x.d, x.south.1, x.north.1);
        let dd_col = self.coefficient_gradient(x.d, x.west.1, x.east.1);
        x.d * lap + dv_row * dd_row + dv_col * dd_col
    }

    fn max_dt(&self, lattice: &Lattice) -> f64 {
        explicit_bound(self.dx, lattice.max_diffusion())
    }
}
