//! Flux-conservative diffusion with a per-node coefficient.

use excite_core::NodeId;
use excite_space::Lattice;

use crate::neighbourhood::Cross;
use crate::stencil::{explicit_bound, DiffusionStencil};

/// Each face flux uses the mean of the two coefficients it joins:
///
/// ```text
/// [ (D_S + D)(vS - v) - (D_N + D)(v - vN) ] / (2 dx²)
///   + [ (D_E + D)(vE - v) - (D_W + D)(v - vW) ] / (2 dx²)
/// ```
///
/// What leaves one node through a face enters its neighbour, so the
/// total voltage over a closed lattice is conserved.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedDiffusion {
    dx: f64,
}

impl WeightedDiffusion {
    /// Create a stencil for grid spacing `dx`.
    pub fn new(dx: f64) -> Result<Self, String> {
        if !(dx.is_finite() && dx > 0.0) {
            return Err(format!("dx must be positive, got {dx}"));
        }
        Ok(Self { dx })
    }
}

impl DiffusionStencil for WeightedDiffusion {
    fn name(&self) -> &str {
        "weighted"
    }

    fn evaluate(&self, lattice: &Lattice, voltage: &[f64], node: NodeId) -> f64 {
        let x = Cross::gather(lattice, voltage, node);
        let vertical =
            (x.south.1 + x.d) * (x.south.0 - x.v) - (x.north.1 + x.d) * (x.v - x.north.0);
        let horizontal =
            (x.east.1 + x.d) * (x.east.0 - x.v) - (x.west.1 + x.d) * (x.v - x.west.0);
        (vertical + horizontal) / (2.0 * self.dx * self.dx)
    }

    fn max_dt(&self, lattice: &Lattice) -> f64 {
        explicit_bound(self.dx, lattice.max_diffusion())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UniformDiffusion;

    #[test]
    fn matches_uniform_for_constant_coefficient() {
        let lattice = Lattice::uniform(4, 5, 0.2).unwrap();
        let v: Vec<f64> = (0..20).map(|i| (i as f64 * 0.7).sin() * 30.0 - 60.0).collect();
        let w = WeightedDiffusion::new(0.25).unwrap();
        let u = UniformDiffusion::new(0.2, 0.25).unwrap();
        for n in lattice.nodes() {
            let a = w.evaluate(&lattice, &v, n);
            let b = u.evaluate(&lattice, &v, n);
            assert!((a - b).abs() < 1e-9 * b.abs().max(1.0), "{n}: {a} vs {b}");
        }
    }

    #[test]
    fn low_coefficient_face_limits_flux() {
        #[rustfmt::skip]
        let map = [
            0.2, 0.2,
            0.2, 0.05,
        ];
        let lattice = Lattice::from_coefficients(2, 2, &map, 0.0).unwrap();
        let w = WeightedDiffusion::new(0.25).unwrap();
        let v = [10.0, 0.0, 0.0, 0.0];
        let into_east = w.evaluate(&lattice, &v, NodeId(1));
        let mut low = v;
        low[0] = 0.0;
        low[2] = 10.0;
        let into_low_node = w.evaluate(&lattice, &low, NodeId(3));
        assert!(into_east > into_low_node);
        assert!(into_low_node > 0.0);
    }
}
