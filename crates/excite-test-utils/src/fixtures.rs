//! Reusable lattices, voltage fields and stencils.
//!
//! - [`uniform_sheet`]: fully conducting sheet with the default coefficient.
//! - [`fibrotic_sheet`]: sheet with one passive column.
//! - [`perturbed_field`]: seeded random voltages around a base value.
//! - [`ConstantStencil`]: stencil returning a fixed rate everywhere.

use excite_core::NodeId;
use excite_propagators::DiffusionStencil;
use excite_space::Lattice;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Coefficient used by the standard fixtures (mm²/ms).
pub const SHEET_COEFFICIENT: f64 = 0.2;

/// A fully conducting `rows × cols` sheet.
pub fn uniform_sheet(rows: u32, cols: u32) -> Lattice {
    Lattice::uniform(rows, cols, SHEET_COEFFICIENT).unwrap()
}

/// A sheet whose column `col` has coefficient `passive` instead of the
/// standard one. With no void threshold those cells remain nodes.
pub fn fibrotic_sheet(rows: u32, cols: u32, col: u32, passive: f64) -> Lattice {
    let map: Vec<f64> = (0..rows)
        .flat_map(|_| (0..cols).map(move |c| if c == col { passive } else { SHEET_COEFFICIENT }))
        .collect();
    Lattice::from_coefficients(rows, cols, &map, 0.0).unwrap()
}

/// `n` voltages drawn uniformly from `base ± amplitude`.
pub fn perturbed_field(n: usize, base: f64, amplitude: f64, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| base + rng.gen_range(-amplitude..=amplitude))
        .collect()
}

/// Stencil contributing the same rate at every node.
pub struct ConstantStencil {
    pub rate: f64,
}

impl DiffusionStencil for ConstantStencil {
    fn name(&self) -> &str {
        "constant"
    }

    fn evaluate(&self, _lattice: &Lattice, _voltage: &[f64], _node: NodeId) -> f64 {
        self.rate
    }

    fn max_dt(&self, _lattice: &Lattice) -> f64 {
        f64::INFINITY
    }
}
