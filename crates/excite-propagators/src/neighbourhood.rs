//! Cardinal neighbour values with no-flux substitution.

use excite_core::NodeId;
use excite_space::{Compass, Lattice};

/// Voltages and coefficients of a node and its four cardinal neighbours.
/// Missing neighbours carry the node's own values.
pub(crate) struct Cross {
    pub v: f64,
    pub d: f64,
    pub north: (f64, f64),
    pub east: (f64, f64),
    pub south: (f64, f64),
    pub west: (f64, f64),
}

impl Cross {
    pub fn gather(lattice: &Lattice, voltage: &[f64], node: NodeId) -> Self {
        let v = voltage[node.index()];
        let d = lattice.diffusion(node);
        let pick = |dir| match lattice.neighbour(node, dir) {
            Some(n) => (voltage[n.index()], lattice.diffusion(n)),
            None => (v, d),
        };
        Self {
            v,
            d,
            north: pick(Compass::North),
            east: pick(Compass::East),
            south: pick(Compass::South),
            west: pick(Compass::West),
        }
    }

    /// Sum of the two second differences, unscaled.
    pub fn laplacian_sum(&self) -> f64 {
        (self.south.0 + self.north.0 - 2.0 * self.v) + (self.east.0 + self.west.0 - 2.0 * self.v)
    }
}
