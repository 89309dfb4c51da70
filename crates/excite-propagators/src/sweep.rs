//! Whole-lattice explicit diffusion update.

use excite_core::NodeId;
use excite_space::Lattice;
use rayon::prelude::*;

use crate::stencil::DiffusionStencil;

/// `output[i] = input[i] + dt * stencil(input, i)` for every node.
///
/// `input` and `output` are distinct buffers, so every node sees its
/// neighbours' values from before the update regardless of evaluation
/// order. Nodes are processed in parallel.
///
/// # Panics
///
/// Panics if either buffer's length differs from the lattice node count.
pub fn diffuse(
    stencil: &dyn DiffusionStencil,
    lattice: &Lattice,
    input: &[f64],
    output: &mut [f64],
    dt: f64,
) {
    assert_eq!(input.len(), lattice.node_count(), "input buffer length");
    assert_eq!(output.len(), lattice.node_count(), "output buffer length");
    output.par_iter_mut().enumerate().for_each(|(i, out)| {
        *out = input[i] + dt * stencil.evaluate(lattice, input, NodeId(i as u32));
    });
}
