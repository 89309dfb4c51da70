//! No-flux boundaries and whole-lattice properties of the stencils.

use excite_core::NodeId;
use excite_propagators::{
    diffuse, DiffusionStencil, SmoothedDiffusion, UniformDiffusion, WeightedDiffusion,
};
use excite_space::{Compass, Lattice};
use excite_test_utils::assert_close;
use excite_test_utils::fixtures::{perturbed_field, uniform_sheet, ConstantStencil};
use proptest::prelude::*;

const DX: f64 = 0.25;

/// Uniform stencil summing only the neighbours that exist.
fn uniform_omitting(lattice: &Lattice, v: &[f64], node: NodeId, d: f64) -> f64 {
    let own = v[node.index()];
    let sum: f64 = Compass::CARDINALS
        .iter()
        .filter_map(|&dir| lattice.neighbour(node, dir))
        .map(|n| v[n.index()] - own)
        .sum();
    d * sum / (DX * DX)
}

/// Weighted stencil summing only the faces that exist.
fn weighted_omitting(lattice: &Lattice, v: &[f64], node: NodeId) -> f64 {
    let own = v[node.index()];
    let d = lattice.diffusion(node);
    let sum: f64 = Compass::CARDINALS
        .iter()
        .filter_map(|&dir| lattice.neighbour(node, dir))
        .map(|n| (lattice.diffusion(n) + d) * (v[n.index()] - own))
        .sum();
    sum / (2.0 * DX * DX)
}

fn edge_nodes(lattice: &Lattice) -> Vec<NodeId> {
    lattice
        .nodes()
        .filter(|&n| {
            Compass::CARDINALS
                .iter()
                .any(|&d| lattice.neighbour(n, d).is_none())
        })
        .collect()
}

#[test]
fn edge_contribution_matches_omitted_stencil() {
    let lattice = uniform_sheet(8, 9);
    let mut v = vec![-85.0; lattice.node_count()];
    for (i, n) in lattice.nodes().enumerate() {
        let (r, c) = lattice.coord(n);
        if (2..6).contains(&r) && (2..7).contains(&c) {
            v[i] = -85.0 + 10.0 * ((r * 7 + c) % 5) as f64;
        }
    }
    let uniform = UniformDiffusion::new(0.2, DX).unwrap();
    let weighted = WeightedDiffusion::new(DX).unwrap();
    let edges = edge_nodes(&lattice);
    assert_eq!(edges.len(), 2 * 8 + 2 * 9 - 4);
    for n in edges {
        assert_close(
            uniform.evaluate(&lattice, &v, n),
            uniform_omitting(&lattice, &v, n, 0.2),
            1e-9,
        );
        assert_close(
            weighted.evaluate(&lattice, &v, n),
            weighted_omitting(&lattice, &v, n),
            1e-9,
        );
    }
}

#[test]
fn uniform_field_has_zero_flux_for_every_stencil() {
    let map: Vec<f64> = (0..42).map(|i| 0.05 + 0.005 * (i % 9) as f64).collect();
    let lattice = Lattice::from_coefficients(6, 7, &map, 0.0).unwrap();
    let v = vec![-42.0; lattice.node_count()];
    let stencils: Vec<Box<dyn DiffusionStencil>> = vec![
        Box::new(UniformDiffusion::new(0.2, DX).unwrap()),
        Box::new(WeightedDiffusion::new(DX).unwrap()),
        Box::new(SmoothedDiffusion::new(DX).unwrap()),
    ];
    for s in &stencils {
        for n in lattice.nodes() {
            assert_eq!(s.evaluate(&lattice, &v, n), 0.0, "{} at {n}", s.name());
        }
    }
}

#[test]
fn holes_behave_like_edges() {
    #[rustfmt::skip]
    let map = [
        0.2, 0.2, 0.2,
        0.2, 0.0, 0.2,
        0.2, 0.2, 0.2,
    ];
    let lattice = Lattice::from_coefficients(3, 3, &map, 0.025).unwrap();
    let v = perturbed_field(lattice.node_count(), -60.0, 20.0, 3);
    let uniform = UniformDiffusion::new(0.2, DX).unwrap();
    let north_middle = lattice.node_at(0, 1).unwrap();
    assert_close(
        uniform.evaluate(&lattice, &v, north_middle),
        uniform_omitting(&lattice, &v, north_middle, 0.2),
        1e-9,
    );
}

#[test]
fn sweep_scales_the_rate_by_dt() {
    let lattice = uniform_sheet(4, 4);
    let v = perturbed_field(lattice.node_count(), -80.0, 5.0, 11);
    let stencil = ConstantStencil { rate: 2.0 };
    let mut out = vec![0.0; v.len()];
    diffuse(&stencil, &lattice, &v, &mut out, 0.05);
    for (before, after) in v.iter().zip(&out) {
        assert_close(after - before, 0.1, 1e-12);
    }
}

proptest! {
    #[test]
    fn sweep_is_order_independent(seed in 0u64..1000) {
        let lattice = uniform_sheet(7, 5);
        let v = perturbed_field(lattice.node_count(), -70.0, 15.0, seed);
        let stencil = WeightedDiffusion::new(DX).unwrap();
        let mut parallel = vec![0.0; v.len()];
        diffuse(&stencil, &lattice, &v, &mut parallel, 0.05);
        let mut serial = vec![0.0; v.len()];
        for n in lattice.nodes().collect::<Vec<_>>().into_iter().rev() {
            serial[n.index()] = v[n.index()] + 0.05 * stencil.evaluate(&lattice, &v, n);
        }
        prop_assert_eq!(parallel, serial);
    }

    #[test]
    fn stable_step_does_not_create_extrema(seed in 0u64..1000) {
        let lattice = uniform_sheet(6, 6);
        let v = perturbed_field(lattice.node_count(), -50.0, 30.0, seed);
        let stencil = UniformDiffusion::new(0.2, DX).unwrap();
        let dt = stencil.max_dt(&lattice);
        let mut out = vec![0.0; v.len()];
        diffuse(&stencil, &lattice, &v, &mut out, dt);
        let lo = v.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for x in out {
            prop_assert!(x >= lo - 1e-9 && x <= hi + 1e-9);
        }
    }
}
