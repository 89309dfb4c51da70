//! Test utilities and mock types for Excite development.
//!
//! Provides lattice fixtures, seeded voltage fields, mock diffusion
//! stencils and state assertions shared by the workspace's tests and
//! benchmarks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use excite_core::StateVector;

/// Panics unless every state is bit-identical to the first.
pub fn assert_all_identical(states: &[StateVector]) {
    let Some(first) = states.first() else {
        return;
    };
    for (i, s) in states.iter().enumerate() {
        for (c, (a, b)) in first.as_array().iter().zip(s.as_array()).enumerate() {
            assert!(
                a.to_bits() == b.to_bits(),
                "node {i} component {c} differs: {a} vs {b}"
            );
        }
    }
}

/// Panics unless `a` and `b` differ by at most `tol`.
pub fn assert_close(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "{a} and {b} differ by more than {tol}");
}
