//! Benchmark profiles for the Excite simulator.
//!
//! - [`reference_profile`]: 150x150 sheet (22.5K nodes), default protocol
//! - [`stress_profile`]: 400x400 sheet (160K nodes), default protocol
//! - [`scarred_profile`]: reference sheet with a circular non-conducting scar

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use excite_engine::SimulationConfig;
use excite_propagators::DiffusionStrategy;
use excite_space::Lattice;

/// Coefficient of healthy tissue in every profile (mm²/ms).
pub const TISSUE_COEFFICIENT: f64 = 0.2;

/// Build the reference profile: 150x150 uniform sheet stimulated at its
/// centre with the default protocol.
///
/// dt = 0.1 and dx = 0.25 keep a half-step within the explicit limit of
/// dx²/(4·0.2) = 0.078 ms.
pub fn reference_profile() -> (SimulationConfig, Lattice) {
    sheet(150)
}

/// Build the stress profile: 400x400 uniform sheet.
pub fn stress_profile() -> (SimulationConfig, Lattice) {
    sheet(400)
}

/// Build the reference sheet with a scar of radius 20 cells centred at
/// (40, 40), using the smoothed stencil.
pub fn scarred_profile() -> (SimulationConfig, Lattice) {
    let side = 150u32;
    let map: Vec<f64> = (0..side)
        .flat_map(|r| {
            (0..side).map(move |c| {
                let (dr, dc) = (r as f64 - 40.0, c as f64 - 40.0);
                if dr * dr + dc * dc <= 400.0 {
                    0.0
                } else {
                    TISSUE_COEFFICIENT
                }
            })
        })
        .collect();
    let lattice = Lattice::from_coefficients(side, side, &map, 0.025).unwrap();
    let config = SimulationConfig {
        diffusion: DiffusionStrategy::Smoothed,
        ..centred_config(side)
    };
    (config, lattice)
}

fn sheet(side: u32) -> (SimulationConfig, Lattice) {
    let lattice = Lattice::uniform(side, side, TISSUE_COEFFICIENT).unwrap();
    (centred_config(side), lattice)
}

fn centred_config(side: u32) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.stimulus.electrode = (side / 2, side / 2);
    config
}
