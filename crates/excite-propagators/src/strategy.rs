//! Named selection of a diffusion stencil.

use std::fmt;

use crate::smoothed::SmoothedDiffusion;
use crate::stencil::DiffusionStencil;
use crate::uniform::UniformDiffusion;
use crate::weighted::WeightedDiffusion;

/// Which stencil a simulation uses.
///
/// Chosen per deployment; the scheduler uses the same stencil for every
/// half-step, including the bootstrap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DiffusionStrategy {
    /// [`UniformDiffusion`] with the given coefficient.
    Uniform {
        /// Diffusion coefficient (mm²/ms).
        coefficient: f64,
    },
    /// [`WeightedDiffusion`] over the lattice's coefficients.
    Weighted,
    /// [`SmoothedDiffusion`] over the lattice's coefficients.
    Smoothed,
}

impl Default for DiffusionStrategy {
    fn default() -> Self {
        Self::Uniform { coefficient: 0.2 }
    }
}

impl DiffusionStrategy {
    /// Instantiate the stencil for grid spacing `dx`.
    pub fn build(&self, dx: f64) -> Result<Box<dyn DiffusionStencil>, String> {
        Ok(match *self {
            Self::Uniform { coefficient } => Box::new(UniformDiffusion::new(coefficient, dx)?),
            Self::Weighted => Box::new(WeightedDiffusion::new(dx)?),
            Self::Smoothed => Box::new(SmoothedDiffusion::new(dx)?),
        })
    }
}

impl fmt::Display for DiffusionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform { coefficient } => write!(f, "uniform(D={coefficient})"),
            Self::Weighted => write!(f, "weighted"),
            Self::Smoothed => write!(f, "smoothed"),
        }
    }
}
