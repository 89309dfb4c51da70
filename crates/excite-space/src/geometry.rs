//! Loading a lattice from a diffusion-coefficient map.
//!
//! The map is plain text: `rows × cols` whitespace-separated numbers in
//! row-major order. Line structure is not significant.

use std::fs;
use std::path::Path;

use crate::error::SpaceError;
use crate::lattice::Lattice;

/// Cells at or below this coefficient are holes in the tissue.
pub const DEFAULT_VOID_THRESHOLD: f64 = 0.025;

/// Parse a whitespace-separated coefficient map.
///
/// Returns every value found; the caller checks the count against the
/// grid dimensions.
pub fn parse_coefficients(text: &str) -> Result<Vec<f64>, SpaceError> {
    text.split_whitespace()
        .enumerate()
        .map(|(position, token)| {
            token.parse::<f64>().map_err(|_| SpaceError::InvalidToken {
                position,
                token: token.to_string(),
            })
        })
        .collect()
}

/// Read the coefficient map at `path` and build a [`Lattice`].
pub fn load_lattice(
    path: &Path,
    rows: u32,
    cols: u32,
    void_threshold: f64,
) -> Result<Lattice, SpaceError> {
    let text = fs::read_to_string(path).map_err(|source| SpaceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let coefficients = parse_coefficients(&text)?;
    let lattice = Lattice::from_coefficients(rows, cols, &coefficients, void_threshold)?;
    tracing::info!(
        path = %path.display(),
        rows,
        cols,
        nodes = lattice.node_count(),
        "loaded tissue geometry"
    );
    Ok(lattice)
}
