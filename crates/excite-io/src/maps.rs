//! End-of-run activation, recovery and coefficient maps.

use std::path::{Path, PathBuf};

use excite_engine::Simulation;

use crate::error::OutputError;
use crate::grid::{write_grid_file, GridFormat};

/// Written for nodes whose crossing was never detected.
pub const UNDETECTED: f64 = -1.0;

/// Write `{root}upStrokeTimeS{b}.stf` and `{root}downStrokeTimeS{b}.stf`
/// for every recorded beat, then `{root}diffusion.stf`. Returns the
/// paths written, in that order.
pub fn write_activation_maps(
    dir: &Path,
    root: &str,
    sim: &Simulation,
) -> Result<Vec<PathBuf>, OutputError> {
    let lattice = sim.lattice();
    let det = sim.detector();
    let format = GridFormat::map();
    let n = lattice.node_count();
    let mut written = Vec::new();

    for beat in 1..=det.max_beats() {
        let mut up = Vec::with_capacity(n);
        let mut down = Vec::with_capacity(n);
        for node in 0..n {
            let t = det.timing(node, beat).unwrap_or_default();
            up.push(t.upstroke.unwrap_or(UNDETECTED));
            down.push(t.downstroke.unwrap_or(UNDETECTED));
        }
        for (kind, values) in [("up", &up), ("down", &down)] {
            let path = dir.join(format!("{root}{kind}StrokeTimeS{beat}.stf"));
            write_grid_file(&path, lattice, &format, values)?;
            written.push(path);
        }
    }

    let path = dir.join(format!("{root}diffusion.stf"));
    write_grid_file(&path, lattice, &format, lattice.diffusion_coefficients())?;
    written.push(path);
    tracing::info!(files = written.len(), dir = %dir.display(), "activation maps written");
    Ok(written)
}
