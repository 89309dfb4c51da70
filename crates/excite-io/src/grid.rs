//! STF grid files.
//!
//! A six-line text header followed by one line per grid row, each value
//! followed by a single space:
//!
//! ```text
//! NAME Vm
//! RANK 2
//! DIMENSIONS <cols> <rows>
//! BOUNDS 0 <cols-1> 0 <rows-1>
//! SCALAR
//! DATA
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use excite_core::NodeId;
use excite_space::Lattice;

use crate::error::OutputError;

/// How values are rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct GridFormat {
    /// Value of the `NAME` header line.
    pub name: String,
    /// Digits after the decimal point.
    pub precision: usize,
    /// Value written for grid cells that are not nodes.
    pub void_value: f64,
}

impl GridFormat {
    /// Voltage snapshots: two decimals, voids at -100 mV.
    pub fn voltage() -> Self {
        Self {
            name: "Vm".to_string(),
            precision: 2,
            void_value: -100.0,
        }
    }

    /// End-of-run maps: four decimals, voids at zero.
    pub fn map() -> Self {
        Self {
            name: "Vm".to_string(),
            precision: 4,
            void_value: 0.0,
        }
    }
}

/// Write the grid to `w`, taking each node's value from `value`.
pub fn write_grid(
    w: &mut dyn Write,
    lattice: &Lattice,
    format: &GridFormat,
    value: impl Fn(NodeId) -> f64,
) -> io::Result<()> {
    let (rows, cols) = (lattice.rows(), lattice.cols());
    writeln!(w, "NAME {}", format.name)?;
    writeln!(w, "RANK 2")?;
    writeln!(w, "DIMENSIONS {cols} {rows}")?;
    writeln!(w, "BOUNDS 0 {} 0 {}", cols - 1, rows - 1)?;
    writeln!(w, "SCALAR")?;
    writeln!(w, "DATA")?;
    let p = format.precision;
    for row in 0..rows {
        for col in 0..cols {
            let x = lattice
                .node_at(row, col)
                .map_or(format.void_value, &value);
            write!(w, "{x:.p$} ")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Write per-node `values` to a new file at `path`.
pub fn write_grid_file(
    path: &Path,
    lattice: &Lattice,
    format: &GridFormat,
    values: &[f64],
) -> Result<(), OutputError> {
    if values.len() != lattice.node_count() {
        return Err(OutputError::LengthMismatch {
            expected: lattice.node_count(),
            found: values.len(),
        });
    }
    let file = File::create(path).map_err(OutputError::io(path))?;
    let mut w = BufWriter::new(file);
    write_grid(&mut w, lattice, format, |node| values[node.index()])
        .and_then(|()| w.flush())
        .map_err(OutputError::io(path))
}
