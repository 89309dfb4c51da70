//! Error types for lattice construction and geometry loading.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors arising from lattice construction or coefficient-map parsing.
#[derive(Debug)]
pub enum SpaceError {
    /// Attempted to build a lattice with zero rows or columns.
    EmptyGrid,
    /// Every cell of the coefficient map fell below the void threshold.
    NoConductingCells,
    /// The coefficient map holds a different number of values than the grid.
    DimensionMismatch {
        /// `rows * cols`.
        expected: usize,
        /// Values actually supplied.
        found: usize,
    },
    /// A token in the coefficient map is not a number.
    InvalidToken {
        /// Zero-based position of the token in the map.
        position: usize,
        /// The offending text.
        token: String,
    },
    /// A coefficient is NaN or infinite.
    NonFiniteCoefficient {
        /// Grid row.
        row: u32,
        /// Grid column.
        col: u32,
    },
    /// A grid coordinate is outside the lattice.
    CoordOutOfBounds {
        /// Requested row.
        row: u32,
        /// Requested column.
        col: u32,
    },
    /// Reading the coefficient map failed.
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "lattice must have at least one row and column"),
            Self::NoConductingCells => write!(f, "coefficient map has no conducting cells"),
            Self::DimensionMismatch { expected, found } => {
                write!(f, "coefficient map holds {found} values, expected {expected}")
            }
            Self::InvalidToken { position, token } => {
                write!(f, "invalid coefficient '{token}' at position {position}")
            }
            Self::NonFiniteCoefficient { row, col } => {
                write!(f, "non-finite coefficient at ({row}, {col})")
            }
            Self::CoordOutOfBounds { row, col } => {
                write!(f, "coordinate ({row}, {col}) out of bounds")
            }
            Self::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
        }
    }
}

impl Error for SpaceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
