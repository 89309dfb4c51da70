//! Error types for checkpoint and output I/O.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors reading or writing checkpoints.
#[derive(Debug)]
pub enum CheckpointError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The stream does not start with `b"EXCK"`.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the stream.
        found: u8,
    },
    /// The payload is inconsistent (bad counts, flags or tags).
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"EXCK\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported checkpoint version {found}")
            }
            Self::Malformed { detail } => write!(f, "malformed checkpoint: {detail}"),
        }
    }
}

impl std::error::Error for CheckpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CheckpointError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Errors from the snapshot, electrogram and map writers.
#[derive(Debug)]
pub enum OutputError {
    /// Creating or writing `path` failed.
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// A per-node buffer does not match the lattice.
    LengthMismatch {
        /// Nodes in the lattice.
        expected: usize,
        /// Values supplied.
        found: usize,
    },
    /// A monitored site is not a tissue node.
    UnknownSite {
        /// Site row.
        row: u32,
        /// Site column.
        col: u32,
    },
    /// An output interval is not positive and finite.
    InvalidInterval {
        /// Which interval.
        name: &'static str,
        /// The rejected value (ms).
        value: f64,
    },
}

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::LengthMismatch { expected, found } => {
                write!(f, "expected {expected} node values, got {found}")
            }
            Self::UnknownSite { row, col } => {
                write!(f, "monitored site ({row}, {col}) is not a tissue node")
            }
            Self::InvalidInterval { name, value } => {
                write!(f, "{name} must be positive, got {value}")
            }
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
