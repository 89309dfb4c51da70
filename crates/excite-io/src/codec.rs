//! Little-endian primitives for the checkpoint format.
//!
//! No compression, no alignment padding and no self-describing schema.

use std::io::{Read, Write};

use crate::error::CheckpointError;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), CheckpointError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), CheckpointError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), CheckpointError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), CheckpointError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write an optional f64 as a presence flag followed by the value.
pub fn write_opt_f64_le(w: &mut dyn Write, v: Option<f64>) -> Result<(), CheckpointError> {
    match v {
        Some(x) => {
            write_u8(w, 1)?;
            write_f64_le(w, x)
        }
        None => write_u8(w, 0),
    }
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, CheckpointError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, CheckpointError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, CheckpointError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, CheckpointError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Read a flag byte that must be 0 or 1.
pub fn read_bool(r: &mut dyn Read, what: &str) -> Result<bool, CheckpointError> {
    match read_u8(r)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CheckpointError::Malformed {
            detail: format!("{what} flag is {other}, expected 0 or 1"),
        }),
    }
}

/// Read an optional f64 written by [`write_opt_f64_le`].
pub fn read_opt_f64_le(r: &mut dyn Read, what: &str) -> Result<Option<f64>, CheckpointError> {
    if read_bool(r, what)? {
        Ok(Some(read_f64_le(r)?))
    } else {
        Ok(None)
    }
}
