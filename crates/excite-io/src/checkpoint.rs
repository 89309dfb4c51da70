//! Binary checkpoint encode/decode.
//!
//! States are written node by node, each as its 20 components in
//! [`Component`](excite_core::Component) order, so a round-trip is
//! lossless and a restored run continues bit-for-bit.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use excite_core::{StateVector, StepId, NUM_STATES};
use excite_engine::{BeatSnapshot, BeatTiming, Checkpoint, ProtocolSnapshot, StimulusState};

use crate::codec::*;
use crate::error::CheckpointError;
use crate::{FORMAT_VERSION, MAGIC};

/// Conventional file name for a checkpoint taken after `step` steps.
pub fn checkpoint_file_name(step: StepId) -> String {
    format!("checkpoint{:06}.out", step.0)
}

// ── Stimulus protocol ───────────────────────────────────────────

const TAG_IDLE: u8 = 0;
const TAG_S1_ACTIVE: u8 = 1;
const TAG_S2_ARMED: u8 = 2;
const TAG_S2_ACTIVE: u8 = 3;

fn encode_protocol(w: &mut dyn Write, p: &ProtocolSnapshot) -> Result<(), CheckpointError> {
    match p.state {
        StimulusState::Idle => write_u8(w, TAG_IDLE)?,
        StimulusState::S1Active { beat, until } => {
            write_u8(w, TAG_S1_ACTIVE)?;
            write_u32_le(w, beat)?;
            write_f64_le(w, until)?;
        }
        StimulusState::S2Armed { beat } => {
            write_u8(w, TAG_S2_ARMED)?;
            write_u32_le(w, beat)?;
        }
        StimulusState::S2Active { beat, until } => {
            write_u8(w, TAG_S2_ACTIVE)?;
            write_u32_le(w, beat)?;
            write_f64_le(w, until)?;
        }
    }
    write_u32_le(w, p.s1_delivered)?;
    write_u32_le(w, p.s2_delivered)
}

fn decode_protocol(r: &mut dyn Read) -> Result<ProtocolSnapshot, CheckpointError> {
    let state = match read_u8(r)? {
        TAG_IDLE => StimulusState::Idle,
        TAG_S1_ACTIVE => StimulusState::S1Active {
            beat: read_u32_le(r)?,
            until: read_f64_le(r)?,
        },
        TAG_S2_ARMED => StimulusState::S2Armed {
            beat: read_u32_le(r)?,
        },
        TAG_S2_ACTIVE => StimulusState::S2Active {
            beat: read_u32_le(r)?,
            until: read_f64_le(r)?,
        },
        tag => {
            return Err(CheckpointError::Malformed {
                detail: format!("unknown stimulus state tag {tag}"),
            })
        }
    };
    Ok(ProtocolSnapshot {
        state,
        s1_delivered: read_u32_le(r)?,
        s2_delivered: read_u32_le(r)?,
    })
}

// ── Checkpoint encode/decode ────────────────────────────────────

/// Encode `cp` to `w`.
pub fn encode_checkpoint(w: &mut dyn Write, cp: &Checkpoint) -> Result<(), CheckpointError> {
    let n = cp.states.len();
    if cp.previous_dv.len() != n || cp.beats.beat.len() != n {
        return Err(CheckpointError::Malformed {
            detail: format!(
                "{n} states but {} dV values and {} beat counters",
                cp.previous_dv.len(),
                cp.beats.beat.len()
            ),
        });
    }
    if cp.beats.timings.len() != n * cp.beats.max_beats as usize {
        return Err(CheckpointError::Malformed {
            detail: format!(
                "{} beat timings for {n} nodes of {} beats",
                cp.beats.timings.len(),
                cp.beats.max_beats
            ),
        });
    }
    let node_count = u32::try_from(n).map_err(|_| CheckpointError::Malformed {
        detail: format!("{n} nodes do not fit the format"),
    })?;

    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_u32_le(w, node_count)?;
    write_u32_le(w, NUM_STATES as u32)?;
    write_f64_le(w, cp.time)?;
    write_u64_le(w, cp.step.0)?;

    for state in &cp.states {
        for &x in state.as_array() {
            write_f64_le(w, x)?;
        }
    }
    for &dv in &cp.previous_dv {
        write_f64_le(w, dv)?;
    }
    write_u8(w, u8::from(cp.bootstrapped))?;
    encode_protocol(w, &cp.protocol)?;

    write_u32_le(w, cp.beats.max_beats)?;
    for &b in &cp.beats.beat {
        write_u32_le(w, b)?;
    }
    for t in &cp.beats.timings {
        write_opt_f64_le(w, t.upstroke)?;
        write_opt_f64_le(w, t.downstroke)?;
    }
    Ok(())
}

/// Decode a checkpoint from `r`, validating the header.
pub fn decode_checkpoint(r: &mut dyn Read) -> Result<Checkpoint, CheckpointError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(CheckpointError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(CheckpointError::UnsupportedVersion { found: version });
    }

    let n = read_u32_le(r)? as usize;
    let state_count = read_u32_le(r)? as usize;
    if state_count != NUM_STATES {
        return Err(CheckpointError::Malformed {
            detail: format!("{state_count} state variables per node, expected {NUM_STATES}"),
        });
    }
    let time = read_f64_le(r)?;
    let step = StepId(read_u64_le(r)?);

    // Counts come from the stream; grow as values arrive rather than
    // trusting them for allocation.
    let mut states = Vec::new();
    for _ in 0..n {
        let mut s = StateVector([0.0; NUM_STATES]);
        for x in s.0.iter_mut() {
            *x = read_f64_le(r)?;
        }
        states.push(s);
    }
    let mut previous_dv = Vec::new();
    for _ in 0..n {
        previous_dv.push(read_f64_le(r)?);
    }
    let bootstrapped = read_bool(r, "bootstrapped")?;
    let protocol = decode_protocol(r)?;

    let max_beats = read_u32_le(r)?;
    let mut beat = Vec::new();
    for _ in 0..n {
        beat.push(read_u32_le(r)?);
    }
    let mut timings = Vec::new();
    for _ in 0..n * max_beats as usize {
        timings.push(BeatTiming {
            upstroke: read_opt_f64_le(r, "upstroke")?,
            downstroke: read_opt_f64_le(r, "downstroke")?,
        });
    }

    Ok(Checkpoint {
        step,
        time,
        states,
        previous_dv,
        bootstrapped,
        protocol,
        beats: BeatSnapshot {
            max_beats,
            beat,
            timings,
        },
    })
}

// ── Files ───────────────────────────────────────────────────────

/// Write `cp` into `dir` under [`checkpoint_file_name`], returning the
/// path written.
pub fn write_checkpoint(dir: &Path, cp: &Checkpoint) -> Result<PathBuf, CheckpointError> {
    let path = dir.join(checkpoint_file_name(cp.step));
    let mut w = BufWriter::new(File::create(&path)?);
    encode_checkpoint(&mut w, cp)?;
    w.flush()?;
    tracing::info!(
        step = cp.step.0,
        time = cp.time,
        path = %path.display(),
        "checkpoint written"
    );
    Ok(path)
}

/// Read a checkpoint file.
pub fn read_checkpoint(path: &Path) -> Result<Checkpoint, CheckpointError> {
    let mut r = BufReader::new(File::open(path)?);
    let cp = decode_checkpoint(&mut r)?;
    tracing::info!(
        step = cp.step.0,
        nodes = cp.states.len(),
        path = %path.display(),
        "checkpoint read"
    );
    Ok(cp)
}
