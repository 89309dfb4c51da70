//! Voltage traces at monitored sites.

use std::io::{self, Write};

use excite_core::{NodeId, StateVector};
use excite_space::Lattice;

use crate::error::OutputError;

/// Appends one line of site voltages per call to [`record`](Self::record).
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
pub struct ElectrogramWriter<W: Write> {
    writer: W,
    sites: Vec<NodeId>,
    lines: u64,
}

impl<W: Write> ElectrogramWriter<W> {
    /// Resolve `sites` (grid `(row, col)` pairs) against `lattice`.
    pub fn new(writer: W, lattice: &Lattice, sites: &[(u32, u32)]) -> Result<Self, OutputError> {
        let sites = sites
            .iter()
            .map(|&(row, col)| {
                lattice
                    .node_at(row, col)
                    .ok_or(OutputError::UnknownSite { row, col })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            writer,
            sites,
            lines: 0,
        })
    }

    /// Monitored nodes in column order.
    pub fn sites(&self) -> &[NodeId] {
        &self.sites
    }

    /// Lines written so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Write the current voltage at every site.
    pub fn record(&mut self, states: &[StateVector]) -> io::Result<()> {
        let mut line = String::new();
        for (i, node) in self.sites.iter().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            line.push_str(&format!("{:.2}", states[node.index()].voltage()));
        }
        writeln!(self.writer, "{line}")?;
        self.lines += 1;
        Ok(())
    }

    /// Flush buffered lines.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_sites_in_order() {
        let lattice = Lattice::uniform(3, 3, 0.2).unwrap();
        let mut states = vec![StateVector::resting(); 9];
        states[8].set_voltage(21.456);
        let mut eg = ElectrogramWriter::new(Vec::new(), &lattice, &[(2, 2), (0, 0)]).unwrap();
        eg.record(&states).unwrap();
        eg.record(&states).unwrap();
        assert_eq!(eg.lines(), 2);
        let text = String::from_utf8(eg.into_inner()).unwrap();
        assert_eq!(text, "21.46 -85.23\n21.46 -85.23\n");
    }

    #[test]
    fn void_site_rejected() {
        let lattice = Lattice::from_coefficients(1, 2, &[0.2, 0.0], 0.025).unwrap();
        assert!(matches!(
            ElectrogramWriter::new(Vec::new(), &lattice, &[(0, 1)]),
            Err(OutputError::UnknownSite { row: 0, col: 1 })
        ));
    }
}
