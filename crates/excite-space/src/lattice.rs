//! The node arena laid over a rectangular grid.

use excite_core::{CellRegion, NodeId};
use smallvec::SmallVec;

use crate::compass::Compass;
use crate::error::SpaceError;

/// Neighbour table of one node, indexed by [`Compass::slot`].
///
/// `None` marks a grid edge or a void cell; stencils apply their no-flux
/// rule there.
pub type NeighbourTable = [Option<NodeId>; 8];

/// Conducting nodes of a 2D tissue sheet.
///
/// Cells whose diffusion coefficient does not exceed the void threshold
/// are not nodes at all. The remaining cells are numbered densely from
/// zero in row-major order, so `NodeId` is a direct index into every
/// per-node array.
#[derive(Clone, Debug)]
pub struct Lattice {
    rows: u32,
    cols: u32,
    grid: Vec<Option<NodeId>>,
    coords: Vec<(u32, u32)>,
    neighbours: Vec<NeighbourTable>,
    diffusion: Vec<f64>,
    regions: Vec<CellRegion>,
}

impl Lattice {
    /// Build a lattice from a row-major coefficient map.
    ///
    /// Returns `Err` if a dimension is zero, `coefficients` does not hold
    /// exactly `rows * cols` values, any value is non-finite, or no cell
    /// exceeds `void_threshold`.
    pub fn from_coefficients(
        rows: u32,
        cols: u32,
        coefficients: &[f64],
        void_threshold: f64,
    ) -> Result<Self, SpaceError> {
        if rows == 0 || cols == 0 {
            return Err(SpaceError::EmptyGrid);
        }
        let cells = rows as usize * cols as usize;
        if coefficients.len() != cells {
            return Err(SpaceError::DimensionMismatch {
                expected: cells,
                found: coefficients.len(),
            });
        }

        let mut grid = vec![None; cells];
        let mut coords = Vec::new();
        let mut diffusion = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                let cell = r as usize * cols as usize + c as usize;
                let d = coefficients[cell];
                if !d.is_finite() {
                    return Err(SpaceError::NonFiniteCoefficient { row: r, col: c });
                }
                if d > void_threshold {
                    grid[cell] = Some(NodeId(coords.len() as u32));
                    coords.push((r, c));
                    diffusion.push(d);
                }
            }
        }
        if coords.is_empty() {
            return Err(SpaceError::NoConductingCells);
        }

        let mut lattice = Self {
            rows,
            cols,
            grid,
            neighbours: Vec::with_capacity(coords.len()),
            regions: vec![CellRegion::default(); coords.len()],
            coords,
            diffusion,
        };
        lattice.neighbours = (0..lattice.coords.len())
            .map(|i| lattice.link(lattice.coords[i]))
            .collect();
        Ok(lattice)
    }

    /// A fully conducting `rows × cols` sheet with a single coefficient.
    pub fn uniform(rows: u32, cols: u32, coefficient: f64) -> Result<Self, SpaceError> {
        let cells = rows as usize * cols as usize;
        Self::from_coefficients(rows, cols, &vec![coefficient; cells], f64::NEG_INFINITY)
    }

    fn link(&self, (r, c): (u32, u32)) -> NeighbourTable {
        let mut table = [None; 8];
        for dir in Compass::ALL {
            let (dr, dc) = dir.offset();
            table[dir.slot()] = self.node_at_signed(r as i64 + dr, c as i64 + dc);
        }
        table
    }

    fn node_at_signed(&self, r: i64, c: i64) -> Option<NodeId> {
        if r < 0 || c < 0 || r >= self.rows as i64 || c >= self.cols as i64 {
            return None;
        }
        self.grid[r as usize * self.cols as usize + c as usize]
    }

    /// Number of grid rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of grid columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of conducting nodes.
    pub fn node_count(&self) -> usize {
        self.coords.len()
    }

    /// All node handles in index order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.coords.len() as u32).map(NodeId)
    }

    /// The node at `(row, col)`, or `None` for void cells and
    /// out-of-bounds coordinates.
    pub fn node_at(&self, row: u32, col: u32) -> Option<NodeId> {
        self.node_at_signed(row as i64, col as i64)
    }

    /// Grid coordinates of `node`.
    #[inline]
    pub fn coord(&self, node: NodeId) -> (u32, u32) {
        self.coords[node.index()]
    }

    /// The neighbour of `node` in direction `dir`.
    #[inline]
    pub fn neighbour(&self, node: NodeId, dir: Compass) -> Option<NodeId> {
        self.neighbours[node.index()][dir.slot()]
    }

    /// Full neighbour table of `node`.
    #[inline]
    pub fn neighbour_table(&self, node: NodeId) -> &NeighbourTable {
        &self.neighbours[node.index()]
    }

    /// Neighbours of `node` that exist, in compass order.
    pub fn neighbours(&self, node: NodeId) -> SmallVec<[NodeId; 8]> {
        self.neighbours[node.index()].iter().flatten().copied().collect()
    }

    /// Local diffusion coefficient of `node`.
    #[inline]
    pub fn diffusion(&self, node: NodeId) -> f64 {
        self.diffusion[node.index()]
    }

    /// Per-node diffusion coefficients in node order.
    pub fn diffusion_coefficients(&self) -> &[f64] {
        &self.diffusion
    }

    /// Largest diffusion coefficient on the lattice.
    pub fn max_diffusion(&self) -> f64 {
        self.diffusion.iter().copied().fold(0.0, f64::max)
    }

    /// Transmural region of `node`.
    #[inline]
    pub fn region(&self, node: NodeId) -> CellRegion {
        self.regions[node.index()]
    }

    /// Assign the region of the node at `(row, col)`.
    ///
    /// Void cells are ignored; out-of-bounds coordinates are an error.
    pub fn set_region(&mut self, row: u32, col: u32, region: CellRegion) -> Result<(), SpaceError> {
        if row >= self.rows || col >= self.cols {
            return Err(SpaceError::CoordOutOfBounds { row, col });
        }
        if let Some(n) = self.node_at(row, col) {
            self.regions[n.index()] = region;
        }
        Ok(())
    }

    /// Assign every node's region from its grid coordinates.
    pub fn assign_regions(&mut self, mut f: impl FnMut(u32, u32) -> CellRegion) {
        for (i, &(r, c)) in self.coords.iter().enumerate() {
            self.regions[i] = f(r, c);
        }
    }

    /// Nodes whose grid distance from `(row, col)` is at most `radius`.
    ///
    /// The centre need not be a node. Returned in node order.
    pub fn nodes_within(&self, row: u32, col: u32, radius: f64) -> Vec<NodeId> {
        let r2 = radius * radius;
        self.coords
            .iter()
            .enumerate()
            .filter(|(_, rc)| {
                let (r, c) = **rc;
                let dr = r as f64 - row as f64;
                let dc = c as f64 - col as f64;
                dr * dr + dc * dc <= r2
            })
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }
}
