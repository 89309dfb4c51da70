//! Compass directions of the 8-connected neighbourhood.

/// One of the eight neighbour slots of a node.
///
/// Rows grow southwards and columns grow eastwards. The discriminant is
/// the slot index in a node's neighbour table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Compass {
    /// Row − 1, column − 1.
    NorthWest = 0,
    /// Row − 1.
    North,
    /// Row − 1, column + 1.
    NorthEast,
    /// Column + 1.
    East,
    /// Row + 1, column + 1.
    SouthEast,
    /// Row + 1.
    South,
    /// Row + 1, column − 1.
    SouthWest,
    /// Column − 1.
    West,
}

impl Compass {
    /// All directions in slot order.
    pub const ALL: [Compass; 8] = [
        Compass::NorthWest,
        Compass::North,
        Compass::NorthEast,
        Compass::East,
        Compass::SouthEast,
        Compass::South,
        Compass::SouthWest,
        Compass::West,
    ];

    /// The four directions used by the diffusion stencils.
    pub const CARDINALS: [Compass; 4] = [
        Compass::North,
        Compass::East,
        Compass::South,
        Compass::West,
    ];

    /// Slot index in a neighbour table.
    #[inline]
    pub fn slot(self) -> usize {
        self as usize
    }

    /// `(d_row, d_col)` grid offset.
    pub fn offset(self) -> (i64, i64) {
        match self {
            Self::NorthWest => (-1, -1),
            Self::North => (-1, 0),
            Self::NorthEast => (-1, 1),
            Self::East => (0, 1),
            Self::SouthEast => (1, 1),
            Self::South => (1, 0),
            Self::SouthWest => (1, -1),
            Self::West => (0, -1),
        }
    }

    /// The direction pointing the other way.
    pub fn opposite(self) -> Self {
        Self::ALL[(self.slot() + 4) % 8]
    }
}
