//! Cell-type variants.
//!
//! Every node is either an excitable myocyte of a given transmural
//! region or passive tissue that only conducts. The region selects
//! the transient-outward and slow-rectifier parameters of the ionic
//! model; the scheduler never branches on it.

use std::fmt;

/// Transmural region of a ventricular myocyte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellRegion {
    /// Outer wall.
    #[default]
    Epicardial,
    /// Inner wall.
    Endocardial,
    /// Mid-myocardial (M) cells.
    MidMyocardial,
}

impl CellRegion {
    /// All regions, in lookup-table order.
    pub const ALL: [CellRegion; 3] = [
        CellRegion::Epicardial,
        CellRegion::Endocardial,
        CellRegion::MidMyocardial,
    ];
}

impl fmt::Display for CellRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epicardial => write!(f, "epicardial"),
            Self::Endocardial => write!(f, "endocardial"),
            Self::MidMyocardial => write!(f, "mid-myocardial"),
        }
    }
}

/// What kind of tissue a node represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellType {
    /// Excitable ventricular myocyte.
    Myocyte(CellRegion),
    /// Non-excitable tissue: voltage changes only through diffusion.
    Passive,
}

impl CellType {
    /// Whether the reaction stage advances this node.
    #[inline]
    pub fn is_excitable(self) -> bool {
        matches!(self, Self::Myocyte(_))
    }

    /// The myocyte region, if excitable.
    #[inline]
    pub fn region(self) -> Option<CellRegion> {
        match self {
            Self::Myocyte(r) => Some(r),
            Self::Passive => None,
        }
    }
}

impl Default for CellType {
    fn default() -> Self {
        Self::Myocyte(CellRegion::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn myocytes_are_excitable() {
        for r in CellRegion::ALL {
            assert!(CellType::Myocyte(r).is_excitable());
            assert_eq!(CellType::Myocyte(r).region(), Some(r));
        }
        assert!(!CellType::Passive.is_excitable());
        assert_eq!(CellType::Passive.region(), None);
    }

    #[test]
    fn default_is_epicardial_myocyte() {
        assert_eq!(CellType::default(), CellType::Myocyte(CellRegion::Epicardial));
    }
}
