//! Error types for grid and topology construction.

use corona_core::Dir;
use std::fmt;

/// Errors arising from block or topology construction.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Dimensionality must be 1, 2 or 3.
    InvalidDims {
        /// The rejected dimensionality.
        dims: usize,
    },
    /// An active axis has zero cells or zero ranks.
    EmptyAxis {
        /// The offending axis.
        dir: Dir,
    },
    /// An inactive axis must have exactly one cell and one rank.
    InactiveAxis {
        /// The offending axis.
        dir: Dir,
    },
    /// Domain bounds along an axis are not finite and increasing.
    InvalidExtent {
        /// The offending axis.
        dir: Dir,
    },
    /// A rank would own fewer interior cells than the ghost width.
    BlockTooSmall {
        /// The offending axis.
        dir: Dir,
        /// Interior cells on the smallest block.
        cells: usize,
        /// Required ghost width.
        nghost: usize,
    },
    /// Rank index outside the topology.
    RankOutOfRange {
        /// The requested rank.
        rank: usize,
        /// Number of ranks in the topology.
        size: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDims { dims } => write!(f, "dimensionality must be 1..=3, got {dims}"),
            Self::EmptyAxis { dir } => write!(f, "axis {dir} has no cells or no ranks"),
            Self::InactiveAxis { dir } => {
                write!(f, "inactive axis {dir} must have one cell and one rank")
            }
            Self::InvalidExtent { dir } => {
                write!(f, "axis {dir} bounds must be finite and increasing")
            }
            Self::BlockTooSmall { dir, cells, nghost } => write!(
                f,
                "axis {dir}: block of {cells} cells is smaller than ghost width {nghost}"
            ),
            Self::RankOutOfRange { rank, size } => {
                write!(f, "rank {rank} out of range for {size} ranks")
            }
        }
    }
}

impl std::error::Error for GridError {}
