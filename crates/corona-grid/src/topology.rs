//! Cartesian arrangement of ranks.

use corona_core::{Dir, Face};

use crate::boundary::Boundary;
use crate::error::GridError;

/// A Cartesian grid of ranks with per-axis boundary behavior.
///
/// Ranks are numbered with the X1 coordinate varying fastest.
///
/// # Examples
///
/// ```
/// use corona_core::{Dir, Face};
/// use corona_grid::{Boundary, CartTopology};
///
/// let topo = CartTopology::new([2, 2, 1], [Boundary::Periodic, Boundary::Open, Boundary::Periodic]).unwrap();
/// assert_eq!(topo.size(), 4);
/// assert_eq!(topo.neighbour(0, Dir::X1, Face::Left), Some(1));
/// assert_eq!(topo.neighbour(0, Dir::X2, Face::Left), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartTopology {
    ranks: [usize; 3],
    boundary: [Boundary; 3],
}

impl CartTopology {
    /// Create a topology with `ranks[d]` ranks along axis `d`.
    ///
    /// Returns `Err(GridError::EmptyAxis)` if any axis has zero ranks.
    pub fn new(ranks: [usize; 3], boundary: [Boundary; 3]) -> Result<Self, GridError> {
        for d in Dir::ALL {
            if ranks[d.index()] == 0 {
                return Err(GridError::EmptyAxis { dir: d });
            }
        }
        Ok(Self { ranks, boundary })
    }

    /// A single rank, periodic on every axis.
    pub fn single() -> Self {
        Self {
            ranks: [1, 1, 1],
            boundary: [Boundary::Periodic; 3],
        }
    }

    /// Total number of ranks.
    pub fn size(&self) -> usize {
        self.ranks.iter().product()
    }

    /// Number of ranks along `dir`.
    pub fn ranks(&self, dir: Dir) -> usize {
        self.ranks[dir.index()]
    }

    /// Boundary behavior along `dir`.
    pub fn boundary(&self, dir: Dir) -> Boundary {
        self.boundary[dir.index()]
    }

    /// Cartesian coordinates of `rank`.
    pub fn coords(&self, rank: usize) -> [usize; 3] {
        let c1 = rank % self.ranks[0];
        let rest = rank / self.ranks[0];
        [c1, rest % self.ranks[1], rest / self.ranks[1]]
    }

    /// Rank at the given coordinates.
    pub fn rank_of(&self, coords: [usize; 3]) -> usize {
        (coords[2] * self.ranks[1] + coords[1]) * self.ranks[0] + coords[0]
    }

    /// Rank behind `face` of `rank` along `dir`, or `None` at an open edge.
    ///
    /// With a single periodic rank along `dir` the neighbour is `rank` itself.
    pub fn neighbour(&self, rank: usize, dir: Dir, face: Face) -> Option<usize> {
        let mut c = self.coords(rank);
        let d = dir.index();
        let shifted = c[d] as isize + face.shift();
        c[d] = self.boundary[d].resolve(shifted, self.ranks[d])?;
        Some(self.rank_of(c))
    }

    /// Validate that `rank` exists.
    pub fn check_rank(&self, rank: usize) -> Result<(), GridError> {
        if rank < self.size() {
            Ok(())
        } else {
            Err(GridError::RankOutOfRange {
                rank,
                size: self.size(),
            })
        }
    }
}
