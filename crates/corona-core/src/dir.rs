//! Sweep directions and block faces.

use smallvec::SmallVec;
use std::fmt;

/// A grid axis. Also used as the sweep direction of a flux computation.
///
/// Storage order is `(k, j, i)`, so `X1` is the fastest-varying axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dir {
    /// First axis (`i` index, `x`).
    X1,
    /// Second axis (`j` index, `y`).
    X2,
    /// Third axis (`k` index, `z`).
    X3,
}

impl Dir {
    /// All three axes in sweep order.
    pub const ALL: [Dir; 3] = [Dir::X1, Dir::X2, Dir::X3];

    /// Zero-based axis number (`X1 -> 0`).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Dir::X1 => 0,
            Dir::X2 => 1,
            Dir::X3 => 2,
        }
    }

    /// Inverse of [`index`](Self::index). Returns `None` above 2.
    pub fn from_index(index: usize) -> Option<Dir> {
        match index {
            0 => Some(Dir::X1),
            1 => Some(Dir::X2),
            2 => Some(Dir::X3),
            _ => None,
        }
    }

    /// The two transverse axes, in cyclic order `(t1, t2)` so that
    /// `(self, t1, t2)` is right-handed.
    #[inline]
    pub fn transverse(self) -> (Dir, Dir) {
        match self {
            Dir::X1 => (Dir::X2, Dir::X3),
            Dir::X2 => (Dir::X3, Dir::X1),
            Dir::X3 => (Dir::X1, Dir::X2),
        }
    }

    /// Unit offset `(dk, dj, di)` of one step along this axis.
    #[inline]
    pub fn offset(self) -> (usize, usize, usize) {
        match self {
            Dir::X1 => (0, 0, 1),
            Dir::X2 => (0, 1, 0),
            Dir::X3 => (1, 0, 0),
        }
    }

    /// The first `dims` axes.
    pub fn active(dims: usize) -> SmallVec<[Dir; 3]> {
        Dir::ALL.iter().copied().take(dims.min(3)).collect()
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dir::X1 => write!(f, "X1"),
            Dir::X2 => write!(f, "X2"),
            Dir::X3 => write!(f, "X3"),
        }
    }
}

/// One of the two faces of a block along an axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    /// The lower-index face.
    Left,
    /// The upper-index face.
    Right,
}

impl Face {
    /// Both faces, left first.
    pub const BOTH: [Face; 2] = [Face::Left, Face::Right];

    /// The face on the other side of the block.
    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::Left => Face::Right,
            Face::Right => Face::Left,
        }
    }

    /// `0` for left, `1` for right.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Face::Left => 0,
            Face::Right => 1,
        }
    }

    /// Rank-coordinate shift towards the neighbour behind this face.
    #[inline]
    pub fn shift(self) -> isize {
        match self {
            Face::Left => -1,
            Face::Right => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transverse_is_cyclic() {
        assert_eq!(Dir::X1.transverse(), (Dir::X2, Dir::X3));
        assert_eq!(Dir::X2.transverse(), (Dir::X3, Dir::X1));
        assert_eq!(Dir::X3.transverse(), (Dir::X1, Dir::X2));
    }

    #[test]
    fn index_round_trips() {
        for d in Dir::ALL {
            assert_eq!(Dir::from_index(d.index()), Some(d));
        }
        assert_eq!(Dir::from_index(3), None);
    }

    #[test]
    fn active_dirs_truncate() {
        assert_eq!(Dir::active(1).as_slice(), &[Dir::X1]);
        assert_eq!(Dir::active(2).as_slice(), &[Dir::X1, Dir::X2]);
        assert_eq!(Dir::active(7).len(), 3);
    }

    #[test]
    fn face_opposite() {
        assert_eq!(Face::Left.opposite(), Face::Right);
        assert_eq!(Face::Right.opposite(), Face::Left);
        assert_eq!(Face::Left.shift(), -1);
    }
}
