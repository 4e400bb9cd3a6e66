//! Domain boundary behavior along one axis.

/// How the rank topology treats the outer edges of the domain.
///
/// This only controls which rank sits behind a block face. Filling ghost
/// zones at a physical boundary is the job of the boundary-condition
/// collaborator.
///
/// # Examples
///
/// ```
/// use corona_grid::Boundary;
///
/// assert_eq!(Boundary::Periodic.resolve(-1, 4), Some(3));
/// assert_eq!(Boundary::Open.resolve(-1, 4), None);
/// assert_eq!(Boundary::Open.resolve(2, 4), Some(2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Boundary {
    /// The last rank along the axis neighbours the first (torus).
    #[default]
    Periodic,
    /// Ranks on the outer edge have no neighbour behind that face.
    Open,
}

impl Boundary {
    /// Resolve a rank coordinate that may have stepped off the axis.
    ///
    /// Returns `None` when the coordinate leaves an open axis.
    pub fn resolve(self, coord: isize, len: usize) -> Option<usize> {
        let len = len as isize;
        if coord >= 0 && coord < len {
            return Some(coord as usize);
        }
        match self {
            Boundary::Open => None,
            Boundary::Periodic => Some((((coord % len) + len) % len) as usize),
        }
    }
}
