//! Uniform Cartesian blocks with ghost zones.

use corona_core::Dir;
use smallvec::SmallVec;

use crate::error::GridError;
use crate::topology::CartTopology;

/// Description of the global domain.
#[derive(Clone, Debug, PartialEq)]
pub struct GridSpec {
    /// Number of active axes (1..=3). Axes beyond `dims` are collapsed.
    pub dims: usize,
    /// Global interior cells per axis, indexed by [`Dir::index`].
    pub cells: [usize; 3],
    /// Lower domain bound per axis.
    pub lower: [f64; 3],
    /// Upper domain bound per axis.
    pub upper: [f64; 3],
    /// Ghost layers on every active axis.
    pub nghost: usize,
}

impl GridSpec {
    /// A unit box with two ghost layers. Inactive axes get one cell.
    pub fn new(dims: usize, cells: [usize; 3]) -> Self {
        let mut cells = cells;
        for c in cells.iter_mut().skip(dims.min(3)) {
            *c = 1;
        }
        Self {
            dims,
            cells,
            lower: [0.0; 3],
            upper: [1.0; 3],
            nghost: 2,
        }
    }

    /// Set the domain bounds.
    pub fn with_bounds(mut self, lower: [f64; 3], upper: [f64; 3]) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// Set the ghost width.
    pub fn with_ghosts(mut self, nghost: usize) -> Self {
        self.nghost = nghost;
        self
    }

    fn validate(&self, topo: &CartTopology) -> Result<(), GridError> {
        if self.dims == 0 || self.dims > 3 {
            return Err(GridError::InvalidDims { dims: self.dims });
        }
        for d in Dir::ALL {
            let n = d.index();
            let active = n < self.dims;
            if active && (self.cells[n] == 0 || topo.ranks(d) == 0) {
                return Err(GridError::EmptyAxis { dir: d });
            }
            if !active && (self.cells[n] != 1 || topo.ranks(d) != 1) {
                return Err(GridError::InactiveAxis { dir: d });
            }
            let (lo, hi) = (self.lower[n], self.upper[n]);
            if !lo.is_finite() || !hi.is_finite() || hi <= lo {
                return Err(GridError::InvalidExtent { dir: d });
            }
            if active {
                let smallest = self.cells[n] / topo.ranks(d);
                if smallest < self.nghost.max(1) {
                    return Err(GridError::BlockTooSmall {
                        dir: d,
                        cells: smallest,
                        nghost: self.nghost,
                    });
                }
            }
        }
        Ok(())
    }
}

/// The block of cells owned by one rank, ghost zones included.
///
/// # Examples
///
/// ```
/// use corona_core::Dir;
/// use corona_grid::{Grid, GridSpec};
///
/// let grid = Grid::single(&GridSpec::new(2, [16, 8, 1])).unwrap();
/// assert_eq!(grid.n_tot(Dir::X1), 20);
/// assert_eq!(grid.n_tot(Dir::X3), 1);
/// assert_eq!(grid.shape(), [1, 12, 20]);
/// assert_eq!(grid.beg(Dir::X2), 2);
/// assert_eq!(grid.end(Dir::X2), 10);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    dims: usize,
    n_int: [usize; 3],
    nghost: [usize; 3],
    dx: [f64; 3],
    /// Lower corner of the whole domain.
    origin: [f64; 3],
    offset: [usize; 3],
}

impl Grid {
    /// The whole domain on one rank.
    pub fn single(spec: &GridSpec) -> Result<Self, GridError> {
        Self::block(spec, &CartTopology::single(), 0)
    }

    /// The block owned by `rank` under `topo`.
    ///
    /// Cells are split as evenly as possible; the first `cells % ranks`
    /// ranks along an axis receive one extra cell.
    pub fn block(spec: &GridSpec, topo: &CartTopology, rank: usize) -> Result<Self, GridError> {
        topo.check_rank(rank)?;
        spec.validate(topo)?;
        let coords = topo.coords(rank);
        let mut n_int = [1; 3];
        let mut nghost = [0; 3];
        let mut dx = [0.0; 3];
        let mut offset = [0; 3];
        for d in Dir::ALL {
            let n = d.index();
            dx[n] = (spec.upper[n] - spec.lower[n]) / spec.cells[n] as f64;
            let p = topo.ranks(d);
            let base = spec.cells[n] / p;
            let rem = spec.cells[n] % p;
            let c = coords[n];
            n_int[n] = base + usize::from(c < rem);
            offset[n] = c * base + c.min(rem);
            if n < spec.dims {
                nghost[n] = spec.nghost;
            }
        }
        Ok(Self {
            dims: spec.dims,
            n_int,
            nghost,
            dx,
            origin: spec.lower,
            offset,
        })
    }

    /// Number of active axes.
    #[inline]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Active axes in sweep order.
    pub fn active_dirs(&self) -> SmallVec<[Dir; 3]> {
        Dir::active(self.dims)
    }

    /// `true` if `dir` is one of the active axes.
    #[inline]
    pub fn is_active(&self, dir: Dir) -> bool {
        dir.index() < self.dims
    }

    /// Interior cells along `dir`.
    #[inline]
    pub fn n_int(&self, dir: Dir) -> usize {
        self.n_int[dir.index()]
    }

    /// Ghost layers along `dir` (zero on inactive axes).
    #[inline]
    pub fn nghost(&self, dir: Dir) -> usize {
        self.nghost[dir.index()]
    }

    /// Total cells along `dir`, ghosts included.
    #[inline]
    pub fn n_tot(&self, dir: Dir) -> usize {
        self.n_int(dir) + 2 * self.nghost(dir)
    }

    /// First interior index along `dir`.
    #[inline]
    pub fn beg(&self, dir: Dir) -> usize {
        self.nghost(dir)
    }

    /// One past the last interior index along `dir`.
    #[inline]
    pub fn end(&self, dir: Dir) -> usize {
        self.nghost(dir) + self.n_int(dir)
    }

    /// `1` on active axes, `0` otherwise. Face and edge loops extend
    /// their upper bound by this amount.
    #[inline]
    pub fn face_offset(&self, dir: Dir) -> usize {
        usize::from(self.is_active(dir))
    }

    /// Array shape `[nk, nj, ni]` of a cell-centered field.
    pub fn shape(&self) -> [usize; 3] {
        [self.n_tot(Dir::X3), self.n_tot(Dir::X2), self.n_tot(Dir::X1)]
    }

    /// Interior cell count.
    pub fn interior_cells(&self) -> usize {
        self.n_int.iter().product()
    }

    /// Cell width along `dir`.
    #[inline]
    pub fn dx(&self, dir: Dir) -> f64 {
        self.dx[dir.index()]
    }

    /// Global index of this block's first interior cell along `dir`.
    #[inline]
    pub fn offset(&self, dir: Dir) -> usize {
        self.offset[dir.index()]
    }

    /// Coordinate of the center of local cell `idx` along `dir`.
    ///
    /// Computed from the global index, so every block of a decomposition
    /// returns the same bits for the same cell.
    pub fn center(&self, dir: Dir, idx: usize) -> f64 {
        let n = dir.index();
        self.origin[n] + (self.global_index(dir, idx) as f64 + 0.5) * self.dx[n]
    }

    /// Coordinate of the lower face of local cell `idx` along `dir`.
    pub fn face(&self, dir: Dir, idx: usize) -> f64 {
        let n = dir.index();
        self.origin[n] + self.global_index(dir, idx) as f64 * self.dx[n]
    }

    /// Global cell index of local index `idx` along `dir`, possibly negative
    /// or past the domain inside the ghost zones.
    pub fn global_index(&self, dir: Dir, idx: usize) -> isize {
        idx as isize - self.nghost(dir) as isize + self.offset(dir) as isize
    }
}
