//! Shock detection ahead of the flux sweeps.

use rayon::prelude::*;

use corona_core::var::vel;
use corona_core::{Array3, ConfigError, Dir, VarVec, PRS};
use corona_grid::Grid;

/// Flags compressive cells with a strong pressure jump.
///
/// A cell is flagged when `div v < 0` and
///
/// ```text
/// sum_d |p(+1) - p(-1)| / min(p over the cell and its neighbours) > threshold
/// ```
///
/// over the active directions. Cells missing a neighbour along an active
/// direction are never flagged. The flag array is allocated once and
/// overwritten by every [`find_shocks`](Self::find_shocks).
#[derive(Clone, Debug)]
pub struct ShockDetector {
    threshold: f64,
    flags: Array3<bool>,
    flagged: usize,
}

impl ShockDetector {
    /// Threshold used when none is configured.
    pub const DEFAULT_THRESHOLD: f64 = 10.0;

    /// Detector for blocks shaped like `grid`.
    ///
    /// Returns `Err(ConfigError::InvalidThreshold)` unless `threshold` is
    /// finite and positive.
    pub fn new(grid: &Grid, threshold: f64) -> Result<Self, ConfigError> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold { value: threshold });
        }
        Ok(Self {
            threshold,
            flags: Array3::new(grid.shape(), false),
            flagged: 0,
        })
    }

    /// Configured threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Recompute every flag from the primitive field. Returns the number
    /// of flagged cells.
    pub fn find_shocks(&mut self, prim: &Array3<VarVec>, grid: &Grid) -> usize {
        let shape = grid.shape();
        debug_assert_eq!(prim.shape(), shape);
        let (nj, ni) = (shape[1], shape[2]);
        let dirs = grid.active_dirs();
        let threshold = self.threshold;

        self.flagged = self
            .flags
            .as_mut_slice()
            .par_chunks_mut(ni)
            .enumerate()
            .map(|(row, out)| {
                let (k, j) = (row / nj, row % nj);
                let mut count = 0;
                for (i, flag) in out.iter_mut().enumerate() {
                    *flag = is_shocked(prim, grid, &dirs, threshold, (k, j, i));
                    count += usize::from(*flag);
                }
                count
            })
            .sum();
        self.flagged
    }

    /// Flag of cell `(k, j, i)`.
    #[inline]
    pub fn is_flagged(&self, k: usize, j: usize, i: usize) -> bool {
        self.flags[(k, j, i)]
    }

    /// Whether the face on the lower side of `(k, j, i)` along `dir` touches
    /// a flagged cell.
    #[inline]
    pub fn face_flagged(&self, dir: Dir, k: usize, j: usize, i: usize) -> bool {
        if self.flags[(k, j, i)] {
            return true;
        }
        let (dk, dj, di) = dir.offset();
        let idx = [i, j, k][dir.index()];
        idx > 0 && self.flags[(k - dk, j - dj, i - di)]
    }

    /// Cells flagged by the last [`find_shocks`](Self::find_shocks).
    pub fn flagged(&self) -> usize {
        self.flagged
    }

    /// The flag array.
    pub fn flags(&self) -> &Array3<bool> {
        &self.flags
    }
}

fn is_shocked(
    prim: &Array3<VarVec>,
    grid: &Grid,
    dirs: &[Dir],
    threshold: f64,
    (k, j, i): (usize, usize, usize),
) -> bool {
    let p0 = prim[(k, j, i)][PRS];
    let mut divv = 0.0;
    let mut jump = 0.0;
    let mut pmin = p0;
    for &d in dirs {
        let idx = [i, j, k][d.index()];
        if idx == 0 || idx + 1 >= grid.n_tot(d) {
            return false;
        }
        let (dk, dj, di) = d.offset();
        let lo = &prim[(k - dk, j - dj, i - di)];
        let hi = &prim[(k + dk, j + dj, i + di)];
        divv += (hi[vel(d)] - lo[vel(d)]) / grid.dx(d);
        jump += (hi[PRS] - lo[PRS]).abs();
        pmin = pmin.min(lo[PRS]).min(hi[PRS]);
    }
    divv < 0.0 && jump > threshold * pmin
}

#[cfg(test)]
mod tests {
    use super::*;
    use corona_core::{NVAR, RHO, VX1};
    use corona_grid::GridSpec;

    fn grid() -> Grid {
        Grid::single(&GridSpec::new(1, [16, 1, 1])).unwrap()
    }

    fn field(grid: &Grid, f: impl Fn(usize) -> (f64, f64)) -> Array3<VarVec> {
        Array3::from_fn(grid.shape(), |_, _, i| {
            let (v, p) = f(i);
            let mut w = [0.0; NVAR];
            w[RHO] = 1.0;
            w[VX1] = v;
            w[PRS] = p;
            w
        })
    }

    #[test]
    fn rejects_bad_threshold() {
        assert_eq!(
            ShockDetector::new(&grid(), 0.0).err(),
            Some(ConfigError::InvalidThreshold { value: 0.0 })
        );
        assert!(ShockDetector::new(&grid(), f64::INFINITY).is_err());
    }

    #[test]
    fn flags_compressive_jump_only() {
        let g = grid();
        let mut det = ShockDetector::new(&g, 5.0).unwrap();
        // Converging flow into a strong pressure step at i = 10.
        let prim = field(&g, |i| if i < 10 { (1.0, 100.0) } else { (-1.0, 1.0) });
        let n = det.find_shocks(&prim, &g);
        assert_eq!(n, 2);
        assert!(det.is_flagged(0, 0, 9));
        assert!(det.is_flagged(0, 0, 10));
        assert!(det.face_flagged(Dir::X1, 0, 0, 11));
        assert!(!det.face_flagged(Dir::X1, 0, 0, 12));

        // Same jump, diverging flow.
        let prim = field(&g, |i| if i < 10 { (-1.0, 100.0) } else { (1.0, 1.0) });
        assert_eq!(det.find_shocks(&prim, &g), 0);
    }

    #[test]
    fn edge_cells_are_never_flagged() {
        let g = grid();
        let mut det = ShockDetector::new(&g, 1.0).unwrap();
        let last = g.n_tot(Dir::X1) - 1;
        let prim = field(&g, |i| {
            if i == 0 || i == last {
                (0.0, 1000.0)
            } else {
                (0.0, 1.0)
            }
        });
        det.find_shocks(&prim, &g);
        assert!(!det.is_flagged(0, 0, 0));
        assert!(!det.is_flagged(0, 0, last));
    }
}
