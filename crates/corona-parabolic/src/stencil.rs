//! Face-centered averages and gradients of cell-centered fields.

use rayon::prelude::*;

use corona_core::{Array3, Dir, VarVec, NVAR};
use corona_grid::Grid;

/// Run `kernel` on every in-range face normal to `dir`, one `(k, j)` row
/// per rayon task.
///
/// The kernel receives the face flux and the `dMax` entry of the cell
/// above the face, which share the face's index.
pub(crate) fn par_faces<K>(
    prim: &Array3<VarVec>,
    grid: &Grid,
    dir: Dir,
    flux: &mut Array3<VarVec>,
    dmax: &mut Array3<f64>,
    kernel: K,
) where
    K: Fn(&FaceStencil<'_>, (usize, usize, usize), &mut VarVec, &mut f64) + Sync,
{
    let shape = grid.shape();
    debug_assert_eq!(flux.shape(), shape);
    debug_assert_eq!(dmax.shape(), shape);
    let (nj, ni) = (shape[1], shape[2]);
    let stencil = FaceStencil::new(prim, grid, dir);
    flux.as_mut_slice()
        .par_chunks_mut(ni)
        .zip(dmax.as_mut_slice().par_chunks_mut(ni))
        .enumerate()
        .for_each(|(row, (f, d))| {
            let (k, j) = (row / nj, row % nj);
            for i in 0..ni {
                if stencil.in_range(k, j, i) {
                    kernel(&stencil, (k, j, i), &mut f[i], &mut d[i]);
                }
            }
        });
}

/// Geometry of the faces normal to one direction.
///
/// The face `(k, j, i)` lies between the cell `(k, j, i)` above it and
/// the cell one step lower along `dir`.
pub(crate) struct FaceStencil<'a> {
    prim: &'a Array3<VarVec>,
    grid: &'a Grid,
    dir: Dir,
}

impl<'a> FaceStencil<'a> {
    pub(crate) fn new(prim: &'a Array3<VarVec>, grid: &'a Grid, dir: Dir) -> Self {
        Self { prim, grid, dir }
    }

    /// Whether every value the stencil needs at this face exists: a cell
    /// below along `dir` and both transverse neighbours of the two cells.
    pub(crate) fn in_range(&self, k: usize, j: usize, i: usize) -> bool {
        let idx = [i, j, k];
        if idx[self.dir.index()] == 0 {
            return false;
        }
        let (t1, t2) = self.dir.transverse();
        [t1, t2].into_iter().all(|t| {
            let n = idx[t.index()];
            !self.grid.is_active(t) || (n >= 1 && n + 1 < self.grid.n_tot(t))
        })
    }

    fn lower(&self, k: usize, j: usize, i: usize) -> (usize, usize, usize) {
        let (dk, dj, di) = self.dir.offset();
        (k - dk, j - dj, i - di)
    }

    /// Arithmetic mean of the two cells.
    pub(crate) fn average(&self, k: usize, j: usize, i: usize) -> VarVec {
        let hi = &self.prim[(k, j, i)];
        let lo = &self.prim[self.lower(k, j, i)];
        let mut w = [0.0; NVAR];
        for n in 0..NVAR {
            w[n] = 0.5 * (hi[n] + lo[n]);
        }
        w
    }

    /// Derivative of variable `slot` along `along` at the face. Zero along
    /// inactive axes.
    pub(crate) fn gradient(&self, k: usize, j: usize, i: usize, slot: usize, along: Dir) -> f64 {
        if !self.grid.is_active(along) {
            return 0.0;
        }
        let (kl, jl, il) = self.lower(k, j, i);
        if along == self.dir {
            return (self.prim[(k, j, i)][slot] - self.prim[(kl, jl, il)][slot]) / self.grid.dx(along);
        }
        let (dk, dj, di) = along.offset();
        let centered = |k: usize, j: usize, i: usize| {
            self.prim[(k + dk, j + dj, i + di)][slot] - self.prim[(k - dk, j - dj, i - di)][slot]
        };
        0.25 * (centered(k, j, i) + centered(kl, jl, il)) / self.grid.dx(along)
    }

    /// Position of the face center.
    pub(crate) fn position(&self, k: usize, j: usize, i: usize) -> [f64; 3] {
        let idx = [i, j, k];
        let mut x = [0.0; 3];
        for d in Dir::ALL {
            let n = d.index();
            x[n] = if d == self.dir {
                self.grid.face(d, idx[n])
            } else {
                self.grid.center(d, idx[n])
            };
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corona_core::{RHO, VX1};
    use corona_grid::GridSpec;

    #[test]
    fn gradients_of_linear_field_are_exact() {
        let g = Grid::single(&GridSpec::new(2, [8, 8, 1])).unwrap();
        let prim = Array3::from_fn(g.shape(), |_, j, i| {
            let mut w = [0.0; NVAR];
            w[RHO] = 3.0 * g.center(Dir::X1, i) - 2.0 * g.center(Dir::X2, j);
            w[VX1] = 1.0;
            w
        });
        let st = FaceStencil::new(&prim, &g, Dir::X1);
        assert!(st.in_range(0, 4, 4));
        assert!(!st.in_range(0, 0, 4));
        assert!(!st.in_range(0, 4, 0));
        assert!((st.gradient(0, 4, 4, RHO, Dir::X1) - 3.0).abs() < 1e-12);
        assert!((st.gradient(0, 4, 4, RHO, Dir::X2) + 2.0).abs() < 1e-12);
        assert_eq!(st.gradient(0, 4, 4, RHO, Dir::X3), 0.0);
        let x = st.position(0, 4, 4);
        assert!((x[0] - g.face(Dir::X1, 4)).abs() < 1e-15);
        let avg = st.average(0, 4, 4);
        assert!((avg[RHO] - (3.0 * x[0] - 2.0 * x[1])).abs() < 1e-12);
    }
}
