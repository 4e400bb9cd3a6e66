//! Face-centered field update and diagnostics.

use rayon::prelude::*;

use corona_core::var::mag;
use corona_core::{Array3, Dir, VarVec};
use corona_grid::Grid;

use crate::emf::EdgeEmf;

/// Face-centered magnetic field, one array per axis.
///
/// `bs[d](k, j, i)` lives on the lower face of cell `(k, j, i)` along `d`.
/// Entries along inactive axes are not staggered and are left alone here.
pub type Staggered = [Array3<f64>; 3];

/// Index range of interior faces normal to `normal` along `d`.
fn face_range(grid: &Grid, normal: Dir, d: Dir) -> std::ops::Range<usize> {
    let extra = if d == normal { grid.face_offset(d) } else { 0 };
    grid.beg(d)..grid.end(d) + extra
}

#[inline]
fn step(p: (usize, usize, usize), d: Dir) -> (usize, usize, usize) {
    let (dk, dj, di) = d.offset();
    (p.0 + dk, p.1 + dj, p.2 + di)
}

/// `bs -= dt * curl E` on every interior face of every active axis.
///
/// Each face sees the same edge values as its neighbours, so the update
/// keeps the discrete divergence of every cell unchanged.
pub fn update_staggered(bs: &mut Staggered, edges: &EdgeEmf, grid: &Grid, dt: f64) {
    if grid.dims() < 2 {
        return;
    }
    for d in grid.active_dirs() {
        let (t1, t2) = d.transverse();
        let (e1, e2) = (edges.get(t1), edges.get(t2));
        let (a1, a2) = (grid.is_active(t1), grid.is_active(t2));
        let (dx1, dx2) = (grid.dx(t1), grid.dx(t2));
        let (rk, rj, ri) = (
            face_range(grid, d, Dir::X3),
            face_range(grid, d, Dir::X2),
            face_range(grid, d, Dir::X1),
        );
        let [_, nj, ni] = grid.shape();

        bs[d.index()]
            .as_mut_slice()
            .par_chunks_mut(ni)
            .enumerate()
            .filter(|(row, _)| rk.contains(&(row / nj)) && rj.contains(&(row % nj)))
            .for_each(|(row, line)| {
                let (k, j) = (row / nj, row % nj);
                for i in ri.clone() {
                    let p = (k, j, i);
                    let mut curl = 0.0;
                    if a1 {
                        curl += (e2[step(p, t1)] - e2[p]) / dx1;
                    }
                    if a2 {
                        curl -= (e1[step(p, t2)] - e1[p]) / dx2;
                    }
                    line[i] -= dt * curl;
                }
            });
    }
}

/// Discrete divergence of `bs` in every interior cell; zero elsewhere.
pub fn divergence(bs: &Staggered, grid: &Grid) -> Array3<f64> {
    let dirs = grid.active_dirs();
    let inside =
        |k, j, i| [i, j, k].iter().zip(Dir::ALL).all(|(&n, d)| (grid.beg(d)..grid.end(d)).contains(&n));
    Array3::from_fn(grid.shape(), |k, j, i| {
        if !inside(k, j, i) {
            return 0.0;
        }
        let p = (k, j, i);
        dirs.iter()
            .map(|&d| {
                let b = &bs[d.index()];
                (b[step(p, d)] - b[p]) / grid.dx(d)
            })
            .sum()
    })
}

/// Largest absolute divergence over the interior.
pub fn max_divergence(bs: &Staggered, grid: &Grid) -> f64 {
    divergence(bs, grid)
        .as_slice()
        .iter()
        .fold(0.0, |m, d| m.max(d.abs()))
}

/// Overwrite the cell-centered field of `prim` along every active axis
/// with the average of the two faces of each cell. The last layer along
/// an axis has no upper face and is left alone.
pub fn average_to_cells(bs: &Staggered, grid: &Grid, prim: &mut Array3<VarVec>) {
    let [nk, nj, ni] = grid.shape();
    let dirs = grid.active_dirs();
    prim.as_mut_slice()
        .par_chunks_mut(ni)
        .enumerate()
        .for_each(|(row, line)| {
            let (k, j) = (row / nj, row % nj);
            for (i, w) in line.iter_mut().enumerate() {
                let p = (k, j, i);
                for &d in &dirs {
                    let idx = [i, j, k][d.index()];
                    let n = [ni, nj, nk][d.index()];
                    if idx + 1 < n {
                        let b = &bs[d.index()];
                        w[mag(d)] = 0.5 * (b[p] + b[step(p, d)]);
                    }
                }
            }
        });
}
