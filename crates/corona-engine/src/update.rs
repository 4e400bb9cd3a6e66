//! Conservative update of the cell-centered state.

use rayon::prelude::*;

use corona_core::var::mag;
use corona_core::{Array3, Dir, VarVec, NVAR};
use corona_grid::Grid;

/// `u -= dt * div F` over the interior cells of `grid`.
///
/// `fluxes[n]` is the flux field of the `n`-th active direction. With
/// `ct_active` the magnetic components along the active (staggered) axes
/// are left to the constrained-transport update.
pub fn conservative_update(
    u: &mut Array3<VarVec>,
    fluxes: &[Array3<VarVec>],
    grid: &Grid,
    dt: f64,
    ct_active: bool,
) {
    let dirs = grid.active_dirs();
    debug_assert!(fluxes.len() >= dirs.len());
    let mut skip = [false; NVAR];
    if ct_active {
        for &d in &dirs {
            skip[mag(d)] = true;
        }
    }
    let [_, nj, ni] = grid.shape();
    let (ks, ke) = (grid.beg(Dir::X3), grid.end(Dir::X3));
    let (js, je) = (grid.beg(Dir::X2), grid.end(Dir::X2));
    let (is, ie) = (grid.beg(Dir::X1), grid.end(Dir::X1));

    u.as_mut_slice()
        .par_chunks_mut(ni)
        .enumerate()
        .filter(|(row, _)| (ks..ke).contains(&(row / nj)) && (js..je).contains(&(row % nj)))
        .for_each(|(row, line)| {
            let (k, j) = (row / nj, row % nj);
            for (i, cell) in line.iter_mut().enumerate().take(ie).skip(is) {
                for (n, &d) in dirs.iter().enumerate() {
                    let (dk, dj, di) = d.offset();
                    let lo = &fluxes[n][(k, j, i)];
                    let hi = &fluxes[n][(k + dk, j + dj, i + di)];
                    let scale = dt / grid.dx(d);
                    for v in 0..NVAR {
                        if !skip[v] {
                            cell[v] -= scale * (hi[v] - lo[v]);
                        }
                    }
                }
            }
        });
}
