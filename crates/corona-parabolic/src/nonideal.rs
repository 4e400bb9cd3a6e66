//! Resistive and ambipolar electromotive terms.
//!
//! With `E` the non-ideal electric field at a face normal to `n`, the
//! transverse field fluxes gain `F[B_t1] = -E_t2` and `F[B_t2] = E_t1`,
//! and the energy flux gains the Poynting flux `(E x B)_n`.

use corona_core::var::mag;
use corona_core::{Array3, Dir, VarVec, BX1, ENG};
use corona_grid::Grid;

use crate::stencil::{par_faces, FaceStencil};
use crate::term::Diffusivity;

/// Add resistive (`E = eta J`) and ambipolar
/// (`E = eta_A (J - (J.b) b)`) contributions along `dir`.
pub(crate) fn add_nonideal(
    dir: Dir,
    grid: &Grid,
    prim: &Array3<VarVec>,
    flux: &mut Array3<VarVec>,
    dmax: &mut Array3<f64>,
    resistivity: Option<&Diffusivity>,
    ambipolar: Option<&Diffusivity>,
) {
    if resistivity.is_none() && ambipolar.is_none() {
        return;
    }
    let (t1, t2) = dir.transverse();
    par_faces(prim, grid, dir, flux, dmax, |st, (k, j, i), f, d| {
        let avg = st.average(k, j, i);
        let x = st.position(k, j, i);
        let b = [avg[BX1], avg[BX1 + 1], avg[BX1 + 2]];
        let jc = current(st, (k, j, i));

        let mut e = [0.0; 3];
        if let Some(eta) = resistivity {
            let eta = eta.at(x, &avg);
            for a in 0..3 {
                e[a] += eta * jc[a];
            }
            *d = d.max(eta);
        }
        if let Some(eta_a) = ambipolar {
            let eta_a = eta_a.at(x, &avg);
            let b2 = b[0] * b[0] + b[1] * b[1] + b[2] * b[2];
            let jb = if b2 > 0.0 {
                (jc[0] * b[0] + jc[1] * b[1] + jc[2] * b[2]) / b2
            } else {
                0.0
            };
            for a in 0..3 {
                e[a] += eta_a * (jc[a] - jb * b[a]);
            }
            *d = d.max(eta_a);
        }

        let (a1, a2) = (t1.index(), t2.index());
        f[mag(t1)] -= e[a2];
        f[mag(t2)] += e[a1];
        f[ENG] += e[a1] * b[a2] - e[a2] * b[a1];
    });
}

/// `J = curl B` at a face from the cell-centered field.
fn current(st: &FaceStencil<'_>, (k, j, i): (usize, usize, usize)) -> [f64; 3] {
    let mut jc = [0.0; 3];
    for a in Dir::ALL {
        let (b1, b2) = a.transverse();
        jc[a.index()] = st.gradient(k, j, i, mag(b2), b1) - st.gradient(k, j, i, mag(b1), b2);
    }
    jc
}

#[cfg(test)]
mod tests {
    use super::*;
    use corona_core::{BX2, BX3, NVAR, RHO};
    use corona_grid::GridSpec;

    /// `B_y = s x`: uniform current `J_z = s`.
    fn sheared_field(grid: &Grid, s: f64) -> Array3<VarVec> {
        Array3::from_fn(grid.shape(), |_, _, i| {
            let mut w = [0.0; NVAR];
            w[RHO] = 1.0;
            w[BX2] = s * grid.center(Dir::X1, i);
            w[BX3] = 0.5;
            w
        })
    }

    #[test]
    fn resistive_flux_of_uniform_current() {
        let g = Grid::single(&GridSpec::new(1, [8, 1, 1])).unwrap();
        let prim = sheared_field(&g, 2.0);
        let mut flux = Array3::new(g.shape(), [0.0; NVAR]);
        let mut dmax = Array3::new(g.shape(), 0.0);
        let eta = Diffusivity::Constant(0.1);
        add_nonideal(Dir::X1, &g, &prim, &mut flux, &mut dmax, Some(&eta), None);

        let i = 5;
        let by = 2.0 * g.face(Dir::X1, i);
        // E_z = eta J_z = 0.2, so F[B_y] = -0.2 and F[E] = -E_z B_y.
        assert!((flux[(0, 0, i)][BX2] + 0.2).abs() < 1e-12);
        assert!(flux[(0, 0, i)][BX3].abs() < 1e-15);
        assert!((flux[(0, 0, i)][ENG] + 0.2 * by).abs() < 1e-12);
        assert_eq!(dmax[(0, 0, i)], 0.1);
        // The first layer has no cell below and is left alone.
        assert_eq!(flux[(0, 0, 0)], [0.0; NVAR]);
        assert_eq!(dmax[(0, 0, 0)], 0.0);
    }

    #[test]
    fn ambipolar_removes_field_aligned_current() {
        // Field along the current: J - (J.b) b vanishes.
        let g = Grid::single(&GridSpec::new(1, [8, 1, 1])).unwrap();
        let prim = Array3::from_fn(g.shape(), |_, _, i| {
            let mut w = [0.0; NVAR];
            w[RHO] = 1.0;
            w[BX2] = g.center(Dir::X1, i);
            w[BX3] = 1e3;
            w
        });
        let mut flux = Array3::new(g.shape(), [0.0; NVAR]);
        let mut dmax = Array3::new(g.shape(), 0.0);
        let eta = Diffusivity::Constant(1.0);
        add_nonideal(Dir::X1, &g, &prim, &mut flux, &mut dmax, None, Some(&eta));
        let i = 4;
        let f = flux[(0, 0, i)];
        assert!(f[BX2].abs() < 1e-5, "{}", f[BX2]);
        assert_eq!(dmax[(0, 0, i)], 1.0);
    }
}
